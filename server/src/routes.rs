use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderName, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::info;

use pipeline::{CancelToken, Orchestrator, PipelineError};

use crate::error::ApiError;

/// Shared, immutable per-process state. The orchestrator holds the loaded
/// models, so cloning the state is cheap.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub timeout_seconds: u64,
}

/// Assemble the service router over shared state.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/analyze", post(analyze))
        .route("/align", post(align))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn liveness() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /analyze` - single photo in, annotated PNG out, with the measured
/// inter-pupillary distance in the `X-Pupil-Distance-Px` header.
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut fields = read_fields(&mut multipart).await?;
    let image = take_field(&mut fields, "image")?;

    let result = run_with_deadline(&state, move |o, cancel| o.analyze(&image, cancel)).await?;
    info!(
        ipd_px = result.pupil_distance_px,
        outline = result.outline.is_some(),
        "analyze complete"
    );

    let headers = [
        (header::CONTENT_TYPE, "image/png".to_string()),
        (
            HeaderName::from_static("x-pupil-distance-px"),
            format!("{:.2}", result.pupil_distance_px),
        ),
    ];
    Ok((headers, result.annotated_png).into_response())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignResponse {
    /// The "after" photo resampled into the "before" frame
    after: String,
    /// Outline overlay for the "before" photo
    before_analysis: String,
    /// Outline overlay for the aligned "after" photo
    after_analysis: String,
}

/// `POST /align` - before/after photo pair in, JSON with three
/// base64 data URLs out, all in the "before" photo's frame.
pub async fn align(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AlignResponse>, ApiError> {
    let mut fields = read_fields(&mut multipart).await?;
    let before = take_field(&mut fields, "before_image")?;
    let after = take_field(&mut fields, "after_image")?;

    let result =
        run_with_deadline(&state, move |o, cancel| o.align(&before, &after, cancel)).await?;
    info!(
        scale = result.transform.scale,
        rotation = result.transform.rotation,
        "align complete"
    );

    Ok(Json(AlignResponse {
        after: data_url(&result.aligned_after_png),
        before_analysis: data_url(&result.before_overlay_png),
        after_analysis: data_url(&result.after_overlay_png),
    }))
}

/// Run a pipeline job off the async runtime with a hard deadline.
///
/// The client gets 504 the moment the deadline elapses; the cancelled
/// token makes the worker stop at its next stage boundary and drop the
/// request's buffers instead of computing the remaining stages.
async fn run_with_deadline<T, F>(state: &AppState, job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Orchestrator, &CancelToken) -> pipeline::Result<T> + Send + 'static,
{
    let orchestrator = Arc::clone(&state.orchestrator);
    let seconds = state.timeout_seconds;
    let cancel = CancelToken::new(seconds);
    let worker_token = cancel.clone();

    let handle = tokio::task::spawn_blocking(move || job(&orchestrator, &worker_token));
    match tokio::time::timeout(Duration::from_secs(seconds), handle).await {
        Ok(joined) => Ok(joined??),
        Err(_) => {
            cancel.cancel();
            Err(PipelineError::Timeout { seconds }.into())
        }
    }
}

async fn read_fields(multipart: &mut Multipart) -> Result<HashMap<String, Vec<u8>>, ApiError> {
    let mut fields = HashMap::new();
    while let Some(field) = multipart.next_field().await? {
        if let Some(name) = field.name().map(str::to_owned) {
            let bytes = field.bytes().await?;
            fields.insert(name, bytes.to_vec());
        }
    }
    Ok(fields)
}

fn take_field(
    fields: &mut HashMap<String, Vec<u8>>,
    name: &'static str,
) -> Result<Vec<u8>, ApiError> {
    fields.remove(name).ok_or(ApiError::MissingField(name))
}

fn data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_urls_carry_the_png_media_type() {
        let url = data_url(&[0x89, b'P', b'N', b'G']);
        assert!(url.starts_with("data:image/png;base64,"));
        let payload = url.trim_start_matches("data:image/png;base64,");
        assert_eq!(STANDARD.decode(payload).unwrap(), [0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        let mut fields = HashMap::new();
        fields.insert("before_image".to_string(), vec![1u8]);

        assert!(take_field(&mut fields, "before_image").is_ok());
        let err = take_field(&mut fields, "after_image").unwrap_err();
        assert!(matches!(err, ApiError::MissingField("after_image")));
    }

    #[test]
    fn align_response_uses_the_wire_field_names() {
        let response = AlignResponse {
            after: "a".into(),
            before_analysis: "b".into(),
            after_analysis: "c".into(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["after"], "a");
        assert_eq!(value["beforeAnalysis"], "b");
        assert_eq!(value["afterAnalysis"], "c");
    }
}
