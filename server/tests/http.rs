//! In-process tests of the HTTP surface: multipart parsing, the
//! `X-Pupil-Distance-Px` header contract, and the structured `/align`
//! payload, driven through the router with fixture detectors.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use tower::ServiceExt;

use landmarks::{FaceLandmarker, LandmarkError, LandmarkName, LandmarkSet};
use pipeline::{Orchestrator, PipelineConfig};
use server::routes::{self, AppState};
use silhouette::{Result as SilhouetteResult, SilhouetteExtractor, SubjectSegmenter};

const BEFORE_DIMS: (u32, u32) = (64, 64);
const AFTER_DIMS: (u32, u32) = (80, 80);
const FACELESS_DIMS: (u32, u32) = (32, 32);

struct FixtureLandmarker {
    by_dims: HashMap<(u32, u32), LandmarkSet>,
}

impl FaceLandmarker for FixtureLandmarker {
    fn detect(&self, image: &DynamicImage) -> landmarks::Result<LandmarkSet> {
        self.by_dims
            .get(&(image.width(), image.height()))
            .cloned()
            .ok_or(LandmarkError::NoFaceDetected)
    }
}

struct CenteredRectSegmenter;

impl SubjectSegmenter for CenteredRectSegmenter {
    fn segment(&self, image: &DynamicImage) -> SilhouetteResult<GrayImage> {
        let (w, h) = (image.width(), image.height());
        let mut mask = GrayImage::new(w, h);
        for y in h / 4..(3 * h / 4) {
            for x in w / 4..(3 * w / 4) {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }
        Ok(mask)
    }
}

fn test_state() -> AppState {
    let mut by_dims = HashMap::new();
    let mut before = LandmarkSet::new();
    before.insert(LandmarkName::LeftPupil, [20.0, 30.0]);
    before.insert(LandmarkName::RightPupil, [60.0, 30.0]);
    by_dims.insert(BEFORE_DIMS, before);
    let mut after = LandmarkSet::new();
    after.insert(LandmarkName::LeftPupil, [16.0, 24.0]);
    after.insert(LandmarkName::RightPupil, [64.0, 24.0]);
    by_dims.insert(AFTER_DIMS, after);

    AppState {
        orchestrator: Arc::new(Orchestrator::new(
            Arc::new(FixtureLandmarker { by_dims }),
            SilhouetteExtractor::builder(CenteredRectSegmenter).build(),
            PipelineConfig::default(),
        )),
        timeout_seconds: 30,
    }
}

fn photo_bytes(dims: (u32, u32)) -> Vec<u8> {
    let img = RgbaImage::from_pixel(dims.0, dims.1, Rgba([90, 90, 90, 255]));
    raster::encode_png(&DynamicImage::ImageRgba8(img)).unwrap()
}

const BOUNDARY: &str = "fixture-boundary-1d5c4a";

fn multipart_body(fields: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, bytes) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"photo.png\"\r\n\
                 Content-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_post(uri: &str, fields: &[(&str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields)))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

#[tokio::test]
async fn liveness_answers_ok() {
    let app = routes::router(test_state(), 1024 * 1024);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn analyze_returns_png_with_the_ipd_header() {
    let app = routes::router(test_state(), 1024 * 1024);
    let request = multipart_post("/analyze", &[("image", &photo_bytes(BEFORE_DIMS))]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "image/png"
    );
    assert_eq!(
        response.headers()["x-pupil-distance-px"].to_str().unwrap(),
        "40.00"
    );

    let body = body_bytes(response).await;
    let decoded = raster::decode(&body, Default::default()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), BEFORE_DIMS);
}

#[tokio::test]
async fn analyze_failure_omits_the_ipd_header() {
    let app = routes::router(test_state(), 1024 * 1024);
    let request = multipart_post("/analyze", &[("image", &photo_bytes(FACELESS_DIMS))]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.headers().get("x-pupil-distance-px").is_none());

    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "no_face_detected");
}

#[tokio::test]
async fn analyze_rejects_a_missing_image_field() {
    let app = routes::router(test_state(), 1024 * 1024);
    let request = multipart_post("/analyze", &[("photo", &photo_bytes(BEFORE_DIMS))]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "invalid_request");
    assert!(body["message"].as_str().unwrap().contains("image"));
}

#[tokio::test]
async fn align_returns_the_structured_payload() {
    let app = routes::router(test_state(), 1024 * 1024);
    let request = multipart_post(
        "/align",
        &[
            ("before_image", &photo_bytes(BEFORE_DIMS)),
            ("after_image", &photo_bytes(AFTER_DIMS)),
        ],
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    for key in ["after", "beforeAnalysis", "afterAnalysis"] {
        let url = body[key].as_str().unwrap_or_else(|| panic!("missing {key}"));
        assert!(url.starts_with("data:image/png;base64,"), "{key}: {url}");
    }
}
