//! Binary entry point: loads the pretrained landmark and segmentation
//! models once at startup and serves `/align` and `/analyze` over
//! multipart uploads. All image processing runs on the blocking thread
//! pool under a per-request deadline.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use landmarks::OnnxFaceLandmarker;
use pipeline::{Orchestrator, PipelineConfig};
use server::routes::{self, AppState};
use silhouette::{OnnxSubjectSegmenter, SilhouetteExtractor};

#[derive(Parser)]
#[command(author, version, about = "Progress-photo alignment and analysis service", long_about = None)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0:8000")]
    addr: SocketAddr,

    /// Path to the face landmark ONNX model
    #[arg(long)]
    face_model: PathBuf,

    /// Path to the subject segmentation ONNX model
    #[arg(long)]
    segmentation_model: PathBuf,

    /// Optional JSON file overriding the pipeline defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-request processing deadline in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Maximum accepted upload size in megabytes
    #[arg(long, default_value = "25")]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "loading pipeline config");
            PipelineConfig::from_json_file(path)?
        }
        None => PipelineConfig::default(),
    };

    let _ = ort::init().with_name("photo_server").commit()?;

    info!(model = %cli.face_model.display(), "loading face landmark model");
    let landmarker = OnnxFaceLandmarker::load(&cli.face_model, config.selection)?;

    info!(model = %cli.segmentation_model.display(), "loading segmentation model");
    let segmenter = OnnxSubjectSegmenter::load(&cli.segmentation_model)?;
    let extractor = SilhouetteExtractor::builder(segmenter)
        .with_smoothing(1)
        .with_simplification(1.5)
        .build();

    let state = AppState {
        orchestrator: Arc::new(Orchestrator::new(Arc::new(landmarker), extractor, config)),
        timeout_seconds: cli.timeout,
    };
    let app = routes::router(state, cli.max_upload_mb * 1024 * 1024);

    info!(addr = %cli.addr, "listening");
    let listener = tokio::net::TcpListener::bind(cli.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
