use thiserror::Error;

use crate::types::LandmarkName;

#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("no face detected")]
    NoFaceDetected,

    #[error(
        "ambiguous face: {candidates} candidates with comparable confidence \
         (best area {best_area:.0}px², runner-up {runner_up_area:.0}px²)"
    )]
    AmbiguousFace {
        candidates: usize,
        best_area: f32,
        runner_up_area: f32,
    },

    #[error("required landmark missing: {0}")]
    MissingLandmark(LandmarkName),

    #[error("landmark model inference failed: {0}")]
    Inference(#[from] ort::Error),

    #[error("landmark model output malformed: {0}")]
    MalformedOutput(String),
}

pub type Result<T> = std::result::Result<T, LandmarkError>;
