use thiserror::Error;

#[derive(Error, Debug)]
pub enum SilhouetteError {
    #[error("no subject detected: largest foreground region covers {fraction:.4} of the image, need {required:.4}")]
    NoSubjectDetected { fraction: f32, required: f32 },

    #[error("segmentation model inference failed: {0}")]
    Inference(#[from] ort::Error),

    #[error("segmentation model output malformed: {0}")]
    MalformedOutput(String),

    #[error("image processing error: {0}")]
    ImageProcessing(String),
}

pub type Result<T> = std::result::Result<T, SilhouetteError>;
