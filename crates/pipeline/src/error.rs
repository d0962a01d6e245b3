use thiserror::Error;

use alignment::AlignmentError;
use landmarks::LandmarkError;
use silhouette::SilhouetteError;

/// Stable error labels surfaced at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    DecodeError,
    NoFaceDetected,
    AmbiguousFace,
    MissingLandmarks,
    DegenerateCorrespondence,
    NoSubjectDetected,
    TimeoutError,
    Internal,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] raster::RasterError),

    #[error(transparent)]
    Landmark(#[from] LandmarkError),

    #[error(transparent)]
    Silhouette(#[from] SilhouetteError),

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl PipelineError {
    /// Collapse the nested component errors into the flat error kind the
    /// API contract names.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Decode(_) => ErrorKind::DecodeError,
            PipelineError::Landmark(err) => match err {
                LandmarkError::NoFaceDetected => ErrorKind::NoFaceDetected,
                LandmarkError::AmbiguousFace { .. } => ErrorKind::AmbiguousFace,
                LandmarkError::MissingLandmark(_) => ErrorKind::MissingLandmarks,
                LandmarkError::Inference(_) | LandmarkError::MalformedOutput(_) => {
                    ErrorKind::Internal
                }
            },
            PipelineError::Silhouette(err) => match err {
                SilhouetteError::NoSubjectDetected { .. } => ErrorKind::NoSubjectDetected,
                _ => ErrorKind::Internal,
            },
            PipelineError::Alignment(err) => match err {
                AlignmentError::DegenerateCorrespondence { .. } => {
                    ErrorKind::DegenerateCorrespondence
                }
                // a numeric fault in the solve, not bad input
                AlignmentError::NonFiniteTransform { .. } => ErrorKind::Internal,
            },
            PipelineError::Timeout { .. } => ErrorKind::TimeoutError,
        }
    }

    /// True when the failure is attributable to the uploaded photos
    /// rather than the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal | ErrorKind::TimeoutError)
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use landmarks::LandmarkName;

    #[test]
    fn kinds_render_snake_case() {
        assert_eq!(ErrorKind::NoFaceDetected.to_string(), "no_face_detected");
        assert_eq!(
            ErrorKind::DegenerateCorrespondence.to_string(),
            "degenerate_correspondence"
        );
    }

    #[test]
    fn component_errors_map_to_contract_kinds() {
        let err: PipelineError = LandmarkError::MissingLandmark(LandmarkName::LeftPupil).into();
        assert_eq!(err.kind(), ErrorKind::MissingLandmarks);
        assert!(err.is_client_error());

        let err: PipelineError = SilhouetteError::NoSubjectDetected {
            fraction: 0.0,
            required: 0.005,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NoSubjectDetected);

        let err = PipelineError::Timeout { seconds: 30 };
        assert_eq!(err.kind(), ErrorKind::TimeoutError);
        assert!(!err.is_client_error());
    }

    #[test]
    fn alignment_variants_split_between_client_and_internal() {
        let err: PipelineError = AlignmentError::DegenerateCorrespondence {
            separation: 1.0,
            minimum: 4.0,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::DegenerateCorrespondence);
        assert!(err.is_client_error());

        let err: PipelineError = AlignmentError::NonFiniteTransform { scale: f32::NAN }.into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.is_client_error());
    }
}
