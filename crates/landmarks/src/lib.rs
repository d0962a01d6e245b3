//! # Landmarks - Facial Landmark Detection & Pupil Distance
//!
//! Locates the five-point facial landmark set (both pupil centers, nose
//! tip, mouth corners) in a photo and derives the inter-pupillary distance
//! used as the pipeline's scale reference.
//!
//! The pretrained model is an abstract capability behind the
//! [`FaceLandmarker`] trait, so the pipeline can be exercised against
//! deterministic fixtures; [`OnnxFaceLandmarker`] is the production
//! binding. Detection failure modes are deterministic: zero candidates or
//! only low-confidence ones read as `NoFaceDetected`, several comparable
//! candidates as `AmbiguousFace` (see [`SelectionPolicy`]) - never a
//! silent guess.

pub mod error;
pub mod onnx;
pub mod scale;
pub mod selection;
pub mod types;

pub use error::{LandmarkError, Result};
pub use onnx::OnnxFaceLandmarker;
pub use scale::{PupilDistance, pupil_distance};
pub use selection::SelectionPolicy;
pub use types::{FaceCandidate, LandmarkName, LandmarkSet};

use image::DynamicImage;

/// A face landmark detector.
///
/// Implementations wrap a pretrained model; accuracy is the model's
/// concern, deterministic failure modes are this contract's.
pub trait FaceLandmarker: Send + Sync {
    /// Detect the landmark set of the single subject face in `image`.
    fn detect(&self, image: &DynamicImage) -> Result<LandmarkSet>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLandmarker(LandmarkSet);

    impl FaceLandmarker for FixedLandmarker {
        fn detect(&self, _image: &DynamicImage) -> Result<LandmarkSet> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn trait_object_detect_and_measure() {
        let mut set = LandmarkSet::new();
        set.insert(LandmarkName::LeftPupil, [10.0, 10.0]);
        set.insert(LandmarkName::RightPupil, [13.0, 14.0]);

        let detector: Box<dyn FaceLandmarker> = Box::new(FixedLandmarker(set));
        let image = DynamicImage::new_rgb8(32, 32);
        let landmarks = detector.detect(&image).unwrap();

        let ipd = pupil_distance(&landmarks).unwrap();
        assert!((ipd.pixels - 5.0).abs() < 1e-6);

        let (left, right) = landmarks.pupils().unwrap();
        for p in [left, right] {
            assert!(p[0].is_finite() && p[1].is_finite());
        }
    }
}
