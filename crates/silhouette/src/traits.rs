use image::{DynamicImage, GrayImage};

use crate::{error::Result, types::Contour};

/// Trait for subject/background segmentation backends.
///
/// Implementations produce a foreground mask at the source image's
/// dimensions, brighter where the subject is. The production backend
/// wraps a pretrained model; tests use fixture masks.
pub trait SubjectSegmenter: Send + Sync {
    fn segment(&self, image: &DynamicImage) -> Result<GrayImage>;
}

/// Trait for mask preprocessing steps (blur, threshold)
pub trait MaskPreprocessor: Send + Sync {
    fn preprocess(&self, mask: &GrayImage) -> Result<GrayImage>;
}

/// Trait for boundary tracing over a binary mask
pub trait ContourTracer: Send + Sync {
    /// Trace all outer boundaries in a binary mask
    fn trace(&self, mask: &GrayImage) -> Result<Vec<Contour>>;
}

/// Trait for contour post-processing steps (smoothing, simplification)
pub trait ContourPostProcessor: Send + Sync {
    fn process(&self, contour: &mut Contour) -> Result<()>;
}
