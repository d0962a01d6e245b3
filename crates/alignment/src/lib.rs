//! # Alignment - Similarity Transforms, Resampling & Overlay Rendering
//!
//! Brings two progress photos into a shared frame of reference. The pupil
//! pair from each photo gives exactly two point correspondences, which
//! constrain a similarity transform (uniform scale + rotation +
//! translation) in closed form - no least squares, no 3D pose estimation.
//! Pupils are used as anchors because they are the most reliably detected,
//! pose-invariant rigid pair across photos of the same subject taken at
//! different times and distances.
//!
//! The resampler applies the transform with bilinear interpolation, and
//! the overlay module rasterizes silhouette contours into transparent
//! outline layers.

pub mod error;
pub mod overlay;
pub mod resample;
pub mod similarity;

pub use error::{AlignmentError, Result};
pub use overlay::{OverlayRole, composite_over, draw_pupil_annotation, render_outline};
pub use resample::resample;
pub use similarity::{MIN_PUPIL_SEPARATION, Similarity};
