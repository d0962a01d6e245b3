//! # Silhouette - Subject Segmentation & Outline Extraction
//!
//! Segments the photographed subject from the background and reduces the
//! largest foreground region to a simplified, closed boundary contour.
//!
//! ## Architecture
//!
//! - **Trait seams**: the segmentation model ([`SubjectSegmenter`]), mask
//!   preprocessing, boundary tracing, and contour post-processing are all
//!   traits, so the extraction pipeline runs identically against a
//!   pretrained model or a test fixture.
//! - **Builder**: [`SilhouetteExtractor::builder`] composes the stages.
//!
//! ```rust,no_run
//! use silhouette::{OnnxSubjectSegmenter, SilhouetteExtractor};
//!
//! let segmenter = OnnxSubjectSegmenter::load("u2netp.onnx")?;
//! let extractor = SilhouetteExtractor::builder(segmenter)
//!     .with_smoothing(1)
//!     .with_simplification(1.5)
//!     .build();
//!
//! let photo = image::open("photo.jpg")?;
//! let contour = extractor.extract(&photo)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Silhouette extraction is independent of face detection: a photo can
//! fail one and still yield the other. Which failure is fatal is the
//! orchestrator's decision, not this crate's.

pub mod algorithms;
pub mod error;
pub mod extractor;
pub mod onnx;
pub mod traits;
pub mod types;

pub use algorithms::*;
pub use error::{Result, SilhouetteError};
pub use extractor::{SilhouetteBuilder, SilhouetteExtractor};
pub use onnx::OnnxSubjectSegmenter;
pub use traits::*;
pub use types::Contour;
