//! # Pipeline - Request Orchestration
//!
//! Sequences the codec, landmark detector, alignment estimator,
//! silhouette extractor, and compositor into the two operations the
//! service exposes: [`Orchestrator::align`] and [`Orchestrator::analyze`].
//!
//! Each request walks the stage machine `Decoding -> Detecting ->
//! Aligning/Measuring -> Extracting -> Rendering -> Encoding -> Done`,
//! with any stage able to fail the whole request. Cancellation is
//! cooperative: a [`CancelToken`] is checked at every stage boundary,
//! and a cancelled request stops there, dropping its buffers. There is
//! no cross-request state and nothing is retried: every component is
//! deterministic over its input bytes, so a retry without different
//! input cannot change the outcome.
//!
//! The orchestrator is front-end agnostic - the HTTP server, a CLI, or a
//! batch harness can all drive it with raw image bytes.

pub mod config;
pub mod error;

pub use config::PipelineConfig;
pub use error::{ErrorKind, PipelineError, Result};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::DynamicImage;
use tracing::{debug, warn};

use alignment::{OverlayRole, Similarity};
use landmarks::FaceLandmarker;
use silhouette::{Contour, SilhouetteError, SilhouetteExtractor};

/// Pipeline stages, in request order
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
enum Stage {
    Decoding,
    Detecting,
    Measuring,
    Aligning,
    Extracting,
    Rendering,
    Encoding,
}

/// Cooperative cancellation observed at stage boundaries.
///
/// The front end cancels the token when its deadline elapses; the
/// pipeline checks it before entering each stage and bails out with
/// `Timeout`, dropping whatever intermediate buffers the request had
/// accumulated. Work already inside a stage runs to that stage's end -
/// the boundary is the cancellation point.
#[derive(Debug, Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline_seconds: u64,
}

impl CancelToken {
    pub fn new(deadline_seconds: u64) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline_seconds,
        }
    }

    /// A token that is never cancelled, for callers without a deadline.
    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::unbounded()
    }
}

fn enter(stage: Stage, cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        debug!(stage = %stage, "request cancelled, dropping buffers");
        return Err(PipelineError::Timeout {
            seconds: cancel.deadline_seconds,
        });
    }
    debug!(stage = %stage, "pipeline stage");
    Ok(())
}

/// Output of [`Orchestrator::analyze`], alive for one request only.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Annotated photo (outline + pupil markers composited), PNG bytes
    pub annotated_png: Vec<u8>,
    /// Inter-pupillary distance in pixels
    pub pupil_distance_px: f32,
    /// The extracted outline; `None` when the photo had no extractable
    /// subject (IPD is still useful alone)
    pub outline: Option<Contour>,
}

/// Output of [`Orchestrator::align`], alive for one request only.
#[derive(Debug, Clone)]
pub struct AlignResult {
    /// The "after" photo resampled into the "before" frame, PNG bytes
    pub aligned_after_png: Vec<u8>,
    /// Transparent outline overlay for the "before" photo, PNG bytes
    pub before_overlay_png: Vec<u8>,
    /// Transparent outline overlay for the aligned "after" photo, PNG bytes
    pub after_overlay_png: Vec<u8>,
    /// The estimated after-to-before transform
    pub transform: Similarity,
}

/// Stateless per-request pipeline over shared, read-only detectors.
pub struct Orchestrator {
    landmarker: Arc<dyn FaceLandmarker>,
    extractor: SilhouetteExtractor,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(
        landmarker: Arc<dyn FaceLandmarker>,
        extractor: SilhouetteExtractor,
        config: PipelineConfig,
    ) -> Self {
        Self {
            landmarker,
            extractor,
            config,
        }
    }

    /// Single-photo analysis: IPD measurement plus a drawn body outline.
    ///
    /// A missing face is fatal; a missing silhouette degrades to "no
    /// outline" because the IPD alone is still a useful measurement.
    pub fn analyze(&self, image_bytes: &[u8], cancel: &CancelToken) -> Result<AnalysisResult> {
        enter(Stage::Decoding, cancel)?;
        let photo = raster::decode(image_bytes, self.config.decode_limits)?;

        enter(Stage::Detecting, cancel)?;
        let landmarks = self.landmarker.detect(&photo)?;

        enter(Stage::Measuring, cancel)?;
        let ipd = landmarks::pupil_distance(&landmarks)?;

        enter(Stage::Extracting, cancel)?;
        let outline = match self.extractor.extract(&photo) {
            Ok(contour) => Some(contour),
            Err(SilhouetteError::NoSubjectDetected { fraction, required }) => {
                warn!(fraction, required, "no silhouette, returning IPD only");
                None
            }
            Err(err) => return Err(err.into()),
        };

        enter(Stage::Rendering, cancel)?;
        let (width, height) = (photo.width(), photo.height());
        let mut overlay = match &outline {
            Some(contour) => alignment::render_outline(
                contour,
                OverlayRole::Before.color(),
                width,
                height,
                self.config.stroke_width,
            ),
            None => image::RgbaImage::new(width, height),
        };
        let (left, right) = ipd.landmarks.pupils()?;
        alignment::draw_pupil_annotation(&mut overlay, left, right);

        let mut annotated = photo.to_rgba8();
        alignment::composite_over(&mut annotated, &overlay);

        enter(Stage::Encoding, cancel)?;
        let annotated_png = raster::encode_png(&DynamicImage::ImageRgba8(annotated))?;

        debug!(ipd_px = ipd.pixels, outline = outline.is_some(), "analyze done");
        Ok(AnalysisResult {
            annotated_png,
            pupil_distance_px: ipd.pixels,
            outline,
        })
    }

    /// Two-photo alignment: maps the "after" photo onto the "before"
    /// frame and produces outline overlays for both, in that shared
    /// frame.
    ///
    /// Every stage is fatal here - both outline overlays are part of the
    /// operation's contract.
    pub fn align(
        &self,
        before_bytes: &[u8],
        after_bytes: &[u8],
        cancel: &CancelToken,
    ) -> Result<AlignResult> {
        enter(Stage::Decoding, cancel)?;
        let before = raster::decode(before_bytes, self.config.decode_limits)?;
        let after = raster::decode(after_bytes, self.config.decode_limits)?;

        enter(Stage::Detecting, cancel)?;
        let before_landmarks = self.landmarker.detect(&before)?;
        let after_landmarks = self.landmarker.detect(&after)?;

        enter(Stage::Aligning, cancel)?;
        let transform = Similarity::between_pairs_with_minimum(
            after_landmarks.pupils()?,
            before_landmarks.pupils()?,
            self.config.min_pupil_separation,
        )?;
        debug!(
            scale = transform.scale,
            rotation = transform.rotation,
            "estimated after-to-before transform"
        );

        let (width, height) = (before.width(), before.height());
        let aligned_after = alignment::resample(&after, &transform, width, height);
        let aligned_after = DynamicImage::ImageRgba8(aligned_after);

        enter(Stage::Extracting, cancel)?;
        // The "after" silhouette comes from the resampled raster so both
        // overlays share the before-photo coordinate frame.
        let before_contour = self.extractor.extract(&before)?;
        let after_contour = self.extractor.extract(&aligned_after)?;

        enter(Stage::Rendering, cancel)?;
        let before_overlay = alignment::render_outline(
            &before_contour,
            OverlayRole::Before.color(),
            width,
            height,
            self.config.stroke_width,
        );
        let after_overlay = alignment::render_outline(
            &after_contour,
            OverlayRole::After.color(),
            width,
            height,
            self.config.stroke_width,
        );

        enter(Stage::Encoding, cancel)?;
        let result = AlignResult {
            aligned_after_png: raster::encode_png(&aligned_after)?,
            before_overlay_png: raster::encode_png(&DynamicImage::ImageRgba8(before_overlay))?,
            after_overlay_png: raster::encode_png(&DynamicImage::ImageRgba8(after_overlay))?,
            transform,
        };

        debug!("align done");
        Ok(result)
    }
}
