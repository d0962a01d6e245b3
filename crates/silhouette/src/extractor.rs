use image::DynamicImage;
use tracing::debug;

use crate::{
    algorithms::{
        ChaikinSmoother, DouglasPeuckerSimplifier, ImageprocContourTracer, RingValidator,
        ThresholdPreprocessor,
    },
    error::{Result, SilhouetteError},
    traits::{ContourPostProcessor, ContourTracer, MaskPreprocessor, SubjectSegmenter},
    types::Contour,
};

/// Extracts the subject's outer silhouette from a photo.
///
/// Stages: segment -> preprocess mask -> trace boundaries -> pick the
/// largest foreground region -> post-process (smooth, simplify, validate).
/// The largest region must cover at least `min_area_fraction` of the image
/// or the extraction fails with `NoSubjectDetected`.
pub struct SilhouetteExtractor {
    segmenter: Box<dyn SubjectSegmenter>,
    preprocessors: Vec<Box<dyn MaskPreprocessor>>,
    tracer: Box<dyn ContourTracer>,
    postprocessors: Vec<Box<dyn ContourPostProcessor>>,
    min_area_fraction: f32,
}

impl SilhouetteExtractor {
    pub fn builder(segmenter: impl SubjectSegmenter + 'static) -> SilhouetteBuilder {
        SilhouetteBuilder::new(segmenter)
    }

    pub fn extract(&self, image: &DynamicImage) -> Result<Contour> {
        let mut mask = self.segmenter.segment(image)?;
        for preprocessor in &self.preprocessors {
            mask = preprocessor.preprocess(&mask)?;
        }

        let contours = self.tracer.trace(&mask)?;
        debug!(regions = contours.len(), "traced foreground regions");

        let image_area = (image.width() * image.height()) as f32;
        let mut best: Option<(Contour, f32)> = None;
        for mut contour in contours {
            contour.close();
            if !contour.is_valid() {
                continue;
            }
            let area = contour.area();
            if best.as_ref().is_none_or(|(_, best_area)| area > *best_area) {
                best = Some((contour, area));
            }
        }

        let (mut contour, area) = best.unwrap_or((Contour::new(Vec::new()), 0.0));
        let fraction = area / image_area;
        if fraction < self.min_area_fraction {
            return Err(SilhouetteError::NoSubjectDetected {
                fraction,
                required: self.min_area_fraction,
            });
        }

        for postprocessor in &self.postprocessors {
            postprocessor.process(&mut contour)?;
        }
        contour.close();

        if !contour.is_valid() {
            return Err(SilhouetteError::ImageProcessing(
                "post-processing collapsed the silhouette ring".to_string(),
            ));
        }

        Ok(contour)
    }
}

/// Builder for [`SilhouetteExtractor`] with a fluent API
pub struct SilhouetteBuilder {
    segmenter: Box<dyn SubjectSegmenter>,
    preprocessors: Vec<Box<dyn MaskPreprocessor>>,
    tracer: Option<Box<dyn ContourTracer>>,
    postprocessors: Vec<Box<dyn ContourPostProcessor>>,
    min_area_fraction: f32,
}

impl SilhouetteBuilder {
    pub fn new(segmenter: impl SubjectSegmenter + 'static) -> Self {
        Self {
            segmenter: Box::new(segmenter),
            preprocessors: Vec::new(),
            tracer: None,
            postprocessors: Vec::new(),
            min_area_fraction: 0.005,
        }
    }

    pub fn add_preprocessor(mut self, preprocessor: impl MaskPreprocessor + 'static) -> Self {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    pub fn set_tracer(mut self, tracer: impl ContourTracer + 'static) -> Self {
        self.tracer = Some(Box::new(tracer));
        self
    }

    pub fn add_postprocessor(
        mut self,
        postprocessor: impl ContourPostProcessor + 'static,
    ) -> Self {
        self.postprocessors.push(Box::new(postprocessor));
        self
    }

    pub fn with_smoothing(self, iterations: usize) -> Self {
        self.add_postprocessor(ChaikinSmoother { iterations })
    }

    pub fn with_simplification(self, tolerance: f32) -> Self {
        self.add_postprocessor(DouglasPeuckerSimplifier { tolerance })
    }

    pub fn min_area_fraction(mut self, fraction: f32) -> Self {
        self.min_area_fraction = fraction;
        self
    }

    /// Build with defaults for anything not set: binary threshold at 128,
    /// imageproc tracer, ring validation last.
    pub fn build(self) -> SilhouetteExtractor {
        let mut preprocessors = self.preprocessors;
        if preprocessors.is_empty() {
            preprocessors.push(Box::new(ThresholdPreprocessor::default()));
        }

        let mut postprocessors = self.postprocessors;
        postprocessors.push(Box::new(RingValidator));

        SilhouetteExtractor {
            segmenter: self.segmenter,
            preprocessors,
            tracer: self
                .tracer
                .unwrap_or_else(|| Box::new(ImageprocContourTracer)),
            postprocessors,
            min_area_fraction: self.min_area_fraction,
        }
    }
}
