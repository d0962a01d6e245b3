use std::path::Path;
use std::sync::Mutex;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::Session;
use ort::value::Tensor;

use crate::error::{Result, SilhouetteError};
use crate::traits::SubjectSegmenter;

/// ImageNet statistics the salient-object models were trained with
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Subject segmenter backed by a pretrained salient-object ONNX model
/// (U²-Net family).
///
/// Expected graph: `[1, 3, S, S]` RGB in, normalized with ImageNet
/// statistics; first output `[1, 1, S, S]` saliency. The saliency map is
/// min-max normalized and resized back to source dimensions as an 8-bit
/// mask.
pub struct OnnxSubjectSegmenter {
    session: Mutex<Session>,
    input_size: u32,
}

impl OnnxSubjectSegmenter {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let session = Session::builder()?
            .with_execution_providers([CPUExecutionProvider::default().build()])?
            .commit_from_file(path.as_ref())?;

        Ok(Self {
            session: Mutex::new(session),
            input_size: 320,
        })
    }

    fn prepare_input(&self, image: &DynamicImage) -> Array4<f32> {
        let size = self.input_size;
        let resized =
            image::imageops::resize(&image.to_rgb8(), size, size, FilterType::Triangle);

        let side = size as usize;
        let mut input = Array4::<f32>::zeros((1, 3, side, side));
        for (x, y, px) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                input[[0, c, y, x]] = (px[c] as f32 / 255.0 - MEAN[c]) / STD[c];
            }
        }
        input
    }
}

impl SubjectSegmenter for OnnxSubjectSegmenter {
    fn segment(&self, image: &DynamicImage) -> Result<GrayImage> {
        let input = self.prepare_input(image);
        let tensor = Tensor::from_array(input)?;

        let mut session = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let outputs = session.run(ort::inputs![tensor])?;

        let saliency = outputs[0].try_extract_array::<f32>()?;
        let side = self.input_size as usize;
        let expected = side * side;
        let flat: Vec<f32> = saliency.iter().copied().collect();
        if flat.len() != expected {
            return Err(SilhouetteError::MalformedOutput(format!(
                "expected {expected} saliency values, got {} (shape {:?})",
                flat.len(),
                saliency.shape()
            )));
        }

        // min-max normalize; a flat map (min == max) reads as empty
        let (mut min, mut max) = (f32::INFINITY, f32::NEG_INFINITY);
        for &v in &flat {
            min = min.min(v);
            max = max.max(v);
        }
        let range = (max - min).max(f32::EPSILON);

        let mut mask = GrayImage::new(self.input_size, self.input_size);
        for (i, px) in mask.pixels_mut().enumerate() {
            let v = (flat[i] - min) / range;
            px[0] = (v * 255.0).round() as u8;
        }

        Ok(image::imageops::resize(
            &mask,
            image.width(),
            image.height(),
            FilterType::Triangle,
        ))
    }
}
