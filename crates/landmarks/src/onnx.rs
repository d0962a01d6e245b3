use std::path::Path;
use std::sync::Mutex;

use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::{Array4, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::Session;
use ort::value::Tensor;
use tracing::debug;

use crate::FaceLandmarker;
use crate::error::{LandmarkError, Result};
use crate::selection::SelectionPolicy;
use crate::types::{FaceCandidate, LandmarkName, LandmarkSet};

/// Landmark positions within one detector output row.
///
/// The model is expected to be a five-point face detector exported with
/// NMS baked into the graph (SCRFD/YuNet-style exports): a single
/// `[N, 15]` float tensor of `[score, x1, y1, x2, y2, 5 x (x, y)]` rows,
/// with coordinates in input-canvas pixels, RGB input, `x / 255`
/// normalization.
const ROW_WIDTH: usize = 15;

const POINT_ORDER: [LandmarkName; 5] = [
    LandmarkName::LeftPupil,
    LandmarkName::RightPupil,
    LandmarkName::NoseTip,
    LandmarkName::MouthLeft,
    LandmarkName::MouthRight,
];

/// Face landmark detector backed by a pretrained ONNX model.
///
/// The session is loaded once and shared read-only across requests; the
/// mutex exists only because the runtime binding requires `&mut` to run.
pub struct OnnxFaceLandmarker {
    session: Mutex<Session>,
    policy: SelectionPolicy,
    input_width: u32,
    input_height: u32,
}

impl OnnxFaceLandmarker {
    /// Load the detector from an ONNX file, running on CPU.
    pub fn load(path: impl AsRef<Path>, policy: SelectionPolicy) -> Result<Self> {
        let session = Session::builder()?
            .with_execution_providers([CPUExecutionProvider::default().build()])?
            .commit_from_file(path.as_ref())?;

        Ok(Self {
            session: Mutex::new(session),
            policy,
            input_width: 640,
            input_height: 640,
        })
    }

    fn prepare_input(&self, image: &DynamicImage) -> Array4<f32> {
        let resized = image::imageops::resize(
            &image.to_rgb8(),
            self.input_width,
            self.input_height,
            FilterType::Triangle,
        );

        let (w, h) = (self.input_width as usize, self.input_height as usize);
        let mut input = Array4::<f32>::zeros((1, 3, h, w));
        for (x, y, px) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            input[[0, 0, y, x]] = px[0] as f32 / 255.0;
            input[[0, 1, y, x]] = px[1] as f32 / 255.0;
            input[[0, 2, y, x]] = px[2] as f32 / 255.0;
        }
        input
    }

    fn decode_candidates(
        &self,
        output: &ort::value::Value,
        source_width: u32,
        source_height: u32,
    ) -> Result<Vec<FaceCandidate>> {
        let arr = output.try_extract_array::<f32>()?;
        let shape = arr.shape().to_vec();
        let bad_shape =
            || LandmarkError::MalformedOutput(format!("bad detector output shape {shape:?}"));
        let rows = match arr.ndim() {
            2 => arr.into_dimensionality::<Ix2>().map_err(|_| bad_shape())?,
            3 if shape[0] == 1 => arr
                .index_axis_move(Axis(0), 0)
                .into_dimensionality::<Ix2>()
                .map_err(|_| bad_shape())?,
            _ => return Err(bad_shape()),
        };

        if rows.nrows() > 0 && rows.ncols() < ROW_WIDTH {
            return Err(LandmarkError::MalformedOutput(format!(
                "detector row has {} columns, need {ROW_WIDTH}",
                rows.ncols()
            )));
        }

        let scale_x = source_width as f32 / self.input_width as f32;
        let scale_y = source_height as f32 / self.input_height as f32;

        let mut candidates = Vec::with_capacity(rows.nrows());
        for row in rows.outer_iter() {
            let confidence = row[0];
            let (x1, y1, x2, y2) = (row[1], row[2], row[3], row[4]);

            let mut set = LandmarkSet::new();
            for (i, name) in POINT_ORDER.iter().enumerate() {
                let px = row[5 + 2 * i] * scale_x;
                let py = row[5 + 2 * i + 1] * scale_y;
                set.insert(*name, [px, py]);
            }

            candidates.push(FaceCandidate {
                confidence,
                bbox: [
                    x1 * scale_x,
                    y1 * scale_y,
                    (x2 - x1) * scale_x,
                    (y2 - y1) * scale_y,
                ],
                landmarks: set,
            });
        }

        Ok(candidates)
    }
}

impl FaceLandmarker for OnnxFaceLandmarker {
    fn detect(&self, image: &DynamicImage) -> Result<LandmarkSet> {
        let input = self.prepare_input(image);
        let tensor = Tensor::from_array(input)?;

        // Lock recovery: a poisoned lock only means another request panicked
        // mid-inference; the session itself holds no request state.
        let mut session = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let outputs = session.run(ort::inputs![tensor])?;

        let candidates = self.decode_candidates(&outputs[0], image.width(), image.height())?;

        debug!(candidates = candidates.len(), "face detector returned");
        let picked = self.policy.select(candidates)?;
        Ok(picked.landmarks)
    }
}
