use serde::{Deserialize, Serialize};

use crate::error::{LandmarkError, Result};
use crate::types::FaceCandidate;

/// Policy for turning raw detector candidates into a single face.
///
/// Candidates below `confidence_threshold` are discarded up front, so a
/// low-confidence face reads as no face at all. When several candidates
/// survive, the largest bounding box is accepted only if its area exceeds
/// the runner-up's by `area_margin`; anything closer is ambiguous and the
/// detection fails rather than guessing which person the photo is about.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    pub confidence_threshold: f32,
    /// Required ratio between the best and runner-up bounding-box areas
    pub area_margin: f32,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            area_margin: 1.5,
        }
    }
}

impl SelectionPolicy {
    pub fn select(&self, candidates: Vec<FaceCandidate>) -> Result<FaceCandidate> {
        let mut confident: Vec<FaceCandidate> = candidates
            .into_iter()
            .filter(|c| c.confidence >= self.confidence_threshold)
            .collect();

        if confident.is_empty() {
            return Err(LandmarkError::NoFaceDetected);
        }
        if confident.len() == 1 {
            return Ok(confident.remove(0));
        }

        confident.sort_by(|a, b| {
            b.bbox_area()
                .partial_cmp(&a.bbox_area())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let best_area = confident[0].bbox_area();
        let runner_up_area = confident[1].bbox_area();
        if best_area > runner_up_area * self.area_margin {
            Ok(confident.remove(0))
        } else {
            Err(LandmarkError::AmbiguousFace {
                candidates: confident.len(),
                best_area,
                runner_up_area,
            })
        }
    }
}
