use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LandmarkError, Result};

/// Named anatomical landmarks emitted by a face detector.
///
/// `LeftPupil`/`RightPupil` are required by every downstream consumer;
/// the remaining three points of the five-point set are carried when the
/// backing model provides them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum LandmarkName {
    LeftPupil,
    RightPupil,
    NoseTip,
    MouthLeft,
    MouthRight,
}

/// Sub-pixel landmark coordinates in source-image pixel space
/// (origin top-left).
///
/// Exactly one coordinate per name: inserting a name twice replaces the
/// earlier point. A missing required name is a detection failure and is
/// surfaced as an error by [`LandmarkSet::require`], never as a zero
/// coordinate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    points: BTreeMap<LandmarkName, [f32; 2]>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: LandmarkName, point: [f32; 2]) {
        self.points.insert(name, point);
    }

    pub fn get(&self, name: LandmarkName) -> Option<[f32; 2]> {
        self.points.get(&name).copied()
    }

    pub fn require(&self, name: LandmarkName) -> Result<[f32; 2]> {
        self.get(name).ok_or(LandmarkError::MissingLandmark(name))
    }

    /// Both pupil coordinates, or `MissingLandmark` for whichever is absent.
    pub fn pupils(&self) -> Result<([f32; 2], [f32; 2])> {
        Ok((
            self.require(LandmarkName::LeftPupil)?,
            self.require(LandmarkName::RightPupil)?,
        ))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LandmarkName, [f32; 2])> + '_ {
        self.points.iter().map(|(name, point)| (*name, *point))
    }
}

/// One detected face before candidate selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceCandidate {
    /// Detector confidence in `[0, 1]`
    pub confidence: f32,
    /// Bounding box `[x, y, width, height]` in source pixels
    pub bbox: [f32; 4],
    pub landmarks: LandmarkSet,
}

impl FaceCandidate {
    pub fn bbox_area(&self) -> f32 {
        (self.bbox[2] * self.bbox[3]).max(0.0)
    }
}
