use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::LandmarkSet;

/// Inter-pupillary distance derived from a [`LandmarkSet`].
///
/// Downstream consumers treat this as a calibration measurement, so it is
/// never approximated: if either pupil is missing the computation fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PupilDistance {
    /// Euclidean distance between the pupil centers, in pixels
    pub pixels: f32,
    /// The landmarks the distance was derived from
    pub landmarks: LandmarkSet,
}

/// Compute the exact Euclidean inter-pupillary distance.
pub fn pupil_distance(landmarks: &LandmarkSet) -> Result<PupilDistance> {
    let (left, right) = landmarks.pupils()?;
    let dx = right[0] - left[0];
    let dy = right[1] - left[1];
    Ok(PupilDistance {
        pixels: (dx * dx + dy * dy).sqrt(),
        landmarks: landmarks.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LandmarkError;
    use crate::types::LandmarkName;

    fn set(left: [f32; 2], right: [f32; 2]) -> LandmarkSet {
        let mut s = LandmarkSet::new();
        s.insert(LandmarkName::LeftPupil, left);
        s.insert(LandmarkName::RightPupil, right);
        s
    }

    #[test]
    fn matches_analytic_distances() {
        // 3-4-5 triangle
        let d = pupil_distance(&set([10.0, 10.0], [13.0, 14.0])).unwrap();
        assert!((d.pixels - 5.0).abs() < 1e-6);

        // horizontal pair
        let d = pupil_distance(&set([100.0, 150.0], [140.0, 150.0])).unwrap();
        assert!((d.pixels - 40.0).abs() < 1e-6);
    }

    #[test]
    fn coincident_pupils_measure_zero() {
        let d = pupil_distance(&set([7.0, 7.0], [7.0, 7.0])).unwrap();
        assert_eq!(d.pixels, 0.0);
    }

    #[test]
    fn fails_without_both_pupils() {
        let mut s = LandmarkSet::new();
        s.insert(LandmarkName::RightPupil, [1.0, 1.0]);
        let err = pupil_distance(&s).unwrap_err();
        assert!(matches!(
            err,
            LandmarkError::MissingLandmark(LandmarkName::LeftPupil)
        ));
    }
}
