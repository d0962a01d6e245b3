use serde::{Deserialize, Serialize};

use crate::error::{AlignmentError, Result};

/// Minimum pupil separation for a numerically stable solve
pub const MIN_PUPIL_SEPARATION: f32 = 4.0;

/// A similarity transform: uniform scale, rotation, translation.
///
/// Maps source-image coordinates into target-image coordinates. Two point
/// correspondences constrain the transform exactly, so
/// [`Similarity::between_pairs`] is a closed-form solve, not a fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub scale: f32,
    /// Rotation in radians, counter-clockwise in a y-down image frame
    pub rotation: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Similarity {
    pub const IDENTITY: Similarity = Similarity {
        scale: 1.0,
        rotation: 0.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Solve for the transform mapping the source pair onto the target
    /// pair, treating points as complex numbers: `T(z) = a*z + b` with
    /// `a = (t1 - t0) / (s1 - s0)` and `b = t0 - a*s0`.
    pub fn between_pairs(
        source: ([f32; 2], [f32; 2]),
        target: ([f32; 2], [f32; 2]),
    ) -> Result<Similarity> {
        Self::between_pairs_with_minimum(source, target, MIN_PUPIL_SEPARATION)
    }

    pub fn between_pairs_with_minimum(
        (s0, s1): ([f32; 2], [f32; 2]),
        (t0, t1): ([f32; 2], [f32; 2]),
        minimum: f32,
    ) -> Result<Similarity> {
        let (sx, sy) = (s1[0] - s0[0], s1[1] - s0[1]);
        let (tx, ty) = (t1[0] - t0[0], t1[1] - t0[1]);

        let source_sep = (sx * sx + sy * sy).sqrt();
        let target_sep = (tx * tx + ty * ty).sqrt();
        for separation in [source_sep, target_sep] {
            if !separation.is_finite() || separation < minimum {
                return Err(AlignmentError::DegenerateCorrespondence {
                    separation,
                    minimum,
                });
            }
        }

        // a = t / s in complex arithmetic
        let denom = sx * sx + sy * sy;
        let a_re = (tx * sx + ty * sy) / denom;
        let a_im = (ty * sx - tx * sy) / denom;

        let scale = (a_re * a_re + a_im * a_im).sqrt();
        if !scale.is_finite() || scale <= 0.0 {
            return Err(AlignmentError::NonFiniteTransform { scale });
        }

        // b = t0 - a * s0
        let b_re = t0[0] - (a_re * s0[0] - a_im * s0[1]);
        let b_im = t0[1] - (a_im * s0[0] + a_re * s0[1]);

        Ok(Similarity {
            scale,
            rotation: a_im.atan2(a_re),
            tx: b_re,
            ty: b_im,
        })
    }

    fn linear_part(&self) -> (f32, f32) {
        let (sin, cos) = self.rotation.sin_cos();
        (self.scale * cos, self.scale * sin)
    }

    /// Map a source point into the target frame.
    pub fn apply(&self, point: [f32; 2]) -> [f32; 2] {
        let (a_re, a_im) = self.linear_part();
        [
            a_re * point[0] - a_im * point[1] + self.tx,
            a_im * point[0] + a_re * point[1] + self.ty,
        ]
    }

    /// The 2x3 affine matrix `[[a, -b, tx], [b, a, ty]]`.
    pub fn to_affine(&self) -> [[f32; 3]; 2] {
        let (a_re, a_im) = self.linear_part();
        [[a_re, -a_im, self.tx], [a_im, a_re, self.ty]]
    }

    /// The transform mapping target coordinates back to source.
    pub fn inverse(&self) -> Similarity {
        let (a_re, a_im) = self.linear_part();
        let norm = a_re * a_re + a_im * a_im;
        let inv_re = a_re / norm;
        let inv_im = -a_im / norm;
        Similarity {
            scale: 1.0 / self.scale,
            rotation: -self.rotation,
            tx: -(inv_re * self.tx - inv_im * self.ty),
            ty: -(inv_im * self.tx + inv_re * self.ty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f32 = 1e-4;

    fn assert_close(a: [f32; 2], b: [f32; 2], tol: f32) {
        assert!(
            (a[0] - b[0]).abs() < tol && (a[1] - b[1]).abs() < tol,
            "{a:?} !~ {b:?}"
        );
    }

    #[test]
    fn identical_pairs_give_identity() {
        let pair = ([100.0, 150.0], [140.0, 150.0]);
        let t = Similarity::between_pairs(pair, pair).unwrap();
        assert!((t.scale - 1.0).abs() < TOL);
        assert!(t.rotation.abs() < TOL);
        assert!(t.tx.abs() < TOL && t.ty.abs() < TOL);
    }

    #[test]
    fn scale_only_correspondence() {
        // before IPD 40, after IPD 72: aligning after onto before
        let after = ([80.0, 120.0], [152.0, 120.0]);
        let before = ([100.0, 150.0], [140.0, 150.0]);
        let t = Similarity::between_pairs(after, before).unwrap();

        assert!((t.scale - 40.0 / 72.0).abs() < 1e-3, "scale {}", t.scale);
        assert!(t.rotation.abs() < TOL);
        assert_close(t.apply([80.0, 120.0]), [100.0, 150.0], 0.01);
        assert_close(t.apply([152.0, 120.0]), [140.0, 150.0], 0.01);
    }

    #[test]
    fn rotation_correspondence_round_trips() {
        // source pair rotated 30 degrees and shifted
        let angle = 30.0_f32.to_radians();
        let (sin, cos) = angle.sin_cos();
        let s0 = [50.0, 50.0];
        let s1 = [110.0, 50.0];
        let rotate = |p: [f32; 2]| {
            [
                cos * p[0] - sin * p[1] + 13.0,
                sin * p[0] + cos * p[1] - 7.0,
            ]
        };
        let (t0, t1) = (rotate(s0), rotate(s1));

        let t = Similarity::between_pairs((s0, s1), (t0, t1)).unwrap();
        assert!((t.scale - 1.0).abs() < TOL);
        assert!((t.rotation - angle).abs() < TOL);
        assert_close(t.apply(s0), t0, 0.01);
        assert_close(t.apply(s1), t1, 0.01);
        // a third point follows the same rigid motion
        assert_close(t.apply([80.0, 90.0]), rotate([80.0, 90.0]), 0.01);
    }

    #[test]
    fn inverse_undoes_the_transform() {
        let t = Similarity::between_pairs(
            ([10.0, 20.0], [60.0, 35.0]),
            ([100.0, 220.0], [30.0, 190.0]),
        )
        .unwrap();
        let inv = t.inverse();
        for p in [[0.0, 0.0], [25.0, 40.0], [123.0, 7.0]] {
            assert_close(inv.apply(t.apply(p)), p, 0.01);
        }
    }

    #[test]
    fn coincident_pupils_are_degenerate() {
        let err = Similarity::between_pairs(
            ([50.0, 50.0], [50.0, 50.0]),
            ([10.0, 10.0], [90.0, 10.0]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::DegenerateCorrespondence { .. }
        ));
    }

    #[test]
    fn near_coincident_target_pair_is_degenerate() {
        let err = Similarity::between_pairs(
            ([10.0, 10.0], [90.0, 10.0]),
            ([50.0, 50.0], [52.0, 50.0]),
        )
        .unwrap_err();
        match err {
            AlignmentError::DegenerateCorrespondence { separation, minimum } => {
                assert!(separation < minimum);
            }
            other => panic!("expected DegenerateCorrespondence, got {other:?}"),
        }
    }

    #[test]
    fn affine_matrix_matches_apply() {
        let t = Similarity::between_pairs(
            ([10.0, 20.0], [60.0, 35.0]),
            ([100.0, 220.0], [30.0, 190.0]),
        )
        .unwrap();
        let m = t.to_affine();
        let p = [42.0, 17.0];
        let via_matrix = [
            m[0][0] * p[0] + m[0][1] * p[1] + m[0][2],
            m[1][0] * p[0] + m[1][1] * p[1] + m[1][2],
        ];
        assert_close(t.apply(p), via_matrix, 1e-3);
    }
}
