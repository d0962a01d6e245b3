use geo::{ChaikinSmoothing, Simplify};

use crate::{error::Result, traits::ContourPostProcessor, types::Contour};

/// Douglas-Peucker decimation via the geo crate.
///
/// Runs after smoothing to keep the point count bounded without visibly
/// changing the silhouette shape.
#[derive(Debug, Clone)]
pub struct DouglasPeuckerSimplifier {
    pub tolerance: f32,
}

impl Default for DouglasPeuckerSimplifier {
    fn default() -> Self {
        Self { tolerance: 1.5 }
    }
}

impl ContourPostProcessor for DouglasPeuckerSimplifier {
    fn process(&self, contour: &mut Contour) -> Result<()> {
        let simplified = contour.to_linestring().simplify(&self.tolerance);
        contour.points = simplified.coords().map(|c| [c.x, c.y]).collect();
        contour.close();
        Ok(())
    }
}

/// Chaikin corner-cutting to round off jagged pixel-level steps
#[derive(Debug, Clone)]
pub struct ChaikinSmoother {
    pub iterations: usize,
}

impl Default for ChaikinSmoother {
    fn default() -> Self {
        Self { iterations: 1 }
    }
}

impl ContourPostProcessor for ChaikinSmoother {
    fn process(&self, contour: &mut Contour) -> Result<()> {
        if contour.points.is_empty() {
            return Ok(());
        }
        let smoothed = contour.to_linestring().chaikin_smoothing(self.iterations);
        contour.points = smoothed.coords().map(|c| [c.x, c.y]).collect();
        contour.close();
        Ok(())
    }
}

/// Drops non-finite coordinates and enforces the closed-ring invariant
#[derive(Debug, Clone, Default)]
pub struct RingValidator;

impl ContourPostProcessor for RingValidator {
    fn process(&self, contour: &mut Contour) -> Result<()> {
        contour
            .points
            .retain(|&[x, y]| x.is_finite() && y.is_finite());
        contour.close();
        Ok(())
    }
}
