use image::GrayImage;
use imageproc::contours::BorderType;

use crate::{error::Result, traits::ContourTracer, types::Contour};

/// Boundary tracer built on `imageproc`'s contour follower.
///
/// Only outer borders are kept: the silhouette product is the subject's
/// outer boundary, interior holes (between an arm and the torso, say) are
/// not part of it.
#[derive(Debug, Clone, Default)]
pub struct ImageprocContourTracer;

impl ContourTracer for ImageprocContourTracer {
    fn trace(&self, mask: &GrayImage) -> Result<Vec<Contour>> {
        let traced = imageproc::contours::find_contours::<i32>(mask);

        Ok(traced
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer)
            .map(|c| {
                Contour::new(
                    c.points
                        .iter()
                        .map(|p| [p.x as f32, p.y as f32])
                        .collect(),
                )
            })
            .collect())
    }
}
