use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// The subject's outer boundary as an ordered, closed point sequence in
/// image pixel space.
///
/// A valid contour has at least 3 points and its first and last points
/// coincide. Non-self-intersection is best-effort: degenerate rings and
/// non-finite coordinates are filtered out by the extraction pipeline,
/// but crossings are not hard-rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<[f32; 2]>,
}

impl Contour {
    pub fn new(points: Vec<[f32; 2]>) -> Self {
        Self { points }
    }

    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    /// Append the first point if the ring is not yet closed.
    pub fn close(&mut self) {
        if !self.is_closed()
            && let Some(first) = self.points.first().copied()
        {
            self.points.push(first);
        }
    }

    /// True when the ring has enough points to bound an area.
    pub fn is_valid(&self) -> bool {
        let distinct = if self.is_closed() {
            self.points.len().saturating_sub(1)
        } else {
            self.points.len()
        };
        distinct >= 3
            && self
                .points
                .iter()
                .all(|&[x, y]| x.is_finite() && y.is_finite())
    }

    pub fn to_linestring(&self) -> LineString<f32> {
        LineString::new(
            self.points
                .iter()
                .map(|&[x, y]| Coord { x, y })
                .collect(),
        )
    }

    pub fn to_polygon(&self) -> Polygon<f32> {
        Polygon::new(self.to_linestring(), vec![])
    }

    pub fn area(&self) -> f32 {
        use geo::Area;
        self.to_polygon().unsigned_area()
    }

    pub fn perimeter(&self) -> f32 {
        self.points
            .windows(2)
            .map(|w| {
                let dx = w[1][0] - w[0][0];
                let dy = w[1][1] - w[0][1];
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }

    pub fn bounding_box(&self) -> ([f32; 2], [f32; 2]) {
        let mut min = [f32::INFINITY, f32::INFINITY];
        let mut max = [f32::NEG_INFINITY, f32::NEG_INFINITY];
        for &[x, y] in &self.points {
            min[0] = min[0].min(x);
            min[1] = min[1].min(y);
            max[0] = max[0].max(x);
            max[1] = max[1].max(y);
        }
        (min, max)
    }
}
