use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_antialiased_line_segment_mut, draw_filled_circle_mut};
use imageproc::pixelops::interpolate;
use serde::{Deserialize, Serialize};
use silhouette::Contour;

/// Which photo an overlay annotates. Each role gets a fixed, contrasting
/// hue so the two outlines stay readable when blended over one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayRole {
    Before,
    After,
}

impl OverlayRole {
    pub fn color(self) -> Rgba<u8> {
        match self {
            OverlayRole::Before => Rgba([0, 255, 255, 255]),  // cyan
            OverlayRole::After => Rgba([255, 0, 255, 255]),   // magenta
        }
    }
}

/// Pupil markers keep the palette of the original annotator
const PUPIL_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const PUPIL_LINE_COLOR: Rgba<u8> = Rgba([0, 80, 255, 255]);
const PUPIL_RADIUS: i32 = 3;

/// Rasterize a contour as a stroked, anti-aliased outline on a fully
/// transparent canvas.
pub fn render_outline(
    contour: &Contour,
    color: Rgba<u8>,
    width: u32,
    height: u32,
    stroke_width: u32,
) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    for segment in contour.points.windows(2) {
        draw_stroked_segment(&mut canvas, segment[0], segment[1], color, stroke_width);
    }
    canvas
}

/// Draw pupil markers and the inter-pupillary line onto an overlay.
pub fn draw_pupil_annotation(canvas: &mut RgbaImage, left: [f32; 2], right: [f32; 2]) {
    let l = (left[0].round() as i32, left[1].round() as i32);
    let r = (right[0].round() as i32, right[1].round() as i32);

    draw_antialiased_line_segment_mut(canvas, l, r, PUPIL_LINE_COLOR, interpolate);
    draw_filled_circle_mut(canvas, l, PUPIL_RADIUS, PUPIL_COLOR);
    draw_filled_circle_mut(canvas, r, PUPIL_RADIUS, PUPIL_COLOR);
}

/// Source-over alpha blend of `overlay` onto `base`, in place.
pub fn composite_over(base: &mut RgbaImage, overlay: &RgbaImage) {
    debug_assert_eq!(base.dimensions(), overlay.dimensions());
    for (dst, src) in base.pixels_mut().zip(overlay.pixels()) {
        let alpha = src[3] as f32 / 255.0;
        if alpha <= 0.0 {
            continue;
        }
        for c in 0..3 {
            dst[c] = (src[c] as f32 * alpha + dst[c] as f32 * (1.0 - alpha)).round() as u8;
        }
        dst[3] = dst[3].max(src[3]);
    }
}

/// Approximate a stroke by drawing parallel anti-aliased lines offset
/// along the segment normal.
fn draw_stroked_segment(
    canvas: &mut RgbaImage,
    p0: [f32; 2],
    p1: [f32; 2],
    color: Rgba<u8>,
    stroke_width: u32,
) {
    let (dx, dy) = (p1[0] - p0[0], p1[1] - p0[1]);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return;
    }
    let (nx, ny) = (-dy / len, dx / len);

    let half = (stroke_width.max(1) as f32 - 1.0) / 2.0;
    for k in 0..stroke_width.max(1) {
        let offset = k as f32 - half;
        let start = (
            (p0[0] + nx * offset).round() as i32,
            (p0[1] + ny * offset).round() as i32,
        );
        let end = (
            (p1[0] + nx * offset).round() as i32,
            (p1[1] + ny * offset).round() as i32,
        );
        draw_antialiased_line_segment_mut(canvas, start, end, color, interpolate);
    }
}
