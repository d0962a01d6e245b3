use image::{DynamicImage, Rgba, RgbaImage};

use crate::similarity::Similarity;

/// Resample `source` through `transform` onto a target canvas.
///
/// Each target pixel is inverse-mapped into the source and sampled
/// bilinearly with edge clamping; target pixels whose pre-image falls
/// outside the source become fully transparent, so the base photo stays
/// visible underneath once composited.
pub fn resample(
    source: &DynamicImage,
    transform: &Similarity,
    target_width: u32,
    target_height: u32,
) -> RgbaImage {
    let src = source.to_rgba8();
    let inverse = transform.inverse();
    let (src_w, src_h) = (src.width() as f32, src.height() as f32);

    let mut out = RgbaImage::new(target_width, target_height);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let [sx, sy] = inverse.apply([x as f32, y as f32]);
        if sx < 0.0 || sy < 0.0 || sx > src_w - 1.0 || sy > src_h - 1.0 {
            *px = Rgba([0, 0, 0, 0]);
        } else {
            *px = sample_bilinear(&src, sx, sy);
        }
    }
    out
}

fn sample_bilinear(src: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let max_x = src.width() - 1;
    let max_y = src.height() - 1;

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(max_x);
    let y1 = (y0 + 1).min(max_y);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = src.get_pixel(x0, y0);
    let p10 = src.get_pixel(x1, y0);
    let p01 = src.get_pixel(x0, y1);
    let p11 = src.get_pixel(x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
        let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round() as u8;
    }
    Rgba(out)
}
