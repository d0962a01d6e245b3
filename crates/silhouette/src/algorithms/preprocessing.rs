use image::GrayImage;
use imageproc::contrast::ThresholdType;

use crate::{error::Result, traits::MaskPreprocessor};

/// Binarizes the segmentation mask at a fixed level
#[derive(Debug, Clone)]
pub struct ThresholdPreprocessor {
    pub threshold: u8,
}

impl Default for ThresholdPreprocessor {
    fn default() -> Self {
        Self { threshold: 128 }
    }
}

impl MaskPreprocessor for ThresholdPreprocessor {
    fn preprocess(&self, mask: &GrayImage) -> Result<GrayImage> {
        Ok(imageproc::contrast::threshold(
            mask,
            self.threshold,
            ThresholdType::Binary,
        ))
    }
}

/// Gaussian blur to knock pixel-level noise out of the mask edge
#[derive(Debug, Clone)]
pub struct GaussianBlurPreprocessor {
    pub sigma: f32,
}

impl Default for GaussianBlurPreprocessor {
    fn default() -> Self {
        Self { sigma: 1.0 }
    }
}

impl MaskPreprocessor for GaussianBlurPreprocessor {
    fn preprocess(&self, mask: &GrayImage) -> Result<GrayImage> {
        Ok(imageproc::filter::gaussian_blur_f32(mask, self.sigma))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn threshold_binarizes() {
        let mut mask = GrayImage::new(4, 1);
        mask.put_pixel(0, 0, Luma([10u8]));
        mask.put_pixel(1, 0, Luma([127u8]));
        mask.put_pixel(2, 0, Luma([129u8]));
        mask.put_pixel(3, 0, Luma([255u8]));

        let out = ThresholdPreprocessor { threshold: 128 }
            .preprocess(&mask)
            .unwrap();
        let values: Vec<u8> = out.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![0, 0, 255, 255]);
    }
}
