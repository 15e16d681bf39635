use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use crate::{
    config::sigma_for_kernel,
    error::{Result, ShapeError},
    traits::ImagePreprocessor,
};

/// Global thresholding preprocessor
///
/// Pixels strictly above `threshold` become 255 and the rest 0. With `inverse`
/// set the polarity flips, so dark strokes on a light page become foreground.
#[derive(Debug, Clone)]
pub struct ThresholdPreprocessor {
    pub threshold: u8,
    pub inverse: bool,
}

impl ThresholdPreprocessor {
    pub fn binary(threshold: u8) -> Self {
        Self { threshold, inverse: false }
    }

    pub fn inverse(threshold: u8) -> Self {
        Self { threshold, inverse: true }
    }
}

impl Default for ThresholdPreprocessor {
    fn default() -> Self {
        Self::binary(127)
    }
}

impl ImagePreprocessor for ThresholdPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let mut binary = imageproc::contrast::threshold(image, self.threshold);
        if self.inverse {
            image::imageops::invert(&mut binary);
        }
        Ok(binary)
    }
}

/// Single-channel copy of `image` using the BT.601 weights
/// (0.299 R + 0.587 G + 0.114 B) in 14-bit fixed point.
///
/// Gray input passes through unchanged.
pub fn to_gray(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let weighted = r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868;
        Luma([((weighted + (1 << 13)) >> 14) as u8])
    })
}

/// Gaussian blur over a fixed square kernel
///
/// The kernel is exactly `kernel_size` taps wide in each direction; the sigma
/// follows from the size.
#[derive(Debug, Clone)]
pub struct GaussianBlurPreprocessor {
    pub kernel_size: u32,
}

impl GaussianBlurPreprocessor {
    pub fn sigma(&self) -> f32 {
        sigma_for_kernel(self.kernel_size)
    }

    /// Normalized 1-D weights, `kernel_size` long.
    pub fn kernel(&self) -> Vec<f32> {
        let sigma = self.sigma();
        let center = (self.kernel_size / 2) as f32;
        let weights: Vec<f32> = (0..self.kernel_size)
            .map(|i| {
                let d = i as f32 - center;
                (-(d * d) / (2.0 * sigma * sigma)).exp()
            })
            .collect();
        let sum: f32 = weights.iter().sum();
        weights.into_iter().map(|w| w / sum).collect()
    }
}

impl Default for GaussianBlurPreprocessor {
    fn default() -> Self {
        Self { kernel_size: 5 }
    }
}

impl ImagePreprocessor for GaussianBlurPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        if self.kernel_size % 2 == 0 {
            return Err(ShapeError::InvalidConfig(format!(
                "blur kernel size must be odd, got {}",
                self.kernel_size
            )));
        }
        if self.kernel_size == 1 {
            return Ok(image.clone());
        }
        let wide: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
                Luma([image.get_pixel(x, y)[0] as f32])
            });
        let blurred = imageproc::filter::separable_filter_equal(&wide, &self.kernel());
        Ok(GrayImage::from_fn(image.width(), image.height(), |x, y| {
            Luma([blurred.get_pixel(x, y)[0].round().clamp(0.0, 255.0) as u8])
        }))
    }
}

/// Canny edge detector with dual-threshold hysteresis
///
/// `imageproc::edges::canny` smooths with its own sigma 1.4 Gaussian before
/// taking gradients, on top of any blur earlier in the chain.
#[derive(Debug, Clone)]
pub struct CannyPreprocessor {
    pub low: f32,
    pub high: f32,
}

impl Default for CannyPreprocessor {
    fn default() -> Self {
        Self { low: 50.0, high: 150.0 }
    }
}

impl ImagePreprocessor for CannyPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        if self.low > self.high {
            return Err(ShapeError::InvalidConfig(format!(
                "canny low threshold {} exceeds high threshold {}",
                self.low, self.high
            )));
        }
        Ok(imageproc::edges::canny(image, self.low, self.high))
    }
}
