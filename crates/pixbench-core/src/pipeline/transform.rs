//! The fixed four-stage chain: grayscale, half-size, 5x5 Gaussian blur, Canny.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;
use std::path::Path;

use super::outputs::Stage;
use crate::error::TransformError;

/// Side length of the square Gaussian kernel.
pub const BLUR_KERNEL_SIZE: usize = 5;

/// Canny hysteresis thresholds.
pub const CANNY_LOW_THRESHOLD: f32 = 50.0;
pub const CANNY_HIGH_THRESHOLD: f32 = 150.0;

/// The four stage outputs of one image.
pub struct StageImages {
    /// Grayscale at source size
    pub gray: GrayImage,
    /// Grayscale at half size
    pub resized: GrayImage,
    /// Blurred half-size grayscale
    pub blurred: GrayImage,
    /// Edge map of the blurred image
    pub edges: GrayImage,
}

impl StageImages {
    /// Run the full chain on a decoded image.
    ///
    /// The half-size dimensions are floor(w/2) x floor(h/2) of the grayscale
    /// image; an image that would shrink to zero in either dimension fails.
    pub fn from_image(path: &Path, image: &DynamicImage) -> Result<Self, TransformError> {
        let gray = image.to_luma8();

        let (width, height) = (gray.width() / 2, gray.height() / 2);
        if width == 0 || height == 0 {
            return Err(TransformError::Transform {
                path: path.to_path_buf(),
                message: format!(
                    "{}x{} image is too small to downscale by half",
                    gray.width(),
                    gray.height()
                ),
            });
        }
        let resized = imageops::resize(&gray, width, height, FilterType::Triangle);

        let kernel = gaussian_kernel(BLUR_KERNEL_SIZE);
        let blurred = separable_filter_equal(&resized, kernel.as_slice());

        let edges = canny(&blurred, CANNY_LOW_THRESHOLD, CANNY_HIGH_THRESHOLD);

        Ok(Self {
            gray,
            resized,
            blurred,
            edges,
        })
    }

    /// Output image for one stage.
    pub fn get(&self, stage: Stage) -> &GrayImage {
        match stage {
            Stage::Gray => &self.gray,
            Stage::Resized => &self.resized,
            Stage::Blurred => &self.blurred,
            Stage::Edges => &self.edges,
        }
    }
}

/// Standard deviation used for a Gaussian kernel of `size` taps when none is
/// given explicitly.
pub fn default_sigma(size: usize) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian kernel of `size` taps with [`default_sigma`].
pub fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = default_sigma(size);
    let center = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - center;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn path() -> &'static Path {
        Path::new("test.png")
    }

    #[test]
    fn test_default_sigma_for_5x5() {
        assert!((default_sigma(5) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(BLUR_KERNEL_SIZE);
        assert_eq!(kernel.len(), 5);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((kernel[0] - kernel[4]).abs() < 1e-6);
        assert!((kernel[1] - kernel[3]).abs() < 1e-6);
        assert!(kernel[2] > kernel[1] && kernel[1] > kernel[0]);
    }

    #[test]
    fn test_stage_dimensions() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(641, 479));
        let stages = StageImages::from_image(path(), &image).unwrap();

        assert_eq!(stages.gray.dimensions(), (641, 479));
        assert_eq!(stages.resized.dimensions(), (320, 239));
        assert_eq!(stages.blurred.dimensions(), (320, 239));
        assert_eq!(stages.edges.dimensions(), (320, 239));
    }

    #[test]
    fn test_too_small_image_is_transform_error() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(1, 40));
        let err = StageImages::from_image(path(), &image)
            .err()
            .expect("1px wide image cannot be halved");
        assert!(!err.is_decode());
        assert!(matches!(err, TransformError::Transform { .. }));
    }

    #[test]
    fn test_uniform_image_has_no_edges() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([90, 120, 200])));
        let stages = StageImages::from_image(path(), &image).unwrap();
        assert!(stages.edges.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_step_image_has_edges() {
        let image = RgbImage::from_fn(128, 128, |x, _| {
            if x < 64 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let stages = StageImages::from_image(path(), &DynamicImage::ImageRgb8(image)).unwrap();
        assert!(stages.edges.pixels().any(|p| p[0] == 255));
    }

    #[test]
    fn test_blur_keeps_flat_regions() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(32, 32, Luma([77])));
        let stages = StageImages::from_image(path(), &image).unwrap();
        assert!(stages.blurred.pixels().all(|p| p[0].abs_diff(77) <= 1));
    }

    #[test]
    fn test_chain_is_deterministic() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(50, 30, |x, y| {
            Rgb([(x * 5) as u8, (y * 8) as u8, ((x + y) * 3) as u8])
        }));
        let a = StageImages::from_image(path(), &image).unwrap();
        let b = StageImages::from_image(path(), &image).unwrap();
        for stage in Stage::ALL {
            assert_eq!(a.get(stage).as_raw(), b.get(stage).as_raw());
        }
    }
}
