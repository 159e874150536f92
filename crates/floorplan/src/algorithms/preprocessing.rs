use image::{GrayImage, Luma, imageops::FilterType};
use crate::{config::PreprocessConfig, traits::ImagePreprocessor};

/// Downscales rasters whose larger side exceeds `max_dimension`
#[derive(Debug, Clone)]
pub struct ResizePreprocessor {
    pub max_dimension: u32,
}

impl Default for ResizePreprocessor {
    fn default() -> Self {
        Self { max_dimension: 2048 }
    }
}

impl ImagePreprocessor for ResizePreprocessor {
    fn preprocess(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        if self.max_dimension == 0 || (width <= self.max_dimension && height <= self.max_dimension) {
            return image.clone();
        }

        let factor = (self.max_dimension as f64 / width as f64).min(self.max_dimension as f64 / height as f64);
        let new_width = ((width as f64 * factor).floor() as u32).max(1);
        let new_height = ((height as f64 * factor).floor() as u32).max(1);
        tracing::debug!(width, height, new_width, new_height, "downscaling plan raster");
        image::imageops::resize(image, new_width, new_height, FilterType::Triangle)
    }
}

/// Simple thresholding preprocessor
#[derive(Debug, Clone)]
pub struct ThresholdPreprocessor {
    pub threshold: u8,
}

impl Default for ThresholdPreprocessor {
    fn default() -> Self {
        Self { threshold: 128 }
    }
}

impl ImagePreprocessor for ThresholdPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> GrayImage {
        imageproc::contrast::threshold(image, self.threshold)
    }
}

/// Sobel gradient magnitude, saturated to 8 bits
#[derive(Debug, Clone, Default)]
pub struct SobelEdgePreprocessor;

impl ImagePreprocessor for SobelEdgePreprocessor {
    fn preprocess(&self, image: &GrayImage) -> GrayImage {
        let gradients = imageproc::gradients::sobel_gradients(image);
        GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let magnitude = gradients.get_pixel(x, y)[0];
            Luma([magnitude.min(u8::MAX as u16) as u8])
        })
    }
}

/// The default preparation chain: resize, binarize, edge-detect.
pub fn default_preprocessors(config: &PreprocessConfig) -> Vec<Box<dyn ImagePreprocessor>> {
    vec![
        Box::new(ResizePreprocessor { max_dimension: config.max_dimension }),
        Box::new(ThresholdPreprocessor { threshold: config.binary_threshold }),
        Box::new(SobelEdgePreprocessor),
    ]
}
