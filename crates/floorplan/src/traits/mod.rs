use image::GrayImage;
use crate::{
    error::Result,
    types::{PlanGeometry, Segment},
};

/// Trait for raster preprocessing steps (resize, binarize, edge detection)
pub trait ImagePreprocessor: Send + Sync {
    /// Transform the input raster into the next stage's raster
    fn preprocess(&self, image: &GrayImage) -> GrayImage;
}

/// Trait for extracting straight wall candidates from an edge raster
pub trait SegmentExtractor: Send + Sync {
    /// Find candidate segments; an empty result is not an error
    fn extract_segments(&self, edges: &GrayImage) -> Vec<Segment>;
}

/// External neural segmentation model. Implementations own model loading
/// and inference; labels are per-pixel class ids, `0` is background.
pub trait SegmentationModel: Send + Sync {
    /// Label map whose class boundaries are walls
    fn segment_walls(&self, image: &GrayImage) -> Result<GrayImage>;

    /// Label map with one class id per room
    fn segment_rooms(&self, image: &GrayImage) -> Result<GrayImage>;
}

impl<M: SegmentationModel + ?Sized> SegmentationModel for Box<M> {
    fn segment_walls(&self, image: &GrayImage) -> Result<GrayImage> {
        (**self).segment_walls(image)
    }

    fn segment_rooms(&self, image: &GrayImage) -> Result<GrayImage> {
        (**self).segment_rooms(image)
    }
}

/// External text source (OCR engine or PDF text layer)
pub trait TextRecognizer: Send + Sync {
    fn recognize_text(&self, image: &GrayImage) -> Result<String>;
}

/// One way of turning a raster into walls and rooms
pub trait RecognitionStrategy: Send + Sync {
    /// Method label reported in the stats record
    fn method(&self) -> crate::types::Method;

    /// Recover the plan geometry; `scale` is the resolved pixel→meter factor
    fn recognize(&self, image: &GrayImage, scale: f64) -> Result<PlanGeometry>;
}
