//! # Floor Plan Recognition Library
//!
//! Recovers walls and rooms from a raster floor plan and annotates them with
//! the room numbers, areas and other facts printed on the plan.
//!
//! ## Core Features
//!
//! - **Trait-based Architecture**: preprocessors, segment extractors,
//!   segmentation models and text recognizers plug in through traits
//! - **Strategy Fallback**: an optional neural segmentation strategy is
//!   tried first, the scanline algorithm is always the last resort
//! - **Metadata Reconciliation**: OCR room numbers are matched to detected
//!   rooms by area
//! - **Text Records and GeoJSON**: output as the line-oriented wall/room
//!   records or as a GeoJSON feature collection
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use floorplan::{PlanDocument, Recognizer, load_plan_image};
//!
//! let recognizer = Recognizer::builder().with_scale(0.01).build();
//!
//! let image = load_plan_image("plan.png")?;
//! let document = PlanDocument::new(image).with_text("Масштаб 1:100\n21/18.2");
//! let outcome = recognizer.recognize(&document);
//!
//! println!("{}", serde_json::to_string_pretty(&outcome)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Configuration
//!
//! ```rust,no_run
//! use floorplan::{Recognizer, RecognizerConfig};
//!
//! let mut config = RecognizerConfig::default();
//! config.lines.min_length = 40;
//! config.walls.fill_missing_walls = true;
//!
//! let recognizer = Recognizer::builder().with_config(config).build();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod config;
pub mod traits;
pub mod algorithms;
pub mod metadata;
pub mod format;
pub mod pipeline;
pub mod io;

// Re-exports for convenience
pub use error::{PlanError, Result};
pub use types::{Method, Orientation, PlanGeometry, Point, Room, Segment, Wall, calculate_room_area};
pub use config::{DEFAULT_SCALE, RecognizerConfig, resolve_scale};
pub use traits::*;
pub use metadata::{OcrRoom, ParsedMetadata, match_rooms_with_geometry, parse_metadata};
pub use format::{format_rooms, format_walls};
pub use pipeline::{
    PlanDocument, RecognitionOutcome, RecognitionResult, RecognitionStats, RecognizedPlan, Recognizer,
    RecognizerBuilder,
};
pub use io::{load_plan_image, load_plan_image_from_base64, load_plan_image_from_bytes};

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// White sheet with a 4 px black rectangle outline; black spans
    /// x 200..700, y 200..550.
    fn outlined_plan() -> GrayImage {
        GrayImage::from_fn(1000, 800, |x, y| {
            let outer = (200..700).contains(&x) && (200..550).contains(&y);
            let inner = (204..696).contains(&x) && (204..546).contains(&y);
            if outer && !inner { Luma([0]) } else { Luma([255]) }
        })
    }

    struct LabelModel {
        labels: GrayImage,
    }

    impl SegmentationModel for LabelModel {
        fn segment_walls(&self, _image: &GrayImage) -> Result<GrayImage> {
            Ok(self.labels.clone())
        }

        fn segment_rooms(&self, _image: &GrayImage) -> Result<GrayImage> {
            Ok(self.labels.clone())
        }
    }

    struct UnavailableModel;

    impl SegmentationModel for UnavailableModel {
        fn segment_walls(&self, _image: &GrayImage) -> Result<GrayImage> {
            Err(PlanError::Model("weights not found".into()))
        }

        fn segment_rooms(&self, _image: &GrayImage) -> Result<GrayImage> {
            Err(PlanError::Model("weights not found".into()))
        }
    }

    #[test]
    fn test_outlined_rectangle_is_one_room() {
        let recognizer = Recognizer::builder().with_scale(0.01).build();
        let plan = recognizer.analyze(&PlanDocument::new(outlined_plan())).expect("one room");

        assert_eq!(plan.method, Method::Algorithmic);
        assert_eq!(plan.scale, 0.01);
        assert_eq!(plan.geometry.walls.len(), 4);
        assert!(plan.geometry.walls.iter().all(|w| w.load_bearing));

        assert_eq!(plan.geometry.rooms.len(), 1);
        let room = &plan.geometry.rooms[0];
        assert_eq!(room.name, "Комната 1");
        assert!(room.is_living_room);
        assert!(room.area > 16.5 && room.area < 18.0, "area {}", room.area);
    }

    #[test]
    fn test_text_metadata_drives_result() {
        let recognizer = Recognizer::builder().with_scale(0.02).build();
        let document = PlanDocument::new(outlined_plan()).with_text("масштаб 1:100\nH=2.70\n1/17.3");
        let outcome = recognizer.recognize(&document);

        let result = outcome.result().expect("recognized");
        assert!(result.rooms.starts_with("Комната 1:"));
        assert_eq!(result.walls.lines().count(), 4);
        assert!(result.walls.lines().all(|l| l.ends_with("; несущая; 0.40")));
        assert_eq!(result.area, Some(17.3));
        assert_eq!(result.ceiling_height, Some(2.7));
        assert_eq!(result.apartment_type, "1-комнатная");
        assert_eq!(result.stats.rooms_found, 1);
        assert_eq!(result.stats.living_rooms_found, 1);
        assert_eq!(result.stats.method, Method::Algorithmic);
    }

    #[test]
    fn test_unavailable_model_falls_back_to_algorithm() {
        let recognizer = Recognizer::builder()
            .with_segmentation_model(UnavailableModel)
            .with_scale(0.01)
            .build();
        let plan = recognizer.analyze(&PlanDocument::new(outlined_plan())).expect("fallback");
        assert_eq!(plan.method, Method::Algorithmic);
    }

    #[test]
    fn test_model_output_is_used_when_present() {
        let mut labels = GrayImage::new(600, 500);
        for y in 100..400 {
            for x in 100..500 {
                labels.put_pixel(x, y, Luma([1]));
            }
        }
        let recognizer = Recognizer::builder()
            .with_segmentation_model(LabelModel { labels })
            .build();
        let document = PlanDocument::new(GrayImage::from_pixel(600, 500, Luma([255])));
        let plan = recognizer.analyze(&document).expect("model geometry");

        assert_eq!(plan.method, Method::NeuralNetwork);
        assert_eq!(plan.scale, DEFAULT_SCALE);
        assert_eq!(plan.geometry.rooms.len(), 1);
        assert_eq!(plan.geometry.walls.len(), 4);
    }

    #[test]
    fn test_batch_results_keep_document_order() {
        let recognizer = Recognizer::builder().with_scale(0.01).build();
        let documents = vec![
            PlanDocument::new(outlined_plan()),
            PlanDocument::new(GrayImage::from_pixel(300, 300, Luma([255]))),
        ];
        let outcomes = recognizer.recognize_batch(&documents);
        assert!(outcomes[0].is_success());
        assert!(!outcomes[1].is_success());
    }
}
