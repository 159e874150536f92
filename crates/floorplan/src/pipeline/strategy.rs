use image::GrayImage;

use crate::{
    algorithms::{
        LabelGeometryConfig, RoomDetector, ScanlineExtractor, WallAssembler, default_preprocessors,
        remove_wall_conflicts, rooms_from_label_map, walls_from_label_map,
    },
    config::RecognizerConfig,
    error::{PlanError, Result},
    traits::{ImagePreprocessor, RecognitionStrategy, SegmentExtractor, SegmentationModel},
    types::{Method, PlanGeometry},
};

/// Edge raster → scanline segments → walls → rooms.
pub struct AlgorithmicStrategy {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    extractor: Box<dyn SegmentExtractor>,
    assembler: WallAssembler,
    detector: RoomDetector,
}

impl AlgorithmicStrategy {
    pub fn new(
        preprocessors: Vec<Box<dyn ImagePreprocessor>>,
        extractor: Box<dyn SegmentExtractor>,
        assembler: WallAssembler,
        detector: RoomDetector,
    ) -> Self {
        Self {
            preprocessors,
            extractor,
            assembler,
            detector,
        }
    }

    pub fn from_config(config: &RecognizerConfig) -> Self {
        Self::new(
            default_preprocessors(&config.preprocess),
            Box::new(ScanlineExtractor::new(config.lines.clone())),
            WallAssembler::new(config.walls.clone()),
            RoomDetector::new(config.rooms.clone()),
        )
    }
}

impl RecognitionStrategy for AlgorithmicStrategy {
    fn method(&self) -> Method {
        Method::Algorithmic
    }

    fn recognize(&self, image: &GrayImage, scale: f64) -> Result<PlanGeometry> {
        let mut edges = image.clone();
        for preprocessor in &self.preprocessors {
            edges = preprocessor.preprocess(&edges);
        }
        let (width, height) = edges.dimensions();

        let segments = self.extractor.extract_segments(&edges);
        tracing::debug!(segments = segments.len(), width, height, "segments extracted");

        let walls = self.assembler.assemble(&segments);
        let rooms = self.detector.detect(&walls, width, height, scale);
        if rooms.is_empty() {
            return Err(PlanError::NoRoomsFound);
        }

        let walls = if self.assembler.config.fill_missing_walls {
            self.assembler.fill_missing(walls, &rooms, scale)
        } else {
            walls
        };

        Ok(PlanGeometry {
            walls,
            rooms,
            image_width: width,
            image_height: height,
        })
    }
}

/// Walls and rooms from the label maps of an external segmentation model.
pub struct NeuralStrategy<M> {
    model: M,
    labels: LabelGeometryConfig,
    conflict_tolerance: f64,
}

impl<M: SegmentationModel> NeuralStrategy<M> {
    pub fn new(model: M, config: &RecognizerConfig) -> Self {
        Self {
            model,
            labels: LabelGeometryConfig {
                min_living_area: config.rooms.min_living_area,
                ..LabelGeometryConfig::default()
            },
            conflict_tolerance: config.walls.conflict_tolerance,
        }
    }
}

impl<M: SegmentationModel> RecognitionStrategy for NeuralStrategy<M> {
    fn method(&self) -> Method {
        Method::NeuralNetwork
    }

    fn recognize(&self, image: &GrayImage, scale: f64) -> Result<PlanGeometry> {
        let (width, height) = image.dimensions();

        let wall_labels = self.model.segment_walls(image)?;
        let walls = walls_from_label_map(&wall_labels, width, height, &self.labels);
        let walls = remove_wall_conflicts(walls, self.conflict_tolerance);

        let room_labels = self.model.segment_rooms(image)?;
        let rooms = rooms_from_label_map(&room_labels, width, height, scale, &self.labels);

        let geometry = PlanGeometry {
            walls,
            rooms,
            image_width: width,
            image_height: height,
        };
        if geometry.is_empty() {
            return Err(PlanError::EmptyGeometry(self.method().to_string()));
        }
        Ok(geometry)
    }
}
