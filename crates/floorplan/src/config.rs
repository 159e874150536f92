//! Tunable parameters for every stage of the recognition pipeline.
//!
//! All sections implement [`Default`] with the reference values, so a
//! partially filled TOML/JSON document is enough to override a single knob.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fallback pixel→meter factor (a 1:200 drawing) when neither the document
/// text nor the caller provide one.
pub const DEFAULT_SCALE: f64 = 0.005;

/// Picks the scale factor: OCR scale, then caller scale, then [`DEFAULT_SCALE`].
pub fn resolve_scale(ocr_scale: Option<f64>, caller_scale: Option<f64>) -> f64 {
    ocr_scale
        .filter(|s| s.is_finite() && *s > 0.0)
        .or(caller_scale.filter(|s| s.is_finite() && *s > 0.0))
        .unwrap_or(DEFAULT_SCALE)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Caller-provided pixel→meter factor, used when the text has no scale.
    pub scale: Option<f64>,
    pub preprocess: PreprocessConfig,
    pub lines: LineConfig,
    pub walls: WallConfig,
    pub rooms: RoomConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Gray level above which a pixel counts as paper.
    pub binary_threshold: u8,
    /// Rasters larger than this on either side are downscaled first.
    pub max_dimension: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            binary_threshold: 128,
            max_dimension: 2048,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LineConfig {
    /// Shortest run (pixels) kept as a segment.
    #[schemars(range(min = 1))]
    pub min_length: u32,
    /// Edge intensity a pixel must exceed to belong to a horizontal run.
    pub edge_threshold: u8,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            min_length: 50,
            edge_threshold: 110,
        }
    }
}

impl LineConfig {
    /// Longest below-threshold gap bridged inside a run.
    pub fn max_gap(&self) -> u32 {
        3.max((self.min_length as f64 * 0.05).floor() as u32)
    }

    /// Vertical strokes are fainter on scanned plans.
    pub fn vertical_threshold(&self) -> u8 {
        90.max(self.edge_threshold.saturating_sub(20))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WallConfig {
    /// Cross-axis distance below which segments merge into one wall.
    pub merge_distance: f64,
    pub dedupe_tolerance: f64,
    pub conflict_tolerance: f64,
    /// Run the load-bearing-first conflict pass after dedupe.
    pub remove_conflicts: bool,
    /// Walls longer than this (pixels) are flagged load-bearing.
    pub load_bearing_min_length: f64,
    /// Synthesize walls along room edges that have none.
    pub fill_missing_walls: bool,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            merge_distance: 5.0,
            dedupe_tolerance: 6.0,
            conflict_tolerance: 12.0,
            remove_conflicts: true,
            load_bearing_min_length: 200.0,
            fill_missing_walls: false,
        }
    }
}

/// Room detection and classification thresholds. Areas are in m², sizes in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RoomConfig {
    pub group_tolerance: f64,
    pub boundary_tolerance: f64,
    pub min_room_size_px: f64,
    pub min_room_size_ratio: f64,
    /// Largest share of the image a single candidate may cover.
    pub max_room_image_share: f64,
    pub min_space_area: f64,
    pub corridor_aspect_ratio: f64,
    pub corridor_max_area: f64,
    pub min_living_area: f64,
    pub max_room_area: f64,
    pub max_utility_area: f64,
    /// Spaces below this are merged into a neighbouring living room or dropped.
    pub fragment_max_area: f64,
    pub utility_max_aspect_ratio: f64,
    pub utility_min_area: f64,
    pub elongated_max_area: f64,
    pub elongated_aspect_ratio: f64,
    /// Bounding-box overlap above which the smaller space is a duplicate.
    pub duplicate_overlap_ratio: f64,
    pub adjacency_min_tolerance: f64,
    pub adjacency_size_ratio: f64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            group_tolerance: 5.0,
            boundary_tolerance: 15.0,
            min_room_size_px: 80.0,
            min_room_size_ratio: 0.08,
            max_room_image_share: 0.25,
            min_space_area: 1.5,
            corridor_aspect_ratio: 2.0,
            corridor_max_area: 10.0,
            min_living_area: 8.0,
            max_room_area: 50.0,
            max_utility_area: 6.0,
            fragment_max_area: 3.0,
            utility_max_aspect_ratio: 1.8,
            utility_min_area: 2.5,
            elongated_max_area: 4.0,
            elongated_aspect_ratio: 1.5,
            duplicate_overlap_ratio: 0.7,
            adjacency_min_tolerance: 20.0,
            adjacency_size_ratio: 0.15,
        }
    }
}

impl RoomConfig {
    pub fn min_room_width(&self, image_width: u32) -> f64 {
        self.min_room_size_px
            .max((image_width as f64 * self.min_room_size_ratio).floor())
    }

    pub fn min_room_height(&self, image_height: u32) -> f64 {
        self.min_room_size_px
            .max((image_height as f64 * self.min_room_size_ratio).floor())
    }
}
