//! Facts recovered from the printed text of a plan and their reconciliation
//! with detected room geometry.

pub mod parse;
pub mod reconcile;

pub use parse::parse_metadata;
pub use reconcile::{ReconcileReport, match_rooms_with_geometry};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Room number and area (m²) as printed on the plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OcrRoom {
    pub number: u32,
    pub area: f64,
}

/// Everything recognised in one document's text. All fields are optional;
/// text without recognisable patterns yields [`ParsedMetadata::default`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMetadata {
    /// Sorted by room number.
    pub rooms: Vec<OcrRoom>,
    /// Total area in m², one decimal.
    pub area: Option<f64>,
    pub address: Option<String>,
    /// Meters, two decimals.
    pub ceiling_height: Option<f64>,
    /// Pixel→meter factor taken from an `N:M` notation.
    pub scale: Option<f64>,
    pub apartment_number: Option<String>,
    pub floor: Option<u32>,
}

impl ParsedMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
