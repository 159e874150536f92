use serde::{Serialize, Serializer};

use crate::{
    format::{format_rooms, format_walls},
    metadata::{OcrRoom, ParsedMetadata, round_to},
    types::{Method, PlanGeometry, Room},
};

/// Rooms smaller than this are left out of the summed total area.
const MIN_COUNTED_AREA: f64 = 1.5;
/// Living rooms below this area do not count towards the apartment type.
const MIN_LIVING_AREA: f64 = 8.0;
/// OCR numbers above this suggest rooms of a communal apartment.
const COMMUNAL_NUMBER: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionStats {
    pub rooms_found: usize,
    pub living_rooms_found: usize,
    pub walls_found: usize,
    pub method: Method,
}

/// The successful output record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    /// Room text records, one per line
    pub rooms: String,
    /// Wall text records, one per line
    pub walls: String,
    pub area: Option<f64>,
    pub ceiling_height: Option<f64>,
    pub address: Option<String>,
    pub apartment_type: String,
    pub stats: RecognitionStats,
}

/// Outcome of one `recognize` call. Serializes as the result record with
/// `"success": true`, or as `{"success": false, "error": ...}`.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionOutcome {
    Success(RecognitionResult),
    Failure { error: String },
}

impl RecognitionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn result(&self) -> Option<&RecognitionResult> {
        match self {
            Self::Success(result) => Some(result),
            Self::Failure { .. } => None,
        }
    }
}

impl Serialize for RecognitionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Tagged<'a, T> {
            success: bool,
            #[serde(flatten)]
            body: &'a T,
        }

        #[derive(Serialize)]
        struct Failure<'a> {
            error: &'a str,
        }

        match self {
            Self::Success(result) => Tagged { success: true, body: result }.serialize(serializer),
            Self::Failure { error } => Tagged { success: false, body: &Failure { error } }.serialize(serializer),
        }
    }
}

/// Geometry, metadata and scale of one recognised plan, before it is
/// reduced to the text output record.
#[derive(Debug, Clone)]
pub struct RecognizedPlan {
    pub geometry: PlanGeometry,
    pub metadata: ParsedMetadata,
    pub scale: f64,
    pub method: Method,
    /// OCR rooms without a geometric counterpart
    pub unmatched: Vec<OcrRoom>,
}

impl RecognizedPlan {
    pub fn living_rooms_count(&self) -> usize {
        count_living_rooms(&self.geometry.rooms)
    }

    pub fn total_area(&self) -> Option<f64> {
        self.metadata.area.or_else(|| total_room_area(&self.geometry.rooms))
    }

    pub fn apartment_type(&self) -> &'static str {
        apartment_type(self.living_rooms_count(), &self.metadata.rooms)
    }

    pub fn to_result(&self) -> RecognitionResult {
        RecognitionResult {
            rooms: format_rooms(&self.geometry.rooms, self.scale),
            walls: format_walls(&self.geometry.walls, self.scale),
            area: self.total_area(),
            ceiling_height: self.metadata.ceiling_height.map(|h| round_to(h, 2)),
            address: self.metadata.address.clone(),
            apartment_type: self.apartment_type().to_string(),
            stats: RecognitionStats {
                rooms_found: self.geometry.rooms.len(),
                living_rooms_found: self.living_rooms_count(),
                walls_found: self.geometry.walls.len(),
                method: self.method,
            },
        }
    }
}

pub fn count_living_rooms(rooms: &[Room]) -> usize {
    rooms.iter().filter(|r| r.is_living_room && r.area >= MIN_LIVING_AREA).count()
}

/// Sum of room areas of at least 1.5 m², one decimal. `None` without rooms.
pub fn total_room_area(rooms: &[Room]) -> Option<f64> {
    if rooms.is_empty() {
        return None;
    }
    let sum: f64 = rooms.iter().map(|r| r.area).filter(|a| *a >= MIN_COUNTED_AREA).sum();
    Some(round_to(sum, 1))
}

pub fn apartment_type(living_rooms: usize, ocr_rooms: &[OcrRoom]) -> &'static str {
    let numbers: Vec<u32> = ocr_rooms.iter().map(|r| r.number).filter(|n| *n > 0).collect();
    let has_high_numbers = numbers.iter().any(|n| *n > COMMUNAL_NUMBER);
    let is_sequential = match (numbers.iter().min(), numbers.iter().max()) {
        (Some(min), Some(max)) if numbers.len() > 1 => (max - min) as usize == numbers.len() - 1,
        _ => false,
    };
    if has_high_numbers && !is_sequential {
        return "Комната в коммунальной квартире";
    }

    match living_rooms {
        0 => "Студия",
        1 => "1-комнатная",
        2 => "2-комнатная",
        3 => "3-комнатная",
        _ => "3+ комнатная",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ocr(numbers: &[u32]) -> Vec<OcrRoom> {
        numbers.iter().map(|&number| OcrRoom { number, area: 10.0 }).collect()
    }

    #[test]
    fn test_apartment_type_by_living_rooms() {
        assert_eq!(apartment_type(0, &[]), "Студия");
        assert_eq!(apartment_type(1, &ocr(&[1, 2])), "1-комнатная");
        assert_eq!(apartment_type(2, &[]), "2-комнатная");
        assert_eq!(apartment_type(3, &[]), "3-комнатная");
        assert_eq!(apartment_type(5, &[]), "3+ комнатная");
    }

    #[test]
    fn test_communal_apartment_detection() {
        assert_eq!(apartment_type(2, &ocr(&[14, 17])), "Комната в коммунальной квартире");
        assert_eq!(apartment_type(1, &ocr(&[21])), "Комната в коммунальной квартире");
        assert_eq!(apartment_type(3, &ocr(&[21, 22, 23])), "3-комнатная");
    }

    #[test]
    fn test_total_area_skips_small_rooms() {
        let rooms = vec![
            Room::from_bounds("a", 0.0, 0.0, 400.0, 400.0, 0.01),
            Room::from_bounds("b", 0.0, 0.0, 100.0, 100.0, 0.01),
            Room::from_bounds("c", 0.0, 0.0, 200.0, 150.0, 0.01),
        ];
        assert_eq!(total_room_area(&rooms), Some(19.0));
        assert_eq!(total_room_area(&[]), None);
    }

    #[test]
    fn test_outcome_serialization() {
        let failure = RecognitionOutcome::Failure { error: "boom".into() };
        let json = serde_json::to_value(&failure).expect("serializable");
        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));

        let success = RecognitionOutcome::Success(RecognitionResult {
            rooms: String::new(),
            walls: String::new(),
            area: Some(12.5),
            ceiling_height: None,
            address: None,
            apartment_type: "Студия".into(),
            stats: RecognitionStats {
                rooms_found: 1,
                living_rooms_found: 0,
                walls_found: 4,
                method: Method::Algorithmic,
            },
        });
        let json = serde_json::to_value(&success).expect("serializable");
        assert_eq!(json["success"], true);
        assert_eq!(json["apartmentType"], "Студия");
        assert_eq!(json["ceilingHeight"], serde_json::Value::Null);
        assert_eq!(json["stats"]["method"], "algorithmic");
        assert_eq!(json["stats"]["wallsFound"], 4);
    }
}
