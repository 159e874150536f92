use std::cmp::Ordering;

use super::OcrRoom;
use crate::types::Room;

/// Relative tolerance of an area match.
const RELATIVE_TOLERANCE: f64 = 0.3;
/// Minimum absolute tolerance in m².
const MIN_TOLERANCE: f64 = 1.0;

/// Outcome of pairing OCR rooms with detected rooms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// `(ocr room number, index into the detected room list)`
    pub matched: Vec<(u32, usize)>,
    pub unmatched: Vec<OcrRoom>,
}

fn by_area_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Greedy pairing by area, largest OCR room first. Each OCR room takes the
/// unused detected room whose area is closest, if the difference is within
/// `max(30% of the OCR area, 1 m²)`. Matched rooms are annotated in place;
/// the order of `rooms` is preserved.
pub fn match_rooms_with_geometry(ocr_rooms: &[OcrRoom], rooms: &mut [Room]) -> ReconcileReport {
    let mut ocr_sorted = ocr_rooms.to_vec();
    ocr_sorted.sort_by(|a, b| by_area_desc(a.area, b.area).then(a.number.cmp(&b.number)));

    let mut candidates: Vec<usize> = (0..rooms.len()).collect();
    candidates.sort_by(|&a, &b| by_area_desc(rooms[a].area, rooms[b].area));

    for room in rooms.iter_mut() {
        room.number = None;
        room.ocr_area = None;
        room.matched = false;
    }

    let mut used = vec![false; rooms.len()];
    let mut report = ReconcileReport::default();

    for ocr in ocr_sorted {
        let tolerance = (ocr.area * RELATIVE_TOLERANCE).max(MIN_TOLERANCE);
        let mut best: Option<(usize, f64)> = None;
        for &index in &candidates {
            if used[index] {
                continue;
            }
            let diff = (rooms[index].area - ocr.area).abs();
            if diff <= tolerance && best.is_none_or(|(_, best_diff)| diff < best_diff) {
                best = Some((index, diff));
            }
        }

        match best {
            Some((index, _)) => {
                used[index] = true;
                let room = &mut rooms[index];
                room.number = Some(ocr.number);
                room.ocr_area = Some(ocr.area);
                room.matched = true;
                report.matched.push((ocr.number, index));
            }
            None => {
                tracing::warn!(number = ocr.number, area = ocr.area, "OCR room has no geometric counterpart");
                report.unmatched.push(ocr);
            }
        }
    }

    tracing::debug!(
        matched = report.matched.len(),
        unmatched = report.unmatched.len(),
        "reconciled OCR rooms"
    );
    report
}
