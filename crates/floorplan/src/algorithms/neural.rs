//! Conversion of segmentation label maps into walls and rooms.
//!
//! Label maps come from an external [`SegmentationModel`](crate::traits::SegmentationModel)
//! and may be smaller than the plan raster; coordinates are scaled back to
//! raster pixels.

use std::collections::BTreeMap;

use image::GrayImage;
use crate::types::{Orientation, Room, Wall};

/// Thresholds for turning label maps into geometry. Run lengths are in
/// label-map pixels, the room area in raster pixels.
#[derive(Debug, Clone)]
pub struct LabelGeometryConfig {
    pub min_wall_run: u32,
    pub load_bearing_run: u32,
    pub min_room_area_px: f64,
    pub min_living_area: f64,
}

impl Default for LabelGeometryConfig {
    fn default() -> Self {
        Self {
            min_wall_run: 10,
            load_bearing_run: 100,
            min_room_area_px: 1000.0,
            min_living_area: 8.0,
        }
    }
}

/// Walls along class boundaries. A change of label between vertically
/// adjacent pixels is a horizontal wall pixel and vice versa.
pub fn walls_from_label_map(labels: &GrayImage, target_width: u32, target_height: u32, config: &LabelGeometryConfig) -> Vec<Wall> {
    let (width, height) = labels.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let sx = target_width as f64 / width as f64;
    let sy = target_height as f64 / height as f64;
    let mut walls = Vec::new();

    let mut emit = |orientation: Orientation, cross: u32, from: u32, to: u32| {
        let length = to - from;
        if length <= config.min_wall_run {
            return;
        }
        let load_bearing = length > config.load_bearing_run;
        walls.push(match orientation {
            Orientation::Horizontal => {
                Wall::axis_aligned(orientation, cross as f64 * sy, from as f64 * sx, to as f64 * sx, load_bearing)
            }
            Orientation::Vertical => {
                Wall::axis_aligned(orientation, cross as f64 * sx, from as f64 * sy, to as f64 * sy, load_bearing)
            }
        });
    };

    for y in 1..height {
        let mut start = None;
        for x in 0..width {
            let boundary = labels.get_pixel(x, y) != labels.get_pixel(x, y - 1);
            match (boundary, start) {
                (true, None) => start = Some(x),
                (false, Some(from)) => {
                    emit(Orientation::Horizontal, y, from, x);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(from) = start {
            emit(Orientation::Horizontal, y, from, width);
        }
    }

    for x in 1..width {
        let mut start = None;
        for y in 0..height {
            let boundary = labels.get_pixel(x, y) != labels.get_pixel(x - 1, y);
            match (boundary, start) {
                (true, None) => start = Some(y),
                (false, Some(from)) => {
                    emit(Orientation::Vertical, x, from, y);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(from) = start {
            emit(Orientation::Vertical, x, from, height);
        }
    }

    walls
}

/// One rectangular room per non-background label, from the label's bounding box.
pub fn rooms_from_label_map(
    labels: &GrayImage,
    target_width: u32,
    target_height: u32,
    scale: f64,
    config: &LabelGeometryConfig,
) -> Vec<Room> {
    let (width, height) = labels.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let sx = target_width as f64 / width as f64;
    let sy = target_height as f64 / height as f64;

    // label -> (min_x, min_y, max_x, max_y)
    let mut boxes: BTreeMap<u8, (u32, u32, u32, u32)> = BTreeMap::new();
    for (x, y, pixel) in labels.enumerate_pixels() {
        let label = pixel[0];
        if label == 0 {
            continue;
        }
        boxes
            .entry(label)
            .and_modify(|b| *b = (b.0.min(x), b.1.min(y), b.2.max(x), b.3.max(y)))
            .or_insert((x, y, x, y));
    }

    let mut rooms = Vec::new();
    for (min_x, min_y, max_x, max_y) in boxes.into_values() {
        let area_px = (max_x - min_x) as f64 * sx * (max_y - min_y) as f64 * sy;
        if area_px < config.min_room_area_px {
            continue;
        }
        let mut room = Room::from_bounds(
            format!("Комната {}", rooms.len() + 1),
            min_x as f64 * sx,
            min_y as f64 * sy,
            max_x as f64 * sx,
            max_y as f64 * sy,
            scale,
        );
        room.is_living_room = room.area >= config.min_living_area;
        rooms.push(room);
    }
    rooms
}
