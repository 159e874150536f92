use std::collections::HashSet;

use crate::{
    config::RoomConfig,
    types::{Orientation, Point, Room, Wall, aspect_ratio, calculate_room_area},
};

/// Walls sharing (approximately) one cross-axis coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct WallGroup {
    pub coord: f64,
    /// `(start, end)` extents along the group's axis.
    pub spans: Vec<(f64, f64)>,
}

/// Finds enclosed rectangles between walls and classifies them
#[derive(Debug, Clone, Default)]
pub struct RoomDetector {
    pub config: RoomConfig,
}

impl RoomDetector {
    pub fn new(config: RoomConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, walls: &[Wall], width: u32, height: u32, scale: f64) -> Vec<Room> {
        let spaces = detect_spaces(walls, width, height, scale, &self.config);
        let rooms = group_spaces_into_rooms(spaces, scale, &self.config);
        tracing::debug!(
            rooms = rooms.len(),
            living = rooms.iter().filter(|r| r.is_living_room).count(),
            "room detection finished"
        );
        rooms
    }
}

/// Groups walls of one orientation whose cross coordinates lie within
/// `tolerance` of the group's running mean.
pub fn group_walls_by_coordinate(walls: &[Wall], orientation: Orientation, tolerance: f64) -> Vec<WallGroup> {
    let mut sorted: Vec<&Wall> = walls.iter().filter(|w| w.orientation == orientation).collect();
    sorted.sort_by(|a, b| a.cross_coord().total_cmp(&b.cross_coord()));

    let mut groups: Vec<WallGroup> = Vec::new();
    for wall in sorted {
        let coord = wall.cross_coord();
        match groups.iter_mut().find(|g| (g.coord - coord).abs() <= tolerance) {
            Some(group) => {
                let n = group.spans.len() as f64;
                group.coord = (group.coord * n + coord) / (n + 1.0);
                group.spans.push(wall.span());
            }
            None => groups.push(WallGroup {
                coord,
                spans: vec![wall.span()],
            }),
        }
    }
    groups
}

/// Overlapping extents of at least `min_width` between two span lists.
pub fn find_span_overlaps(top: &[(f64, f64)], bottom: &[(f64, f64)], min_width: f64) -> Vec<(f64, f64)> {
    let mut overlaps = Vec::new();
    for &(top_start, top_end) in top {
        for &(bottom_start, bottom_end) in bottom {
            let left = top_start.max(bottom_start);
            let right = top_end.min(bottom_end);
            if right - left >= min_width {
                overlaps.push((left, right));
            }
        }
    }
    overlaps
}

/// True when a vertical group near `x` covers any part of `[top, bottom]`.
pub fn has_vertical_boundary(vertical: &[WallGroup], x: f64, top: f64, bottom: f64, tolerance: f64) -> bool {
    vertical
        .iter()
        .filter(|group| (group.coord - x).abs() <= tolerance)
        .flat_map(|group| group.spans.iter())
        .any(|&(start, end)| start.min(end) <= bottom + tolerance && start.max(end) >= top - tolerance)
}

/// Narrow, small rectangles are corridors or stairwells rather than rooms.
pub fn is_corridor(width_px: f64, height_px: f64, area_m2: f64, config: &RoomConfig) -> bool {
    aspect_ratio(width_px, height_px) > config.corridor_aspect_ratio && area_m2 < config.corridor_max_area
}

/// Candidate rectangles bounded above and below by horizontal wall groups
/// and on at least one side by a vertical group.
pub fn detect_spaces(walls: &[Wall], width: u32, height: u32, scale: f64, config: &RoomConfig) -> Vec<Room> {
    let horizontal = group_walls_by_coordinate(walls, Orientation::Horizontal, config.group_tolerance);
    let vertical = group_walls_by_coordinate(walls, Orientation::Vertical, config.group_tolerance);
    if horizontal.is_empty() || vertical.is_empty() {
        return Vec::new();
    }

    let min_width = config.min_room_width(width);
    let min_height = config.min_room_height(height);
    let max_area_px = width as f64 * height as f64 * config.max_room_image_share;

    let mut spaces: Vec<Room> = Vec::new();
    let mut keys: HashSet<(i64, i64, i64, i64)> = HashSet::new();
    let mut rejected = 0usize;

    for (i, top) in horizontal.iter().enumerate() {
        for bottom in &horizontal[i + 1..] {
            let height_px = bottom.coord - top.coord;
            if height_px < min_height {
                continue;
            }

            for (left, right) in find_span_overlaps(&top.spans, &bottom.spans, min_width) {
                let width_px = right - left;
                if width_px * height_px > max_area_px {
                    rejected += 1;
                    continue;
                }

                let tol = config.boundary_tolerance;
                if !has_vertical_boundary(&vertical, left, top.coord, bottom.coord, tol)
                    && !has_vertical_boundary(&vertical, right, top.coord, bottom.coord, tol)
                {
                    rejected += 1;
                    continue;
                }

                let space = Room::from_bounds(
                    format!("Помещение {}", spaces.len() + 1),
                    left,
                    top.coord,
                    right,
                    bottom.coord,
                    scale,
                );
                if is_corridor(width_px, height_px, space.area, config) || space.area < config.min_space_area {
                    rejected += 1;
                    continue;
                }

                let q = |v: f64| (v / 5.0).round() as i64;
                if !keys.insert((q(left), q(top.coord), q(right), q(bottom.coord))) {
                    continue;
                }
                spaces.push(space);
            }
        }
    }

    tracing::debug!(
        horizontal_groups = horizontal.len(),
        vertical_groups = vertical.len(),
        spaces = spaces.len(),
        rejected,
        "candidate spaces found"
    );
    spaces
}

/// Classifies candidate spaces into living rooms and utility rooms, merging
/// tiny fragments into neighbouring living rooms. Spaces are visited
/// largest-first.
pub fn group_spaces_into_rooms(spaces: Vec<Room>, scale: f64, config: &RoomConfig) -> Vec<Room> {
    let valid: Vec<Room> = spaces.into_iter().filter(|s| s.area >= config.min_space_area).collect();
    let sorted = remove_overlapping_spaces(valid, config.duplicate_overlap_ratio);

    let mut rooms: Vec<Room> = Vec::new();
    let mut processed = vec![false; sorted.len()];

    for (i, space) in sorted.iter().enumerate() {
        if space.area >= config.min_living_area && space.area <= config.max_room_area {
            let mut room = space.clone();
            room.is_living_room = true;
            rooms.push(room);
            processed[i] = true;
        }
    }

    for (i, space) in sorted.iter().enumerate() {
        if processed[i] {
            continue;
        }

        if space.area < config.fragment_max_area {
            let target = rooms.iter().position(|room| {
                room.is_living_room
                    && merged_bounds_area(room, space, scale) <= config.max_room_area
                    && are_spaces_adjacent(space, room, config)
            });
            if let Some(idx) = target {
                rooms[idx] = merge_spaces(&rooms[idx], space, scale);
            }
            continue;
        }

        if space.area <= config.max_utility_area {
            let ratio = space.aspect_ratio();
            let corridor_fragment = ratio > config.utility_max_aspect_ratio
                || space.area < config.utility_min_area
                || (space.area < config.elongated_max_area && ratio > config.elongated_aspect_ratio);
            if !corridor_fragment {
                let mut room = space.clone();
                room.is_living_room = false;
                rooms.push(room);
            }
            continue;
        }

        if space.area < config.min_living_area {
            let mut room = space.clone();
            room.is_living_room = true;
            rooms.push(room);
        }
    }

    let mut number = 1;
    for room in rooms.iter_mut().filter(|r| r.is_living_room) {
        room.name = format!("Комната {number}");
        number += 1;
    }
    rooms
}

/// Drops spaces whose bounding box mostly overlaps a larger kept space.
/// Output is sorted by area, largest first.
pub fn remove_overlapping_spaces(mut spaces: Vec<Room>, max_overlap: f64) -> Vec<Room> {
    spaces.sort_by(|a, b| b.area.total_cmp(&a.area));
    let mut kept: Vec<Room> = Vec::with_capacity(spaces.len());
    for space in spaces {
        if kept.iter().all(|existing| overlap_ratio(&space, existing) <= max_overlap) {
            kept.push(space);
        }
    }
    kept
}

/// Intersection area over the smaller bounding box area, in `[0, 1]`.
pub fn overlap_ratio(a: &Room, b: &Room) -> f64 {
    let (a_min_x, a_min_y, a_max_x, a_max_y) = a.bounds();
    let (b_min_x, b_min_y, b_max_x, b_max_y) = b.bounds();

    let overlap_x = (a_max_x.min(b_max_x) - a_min_x.max(b_min_x)).max(0.0);
    let overlap_y = (a_max_y.min(b_max_y) - a_min_y.max(b_min_y)).max(0.0);
    let smaller = ((a_max_x - a_min_x) * (a_max_y - a_min_y)).min((b_max_x - b_min_x) * (b_max_y - b_min_y));
    if smaller <= 0.0 {
        return 0.0;
    }
    overlap_x * overlap_y / smaller
}

/// Shares an edge: overlapping on one axis and touching on the other, with
/// a tolerance proportional to the spaces' size (at least
/// `adjacency_min_tolerance` pixels).
pub fn are_spaces_adjacent(a: &Room, b: &Room, config: &RoomConfig) -> bool {
    let avg_size = (a.width.max(a.height) + b.width.max(b.height)) / 2.0;
    let tol = (avg_size * config.adjacency_size_ratio).max(config.adjacency_min_tolerance);

    let (a_min_x, a_min_y, a_max_x, a_max_y) = a.bounds();
    let (b_min_x, b_min_y, b_max_x, b_max_y) = b.bounds();

    let x_overlap = !(a_max_x < b_min_x - tol || b_max_x < a_min_x - tol);
    let y_overlap = !(a_max_y < b_min_y - tol || b_max_y < a_min_y - tol);

    let stacked = x_overlap && ((a_min_y - b_max_y).abs() < tol || (b_min_y - a_max_y).abs() < tol);
    let side_by_side = y_overlap && ((a_max_x - b_min_x).abs() < tol || (b_max_x - a_min_x).abs() < tol);
    stacked || side_by_side
}

fn union_bounds(a: &Room, b: &Room) -> (f64, f64, f64, f64) {
    let (a_min_x, a_min_y, a_max_x, a_max_y) = a.bounds();
    let (b_min_x, b_min_y, b_max_x, b_max_y) = b.bounds();
    (a_min_x.min(b_min_x), a_min_y.min(b_min_y), a_max_x.max(b_max_x), a_max_y.max(b_max_y))
}

fn merged_bounds_area(a: &Room, b: &Room, scale: f64) -> f64 {
    let (min_x, min_y, max_x, max_y) = union_bounds(a, b);
    let corners = [
        Point::new(min_x, min_y),
        Point::new(max_x, min_y),
        Point::new(max_x, max_y),
        Point::new(min_x, max_y),
    ];
    calculate_room_area(&corners, scale)
}

/// Bounding-box union; keeps the name and classification of `room`.
fn merge_spaces(room: &Room, fragment: &Room, scale: f64) -> Room {
    let (min_x, min_y, max_x, max_y) = union_bounds(room, fragment);
    let mut merged = Room::from_bounds(room.name.clone(), min_x, min_y, max_x, max_y, scale);
    merged.is_living_room = room.is_living_room;
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: f64 = 0.01;

    fn rectangle_walls(left: f64, top: f64, right: f64, bottom: f64) -> Vec<Wall> {
        vec![
            Wall::axis_aligned(Orientation::Horizontal, top, left, right, true),
            Wall::axis_aligned(Orientation::Horizontal, bottom, left, right, true),
            Wall::axis_aligned(Orientation::Vertical, left, top, bottom, true),
            Wall::axis_aligned(Orientation::Vertical, right, top, bottom, true),
        ]
    }

    fn space(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Room {
        Room::from_bounds("Помещение", min_x, min_y, max_x, max_y, SCALE)
    }

    #[test]
    fn test_single_rectangle_is_one_living_room() {
        // 6 m × 4 m at 1 cm per pixel
        let walls = rectangle_walls(100.0, 100.0, 700.0, 500.0);
        let rooms = RoomDetector::default().detect(&walls, 1200, 1000, SCALE);
        assert_eq!(rooms.len(), 1);
        let room = &rooms[0];
        assert!((room.area - 24.0).abs() <= 0.2);
        assert!(room.is_living_room);
        assert_eq!(room.name, "Комната 1");
        assert_eq!(room.width, 600.0);
        assert_eq!(room.height, 400.0);
    }

    #[test]
    fn test_no_vertical_walls_yields_nothing() {
        let walls = vec![
            Wall::axis_aligned(Orientation::Horizontal, 100.0, 0.0, 600.0, true),
            Wall::axis_aligned(Orientation::Horizontal, 500.0, 0.0, 600.0, true),
        ];
        assert!(RoomDetector::default().detect(&walls, 1200, 1000, SCALE).is_empty());
        assert!(RoomDetector::default().detect(&[], 1200, 1000, SCALE).is_empty());
    }

    #[test]
    fn test_whole_plan_rectangle_is_rejected() {
        // covers more than a quarter of the raster
        let walls = rectangle_walls(50.0, 50.0, 950.0, 750.0);
        assert!(RoomDetector::default().detect(&walls, 1000, 800, SCALE).is_empty());
    }

    #[test]
    fn test_partition_splits_two_rooms() {
        let mut walls = rectangle_walls(100.0, 100.0, 900.0, 500.0);
        walls.push(Wall::axis_aligned(Orientation::Vertical, 500.0, 100.0, 500.0, false));
        // split the horizontal walls so each room has its own spans
        walls[0] = Wall::axis_aligned(Orientation::Horizontal, 100.0, 100.0, 500.0, true);
        walls[1] = Wall::axis_aligned(Orientation::Horizontal, 500.0, 100.0, 500.0, true);
        walls.push(Wall::axis_aligned(Orientation::Horizontal, 100.0, 500.0, 900.0, true));
        walls.push(Wall::axis_aligned(Orientation::Horizontal, 500.0, 500.0, 900.0, true));

        let rooms = RoomDetector::default().detect(&walls, 1600, 1200, SCALE);
        assert_eq!(rooms.len(), 2);
        assert!(rooms.iter().all(|r| r.is_living_room && (r.area - 16.0).abs() < 1e-6));
        let names: Vec<_> = rooms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Комната 1", "Комната 2"]);
    }

    #[test]
    fn test_corridor_shape_is_discarded() {
        let config = RoomConfig::default();
        // 45 × 300 px, 9 m²
        assert!(is_corridor(45.0, 300.0, 9.0, &config));
        assert!(!is_corridor(45.0, 300.0, 12.0, &config));
        assert!(!is_corridor(200.0, 300.0, 9.0, &config));
    }

    #[test]
    fn test_classification_bands() {
        let config = RoomConfig::default();
        let spaces = vec![
            space(0.0, 0.0, 400.0, 300.0),       // 12 m² living
            space(1000.0, 0.0, 1250.0, 280.0),   // 7 m² kitchen
            space(2000.0, 0.0, 2180.0, 200.0),   // 3.6 m² bath
            space(3000.0, 0.0, 3100.0, 400.0),   // 4 m², aspect 4: corridor
            space(4000.0, 0.0, 4800.0, 700.0),   // 56 m²: artifact
            space(5000.0, 0.0, 5100.0, 200.0),   // 2 m² isolated fragment
        ];
        let rooms = group_spaces_into_rooms(spaces, SCALE, &config);
        assert_eq!(rooms.len(), 3);

        assert!(rooms[0].is_living_room);
        assert!((rooms[0].area - 12.0).abs() < 1e-9);
        assert_eq!(rooms[0].name, "Комната 1");

        assert!(rooms[1].is_living_room);
        assert!((rooms[1].area - 7.0).abs() < 1e-9);
        assert_eq!(rooms[1].name, "Комната 2");

        assert!(!rooms[2].is_living_room);
        assert!((rooms[2].area - 3.6).abs() < 1e-9);
        assert_eq!(rooms[2].name, "Помещение");
    }

    #[test]
    fn test_fragment_merges_into_adjacent_living_room() {
        let config = RoomConfig::default();
        let living = space(0.0, 0.0, 400.0, 300.0);
        let fragment = space(400.0, 0.0, 520.0, 200.0); // 2.4 m²
        let rooms = group_spaces_into_rooms(vec![fragment, living], SCALE, &config);
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].bounds(), (0.0, 0.0, 520.0, 300.0));
        assert!((rooms[0].area - 15.6).abs() < 1e-9);
        assert!(rooms[0].is_living_room);
    }

    #[test]
    fn test_fragment_dropped_when_merge_exceeds_max_area() {
        let config = RoomConfig::default();
        let living = space(0.0, 0.0, 700.0, 700.0); // 49 m²
        let fragment = space(700.0, 0.0, 800.0, 200.0); // 2 m², union 56 m²
        let rooms = group_spaces_into_rooms(vec![fragment, living.clone()], SCALE, &config);
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].bounds(), living.bounds());
        assert!((rooms[0].area - 49.0).abs() < 1e-9);
    }

    #[test]
    fn test_near_duplicate_spaces_keep_larger() {
        let big = space(0.0, 0.0, 400.0, 300.0);
        let dup = space(10.0, 10.0, 400.0, 300.0);
        let kept = remove_overlapping_spaces(vec![dup, big.clone()], 0.7);
        assert_eq!(kept, vec![big]);
    }

    #[test]
    fn test_grouping_averages_coordinates() {
        let walls = vec![
            Wall::axis_aligned(Orientation::Horizontal, 100.0, 0.0, 50.0, false),
            Wall::axis_aligned(Orientation::Horizontal, 104.0, 60.0, 90.0, false),
            Wall::axis_aligned(Orientation::Horizontal, 300.0, 0.0, 90.0, false),
        ];
        let groups = group_walls_by_coordinate(&walls, Orientation::Horizontal, 5.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].coord, 102.0);
        assert_eq!(groups[0].spans, vec![(0.0, 50.0), (60.0, 90.0)]);
        assert_eq!(groups[1].coord, 300.0);
    }
}
