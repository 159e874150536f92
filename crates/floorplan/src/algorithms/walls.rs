use crate::{
    config::WallConfig,
    types::{Orientation, Room, Segment, Wall},
};

/// Which wall survives when two overlapping walls are folded together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapPriority {
    /// Earlier walls absorb later ones.
    InputOrder,
    /// Load-bearing walls are visited first and absorb partitions.
    LoadBearingFirst,
}

/// Turns raw segments into the canonical wall list
#[derive(Debug, Clone, Default)]
pub struct WallAssembler {
    pub config: WallConfig,
}

impl WallAssembler {
    pub fn new(config: WallConfig) -> Self {
        Self { config }
    }

    /// Merge, dedupe and (optionally) conflict passes in that order.
    pub fn assemble(&self, segments: &[Segment]) -> Vec<Wall> {
        let merged = group_lines_into_walls(segments, self.config.merge_distance, self.config.load_bearing_min_length);
        let deduped = dedupe_walls(merged, self.config.dedupe_tolerance);
        let walls = if self.config.remove_conflicts {
            remove_wall_conflicts(deduped, self.config.conflict_tolerance)
        } else {
            deduped
        };
        tracing::debug!(segments = segments.len(), walls = walls.len(), "walls assembled");
        walls
    }

    /// Appends a load-bearing wall for every room edge that has none, then
    /// folds synthesized walls into existing ones within the dedupe tolerance.
    pub fn fill_missing(&self, mut walls: Vec<Wall>, rooms: &[Room], scale: f64) -> Vec<Wall> {
        let missing = find_missing_walls(rooms, &walls, scale);
        if missing.is_empty() {
            return walls;
        }
        tracing::debug!(count = missing.len(), "synthesized walls along room edges");
        walls.extend(missing);
        resolve_overlaps(walls, self.config.dedupe_tolerance, OverlapPriority::LoadBearingFirst)
    }
}

/// Absorbs every later segment of the same orientation whose cross-axis
/// coordinate is within `merge_distance` of the seed segment.
pub fn group_lines_into_walls(segments: &[Segment], merge_distance: f64, load_bearing_min_length: f64) -> Vec<Wall> {
    let mut walls = Vec::new();
    let mut processed = vec![false; segments.len()];

    for (i, seed) in segments.iter().enumerate() {
        if processed[i] {
            continue;
        }
        processed[i] = true;

        let (mut lo, mut hi) = span_of(seed);
        let mut cross = seed.cross_coord();

        for (j, other) in segments.iter().enumerate().skip(i + 1) {
            if processed[j] || other.orientation != seed.orientation {
                continue;
            }
            if (seed.cross_coord() - other.cross_coord()).abs() < merge_distance {
                let (other_lo, other_hi) = span_of(other);
                lo = lo.min(other_lo);
                hi = hi.max(other_hi);
                cross = (cross + other.cross_coord()) / 2.0;
                processed[j] = true;
            }
        }

        let mut wall = Wall::axis_aligned(seed.orientation, cross, lo, hi, false);
        if wall.length() > load_bearing_min_length {
            wall.load_bearing = true;
            wall.thickness = Wall::LOAD_BEARING_THICKNESS;
        }
        walls.push(wall);
    }

    walls
}

/// Unions same-orientation walls that overlap within `tolerance`.
pub fn dedupe_walls(walls: Vec<Wall>, tolerance: f64) -> Vec<Wall> {
    resolve_overlaps(walls, tolerance, OverlapPriority::InputOrder)
}

/// Like [`dedupe_walls`] but load-bearing walls win and keep at least
/// [`Wall::LOAD_BEARING_THICKNESS`].
pub fn remove_wall_conflicts(walls: Vec<Wall>, tolerance: f64) -> Vec<Wall> {
    resolve_overlaps(walls, tolerance, OverlapPriority::LoadBearingFirst)
}

/// Folds overlapping walls until no two remaining walls overlap, so the
/// output is a fixed point of this function.
pub fn resolve_overlaps(mut walls: Vec<Wall>, tolerance: f64, priority: OverlapPriority) -> Vec<Wall> {
    let min_load_bearing_thickness = match priority {
        OverlapPriority::InputOrder => 0.0,
        OverlapPriority::LoadBearingFirst => Wall::LOAD_BEARING_THICKNESS,
    };

    loop {
        if priority == OverlapPriority::LoadBearingFirst {
            // stable: equal-priority walls keep their relative order
            walls.sort_by_key(|w| !w.load_bearing);
        }

        let before = walls.len();
        let mut result: Vec<Wall> = Vec::with_capacity(before);
        for wall in walls {
            match result.iter_mut().find(|existing| existing.overlaps(&wall, tolerance)) {
                Some(existing) => absorb(existing, &wall, min_load_bearing_thickness),
                None => result.push(wall),
            }
        }

        walls = result;
        if walls.len() == before {
            return walls;
        }
    }
}

fn absorb(target: &mut Wall, other: &Wall, min_load_bearing_thickness: f64) {
    let (t_lo, t_hi) = target.span();
    let (o_lo, o_hi) = other.span();
    let cross = (target.cross_coord() + other.cross_coord()) / 2.0;
    target.set_geometry(cross, t_lo.min(o_lo), t_hi.max(o_hi));

    if target.load_bearing || other.load_bearing {
        target.load_bearing = true;
        target.thickness = target.thickness.max(other.thickness).max(min_load_bearing_thickness);
    } else {
        target.thickness = target.thickness.max(other.thickness);
    }
}

/// Walls for room edges with no matching wall. Matching uses a tolerance of
/// 10 cm converted to pixels; synthesized walls are load-bearing.
pub fn find_missing_walls(rooms: &[Room], existing: &[Wall], scale: f64) -> Vec<Wall> {
    if scale <= 0.0 {
        return Vec::new();
    }
    let tolerance = 0.1 / scale;
    let mut missing: Vec<Wall> = Vec::new();

    for room in rooms {
        let vertices = &room.vertices;
        for i in 0..vertices.len() {
            let a = vertices[i];
            let b = vertices[(i + 1) % vertices.len()];

            let candidate = if (a.y - b.y).abs() < tolerance {
                Wall::axis_aligned(Orientation::Horizontal, (a.y + b.y) / 2.0, a.x, b.x, true)
            } else if (a.x - b.x).abs() < tolerance {
                Wall::axis_aligned(Orientation::Vertical, (a.x + b.x) / 2.0, a.y, b.y, true)
            } else {
                continue;
            };

            let covered = existing
                .iter()
                .chain(missing.iter())
                .any(|wall| covers(wall, &candidate, tolerance));
            if !covered {
                missing.push(candidate);
            }
        }
    }

    missing
}

fn covers(wall: &Wall, edge: &Wall, tolerance: f64) -> bool {
    wall.orientation == edge.orientation
        && (wall.cross_coord() - edge.cross_coord()).abs() < tolerance
        && {
            let (w_lo, w_hi) = wall.span();
            let (e_lo, e_hi) = edge.span();
            !(e_hi < w_lo - tolerance || e_lo > w_hi + tolerance)
        }
}

fn span_of(segment: &Segment) -> (f64, f64) {
    let (a, b) = match segment.orientation {
        Orientation::Horizontal => (segment.start.x, segment.end.x),
        Orientation::Vertical => (segment.start.y, segment.end.y),
    };
    (a.min(b), a.max(b))
}
