use geo_types::{Coord, LineString, Polygon};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Pixel coordinate on the plan raster.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Point> for Coord<f64> {
    fn from(p: Point) -> Self {
        Coord { x: p.x, y: p.y }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Which strategy produced a recognition result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, IntoStaticStr,
)]
pub enum Method {
    #[serde(rename = "algorithmic")]
    #[strum(serialize = "algorithmic")]
    Algorithmic,
    #[serde(rename = "ml-neural-network")]
    #[strum(serialize = "ml-neural-network")]
    NeuralNetwork,
}

/// Raw run of edge pixels found by a scanline pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub orientation: Orientation,
    pub start: Point,
    pub end: Point,
    pub length: f64,
}

impl Segment {
    /// Coordinate perpendicular to the run (y for horizontal, x for vertical).
    pub fn cross_coord(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.start.y,
            Orientation::Vertical => self.start.x,
        }
    }
}

/// Wall centreline. Horizontal walls keep `start.y == end.y`, vertical
/// walls keep `start.x == end.x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Wall {
    pub start: Point,
    pub end: Point,
    #[serde(rename = "type")]
    pub orientation: Orientation,
    /// Thickness in meters.
    pub thickness: f64,
    pub load_bearing: bool,
}

impl Wall {
    pub const LOAD_BEARING_THICKNESS: f64 = 0.4;
    pub const PARTITION_THICKNESS: f64 = 0.12;

    /// Axis-aligned wall at `cross` spanning `[from, to]` along its orientation.
    pub fn axis_aligned(orientation: Orientation, cross: f64, from: f64, to: f64, load_bearing: bool) -> Self {
        let (lo, hi) = (from.min(to), from.max(to));
        let (start, end) = match orientation {
            Orientation::Horizontal => (Point::new(lo, cross), Point::new(hi, cross)),
            Orientation::Vertical => (Point::new(cross, lo), Point::new(cross, hi)),
        };
        Self {
            start,
            end,
            orientation,
            thickness: if load_bearing {
                Self::LOAD_BEARING_THICKNESS
            } else {
                Self::PARTITION_THICKNESS
            },
            load_bearing,
        }
    }

    pub fn cross_coord(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.start.y,
            Orientation::Vertical => self.start.x,
        }
    }

    /// `(min, max)` extent along the wall's own axis.
    pub fn span(&self) -> (f64, f64) {
        let (a, b) = match self.orientation {
            Orientation::Horizontal => (self.start.x, self.end.x),
            Orientation::Vertical => (self.start.y, self.end.y),
        };
        (a.min(b), a.max(b))
    }

    pub fn length(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Rewrites the geometry from a cross coordinate and a span, keeping the axis invariant.
    pub(crate) fn set_geometry(&mut self, cross: f64, lo: f64, hi: f64) {
        match self.orientation {
            Orientation::Horizontal => {
                self.start = Point::new(lo, cross);
                self.end = Point::new(hi, cross);
            }
            Orientation::Vertical => {
                self.start = Point::new(cross, lo);
                self.end = Point::new(cross, hi);
            }
        }
    }

    /// Same orientation, cross coordinates within `tolerance` and spans
    /// overlapping once widened by `tolerance`.
    pub fn overlaps(&self, other: &Wall, tolerance: f64) -> bool {
        if self.orientation != other.orientation {
            return false;
        }
        if (self.cross_coord() - other.cross_coord()).abs() > tolerance {
            return false;
        }
        let (a_lo, a_hi) = self.span();
        let (b_lo, b_hi) = other.span();
        !(a_hi < b_lo - tolerance || a_lo > b_hi + tolerance)
    }
}

/// Axis-aligned room rectangle with its classification and OCR annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub name: String,
    /// Corners in clockwise order (screen coordinates): top-left, top-right,
    /// bottom-right, bottom-left.
    pub vertices: [Point; 4],
    /// Area in m².
    pub area: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    pub is_living_room: bool,
    pub number: Option<u32>,
    pub ocr_area: Option<f64>,
    pub matched: bool,
}

impl Room {
    /// Builds a room from its bounding box; area is derived from the vertices.
    pub fn from_bounds(name: impl Into<String>, min_x: f64, min_y: f64, max_x: f64, max_y: f64, scale: f64) -> Self {
        let vertices = [
            Point::new(min_x, min_y),
            Point::new(max_x, min_y),
            Point::new(max_x, max_y),
            Point::new(min_x, max_y),
        ];
        Self {
            name: name.into(),
            area: calculate_room_area(&vertices, scale),
            vertices,
            width: max_x - min_x,
            height: max_y - min_y,
            is_living_room: false,
            number: None,
            ocr_area: None,
            matched: false,
        }
    }

    /// `(min_x, min_y, max_x, max_y)`
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.vertices.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), v| (min_x.min(v.x), min_y.min(v.y), max_x.max(v.x), max_y.max(v.y)),
        )
    }

    pub fn aspect_ratio(&self) -> f64 {
        aspect_ratio(self.width, self.height)
    }

    /// Name used in the text record: the OCR number wins over the detector name.
    pub fn display_name(&self) -> String {
        match self.number {
            Some(number) => format!("Комната {number}"),
            None => self.name.clone(),
        }
    }
}

/// `max / min` of the two sides; infinite for degenerate rectangles.
pub fn aspect_ratio(width: f64, height: f64) -> f64 {
    let short = width.min(height);
    if short <= 0.0 {
        return f64::INFINITY;
    }
    width.max(height) / short
}

/// Shoelace area of a vertex ring in m², given the pixel→meter `scale`.
pub fn calculate_room_area(vertices: &[Point], scale: f64) -> f64 {
    use geo::Area;

    if vertices.len() < 3 {
        return 0.0;
    }
    let ring: Vec<Coord<f64>> = vertices.iter().map(|&v| v.into()).collect();
    let polygon = Polygon::new(LineString::new(ring), vec![]);
    polygon.unsigned_area() * scale * scale
}

/// Walls and rooms recovered from one raster, in raster pixel coordinates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanGeometry {
    pub walls: Vec<Wall>,
    pub rooms: Vec<Room>,
    pub image_width: u32,
    pub image_height: u32,
}

impl PlanGeometry {
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty() || self.rooms.is_empty()
    }
}
