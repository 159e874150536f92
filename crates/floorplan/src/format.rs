//! Line-oriented text records consumed by the 3D generation step.
//!
//! Walls: `x1,y1 -> x2,y2; несущая; 0.40`
//! Rooms: `Комната 1:x1,y1;x2,y2;x3,y3;x4,y4`
//!
//! Coordinates are pixels multiplied by the scale factor, two decimals.

use crate::{
    error::{PlanError, Result},
    types::{Point, Room, Wall},
};

const LOAD_BEARING: &str = "несущая";
const PARTITION: &str = "ненесущая";

pub fn format_wall(wall: &Wall, scale: f64) -> String {
    format!(
        "{:.2},{:.2} -> {:.2},{:.2}; {}; {:.2}",
        wall.start.x * scale,
        wall.start.y * scale,
        wall.end.x * scale,
        wall.end.y * scale,
        if wall.load_bearing { LOAD_BEARING } else { PARTITION },
        wall.thickness,
    )
}

pub fn format_walls(walls: &[Wall], scale: f64) -> String {
    walls.iter().map(|w| format_wall(w, scale)).collect::<Vec<_>>().join("\n")
}

pub fn format_room(room: &Room, scale: f64) -> String {
    let coords = room
        .vertices
        .iter()
        .map(|v| format!("{:.2},{:.2}", v.x * scale, v.y * scale))
        .collect::<Vec<_>>()
        .join(";");
    format!("{}:{}", room.display_name(), coords)
}

pub fn format_rooms(rooms: &[Room], scale: f64) -> String {
    rooms.iter().map(|r| format_room(r, scale)).collect::<Vec<_>>().join("\n")
}

/// A wall record read back from text; coordinates in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct WallRecord {
    pub start: Point,
    pub end: Point,
    pub load_bearing: bool,
    pub thickness: f64,
}

/// A room record read back from text; coordinates in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomRecord {
    pub name: String,
    pub vertices: Vec<Point>,
}

fn invalid(line: &str) -> PlanError {
    PlanError::InvalidRecord(line.to_string())
}

fn parse_point(raw: &str, line: &str) -> Result<Point> {
    let (x, y) = raw.trim().split_once(',').ok_or_else(|| invalid(line))?;
    let x = x.trim().parse().map_err(|_| invalid(line))?;
    let y = y.trim().parse().map_err(|_| invalid(line))?;
    Ok(Point::new(x, y))
}

pub fn parse_wall_record(line: &str) -> Result<WallRecord> {
    let mut fields = line.split(';');
    let (Some(coords), Some(kind), Some(thickness), None) = (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(invalid(line));
    };

    let (start, end) = coords.split_once("->").ok_or_else(|| invalid(line))?;
    let load_bearing = match kind.trim() {
        LOAD_BEARING => true,
        PARTITION => false,
        _ => return Err(invalid(line)),
    };

    Ok(WallRecord {
        start: parse_point(start, line)?,
        end: parse_point(end, line)?,
        load_bearing,
        thickness: thickness.trim().parse().map_err(|_| invalid(line))?,
    })
}

pub fn parse_room_record(line: &str) -> Result<RoomRecord> {
    // Names never contain ':', coordinates never do either
    let (name, coords) = line.split_once(':').ok_or_else(|| invalid(line))?;
    let vertices = coords.split(';').map(|p| parse_point(p, line)).collect::<Result<Vec<_>>>()?;
    if name.trim().is_empty() || vertices.is_empty() {
        return Err(invalid(line));
    }
    Ok(RoomRecord { name: name.trim().to_string(), vertices })
}

pub fn parse_walls(text: &str) -> Result<Vec<WallRecord>> {
    text.lines().filter(|l| !l.trim().is_empty()).map(parse_wall_record).collect()
}

pub fn parse_rooms(text: &str) -> Result<Vec<RoomRecord>> {
    text.lines().filter(|l| !l.trim().is_empty()).map(parse_room_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Orientation;

    #[test]
    fn test_wall_record_shape() {
        let wall = Wall::axis_aligned(Orientation::Horizontal, 200.0, 100.0, 700.0, true);
        assert_eq!(format_wall(&wall, 0.01), "1.00,2.00 -> 7.00,2.00; несущая; 0.40");

        let partition = Wall::axis_aligned(Orientation::Vertical, 334.0, 10.0, 50.0, false);
        assert_eq!(format_wall(&partition, 0.005), "1.67,0.05 -> 1.67,0.25; ненесущая; 0.12");
    }

    #[test]
    fn test_room_record_uses_display_name() {
        let mut room = Room::from_bounds("Комната 1", 0.0, 0.0, 400.0, 600.0, 0.01);
        assert_eq!(format_room(&room, 0.01), "Комната 1:0.00,0.00;4.00,0.00;4.00,6.00;0.00,6.00");
        room.number = Some(22);
        assert!(format_room(&room, 0.01).starts_with("Комната 22:"));
    }

    #[test]
    fn test_records_are_newline_joined() {
        let walls = vec![
            Wall::axis_aligned(Orientation::Horizontal, 0.0, 0.0, 100.0, false),
            Wall::axis_aligned(Orientation::Vertical, 0.0, 0.0, 100.0, false),
        ];
        assert_eq!(format_walls(&walls, 0.01).lines().count(), 2);
        assert_eq!(format_walls(&[], 0.01), "");
        assert_eq!(format_rooms(&[], 0.01), "");
    }

    #[test]
    fn test_text_recovers_coordinates() {
        let scale = 0.005;
        let walls = vec![
            Wall::axis_aligned(Orientation::Horizontal, 213.7, 17.2, 845.9, true),
            Wall::axis_aligned(Orientation::Vertical, 401.1, 213.7, 640.0, false),
        ];
        let parsed = parse_walls(&format_walls(&walls, scale)).expect("valid records");
        for (wall, record) in walls.iter().zip(&parsed) {
            assert!((record.start.x - wall.start.x * scale).abs() <= 0.005);
            assert!((record.start.y - wall.start.y * scale).abs() <= 0.005);
            assert!((record.end.x - wall.end.x * scale).abs() <= 0.005);
            assert!((record.end.y - wall.end.y * scale).abs() <= 0.005);
            assert_eq!(record.load_bearing, wall.load_bearing);
            assert_eq!(record.thickness, wall.thickness);
        }

        let rooms = vec![Room::from_bounds("Помещение 3", 12.3, 45.6, 378.9, 512.4, scale)];
        let parsed = parse_rooms(&format_rooms(&rooms, scale)).expect("valid records");
        assert_eq!(parsed[0].name, "Помещение 3");
        for (vertex, point) in rooms[0].vertices.iter().zip(&parsed[0].vertices) {
            assert!((point.x - vertex.x * scale).abs() <= 0.005);
            assert!((point.y - vertex.y * scale).abs() <= 0.005);
        }
    }

    #[test]
    fn test_malformed_records_rejected() {
        assert!(parse_wall_record("1,2 -> 3,4; кирпич; 0.4").is_err());
        assert!(parse_wall_record("1,2 3,4; несущая; 0.4").is_err());
        assert!(parse_room_record("Комната 1").is_err());
        assert!(parse_room_record("Комната 1:1.0;2.0").is_err());
    }
}
