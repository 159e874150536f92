use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::{Number, Value as JsonValue};

use crate::{
    error::{PlanError, Result},
    types::{Orientation, PlanGeometry, Point, Room, Wall},
};

const KIND_WALL: &str = "wall";
const KIND_ROOM: &str = "room";

fn number(value: f64) -> JsonValue {
    Number::from_f64(value).map(JsonValue::Number).unwrap_or(JsonValue::Null)
}

fn position(p: Point) -> Vec<f64> {
    vec![p.x, p.y]
}

fn invalid(message: impl Into<String>) -> PlanError {
    PlanError::InvalidRecord(message.into())
}

fn wall_feature(index: usize, wall: &Wall) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("kind".to_string(), KIND_WALL.into());
    properties.insert("type".to_string(), wall.orientation.to_string().into());
    properties.insert("loadBearing".to_string(), wall.load_bearing.into());
    properties.insert("thickness".to_string(), number(wall.thickness));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(vec![position(wall.start), position(wall.end)]))),
        id: Some(geojson::feature::Id::Number(Number::from(index))),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn room_feature(index: usize, room: &Room) -> Feature {
    let mut ring: Vec<Vec<f64>> = room.vertices.iter().map(|&v| position(v)).collect();
    ring.push(position(room.vertices[0]));

    let mut properties = JsonObject::new();
    properties.insert("kind".to_string(), KIND_ROOM.into());
    properties.insert("name".to_string(), room.display_name().into());
    properties.insert("detectedName".to_string(), room.name.clone().into());
    properties.insert("number".to_string(), room.number.map(JsonValue::from).unwrap_or(JsonValue::Null));
    properties.insert("area".to_string(), number(room.area));
    properties.insert("isLivingRoom".to_string(), room.is_living_room.into());
    properties.insert("matched".to_string(), room.matched.into());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: Some(geojson::feature::Id::Number(Number::from(index))),
        properties: Some(properties),
        foreign_members: None,
    }
}

impl PlanGeometry {
    /// Walls as `LineString` and rooms as `Polygon` features in raster pixel
    /// coordinates. Image size and scale travel as foreign members.
    pub fn to_geojson(&self, scale: f64) -> FeatureCollection {
        let features = self
            .walls
            .iter()
            .enumerate()
            .map(|(i, wall)| wall_feature(i, wall))
            .chain(self.rooms.iter().enumerate().map(|(i, room)| room_feature(i, room)))
            .collect();

        let mut foreign_members = JsonObject::new();
        foreign_members.insert("image_width".to_string(), self.image_width.into());
        foreign_members.insert("image_height".to_string(), self.image_height.into());
        foreign_members.insert("scale".to_string(), number(scale));
        foreign_members.insert("wall_count".to_string(), self.walls.len().into());
        foreign_members.insert("room_count".to_string(), self.rooms.len().into());

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        }
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self, scale: f64) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_geojson(scale))?)
    }

    /// Save GeoJSON to file
    pub fn save_geojson(&self, path: impl AsRef<std::path::Path>, scale: f64) -> Result<()> {
        std::fs::write(path, self.to_geojson_string(scale)?)?;
        Ok(())
    }

    /// Load geometry and its scale from a GeoJSON string written by
    /// [`PlanGeometry::to_geojson_string`].
    pub fn from_geojson_string(geojson_str: &str) -> Result<(Self, f64)> {
        let collection: FeatureCollection = geojson_str.parse()?;

        let foreign_members = collection
            .foreign_members
            .as_ref()
            .ok_or_else(|| invalid("Missing metadata in GeoJSON"))?;
        let dimension = |key: &str| {
            foreign_members
                .get(key)
                .and_then(JsonValue::as_u64)
                .map(|v| v as u32)
                .ok_or_else(|| invalid(format!("Missing or invalid {key}")))
        };
        let image_width = dimension("image_width")?;
        let image_height = dimension("image_height")?;
        let scale = foreign_members
            .get("scale")
            .and_then(JsonValue::as_f64)
            .ok_or_else(|| invalid("Missing or invalid scale"))?;

        let mut geometry = PlanGeometry {
            image_width,
            image_height,
            ..Self::default()
        };

        for feature in collection.features {
            let properties = feature.properties.unwrap_or_default();
            let Some(shape) = feature.geometry else {
                continue;
            };
            match (properties.get("kind").and_then(JsonValue::as_str), shape.value) {
                (Some(KIND_WALL), Value::LineString(coords)) => {
                    geometry.walls.push(wall_from_feature(&properties, &coords)?);
                }
                (Some(KIND_ROOM), Value::Polygon(rings)) => {
                    geometry.rooms.push(room_from_feature(&properties, &rings, scale)?);
                }
                _ => {}
            }
        }

        Ok((geometry, scale))
    }
}

fn point_at(coords: &[Vec<f64>], index: usize) -> Result<Point> {
    match coords.get(index).map(Vec::as_slice) {
        Some([x, y, ..]) => Ok(Point::new(*x, *y)),
        _ => Err(invalid("Malformed coordinate")),
    }
}

fn wall_from_feature(properties: &JsonObject, coords: &[Vec<f64>]) -> Result<Wall> {
    let orientation: Orientation = properties
        .get("type")
        .and_then(JsonValue::as_str)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| invalid("Wall feature without orientation"))?;
    let load_bearing = properties.get("loadBearing").and_then(JsonValue::as_bool).unwrap_or(false);

    let mut wall = Wall::axis_aligned(orientation, 0.0, 0.0, 0.0, load_bearing);
    wall.start = point_at(coords, 0)?;
    wall.end = point_at(coords, 1)?;
    if let Some(thickness) = properties.get("thickness").and_then(JsonValue::as_f64) {
        wall.thickness = thickness;
    }
    Ok(wall)
}

fn room_from_feature(properties: &JsonObject, rings: &[Vec<Vec<f64>>], scale: f64) -> Result<Room> {
    let exterior = rings.first().ok_or_else(|| invalid("Room feature without exterior ring"))?;
    let points = (0..exterior.len()).map(|i| point_at(exterior, i)).collect::<Result<Vec<_>>>()?;
    let (min_x, min_y, max_x, max_y) = points.iter().fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(a, b, c, d), p| (a.min(p.x), b.min(p.y), c.max(p.x), d.max(p.y)),
    );
    if points.is_empty() {
        return Err(invalid("Room feature without vertices"));
    }

    let name = properties
        .get("detectedName")
        .or_else(|| properties.get("name"))
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    let mut room = Room::from_bounds(name, min_x, min_y, max_x, max_y, scale);
    room.is_living_room = properties.get("isLivingRoom").and_then(JsonValue::as_bool).unwrap_or(false);
    room.number = properties.get("number").and_then(JsonValue::as_u64).map(|n| n as u32);
    room.matched = properties.get("matched").and_then(JsonValue::as_bool).unwrap_or(false);
    Ok(room)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlanGeometry {
        let mut room = Room::from_bounds("Комната 1", 100.0, 100.0, 500.0, 400.0, 0.01);
        room.is_living_room = true;
        room.number = Some(21);
        room.matched = true;
        PlanGeometry {
            walls: vec![
                Wall::axis_aligned(Orientation::Horizontal, 100.0, 100.0, 500.0, true),
                Wall::axis_aligned(Orientation::Vertical, 300.0, 100.0, 400.0, false),
            ],
            rooms: vec![room],
            image_width: 600,
            image_height: 500,
        }
    }

    #[test]
    fn test_feature_collection_layout() {
        let collection = sample().to_geojson(0.01);
        assert_eq!(collection.features.len(), 3);

        let members = collection.foreign_members.as_ref().expect("metadata");
        assert_eq!(members["image_width"], 600);
        assert_eq!(members["scale"], 0.01);

        let room = &collection.features[2];
        let properties = room.properties.as_ref().expect("properties");
        assert_eq!(properties["name"], "Комната 21");
        assert_eq!(properties["area"], 12.0);
        match &room.geometry.as_ref().expect("geometry").value {
            Value::Polygon(rings) => {
                assert_eq!(rings[0].len(), 5);
                assert_eq!(rings[0].first(), rings[0].last());
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_string_reload() {
        let geometry = sample();
        let text = geometry.to_geojson_string(0.01).expect("serializable");
        let (loaded, scale) = PlanGeometry::from_geojson_string(&text).expect("readable");

        assert_eq!(scale, 0.01);
        assert_eq!(loaded.image_width, 600);
        assert_eq!(loaded.walls, geometry.walls);
        assert_eq!(loaded.rooms, geometry.rooms);
    }

    #[test]
    fn test_missing_metadata_rejected() {
        let text = r#"{"type":"FeatureCollection","features":[]}"#;
        assert!(PlanGeometry::from_geojson_string(text).is_err());
    }
}
