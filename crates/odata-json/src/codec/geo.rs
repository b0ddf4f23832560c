//! GeoJSON encoding of geospatial values.

use serde_json::{json, Map, Value as JsonValue};

use crate::edm::PrimitiveKind;
use crate::error::SerializeError;
use crate::model::geo::{Dimension, Geospatial, Polygon, Position, Shape};

fn position(p: &Position) -> JsonValue {
    match p.z {
        Some(z) => json!([p.x, p.y, z]),
        None => json!([p.x, p.y]),
    }
}

fn positions(ps: &[Position]) -> JsonValue {
    JsonValue::Array(ps.iter().map(position).collect())
}

fn polygon(p: &Polygon) -> JsonValue {
    JsonValue::Array(p.rings().map(|ring| positions(ring)).collect())
}

/// Encodes a geospatial value as a GeoJSON object.
///
/// Only the default SRID of the value's dimension is supported; any other
/// SRID, including one nested in a collection, fails with `UNSUPPORTED_SRID`.
pub fn encode_geospatial(geo: &Geospatial, property: &str) -> Result<JsonValue, SerializeError> {
    if let Some(srid) = geo.non_default_srid() {
        return Err(SerializeError::UnsupportedSrid {
            property: property.to_string(),
            srid,
        });
    }

    let mut object = Map::new();
    let (type_name, member, body) = match &geo.shape {
        Shape::Point(p) => ("Point", "coordinates", position(p)),
        Shape::LineString(ps) => ("LineString", "coordinates", positions(ps)),
        Shape::Polygon(p) => ("Polygon", "coordinates", polygon(p)),
        Shape::MultiPoint(ps) => ("MultiPoint", "coordinates", positions(ps)),
        Shape::MultiLineString(lines) => (
            "MultiLineString",
            "coordinates",
            JsonValue::Array(lines.iter().map(|l| positions(l)).collect()),
        ),
        Shape::MultiPolygon(polys) => (
            "MultiPolygon",
            "coordinates",
            JsonValue::Array(polys.iter().map(polygon).collect()),
        ),
        Shape::Collection(items) => {
            let geometries = items
                .iter()
                .map(|item| encode_geospatial(item, property))
                .collect::<Result<Vec<_>, _>>()?;
            ("GeometryCollection", "geometries", JsonValue::Array(geometries))
        }
    };
    object.insert("type".to_string(), JsonValue::String(type_name.to_string()));
    object.insert(member.to_string(), body);
    Ok(JsonValue::Object(object))
}

/// Checks that a geospatial value matches the declared kind.
pub fn check_geo_kind(
    kind: PrimitiveKind,
    geo: &Geospatial,
    property: &str,
) -> Result<(), SerializeError> {
    let matches = match (kind, geo.dimension) {
        (PrimitiveKind::Geography(k), Dimension::Geography)
        | (PrimitiveKind::Geometry(k), Dimension::Geometry) => k == geo.shape.kind(),
        _ => false,
    };
    if matches {
        Ok(())
    } else {
        Err(SerializeError::wrong_value(
            property,
            format!("{:?} {}", geo.dimension, geo.shape.kind().name()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edm::GeoKind;

    fn encoded(geo: Geospatial) -> String {
        encode_geospatial(&geo, "P").unwrap().to_string()
    }

    #[test]
    fn test_point() {
        let p = Geospatial::geography(Shape::Point(Position::new(1.5, 4.25)));
        assert_eq!(encoded(p), r#"{"type":"Point","coordinates":[1.5,4.25]}"#);

        let z = Geospatial::geometry(Shape::Point(Position::new(1.0, 2.0).with_z(3.0)));
        assert_eq!(encoded(z), r#"{"type":"Point","coordinates":[1.0,2.0,3.0]}"#);
    }

    #[test]
    fn test_polygon_exterior_first() {
        let exterior = vec![
            Position::new(0.0, 0.0),
            Position::new(3.0, 0.0),
            Position::new(3.0, 3.0),
            Position::new(0.0, 0.0),
        ];
        let interior = vec![
            Position::new(1.0, 1.0),
            Position::new(2.0, 1.0),
            Position::new(1.0, 1.0),
        ];
        let poly = Polygon {
            exterior: Some(exterior),
            interiors: vec![interior],
        };
        let value = encode_geospatial(&Geospatial::geometry(Shape::Polygon(poly)), "P").unwrap();
        assert_eq!(value["coordinates"].as_array().unwrap().len(), 2);
        assert_eq!(value["coordinates"][0][1][0], 3.0);
        assert_eq!(value["coordinates"][1][1][0], 2.0);
    }

    #[test]
    fn test_single_ring_without_exterior() {
        let ring = vec![Position::new(0.0, 0.0), Position::new(1.0, 0.0), Position::new(0.0, 0.0)];
        let poly = Polygon {
            exterior: None,
            interiors: vec![ring],
        };
        let value = encode_geospatial(&Geospatial::geometry(Shape::Polygon(poly)), "P").unwrap();
        assert_eq!(value["coordinates"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_collection() {
        let c = Geospatial::geometry(Shape::Collection(vec![
            Geospatial::geometry(Shape::Point(Position::new(1.0, 2.0))),
            Geospatial::geometry(Shape::LineString(vec![Position::new(0.0, 0.0), Position::new(1.0, 1.0)])),
        ]));
        assert_eq!(
            encoded(c),
            r#"{"type":"GeometryCollection","geometries":[{"type":"Point","coordinates":[1.0,2.0]},{"type":"LineString","coordinates":[[0.0,0.0],[1.0,1.0]]}]}"#
        );
    }

    #[test]
    fn test_srid() {
        let explicit_default = Geospatial::geography(Shape::Point(Position::new(1.0, 2.0))).with_srid(4326);
        assert!(encode_geospatial(&explicit_default, "P").is_ok());

        let custom = Geospatial::geography(Shape::Point(Position::new(1.0, 2.0))).with_srid(2000);
        let err = encode_geospatial(&custom, "PropertyPoint").unwrap_err();
        assert_eq!(err.message_key().key(), "UNSUPPORTED_SRID");

        let nested = Geospatial::geometry(Shape::Collection(vec![
            Geospatial::geometry(Shape::Point(Position::new(1.0, 2.0))).with_srid(7),
        ]));
        assert!(encode_geospatial(&nested, "P").is_err());
    }

    #[test]
    fn test_kind_check() {
        let p = Geospatial::geography(Shape::Point(Position::new(1.0, 2.0)));
        assert!(check_geo_kind(PrimitiveKind::Geography(GeoKind::Point), &p, "P").is_ok());
        assert!(check_geo_kind(PrimitiveKind::Geometry(GeoKind::Point), &p, "P").is_err());
        assert!(check_geo_kind(PrimitiveKind::Geography(GeoKind::LineString), &p, "P").is_err());
    }
}
