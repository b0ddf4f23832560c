//! Geospatial values.

use crate::edm::GeoKind;

/// Whether coordinates are geographic (round earth) or geometric (flat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Geography,
    Geometry,
}

impl Dimension {
    /// The SRID implied when none is given: 4326 for geography, 0 for geometry.
    pub fn default_srid(&self) -> u32 {
        match self {
            Dimension::Geography => 4326,
            Dimension::Geometry => 0,
        }
    }
}

/// A single coordinate. Unset ordinates default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Position::new(x, y)
    }
}

/// Polygon rings.
///
/// `exterior` may be left unset when the polygon has a single ring; that ring
/// is then the exterior.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub exterior: Option<Vec<Position>>,
    pub interiors: Vec<Vec<Position>>,
}

impl Polygon {
    pub fn new(exterior: Vec<Position>) -> Self {
        Self {
            exterior: Some(exterior),
            interiors: Vec::new(),
        }
    }

    pub fn with_interior(mut self, ring: Vec<Position>) -> Self {
        self.interiors.push(ring);
        self
    }

    /// Rings in wire order: exterior first, then interiors in declaration order.
    pub fn rings(&self) -> impl Iterator<Item = &Vec<Position>> {
        self.exterior.iter().chain(self.interiors.iter())
    }
}

/// Shape and coordinates of a geospatial value.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Polygon),
    MultiPoint(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    MultiPolygon(Vec<Polygon>),
    Collection(Vec<Geospatial>),
}

impl Shape {
    pub fn kind(&self) -> GeoKind {
        match self {
            Shape::Point(_) => GeoKind::Point,
            Shape::LineString(_) => GeoKind::LineString,
            Shape::Polygon(_) => GeoKind::Polygon,
            Shape::MultiPoint(_) => GeoKind::MultiPoint,
            Shape::MultiLineString(_) => GeoKind::MultiLineString,
            Shape::MultiPolygon(_) => GeoKind::MultiPolygon,
            Shape::Collection(_) => GeoKind::Collection,
        }
    }
}

/// A geospatial value: dimension, optional SRID and shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Geospatial {
    pub dimension: Dimension,
    pub srid: Option<u32>,
    pub shape: Shape,
}

impl Geospatial {
    pub fn new(dimension: Dimension, shape: Shape) -> Self {
        Self {
            dimension,
            srid: None,
            shape,
        }
    }

    pub fn geometry(shape: Shape) -> Self {
        Self::new(Dimension::Geometry, shape)
    }

    pub fn geography(shape: Shape) -> Self {
        Self::new(Dimension::Geography, shape)
    }

    pub fn with_srid(mut self, srid: u32) -> Self {
        self.srid = Some(srid);
        self
    }

    /// Returns the SRID if it differs from the dimension's default.
    pub fn non_default_srid(&self) -> Option<u32> {
        self.srid.filter(|s| *s != self.dimension.default_srid())
    }
}
