//! Data model types for serialization input.
//!
//! This module contains the value graph handed to the serializer:
//! - Values (primitive, enum, complex, collection, geospatial)
//! - Temporal scalars
//! - Entities, collections and navigation links
//! - Builders (ergonomic construction)

pub mod builder;
pub mod entity;
pub mod geo;
pub mod temporal;
pub mod value;

pub use builder::EntityBuilder;
pub use entity::{Entity, EntityCollection, InlineData, NavigationLink, Operation};
pub use geo::{Dimension, Geospatial, Polygon, Position, Shape};
pub use temporal::{Date, DateTimeOffset, Duration, TimeOfDay};
pub use value::{ComplexValue, EnumValue, Property, Scalar, StreamLink, Value};
