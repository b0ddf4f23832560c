//! Low-level JSON output.
//!
//! This module holds the token writer and the formatting of primitive values,
//! key predicates and GeoJSON shapes used by the serializer.

pub mod geo;
pub mod key;
pub mod primitive;
pub mod writer;

pub use geo::{check_geo_kind, encode_geospatial};
pub use key::{entity_id, key_literal, key_predicate};
pub use primitive::{format_enum, format_scalar, Token};
pub use writer::JsonWriter;
