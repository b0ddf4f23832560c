//! OData JSON: a serializer for OData v4 JSON responses.
//!
//! This crate turns an in-memory entity graph, described by a schema model
//! (EDM), into OData JSON payloads: entities, entity collections, complex and
//! primitive values, collections of those, and entity references.
//!
//! # Overview
//!
//! The serializer is driven by per-call options:
//! - **Metadata level**: `none`, `minimal` or `full` control information
//! - **Projection**: `$select` trees and `$expand` trees with nested options,
//!   including level-bounded and cycle-safe recursive expansion
//! - **IEEE754 mode**: Int64 and Decimal values written as strings
//! - **Streaming**: lazily produced collections written incrementally, with a
//!   callback that can take over the response when an item fails
//!
//! # Quick Start
//!
//! ```rust
//! use odata_json::edm::{Edm, EntityType, PrimitiveKind, PropertyDecl};
//! use odata_json::model::EntityBuilder;
//! use odata_json::{ContextUrl, JsonSerializer, MetadataLevel, SerializeOptions};
//!
//! let mut edm = Edm::new();
//! edm.add_entity_type(
//!     EntityType::new("ns.ETTwoPrim")
//!         .key("PropertyInt16")
//!         .property(PropertyDecl::primitive("PropertyInt16", PrimitiveKind::Int16).not_null())
//!         .property(PropertyDecl::primitive("PropertyString", PrimitiveKind::String))
//!         .entity_set("ESTwoPrim"),
//! );
//!
//! let entity = EntityBuilder::new("ns.ETTwoPrim")
//!     .property("PropertyInt16", 1i16)
//!     .property("PropertyString", "a")
//!     .build();
//!
//! let options = SerializeOptions::new()
//!     .context_url(ContextUrl::entity("ESTwoPrim"))
//!     .metadata(MetadataLevel::Full);
//! let bytes = JsonSerializer::new(&edm)
//!     .entity("ns.ETTwoPrim", &entity, &options)
//!     .unwrap();
//!
//! let text = String::from_utf8(bytes).unwrap();
//! assert!(text.contains(r#""@odata.id":"ESTwoPrim(1)""#));
//! ```
//!
//! # Modules
//!
//! - [`serializer`]: Entry points, including the streaming variants
//! - [`edm`]: Schema model (entity, complex, enum and type definition types)
//! - [`model`]: Value graph handed to the serializer
//! - [`projection`]: Select and expand trees
//! - [`context_url`]: Context URL construction
//! - [`options`]: Per-call options and content type parsing
//! - [`codec`]: JSON token writer, primitive, key and GeoJSON formatting
//! - [`error`]: Error types and message keys

pub mod codec;
pub mod context_url;
pub mod edm;
pub mod error;
pub mod model;
pub mod options;
pub mod projection;
pub mod serializer;
pub mod util;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types at crate root
pub use context_url::{build_select_list, ContextUrl, Suffix};
pub use edm::{Edm, PrimitiveKind, TypeRef};
pub use error::{MessageKey, SerializeError};
pub use model::{
    ComplexValue, Entity, EntityBuilder, EntityCollection, Geospatial, NavigationLink, Operation,
    Property, Scalar, StreamLink, Value,
};
pub use options::{MetadataLevel, SerializeOptions, WriteErrorCallback};
pub use projection::{ExpandItem, ExpandLevel, ExpandTree, SelectTree};
pub use serializer::{CollectionInfo, JsonSerializer};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// OData protocol version this crate writes.
pub const ODATA_VERSION: &str = "4.0";
