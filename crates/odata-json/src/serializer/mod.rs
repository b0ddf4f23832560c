//! JSON serializer.
//!
//! [`JsonSerializer`] binds the immutable configuration shared by many calls
//! (the EDM, the metadata ETag and the service root). Each entry point takes
//! one value graph plus a [`SerializeOptions`] bundle and returns the complete
//! response body. The `*_streamed` variants in this module write lazily
//! produced collections to a sink.
//!
//! # Example
//!
//! ```rust
//! use odata_json::edm::{Edm, EntityType, PrimitiveKind, PropertyDecl};
//! use odata_json::model::EntityBuilder;
//! use odata_json::{ContextUrl, JsonSerializer, SerializeOptions};
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
//!     .property("PropertyInt16", 32766i16)
//!     .property("PropertyString", "Test String1")
//!     .build();
//!
//! let options = SerializeOptions::new().context_url(ContextUrl::entity("ESTwoPrim"));
//! let bytes = JsonSerializer::new(&edm)
//!     .entity("ns.ETTwoPrim", &entity, &options)
//!     .unwrap();
//! assert_eq!(
//!     String::from_utf8(bytes).unwrap(),
//!     r#"{"@odata.context":"$metadata#ESTwoPrim/$entity","PropertyInt16":32766,"PropertyString":"Test String1"}"#
//! );
//! ```

mod emitter;
mod streaming;

pub use streaming::{CollectionInfo, FLUSH_THRESHOLD};

use tracing::debug;

use crate::edm::{Edm, EntityType, TypeRef};
use crate::error::SerializeError;
use crate::model::entity::{Entity, EntityCollection};
use crate::model::value::{Property, Value};
use crate::options::{MetadataLevel, SerializeOptions};
use crate::projection::{ExpandScope, SelectTree};

use emitter::{collection_type_annotation, value_type_annotation, Emitter};

/// Fails at minimal and full metadata when no context URL is given.
fn require_context(options: &SerializeOptions) -> Result<(), SerializeError> {
    if options.metadata != MetadataLevel::None && options.context_url.is_none() {
        return Err(SerializeError::NoContextUrl {
            level: options.metadata.as_str(),
        });
    }
    Ok(())
}

/// Rejects a null top-level value.
fn require_value(property: &Property) -> Result<&Value, SerializeError> {
    match &property.value {
        Value::Null => Err(SerializeError::NullInput {
            property: property.name.clone(),
        }),
        value => Ok(value),
    }
}

/// Serializer for OData JSON responses.
#[derive(Debug, Clone)]
pub struct JsonSerializer<'a> {
    edm: &'a Edm,
    metadata_etag: Option<String>,
    service_root: Option<String>,
}

impl<'a> JsonSerializer<'a> {
    /// Creates a serializer over a schema model.
    pub fn new(edm: &'a Edm) -> Self {
        Self {
            edm,
            metadata_etag: None,
            service_root: None,
        }
    }

    /// Sets the metadata document ETag, written as `@odata.metadataEtag`.
    pub fn with_metadata_etag(mut self, etag: impl Into<String>) -> Self {
        self.metadata_etag = Some(etag.into());
        self
    }

    /// Sets the service root prefixed to context URLs that carry none.
    pub fn with_service_root(mut self, root: impl Into<String>) -> Self {
        self.service_root = Some(root.into());
        self
    }

    pub fn edm(&self) -> &'a Edm {
        self.edm
    }

    fn emitter<'s>(&'s self, options: &'s SerializeOptions) -> Emitter<'s> {
        Emitter::new(
            self.edm,
            options,
            self.metadata_etag.as_deref(),
            self.service_root.as_deref(),
        )
    }

    fn entity_type(&self, name: &str) -> Result<&'a EntityType, SerializeError> {
        self.edm
            .entity_type(name)
            .ok_or_else(|| SerializeError::unsupported_type("entity", name))
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Serializes a single entity of the declared type.
    pub fn entity(
        &self,
        entity_type: &str,
        entity: &Entity,
        options: &SerializeOptions,
    ) -> Result<Vec<u8>, SerializeError> {
        debug!(entity_type, metadata = %options.metadata, "serializing entity");
        require_context(options)?;
        let et = self.entity_type(entity_type)?;
        let scope = ExpandScope::root(options.expand.as_ref());

        let mut emitter = self.emitter(options);
        emitter.entity(et, entity, &options.select, &scope, true)?;
        Ok(emitter.finish())
    }

    /// Serializes an entity collection as `{…,"value":[…]}`.
    pub fn entity_collection(
        &self,
        entity_type: &str,
        collection: &EntityCollection,
        options: &SerializeOptions,
    ) -> Result<Vec<u8>, SerializeError> {
        debug!(
            entity_type,
            metadata = %options.metadata,
            entities = collection.len(),
            "serializing entity collection"
        );
        require_context(options)?;
        let et = self.entity_type(entity_type)?;
        let scope = ExpandScope::root(options.expand.as_ref());

        let mut emitter = self.emitter(options);
        emitter.begin_entity_collection(collection.count, &collection.operations)?;
        for entity in &collection.entities {
            emitter.entity(et, entity, &options.select, &scope, false)?;
        }
        emitter.end_entity_collection(collection.next_link.as_deref())?;
        Ok(emitter.finish())
    }

    // =========================================================================
    // Complex values
    // =========================================================================

    /// Serializes a complex property value as a top-level object.
    pub fn complex(
        &self,
        complex_type: &str,
        property: &Property,
        options: &SerializeOptions,
    ) -> Result<Vec<u8>, SerializeError> {
        debug!(complex_type, property = %property.name, metadata = %options.metadata, "serializing complex value");
        let complex = match require_value(property)? {
            Value::Complex(complex) => complex,
            other => return Err(SerializeError::wrong_value(&property.name, other.describe())),
        };
        require_context(options)?;
        let scope = ExpandScope::root(options.expand.as_ref());

        let mut emitter = self.emitter(options);
        emitter.out.begin_object();
        emitter.preamble()?;
        emitter.complex_members(
            &property.name,
            complex_type,
            complex,
            property.type_name.as_deref(),
            &options.select,
            &scope,
        )?;
        emitter.out.end_object();
        Ok(emitter.finish())
    }

    /// Serializes a collection of complex values as `{…,"value":[…]}`.
    pub fn complex_collection(
        &self,
        complex_type: &str,
        property: &Property,
        options: &SerializeOptions,
    ) -> Result<Vec<u8>, SerializeError> {
        debug!(complex_type, property = %property.name, metadata = %options.metadata, "serializing complex collection");
        let items = match require_value(property)? {
            Value::Collection(items) => items,
            other => return Err(SerializeError::wrong_value(&property.name, other.describe())),
        };
        require_context(options)?;
        let type_ref = TypeRef::Complex(complex_type.to_string());
        let scope = ExpandScope::root(options.expand.as_ref());

        let mut emitter = self.emitter(options);
        emitter.out.begin_object();
        emitter.preamble()?;
        if options.metadata == MetadataLevel::Full {
            emitter.type_member(&collection_type_annotation(&type_ref))?;
        }
        emitter.out.name("value")?;
        emitter.collection_items(
            &type_ref,
            &property.name,
            items,
            options.nullable.unwrap_or(true),
            &options.select,
            &scope,
        )?;
        emitter.out.end_object();
        Ok(emitter.finish())
    }

    // =========================================================================
    // Primitive values
    // =========================================================================

    /// Serializes a primitive, enum or type-definition value as `{…,"value":…}`.
    pub fn primitive(
        &self,
        type_ref: &TypeRef,
        property: &Property,
        options: &SerializeOptions,
    ) -> Result<Vec<u8>, SerializeError> {
        debug!(property = %property.name, type_name = %type_ref.annotation_name(), metadata = %options.metadata, "serializing primitive value");
        if let TypeRef::Complex(name) = type_ref {
            return Err(SerializeError::unsupported_type(&property.name, name));
        }
        let value = require_value(property)?;
        require_context(options)?;

        let mut emitter = self.emitter(options);
        emitter.out.begin_object();
        emitter.preamble()?;
        if options.metadata == MetadataLevel::Full {
            if let Some(annotation) = value_type_annotation(type_ref) {
                emitter.type_member(&annotation)?;
            }
        }
        emitter.out.name("value")?;
        emitter.value(
            type_ref,
            &property.name,
            value,
            None,
            &SelectTree::All,
            &ExpandScope::None,
        )?;
        emitter.out.end_object();
        Ok(emitter.finish())
    }

    /// Serializes a collection of primitive values as `{…,"value":[…]}`.
    pub fn primitive_collection(
        &self,
        type_ref: &TypeRef,
        property: &Property,
        options: &SerializeOptions,
    ) -> Result<Vec<u8>, SerializeError> {
        debug!(property = %property.name, type_name = %type_ref.annotation_name(), metadata = %options.metadata, "serializing primitive collection");
        if let TypeRef::Complex(name) = type_ref {
            return Err(SerializeError::unsupported_type(&property.name, name));
        }
        let items = match require_value(property)? {
            Value::Collection(items) => items,
            other => return Err(SerializeError::wrong_value(&property.name, other.describe())),
        };
        require_context(options)?;

        let mut emitter = self.emitter(options);
        emitter.out.begin_object();
        emitter.preamble()?;
        if options.metadata == MetadataLevel::Full {
            emitter.type_member(&collection_type_annotation(type_ref))?;
        }
        emitter.out.name("value")?;
        emitter.collection_items(
            type_ref,
            &property.name,
            items,
            options.nullable.unwrap_or(true),
            &SelectTree::All,
            &ExpandScope::None,
        )?;
        emitter.out.end_object();
        Ok(emitter.finish())
    }

    // =========================================================================
    // References
    // =========================================================================

    /// Serializes a reference to an entity as `{"@odata.id":…}`.
    ///
    /// Without a context URL the `$metadata#$ref` form is used.
    pub fn reference(
        &self,
        entity_type: &str,
        entity: &Entity,
        options: &SerializeOptions,
    ) -> Result<Vec<u8>, SerializeError> {
        debug!(entity_type, metadata = %options.metadata, "serializing reference");
        let et = self.entity_type(entity_type)?;

        let mut emitter = self.emitter(options);
        let id = emitter.reference_id(et, entity)?;
        emitter.out.begin_object();
        emitter.reference_context(false)?;
        emitter.out.string_member("@odata.id", &id)?;
        emitter.out.end_object();
        Ok(emitter.finish())
    }

    /// Serializes references to a collection of entities.
    pub fn reference_collection(
        &self,
        entity_type: &str,
        collection: &EntityCollection,
        options: &SerializeOptions,
    ) -> Result<Vec<u8>, SerializeError> {
        debug!(entity_type, metadata = %options.metadata, entities = collection.len(), "serializing reference collection");
        let et = self.entity_type(entity_type)?;

        let mut emitter = self.emitter(options);
        emitter.out.begin_object();
        emitter.reference_context(true)?;
        if let (true, Some(count)) = (options.count, collection.count) {
            emitter.count_member("@odata.count", count)?;
        }
        emitter.out.name("value")?;
        emitter.out.begin_array();
        for entity in &collection.entities {
            emitter.reference_stub(et, entity)?;
        }
        emitter.out.end_array();
        if let Some(href) = &collection.next_link {
            emitter.out.string_member("@odata.nextLink", href)?;
        }
        emitter.out.end_object();
        Ok(emitter.finish())
    }
}
