//! Builder API for ergonomic entity construction.
//!
//! # Example
//!
//! ```rust
//! use odata_json::model::EntityBuilder;
//!
//! let entity = EntityBuilder::new("olingo.odata.test1.ETTwoPrim")
//!     .property("PropertyInt16", 32766i16)
//!     .property("PropertyString", "Test String1")
//!     .etag("W/\"32766\"")
//!     .build();
//!
//! assert_eq!(entity.properties.len(), 2);
//! ```

use crate::model::entity::{Entity, EntityCollection, NavigationLink, Operation};
use crate::model::value::{set_property, Property, StreamLink, Value};

/// Builder for constructing an [`Entity`].
#[derive(Debug, Clone, Default)]
pub struct EntityBuilder {
    entity: Entity,
}

impl EntityBuilder {
    /// Creates a builder for an entity of the given qualified type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            entity: Entity::new(type_name),
        }
    }

    /// Sets the canonical id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.entity.id = Some(id.into());
        self
    }

    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.entity.etag = Some(etag.into());
        self
    }

    /// Marks the entity as a media entity with the given media metadata.
    pub fn media(mut self, media: StreamLink) -> Self {
        self.entity.media = Some(media);
        self
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Adds or replaces a property.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        set_property(&mut self.entity.properties, Property::new(name, value));
        self
    }

    /// Adds a property with an explicit null value.
    pub fn null(mut self, name: impl Into<String>) -> Self {
        set_property(&mut self.entity.properties, Property::null(name));
        self
    }

    /// Adds a fully specified property.
    pub fn raw_property(mut self, property: Property) -> Self {
        set_property(&mut self.entity.properties, property);
        self
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn link(mut self, link: NavigationLink) -> Self {
        self.entity.navigation_links.push(link);
        self
    }

    /// Links a to-one navigation property with the target inlined.
    pub fn expand_one(self, name: impl Into<String>, target: Entity) -> Self {
        self.link(NavigationLink::to_one(name, target))
    }

    /// Links a to-many navigation property with the targets inlined.
    pub fn expand_many(self, name: impl Into<String>, targets: Vec<Entity>) -> Self {
        self.link(NavigationLink::to_many(name, EntityCollection::new(targets)))
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.entity.operations.push(operation);
        self
    }

    /// Builds the entity.
    pub fn build(self) -> Entity {
        self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::InlineData;

    #[test]
    fn test_entity_builder_basic() {
        let entity = EntityBuilder::new("ns.ETTwoPrim")
            .id("ESTwoPrim(1)")
            .property("PropertyInt16", 1i16)
            .property("PropertyString", "a")
            .null("PropertyString")
            .build();

        assert_eq!(entity.type_name, "ns.ETTwoPrim");
        assert_eq!(entity.id.as_deref(), Some("ESTwoPrim(1)"));
        assert_eq!(entity.properties.len(), 2);
        assert!(entity.value("PropertyString").is_some_and(Value::is_null));
    }

    #[test]
    fn test_entity_builder_navigation() {
        let target = EntityBuilder::new("ns.ETTwoPrim")
            .property("PropertyInt16", 2i16)
            .build();
        let entity = EntityBuilder::new("ns.ETAllPrim")
            .expand_one("NavPropertyETTwoPrimOne", target.clone())
            .expand_many("NavPropertyETTwoPrimMany", vec![target])
            .media(StreamLink::new().content_type("image/png"))
            .build();

        assert!(entity.is_media_entity());
        assert_eq!(entity.navigation_links.len(), 2);
        match &entity.navigation_links[1].inline {
            Some(InlineData::Collection(c)) => assert_eq!(c.len(), 1),
            other => panic!("unexpected inline data: {:?}", other),
        }
    }
}
