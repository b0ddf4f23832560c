//! Entities, entity collections, navigation links and bound operations.

use crate::model::value::{find_property, set_property, Property, StreamLink, Value};

/// A bound operation advertised on an entity or collection.
///
/// Operations are written at full metadata only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Metadata anchor, written as `"#<name>"`.
    pub name: String,
    pub title: String,
    pub target: String,
}

impl Operation {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            target: target.into(),
        }
    }
}

/// Inline data attached to a navigation link.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineData {
    /// To-one target.
    Entity(Box<Entity>),
    /// To-many target.
    Collection(EntityCollection),
}

/// A navigation link from an entity or complex value to related entities.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationLink {
    pub name: String,
    /// URL of the related resource, written as `@odata.navigationLink`.
    pub href: Option<String>,
    pub inline: Option<InlineData>,
}

impl NavigationLink {
    /// Creates a link with neither a URL nor inline data.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: None,
            inline: None,
        }
    }

    /// Creates a to-one link with the related entity inlined.
    pub fn to_one(name: impl Into<String>, entity: Entity) -> Self {
        Self::new(name).with_inline(InlineData::Entity(Box::new(entity)))
    }

    /// Creates a to-many link with the related entities inlined.
    pub fn to_many(name: impl Into<String>, entities: EntityCollection) -> Self {
        Self::new(name).with_inline(InlineData::Collection(entities))
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_inline(mut self, inline: InlineData) -> Self {
        self.inline = Some(inline);
        self
    }
}

/// Looks up a navigation link by name.
pub(crate) fn find_link<'a>(links: &'a [NavigationLink], name: &str) -> Option<&'a NavigationLink> {
    links.iter().find(|l| l.name == name)
}

/// An entity instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    /// Qualified runtime type name.
    pub type_name: String,
    /// Canonical id; derived from the entity set and keys when unset.
    pub id: Option<String>,
    pub etag: Option<String>,
    /// Media metadata; `Some` marks a media entity.
    pub media: Option<StreamLink>,
    /// When set, the entity is a `$ref` stub and every other field is ignored.
    pub reference: Option<String>,
    pub properties: Vec<Property>,
    pub navigation_links: Vec<NavigationLink>,
    pub operations: Vec<Operation>,
}

impl Entity {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Creates a reference stub pointing at `id`.
    pub fn reference(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            reference: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn is_media_entity(&self) -> bool {
        self.media.is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        find_property(&self.properties, name)
    }

    /// Returns the property value, treating an absent property as `None`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).map(|p| &p.value)
    }

    pub fn navigation_link(&self, name: &str) -> Option<&NavigationLink> {
        find_link(&self.navigation_links, name)
    }

    /// Adds or replaces a property in place.
    pub fn set(&mut self, property: Property) {
        set_property(&mut self.properties, property);
    }

    /// Removes a property, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Property> {
        let idx = self.properties.iter().position(|p| p.name == name)?;
        Some(self.properties.remove(idx))
    }

    /// Returns a snapshot of this entity without bound operations.
    ///
    /// Inlined entities and collections are stripped as well.
    pub fn without_operations(&self) -> Entity {
        let mut snapshot = self.clone();
        snapshot.strip_operations();
        snapshot
    }

    fn strip_operations(&mut self) {
        self.operations.clear();
        for link in &mut self.navigation_links {
            match &mut link.inline {
                Some(InlineData::Entity(e)) => e.strip_operations(),
                Some(InlineData::Collection(c)) => c.strip_operations(),
                None => {}
            }
        }
    }
}

/// An ordered collection of entities.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityCollection {
    pub entities: Vec<Entity>,
    /// Total count, written as `@odata.count` when requested.
    pub count: Option<u64>,
    pub next_link: Option<String>,
    pub operations: Vec<Operation>,
}

impl EntityCollection {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            ..Self::default()
        }
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_next_link(mut self, href: impl Into<String>) -> Self {
        self.next_link = Some(href.into());
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns a snapshot of this collection and its entities without bound operations.
    pub fn without_operations(&self) -> EntityCollection {
        let mut snapshot = self.clone();
        snapshot.strip_operations();
        snapshot
    }

    fn strip_operations(&mut self) {
        self.operations.clear();
        for entity in &mut self.entities {
            entity.strip_operations();
        }
    }
}

impl FromIterator<Entity> for EntityCollection {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Entity {
        let mut child = Entity::new("ns.ETTwoPrim");
        child.operations.push(Operation::new("ns.BAETTwoPrim", "BA", "ESTwoPrim(1)/ns.BA"));

        let mut entity = Entity::new("ns.ETAllPrim");
        entity.set(Property::new("PropertyInt16", 1i16));
        entity.operations.push(Operation::new("ns.BAETAllPrim", "BA", "ESAllPrim(1)/ns.BA"));
        entity
            .navigation_links
            .push(NavigationLink::to_one("NavPropertyETTwoPrimOne", child));
        entity
    }

    #[test]
    fn test_without_operations_is_snapshot() {
        let entity = sample();
        let stripped = entity.without_operations();

        assert!(stripped.operations.is_empty());
        match &stripped.navigation_links[0].inline {
            Some(InlineData::Entity(e)) => assert!(e.operations.is_empty()),
            other => panic!("unexpected inline data: {:?}", other),
        }
        assert_eq!(entity.operations.len(), 1);
    }

    #[test]
    fn test_set_and_remove() {
        let mut entity = sample();
        entity.set(Property::new("PropertyInt16", 2i16));
        assert_eq!(entity.properties.len(), 1);
        assert_eq!(entity.value("PropertyInt16"), Some(&Value::from(2i16)));
        assert!(entity.remove("PropertyInt16").is_some());
        assert!(entity.get("PropertyInt16").is_none());
        assert!(entity.remove("PropertyInt16").is_none());
    }

    #[test]
    fn test_reference_entity() {
        let r = Entity::reference("ns.ETAllPrim", "ESAllPrim(0)");
        assert_eq!(r.reference.as_deref(), Some("ESAllPrim(0)"));
        assert!(!r.is_media_entity());
    }
}
