//! Context URL construction.
//!
//! A context URL has the shape
//! `[root]$metadata#[Collection(]<set>[)][(<key>)][/<path>][(<select>)][/<suffix>]`.
//! Reference responses without an entity set use `$metadata#$ref` and
//! `$metadata#Collection($ref)`.

use std::fmt;

use crate::projection::{ExpandTree, SelectTree};

/// Trailing segment of a context URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    Entity,
    Reference,
    Count,
}

impl Suffix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Suffix::Entity => "$entity",
            Suffix::Reference => "$ref",
            Suffix::Count => "$count",
        }
    }
}

/// Context URL of a response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextUrl {
    pub service_root: Option<String>,
    /// Entity set, singleton or type name.
    pub entity_set: Option<String>,
    pub collection: bool,
    pub key_path: Option<String>,
    pub property_path: Option<String>,
    pub select_list: Option<String>,
    pub suffix: Option<Suffix>,
}

impl ContextUrl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context of an entity set or singleton.
    pub fn entity_set(name: impl Into<String>) -> Self {
        Self {
            entity_set: Some(name.into()),
            ..Self::default()
        }
    }

    /// Context of a single entity of a set (`<set>/$entity`).
    pub fn entity(set: impl Into<String>) -> Self {
        Self::entity_set(set).suffix(Suffix::Entity)
    }

    /// Context of a single reference (`$ref`).
    pub fn reference() -> Self {
        Self::new().suffix(Suffix::Reference)
    }

    /// Context of a reference collection (`Collection($ref)`).
    pub fn reference_collection() -> Self {
        Self::new().as_collection().suffix(Suffix::Reference)
    }

    pub fn service_root(mut self, root: impl Into<String>) -> Self {
        self.service_root = Some(root.into());
        self
    }

    /// Wraps the entity set or type name in `Collection(...)`.
    pub fn as_collection(mut self) -> Self {
        self.collection = true;
        self
    }

    pub fn key_path(mut self, key: impl Into<String>) -> Self {
        self.key_path = Some(key.into());
        self
    }

    /// Navigation or property path below the keyed entity.
    pub fn property_path(mut self, path: impl Into<String>) -> Self {
        self.property_path = Some(path.into());
        self
    }

    pub fn select_list(mut self, list: Option<String>) -> Self {
        self.select_list = list;
        self
    }

    pub fn suffix(mut self, suffix: Suffix) -> Self {
        self.suffix = Some(suffix);
        self
    }

    pub fn is_reference(&self) -> bool {
        self.suffix == Some(Suffix::Reference)
    }
}

impl fmt::Display for ContextUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(root) = &self.service_root {
            f.write_str(root)?;
        }
        f.write_str("$metadata")?;

        let Some(set) = &self.entity_set else {
            if self.is_reference() {
                return if self.collection {
                    f.write_str("#Collection($ref)")
                } else {
                    f.write_str("#$ref")
                };
            }
            return Ok(());
        };

        if self.collection {
            write!(f, "#Collection({})", set)?;
        } else {
            write!(f, "#{}", set)?;
        }
        if let Some(key) = &self.key_path {
            write!(f, "({})", key)?;
        }
        if let Some(path) = &self.property_path {
            write!(f, "/{}", path)?;
        }
        if let Some(list) = &self.select_list {
            write!(f, "({})", list)?;
        }
        if let Some(suffix) = &self.suffix {
            write!(f, "/{}", suffix.as_str())?;
        }
        Ok(())
    }
}

/// Builds the select list of a context URL from the select and expand trees.
///
/// Explicit select paths come first, then every expand item that carries an
/// explicit select or a nested expand, rendered as `Nav(<inner list>)`. Star
/// and plain expand items are not listed.
pub fn build_select_list(select: &SelectTree, expand: Option<&ExpandTree>) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(paths) = select.render() {
        if !paths.is_empty() {
            parts.push(paths);
        }
    }
    if let Some(tree) = expand {
        for item in &tree.items {
            if item.path() == "*" {
                continue;
            }
            if let Some(inner) = build_select_list(&item.select, item.expand.as_ref()) {
                parts.push(format!("{}({})", item.path(), inner));
            }
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}
