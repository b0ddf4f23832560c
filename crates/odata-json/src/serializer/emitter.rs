//! Recursive writer behind the serializer entry points.
//!
//! An [`Emitter`] owns the output buffer and the ancestry chain of one call.
//! Entities, complex values and collections are written depth-first; the
//! active select tree and expand scope are passed down explicitly.

use std::io;

use tracing::trace;

use crate::codec::geo::{check_geo_kind, encode_geospatial};
use crate::codec::key::{entity_id, key_predicate};
use crate::codec::primitive::{format_enum, format_scalar};
use crate::codec::writer::JsonWriter;
use crate::context_url::ContextUrl;
use crate::edm::{Edm, EntityType, NavigationDecl, PrimitiveKind, PropertyDecl, TypeRef};
use crate::error::SerializeError;
use crate::model::entity::{find_link, Entity, InlineData, NavigationLink, Operation};
use crate::model::value::{ComplexValue, EnumValue, Property, Scalar, StreamLink, Value};
use crate::options::{MetadataLevel, SerializeOptions};
use crate::projection::{Ancestry, ExpandScope, Expansion, Identity, SelectTree};

/// Initial output buffer size.
const INITIAL_CAPACITY: usize = 1024;

/// Returns the `@odata.type` value written before a single value at full
/// metadata, or `None` when the JSON token already implies the type.
pub(crate) fn value_type_annotation(type_ref: &TypeRef) -> Option<String> {
    match type_ref {
        TypeRef::Primitive(kind) if kind.is_inferable() => None,
        TypeRef::Complex(_) => None,
        other => Some(format!("#{}", other.annotation_name())),
    }
}

/// Returns the `@odata.type` value of a collection of `type_ref`.
pub(crate) fn collection_type_annotation(type_ref: &TypeRef) -> String {
    format!("#Collection({})", type_ref.annotation_name())
}

/// Resolves the runtime type of an entity; an empty or equal name means the declared type.
fn runtime_entity_type<'t>(
    edm: &'t Edm,
    declared: &'t EntityType,
    entity: &Entity,
) -> Result<&'t EntityType, SerializeError> {
    if entity.type_name.is_empty() || entity.type_name == declared.name {
        return Ok(declared);
    }
    edm.entity_type(&entity.type_name)
        .ok_or_else(|| SerializeError::unsupported_type(&declared.name, &entity.type_name))
}

/// Writes one serialization call into a buffer.
pub(crate) struct Emitter<'a> {
    edm: &'a Edm,
    options: &'a SerializeOptions,
    metadata_etag: Option<&'a str>,
    service_root: Option<&'a str>,
    pub(crate) out: JsonWriter,
    ancestry: Ancestry,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(
        edm: &'a Edm,
        options: &'a SerializeOptions,
        metadata_etag: Option<&'a str>,
        service_root: Option<&'a str>,
    ) -> Self {
        Self {
            edm,
            options,
            metadata_etag,
            service_root,
            out: JsonWriter::with_capacity(INITIAL_CAPACITY),
            ancestry: Ancestry::new(),
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.out.into_bytes()
    }

    fn full(&self) -> bool {
        self.options.metadata == MetadataLevel::Full
    }

    /// True above metadata level `none`.
    fn annotated(&self) -> bool {
        self.options.metadata != MetadataLevel::None
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    /// Writes `@odata.context` and `@odata.metadataEtag` of a top-level response.
    pub(crate) fn preamble(&mut self) -> io::Result<()> {
        if !self.annotated() {
            return Ok(());
        }
        let options = self.options;
        if let Some(url) = &options.context_url {
            self.context(url)?;
        }
        if let Some(etag) = self.metadata_etag {
            self.out.string_member("@odata.metadataEtag", etag)?;
        }
        Ok(())
    }

    fn context(&mut self, url: &ContextUrl) -> io::Result<()> {
        let text = match (self.service_root, &url.service_root) {
            (Some(root), None) => url.clone().service_root(root).to_string(),
            _ => url.to_string(),
        };
        self.out.string_member("@odata.context", &text)
    }

    /// Writes the context of a reference response, defaulting to the `$ref` forms.
    pub(crate) fn reference_context(&mut self, collection: bool) -> io::Result<()> {
        if !self.annotated() {
            return Ok(());
        }
        let options = self.options;
        match &options.context_url {
            Some(url) => self.context(url),
            None if collection => self.context(&ContextUrl::reference_collection()),
            None => self.context(&ContextUrl::reference()),
        }
    }

    pub(crate) fn type_member(&mut self, type_name: &str) -> io::Result<()> {
        self.out.string_member("@odata.type", type_name)
    }

    pub(crate) fn count_member(&mut self, name: &str, count: u64) -> io::Result<()> {
        self.out.name(name)?;
        self.out.integer(count, self.options.ieee754_compatible);
        Ok(())
    }

    fn operations(&mut self, operations: &[Operation]) -> io::Result<()> {
        for operation in operations {
            self.out.name(&format!("#{}", operation.name))?;
            self.out.begin_object();
            self.out.string_member("title", &operation.title)?;
            self.out.string_member("target", &operation.target)?;
            self.out.end_object();
        }
        Ok(())
    }

    /// Writes media annotations, prefixed by a stream property name if any.
    ///
    /// With `links`, the edit link is written, or the read link if there is
    /// no edit link.
    fn media_annotations(&mut self, prefix: &str, media: &StreamLink, links: bool) -> io::Result<()> {
        if let Some(etag) = &media.etag {
            self.out.string_member(&format!("{}@odata.mediaEtag", prefix), etag)?;
        }
        if let Some(content_type) = &media.content_type {
            self.out
                .string_member(&format!("{}@odata.mediaContentType", prefix), content_type)?;
        }
        if links {
            if let Some(href) = &media.edit_link {
                self.out.string_member(&format!("{}@odata.mediaEditLink", prefix), href)?;
            } else if let Some(href) = &media.read_link {
                self.out.string_member(&format!("{}@odata.mediaReadLink", prefix), href)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Entity collections
    // =========================================================================

    /// Opens an entity collection up to and including the `value` array.
    pub(crate) fn begin_entity_collection(
        &mut self,
        count: Option<u64>,
        operations: &[Operation],
    ) -> io::Result<()> {
        self.out.begin_object();
        self.preamble()?;
        if let (true, Some(count)) = (self.options.count, count) {
            self.count_member("@odata.count", count)?;
        }
        if self.full() {
            self.operations(operations)?;
        }
        self.out.name("value")?;
        self.out.begin_array();
        Ok(())
    }

    pub(crate) fn end_entity_collection(&mut self, next_link: Option<&str>) -> io::Result<()> {
        self.out.end_array();
        if let Some(href) = next_link {
            self.out.string_member("@odata.nextLink", href)?;
        }
        self.out.end_object();
        Ok(())
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Writes an entity object. With `top`, the response preamble comes first.
    pub(crate) fn entity(
        &mut self,
        declared: &EntityType,
        entity: &Entity,
        select: &SelectTree,
        scope: &ExpandScope<'_>,
        top: bool,
    ) -> Result<(), SerializeError> {
        if let Some(reference) = &entity.reference {
            self.out.begin_object();
            if top {
                self.preamble()?;
            }
            self.out.string_member("@odata.id", reference)?;
            self.out.end_object();
            return Ok(());
        }

        let et = runtime_entity_type(self.edm, declared, entity)?;
        let identity = if scope.tracks_ancestry() {
            self.identity(et, entity)
        } else {
            None
        };
        let tracked = identity.is_some();
        if let Some(identity) = identity {
            self.ancestry.push(identity);
        }
        let result = self.entity_members(declared, et, entity, select, scope, top);
        if tracked {
            self.ancestry.pop();
        }
        result
    }

    fn entity_members(
        &mut self,
        declared: &EntityType,
        et: &EntityType,
        entity: &Entity,
        select: &SelectTree,
        scope: &ExpandScope<'_>,
        top: bool,
    ) -> Result<(), SerializeError> {
        let edm = self.edm;
        self.out.begin_object();
        if top {
            self.preamble()?;
        }
        if self.annotated() {
            if let Some(etag) = &entity.etag {
                self.out.string_member("@odata.etag", etag)?;
            }
            if let Some(media) = &entity.media {
                self.media_annotations("", media, true)?;
            }
            if self.full() || et.name != declared.name {
                self.type_member(&format!("#{}", et.name))?;
            }
        }

        let keys = edm.entity_keys(et);
        if self.full() || (self.annotated() && !select.covers_keys(keys)) {
            let id = entity_id(edm, et, entity)?;
            self.out.string_member("@odata.id", &id)?;
        }

        for decl in edm.entity_properties(et) {
            if !select.includes(&decl.name) {
                continue;
            }
            let property = entity.get(&decl.name);
            let missing = property.is_none_or(|p| p.value.is_null());
            let is_key = keys.iter().any(|k| k.path.first() == Some(&decl.name));
            if missing && is_key && !decl.nullable && entity.id.is_none() {
                return Err(SerializeError::MissingId {
                    entity_type: et.name.clone(),
                });
            }
            self.property(decl, property, select, scope)?;
        }

        for nav in edm.entity_navigations(et) {
            self.navigation(nav, entity.navigation_link(&nav.name), select, scope)?;
        }
        if self.full() {
            self.operations(&entity.operations)?;
        }
        self.out.end_object();
        Ok(())
    }

    fn identity(&self, et: &EntityType, entity: &Entity) -> Option<Identity> {
        key_predicate(self.edm, et, entity)
            .ok()
            .map(|key| (et.name.clone(), key))
    }

    /// Returns the id written for a reference to `entity`.
    pub(crate) fn reference_id(
        &self,
        declared: &EntityType,
        entity: &Entity,
    ) -> Result<String, SerializeError> {
        if let Some(reference) = &entity.reference {
            return Ok(reference.clone());
        }
        let et = runtime_entity_type(self.edm, declared, entity)?;
        entity_id(self.edm, et, entity)
    }

    /// Writes `{"@odata.id": …}` for `entity`.
    pub(crate) fn reference_stub(
        &mut self,
        declared: &EntityType,
        entity: &Entity,
    ) -> Result<(), SerializeError> {
        let id = self.reference_id(declared, entity)?;
        self.out.begin_object();
        self.out.string_member("@odata.id", &id)?;
        self.out.end_object();
        Ok(())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    fn navigation(
        &mut self,
        nav: &NavigationDecl,
        link: Option<&NavigationLink>,
        select: &SelectTree,
        scope: &ExpandScope<'_>,
    ) -> Result<(), SerializeError> {
        let Some(expansion) = scope.resolve(&nav.name) else {
            if self.full() && select.includes(&nav.name) {
                if let Some(href) = link.and_then(|l| l.href.as_deref()) {
                    self.out
                        .string_member(&format!("{}@odata.navigationLink", nav.name), href)?;
                }
            }
            return Ok(());
        };

        let edm = self.edm;
        let target = edm
            .entity_type(&nav.target)
            .ok_or_else(|| SerializeError::unsupported_type(&nav.name, &nav.target))?;
        let inline = link.and_then(|l| l.inline.as_ref());

        let item = match &expansion {
            Expansion::References { item } | Expansion::Inline { item, .. } => *item,
        };
        if item.count && nav.collection {
            let count = match inline {
                Some(InlineData::Collection(c)) => c.count.unwrap_or(c.len() as u64),
                Some(InlineData::Entity(_)) => 1,
                None => 0,
            };
            self.count_member(&format!("{}@odata.count", nav.name), count)?;
        }

        self.out.name(&nav.name)?;
        match expansion {
            Expansion::References { item } => {
                if !item.refs_only {
                    trace!(navigation = %nav.name, "expansion cut by level");
                }
                self.inline_data(nav, inline, |emitter, entity| {
                    emitter.reference_stub(target, entity)
                })?;
            }
            Expansion::Inline {
                item,
                scope: inner,
                levels,
            } => self.inline_data(nav, inline, |emitter, entity| {
                emitter.expanded(target, entity, &item.select, &inner, levels)
            })?,
        }

        if let (true, Some(InlineData::Collection(collection))) = (nav.collection, inline) {
            if let Some(href) = &collection.next_link {
                self.out
                    .string_member(&format!("{}@odata.nextLink", nav.name), href)?;
            }
        }
        Ok(())
    }

    /// Writes the targets of an expanded link in the shape of the navigation property.
    fn inline_data<F>(
        &mut self,
        nav: &NavigationDecl,
        inline: Option<&InlineData>,
        mut write: F,
    ) -> Result<(), SerializeError>
    where
        F: FnMut(&mut Self, &Entity) -> Result<(), SerializeError>,
    {
        match inline {
            None if nav.collection => {
                self.out.begin_array();
                self.out.end_array();
            }
            None => self.out.null(),
            Some(InlineData::Entity(entity)) if nav.collection => {
                self.out.begin_array();
                write(self, entity)?;
                self.out.end_array();
            }
            Some(InlineData::Entity(entity)) => write(self, entity)?,
            Some(InlineData::Collection(collection)) if nav.collection => {
                self.out.begin_array();
                for entity in &collection.entities {
                    write(self, entity)?;
                }
                self.out.end_array();
            }
            Some(InlineData::Collection(collection)) => match collection.entities.first() {
                Some(entity) => write(self, entity)?,
                None => self.out.null(),
            },
        }
        Ok(())
    }

    /// Writes an expanded entity, or a stub if it closes a cycle in `$levels` mode.
    fn expanded(
        &mut self,
        declared: &EntityType,
        entity: &Entity,
        select: &SelectTree,
        scope: &ExpandScope<'_>,
        levels: bool,
    ) -> Result<(), SerializeError> {
        if levels && entity.reference.is_none() {
            let et = runtime_entity_type(self.edm, declared, entity)?;
            if let Some(identity) = self.identity(et, entity) {
                if self.ancestry.contains(&identity) {
                    trace!(
                        entity_type = %identity.0,
                        key = %identity.1,
                        depth = self.ancestry.depth(),
                        "expansion cut by cycle"
                    );
                    return self.reference_stub(declared, entity);
                }
            }
        }
        self.entity(declared, entity, select, scope, false)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    fn property(
        &mut self,
        decl: &PropertyDecl,
        property: Option<&Property>,
        select: &SelectTree,
        scope: &ExpandScope<'_>,
    ) -> Result<(), SerializeError> {
        let null = Value::Null;
        let value = property.map_or(&null, |p| &p.value);
        let name = decl.name.as_str();

        if decl.type_ref == TypeRef::Primitive(PrimitiveKind::Stream) {
            return self.stream_property(name, value);
        }
        if value.is_null() && !decl.nullable {
            return Err(SerializeError::MissingProperty {
                property: decl.name.clone(),
            });
        }

        let (select, scope) = match decl.type_ref {
            TypeRef::Complex(_) => (select.nested(name), scope.descend(name)),
            _ => (SelectTree::All, ExpandScope::None),
        };

        if decl.collection {
            if self.full() {
                self.out.string_member(
                    &format!("{}@odata.type", name),
                    &collection_type_annotation(&decl.type_ref),
                )?;
            }
            self.out.name(name)?;
            return match value {
                Value::Null => {
                    self.out.begin_array();
                    self.out.end_array();
                    Ok(())
                }
                Value::Collection(items) => {
                    self.collection_items(&decl.type_ref, name, items, decl.nullable, &select, &scope)
                }
                other => Err(SerializeError::wrong_value(name, other.describe())),
            };
        }

        if self.full() && !value.is_null() {
            if let Some(annotation) = value_type_annotation(&decl.type_ref) {
                self.out
                    .string_member(&format!("{}@odata.type", name), &annotation)?;
            }
        }
        self.out.name(name)?;
        let hint = property.and_then(|p| p.type_name.as_deref());
        self.value(&decl.type_ref, name, value, hint, &select, &scope)
    }

    fn stream_property(&mut self, name: &str, value: &Value) -> Result<(), SerializeError> {
        if !self.annotated() {
            return Ok(());
        }
        let link = match value {
            Value::Primitive(Scalar::Stream(link)) => Some(link),
            Value::Null => None,
            other => return Err(SerializeError::wrong_value(name, other.describe())),
        };
        let full = self.full();
        if full {
            self.out
                .string_member(&format!("{}@odata.type", name), "#Stream")?;
        }
        if let Some(link) = link {
            self.media_annotations(name, link, full)?;
        }
        Ok(())
    }

    /// Writes a single value of the declared type. `hint` names a derived complex type.
    pub(crate) fn value(
        &mut self,
        type_ref: &TypeRef,
        name: &str,
        value: &Value,
        hint: Option<&str>,
        select: &SelectTree,
        scope: &ExpandScope<'_>,
    ) -> Result<(), SerializeError> {
        match (type_ref, value) {
            (_, Value::Null) => {
                self.out.null();
                Ok(())
            }
            (TypeRef::Complex(type_name), Value::Complex(complex)) => {
                self.complex(name, type_name, complex, hint, select, scope)
            }
            (TypeRef::Enum(type_name), Value::Enum(enum_value)) => {
                self.enumeration(name, type_name, enum_value)
            }
            (TypeRef::Enum(type_name), Value::Primitive(scalar)) => match scalar.as_i64() {
                Some(v) => self.enumeration(
                    name,
                    type_name,
                    &EnumValue {
                        type_name: type_name.clone(),
                        value: v,
                    },
                ),
                None => Err(SerializeError::wrong_value(name, scalar)),
            },
            (TypeRef::Complex(_) | TypeRef::Enum(_), other) => {
                Err(SerializeError::wrong_value(name, other.describe()))
            }
            (TypeRef::Primitive(_) | TypeRef::Definition(_), _) => {
                let kind = self.edm.primitive_kind(type_ref).ok_or_else(|| {
                    SerializeError::unsupported_type(name, &type_ref.annotation_name())
                })?;
                self.primitive(kind, name, value)
            }
        }
    }

    fn enumeration(
        &mut self,
        name: &str,
        type_name: &str,
        value: &EnumValue,
    ) -> Result<(), SerializeError> {
        let enum_type = self
            .edm
            .enum_type(type_name)
            .ok_or_else(|| SerializeError::unsupported_type(name, type_name))?;
        format_enum(enum_type, value).write_to(&mut self.out)?;
        Ok(())
    }

    fn primitive(&mut self, kind: PrimitiveKind, name: &str, value: &Value) -> Result<(), SerializeError> {
        match value {
            Value::Primitive(scalar) => {
                format_scalar(kind, scalar, self.options.ieee754_compatible, name)?
                    .write_to(&mut self.out)?;
            }
            Value::Geospatial(geo) if kind.is_geospatial() => {
                check_geo_kind(kind, geo, name)?;
                let json = encode_geospatial(geo, name)?;
                self.out.json_value(&json)?;
            }
            other => return Err(SerializeError::wrong_value(name, other.describe())),
        }
        Ok(())
    }

    // =========================================================================
    // Complex values and collections
    // =========================================================================

    pub(crate) fn complex(
        &mut self,
        name: &str,
        type_name: &str,
        complex: &ComplexValue,
        hint: Option<&str>,
        select: &SelectTree,
        scope: &ExpandScope<'_>,
    ) -> Result<(), SerializeError> {
        self.out.begin_object();
        self.complex_members(name, type_name, complex, hint, select, scope)?;
        self.out.end_object();
        Ok(())
    }

    /// Writes the members of a complex value into the open object.
    pub(crate) fn complex_members(
        &mut self,
        name: &str,
        type_name: &str,
        complex: &ComplexValue,
        hint: Option<&str>,
        select: &SelectTree,
        scope: &ExpandScope<'_>,
    ) -> Result<(), SerializeError> {
        let edm = self.edm;
        let declared = edm
            .complex_type(type_name)
            .ok_or_else(|| SerializeError::unsupported_type(name, type_name))?;
        let derived = complex
            .type_name
            .as_deref()
            .or(hint)
            .filter(|t| *t != declared.name);
        let ct = match derived {
            Some(t) => edm
                .complex_type(t)
                .ok_or_else(|| SerializeError::unsupported_type(name, t))?,
            None => declared,
        };

        if self.full() || (self.annotated() && derived.is_some()) {
            self.type_member(&format!("#{}", ct.name))?;
        }
        for decl in edm.complex_properties(ct) {
            if select.includes(&decl.name) {
                self.property(decl, complex.get(&decl.name), select, scope)?;
            }
        }
        for nav in edm.complex_navigations(ct) {
            self.navigation(nav, find_link(&complex.navigation_links, &nav.name), select, scope)?;
        }
        Ok(())
    }

    pub(crate) fn collection_items(
        &mut self,
        type_ref: &TypeRef,
        name: &str,
        items: &[Value],
        nullable: bool,
        select: &SelectTree,
        scope: &ExpandScope<'_>,
    ) -> Result<(), SerializeError> {
        self.out.begin_array();
        for item in items {
            self.collection_item(type_ref, name, item, nullable, select, scope)?;
        }
        self.out.end_array();
        Ok(())
    }

    /// Writes one collection item; a null item is rejected unless `nullable`.
    pub(crate) fn collection_item(
        &mut self,
        type_ref: &TypeRef,
        name: &str,
        item: &Value,
        nullable: bool,
        select: &SelectTree,
        scope: &ExpandScope<'_>,
    ) -> Result<(), SerializeError> {
        if item.is_null() && !nullable {
            return Err(SerializeError::wrong_value(name, "null"));
        }
        self.value(type_ref, name, item, None, select, scope)
    }
}
