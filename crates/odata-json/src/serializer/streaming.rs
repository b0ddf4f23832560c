//! Incremental output for lazily produced collections.
//!
//! Items are pulled one at a time from a single-pass iterator and written
//! into the emitter's buffer. The buffer goes to the sink only at item
//! boundaries once it exceeds [`FLUSH_THRESHOLD`]. When an item fails and an
//! error callback is registered, the unflushed buffer is dropped and the
//! callback writes the rest of the response.

use std::io::Write;

use tracing::{debug, warn};

use crate::edm::{EntityType, TypeRef};
use crate::error::SerializeError;
use crate::model::entity::{Entity, Operation};
use crate::model::value::{ComplexValue, Value};
use crate::options::{MetadataLevel, SerializeOptions};
use crate::projection::{ExpandScope, SelectTree};

use super::emitter::{collection_type_annotation, Emitter};
use super::{require_context, JsonSerializer};

/// Buffered bytes that trigger a flush at the next item boundary.
pub const FLUSH_THRESHOLD: usize = 8 * 1024;

/// Collection-level annotations of a streamed entity collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionInfo {
    /// Written as `@odata.count` when the options request a count.
    pub count: Option<u64>,
    pub next_link: Option<String>,
    pub operations: Vec<Operation>,
}

impl CollectionInfo {
    pub fn new() -> Self {
        Self::default()
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
}

fn flush_at_boundary<W: Write>(emitter: &mut Emitter<'_>, sink: &mut W) -> Result<(), SerializeError> {
    if emitter.out.len() >= FLUSH_THRESHOLD {
        sink.write_all(&emitter.out.take_bytes())?;
    }
    Ok(())
}

/// Flushes a finished stream, or hands a failure to the error callback.
fn complete<W: Write>(
    mut emitter: Emitter<'_>,
    sink: &mut W,
    result: Result<(), SerializeError>,
    options: &SerializeOptions,
) -> Result<(), SerializeError> {
    let err = match result {
        Ok(()) => {
            sink.write_all(&emitter.out.take_bytes())?;
            sink.flush()?;
            return Ok(());
        }
        Err(err) => err,
    };

    match &options.write_error_callback {
        Some(callback) if !matches!(err, SerializeError::Io(_)) => {
            warn!(key = %err.message_key(), error = %err, "streamed item failed, invoking error callback");
            emitter.out.discard();
            let handler = &**callback;
            handler(&err, &mut *sink)?;
            sink.flush()?;
            Ok(())
        }
        _ => Err(err),
    }
}

fn write_entities<I, W>(
    emitter: &mut Emitter<'_>,
    sink: &mut W,
    et: &EntityType,
    entities: I,
    info: &CollectionInfo,
    select: &SelectTree,
    scope: &ExpandScope<'_>,
) -> Result<(), SerializeError>
where
    I: IntoIterator<Item = Entity>,
    W: Write,
{
    emitter.begin_entity_collection(info.count, &info.operations)?;
    for entity in entities {
        emitter.entity(et, &entity, select, scope, false)?;
        flush_at_boundary(emitter, sink)?;
    }
    emitter.end_entity_collection(info.next_link.as_deref())?;
    Ok(())
}

/// Opens `{…,"value":[` for a primitive or complex collection.
fn begin_value_collection(
    emitter: &mut Emitter<'_>,
    type_ref: &TypeRef,
    options: &SerializeOptions,
) -> Result<(), SerializeError> {
    emitter.out.begin_object();
    emitter.preamble()?;
    if options.metadata == MetadataLevel::Full {
        emitter.type_member(&collection_type_annotation(type_ref))?;
    }
    emitter.out.name("value")?;
    emitter.out.begin_array();
    Ok(())
}

fn end_value_collection(emitter: &mut Emitter<'_>) {
    emitter.out.end_array();
    emitter.out.end_object();
}

fn write_values<I, W>(
    emitter: &mut Emitter<'_>,
    sink: &mut W,
    type_ref: &TypeRef,
    name: &str,
    items: I,
    options: &SerializeOptions,
) -> Result<(), SerializeError>
where
    I: IntoIterator<Item = Value>,
    W: Write,
{
    let nullable = options.nullable.unwrap_or(true);
    begin_value_collection(emitter, type_ref, options)?;
    for item in items {
        emitter.collection_item(
            type_ref,
            name,
            &item,
            nullable,
            &SelectTree::All,
            &ExpandScope::None,
        )?;
        flush_at_boundary(emitter, sink)?;
    }
    end_value_collection(emitter);
    Ok(())
}

fn write_complex_values<I, W>(
    emitter: &mut Emitter<'_>,
    sink: &mut W,
    complex_type: &str,
    name: &str,
    items: I,
    options: &SerializeOptions,
) -> Result<(), SerializeError>
where
    I: IntoIterator<Item = ComplexValue>,
    W: Write,
{
    let type_ref = TypeRef::Complex(complex_type.to_string());
    let scope = ExpandScope::root(options.expand.as_ref());
    begin_value_collection(emitter, &type_ref, options)?;
    for item in items {
        emitter.complex(name, complex_type, &item, None, &options.select, &scope)?;
        flush_at_boundary(emitter, sink)?;
    }
    end_value_collection(emitter);
    Ok(())
}

impl<'a> JsonSerializer<'a> {
    /// Streams an entity collection to `sink`.
    ///
    /// Option checks fail before anything is written. Failures while writing
    /// items go to the write error callback if one is registered.
    pub fn entity_collection_streamed<I, W>(
        &self,
        entity_type: &str,
        entities: I,
        info: &CollectionInfo,
        options: &SerializeOptions,
        sink: &mut W,
    ) -> Result<(), SerializeError>
    where
        I: IntoIterator<Item = Entity>,
        W: Write,
    {
        debug!(entity_type, metadata = %options.metadata, "streaming entity collection");
        require_context(options)?;
        let et = self.entity_type(entity_type)?;
        let scope = ExpandScope::root(options.expand.as_ref());

        let mut emitter = self.emitter(options);
        let result = write_entities(&mut emitter, sink, et, entities, info, &options.select, &scope);
        complete(emitter, sink, result, options)
    }

    /// Streams a primitive collection to `sink`; `name` identifies the values in errors.
    pub fn primitive_collection_streamed<I, W>(
        &self,
        type_ref: &TypeRef,
        name: &str,
        items: I,
        options: &SerializeOptions,
        sink: &mut W,
    ) -> Result<(), SerializeError>
    where
        I: IntoIterator<Item = Value>,
        W: Write,
    {
        debug!(property = name, type_name = %type_ref.annotation_name(), metadata = %options.metadata, "streaming primitive collection");
        if let TypeRef::Complex(complex) = type_ref {
            return Err(SerializeError::unsupported_type(name, complex));
        }
        require_context(options)?;

        let mut emitter = self.emitter(options);
        let result = write_values(&mut emitter, sink, type_ref, name, items, options);
        complete(emitter, sink, result, options)
    }

    /// Streams a complex collection to `sink`.
    pub fn complex_collection_streamed<I, W>(
        &self,
        complex_type: &str,
        name: &str,
        items: I,
        options: &SerializeOptions,
        sink: &mut W,
    ) -> Result<(), SerializeError>
    where
        I: IntoIterator<Item = ComplexValue>,
        W: Write,
    {
        debug!(complex_type, property = name, metadata = %options.metadata, "streaming complex collection");
        require_context(options)?;

        let mut emitter = self.emitter(options);
        let result = write_complex_values(&mut emitter, sink, complex_type, name, items, options);
        complete(emitter, sink, result, options)
    }
}
