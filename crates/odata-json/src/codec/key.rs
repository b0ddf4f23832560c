//! Key predicates and canonical entity ids.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;

use crate::codec::primitive::{format_scalar, Token};
use crate::edm::{Edm, EntityType, KeyRef, PrimitiveKind, PropertyDecl, TypeRef};
use crate::error::SerializeError;
use crate::model::entity::Entity;
use crate::model::value::{find_property, Property, Scalar, Value};

/// Renders a key value as a URI literal.
///
/// Strings are single-quoted with embedded quotes doubled; durations and
/// binaries carry their type prefix; other kinds use their JSON text.
pub fn key_literal(kind: PrimitiveKind, scalar: &Scalar, property: &str) -> Result<String, SerializeError> {
    if let (PrimitiveKind::Binary, Scalar::Binary(bytes)) = (kind, scalar) {
        return Ok(format!("binary'{}'", URL_SAFE.encode(bytes)));
    }
    let literal = match format_scalar(kind, scalar, false, property)? {
        Token::Number(n) => n,
        Token::Bool(b) => b.to_string(),
        Token::Text(s) => match kind {
            PrimitiveKind::String => format!("'{}'", s.replace('\'', "''")),
            PrimitiveKind::Duration => format!("duration'{}'", s),
            _ => s,
        },
    };
    Ok(literal)
}

/// Resolves a key path to its declaration and value.
fn resolve_key<'a>(
    edm: &'a Edm,
    entity_type: &'a EntityType,
    properties: &'a [Property],
    key: &KeyRef,
) -> Option<(&'a PropertyDecl, &'a Value)> {
    let mut decls = edm.entity_properties(entity_type);
    let mut props = properties;
    let mut found = None;

    for (i, segment) in key.path.iter().enumerate() {
        let decl = decls.iter().copied().find(|d| &d.name == segment)?;
        let value = &find_property(props, segment)?.value;
        if i + 1 == key.path.len() {
            found = Some((decl, value));
            break;
        }
        let (TypeRef::Complex(type_name), Value::Complex(complex)) = (&decl.type_ref, value) else {
            return None;
        };
        decls = edm.complex_properties(edm.complex_type(type_name)?);
        props = &complex.properties;
    }
    found
}

/// Builds the key predicate of an entity, without parentheses.
///
/// A single unaliased key renders as its literal alone; otherwise the
/// predicate is `Name=literal` pairs joined by `,`, named by alias if any.
pub fn key_predicate(edm: &Edm, entity_type: &EntityType, entity: &Entity) -> Result<String, SerializeError> {
    let missing = || SerializeError::MissingId {
        entity_type: entity_type.name.clone(),
    };
    let keys = edm.entity_keys(entity_type);
    if keys.is_empty() {
        return Err(missing());
    }

    let mut parts = Vec::with_capacity(keys.len());
    for key in keys {
        let (decl, value) = resolve_key(edm, entity_type, &entity.properties, key).ok_or_else(missing)?;
        let scalar = match value {
            Value::Primitive(scalar) => scalar,
            Value::Null => return Err(missing()),
            other => return Err(SerializeError::wrong_value(&decl.name, other.describe())),
        };
        let kind = edm
            .primitive_kind(&decl.type_ref)
            .ok_or_else(|| SerializeError::unsupported_type(&decl.name, &decl.type_ref.annotation_name()))?;
        parts.push((key, key_literal(kind, scalar, &decl.name)?));
    }

    if let [(key, literal)] = parts.as_slice() {
        if key.alias.is_none() {
            return Ok(literal.clone());
        }
    }
    Ok(parts
        .iter()
        .map(|(key, literal)| format!("{}={}", key.predicate_name(), literal))
        .collect::<Vec<_>>()
        .join(","))
}

/// Returns the canonical id of an entity.
///
/// Uses the entity's own id when set, else `<EntitySet>(<key predicate>)`.
pub fn entity_id(edm: &Edm, entity_type: &EntityType, entity: &Entity) -> Result<String, SerializeError> {
    if let Some(id) = &entity.id {
        return Ok(id.clone());
    }
    let set = edm.entity_set(entity_type).ok_or_else(|| SerializeError::MissingId {
        entity_type: entity_type.name.clone(),
    })?;
    Ok(format!("{}({})", set, key_predicate(edm, entity_type, entity)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::model::builder::EntityBuilder;
    use crate::model::temporal::Duration;

    #[test]
    fn test_key_literals() {
        assert_eq!(
            key_literal(PrimitiveKind::String, &Scalar::from("O'Neil"), "P").unwrap(),
            "'O''Neil'"
        );
        assert_eq!(key_literal(PrimitiveKind::Int16, &Scalar::Int16(-1), "P").unwrap(), "-1");
        assert_eq!(
            key_literal(PrimitiveKind::Duration, &Scalar::Duration(Duration::from_secs(6)), "P").unwrap(),
            "duration'PT6S'"
        );
        assert_eq!(key_literal(PrimitiveKind::Boolean, &Scalar::Boolean(true), "P").unwrap(), "true");
    }

    #[test]
    fn test_single_key_id() {
        let edm = fixtures::edm();
        let et = edm.entity_type(fixtures::ET_ALL_PRIM).unwrap();
        let entity = EntityBuilder::new(fixtures::ET_ALL_PRIM)
            .property("PropertyInt16", 32767i16)
            .build();
        assert_eq!(entity_id(&edm, et, &entity).unwrap(), "ESAllPrim(32767)");
    }

    #[test]
    fn test_aliased_complex_path_id() {
        let edm = fixtures::edm();
        let et = edm.entity_type(fixtures::ET_FOUR_KEY_ALIAS).unwrap();
        let entity = fixtures::es_four_key_alias();
        assert_eq!(
            entity_id(&edm, et, &entity).unwrap(),
            "ESFourKeyAlias(PropertyInt16=1,KeyAlias1=11,KeyAlias2='Num11',KeyAlias3='Num111')"
        );
    }

    #[test]
    fn test_missing_key_fails() {
        let edm = fixtures::edm();
        let et = edm.entity_type(fixtures::ET_ALL_PRIM).unwrap();
        let entity = EntityBuilder::new(fixtures::ET_ALL_PRIM)
            .property("PropertyString", "x")
            .build();
        let err = entity_id(&edm, et, &entity).unwrap_err();
        assert_eq!(err.message_key().key(), "MISSING_ID");

        let null_key = EntityBuilder::new(fixtures::ET_ALL_PRIM).null("PropertyInt16").build();
        assert!(entity_id(&edm, et, &null_key).is_err());
    }

    #[test]
    fn test_explicit_id_wins() {
        let edm = fixtures::edm();
        let et = edm.entity_type(fixtures::ET_ALL_PRIM).unwrap();
        let entity = EntityBuilder::new(fixtures::ET_ALL_PRIM).id("ESAllPrim(1)").build();
        assert_eq!(entity_id(&edm, et, &entity).unwrap(), "ESAllPrim(1)");
    }
}
