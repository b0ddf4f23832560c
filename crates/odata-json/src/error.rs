//! Error types for serialization.

use thiserror::Error;

/// Message keys identifying each failure class.
///
/// Keys are stable strings so that callers (and streaming error callbacks)
/// can render or match failures without inspecting the error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// An entity id is required but cannot be produced.
    MissingId,
    /// A non-nullable property is absent or null.
    MissingProperty,
    /// A value does not match its declared type or nullability.
    WrongPropertyValue,
    /// A geospatial value carries a non-default SRID.
    UnsupportedSrid,
    /// A top-level value to serialize is null.
    NullInput,
    /// A context URL is required at the requested metadata level.
    NoContextUrl,
    /// A declared type is unknown to the model or not serializable here.
    UnsupportedPropertyType,
    /// A content type or format parameter is not supported.
    UnsupportedFormat,
    /// The output sink failed.
    IoException,
}

impl MessageKey {
    /// Returns the message key string (e.g., "MISSING_ID").
    pub fn key(&self) -> &'static str {
        match self {
            MessageKey::MissingId => "MISSING_ID",
            MessageKey::MissingProperty => "MISSING_PROPERTY",
            MessageKey::WrongPropertyValue => "WRONG_PROPERTY_VALUE",
            MessageKey::UnsupportedSrid => "UNSUPPORTED_SRID",
            MessageKey::NullInput => "NULL_INPUT",
            MessageKey::NoContextUrl => "NO_CONTEXT_URL",
            MessageKey::UnsupportedPropertyType => "UNSUPPORTED_PROPERTY_TYPE",
            MessageKey::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            MessageKey::IoException => "IO_EXCEPTION",
        }
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Error during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("[MISSING_ID] entity of type {entity_type} has no id and no key values to derive one")]
    MissingId { entity_type: String },

    #[error("[MISSING_PROPERTY] non-nullable property {property} is missing")]
    MissingProperty { property: String },

    #[error("[WRONG_PROPERTY_VALUE] wrong value for property {property}: {value}")]
    WrongPropertyValue { property: String, value: String },

    #[error("[UNSUPPORTED_SRID] property {property} uses unsupported SRID {srid}")]
    UnsupportedSrid { property: String, srid: u32 },

    #[error("[NULL_INPUT] value for {property} must not be null")]
    NullInput { property: String },

    #[error("[NO_CONTEXT_URL] a context URL is required at metadata level {level}")]
    NoContextUrl { level: &'static str },

    #[error("[UNSUPPORTED_PROPERTY_TYPE] unsupported type {type_name} for {property}")]
    UnsupportedPropertyType { property: String, type_name: String },

    #[error("[UNSUPPORTED_FORMAT] unsupported format parameter: {parameter}")]
    UnsupportedFormat { parameter: String },

    #[error("[IO_EXCEPTION] {0}")]
    Io(#[from] std::io::Error),
}

impl SerializeError {
    /// Returns the message key for this error.
    pub fn message_key(&self) -> MessageKey {
        match self {
            SerializeError::MissingId { .. } => MessageKey::MissingId,
            SerializeError::MissingProperty { .. } => MessageKey::MissingProperty,
            SerializeError::WrongPropertyValue { .. } => MessageKey::WrongPropertyValue,
            SerializeError::UnsupportedSrid { .. } => MessageKey::UnsupportedSrid,
            SerializeError::NullInput { .. } => MessageKey::NullInput,
            SerializeError::NoContextUrl { .. } => MessageKey::NoContextUrl,
            SerializeError::UnsupportedPropertyType { .. } => MessageKey::UnsupportedPropertyType,
            SerializeError::UnsupportedFormat { .. } => MessageKey::UnsupportedFormat,
            SerializeError::Io(_) => MessageKey::IoException,
        }
    }

    pub(crate) fn wrong_value(property: &str, value: impl std::fmt::Display) -> Self {
        SerializeError::WrongPropertyValue {
            property: property.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn unsupported_type(property: &str, type_name: &str) -> Self {
        SerializeError::UnsupportedPropertyType {
            property: property.to_string(),
            type_name: type_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_keys() {
        let err = SerializeError::wrong_value("PropertyInt16", false);
        assert_eq!(err.message_key(), MessageKey::WrongPropertyValue);
        assert_eq!(err.message_key().key(), "WRONG_PROPERTY_VALUE");

        let msg = err.to_string();
        assert!(msg.starts_with("[WRONG_PROPERTY_VALUE]"));
        assert!(msg.contains("PropertyInt16"));
        assert!(msg.contains("false"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: SerializeError = io.into();
        assert_eq!(err.message_key().key(), "IO_EXCEPTION");
    }
}
