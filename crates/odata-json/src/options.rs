//! Serialization options.

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

use crate::context_url::ContextUrl;
use crate::error::SerializeError;
use crate::projection::{ExpandTree, SelectTree};

/// Verbosity of control information in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MetadataLevel {
    /// No control information except what is needed for references.
    None,
    /// Context URL plus annotations a client cannot compute.
    #[default]
    Minimal,
    /// Every annotation, including types, ids, navigation links and operations.
    Full,
}

impl MetadataLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataLevel::None => "none",
            MetadataLevel::Minimal => "minimal",
            MetadataLevel::Full => "full",
        }
    }
}

impl fmt::Display for MetadataLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataLevel {
    type Err = SerializeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(MetadataLevel::None),
            "minimal" => Ok(MetadataLevel::Minimal),
            "full" => Ok(MetadataLevel::Full),
            _ => Err(SerializeError::UnsupportedFormat {
                parameter: format!("odata.metadata={}", s),
            }),
        }
    }
}

/// Hook invoked when a streamed item fails.
///
/// Receives the error and the output sink; whatever it writes ends the
/// response.
pub type WriteErrorCallback =
    Arc<dyn Fn(&SerializeError, &mut dyn io::Write) -> io::Result<()> + Send + Sync>;

/// Options for a single serialization call.
#[derive(Clone, Default)]
pub struct SerializeOptions {
    pub context_url: Option<ContextUrl>,
    pub select: SelectTree,
    pub expand: Option<ExpandTree>,
    /// Write `@odata.count` on collections.
    pub count: bool,
    pub metadata: MetadataLevel,
    /// Quote Int64 and Decimal values.
    pub ieee754_compatible: bool,
    pub write_error_callback: Option<WriteErrorCallback>,
    /// Whether collection items of primitive or complex collections may be null.
    pub nullable: Option<bool>,
}

impl fmt::Debug for SerializeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializeOptions")
            .field("context_url", &self.context_url)
            .field("select", &self.select)
            .field("expand", &self.expand)
            .field("count", &self.count)
            .field("metadata", &self.metadata)
            .field("ieee754_compatible", &self.ieee754_compatible)
            .field("write_error_callback", &self.write_error_callback.is_some())
            .field("nullable", &self.nullable)
            .finish()
    }
}

impl SerializeOptions {
    /// Creates default options: minimal metadata, no projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options from a JSON content type.
    ///
    /// Reads the `odata.metadata` and `IEEE754Compatible` parameters; names
    /// and values are case-insensitive and other parameters are ignored.
    ///
    /// ```rust
    /// use odata_json::{MetadataLevel, SerializeOptions};
    ///
    /// let options = SerializeOptions::from_content_type(
    ///     "application/json;odata.metadata=full;IEEE754Compatible=true",
    /// )
    /// .unwrap();
    /// assert_eq!(options.metadata, MetadataLevel::Full);
    /// assert!(options.ieee754_compatible);
    /// ```
    pub fn from_content_type(content_type: &str) -> Result<Self, SerializeError> {
        let mut parts = content_type.split(';').map(str::trim);
        let media = parts.next().unwrap_or_default();
        if !media.eq_ignore_ascii_case("application/json") {
            return Err(SerializeError::UnsupportedFormat {
                parameter: media.to_string(),
            });
        }

        let mut options = Self::default();
        for param in parts.filter(|p| !p.is_empty()) {
            let (name, value) = param.split_once('=').unwrap_or((param, ""));
            let (name, value) = (name.trim(), value.trim());
            if name.eq_ignore_ascii_case("odata.metadata") {
                options.metadata = value.parse()?;
            } else if name.eq_ignore_ascii_case("IEEE754Compatible") {
                options.ieee754_compatible = match value.to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(SerializeError::UnsupportedFormat {
                            parameter: param.to_string(),
                        })
                    }
                };
            }
        }
        Ok(options)
    }

    pub fn context_url(mut self, url: ContextUrl) -> Self {
        self.context_url = Some(url);
        self
    }

    pub fn select(mut self, select: SelectTree) -> Self {
        self.select = select;
        self
    }

    pub fn expand(mut self, expand: ExpandTree) -> Self {
        self.expand = Some(expand);
        self
    }

    pub fn count(mut self, count: bool) -> Self {
        self.count = count;
        self
    }

    pub fn metadata(mut self, level: MetadataLevel) -> Self {
        self.metadata = level;
        self
    }

    pub fn ieee754_compatible(mut self, enabled: bool) -> Self {
        self.ieee754_compatible = enabled;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    /// Registers the streaming error hook.
    pub fn write_error_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SerializeError, &mut dyn io::Write) -> io::Result<()> + Send + Sync + 'static,
    {
        self.write_error_callback = Some(Arc::new(callback));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_level_parse() {
        assert_eq!("FULL".parse::<MetadataLevel>().unwrap(), MetadataLevel::Full);
        assert_eq!(MetadataLevel::None.to_string(), "none");
        assert!("verbose".parse::<MetadataLevel>().is_err());
    }

    #[test]
    fn test_from_content_type() {
        let o = SerializeOptions::from_content_type("application/json").unwrap();
        assert_eq!(o.metadata, MetadataLevel::Minimal);
        assert!(!o.ieee754_compatible);

        let o = SerializeOptions::from_content_type(
            "Application/JSON; odata.metadata=none; ieee754compatible=TRUE; charset=utf-8",
        )
        .unwrap();
        assert_eq!(o.metadata, MetadataLevel::None);
        assert!(o.ieee754_compatible);
    }

    #[test]
    fn test_from_content_type_rejects() {
        let err = SerializeOptions::from_content_type("application/xml").unwrap_err();
        assert_eq!(err.message_key().key(), "UNSUPPORTED_FORMAT");
        assert!(SerializeOptions::from_content_type("application/json;odata.metadata=all").is_err());
        assert!(SerializeOptions::from_content_type("application/json;IEEE754Compatible=yes").is_err());
    }

    #[test]
    fn test_debug_hides_callback() {
        let o = SerializeOptions::new().write_error_callback(|_, w| w.write_all(b"x"));
        assert!(format!("{:?}", o).contains("write_error_callback: true"));
    }
}
