//! Token-level JSON writer.
//!
//! Tracks object and array nesting so callers never emit separators by hand.
//! Text is escaped through `serde_json`, which reports failures as I/O errors;
//! the methods that escape text therefore return `io::Result`.

use std::fmt::Display;
use std::io;

use serde_json::Value as JsonValue;

use crate::util::format_double;

/// Writer for building a JSON document into a byte buffer.
#[derive(Debug, Clone, Default)]
pub struct JsonWriter {
    buf: Vec<u8>,
    /// One entry per open container: whether it already holds an item.
    scopes: Vec<bool>,
    /// Set between a member name and its value.
    after_name: bool,
}

impl JsonWriter {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Takes the buffered bytes, keeping the nesting state.
    pub fn take_bytes(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    /// Drops the buffered bytes, keeping the nesting state.
    pub fn discard(&mut self) {
        self.buf.clear();
    }

    /// Returns the current container depth.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Emits the separator owed before the next value or member.
    fn separate(&mut self) {
        if self.after_name {
            self.after_name = false;
            return;
        }
        if let Some(has_items) = self.scopes.last_mut() {
            if *has_items {
                self.buf.push(b',');
            }
            *has_items = true;
        }
    }

    // =========================================================================
    // Containers
    // =========================================================================

    pub fn begin_object(&mut self) {
        self.separate();
        self.buf.push(b'{');
        self.scopes.push(false);
    }

    pub fn end_object(&mut self) {
        self.scopes.pop();
        self.buf.push(b'}');
    }

    pub fn begin_array(&mut self) {
        self.separate();
        self.buf.push(b'[');
        self.scopes.push(false);
    }

    pub fn end_array(&mut self) {
        self.scopes.pop();
        self.buf.push(b']');
    }

    /// Writes an object member name; the next token is its value.
    pub fn name(&mut self, name: &str) -> io::Result<()> {
        self.separate();
        serde_json::to_writer(&mut self.buf, name)?;
        self.buf.push(b':');
        self.after_name = true;
        Ok(())
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    /// Writes an escaped, quoted string.
    pub fn string(&mut self, value: &str) -> io::Result<()> {
        self.separate();
        serde_json::to_writer(&mut self.buf, value)?;
        Ok(())
    }

    /// Writes a pre-formatted token (number, `true`) verbatim.
    pub fn raw(&mut self, token: &str) {
        self.separate();
        self.buf.extend_from_slice(token.as_bytes());
    }

    pub fn null(&mut self) {
        self.raw("null");
    }

    pub fn bool(&mut self, value: bool) {
        self.raw(if value { "true" } else { "false" });
    }

    /// Writes an integer, quoted when `quoted` is set.
    pub fn integer(&mut self, value: impl Display, quoted: bool) {
        if quoted {
            self.raw(&format!("\"{}\"", value));
        } else {
            self.raw(&value.to_string());
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Writes a string-valued member.
    pub fn string_member(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.name(name)?;
        self.string(value)
    }

    /// Writes a member whose value is `null`.
    pub fn null_member(&mut self, name: &str) -> io::Result<()> {
        self.name(name)?;
        self.null();
        Ok(())
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Writes a `serde_json` tree.
    ///
    /// Floating point numbers use the same text form as Double properties.
    pub fn json_value(&mut self, value: &JsonValue) -> io::Result<()> {
        match value {
            JsonValue::Null => self.null(),
            JsonValue::Bool(b) => self.bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.raw(&i.to_string());
                } else if let Some(u) = n.as_u64() {
                    self.raw(&u.to_string());
                } else {
                    self.raw(&format_double(n.as_f64().unwrap_or(f64::NAN)));
                }
            }
            JsonValue::String(s) => self.string(s)?,
            JsonValue::Array(items) => {
                self.begin_array();
                for item in items {
                    self.json_value(item)?;
                }
                self.end_array();
            }
            JsonValue::Object(members) => {
                self.begin_object();
                for (name, member) in members {
                    self.name(name)?;
                    self.json_value(member)?;
                }
                self.end_object();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(w: JsonWriter) -> String {
        String::from_utf8(w.into_bytes()).unwrap()
    }

    #[test]
    fn test_separators() {
        let mut w = JsonWriter::new();
        w.begin_object();
        w.string_member("a", "x").unwrap();
        w.name("b").unwrap();
        w.begin_array();
        w.integer(1, false);
        w.integer(2, true);
        w.null();
        w.begin_object();
        w.end_object();
        w.end_array();
        w.null_member("c").unwrap();
        w.end_object();
        assert_eq!(text(w), r#"{"a":"x","b":[1,"2",null,{}],"c":null}"#);
    }

    #[test]
    fn test_unsigned_integer_not_clamped() {
        let mut w = JsonWriter::new();
        w.begin_array();
        w.integer(u64::MAX, false);
        w.integer(u64::MAX, true);
        w.end_array();
        assert_eq!(text(w), r#"[18446744073709551615,"18446744073709551615"]"#);
    }

    #[test]
    fn test_string_escaping() {
        let mut w = JsonWriter::new();
        w.string("Quote\"Back\\slash/\n\u{1}").unwrap();
        assert_eq!(text(w), r#""Quote\"Back\\slash/\n\u0001""#);
    }

    #[test]
    fn test_json_value_floats() {
        let mut w = JsonWriter::new();
        w.json_value(&json!({"type": "Point", "coordinates": [1.5, 4.25, 1e20, 7]}))
            .unwrap();
        assert_eq!(
            text(w),
            r#"{"type":"Point","coordinates":[1.5,4.25,1.0E20,7]}"#
        );
    }

    #[test]
    fn test_take_bytes_keeps_state() {
        let mut w = JsonWriter::new();
        w.begin_array();
        w.string("a").unwrap();
        let first = w.take_bytes();
        w.string("b").unwrap();
        w.end_array();
        assert_eq!(first, b"[\"a\"");
        assert_eq!(text(w), ",\"b\"]");
    }
}
