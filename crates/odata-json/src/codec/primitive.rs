//! Primitive value formatting.
//!
//! Maps a scalar to its JSON token for a declared EDM kind. Integral scalars
//! are accepted for any integral kind whose range holds the value; any other
//! mismatch between scalar and kind is a `WRONG_PROPERTY_VALUE` failure.

use std::io;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::codec::writer::JsonWriter;
use crate::edm::{EnumType, PrimitiveKind};
use crate::error::SerializeError;
use crate::model::value::{EnumValue, Scalar};
use crate::util::{format_double, format_single};

/// A formatted JSON token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Written verbatim (numbers).
    Number(String),
    /// Written as a quoted, escaped string.
    Text(String),
    Bool(bool),
}

impl Token {
    pub fn write_to(&self, w: &mut JsonWriter) -> io::Result<()> {
        match self {
            Token::Number(n) => w.raw(n),
            Token::Text(s) => w.string(s)?,
            Token::Bool(b) => w.bool(*b),
        }
        Ok(())
    }
}

/// Inclusive range of an integral kind.
fn integral_range(kind: PrimitiveKind) -> Option<(i64, i64)> {
    match kind {
        PrimitiveKind::Byte => Some((u8::MIN as i64, u8::MAX as i64)),
        PrimitiveKind::SByte => Some((i8::MIN as i64, i8::MAX as i64)),
        PrimitiveKind::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
        PrimitiveKind::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
        PrimitiveKind::Int64 => Some((i64::MIN, i64::MAX)),
        _ => None,
    }
}

/// Non-finite floats become strings; finite ones stay numbers.
fn float_token(text: String) -> Token {
    match text.as_str() {
        "NaN" | "INF" | "-INF" => Token::Text(text),
        _ => Token::Number(text),
    }
}

fn number(text: String, quoted: bool) -> Token {
    if quoted {
        Token::Text(text)
    } else {
        Token::Number(text)
    }
}

/// Formats `scalar` as the declared primitive `kind`.
///
/// Int64 and Decimal are quoted when `ieee754_compatible` is set. `property`
/// names the value in error messages.
pub fn format_scalar(
    kind: PrimitiveKind,
    scalar: &Scalar,
    ieee754_compatible: bool,
    property: &str,
) -> Result<Token, SerializeError> {
    let wrong = || SerializeError::wrong_value(property, scalar);

    if let Some((min, max)) = integral_range(kind) {
        let v = scalar.as_i64().ok_or_else(wrong)?;
        if v < min || v > max {
            return Err(wrong());
        }
        let quoted = ieee754_compatible && kind == PrimitiveKind::Int64;
        return Ok(number(v.to_string(), quoted));
    }

    let token = match (kind, scalar) {
        (PrimitiveKind::Boolean, Scalar::Boolean(b)) => Token::Bool(*b),
        (PrimitiveKind::Single, Scalar::Single(v)) => float_token(format_single(*v)),
        (PrimitiveKind::Double, Scalar::Double(v)) => float_token(format_double(*v)),
        (PrimitiveKind::Double, Scalar::Single(v)) => float_token(format_single(*v)),
        (PrimitiveKind::Decimal, Scalar::Decimal(d)) => number(d.to_string(), ieee754_compatible),
        (PrimitiveKind::Decimal, s) => match s.as_i64() {
            Some(v) => number(v.to_string(), ieee754_compatible),
            None => return Err(wrong()),
        },
        (PrimitiveKind::String, Scalar::String(s)) => Token::Text(s.clone()),
        (PrimitiveKind::Binary, Scalar::Binary(bytes)) => Token::Text(STANDARD.encode(bytes)),
        (PrimitiveKind::Date, Scalar::Date(d)) => Token::Text(d.to_string()),
        (PrimitiveKind::DateTimeOffset, Scalar::DateTimeOffset(dt)) => Token::Text(dt.to_string()),
        (PrimitiveKind::Duration, Scalar::Duration(d)) => Token::Text(d.to_string()),
        (PrimitiveKind::Guid, Scalar::Guid(g)) => Token::Text(g.hyphenated().to_string()),
        (PrimitiveKind::TimeOfDay, Scalar::TimeOfDay(t)) => Token::Text(t.to_string()),
        (PrimitiveKind::Stream, _) | (PrimitiveKind::Geography(_), _) | (PrimitiveKind::Geometry(_), _) => {
            return Err(SerializeError::unsupported_type(property, &kind.qualified_name()));
        }
        _ => return Err(wrong()),
    };
    Ok(token)
}

/// Formats an enum value through its member names.
///
/// Falls back to the numeric value as text when no member matches.
pub fn format_enum(enum_type: &EnumType, value: &EnumValue) -> Token {
    Token::Text(
        enum_type
            .member_names(value.value)
            .unwrap_or_else(|| value.value.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::temporal::{Date, DateTimeOffset, Duration, TimeOfDay};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn fmt(kind: PrimitiveKind, scalar: Scalar) -> Token {
        format_scalar(kind, &scalar, false, "P").unwrap()
    }

    fn num(s: &str) -> Token {
        Token::Number(s.to_string())
    }

    fn text(s: &str) -> Token {
        Token::Text(s.to_string())
    }

    #[test]
    fn test_integral_widening() {
        assert_eq!(fmt(PrimitiveKind::Int64, Scalar::Int16(32767)), num("32767"));
        assert_eq!(fmt(PrimitiveKind::Int16, Scalar::Int64(-32768)), num("-32768"));
        assert_eq!(fmt(PrimitiveKind::Byte, Scalar::Int32(255)), num("255"));

        let err = format_scalar(PrimitiveKind::Byte, &Scalar::Int32(256), false, "PropertyByte")
            .unwrap_err();
        assert!(err.to_string().contains("PropertyByte"));
        assert!(err.to_string().contains("256"));
    }

    #[test]
    fn test_kind_mismatch() {
        let err = format_scalar(PrimitiveKind::Int16, &Scalar::Boolean(false), false, "PropertyInt16")
            .unwrap_err();
        assert_eq!(err.message_key().key(), "WRONG_PROPERTY_VALUE");
        assert!(err.to_string().contains("PropertyInt16"));
        assert!(err.to_string().contains("false"));
    }

    #[test]
    fn test_ieee754_quotes_int64_and_decimal_only() {
        let q = |kind, scalar| format_scalar(kind, &scalar, true, "P").unwrap();
        assert_eq!(q(PrimitiveKind::Int64, Scalar::Int64(9223372036854775807)), text("9223372036854775807"));
        assert_eq!(q(PrimitiveKind::Decimal, Scalar::Decimal(Decimal::from(34))), text("34"));
        assert_eq!(q(PrimitiveKind::Int32, Scalar::Int32(7)), num("7"));
        assert_eq!(q(PrimitiveKind::Double, Scalar::Double(-1.79e19)), num("-1.79E19"));
    }

    #[test]
    fn test_text_kinds() {
        assert_eq!(
            fmt(PrimitiveKind::Binary, Scalar::Binary(vec![0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef])),
            text("ASNFZ4mrze8=")
        );
        assert_eq!(
            fmt(PrimitiveKind::Date, Scalar::Date(Date::from_ymd(2012, 12, 3).unwrap())),
            text("2012-12-03")
        );
        assert_eq!(
            fmt(
                PrimitiveKind::DateTimeOffset,
                Scalar::DateTimeOffset(DateTimeOffset::from_ymd_hms(2012, 12, 3, 7, 16, 23).unwrap())
            ),
            text("2012-12-03T07:16:23Z")
        );
        assert_eq!(fmt(PrimitiveKind::Duration, Scalar::Duration(Duration::from_secs(6))), text("PT6S"));
        assert_eq!(
            fmt(PrimitiveKind::TimeOfDay, Scalar::TimeOfDay(TimeOfDay::from_hms(3, 26, 5).unwrap())),
            text("03:26:05")
        );
        let guid = Uuid::parse_str("01234567-89AB-CDEF-0123-456789ABCDEF").unwrap();
        assert_eq!(fmt(PrimitiveKind::Guid, Scalar::Guid(guid)), text("01234567-89ab-cdef-0123-456789abcdef"));
    }

    #[test]
    fn test_floats() {
        assert_eq!(fmt(PrimitiveKind::Single, Scalar::Single(1.79e20)), num("1.79E20"));
        assert_eq!(fmt(PrimitiveKind::Double, Scalar::Double(1790.0)), num("1790.0"));
        assert_eq!(fmt(PrimitiveKind::Double, Scalar::Double(f64::NAN)), text("NaN"));
        assert_eq!(fmt(PrimitiveKind::Single, Scalar::Single(f32::NEG_INFINITY)), text("-INF"));
    }

    #[test]
    fn test_enum_fallback() {
        let et = EnumType::new("ns.ENString")
            .flags()
            .member("String1", 1)
            .member("String2", 2)
            .member("String3", 4);
        let v = |value| EnumValue { type_name: "ns.ENString".into(), value };
        assert_eq!(format_enum(&et, &v(6)), text("String2,String3"));
        assert_eq!(format_enum(&et, &v(16)), text("16"));
    }

    proptest! {
        #[test]
        fn test_int64_quoting_matches_flag(v in any::<i64>(), ieee in any::<bool>()) {
            let token = format_scalar(PrimitiveKind::Int64, &Scalar::Int64(v), ieee, "P").unwrap();
            let expected = if ieee { Token::Text(v.to_string()) } else { Token::Number(v.to_string()) };
            prop_assert_eq!(token, expected);
        }

        #[test]
        fn test_int32_never_quoted(v in any::<i32>()) {
            let token = format_scalar(PrimitiveKind::Int32, &Scalar::Int32(v), true, "P").unwrap();
            prop_assert_eq!(token, Token::Number(v.to_string()));
        }
    }
}
