//! Value types for entity and complex properties.

use std::fmt;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::model::entity::NavigationLink;
use crate::model::geo::Geospatial;
use crate::model::temporal::{Date, DateTimeOffset, Duration, TimeOfDay};

/// A primitive scalar in its runtime representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Binary(Vec<u8>),
    Date(Date),
    DateTimeOffset(DateTimeOffset),
    Duration(Duration),
    Guid(Uuid),
    TimeOfDay(TimeOfDay),
    Stream(StreamLink),
}

impl Scalar {
    /// Returns the integral value if this scalar is of an integral kind.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Byte(v) => Some(*v as i64),
            Scalar::SByte(v) => Some(*v as i64),
            Scalar::Int16(v) => Some(*v as i64),
            Scalar::Int32(v) => Some(*v as i64),
            Scalar::Int64(v) => Some(*v),
            _ => None,
        }
    }
}

/// Renders the scalar for error messages; not the wire form.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Boolean(v) => write!(f, "{}", v),
            Scalar::Byte(v) => write!(f, "{}", v),
            Scalar::SByte(v) => write!(f, "{}", v),
            Scalar::Int16(v) => write!(f, "{}", v),
            Scalar::Int32(v) => write!(f, "{}", v),
            Scalar::Int64(v) => write!(f, "{}", v),
            Scalar::Single(v) => write!(f, "{}", v),
            Scalar::Double(v) => write!(f, "{}", v),
            Scalar::Decimal(v) => write!(f, "{}", v),
            Scalar::String(v) => write!(f, "{}", v),
            Scalar::Binary(v) => write!(f, "<{} bytes>", v.len()),
            Scalar::Date(v) => write!(f, "{}", v),
            Scalar::DateTimeOffset(v) => write!(f, "{}", v),
            Scalar::Duration(v) => write!(f, "{}", v),
            Scalar::Guid(v) => write!(f, "{}", v),
            Scalar::TimeOfDay(v) => write!(f, "{}", v),
            Scalar::Stream(_) => f.write_str("<stream>"),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Scalar::$variant(v)
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Primitive(Scalar::$variant(v))
                }
            }
        )*
    };
}

scalar_from! {
    bool => Boolean,
    u8 => Byte,
    i8 => SByte,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Single,
    f64 => Double,
    Decimal => Decimal,
    String => String,
    Vec<u8> => Binary,
    Date => Date,
    DateTimeOffset => DateTimeOffset,
    Duration => Duration,
    Uuid => Guid,
    TimeOfDay => TimeOfDay,
    StreamLink => Stream,
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Primitive(Scalar::String(v.to_string()))
    }
}

/// Media metadata of a stream property. The stream content itself is never inlined.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamLink {
    pub etag: Option<String>,
    pub content_type: Option<String>,
    pub edit_link: Option<String>,
    pub read_link: Option<String>,
}

impl StreamLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn edit_link(mut self, href: impl Into<String>) -> Self {
        self.edit_link = Some(href.into());
        self
    }

    pub fn read_link(mut self, href: impl Into<String>) -> Self {
        self.read_link = Some(href.into());
        self
    }
}

/// An enumeration value: the numeric value plus its type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub type_name: String,
    pub value: i64,
}

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null.
    Null,
    Primitive(Scalar),
    Enum(EnumValue),
    Complex(ComplexValue),
    /// Ordered, homogeneous items; items may be `Null`.
    Collection(Vec<Value>),
    Geospatial(Geospatial),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Creates an enum value.
    pub fn enumeration(type_name: impl Into<String>, value: i64) -> Self {
        Value::Enum(EnumValue {
            type_name: type_name.into(),
            value,
        })
    }

    /// Creates a collection from any iterator of values.
    pub fn collection<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Collection(items.into_iter().map(Into::into).collect())
    }

    /// Short description used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Primitive(s) => s.to_string(),
            Value::Enum(e) => e.value.to_string(),
            Value::Complex(_) => "<complex>".to_string(),
            Value::Collection(items) => format!("<collection of {}>", items.len()),
            Value::Geospatial(g) => format!("<{}>", g.shape.kind().name()),
        }
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Value::Primitive(v)
    }
}

impl From<ComplexValue> for Value {
    fn from(v: ComplexValue) -> Self {
        Value::Complex(v)
    }
}

impl From<Geospatial> for Value {
    fn from(v: Geospatial) -> Self {
        Value::Geospatial(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A named property with its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Runtime type name, when it differs from or refines the declared type.
    pub type_name: Option<String>,
    pub name: String,
    pub value: Value,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            type_name: None,
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates a property with an explicit null value.
    pub fn null(name: impl Into<String>) -> Self {
        Self::new(name, Value::Null)
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

/// Looks up a property by name in an ordered property list.
pub(crate) fn find_property<'a>(properties: &'a [Property], name: &str) -> Option<&'a Property> {
    properties.iter().find(|p| p.name == name)
}

/// A complex value: ordered properties plus optional navigation links.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexValue {
    /// Runtime complex type, when derived from the declared one.
    pub type_name: Option<String>,
    pub properties: Vec<Property>,
    pub navigation_links: Vec<NavigationLink>,
}

impl ComplexValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Adds or replaces a property, keeping names unique.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        set_property(&mut self.properties, Property::new(name, value));
        self
    }

    pub fn navigation_link(mut self, link: NavigationLink) -> Self {
        self.navigation_links.push(link);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        find_property(&self.properties, name)
    }
}

/// Inserts a property, replacing any existing one of the same name in place.
pub(crate) fn set_property(properties: &mut Vec<Property>, property: Property) {
    match properties.iter_mut().find(|p| p.name == property.name) {
        Some(existing) => *existing = property,
        None => properties.push(property),
    }
}
