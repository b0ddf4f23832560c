//! Schema model consumed by the serializer.
//!
//! The EDM describes entity types, complex types, enumerations and type
//! definitions. The serializer reads it to learn declared property order,
//! primitive kinds, nullability, keys and navigation targets. The model is
//! immutable during serialization and may be shared across threads.

use std::fmt;

use rustc_hash::FxHashMap;

/// Upper bound on base-type chains; deeper chains are treated as cyclic.
const MAX_TYPE_HIERARCHY_DEPTH: usize = 32;

/// Shape of a geospatial primitive kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeoKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    Collection,
}

impl GeoKind {
    /// Returns the EDM suffix for this shape (e.g., "Point").
    pub fn name(&self) -> &'static str {
        match self {
            GeoKind::Point => "Point",
            GeoKind::LineString => "LineString",
            GeoKind::Polygon => "Polygon",
            GeoKind::MultiPoint => "MultiPoint",
            GeoKind::MultiLineString => "MultiLineString",
            GeoKind::MultiPolygon => "MultiPolygon",
            GeoKind::Collection => "Collection",
        }
    }
}

/// EDM primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    SByte,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    String,
    Binary,
    Date,
    DateTimeOffset,
    Duration,
    Guid,
    TimeOfDay,
    Stream,
    Geography(GeoKind),
    Geometry(GeoKind),
}

impl PrimitiveKind {
    /// Returns true if a JSON reader can infer this kind from the token alone.
    ///
    /// Full metadata omits `@odata.type` for these kinds.
    pub fn is_inferable(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::String | PrimitiveKind::Boolean | PrimitiveKind::Double
        )
    }

    /// Returns true for Geography and Geometry kinds.
    pub fn is_geospatial(&self) -> bool {
        matches!(self, PrimitiveKind::Geography(_) | PrimitiveKind::Geometry(_))
    }

    /// Returns the qualified name (e.g., "Edm.Int16").
    pub fn qualified_name(&self) -> String {
        format!("Edm.{}", self)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::SByte => "SByte",
            PrimitiveKind::Int16 => "Int16",
            PrimitiveKind::Int32 => "Int32",
            PrimitiveKind::Int64 => "Int64",
            PrimitiveKind::Single => "Single",
            PrimitiveKind::Double => "Double",
            PrimitiveKind::Decimal => "Decimal",
            PrimitiveKind::String => "String",
            PrimitiveKind::Binary => "Binary",
            PrimitiveKind::Date => "Date",
            PrimitiveKind::DateTimeOffset => "DateTimeOffset",
            PrimitiveKind::Duration => "Duration",
            PrimitiveKind::Guid => "Guid",
            PrimitiveKind::TimeOfDay => "TimeOfDay",
            PrimitiveKind::Stream => "Stream",
            PrimitiveKind::Geography(g) => return write!(f, "Geography{}", g.name()),
            PrimitiveKind::Geometry(g) => return write!(f, "Geometry{}", g.name()),
        };
        f.write_str(name)
    }
}

/// Declared type of a structural property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    /// Qualified enum type name.
    Enum(String),
    /// Qualified type definition name.
    Definition(String),
    /// Qualified complex type name.
    Complex(String),
}

impl TypeRef {
    /// Returns the name used in `@odata.type` annotations (without `#`).
    ///
    /// Primitive kinds use their short name ("Int16"); schema types use their
    /// qualified name.
    pub fn annotation_name(&self) -> String {
        match self {
            TypeRef::Primitive(kind) => kind.to_string(),
            TypeRef::Enum(name) | TypeRef::Definition(name) | TypeRef::Complex(name) => {
                name.clone()
            }
        }
    }
}

/// A structural property declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    pub type_ref: TypeRef,
    pub collection: bool,
    pub nullable: bool,
}

impl PropertyDecl {
    /// Declares a property of the given type, nullable and single-valued.
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            collection: false,
            nullable: true,
        }
    }

    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, TypeRef::Primitive(kind))
    }

    pub fn complex(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::Complex(type_name.into()))
    }

    pub fn enumeration(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::Enum(type_name.into()))
    }

    pub fn definition(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::Definition(type_name.into()))
    }

    /// Marks the property as collection-valued.
    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    /// Marks the property as non-nullable.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// A navigation property declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationDecl {
    pub name: String,
    /// Qualified name of the target entity type.
    pub target: String,
    pub collection: bool,
}

impl NavigationDecl {
    /// Declares a to-one navigation property.
    pub fn one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            collection: false,
        }
    }

    /// Declares a to-many navigation property.
    pub fn many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            collection: true,
        }
    }
}

/// A key property reference: a property path with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRef {
    pub path: Vec<String>,
    pub alias: Option<String>,
}

impl KeyRef {
    /// Returns the name used in key predicates: the alias, or the property name.
    pub fn predicate_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.first().map(String::as_str).unwrap_or_default(),
        }
    }
}

/// An entity type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    /// Qualified name (e.g., "olingo.odata.test1.ETAllPrim").
    pub name: String,
    pub base_type: Option<String>,
    pub keys: Vec<KeyRef>,
    pub properties: Vec<PropertyDecl>,
    pub navigations: Vec<NavigationDecl>,
    /// Entity set used to derive canonical ids.
    pub entity_set: Option<String>,
    pub media: bool,
}

impl EntityType {
    /// Creates an entity type with no keys or properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_type: None,
            keys: Vec::new(),
            properties: Vec::new(),
            navigations: Vec::new(),
            entity_set: None,
            media: false,
        }
    }

    pub fn base_type(mut self, base: impl Into<String>) -> Self {
        self.base_type = Some(base.into());
        self
    }

    /// Adds a key on a top-level property.
    pub fn key(mut self, property: impl Into<String>) -> Self {
        self.keys.push(KeyRef {
            path: vec![property.into()],
            alias: None,
        });
        self
    }

    /// Adds an aliased key on a (possibly nested) property path.
    pub fn key_alias<I, S>(mut self, path: I, alias: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.push(KeyRef {
            path: path.into_iter().map(Into::into).collect(),
            alias: Some(alias.into()),
        });
        self
    }

    pub fn property(mut self, decl: PropertyDecl) -> Self {
        self.properties.push(decl);
        self
    }

    pub fn navigation(mut self, decl: NavigationDecl) -> Self {
        self.navigations.push(decl);
        self
    }

    pub fn entity_set(mut self, name: impl Into<String>) -> Self {
        self.entity_set = Some(name.into());
        self
    }

    /// Marks the type as a media entity type.
    pub fn media(mut self) -> Self {
        self.media = true;
        self
    }
}

/// A complex type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexType {
    pub name: String,
    pub base_type: Option<String>,
    pub properties: Vec<PropertyDecl>,
    pub navigations: Vec<NavigationDecl>,
}

impl ComplexType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_type: None,
            properties: Vec::new(),
            navigations: Vec::new(),
        }
    }

    pub fn base_type(mut self, base: impl Into<String>) -> Self {
        self.base_type = Some(base.into());
        self
    }

    pub fn property(mut self, decl: PropertyDecl) -> Self {
        self.properties.push(decl);
        self
    }

    pub fn navigation(mut self, decl: NavigationDecl) -> Self {
        self.navigations.push(decl);
        self
    }
}

/// An enumeration type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub flags: bool,
    pub members: Vec<(String, i64)>,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: false,
            members: Vec::new(),
        }
    }

    /// Marks the enumeration as a flags enumeration.
    pub fn flags(mut self) -> Self {
        self.flags = true;
        self
    }

    pub fn member(mut self, name: impl Into<String>, value: i64) -> Self {
        self.members.push((name.into(), value));
        self
    }

    /// Renders a numeric value through the member names.
    ///
    /// Flags enumerations list every nonzero member whose bits are all set,
    /// joined by `,`. Returns `None` if no member matches.
    pub fn member_names(&self, value: i64) -> Option<String> {
        if !self.flags || value == 0 {
            return self
                .members
                .iter()
                .find(|(_, v)| *v == value)
                .map(|(name, _)| name.clone());
        }

        let names: Vec<&str> = self
            .members
            .iter()
            .filter(|(_, v)| *v != 0 && value & *v == *v)
            .map(|(name, _)| name.as_str())
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(names.join(","))
        }
    }
}

/// A type definition: a named alias of a primitive kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub underlying: PrimitiveKind,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, underlying: PrimitiveKind) -> Self {
        Self {
            name: name.into(),
            underlying,
        }
    }
}

/// Registry of schema types, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct Edm {
    entity_types: FxHashMap<String, EntityType>,
    complex_types: FxHashMap<String, ComplexType>,
    enum_types: FxHashMap<String, EnumType>,
    type_definitions: FxHashMap<String, TypeDefinition>,
}

impl Edm {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity_type(&mut self, entity_type: EntityType) {
        self.entity_types.insert(entity_type.name.clone(), entity_type);
    }

    pub fn add_complex_type(&mut self, complex_type: ComplexType) {
        self.complex_types.insert(complex_type.name.clone(), complex_type);
    }

    pub fn add_enum_type(&mut self, enum_type: EnumType) {
        self.enum_types.insert(enum_type.name.clone(), enum_type);
    }

    pub fn add_type_definition(&mut self, definition: TypeDefinition) {
        self.type_definitions.insert(definition.name.clone(), definition);
    }

    pub fn entity_type(&self, name: &str) -> Option<&EntityType> {
        self.entity_types.get(name)
    }

    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        self.complex_types.get(name)
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enum_types.get(name)
    }

    pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.type_definitions.get(name)
    }

    /// Returns the entity type followed by its base types, most derived first.
    fn entity_chain<'a>(&'a self, entity_type: &'a EntityType) -> Vec<&'a EntityType> {
        let mut chain = vec![entity_type];
        let mut current = entity_type;
        while let Some(base) = current.base_type.as_deref().and_then(|b| self.entity_type(b)) {
            if chain.len() >= MAX_TYPE_HIERARCHY_DEPTH {
                break;
            }
            chain.push(base);
            current = base;
        }
        chain
    }

    fn complex_chain<'a>(&'a self, complex_type: &'a ComplexType) -> Vec<&'a ComplexType> {
        let mut chain = vec![complex_type];
        let mut current = complex_type;
        while let Some(base) = current.base_type.as_deref().and_then(|b| self.complex_type(b)) {
            if chain.len() >= MAX_TYPE_HIERARCHY_DEPTH {
                break;
            }
            chain.push(base);
            current = base;
        }
        chain
    }

    /// Structural properties of an entity type in declared order, base type first.
    pub fn entity_properties<'a>(&'a self, entity_type: &'a EntityType) -> Vec<&'a PropertyDecl> {
        self.entity_chain(entity_type)
            .into_iter()
            .rev()
            .flat_map(|t| t.properties.iter())
            .collect()
    }

    /// Navigation properties of an entity type in declared order, base type first.
    pub fn entity_navigations<'a>(
        &'a self,
        entity_type: &'a EntityType,
    ) -> Vec<&'a NavigationDecl> {
        self.entity_chain(entity_type)
            .into_iter()
            .rev()
            .flat_map(|t| t.navigations.iter())
            .collect()
    }

    /// Key references of an entity type; keys are declared on the root of the hierarchy.
    pub fn entity_keys<'a>(&'a self, entity_type: &'a EntityType) -> &'a [KeyRef] {
        self.entity_chain(entity_type)
            .into_iter()
            .rev()
            .find(|t| !t.keys.is_empty())
            .map(|t| t.keys.as_slice())
            .unwrap_or(&[])
    }

    /// Entity set of an entity type, inherited from its base types.
    pub fn entity_set<'a>(&'a self, entity_type: &'a EntityType) -> Option<&'a str> {
        self.entity_chain(entity_type)
            .into_iter()
            .find_map(|t| t.entity_set.as_deref())
    }

    /// Structural properties of a complex type in declared order, base type first.
    pub fn complex_properties<'a>(
        &'a self,
        complex_type: &'a ComplexType,
    ) -> Vec<&'a PropertyDecl> {
        self.complex_chain(complex_type)
            .into_iter()
            .rev()
            .flat_map(|t| t.properties.iter())
            .collect()
    }

    /// Navigation properties of a complex type in declared order, base type first.
    pub fn complex_navigations<'a>(
        &'a self,
        complex_type: &'a ComplexType,
    ) -> Vec<&'a NavigationDecl> {
        self.complex_chain(complex_type)
            .into_iter()
            .rev()
            .flat_map(|t| t.navigations.iter())
            .collect()
    }

    /// Resolves a declared type to the primitive kind it is serialized as.
    ///
    /// Type definitions resolve to their underlying kind; enums and complex
    /// types have no primitive kind.
    pub fn primitive_kind(&self, type_ref: &TypeRef) -> Option<PrimitiveKind> {
        match type_ref {
            TypeRef::Primitive(kind) => Some(*kind),
            TypeRef::Definition(name) => self.type_definition(name).map(|d| d.underlying),
            TypeRef::Enum(_) | TypeRef::Complex(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Edm {
        let mut edm = Edm::new();
        edm.add_complex_type(
            ComplexType::new("ns.CTTwoPrim")
                .property(PropertyDecl::primitive("PropertyInt16", PrimitiveKind::Int16).not_null())
                .property(PropertyDecl::primitive("PropertyString", PrimitiveKind::String)),
        );
        edm.add_complex_type(
            ComplexType::new("ns.CTBase")
                .base_type("ns.CTTwoPrim")
                .property(PropertyDecl::primitive("AdditionalPropString", PrimitiveKind::String)),
        );
        edm.add_entity_type(
            EntityType::new("ns.ETBase")
                .key("PropertyInt16")
                .property(PropertyDecl::primitive("PropertyInt16", PrimitiveKind::Int16).not_null())
                .entity_set("ESBase"),
        );
        edm.add_entity_type(
            EntityType::new("ns.ETDerived")
                .base_type("ns.ETBase")
                .property(PropertyDecl::primitive("PropertyDate", PrimitiveKind::Date))
                .navigation(NavigationDecl::one("NavOne", "ns.ETBase")),
        );
        edm
    }

    #[test]
    fn test_inherited_properties_base_first() {
        let edm = model();
        let ct = edm.complex_type("ns.CTBase").unwrap();
        let names: Vec<&str> = edm
            .complex_properties(ct)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["PropertyInt16", "PropertyString", "AdditionalPropString"]);
    }

    #[test]
    fn test_keys_and_entity_set_inherited() {
        let edm = model();
        let et = edm.entity_type("ns.ETDerived").unwrap();
        assert_eq!(edm.entity_keys(et).len(), 1);
        assert_eq!(edm.entity_keys(et)[0].predicate_name(), "PropertyInt16");
        assert_eq!(edm.entity_set(et), Some("ESBase"));
        assert_eq!(edm.entity_properties(et).len(), 2);
        assert_eq!(edm.entity_navigations(et).len(), 1);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(PrimitiveKind::Int16.to_string(), "Int16");
        assert_eq!(PrimitiveKind::Geography(GeoKind::Point).to_string(), "GeographyPoint");
        assert_eq!(
            PrimitiveKind::Geometry(GeoKind::Collection).qualified_name(),
            "Edm.GeometryCollection"
        );
        assert!(PrimitiveKind::Double.is_inferable());
        assert!(!PrimitiveKind::Single.is_inferable());
    }

    #[test]
    fn test_enum_member_names() {
        let flags = EnumType::new("ns.ENString")
            .flags()
            .member("String1", 1)
            .member("String2", 2)
            .member("String3", 4);
        assert_eq!(flags.member_names(6).as_deref(), Some("String2,String3"));
        assert_eq!(flags.member_names(2).as_deref(), Some("String2"));
        assert_eq!(flags.member_names(8), None);

        let plain = EnumType::new("ns.Color").member("Red", 0).member("Blue", 1);
        assert_eq!(plain.member_names(0).as_deref(), Some("Red"));
        assert_eq!(plain.member_names(3), None);
    }

    #[test]
    fn test_primitive_kind_of_definition() {
        let mut edm = model();
        edm.add_type_definition(TypeDefinition::new("ns.TDString", PrimitiveKind::String));
        assert_eq!(
            edm.primitive_kind(&TypeRef::Definition("ns.TDString".into())),
            Some(PrimitiveKind::String)
        );
        assert_eq!(edm.primitive_kind(&TypeRef::Enum("ns.ENString".into())), None);
    }
}
