//! Test schema and sample data shared by the unit tests.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::edm::{
    ComplexType, Edm, EntityType, EnumType, GeoKind, NavigationDecl, PrimitiveKind, PropertyDecl,
    TypeDefinition,
};
use crate::model::builder::EntityBuilder;
use crate::model::entity::{Entity, EntityCollection, NavigationLink};
use crate::model::temporal::{Date, DateTimeOffset, Duration, TimeOfDay};
use crate::model::value::ComplexValue;

pub const ET_ALL_PRIM: &str = "olingo.odata.test1.ETAllPrim";
pub const ET_TWO_PRIM: &str = "olingo.odata.test1.ETTwoPrim";
pub const ET_BASE: &str = "olingo.odata.test1.ETBase";
pub const ET_MIX_PRIM_COLL_COMP: &str = "olingo.odata.test1.ETMixPrimCollComp";
pub const ET_FOUR_KEY_ALIAS: &str = "olingo.odata.test1.ETFourKeyAlias";
pub const ET_MEDIA: &str = "olingo.odata.test1.ETMedia";
pub const ET_WITH_STREAM: &str = "olingo.odata.test1.ETWithStream";
pub const ET_MIX_ENUM_DEF: &str = "olingo.odata.test1.ETMixEnumDefCollComp";
pub const ET_GEO: &str = "olingo.odata.test1.ETGeo";
pub const ET_PEOPLE: &str = "olingo.odata.test1.ETPeople";

pub const CT_TWO_PRIM: &str = "olingo.odata.test1.CTTwoPrim";
pub const CT_BASE: &str = "olingo.odata.test1.CTBase";
pub const CT_COMP_COMP: &str = "olingo.odata.test1.CTCompComp";
pub const EN_STRING: &str = "olingo.odata.test1.ENString";
pub const TD_STRING: &str = "olingo.odata.test1.TDString";

fn int16_key() -> PropertyDecl {
    PropertyDecl::primitive("PropertyInt16", PrimitiveKind::Int16).not_null()
}

pub fn edm() -> Edm {
    use PrimitiveKind as K;

    let mut edm = Edm::new();

    edm.add_complex_type(
        ComplexType::new(CT_TWO_PRIM)
            .property(int16_key())
            .property(PropertyDecl::primitive("PropertyString", K::String)),
    );
    edm.add_complex_type(
        ComplexType::new(CT_BASE)
            .base_type(CT_TWO_PRIM)
            .property(PropertyDecl::primitive("AdditionalPropString", K::String)),
    );
    edm.add_complex_type(
        ComplexType::new(CT_COMP_COMP).property(PropertyDecl::complex("PropertyComp", CT_TWO_PRIM)),
    );
    edm.add_enum_type(
        EnumType::new(EN_STRING)
            .flags()
            .member("String1", 1)
            .member("String2", 2)
            .member("String3", 4),
    );
    edm.add_type_definition(TypeDefinition::new(TD_STRING, K::String));

    edm.add_entity_type(
        EntityType::new(ET_ALL_PRIM)
            .key("PropertyInt16")
            .property(int16_key())
            .property(PropertyDecl::primitive("PropertyString", K::String))
            .property(PropertyDecl::primitive("PropertyBoolean", K::Boolean))
            .property(PropertyDecl::primitive("PropertyByte", K::Byte))
            .property(PropertyDecl::primitive("PropertySByte", K::SByte))
            .property(PropertyDecl::primitive("PropertyInt32", K::Int32))
            .property(PropertyDecl::primitive("PropertyInt64", K::Int64))
            .property(PropertyDecl::primitive("PropertySingle", K::Single))
            .property(PropertyDecl::primitive("PropertyDouble", K::Double))
            .property(PropertyDecl::primitive("PropertyDecimal", K::Decimal))
            .property(PropertyDecl::primitive("PropertyBinary", K::Binary))
            .property(PropertyDecl::primitive("PropertyDate", K::Date))
            .property(PropertyDecl::primitive("PropertyDateTimeOffset", K::DateTimeOffset))
            .property(PropertyDecl::primitive("PropertyDuration", K::Duration))
            .property(PropertyDecl::primitive("PropertyGuid", K::Guid))
            .property(PropertyDecl::primitive("PropertyTimeOfDay", K::TimeOfDay))
            .navigation(NavigationDecl::one("NavPropertyETTwoPrimOne", ET_TWO_PRIM))
            .navigation(NavigationDecl::many("NavPropertyETTwoPrimMany", ET_TWO_PRIM))
            .entity_set("ESAllPrim"),
    );
    edm.add_entity_type(
        EntityType::new(ET_TWO_PRIM)
            .key("PropertyInt16")
            .property(int16_key())
            .property(PropertyDecl::primitive("PropertyString", K::String))
            .navigation(NavigationDecl::one("NavPropertyETAllPrimOne", ET_ALL_PRIM))
            .navigation(NavigationDecl::many("NavPropertyETAllPrimMany", ET_ALL_PRIM))
            .entity_set("ESTwoPrim"),
    );
    edm.add_entity_type(
        EntityType::new(ET_BASE)
            .base_type(ET_TWO_PRIM)
            .property(PropertyDecl::primitive("AdditionalPropertyString_5", K::String))
            .entity_set("ESBase"),
    );
    edm.add_entity_type(
        EntityType::new(ET_MIX_PRIM_COLL_COMP)
            .key("PropertyInt16")
            .property(int16_key())
            .property(PropertyDecl::primitive("CollPropertyString", K::String).collection())
            .property(PropertyDecl::complex("PropertyComp", CT_TWO_PRIM))
            .property(PropertyDecl::complex("CollPropertyComp", CT_TWO_PRIM).collection())
            .entity_set("ESMixPrimCollComp"),
    );
    edm.add_entity_type(
        EntityType::new(ET_FOUR_KEY_ALIAS)
            .key("PropertyInt16")
            .key_alias(["PropertyComp", "PropertyInt16"], "KeyAlias1")
            .key_alias(["PropertyComp", "PropertyString"], "KeyAlias2")
            .key_alias(["PropertyCompComp", "PropertyComp", "PropertyString"], "KeyAlias3")
            .property(int16_key())
            .property(PropertyDecl::complex("PropertyComp", CT_TWO_PRIM))
            .property(PropertyDecl::complex("PropertyCompComp", CT_COMP_COMP))
            .entity_set("ESFourKeyAlias"),
    );
    edm.add_entity_type(
        EntityType::new(ET_MEDIA)
            .key("PropertyInt16")
            .property(int16_key())
            .media()
            .entity_set("ESMedia"),
    );
    edm.add_entity_type(
        EntityType::new(ET_WITH_STREAM)
            .key("PropertyInt16")
            .property(int16_key())
            .property(PropertyDecl::primitive("PropertyStream", K::Stream))
            .entity_set("ESWithStream"),
    );
    edm.add_entity_type(
        EntityType::new(ET_MIX_ENUM_DEF)
            .key("PropertyInt16")
            .property(int16_key())
            .property(PropertyDecl::enumeration("PropertyEnumString", EN_STRING))
            .property(PropertyDecl::definition("PropertyDefString", TD_STRING))
            .property(PropertyDecl::enumeration("CollPropertyEnumString", EN_STRING).collection())
            .entity_set("ESMixEnumDefCollComp"),
    );
    edm.add_entity_type(
        EntityType::new(ET_GEO)
            .key("PropertyInt16")
            .property(int16_key())
            .property(PropertyDecl::primitive("PropertyPoint", K::Geography(GeoKind::Point)))
            .entity_set("ESGeo"),
    );
    edm.add_entity_type(
        EntityType::new(ET_PEOPLE)
            .key("id")
            .property(PropertyDecl::primitive("id", K::Int32).not_null())
            .property(PropertyDecl::primitive("name", K::String))
            .navigation(NavigationDecl::many("friends", ET_PEOPLE))
            .entity_set("ESPeople"),
    );

    edm
}

// =============================================================================
// Data
// =============================================================================

/// The first entity of ESAllPrim: every property at its positive extreme.
pub fn all_prim() -> Entity {
    EntityBuilder::new(ET_ALL_PRIM)
        .property("PropertyInt16", i16::MAX)
        .property("PropertyString", "First Resource - positive values")
        .property("PropertyBoolean", true)
        .property("PropertyByte", u8::MAX)
        .property("PropertySByte", i8::MAX)
        .property("PropertyInt32", i32::MAX)
        .property("PropertyInt64", i64::MAX)
        .property("PropertySingle", 1.79e20f32)
        .property("PropertyDouble", -1.79e19f64)
        .property("PropertyDecimal", Decimal::from(34))
        .property(
            "PropertyBinary",
            vec![0x01u8, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF],
        )
        .property("PropertyDate", Date::from_ymd(2012, 12, 3).unwrap())
        .property(
            "PropertyDateTimeOffset",
            DateTimeOffset::from_ymd_hms(2012, 12, 3, 7, 16, 23).unwrap(),
        )
        .property("PropertyDuration", Duration::from_secs(6))
        .property(
            "PropertyGuid",
            Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef),
        )
        .property("PropertyTimeOfDay", TimeOfDay::from_hms(3, 26, 5).unwrap())
        .build()
}

/// Properties of [`all_prim`] as written at minimal metadata.
pub const ALL_PRIM_MEMBERS: &str = concat!(
    r#""PropertyInt16":32767,"PropertyString":"First Resource - positive values","#,
    r#""PropertyBoolean":true,"PropertyByte":255,"PropertySByte":127,"#,
    r#""PropertyInt32":2147483647,"PropertyInt64":9223372036854775807,"#,
    r#""PropertySingle":1.79E20,"PropertyDouble":-1.79E19,"PropertyDecimal":34,"#,
    r#""PropertyBinary":"ASNFZ4mrze8=","PropertyDate":"2012-12-03","#,
    r#""PropertyDateTimeOffset":"2012-12-03T07:16:23Z","PropertyDuration":"PT6S","#,
    r#""PropertyGuid":"01234567-89ab-cdef-0123-456789abcdef","PropertyTimeOfDay":"03:26:05""#,
);

/// An ETAllPrim entity with only its key set; every other property is null.
pub fn all_prim_nulls(key: i16) -> Entity {
    let mut builder = EntityBuilder::new(ET_ALL_PRIM).property("PropertyInt16", key);
    for name in [
        "PropertyString",
        "PropertyBoolean",
        "PropertyByte",
        "PropertySByte",
        "PropertyInt32",
        "PropertyInt64",
        "PropertySingle",
        "PropertyDouble",
        "PropertyDecimal",
        "PropertyBinary",
        "PropertyDate",
        "PropertyDateTimeOffset",
        "PropertyDuration",
        "PropertyGuid",
        "PropertyTimeOfDay",
    ] {
        builder = builder.null(name);
    }
    builder.build()
}

pub fn es_all_prim() -> EntityCollection {
    EntityCollection::new(vec![all_prim(), all_prim_nulls(0)])
}

pub fn two_prim(key: i16, text: &str) -> Entity {
    EntityBuilder::new(ET_TWO_PRIM)
        .property("PropertyInt16", key)
        .property("PropertyString", text)
        .build()
}

pub fn comp_two_prim(key: i16, text: &str) -> ComplexValue {
    ComplexValue::new()
        .property("PropertyInt16", key)
        .property("PropertyString", text)
}

pub fn es_four_key_alias() -> Entity {
    EntityBuilder::new(ET_FOUR_KEY_ALIAS)
        .property("PropertyInt16", 1i16)
        .property("PropertyComp", comp_two_prim(11, "Num11"))
        .property(
            "PropertyCompComp",
            ComplexValue::new().property("PropertyComp", comp_two_prim(111, "Num111")),
        )
        .build()
}

const PEOPLE: [&str; 4] = ["A", "B", "C", "D"];

/// Friendship edges of ESPeople: A and B and C know each other, C knows D.
fn friends_of(id: i32) -> &'static [i32] {
    match id {
        0 => &[1, 2],
        1 => &[0, 2],
        2 => &[0, 1, 3],
        _ => &[],
    }
}

/// Builds person `id` with its friends inlined `depth` hops deep.
pub fn person(id: i32, depth: u32) -> Entity {
    let mut builder = EntityBuilder::new(ET_PEOPLE)
        .property("id", id)
        .property("name", PEOPLE[id as usize]);
    if depth > 0 {
        let friends = friends_of(id)
            .iter()
            .map(|f| person(*f, depth - 1))
            .collect();
        builder = builder.link(NavigationLink::to_many("friends", EntityCollection::new(friends)));
    }
    builder.build()
}
