//! Primitive marshaling between guest scalars and host values.
//!
//! The guest knows a closed set of thirteen primitive kinds. Each kind has
//! one entry in [`PRIMITIVE_KINDS`]: its name, the host type tag it expects,
//! and the functions converting it to and from a [`HostValue`]. Reading a
//! host value with the wrong type tag yields `None`; no range checking is
//! done on numbers, values are reinterpreted with `as` casts.
//!
//! On top of the primitives, [`ToHost`] and [`FromHost`] convert the
//! composite shapes that cross the boundary: strings, unit, optionals
//! (long-option encoding), vectors and results.

use std::fmt;
use std::sync::Arc;

use crate::error::{BridgeError, BridgeResult};
use crate::value::{HostArray, HostRecord, HostType, HostValue};

/// The guest's primitive kinds
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum PrimitiveKind {
    U8,
    U16,
    U32,
    U64,
    Usize,
    I8,
    I16,
    I32,
    I64,
    Isize,
    F32,
    F64,
    Bool,
}

impl PrimitiveKind {
    /// Every kind, in table order
    pub const ALL: [PrimitiveKind; 13] = [
        PrimitiveKind::U8,
        PrimitiveKind::U16,
        PrimitiveKind::U32,
        PrimitiveKind::U64,
        PrimitiveKind::Usize,
        PrimitiveKind::I8,
        PrimitiveKind::I16,
        PrimitiveKind::I32,
        PrimitiveKind::I64,
        PrimitiveKind::Isize,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
        PrimitiveKind::Bool,
    ];

    /// This kind's entry in [`PRIMITIVE_KINDS`]
    pub fn entry(self) -> &'static KindEntry {
        &PRIMITIVE_KINDS[self as usize]
    }

    /// Rust name of the kind (`u8`, `f64`, `bool`, ...)
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Host type tag values of this kind carry
    pub fn host_type(self) -> HostType {
        self.entry().tag.host_type()
    }

    /// Look a kind up by its Rust name
    pub fn parse(name: &str) -> Option<Self> {
        PRIMITIVE_KINDS
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.kind)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A guest primitive value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    F32(f32),
    F64(f64),
    Bool(bool),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::U8(_) => PrimitiveKind::U8,
            Primitive::U16(_) => PrimitiveKind::U16,
            Primitive::U32(_) => PrimitiveKind::U32,
            Primitive::U64(_) => PrimitiveKind::U64,
            Primitive::Usize(_) => PrimitiveKind::Usize,
            Primitive::I8(_) => PrimitiveKind::I8,
            Primitive::I16(_) => PrimitiveKind::I16,
            Primitive::I32(_) => PrimitiveKind::I32,
            Primitive::I64(_) => PrimitiveKind::I64,
            Primitive::Isize(_) => PrimitiveKind::Isize,
            Primitive::F32(_) => PrimitiveKind::F32,
            Primitive::F64(_) => PrimitiveKind::F64,
            Primitive::Bool(_) => PrimitiveKind::Bool,
        }
    }

    /// Numeric view of the value; `bool` maps to 0/1
    pub fn as_f64(&self) -> f64 {
        match *self {
            Primitive::U8(v) => v as f64,
            Primitive::U16(v) => v as f64,
            Primitive::U32(v) => v as f64,
            Primitive::U64(v) => v as f64,
            Primitive::Usize(v) => v as f64,
            Primitive::I8(v) => v as f64,
            Primitive::I16(v) => v as f64,
            Primitive::I32(v) => v as f64,
            Primitive::I64(v) => v as f64,
            Primitive::Isize(v) => v as f64,
            Primitive::F32(v) => v as f64,
            Primitive::F64(v) => v,
            Primitive::Bool(v) => v as u8 as f64,
        }
    }
}

/// Host type tag a primitive kind maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTag {
    Number,
    Boolean,
}

impl PrimitiveTag {
    pub fn host_type(self) -> HostType {
        match self {
            PrimitiveTag::Number => HostType::Number,
            PrimitiveTag::Boolean => HostType::Boolean,
        }
    }

    /// Whether `value` carries this tag
    pub fn matches(self, value: &HostValue) -> bool {
        match self {
            PrimitiveTag::Number => matches!(value, HostValue::Number(_)),
            PrimitiveTag::Boolean => matches!(value, HostValue::Bool(_)),
        }
    }
}

/// One row of the primitive table
pub struct KindEntry {
    pub kind: PrimitiveKind,
    pub name: &'static str,
    pub tag: PrimitiveTag,
    pub to_host: fn(Primitive) -> HostValue,
    pub from_host: fn(&HostValue) -> Option<Primitive>,
}

impl fmt::Debug for KindEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindEntry")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .finish()
    }
}

fn encode_number(value: Primitive) -> HostValue {
    HostValue::Number(value.as_f64())
}

fn encode_bool(value: Primitive) -> HostValue {
    HostValue::Bool(value.as_f64() != 0.0)
}

fn decode<T: HostPrimitive>(value: &HostValue) -> Option<Primitive> {
    T::read_host(value).map(T::into_primitive)
}

macro_rules! kind_entry {
    ($kind:ident, $ty:ty, $tag:ident, $encode:ident) => {
        KindEntry {
            kind: PrimitiveKind::$kind,
            name: stringify!($ty),
            tag: PrimitiveTag::$tag,
            to_host: $encode,
            from_host: decode::<$ty>,
        }
    };
}

/// The primitive kind table, indexed by [`PrimitiveKind`] discriminant
pub static PRIMITIVE_KINDS: [KindEntry; 13] = [
    kind_entry!(U8, u8, Number, encode_number),
    kind_entry!(U16, u16, Number, encode_number),
    kind_entry!(U32, u32, Number, encode_number),
    kind_entry!(U64, u64, Number, encode_number),
    kind_entry!(Usize, usize, Number, encode_number),
    kind_entry!(I8, i8, Number, encode_number),
    kind_entry!(I16, i16, Number, encode_number),
    kind_entry!(I32, i32, Number, encode_number),
    kind_entry!(I64, i64, Number, encode_number),
    kind_entry!(Isize, isize, Number, encode_number),
    kind_entry!(F32, f32, Number, encode_number),
    kind_entry!(F64, f64, Number, encode_number),
    kind_entry!(Bool, bool, Boolean, encode_bool),
];

/// Convert a guest primitive to a host value
pub fn primitive_to_host(value: Primitive) -> HostValue {
    (value.kind().entry().to_host)(value)
}

/// Read a host value as `kind`. `None` if the host type tag differs.
pub fn primitive_from_host(kind: PrimitiveKind, value: &HostValue) -> Option<Primitive> {
    let entry = kind.entry();
    if !entry.tag.matches(value) {
        return None;
    }
    (entry.from_host)(value)
}

/// Rust types that are guest primitives
pub trait HostPrimitive: Copy + Sized {
    const KIND: PrimitiveKind;

    fn to_host_value(self) -> HostValue;

    /// `None` when `value` carries another host type tag
    fn read_host(value: &HostValue) -> Option<Self>;

    fn into_primitive(self) -> Primitive;
}

macro_rules! numeric_primitives {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl HostPrimitive for $ty {
            const KIND: PrimitiveKind = PrimitiveKind::$kind;

            fn to_host_value(self) -> HostValue {
                HostValue::Number(self as f64)
            }

            fn read_host(value: &HostValue) -> Option<Self> {
                value.as_number().map(|n| n as $ty)
            }

            fn into_primitive(self) -> Primitive {
                Primitive::$kind(self)
            }
        }

        impl ToHost for $ty {
            fn to_host(self) -> HostValue {
                self.to_host_value()
            }
        }

        impl FromHost for $ty {
            fn from_host(value: &HostValue) -> BridgeResult<Self> {
                <$ty>::read_host(value)
                    .ok_or_else(|| BridgeError::type_mismatch(stringify!($ty), value.kind_name()))
            }
        }
    )*};
}

numeric_primitives! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    f32 => F32,
    f64 => F64,
}

impl HostPrimitive for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Bool;

    fn to_host_value(self) -> HostValue {
        HostValue::Bool(self)
    }

    fn read_host(value: &HostValue) -> Option<Self> {
        value.as_bool()
    }

    fn into_primitive(self) -> Primitive {
        Primitive::Bool(self)
    }
}

/// Convert a Rust value into a host value
pub trait ToHost {
    fn to_host(self) -> HostValue;
}

/// Convert a host value into a Rust value, failing on a shape mismatch
pub trait FromHost: Sized {
    fn from_host(value: &HostValue) -> BridgeResult<Self>;
}

impl ToHost for bool {
    fn to_host(self) -> HostValue {
        HostValue::Bool(self)
    }
}

impl FromHost for bool {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        value
            .as_bool()
            .ok_or_else(|| BridgeError::type_mismatch("bool", value.kind_name()))
    }
}

impl ToHost for String {
    fn to_host(self) -> HostValue {
        HostValue::from(self)
    }
}

impl ToHost for &str {
    fn to_host(self) -> HostValue {
        HostValue::string(self)
    }
}

impl FromHost for String {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BridgeError::type_mismatch("string", value.kind_name()))
    }
}

impl FromHost for Arc<str> {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::String(s) => Ok(s.clone()),
            other => Err(BridgeError::type_mismatch("string", other.kind_name())),
        }
    }
}

impl ToHost for () {
    fn to_host(self) -> HostValue {
        HostValue::Undefined
    }
}

/// Unit accepts any completion value
impl FromHost for () {
    fn from_host(_: &HostValue) -> BridgeResult<Self> {
        Ok(())
    }
}

impl ToHost for HostValue {
    fn to_host(self) -> HostValue {
        self
    }
}

impl FromHost for HostValue {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        Ok(value.clone())
    }
}

impl<T: ToHost> ToHost for Option<T> {
    fn to_host(self) -> HostValue {
        encode_optional(self.map(ToHost::to_host))
    }
}

impl<T: FromHost> FromHost for Option<T> {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        decode_optional(value)?
            .map(|inner| T::from_host(&inner))
            .transpose()
    }
}

impl<T: ToHost> ToHost for Vec<T> {
    fn to_host(self) -> HostValue {
        HostValue::Array(HostArray::from_vec(
            self.into_iter().map(ToHost::to_host).collect(),
        ))
    }
}

impl<T: FromHost> FromHost for Vec<T> {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::Array(array) => array.items().iter().map(T::from_host).collect(),
            other => Err(BridgeError::type_mismatch("array", other.kind_name())),
        }
    }
}

impl<T: ToHost, E: ToHost> ToHost for Result<T, E> {
    fn to_host(self) -> HostValue {
        match self {
            Ok(value) => tagged("ok", value.to_host()),
            Err(error) => tagged("err", error.to_host()),
        }
    }
}

impl<T: FromHost, E: FromHost> FromHost for Result<T, E> {
    fn from_host(value: &HostValue) -> BridgeResult<Self> {
        match split_result(value)? {
            Ok(ok) => T::from_host(&ok).map(Ok),
            Err(err) => E::from_host(&err).map(Err),
        }
    }
}

fn tagged(key: &str, value: HostValue) -> HostValue {
    HostValue::Record(HostRecord::from_pairs([(key, value)]))
}

/// Long-option encoding: `None` is host `null`, `Some(v)` is `{ some: v }`.
///
/// `Some(HostValue::Null)` and `None` stay distinguishable.
pub fn encode_optional(value: Option<HostValue>) -> HostValue {
    match value {
        None => HostValue::Null,
        Some(inner) => tagged("some", inner),
    }
}

/// Inverse of [`encode_optional`]
pub fn decode_optional(value: &HostValue) -> BridgeResult<Option<HostValue>> {
    match value {
        HostValue::Null => Ok(None),
        HostValue::Record(record) => record
            .get("some")
            .map(Some)
            .ok_or_else(|| BridgeError::type_mismatch("optional", "record without `some`")),
        other => Err(BridgeError::type_mismatch("optional", other.kind_name())),
    }
}

/// Result encoding: `{ ok: v }` or `{ err: "message" }`
pub fn encode_result(value: Result<HostValue, String>) -> HostValue {
    value.map_err(HostValue::from).to_host()
}

/// Inverse of [`encode_result`]. The error side is rendered as a string.
pub fn decode_result(value: &HostValue) -> BridgeResult<Result<HostValue, String>> {
    Ok(split_result(value)?.map_err(|err| err.to_js_string()))
}

fn split_result(value: &HostValue) -> BridgeResult<Result<HostValue, HostValue>> {
    let HostValue::Record(record) = value else {
        return Err(BridgeError::type_mismatch("result", value.kind_name()));
    };
    if let Some(ok) = record.get("ok") {
        Ok(Ok(ok))
    } else if let Some(err) = record.get("err") {
        Ok(Err(err))
    } else {
        Err(BridgeError::type_mismatch("result", "record without `ok` or `err`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_kinds() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(kind.entry().kind, kind);
            assert_eq!(PrimitiveKind::parse(kind.name()), Some(kind));
        }
        assert_eq!(PrimitiveKind::parse("char"), None);
    }

    #[test]
    fn test_host_types() {
        assert_eq!(PrimitiveKind::U8.host_type(), HostType::Number);
        assert_eq!(PrimitiveKind::F64.host_type(), HostType::Number);
        assert_eq!(PrimitiveKind::Bool.host_type(), HostType::Boolean);
        assert_eq!(PrimitiveKind::Isize.to_string(), "isize");
    }

    #[test]
    fn test_to_host() {
        assert_eq!(primitive_to_host(Primitive::I32(-5)).as_number(), Some(-5.0));
        assert_eq!(primitive_to_host(Primitive::Bool(true)).as_bool(), Some(true));
        assert_eq!(primitive_to_host(Primitive::F32(1.5)).as_number(), Some(1.5));
    }

    #[test]
    fn test_from_host_mismatch_is_none() {
        let flag = HostValue::Bool(true);
        let text = HostValue::string("1");
        assert_eq!(primitive_from_host(PrimitiveKind::U8, &flag), None);
        assert_eq!(primitive_from_host(PrimitiveKind::F64, &text), None);
        assert_eq!(
            primitive_from_host(PrimitiveKind::Bool, &HostValue::Number(1.0)),
            None
        );
        assert_eq!(primitive_from_host(PrimitiveKind::I32, &HostValue::Null), None);
    }

    #[test]
    fn test_from_host_casts_without_range_check() {
        let big = HostValue::Number(300.0);
        assert_eq!(
            primitive_from_host(PrimitiveKind::U8, &big),
            Some(Primitive::U8(255))
        );
        let fraction = HostValue::Number(-2.7);
        assert_eq!(
            primitive_from_host(PrimitiveKind::I16, &fraction),
            Some(Primitive::I16(-2))
        );
        assert_eq!(
            primitive_from_host(PrimitiveKind::U32, &HostValue::Number(f64::NAN)),
            Some(Primitive::U32(0))
        );
    }

    #[test]
    fn test_long_option_keeps_some_null() {
        let none = encode_optional(None);
        let some_null = encode_optional(Some(HostValue::Null));
        assert!(none.is_null());
        assert!(!some_null.is_null());

        assert!(decode_optional(&none).unwrap().is_none());
        assert!(decode_optional(&some_null).unwrap().unwrap().is_null());
        assert!(decode_optional(&HostValue::Number(1.0)).is_err());
        assert!(decode_optional(&HostValue::Record(HostRecord::new())).is_err());
    }

    #[test]
    fn test_result_encoding() {
        let ok = encode_result(Ok(HostValue::Number(1.0)));
        let err = encode_result(Err("boom".to_string()));

        assert_eq!(decode_result(&ok).unwrap().unwrap().as_number(), Some(1.0));
        assert_eq!(decode_result(&err).unwrap().unwrap_err(), "boom");
        assert!(decode_result(&HostValue::Null).is_err());
    }

    #[test]
    fn test_typed_converters() {
        let value = vec![Some(1u8), None, Some(3)].to_host();
        let back = Vec::<Option<u8>>::from_host(&value).unwrap();
        assert_eq!(back, vec![Some(1), None, Some(3)]);

        let result: Result<String, String> = Err("nope".to_string());
        let back = Result::<String, String>::from_host(&result.to_host()).unwrap();
        assert_eq!(back, Err("nope".to_string()));

        assert!(String::from_host(&HostValue::Number(1.0)).is_err());
        assert!(u32::from_host(&HostValue::string("1")).is_err());
        assert!(<()>::from_host(&HostValue::Undefined).is_ok());
    }
}
