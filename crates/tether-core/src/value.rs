//! Host values
//!
//! The host's single dynamic value space, modelled as a tagged union.
//! Primitives are stored inline. Arrays, records, promises, poll cells and
//! service objects are shared through `Arc`: every handle that resolves to
//! one of them observes the same object, and mutations through one handle
//! are visible through all of them.
//!
//! The coercion rules here (`typeof`, `toString`, property keys, `==` and
//! `===`) follow the conventions of a JavaScript host.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::poll::PollCell;
use crate::promise::HostPromise;

/// Host-level dynamic type tag, as reported by `typeof`.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum HostType {
    Undefined,
    Object,
    Boolean,
    Number,
    String,
    /// A host is free to report any other name; keep it verbatim.
    Unknown(String),
}

impl HostType {
    /// The host's name for this type
    pub fn as_str(&self) -> &str {
        match self {
            HostType::Undefined => "undefined",
            HostType::Object => "object",
            HostType::Boolean => "boolean",
            HostType::Number => "number",
            HostType::String => "string",
            HostType::Unknown(name) => name,
        }
    }

    /// Parse a `typeof` result back into a tag
    pub fn parse(name: &str) -> Self {
        match name {
            "undefined" => HostType::Undefined,
            "object" => HostType::Object,
            "boolean" => HostType::Boolean,
            "number" => HostType::Number,
            "string" => HostType::String,
            other => HostType::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value native to the host.
#[derive(Clone)]
pub enum HostValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Array(HostArray),
    Record(HostRecord),
    Promise(HostPromise),
    Poll(PollCell),
    Service(ServiceObject),
}

impl HostValue {
    /// Create a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        HostValue::String(Arc::from(s.as_ref()))
    }

    /// The `typeof` tag of this value.
    ///
    /// `null` is an `object`, as are arrays and every other reference type.
    pub fn type_of(&self) -> HostType {
        match self {
            HostValue::Undefined => HostType::Undefined,
            HostValue::Bool(_) => HostType::Boolean,
            HostValue::Number(_) => HostType::Number,
            HostValue::String(_) => HostType::String,
            HostValue::Null
            | HostValue::Array(_)
            | HostValue::Record(_)
            | HostValue::Promise(_)
            | HostValue::Poll(_)
            | HostValue::Service(_) => HostType::Object,
        }
    }

    /// A finer-grained name than `typeof`, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "null",
            HostValue::Bool(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Array(_) => "array",
            HostValue::Record(_) => "record",
            HostValue::Promise(_) => "promise",
            HostValue::Poll(_) => "poll state",
            HostValue::Service(_) => "service object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, HostValue::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, HostValue::Undefined | HostValue::Null)
    }

    /// True for every reference type (not for `null`)
    pub fn is_object(&self) -> bool {
        matches!(
            self,
            HostValue::Array(_)
                | HostValue::Record(_)
                | HostValue::Promise(_)
                | HostValue::Poll(_)
                | HostValue::Service(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Host `ToBoolean`
    pub fn truthy(&self) -> bool {
        match self {
            HostValue::Undefined | HostValue::Null => false,
            HostValue::Bool(b) => *b,
            HostValue::Number(n) => *n != 0.0 && !n.is_nan(),
            HostValue::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Host `String(value)`. Total: never faults.
    pub fn to_js_string(&self) -> String {
        let mut seen = Vec::new();
        self.stringify(&mut seen)
    }

    fn stringify(&self, seen: &mut Vec<usize>) -> String {
        match self {
            HostValue::Undefined => "undefined".to_string(),
            HostValue::Null => "null".to_string(),
            HostValue::Bool(b) => b.to_string(),
            HostValue::Number(n) => format_number(*n),
            HostValue::String(s) => s.to_string(),
            HostValue::Array(array) => {
                // cyclic arrays print as empty, like the host's join
                let id = array.id();
                if seen.contains(&id) {
                    return String::new();
                }
                seen.push(id);
                let joined = array
                    .items()
                    .iter()
                    .map(|item| {
                        if item.is_nullish() {
                            String::new()
                        } else {
                            item.stringify(seen)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                seen.pop();
                joined
            }
            HostValue::Record(_) | HostValue::Poll(_) => "[object Object]".to_string(),
            HostValue::Promise(_) => "[object Promise]".to_string(),
            HostValue::Service(service) => format!("[object {}]", service.name()),
        }
    }

    /// The `value.toString()` method call: faults on `null`/`undefined`.
    pub fn to_string_method(&self) -> Result<String, String> {
        if self.is_nullish() {
            return Err(format!(
                "Cannot read properties of {} (reading 'toString')",
                self.kind_name()
            ));
        }
        Ok(self.to_js_string())
    }

    /// Host `ToPropertyKey`
    pub fn to_property_key(&self) -> String {
        self.to_js_string()
    }

    /// Host `ToNumber`
    pub fn to_number(&self) -> f64 {
        match self {
            HostValue::Undefined => f64::NAN,
            HostValue::Null => 0.0,
            HostValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            HostValue::Number(n) => *n,
            HostValue::String(s) => string_to_number(s),
            other => string_to_number(&other.to_js_string()),
        }
    }

    /// `value[key]` with host semantics.
    ///
    /// Absent properties read as `undefined`. Reading any property of
    /// `null` or `undefined` is a fault.
    pub fn get_property(&self, key: &str) -> Result<HostValue, String> {
        match self {
            HostValue::Undefined | HostValue::Null => Err(format!(
                "Cannot read properties of {} (reading '{}')",
                self.kind_name(),
                key
            )),
            HostValue::Bool(_) | HostValue::Number(_) => Ok(HostValue::Undefined),
            HostValue::String(s) => {
                if key == "length" {
                    return Ok(HostValue::Number(s.encode_utf16().count() as f64));
                }
                Ok(array_index(key)
                    .and_then(|index| s.encode_utf16().nth(index as usize))
                    .map(|unit| HostValue::string(String::from_utf16_lossy(&[unit])))
                    .unwrap_or(HostValue::Undefined))
            }
            HostValue::Array(array) => Ok(array.get_property(key)),
            HostValue::Record(record) => Ok(record.get(key).unwrap_or(HostValue::Undefined)),
            HostValue::Poll(cell) => Ok(match key {
                "waiting" => HostValue::Bool(cell.state().is_waiting()),
                "value" => cell.value().unwrap_or(HostValue::Undefined),
                _ => HostValue::Undefined,
            }),
            HostValue::Promise(_) | HostValue::Service(_) => Ok(HostValue::Undefined),
        }
    }

    /// `value[key] = new_value` with strict-mode host semantics.
    pub fn set_property(&self, key: &str, value: HostValue) -> Result<(), String> {
        match self {
            HostValue::Undefined | HostValue::Null => Err(format!(
                "Cannot set properties of {} (setting '{}')",
                self.kind_name(),
                key
            )),
            HostValue::Bool(_) | HostValue::Number(_) | HostValue::String(_) => Err(format!(
                "Cannot create property '{}' on {} '{}'",
                key,
                self.kind_name(),
                self.to_js_string()
            )),
            HostValue::Array(array) => array.set_property(key, value),
            HostValue::Record(record) => record.set(key, value),
            HostValue::Promise(_) | HostValue::Poll(_) | HostValue::Service(_) => Err(format!(
                "Cannot add property {}, object is not extensible",
                key
            )),
        }
    }

    /// Host `===`
    pub fn strict_equals(&self, other: &HostValue) -> bool {
        match (self, other) {
            (HostValue::Undefined, HostValue::Undefined) => true,
            (HostValue::Null, HostValue::Null) => true,
            (HostValue::Bool(a), HostValue::Bool(b)) => a == b,
            (HostValue::Number(a), HostValue::Number(b)) => a == b,
            (HostValue::String(a), HostValue::String(b)) => a == b,
            _ => self.same_object(other),
        }
    }

    /// Host `==`
    pub fn loose_equals(&self, other: &HostValue) -> bool {
        use HostValue::*;
        match (self, other) {
            (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
            (Number(a), String(b)) => *a == string_to_number(b),
            (String(a), Number(b)) => string_to_number(a) == *b,
            (Bool(_), _) => Number(self.to_number()).loose_equals(other),
            (_, Bool(_)) => self.loose_equals(&Number(other.to_number())),
            (a, b) if a.is_object() && !b.is_object() => {
                HostValue::string(a.to_js_string()).loose_equals(b)
            }
            (a, b) if !a.is_object() && b.is_object() => {
                a.loose_equals(&HostValue::string(b.to_js_string()))
            }
            _ => self.strict_equals(other),
        }
    }

    /// Host `SameValue`: like `===` but `NaN` equals itself and `+0` differs
    /// from `-0`.
    pub fn same_value(&self, other: &HostValue) -> bool {
        match (self, other) {
            (HostValue::Number(a), HostValue::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a.to_bits() == b.to_bits()
                }
            }
            _ => self.strict_equals(other),
        }
    }

    fn same_object(&self, other: &HostValue) -> bool {
        match (self, other) {
            (HostValue::Array(a), HostValue::Array(b)) => a.ptr_eq(b),
            (HostValue::Record(a), HostValue::Record(b)) => a.ptr_eq(b),
            (HostValue::Promise(a), HostValue::Promise(b)) => a.ptr_eq(b),
            (HostValue::Poll(a), HostValue::Poll(b)) => a.ptr_eq(b),
            (HostValue::Service(a), HostValue::Service(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => write!(f, "Undefined"),
            HostValue::Null => write!(f, "Null"),
            HostValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            HostValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            HostValue::String(s) => f.debug_tuple("String").field(s).finish(),
            HostValue::Array(a) => write!(f, "Array(len={})", a.len()),
            HostValue::Record(r) => f.debug_tuple("Record").field(&r.keys()).finish(),
            HostValue::Promise(p) => f.debug_tuple("Promise").field(p).finish(),
            HostValue::Poll(p) => f.debug_tuple("Poll").field(&p.state()).finish(),
            HostValue::Service(s) => f.debug_tuple("Service").field(&s.name()).finish(),
        }
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Number(n)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::string(s)
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::String(Arc::from(s))
    }
}

impl From<HostArray> for HostValue {
    fn from(array: HostArray) -> Self {
        HostValue::Array(array)
    }
}

impl From<HostRecord> for HostValue {
    fn from(record: HostRecord) -> Self {
        HostValue::Record(record)
    }
}

impl From<HostPromise> for HostValue {
    fn from(promise: HostPromise) -> Self {
        HostValue::Promise(promise)
    }
}

#[derive(Default)]
struct ArrayData {
    items: Vec<HostValue>,
    named: IndexMap<String, HostValue>,
}

/// An ordered host collection.
#[derive(Clone, Default)]
pub struct HostArray(Arc<RwLock<ArrayData>>);

impl HostArray {
    /// Create an empty array
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<HostValue>) -> Self {
        Self(Arc::new(RwLock::new(ArrayData {
            items,
            named: IndexMap::new(),
        })))
    }

    pub fn len(&self) -> usize {
        self.0.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<HostValue> {
        self.0.read().items.get(index).cloned()
    }

    pub fn push(&self, value: HostValue) {
        self.0.write().items.push(value);
    }

    /// Snapshot of the elements
    pub fn items(&self) -> Vec<HostValue> {
        self.0.read().items.clone()
    }

    pub fn ptr_eq(&self, other: &HostArray) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    fn get_property(&self, key: &str) -> HostValue {
        let data = self.0.read();
        if key == "length" {
            return HostValue::Number(data.items.len() as f64);
        }
        match array_index(key) {
            Some(index) => data.items.get(index as usize).cloned(),
            None => data.named.get(key).cloned(),
        }
        .unwrap_or(HostValue::Undefined)
    }

    fn set_property(&self, key: &str, value: HostValue) -> Result<(), String> {
        let mut data = self.0.write();
        if key == "length" {
            let n = value.to_number();
            if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
                return Err("Invalid array length".to_string());
            }
            data.items.resize(n as usize, HostValue::Undefined);
            return Ok(());
        }
        match array_index(key) {
            Some(index) => {
                let index = index as usize;
                if index >= data.items.len() {
                    data.items.resize(index + 1, HostValue::Undefined);
                }
                data.items[index] = value;
            }
            None => {
                data.named.insert(key.to_string(), value);
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct RecordData {
    fields: IndexMap<String, HostValue>,
    frozen: bool,
}

/// A host record (plain object with string keys, insertion ordered).
#[derive(Clone, Default)]
pub struct HostRecord(Arc<RwLock<RecordData>>);

impl HostRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from key/value pairs
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, HostValue)>) -> Self {
        let fields = pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self(Arc::new(RwLock::new(RecordData {
            fields,
            frozen: false,
        })))
    }

    /// Own field lookup; `None` when absent
    pub fn get(&self, key: &str) -> Option<HostValue> {
        self.0.read().fields.get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().fields.contains_key(key)
    }

    /// Assign a field. Frozen records reject every write.
    pub fn set(&self, key: &str, value: HostValue) -> Result<(), String> {
        let mut data = self.0.write();
        if data.frozen {
            return Err(if data.fields.contains_key(key) {
                format!("Cannot assign to read only property '{}' of object", key)
            } else {
                format!("Cannot add property {}, object is not extensible", key)
            });
        }
        data.fields.insert(key.to_string(), value);
        Ok(())
    }

    /// Host `Object.freeze`
    pub fn freeze(&self) {
        self.0.write().frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.0.read().frozen
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.read().fields.keys().cloned().collect()
    }

    /// Snapshot of the fields in insertion order
    pub fn entries(&self) -> Vec<(String, HostValue)> {
        self.0
            .read()
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.read().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ptr_eq(&self, other: &HostRecord) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// An opaque host-service object (a storage backend, a clipboard, ...).
///
/// The guest can pass it around, log it and compare it, but it has no
/// properties of its own.
#[derive(Clone)]
pub struct ServiceObject {
    name: Arc<str>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ServiceObject {
    pub fn new<T: Any + Send + Sync>(name: &str, service: T) -> Self {
        Self {
            name: Arc::from(name),
            inner: Arc::new(service),
        }
    }

    /// Host class name of the service
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recover the wrapped service
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.inner.clone().downcast::<T>().ok()
    }

    pub fn ptr_eq(&self, other: &ServiceObject) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Canonical array index (`"0"`, `"17"`, not `"01"` or `"-1"`)
fn array_index(key: &str) -> Option<u32> {
    let index: u32 = key.parse().ok()?;
    (index != u32::MAX && index.to_string() == key).then_some(index)
}

/// Host `Number.prototype.toString()` formatting
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return format!("{}", n);
    }
    let exp = format!("{:e}", n);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

/// Host `StringToNumber`
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let lower = trimmed.to_ascii_lowercase();
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }
    let numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if numeric {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_of() {
        assert_eq!(HostValue::Undefined.type_of(), HostType::Undefined);
        assert_eq!(HostValue::Null.type_of(), HostType::Object);
        assert_eq!(HostValue::Bool(true).type_of(), HostType::Boolean);
        assert_eq!(HostValue::Number(1.0).type_of(), HostType::Number);
        assert_eq!(HostValue::string("a").type_of(), HostType::String);
        assert_eq!(HostValue::Array(HostArray::new()).type_of(), HostType::Object);
        assert_eq!(HostType::parse("symbol"), HostType::Unknown("symbol".into()));
        assert_eq!(HostType::parse("number").as_str(), "number");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(1e-6), "0.000001");
        assert_eq!(format_number(9.9e-7), "9.9e-7");
        assert_eq!(format_number(-5e-7), "-5e-7");
        assert_eq!(format_number(123456.0), "123456");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number("  42 "), 42.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x10"), 16.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(string_to_number("abc").is_nan());
        assert!(string_to_number("inf").is_nan());
    }

    #[test]
    fn test_to_js_string() {
        let array = HostArray::from_vec(vec![
            HostValue::Number(1.0),
            HostValue::Null,
            HostValue::string("x"),
        ]);
        assert_eq!(HostValue::Array(array).to_js_string(), "1,,x");
        assert_eq!(
            HostValue::Record(HostRecord::new()).to_js_string(),
            "[object Object]"
        );
        assert!(HostValue::Null.to_string_method().is_err());
        assert_eq!(HostValue::Bool(false).to_string_method().unwrap(), "false");
    }

    #[test]
    fn test_cyclic_array_to_string() {
        let array = HostArray::new();
        array.push(HostValue::Number(1.0));
        array.push(HostValue::Array(array.clone()));
        assert_eq!(HostValue::Array(array).to_js_string(), "1,");
    }

    #[test]
    fn test_array_properties() {
        let array = HostValue::Array(HostArray::new());
        array.set_property("2", HostValue::Bool(true)).unwrap();
        assert_eq!(array.get_property("length").unwrap().as_number(), Some(3.0));
        assert!(array.get_property("0").unwrap().is_undefined());
        assert_eq!(array.get_property("2").unwrap().as_bool(), Some(true));

        array.set_property("tag", HostValue::string("t")).unwrap();
        assert_eq!(array.get_property("tag").unwrap().as_str(), Some("t"));

        array.set_property("length", HostValue::Number(1.0)).unwrap();
        assert!(array.get_property("2").unwrap().is_undefined());
        assert!(array.set_property("length", HostValue::Number(-1.0)).is_err());
    }

    #[test]
    fn test_string_properties() {
        let s = HostValue::string("héllo");
        assert_eq!(s.get_property("length").unwrap().as_number(), Some(5.0));
        assert_eq!(s.get_property("1").unwrap().as_str(), Some("é"));
        assert!(s.get_property("9").unwrap().is_undefined());
        assert!(s.set_property("x", HostValue::Null).is_err());
    }

    #[test]
    fn test_frozen_record_rejects_writes() {
        let record = HostRecord::from_pairs([("a", HostValue::Number(1.0))]);
        record.freeze();
        assert!(record.set("a", HostValue::Number(2.0)).is_err());
        assert!(record.set("b", HostValue::Number(2.0)).is_err());
        assert_eq!(record.get("a").unwrap().as_number(), Some(1.0));
    }

    #[test]
    fn test_nullish_property_access_faults() {
        assert!(HostValue::Null.get_property("x").is_err());
        assert!(HostValue::Undefined.get_property("x").is_err());
        assert!(HostValue::Null.set_property("x", HostValue::Null).is_err());
        assert!(HostValue::Number(1.0).get_property("x").unwrap().is_undefined());
    }

    #[test]
    fn test_loose_equality() {
        let n = |v: f64| HostValue::Number(v);
        let s = HostValue::string;
        assert!(HostValue::Null.loose_equals(&HostValue::Undefined));
        assert!(!HostValue::Null.loose_equals(&n(0.0)));
        assert!(n(1.0).loose_equals(&s("1")));
        assert!(HostValue::Bool(true).loose_equals(&n(1.0)));
        assert!(HostValue::Bool(false).loose_equals(&s("")));
        assert!(!s("abc").loose_equals(&HostValue::Bool(true)));

        let array = HostValue::Array(HostArray::from_vec(vec![n(1.0), n(2.0)]));
        assert!(array.loose_equals(&s("1,2")));
        assert!(!array.strict_equals(&s("1,2")));
        assert!(!n(f64::NAN).loose_equals(&n(f64::NAN)));
    }

    #[test]
    fn test_object_identity() {
        let a = HostRecord::new();
        let b = HostRecord::new();
        assert!(HostValue::Record(a.clone()).strict_equals(&HostValue::Record(a)));
        assert!(!HostValue::Record(HostRecord::new()).strict_equals(&HostValue::Record(b)));
    }

    #[test]
    fn test_service_object() {
        let service = ServiceObject::new("Storage", 7u32);
        assert_eq!(service.downcast::<u32>().as_deref(), Some(&7));
        assert!(service.downcast::<String>().is_none());
        assert_eq!(HostValue::Service(service).to_js_string(), "[object Storage]");
    }
}
