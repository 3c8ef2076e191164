//! Generic object operations over handles.
//!
//! Every function resolves its handle arguments through the table, runs the
//! host operation and registers any non-primitive result as a fresh handle.
//! Passing a handle that is not live is always `InvalidHandle`. Lookup
//! faults are recovered in [`try_get_field`] and [`has_field`]; assignment
//! and coercion faults are reported as `HostFault`.

use crate::error::{BridgeError, BridgeResult};
use crate::handle::{Handle, HandleTable};
use crate::marshal::{decode_optional, encode_optional};
use crate::value::{HostArray, HostRecord, HostValue};

/// Register host `null`
pub fn null_handle(table: &mut HandleTable) -> Handle {
    table.register(HostValue::Null)
}

/// Register a string naming the host type of `h`
pub fn type_of(table: &mut HandleTable, h: Handle) -> BridgeResult<Handle> {
    let name = table.get(h)?.type_of();
    Ok(table.register(HostValue::string(name.as_str())))
}

/// `obj[key] = val`, with `key` converted by host property-key rules.
pub fn set_field(table: &mut HandleTable, obj: Handle, key: Handle, val: Handle) -> BridgeResult<()> {
    let target = table.get(obj)?;
    let key = table.get(key)?.to_property_key();
    let value = table.resolve(val)?;
    target
        .set_property(&key, value)
        .map_err(BridgeError::HostFault)
}

/// Host `toString()` coercion, registered as a new string
pub fn as_string(table: &mut HandleTable, h: Handle) -> BridgeResult<Handle> {
    let text = table
        .get(h)?
        .to_string_method()
        .map_err(BridgeError::HostFault)?;
    Ok(table.register(HostValue::from(text)))
}

/// Look up `obj[key]` and register the long-option encoding of the result.
///
/// A faulting lookup and an `undefined` field both give `none`. Only the
/// option itself is registered; [`unwrap_optional`] registers the field
/// value when the guest decodes it.
pub fn try_get_field(table: &mut HandleTable, obj: Handle, key: Handle) -> BridgeResult<Handle> {
    let target = table.get(obj)?;
    let key = table.get(key)?.to_property_key();
    let found = match target.get_property(&key) {
        Ok(HostValue::Undefined) | Err(_) => None,
        Ok(value) => Some(value),
    };
    Ok(table.register(encode_optional(found)))
}

/// Decode a long-option handle, registering the inner value when present
pub fn unwrap_optional(table: &mut HandleTable, h: Handle) -> BridgeResult<Option<Handle>> {
    let inner = decode_optional(table.get(h)?)?;
    Ok(inner.map(|value| table.register(value)))
}

/// Host `===` when `strict`, host `==` otherwise
pub fn equals(table: &HandleTable, a: Handle, b: Handle, strict: bool) -> BridgeResult<bool> {
    let (a, b) = (table.get(a)?, table.get(b)?);
    Ok(if strict {
        a.strict_equals(b)
    } else {
        a.loose_equals(b)
    })
}

/// `obj[name] !== undefined`; a faulting lookup reports `false`
pub fn has_field(table: &HandleTable, obj: Handle, name: &str) -> BridgeResult<bool> {
    Ok(table
        .get(obj)?
        .get_property(name)
        .map(|value| !value.is_undefined())
        .unwrap_or(false))
}

/// Register a fresh empty array
pub fn new_array(table: &mut HandleTable) -> Handle {
    table.register(HostValue::Array(HostArray::new()))
}

/// Register a fresh empty record
pub fn new_object(table: &mut HandleTable) -> Handle {
    table.register(HostValue::Record(HostRecord::new()))
}

/// Register a host string
pub fn string(table: &mut HandleTable, text: &str) -> Handle {
    table.register(HostValue::string(text))
}

/// Read `h` as a host string; `None` if it holds anything else
pub fn read_string(table: &HandleTable, h: Handle) -> BridgeResult<Option<String>> {
    Ok(table.get(h)?.as_str().map(str::to_string))
}

/// Host `ToBoolean`
pub fn truthy(table: &HandleTable, h: Handle) -> BridgeResult<bool> {
    Ok(table.get(h)?.truthy())
}

pub fn is_null(table: &HandleTable, h: Handle) -> BridgeResult<bool> {
    Ok(table.get(h)?.is_null())
}

/// `Object.freeze` on a record. Other values are returned unchanged.
pub fn freeze(table: &HandleTable, h: Handle) -> BridgeResult<()> {
    if let HostValue::Record(record) = table.get(h)? {
        record.freeze();
    }
    Ok(())
}
