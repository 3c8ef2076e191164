//! Console service
//!
//! `console_log` hands raw host values to a [`ConsoleSink`], which formats
//! them the way a host console does and passes the message to its handler.
//! The default handler routes output to the tracing crate.

use serde_json::{Map, Number, Value as JsonValue};
use std::fmt;
use std::sync::Arc;
use tether_core::{HostValue, PollState};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Info,
    Debug,
    Warn,
    Error,
}

type ConsoleHandler = dyn Fn(ConsoleLevel, &str) + Send + Sync + 'static;

/// Destination for console output
#[derive(Clone)]
pub struct ConsoleSink {
    handler: Arc<ConsoleHandler>,
}

impl ConsoleSink {
    /// Sink with a custom handler
    pub fn new(handler: impl Fn(ConsoleLevel, &str) + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Sink that routes to tracing under the `tether::console` target
    pub fn tracing() -> Self {
        Self::new(default_console_handler)
    }

    /// Format `value` and dispatch it at `level`
    pub fn log(&self, level: ConsoleLevel, value: &HostValue) {
        self.message(level, &format_value(value));
    }

    pub fn message(&self, level: ConsoleLevel, message: &str) {
        (self.handler)(level, message);
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConsoleSink")
    }
}

fn default_console_handler(level: ConsoleLevel, message: &str) {
    match level {
        ConsoleLevel::Log | ConsoleLevel::Info => info!(target: "tether::console", "{}", message),
        ConsoleLevel::Debug => debug!(target: "tether::console", "{}", message),
        ConsoleLevel::Warn => warn!(target: "tether::console", "{}", message),
        ConsoleLevel::Error => error!(target: "tether::console", "{}", message),
    }
}

/// Render a value like the host console: strings raw, arrays and records
/// as JSON, everything else by its string form.
pub fn format_value(value: &HostValue) -> String {
    match value {
        HostValue::String(s) => s.to_string(),
        HostValue::Array(_) | HostValue::Record(_) | HostValue::Poll(_) => {
            to_json(value).to_string()
        }
        other => other.to_js_string(),
    }
}

/// JSON view of a host value. Cycles render as `"[Circular]"`.
pub fn to_json(value: &HostValue) -> JsonValue {
    let mut seen = Vec::new();
    json_of(value, &mut seen)
}

fn json_number(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        JsonValue::from(n as i64)
    } else {
        Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

fn json_of(value: &HostValue, seen: &mut Vec<HostValue>) -> JsonValue {
    if value.is_object() {
        if seen.iter().any(|s| s.strict_equals(value)) {
            return JsonValue::String("[Circular]".to_string());
        }
        seen.push(value.clone());
    }

    let json = match value {
        HostValue::Undefined | HostValue::Null => JsonValue::Null,
        HostValue::Bool(b) => JsonValue::Bool(*b),
        HostValue::Number(n) => json_number(*n),
        HostValue::String(s) => JsonValue::String(s.to_string()),
        HostValue::Array(array) => {
            JsonValue::Array(array.items().iter().map(|v| json_of(v, seen)).collect())
        }
        HostValue::Record(record) => {
            let mut map = Map::new();
            for (key, field) in record.entries() {
                // undefined fields are dropped, like JSON.stringify
                if !field.is_undefined() {
                    map.insert(key, json_of(&field, seen));
                }
            }
            JsonValue::Object(map)
        }
        HostValue::Poll(cell) => {
            let mut map = Map::new();
            let state = cell.state();
            map.insert("waiting".into(), JsonValue::Bool(state.is_waiting()));
            if let (PollState::Ready(_), Some(result)) = (state, cell.value()) {
                map.insert("value".into(), json_of(&result, seen));
            }
            JsonValue::Object(map)
        }
        HostValue::Promise(_) | HostValue::Service(_) => JsonValue::Object(Map::new()),
    };

    if value.is_object() {
        seen.pop();
    }
    json
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tether_core::{HostArray, HostRecord, ServiceObject};

    #[test]
    fn test_format_primitives() {
        assert_eq!(format_value(&HostValue::string("hi")), "hi");
        assert_eq!(format_value(&HostValue::Number(2.5)), "2.5");
        assert_eq!(format_value(&HostValue::Null), "null");
        assert_eq!(format_value(&HostValue::Undefined), "undefined");
        assert_eq!(
            format_value(&HostValue::Service(ServiceObject::new("Clipboard", ()))),
            "[object Clipboard]"
        );
    }

    #[test]
    fn test_format_objects_as_json() {
        let record = HostRecord::from_pairs([
            ("name", HostValue::string("tether")),
            ("count", HostValue::Number(3.0)),
            ("skip", HostValue::Undefined),
            (
                "list",
                HostValue::Array(HostArray::from_vec(vec![
                    HostValue::Bool(true),
                    HostValue::Number(0.5),
                    HostValue::Undefined,
                ])),
            ),
        ]);
        assert_eq!(
            format_value(&HostValue::Record(record)),
            r#"{"name":"tether","count":3,"list":[true,0.5,null]}"#
        );
    }

    #[test]
    fn test_cycles_are_marked() {
        let record = HostRecord::new();
        record
            .set("me", HostValue::Record(record.clone()))
            .unwrap();
        assert_eq!(
            format_value(&HostValue::Record(record)),
            r#"{"me":"[Circular]"}"#
        );
    }

    #[test]
    fn test_custom_handler() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let sink = ConsoleSink::new(move |level, message| {
            captured.lock().push((level, message.to_string()));
        });

        sink.log(ConsoleLevel::Log, &HostValue::Number(42.0));
        sink.message(ConsoleLevel::Warn, "careful");
        assert_eq!(
            *lines.lock(),
            vec![
                (ConsoleLevel::Log, "42".to_string()),
                (ConsoleLevel::Warn, "careful".to_string()),
            ]
        );
    }
}
