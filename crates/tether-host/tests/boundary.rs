//! Scenarios driven through the guest-facing boundary.

use parking_lot::Mutex;
use std::sync::Arc;
use tether_core::{BridgeError, PollState};
use tether_host::{
    Bridge, BridgeConfig, ClipboardMode, ConsoleLevel, ConsoleSink, DeniedClipboard,
    MemoryClipboard,
};
use tether_kv::{Location, MemoryStorage};

fn captured_console() -> (ConsoleSink, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let captured = lines.clone();
    let sink = ConsoleSink::new(move |level, message| {
        assert_eq!(level, ConsoleLevel::Log);
        captured.lock().push(message.to_string());
    });
    (sink, lines)
}

#[test]
fn test_storage_save_then_load() {
    let mut bridge = Bridge::new();
    let key = bridge.string("token");
    let val = bridge.string("abc123");

    assert_eq!(bridge.storage_save(key, val).unwrap(), Ok(()));
    let loaded = bridge.storage_load(key).unwrap().unwrap();
    assert_eq!(bridge.read_string(loaded).unwrap().as_deref(), Some("abc123"));
}

#[test]
fn test_storage_load_missing_key() {
    let mut bridge = Bridge::new();
    let key = bridge.string("missing-key");

    assert_eq!(
        bridge.storage_load(key).unwrap(),
        Err("Couldn't find key `missing-key` in localstorage".to_string())
    );
}

#[test]
fn test_storage_invalid_handle_is_outer_error() {
    let mut bridge = Bridge::new();
    let val = bridge.string("v");
    assert_eq!(
        bridge.storage_save(404, val),
        Err(BridgeError::InvalidHandle(404))
    );
}

#[test]
fn test_clipboard_set_waits_for_tick() {
    let clipboard = Arc::new(MemoryClipboard::default());
    let mut bridge = Bridge::with_services(Arc::new(MemoryStorage::new()), clipboard.clone());

    let text = bridge.string("hello");
    let poll = bridge.clipboard_set(text).unwrap();
    assert_eq!(bridge.poll(poll).unwrap(), PollState::Waiting);
    assert_eq!(clipboard.contents(), "");

    bridge.tick();
    let done = bridge.poll(poll).unwrap().ready().unwrap();
    assert!(bridge.handles().resolve(done).unwrap().is_undefined());
    assert_eq!(clipboard.contents(), "hello");

    // generic field view of the same poll handle
    let field = bridge.string("waiting");
    let waiting = bridge.try_get_field(poll, field).unwrap();
    let waiting = bridge.unwrap_optional(waiting).unwrap().unwrap();
    assert_eq!(bridge.primitive_from_host_bool(waiting).unwrap(), Some(false));
}

#[test]
fn test_rejected_clipboard_read_stays_waiting_forever() {
    let mut bridge =
        Bridge::with_services(Arc::new(MemoryStorage::new()), Arc::new(DeniedClipboard));

    let poll = bridge.clipboard_get();
    for _ in 0..5 {
        bridge.tick();
        assert_eq!(bridge.poll(poll).unwrap(), PollState::Waiting);
    }
}

#[test]
fn test_has_field_after_set_field_any() {
    let mut bridge = Bridge::new();
    let obj = bridge.object();
    assert!(!bridge.has_field_named(obj, "x").unwrap());

    let key = bridge.string("x");
    let val = bridge.primitive_to_host_i32(42);
    bridge.set_field_any(obj, key, val).unwrap();
    assert!(bridge.has_field_named(obj, "x").unwrap());
}

#[test]
fn test_type_of_array_is_object() {
    let mut bridge = Bridge::new();
    let array = bridge.array();
    let name = bridge.type_of(array).unwrap();
    assert_eq!(bridge.read_string(name).unwrap().as_deref(), Some("object"));
}

#[test]
fn test_array_growth_through_boundary() {
    let mut bridge = Bridge::new();
    let array = bridge.array();
    let index = bridge.primitive_to_host_u32(2);
    let val = bridge.string("c");
    bridge.set_field_any(array, index, val).unwrap();

    let length = bridge.string("length");
    let found = bridge.try_get_field(array, length).unwrap();
    let length = bridge.unwrap_optional(found).unwrap().unwrap();
    assert_eq!(bridge.primitive_from_host_usize(length).unwrap(), Some(3));

    let text = bridge.as_string(array).unwrap();
    assert_eq!(bridge.read_string(text).unwrap().as_deref(), Some(",,c"));
}

#[test]
fn test_console_log_receives_raw_values() {
    let (sink, lines) = captured_console();
    let mut bridge = Bridge::new().with_console(sink);

    let greeting = bridge.string("hi there");
    let obj = bridge.object();
    let key = bridge.string("n");
    let val = bridge.primitive_to_host_f64(1.5);
    bridge.set_field_any(obj, key, val).unwrap();
    let null = bridge.null();

    bridge.console_log(greeting).unwrap();
    bridge.console_log(obj).unwrap();
    bridge.console_log(null).unwrap();
    assert!(bridge.console_log(9999).is_err());

    assert_eq!(*lines.lock(), vec!["hi there", r#"{"n":1.5}"#, "null"]);
}

#[test]
fn test_release_only_invalidates_one_alias() {
    let mut bridge = Bridge::new();
    let obj = bridge.object();
    let alias = bridge.register(bridge.handles().resolve(obj).unwrap());

    bridge.release(obj).unwrap();
    assert!(bridge.type_of(obj).is_err());
    assert!(bridge.type_of(alias).is_ok());
}

#[test]
fn test_bridge_from_config() {
    let config = BridgeConfig::default()
        .with_clipboard_mode(ClipboardMode::Memory)
        .with_initial_clipboard("from config")
        .with_location(Location::for_app("demo", "2"));
    let mut bridge = Bridge::from_config(&config).unwrap();
    assert_eq!(bridge.location().key(), "demo/v2/default");

    let poll = bridge.clipboard_get();
    bridge.tick();
    let text = bridge.poll(poll).unwrap().ready().unwrap();
    assert_eq!(bridge.read_string(text).unwrap().as_deref(), Some("from config"));
}

#[test]
fn test_frozen_object_rejects_set_field_any() {
    let mut bridge = Bridge::new();
    let obj = bridge.object();
    bridge.freeze(obj).unwrap();
    let key = bridge.string("x");
    let val = bridge.null();

    let err = bridge.set_field_any(obj, key, val).unwrap_err();
    assert!(matches!(err, BridgeError::HostFault(_)));
    assert!(!bridge.has_field_named(obj, "x").unwrap());
}
