//! # Tether Core
//!
//! The guest side of a foreign-object bridge: a guest without a garbage
//! collector or native suspension works with objects owned by a dynamic
//! host through small integer handles.
//!
//! - **Handles**: [`HandleTable`] maps live handles to [`HostValue`]s
//! - **Marshaling**: guest primitives and composite encodings to and from host values
//! - **Object ops**: field access, coercion and equality by handle
//! - **Async polling**: host promises observed through poll handles

#![warn(clippy::all)]

pub mod error;
pub mod handle;
pub mod marshal;
pub mod microtask;
pub mod ops;
pub mod poll;
pub mod promise;
pub mod value;

pub use error::{BridgeError, BridgeResult};
pub use handle::{Handle, HandleTable};
pub use marshal::{
    FromHost, HostPrimitive, PRIMITIVE_KINDS, Primitive, PrimitiveKind, ToHost, decode_optional,
    decode_result, encode_optional, encode_result, primitive_from_host, primitive_to_host,
};
pub use microtask::MicrotaskQueue;
pub use poll::{PollCell, PollState, begin_async, check};
pub use promise::{HostPromise, PromiseState};
pub use value::{HostArray, HostRecord, HostType, HostValue, ServiceObject};
