//! Shared message-bus vocabulary for service-side crates.
//!
//! This crate defines the pieces every other crate in the workspace speaks in:
//! * [`signature`]: type-signature validation and single-complete-type splitting
//! * [`Value`] / [`Body`] / [`BodyCursor`]: typed argument lists for message bodies
//! * [`MethodCall`]: the view of an incoming method-call message
//! * [`CallError`]: structured handler failures that become protocol error replies
//! * [`BusTransport`] / [`WatchTracker`]: the seam to the external bus transport
//!
//! Wire-level concerns (framing, authentication, per-argument marshaling) stay
//! behind the [`BusTransport`] trait; nothing here touches a socket.

#![warn(missing_docs)]

pub mod error;
pub mod message;
pub mod signature;
pub mod transport;
pub mod value;

pub use error::{
	CallError, ERR_FAILED, ERR_INVALID_ARGS, ERR_INVALID_SIGNATURE, ERR_NO_MEMORY,
	ERR_UNKNOWN_METHOD,
};
pub use message::MethodCall;
pub use signature::SignatureError;
pub use transport::{BusTransport, PollEvents, TransportError, WatchHandle, WatchTracker};
pub use value::{Body, BodyCursor, BodyError, Value};
