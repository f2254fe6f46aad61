//! Service-side object registry for an inter-process message bus.
//!
//! Callers register named objects ("paths"), each implementing one or more
//! named interfaces made of methods, signals, and properties. The
//! [`Registry`] routes incoming method calls to the registered handler,
//! answers the standard `Introspect` method with a generated XML document
//! describing each object's shape, and emits signals validated against
//! their declared signatures.
//!
//! The registry owns all registered state outright and is driven by a
//! single thread; the bus connection itself stays behind the
//! [`BusTransport`](omnibus_wire::BusTransport) seam.

#![warn(missing_docs)]

pub mod dispatch;
pub mod introspect;
pub mod member;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatch::DispatchResult;
pub use member::{Member, MethodHandler, PropertyAccess};
pub use registry::{
	DuplicatePolicy, INTROSPECTABLE_INTERFACE, InterfaceEntry, PathEntry, Registry,
};

use omnibus_wire::{BodyError, SignatureError, TransportError};

/// A convenient type alias for `Result` with `E` = [`enum@Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible errors from registry operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// No object is registered at the given path.
	#[error("unknown object path {0:?}")]
	UnknownPath(String),
	/// The path already implements an interface with this name.
	#[error("path {path:?} already implements interface {interface:?}")]
	DuplicateInterface {
		/// The object path.
		path: String,
		/// The interface name that collided.
		interface: String,
	},
	/// The named member does not exist on the given interface.
	#[error("no member {member:?} on interface {interface:?} of path {path:?}")]
	NoSuchMember {
		/// The object path.
		path: String,
		/// The interface that was searched.
		interface: String,
		/// The member name that was not found.
		member: String,
	},
	/// A registered member carries a malformed type signature.
	#[error(transparent)]
	Signature(#[from] SignatureError),
	/// A message body failed validation.
	#[error(transparent)]
	Body(#[from] BodyError),
	/// The bus transport reported a failure.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
