//! Interface members: methods, signals, and properties.

use std::fmt;

use omnibus_wire::{BusTransport, CallError, MethodCall};

/// Callback signature for method handlers.
///
/// Handlers receive the transport (to send their own reply), the incoming
/// call, and the user data captured when the path was created. Returning a
/// [`CallError`] makes the dispatch engine synthesize an error reply
/// addressed to the call.
pub type MethodCallback<D> =
	dyn Fn(&dyn BusTransport, &MethodCall, &D) -> Result<(), CallError>;

pub(crate) enum HandlerKind<D> {
	/// Built-in `Introspect` implementation, resolved by the dispatch
	/// engine against the registry it is already traversing.
	Introspect,
	/// Caller-supplied callback.
	Callback(Box<MethodCallback<D>>),
}

/// What to run when a method member is called.
///
/// Construct with [`MethodHandler::new`] (or the [`Member::method`]
/// convenience); the built-in `Introspect` handler is created internally
/// when a path is first registered.
pub struct MethodHandler<D>(pub(crate) HandlerKind<D>);

impl<D> MethodHandler<D> {
	/// Wraps a callback.
	pub fn new(
		callback: impl Fn(&dyn BusTransport, &MethodCall, &D) -> Result<(), CallError> + 'static,
	) -> Self {
		Self(HandlerKind::Callback(Box::new(callback)))
	}

	pub(crate) const fn introspect() -> Self {
		Self(HandlerKind::Introspect)
	}
}

impl<D> fmt::Debug for MethodHandler<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0 {
			HandlerKind::Introspect => f.write_str("MethodHandler::Introspect"),
			HandlerKind::Callback(_) => f.write_str("MethodHandler::Callback"),
		}
	}
}

/// Access mode of a property member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAccess {
	/// Readable only.
	Read,
	/// Writable only.
	Write,
	/// Readable and writable.
	ReadWrite,
}

impl PropertyAccess {
	/// The literal access string used in introspection documents.
	#[must_use]
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Read => "read",
			Self::Write => "write",
			Self::ReadWrite => "readwrite",
		}
	}
}

/// One member of an interface.
///
/// Methods carry a handler plus input and output signatures; signals and
/// properties are metadata only, surfaced through introspection.
#[derive(Debug)]
pub enum Member<D> {
	/// A callable method.
	Method {
		/// Member name.
		name: String,
		/// Handler invoked on dispatch.
		handler: MethodHandler<D>,
		/// Signature of the input arguments (may be empty).
		in_sig: String,
		/// Signature of the output arguments (may be empty).
		out_sig: String,
	},
	/// A signal the interface may emit.
	Signal {
		/// Member name.
		name: String,
		/// Signature of the signal arguments.
		sig: String,
	},
	/// A property the interface exposes.
	Property {
		/// Member name.
		name: String,
		/// Type signature of the property value.
		sig: String,
		/// Access mode.
		access: PropertyAccess,
	},
}

impl<D> Member<D> {
	/// Creates a method member from a callback.
	pub fn method(
		name: impl Into<String>,
		in_sig: impl Into<String>,
		out_sig: impl Into<String>,
		callback: impl Fn(&dyn BusTransport, &MethodCall, &D) -> Result<(), CallError> + 'static,
	) -> Self {
		Self::Method {
			name: name.into(),
			handler: MethodHandler::new(callback),
			in_sig: in_sig.into(),
			out_sig: out_sig.into(),
		}
	}

	/// Creates a signal member.
	pub fn signal(name: impl Into<String>, sig: impl Into<String>) -> Self {
		Self::Signal { name: name.into(), sig: sig.into() }
	}

	/// Creates a property member.
	pub fn property(
		name: impl Into<String>,
		sig: impl Into<String>,
		access: PropertyAccess,
	) -> Self {
		Self::Property { name: name.into(), sig: sig.into(), access }
	}

	/// The member's name, whatever its kind.
	#[must_use]
	pub fn name(&self) -> &str {
		match self {
			Self::Method { name, .. } | Self::Signal { name, .. } | Self::Property { name, .. } => {
				name
			}
		}
	}
}
