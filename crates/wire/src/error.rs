//! Protocol-level errors and well-known error names.

use std::fmt;

/// `org.freedesktop.DBus.Error.NoMemory`.
pub const ERR_NO_MEMORY: &str = "org.freedesktop.DBus.Error.NoMemory";
/// `org.freedesktop.DBus.Error.InvalidArgs`.
pub const ERR_INVALID_ARGS: &str = "org.freedesktop.DBus.Error.InvalidArgs";
/// `org.freedesktop.DBus.Error.InvalidSignature`.
pub const ERR_INVALID_SIGNATURE: &str = "org.freedesktop.DBus.Error.InvalidSignature";
/// `org.freedesktop.DBus.Error.UnknownMethod`.
pub const ERR_UNKNOWN_METHOD: &str = "org.freedesktop.DBus.Error.UnknownMethod";
/// `org.freedesktop.DBus.Error.Failed`.
pub const ERR_FAILED: &str = "org.freedesktop.DBus.Error.Failed";

/// A structured handler failure: a protocol error name plus a human-readable
/// message.
///
/// Method handlers return this to have the dispatch engine synthesize an
/// error reply addressed to the incoming call. The name must follow the
/// bus error-name grammar (dot-separated, like an interface name); the
/// well-known `ERR_*` constants in this module cover the common cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallError {
	/// The protocol error name, e.g. `org.freedesktop.DBus.Error.Failed`.
	pub name: String,
	/// Human-readable detail for the remote caller.
	pub message: String,
}

impl CallError {
	/// Creates an error with an explicit name.
	#[must_use]
	pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self { name: name.into(), message: message.into() }
	}

	/// Creates a generic failure (`org.freedesktop.DBus.Error.Failed`).
	#[must_use]
	pub fn failed(message: impl Into<String>) -> Self {
		Self::new(ERR_FAILED, message)
	}

	/// Creates an invalid-arguments error.
	#[must_use]
	pub fn invalid_args(message: impl Into<String>) -> Self {
		Self::new(ERR_INVALID_ARGS, message)
	}
}

impl fmt::Display for CallError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.message.is_empty() {
			write!(f, "{}", self.name)
		} else {
			write!(f, "{}: {}", self.name, self.message)
		}
	}
}
