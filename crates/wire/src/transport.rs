//! The seam to the external bus transport.
//!
//! Everything below the registry (connection handling, framing, argument
//! marshaling) lives behind [`BusTransport`]. The registry and the watch
//! set only ever talk to the transport through these traits, which keeps
//! them testable against a recording double.

use std::os::fd::RawFd;
use std::sync::Arc;

use thiserror::Error;

use crate::error::CallError;
use crate::message::MethodCall;
use crate::value::Body;

bitflags::bitflags! {
	/// Event mask for a pollable descriptor, mirroring `poll(2)`.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct PollEvents: u16 {
		/// Data may be read without blocking.
		const IN = 0x001;
		/// Urgent data may be read.
		const PRI = 0x002;
		/// Data may be written without blocking.
		const OUT = 0x004;
		/// An error condition is pending.
		const ERR = 0x008;
		/// The peer hung up.
		const HUP = 0x010;
		/// The descriptor is not open.
		const NVAL = 0x020;
	}
}

/// Opaque identifier for a watch the transport wants polled.
///
/// The transport mints these in its add notifications and names them again
/// in remove/toggle notifications and in [`BusTransport::handle_watch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(u64);

impl WatchHandle {
	/// Wraps a raw transport-assigned identifier.
	#[must_use]
	pub const fn new(raw: u64) -> Self {
		Self(raw)
	}

	/// The raw identifier.
	#[must_use]
	pub const fn raw(self) -> u64 {
		self.0
	}
}

/// Failures reported by the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TransportError {
	/// The bus refused to register the object path.
	#[error("object path {0:?} rejected by the bus")]
	PathRejected(String),
	/// A message could not be sent.
	#[error("send failed: {0}")]
	Send(String),
	/// The connection to the bus is gone.
	#[error("connection closed")]
	Disconnected,
}

/// Receiver of watch lifecycle notifications from the transport.
///
/// The transport may fire these from inside calls the owning thread makes
/// into it (a send that needs a new descriptor, for instance), so
/// implementations must be safe to call re-entrantly with respect to their
/// owner and must not block.
pub trait WatchTracker: Send + Sync {
	/// A new descriptor needs polling.
	fn add_watch(&self, fd: RawFd, events: PollEvents, handle: WatchHandle);
	/// The descriptor behind `handle` no longer needs polling.
	fn remove_watch(&self, handle: WatchHandle);
	/// The watch behind `handle` was enabled or disabled.
	fn toggle_watch(&self, handle: WatchHandle, enabled: bool);
}

/// The external bus-transport collaborator.
///
/// Implementations wrap a real bus connection. Message construction and
/// marshaling happen inside; callers hand over typed [`Body`] values and
/// the views the transport produced.
pub trait BusTransport {
	/// Claims `path` for dispatch, so incoming calls targeting it are routed
	/// to the owner of this registration.
	///
	/// # Errors
	///
	/// [`TransportError::PathRejected`] when the bus refuses the path.
	fn register_object_path(&self, path: &str) -> Result<(), TransportError>;

	/// Sends a method-return reply addressed to `call`.
	///
	/// # Errors
	///
	/// [`TransportError::Send`] or [`TransportError::Disconnected`].
	fn send_reply(&self, call: &MethodCall, body: Body) -> Result<(), TransportError>;

	/// Sends an error reply addressed to `call`.
	///
	/// # Errors
	///
	/// [`TransportError::Send`] or [`TransportError::Disconnected`].
	fn send_error(&self, call: &MethodCall, error: &CallError) -> Result<(), TransportError>;

	/// Emits a signal from `path`.
	///
	/// # Errors
	///
	/// [`TransportError::Send`] or [`TransportError::Disconnected`].
	fn send_signal(
		&self,
		path: &str,
		interface: &str,
		member: &str,
		body: Body,
	) -> Result<(), TransportError>;

	/// Installs the receiver for watch add/remove/toggle notifications.
	///
	/// The transport replays adds for watches that already exist.
	///
	/// # Errors
	///
	/// [`TransportError::Disconnected`] when the connection is gone.
	fn set_watch_tracker(&self, tracker: Arc<dyn WatchTracker>) -> Result<(), TransportError>;

	/// Processes a watch whose descriptor reported activity.
	///
	/// Called by the event loop after polling, once per ready bus watch.
	///
	/// # Errors
	///
	/// [`TransportError::Disconnected`] when the connection is gone.
	fn handle_watch(&self, handle: WatchHandle, revents: PollEvents) -> Result<(), TransportError>;
}
