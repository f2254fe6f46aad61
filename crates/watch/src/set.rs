//! The watch set proper.

use std::os::fd::RawFd;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use omnibus_wire::{BusTransport, PollEvents, TransportError, WatchHandle, WatchTracker};

/// A descriptor and the events to poll it for.
///
/// This is what [`WatchSet::poll_fds`] hands the caller, one per entry;
/// entries whose watch is currently disabled carry a negated descriptor so
/// `poll(2)` ignores them without disturbing the array layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollFd {
	/// The descriptor to poll.
	pub fd: RawFd,
	/// Events to poll for.
	pub events: PollEvents,
}

/// A polled descriptor and the events it reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyFd {
	/// The descriptor that reported activity.
	pub fd: RawFd,
	/// The events it reported.
	pub revents: PollEvents,
}

#[derive(Debug, Clone)]
struct WatchEntry {
	fd: RawFd,
	events: PollEvents,
	enabled: bool,
	/// `None` for descriptors the caller seeded; those never reach the
	/// transport.
	handle: Option<WatchHandle>,
}

/// A synchronized, growable pairing of pollable descriptors with bus watch
/// handles.
///
/// The transport mutates the set through its [`WatchTracker`] registration,
/// possibly from inside calls the owning thread makes into the transport;
/// the mutex guards those array edits only. It is never held across the
/// caller's poll, nor across calls back into the transport.
pub struct WatchSet {
	entries: Mutex<Vec<WatchEntry>>,
}

impl WatchSet {
	/// Creates a watch set seeded with the caller's own descriptors and
	/// installs it as the transport's watch tracker.
	///
	/// The seeded descriptors carry no watch handle:
	/// [`WatchSet::process_ready`] skips them, and the caller handles their
	/// activity directly.
	///
	/// # Errors
	///
	/// Propagates the transport's failure to install the tracker.
	pub fn init(
		transport: &dyn BusTransport,
		non_bus_fds: &[PollFd],
	) -> Result<Arc<Self>, TransportError> {
		let entries = non_bus_fds
			.iter()
			.map(|pfd| WatchEntry { fd: pfd.fd, events: pfd.events, enabled: true, handle: None })
			.collect();
		let set = Arc::new(Self { entries: Mutex::new(entries) });
		transport.set_watch_tracker(set.clone())?;
		debug!(seeded = non_bus_fds.len(), "watch set installed");
		Ok(set)
	}

	/// Number of entries, bus watches and caller descriptors alike.
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Returns true if the set holds no entries.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	/// Snapshots the descriptor array for polling.
	///
	/// Taken outside the mutex the caller polls with; re-read it after
	/// every poll cycle, since the transport can add or remove watches
	/// between cycles. Disabled entries keep their slot but are emitted
	/// with a negated descriptor, which `poll(2)` ignores.
	#[must_use]
	pub fn poll_fds(&self) -> Vec<PollFd> {
		self.entries
			.lock()
			.iter()
			.map(|entry| PollFd {
				fd: if entry.enabled { entry.fd } else { !entry.fd },
				events: entry.events,
			})
			.collect()
	}

	/// Feeds poll results back to the transport.
	///
	/// For every ready descriptor whose entry carries a watch handle, the
	/// transport's per-watch processing entry point is invoked outside the
	/// mutex, since the transport may re-enter the set from there. Ready
	/// descriptors without a handle are the caller's own; handling them is
	/// the caller's job and they are skipped here.
	pub fn process_ready(&self, transport: &dyn BusTransport, ready: &[ReadyFd]) {
		let mut pending = Vec::new();
		{
			let entries = self.entries.lock();
			for ready_fd in ready {
				if ready_fd.revents.is_empty() {
					continue;
				}
				let matched = entries
					.iter()
					.find(|entry| entry.enabled && entry.fd == ready_fd.fd);
				if let Some(entry) = matched
					&& let Some(handle) = entry.handle
				{
					pending.push((handle, ready_fd.revents));
				}
			}
		}

		for (handle, revents) in pending {
			if let Err(err) = transport.handle_watch(handle, revents) {
				warn!(handle = handle.raw(), error = %err, "watch processing failed");
			}
		}
	}
}

impl WatchTracker for WatchSet {
	fn add_watch(&self, fd: RawFd, events: PollEvents, handle: WatchHandle) {
		debug!(fd, handle = handle.raw(), "adding bus watch");
		self.entries
			.lock()
			.push(WatchEntry { fd, events, enabled: true, handle: Some(handle) });
	}

	fn remove_watch(&self, handle: WatchHandle) {
		let mut entries = self.entries.lock();
		match entries.iter().position(|entry| entry.handle == Some(handle)) {
			// Vec::remove compacts in place, keeping the remaining
			// entries' relative order.
			Some(index) => {
				let removed = entries.remove(index);
				debug!(fd = removed.fd, handle = handle.raw(), "removed bus watch");
			}
			None => warn!(handle = handle.raw(), "remove notification for unknown watch"),
		}
	}

	fn toggle_watch(&self, handle: WatchHandle, enabled: bool) {
		let mut entries = self.entries.lock();
		match entries.iter_mut().find(|entry| entry.handle == Some(handle)) {
			Some(entry) => entry.enabled = enabled,
			None => warn!(handle = handle.raw(), "toggle notification for unknown watch"),
		}
	}
}
