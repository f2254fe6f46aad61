//! Recording transport double shared by the unit tests.

use std::sync::Arc;

use parking_lot::Mutex;

use omnibus_wire::{
	Body, BusTransport, CallError, MethodCall, PollEvents, TransportError, WatchHandle,
	WatchTracker,
};

/// A [`BusTransport`] that records every interaction instead of talking to
/// a bus, with switches to simulate rejection and send failures.
#[derive(Default)]
pub(crate) struct MockTransport {
	pub registered_paths: Mutex<Vec<String>>,
	pub replies: Mutex<Vec<(u32, Body)>>,
	pub errors: Mutex<Vec<(u32, CallError)>>,
	pub signals: Mutex<Vec<(String, String, String, Body)>>,
	pub reject_paths: bool,
	pub fail_sends: bool,
}

impl MockTransport {
	pub fn arc() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn send_count(&self) -> usize {
		self.replies.lock().len() + self.errors.lock().len() + self.signals.lock().len()
	}
}

impl BusTransport for MockTransport {
	fn register_object_path(&self, path: &str) -> Result<(), TransportError> {
		if self.reject_paths {
			return Err(TransportError::PathRejected(path.to_owned()));
		}
		self.registered_paths.lock().push(path.to_owned());
		Ok(())
	}

	fn send_reply(&self, call: &MethodCall, body: Body) -> Result<(), TransportError> {
		if self.fail_sends {
			return Err(TransportError::Send("mock send failure".to_owned()));
		}
		self.replies.lock().push((call.serial, body));
		Ok(())
	}

	fn send_error(&self, call: &MethodCall, error: &CallError) -> Result<(), TransportError> {
		if self.fail_sends {
			return Err(TransportError::Send("mock send failure".to_owned()));
		}
		self.errors.lock().push((call.serial, error.clone()));
		Ok(())
	}

	fn send_signal(
		&self,
		path: &str,
		interface: &str,
		member: &str,
		body: Body,
	) -> Result<(), TransportError> {
		if self.fail_sends {
			return Err(TransportError::Send("mock send failure".to_owned()));
		}
		self.signals
			.lock()
			.push((path.to_owned(), interface.to_owned(), member.to_owned(), body));
		Ok(())
	}

	fn set_watch_tracker(&self, _tracker: Arc<dyn WatchTracker>) -> Result<(), TransportError> {
		Ok(())
	}

	fn handle_watch(
		&self,
		_handle: WatchHandle,
		_revents: PollEvents,
	) -> Result<(), TransportError> {
		Ok(())
	}
}
