//! End-to-end exercise of the public API: register a calculator object,
//! drive a call through dispatch, and check the generated introspection
//! document.

use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use omnibus_object::{DispatchResult, Member, Registry};
use omnibus_wire::{
	Body, BusTransport, CallError, MethodCall, PollEvents, TransportError, Value, WatchHandle,
	WatchTracker,
};

#[derive(Default)]
struct RecordingTransport {
	replies: Mutex<Vec<(u32, Body)>>,
	errors: Mutex<Vec<(u32, CallError)>>,
}

impl BusTransport for RecordingTransport {
	fn register_object_path(&self, _path: &str) -> Result<(), TransportError> {
		Ok(())
	}

	fn send_reply(&self, call: &MethodCall, body: Body) -> Result<(), TransportError> {
		self.replies.lock().push((call.serial, body));
		Ok(())
	}

	fn send_error(&self, call: &MethodCall, error: &CallError) -> Result<(), TransportError> {
		self.errors.lock().push((call.serial, error.clone()));
		Ok(())
	}

	fn send_signal(
		&self,
		_path: &str,
		_interface: &str,
		_member: &str,
		_body: Body,
	) -> Result<(), TransportError> {
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

fn add_member() -> Member<()> {
	Member::method("Add", "ii", "i", |t: &dyn BusTransport, call, _: &()| {
		let mut args = call.body.cursor();
		let a = args.next().map_err(|e| CallError::invalid_args(e.to_string()))?;
		let b = args.next().map_err(|e| CallError::invalid_args(e.to_string()))?;
		match (a.as_i32(), b.as_i32()) {
			(Some(a), Some(b)) => t
				.send_reply(call, Body::new().with(Value::Int32(a + b)))
				.map_err(|e| CallError::failed(e.to_string())),
			_ => Err(CallError::invalid_args("Add takes two int32 values")),
		}
	})
}

#[test]
fn registered_method_answers_calls_and_shows_up_in_introspection() {
	let transport = Arc::new(RecordingTransport::default());
	let mut registry = Registry::new(transport.clone());
	registry
		.register("/obj", "com.example.Calc", vec![add_member()], ())
		.unwrap();

	let call = MethodCall::new(1, "/obj", "com.example.Calc", "Add")
		.with_body(Body::new().with(Value::Int32(5)).with(Value::Int32(7)));
	assert_eq!(registry.dispatch(&call), DispatchResult::Handled);
	assert_eq!(
		*transport.replies.lock(),
		vec![(1, Body::new().with(Value::Int32(12)))]
	);

	let doc = registry.introspection_xml("/obj").unwrap();
	assert!(doc.contains("<interface name=\"com.example.Calc\">"));
	let method_block = "  <method name=\"Add\">\n   \
		<arg type=\"i\" direction=\"in\" />\n   \
		<arg type=\"i\" direction=\"in\" />\n   \
		<arg type=\"i\" direction=\"out\" />\n  \
		</method>\n";
	assert!(doc.contains(method_block), "document was:\n{doc}");
}

#[test]
fn short_body_is_answered_with_invalid_args() {
	let transport = Arc::new(RecordingTransport::default());
	let mut registry = Registry::new(transport.clone());
	registry
		.register("/obj", "com.example.Calc", vec![add_member()], ())
		.unwrap();

	let call = MethodCall::new(2, "/obj", "com.example.Calc", "Add")
		.with_body(Body::new().with(Value::Int32(5)));
	assert_eq!(registry.dispatch(&call), DispatchResult::Handled);

	let errors = transport.errors.lock();
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].0, 2);
	assert_eq!(errors[0].1.name, omnibus_wire::ERR_INVALID_ARGS);
	assert!(transport.replies.lock().is_empty());
}
