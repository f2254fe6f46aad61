//! Call dispatch.
//!
//! Runs inside the transport's message-processing step, one call at a
//! time, on the thread that owns the registry. Handlers send their own
//! replies; the engine only synthesizes error replies for handler
//! failures.

use tracing::{debug, warn};

use omnibus_wire::{Body, CallError, ERR_INVALID_SIGNATURE, MethodCall, Value};

use crate::introspect;
use crate::member::{HandlerKind, Member, MethodHandler};
use crate::registry::{PathEntry, Registry};

/// Outcome of dispatching one incoming call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
	/// The call was consumed: a handler ran, or the call was malformed and
	/// must not be offered to any other handler.
	Handled,
	/// No registered method matched; the transport may offer the call to
	/// its next handler.
	NotYetHandled,
}

impl<D> Registry<D> {
	/// Routes an incoming method call to its registered handler.
	///
	/// A call missing its interface or member name is consumed without
	/// action. An unknown path, interface, or method defers to the
	/// transport's next handler. When a handler fails, exactly one error
	/// reply addressed to the call is sent and the call is still reported
	/// handled; a failed error-reply send is logged and otherwise dropped,
	/// leaving the remote caller to time out.
	pub fn dispatch(&self, call: &MethodCall) -> DispatchResult {
		let (Some(interface), Some(member)) = (call.interface.as_deref(), call.member.as_deref())
		else {
			debug!(path = %call.path, serial = call.serial, "dropping call without interface or member");
			return DispatchResult::Handled;
		};

		let Some(entry) = self.lookup(&call.path) else {
			return DispatchResult::NotYetHandled;
		};

		for iface in entry.interfaces() {
			if iface.name() != interface {
				continue;
			}
			if let Some(handler) = find_method(iface.members(), member) {
				debug!(path = %call.path, interface, member, "dispatching method call");
				self.invoke(entry, handler, call);
				return DispatchResult::Handled;
			}
		}

		DispatchResult::NotYetHandled
	}

	fn invoke(&self, entry: &PathEntry<D>, handler: &MethodHandler<D>, call: &MethodCall) {
		match &handler.0 {
			HandlerKind::Introspect => self.serve_introspect(entry, call),
			HandlerKind::Callback(callback) => {
				if let Err(error) = callback(self.transport.as_ref(), call, entry.user_data()) {
					self.reply_error(call, &error);
				}
			}
		}
	}

	/// Answers the built-in `Introspect` method with the path's document,
	/// generating it on demand if no cached copy exists.
	fn serve_introspect(&self, entry: &PathEntry<D>, call: &MethodCall) {
		match introspect::cached_or_generate(entry) {
			Ok(doc) => {
				let body = Body::new().with(Value::Str(doc));
				if let Err(err) = self.transport.send_reply(call, body) {
					warn!(path = %entry.path(), error = %err, "failed to send introspection reply");
				}
			}
			Err(err) => {
				self.reply_error(call, &CallError::new(ERR_INVALID_SIGNATURE, err.to_string()));
			}
		}
	}

	/// Sends one error reply addressed to `call`. Send failures are logged
	/// and swallowed; the remote caller observes a timeout instead.
	fn reply_error(&self, call: &MethodCall, error: &CallError) {
		if let Err(err) = self.transport.send_error(call, error) {
			warn!(
				serial = call.serial,
				name = %error.name,
				error = %err,
				"failed to send error reply"
			);
		}
	}
}

/// Finds the method member named `name`, skipping signals and properties.
fn find_method<'a, D>(members: &'a [Member<D>], name: &str) -> Option<&'a MethodHandler<D>> {
	members.iter().find_map(|member| match member {
		Member::Method { name: candidate, handler, .. } if candidate == name => Some(handler),
		_ => None,
	})
}
