//! Incoming-message view.

use crate::value::Body;

/// The fields of an incoming method-call message the dispatcher cares about.
///
/// The transport owns framing and marshaling; by the time a call reaches the
/// registry it has been reduced to this view. `interface` and `member` are
/// optional because the wire format allows calls without them; the dispatch
/// engine treats such calls as malformed and swallows them.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
	/// Serial of the call, used to address replies.
	pub serial: u32,
	/// Unique bus name of the caller, when known.
	pub sender: Option<String>,
	/// Object path the call targets.
	pub path: String,
	/// Interface the call names, if any.
	pub interface: Option<String>,
	/// Member (method name) the call names, if any.
	pub member: Option<String>,
	/// Argument values carried by the call.
	pub body: Body,
}

impl MethodCall {
	/// Creates a call targeting `path` with the given interface and member.
	#[must_use]
	pub fn new(serial: u32, path: impl Into<String>, interface: &str, member: &str) -> Self {
		Self {
			serial,
			sender: None,
			path: path.into(),
			interface: Some(interface.to_owned()),
			member: Some(member.to_owned()),
			body: Body::new(),
		}
	}

	/// Attaches a body, builder style.
	#[must_use]
	pub fn with_body(mut self, body: Body) -> Self {
		self.body = body;
		self
	}

	/// Attaches a sender name, builder style.
	#[must_use]
	pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
		self.sender = Some(sender.into());
		self
	}
}
