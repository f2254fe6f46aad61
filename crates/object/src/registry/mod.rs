//! Object registry.
//!
//! Maps object paths to their implemented interfaces and keeps the cached
//! introspection document for each path in step with registrations. The
//! registry is an explicit value owned by the thread driving the bus; it is
//! not shared across threads.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use omnibus_wire::{Body, BusTransport};

use crate::member::{Member, MethodHandler};
use crate::{Error, Result, introspect};

/// Interface every registered path implements implicitly.
pub const INTROSPECTABLE_INTERFACE: &str = "org.freedesktop.DBus.Introspectable";

/// What `register` does when a path already implements an interface with
/// the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
	/// Fail with [`Error::DuplicateInterface`] and leave the path untouched.
	#[default]
	Reject,
	/// Swap the existing entry's members in place, keeping interface order.
	Replace,
	/// Append a second entry with the same name. Introspection will then
	/// list the interface twice; dispatch scans entries in order, so the
	/// first matching method wins.
	Append,
}

/// A named interface implemented by a path, with its members in
/// registration order.
#[derive(Debug)]
pub struct InterfaceEntry<D> {
	name: String,
	members: Vec<Member<D>>,
}

impl<D> InterfaceEntry<D> {
	pub(crate) fn new(name: impl Into<String>, members: Vec<Member<D>>) -> Self {
		Self { name: name.into(), members }
	}

	/// The interface name.
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The members in registration order.
	#[must_use]
	pub fn members(&self) -> &[Member<D>] {
		&self.members
	}
}

/// A registered object path: its interfaces, its cached introspection
/// document, and the user data captured when it was created.
#[derive(Debug)]
pub struct PathEntry<D> {
	path: String,
	interfaces: Vec<InterfaceEntry<D>>,
	/// Rendered introspection document. `None` until the first successful
	/// generation; left at its previous value when regeneration fails.
	pub(crate) cached_xml: Mutex<Option<String>>,
	user_data: D,
}

impl<D> PathEntry<D> {
	/// Creates an entry whose interface list starts with the built-in
	/// Introspectable interface. That interface is added exactly once,
	/// here.
	// TODO: also provision org.freedesktop.DBus.Peer and
	// org.freedesktop.DBus.Properties for every path.
	pub(crate) fn new(path: impl Into<String>, user_data: D) -> Self {
		let introspectable = InterfaceEntry::new(
			INTROSPECTABLE_INTERFACE,
			vec![Member::Method {
				name: "Introspect".to_owned(),
				handler: MethodHandler::introspect(),
				in_sig: String::new(),
				out_sig: "s".to_owned(),
			}],
		);
		Self {
			path: path.into(),
			interfaces: vec![introspectable],
			cached_xml: Mutex::new(None),
			user_data,
		}
	}

	/// The object path.
	#[must_use]
	pub fn path(&self) -> &str {
		&self.path
	}

	/// The implemented interfaces in registration order.
	#[must_use]
	pub fn interfaces(&self) -> &[InterfaceEntry<D>] {
		&self.interfaces
	}

	/// The user data captured when the path was created.
	#[must_use]
	pub fn user_data(&self) -> &D {
		&self.user_data
	}

	fn interface_index(&self, name: &str) -> Option<usize> {
		self.interfaces.iter().position(|iface| iface.name == name)
	}

	#[cfg(test)]
	pub(crate) fn push_interface_for_test(&mut self, name: &str, members: Vec<Member<D>>) {
		self.interfaces.push(InterfaceEntry::new(name, members));
	}
}

/// Registry of objects exposed on the bus.
///
/// `D` is the user-data type handed to method handlers; one value is
/// captured per path, from the `register` call that created it.
pub struct Registry<D> {
	pub(crate) paths: Vec<PathEntry<D>>,
	pub(crate) transport: Arc<dyn BusTransport>,
	policy: DuplicatePolicy,
}

impl<D> Registry<D> {
	/// Creates an empty registry bound to a transport, rejecting duplicate
	/// interface registrations.
	#[must_use]
	pub fn new(transport: Arc<dyn BusTransport>) -> Self {
		Self::with_policy(transport, DuplicatePolicy::default())
	}

	/// Creates an empty registry with an explicit duplicate-interface
	/// policy.
	#[must_use]
	pub fn with_policy(transport: Arc<dyn BusTransport>, policy: DuplicatePolicy) -> Self {
		Self { paths: Vec::new(), transport, policy }
	}

	/// The transport this registry sends through.
	#[must_use]
	pub fn transport(&self) -> &Arc<dyn BusTransport> {
		&self.transport
	}

	/// Number of registered paths.
	#[must_use]
	pub fn len(&self) -> usize {
		self.paths.len()
	}

	/// Returns true if no path has been registered.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.paths.is_empty()
	}

	/// Registers `members` as interface `interface` of the object at
	/// `path`.
	///
	/// First use of a path claims it with the transport and provisions the
	/// built-in Introspectable interface; the `user_data` of that first
	/// call is the one handlers see for the lifetime of the path (later
	/// calls for the same path contribute interfaces only). The path's
	/// cached introspection document is regenerated synchronously before
	/// returning; if a member signature is malformed the previous document
	/// is kept and a warning is logged, surfacing the error on the next
	/// introspection request instead.
	///
	/// # Errors
	///
	/// [`Error::Transport`] when the bus refuses the path (nothing is
	/// committed), [`Error::DuplicateInterface`] under
	/// [`DuplicatePolicy::Reject`] when the interface name is already
	/// present (the path keeps its prior state).
	pub fn register(
		&mut self,
		path: &str,
		interface: &str,
		members: Vec<Member<D>>,
		user_data: D,
	) -> Result<()> {
		let policy = self.policy;
		let index = match self.path_index(path) {
			Some(index) => index,
			None => {
				self.transport.register_object_path(path)?;
				self.paths.push(PathEntry::new(path, user_data));
				self.paths.len() - 1
			}
		};

		let entry = &mut self.paths[index];
		let count = members.len();
		match entry.interface_index(interface) {
			Some(existing) => match policy {
				DuplicatePolicy::Reject => {
					return Err(Error::DuplicateInterface {
						path: path.to_owned(),
						interface: interface.to_owned(),
					});
				}
				DuplicatePolicy::Replace => entry.interfaces[existing].members = members,
				DuplicatePolicy::Append => {
					entry.interfaces.push(InterfaceEntry::new(interface, members));
				}
			},
			None => entry.interfaces.push(InterfaceEntry::new(interface, members)),
		}

		let entry = &self.paths[index];
		match introspect::generate(entry) {
			Ok(doc) => *entry.cached_xml.lock() = Some(doc),
			Err(err) => warn!(
				path,
				interface,
				error = %err,
				"introspection regeneration failed, keeping previous document"
			),
		}

		debug!(path, interface, members = count, "registered interface");
		Ok(())
	}

	/// Looks up a registered path.
	///
	/// Linear scan: registries hold tens to low hundreds of paths, so this
	/// stays simpler than hashing without costing anything measurable.
	#[must_use]
	pub fn lookup(&self, path: &str) -> Option<&PathEntry<D>> {
		self.paths.iter().find(|entry| entry.path == path)
	}

	fn path_index(&self, path: &str) -> Option<usize> {
		self.paths.iter().position(|entry| entry.path == path)
	}

	/// Returns the introspection document for `path`, generating and
	/// caching it if no document exists yet.
	///
	/// # Errors
	///
	/// [`Error::UnknownPath`] for unregistered paths,
	/// [`Error::Signature`] when a member signature is malformed and no
	/// previously rendered document exists to fall back on.
	pub fn introspection_xml(&self, path: &str) -> Result<String> {
		let entry = self.lookup(path).ok_or_else(|| Error::UnknownPath(path.to_owned()))?;
		introspect::cached_or_generate(entry)
	}

	/// Emits a signal declared on one of `path`'s interfaces, after
	/// validating `body` against the declared signature.
	///
	/// # Errors
	///
	/// [`Error::UnknownPath`] / [`Error::NoSuchMember`] when the signal is
	/// not registered, [`Error::Body`] when the body does not conform to
	/// the declared signature, [`Error::Transport`] when the send fails.
	pub fn emit_signal(
		&self,
		path: &str,
		interface: &str,
		member: &str,
		body: Body,
	) -> Result<()> {
		let entry = self.lookup(path).ok_or_else(|| Error::UnknownPath(path.to_owned()))?;
		let declared = entry
			.interfaces
			.iter()
			.filter(|iface| iface.name == interface)
			.flat_map(|iface| iface.members.iter())
			.find_map(|m| match m {
				Member::Signal { name, sig } if name == member => Some(sig.as_str()),
				_ => None,
			})
			.ok_or_else(|| Error::NoSuchMember {
				path: path.to_owned(),
				interface: interface.to_owned(),
				member: member.to_owned(),
			})?;
		body.conforms(declared)?;
		self.transport.send_signal(path, interface, member, body)?;
		debug!(path, interface, member, "emitted signal");
		Ok(())
	}
}
