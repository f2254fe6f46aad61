//! Introspection document generation.
//!
//! Renders a path's interfaces into the standard bus introspection XML.
//! The document format is fixed by the wire schema consumed by generic
//! introspection tooling; element and attribute names here must not drift.

use omnibus_wire::signature;

use crate::member::Member;
use crate::registry::PathEntry;
use crate::{Error, Result};

/// Standard introspection doctype declaration, emitted verbatim before the
/// `<node>` root.
pub const DOCTYPE: &str = "<!DOCTYPE node PUBLIC \"-//freedesktop//DTD D-BUS Object Introspection 1.0//EN\"\n\"http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd\">\n";

/// Renders the introspection document for a path.
///
/// Interfaces appear in registration order, members in their declared
/// order. Method and signal signatures are validated and split into
/// complete single types, one `<arg>` element per segment; a malformed
/// signature fails the whole generation and the caller keeps whatever
/// document it had before.
pub(crate) fn generate<D>(entry: &PathEntry<D>) -> Result<String> {
	let mut doc = String::with_capacity(512);
	doc.push_str(DOCTYPE);
	doc.push_str("<node>\n");

	for iface in entry.interfaces() {
		doc.push_str(&format!(" <interface name=\"{}\">\n", iface.name()));
		for member in iface.members() {
			match member {
				Member::Method { name, in_sig, out_sig, .. } => {
					doc.push_str(&format!("  <method name=\"{name}\">\n"));
					append_args(&mut doc, in_sig, Some("in"))?;
					append_args(&mut doc, out_sig, Some("out"))?;
					doc.push_str("  </method>\n");
				}
				Member::Signal { name, sig } => {
					doc.push_str(&format!("  <signal name=\"{name}\">\n"));
					append_args(&mut doc, sig, None)?;
					doc.push_str("  </signal>\n");
				}
				Member::Property { name, sig, access } => {
					doc.push_str(&format!(
						"  <property name=\"{name}\" type=\"{sig}\" access=\"{}\" />\n",
						access.as_str()
					));
				}
			}
		}
		doc.push_str(" </interface>\n");
	}
	doc.push_str("</node>");

	Ok(doc)
}

/// Emits one `<arg>` element per complete single type in `sig`.
fn append_args(doc: &mut String, sig: &str, direction: Option<&str>) -> Result<()> {
	for segment in signature::split(sig).map_err(Error::Signature)? {
		match direction {
			Some(direction) => doc.push_str(&format!(
				"   <arg type=\"{segment}\" direction=\"{direction}\" />\n"
			)),
			None => doc.push_str(&format!("   <arg type=\"{segment}\" />\n")),
		}
	}
	Ok(())
}

/// Returns the cached document for `entry`, generating and caching one if
/// none exists. Mutations regenerate eagerly, so this only generates for a
/// path whose every regeneration so far has failed.
pub(crate) fn cached_or_generate<D>(entry: &PathEntry<D>) -> Result<String> {
	let mut cache = entry.cached_xml.lock();
	if let Some(doc) = cache.as_ref() {
		return Ok(doc.clone());
	}
	let doc = generate(entry)?;
	*cache = Some(doc.clone());
	Ok(doc)
}
