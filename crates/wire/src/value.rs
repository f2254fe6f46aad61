//! Typed argument values for message bodies.
//!
//! A [`Body`] replaces the untyped variadic argument lists of the classic C
//! bus APIs: an ordered sequence of (type code, value) pairs that can be
//! checked against a declared signature before anything reaches the wire.

use std::os::fd::RawFd;

use thiserror::Error;

use crate::signature::{self, SignatureError};

/// A single basic-typed argument value.
///
/// Container types (arrays, structs, variants) stay behind the transport
/// boundary; a body built here carries basic values only, which is what the
/// member signatures of registered objects describe in practice.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Type code `y`.
	Byte(u8),
	/// Type code `b`.
	Bool(bool),
	/// Type code `n`.
	Int16(i16),
	/// Type code `q`.
	UInt16(u16),
	/// Type code `i`.
	Int32(i32),
	/// Type code `u`.
	UInt32(u32),
	/// Type code `x`.
	Int64(i64),
	/// Type code `t`.
	UInt64(u64),
	/// Type code `d`.
	Double(f64),
	/// Type code `s`.
	Str(String),
	/// Type code `o`.
	ObjectPath(String),
	/// Type code `g`.
	Signature(String),
	/// Type code `h`.
	UnixFd(RawFd),
}

impl Value {
	/// Returns the bus type code for this value.
	pub const fn type_code(&self) -> char {
		match self {
			Self::Byte(_) => 'y',
			Self::Bool(_) => 'b',
			Self::Int16(_) => 'n',
			Self::UInt16(_) => 'q',
			Self::Int32(_) => 'i',
			Self::UInt32(_) => 'u',
			Self::Int64(_) => 'x',
			Self::UInt64(_) => 't',
			Self::Double(_) => 'd',
			Self::Str(_) => 's',
			Self::ObjectPath(_) => 'o',
			Self::Signature(_) => 'g',
			Self::UnixFd(_) => 'h',
		}
	}

	/// Returns the string contents for `s`, `o`, and `g` values.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) | Self::ObjectPath(s) | Self::Signature(s) => Some(s),
			_ => None,
		}
	}

	/// Returns the value as an `i32` if it is one.
	pub const fn as_i32(&self) -> Option<i32> {
		match self {
			Self::Int32(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the value as a `u32` if it is one.
	pub const fn as_u32(&self) -> Option<u32> {
		match self {
			Self::UInt32(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the value as a `bool` if it is one.
	pub const fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(v) => Some(*v),
			_ => None,
		}
	}
}

/// Ways reading or validating a message body can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BodyError {
	/// A reader requested more fields than the message carries.
	#[error("message has fewer fields than requested: wanted {wanted}, found {found}")]
	MissingFields {
		/// Number of fields the reader asked for so far.
		wanted: usize,
		/// Number of fields actually present.
		found: usize,
	},
	/// The body's value types do not match the declared signature.
	#[error("body signature {actual:?} does not match declared {declared:?}")]
	Mismatch {
		/// The declared signature the body was checked against.
		declared: String,
		/// The signature derived from the body's values.
		actual: String,
	},
	/// The declared signature itself is malformed.
	#[error(transparent)]
	Signature(#[from] SignatureError),
}

/// An ordered list of typed argument values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
	values: Vec<Value>,
}

impl Body {
	/// Creates an empty body.
	#[must_use]
	pub const fn new() -> Self {
		Self { values: Vec::new() }
	}

	/// Appends a value.
	pub fn push(&mut self, value: Value) {
		self.values.push(value);
	}

	/// Appends a value, builder style.
	#[must_use]
	pub fn with(mut self, value: Value) -> Self {
		self.values.push(value);
		self
	}

	/// Number of values in the body.
	#[must_use]
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns true if the body carries no values.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// The values in order.
	#[must_use]
	pub fn values(&self) -> &[Value] {
		&self.values
	}

	/// The signature derived from the values, one type code per value.
	#[must_use]
	pub fn signature(&self) -> String {
		self.values.iter().map(Value::type_code).collect()
	}

	/// Checks the body against a declared signature.
	///
	/// The declared signature is split into complete single types; the body
	/// conforms when it carries exactly one value per segment and every
	/// value's type code equals its segment. Container segments never match,
	/// since bodies hold basic values only.
	///
	/// # Errors
	///
	/// [`BodyError::Signature`] when the declared signature is malformed,
	/// [`BodyError::Mismatch`] when the shapes differ.
	pub fn conforms(&self, declared: &str) -> Result<(), BodyError> {
		let segments = signature::split(declared)?;
		let matches = segments.len() == self.values.len()
			&& segments
				.iter()
				.zip(&self.values)
				.all(|(seg, value)| seg.len() == 1 && seg.starts_with(value.type_code()));
		if matches {
			Ok(())
		} else {
			Err(BodyError::Mismatch {
				declared: declared.to_owned(),
				actual: self.signature(),
			})
		}
	}

	/// Starts reading the body from the front.
	#[must_use]
	pub fn cursor(&self) -> BodyCursor<'_> {
		BodyCursor { values: &self.values, pos: 0 }
	}
}

impl From<Vec<Value>> for Body {
	fn from(values: Vec<Value>) -> Self {
		Self { values }
	}
}

impl FromIterator<Value> for Body {
	fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
		Self { values: iter.into_iter().collect() }
	}
}

/// Ordered reader over a body's values.
///
/// Requesting a value past the end reports the shortfall instead of
/// panicking, so handlers can read exactly the fields their signature
/// declares and fail cleanly on short messages.
#[derive(Debug, Clone)]
pub struct BodyCursor<'a> {
	values: &'a [Value],
	pos: usize,
}

impl<'a> BodyCursor<'a> {
	/// Reads the next value.
	///
	/// # Errors
	///
	/// [`BodyError::MissingFields`] when the body is exhausted.
	pub fn next(&mut self) -> Result<&'a Value, BodyError> {
		match self.values.get(self.pos) {
			Some(value) => {
				self.pos += 1;
				Ok(value)
			}
			None => Err(BodyError::MissingFields {
				wanted: self.pos + 1,
				found: self.values.len(),
			}),
		}
	}

	/// Number of values not yet read.
	#[must_use]
	pub fn remaining(&self) -> usize {
		self.values.len() - self.pos
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn signature_derives_one_code_per_value() {
		let body = Body::new()
			.with(Value::Int32(1))
			.with(Value::Str("x".into()))
			.with(Value::Bool(true));
		assert_eq!(body.signature(), "isb");
	}

	#[test]
	fn conforms_accepts_matching_declaration() {
		let body = Body::new().with(Value::Int32(1)).with(Value::Int32(2));
		assert!(body.conforms("ii").is_ok());
		assert!(Body::new().conforms("").is_ok());
	}

	#[test]
	fn conforms_rejects_mismatched_shapes() {
		let body = Body::new().with(Value::Int32(1));
		assert_eq!(
			body.conforms("s").unwrap_err(),
			BodyError::Mismatch { declared: "s".into(), actual: "i".into() }
		);
		assert_eq!(
			body.conforms("ii").unwrap_err(),
			BodyError::Mismatch { declared: "ii".into(), actual: "i".into() }
		);
		// container segments never match a basic value
		assert_eq!(
			body.conforms("ai").unwrap_err(),
			BodyError::Mismatch { declared: "ai".into(), actual: "i".into() }
		);
	}

	#[test]
	fn conforms_propagates_malformed_declarations() {
		let body = Body::new();
		assert!(matches!(body.conforms("a").unwrap_err(), BodyError::Signature(_)));
	}

	#[test]
	fn cursor_reads_in_order_and_reports_shortfall() {
		let body = Body::new().with(Value::UInt32(7)).with(Value::Str("hi".into()));
		let mut cursor = body.cursor();
		assert_eq!(cursor.next().unwrap().as_u32(), Some(7));
		assert_eq!(cursor.next().unwrap().as_str(), Some("hi"));
		assert_eq!(
			cursor.next().unwrap_err(),
			BodyError::MissingFields { wanted: 3, found: 2 }
		);
		assert_eq!(cursor.remaining(), 0);
	}
}
