//! Type-signature validation and segmentation.
//!
//! A signature string describes zero or more complete types concatenated
//! without separators (`"ii"`, `"sa{sv}"`). The registry validates member
//! signatures before rendering introspection data, and body validation
//! compares value type codes against declared signatures segment by segment.

use thiserror::Error;

/// Longest signature the bus accepts, in bytes.
pub const MAX_SIGNATURE_LEN: usize = 255;

/// Deepest array or struct nesting the bus accepts.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Ways a type signature can fail validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SignatureError {
	/// The signature exceeds [`MAX_SIGNATURE_LEN`] bytes.
	#[error("signature is {0} bytes, longer than the {MAX_SIGNATURE_LEN} byte limit")]
	TooLong(usize),
	/// A byte in the signature is not a known type code.
	#[error("unknown type code {code:?} at offset {offset} in {signature:?}")]
	UnknownType {
		/// The full signature under validation.
		signature: String,
		/// Byte offset of the offending code.
		offset: usize,
		/// The offending code itself.
		code: char,
	},
	/// An array code is not followed by an element type.
	#[error("array in {0:?} has no element type")]
	MissingElementType(String),
	/// A struct opened with `(` never closes.
	#[error("unterminated struct in {0:?}")]
	UnterminatedStruct(String),
	/// A struct contains no field types.
	#[error("empty struct in {0:?}")]
	EmptyStruct(String),
	/// A dict entry opened with `{` never closes.
	#[error("unterminated dict entry in {0:?}")]
	UnterminatedDict(String),
	/// A dict entry appears somewhere other than directly inside an array.
	#[error("dict entry outside an array in {0:?}")]
	DictOutsideArray(String),
	/// A dict entry key is not a basic type.
	#[error("dict entry key in {0:?} must be a basic type")]
	NonBasicDictKey(String),
	/// A dict entry does not contain exactly one key and one value type.
	#[error("dict entry in {0:?} must contain exactly two types")]
	DictFieldCount(String),
	/// Arrays or structs nest deeper than [`MAX_NESTING_DEPTH`].
	#[error("nesting in {0:?} exceeds depth {MAX_NESTING_DEPTH}")]
	TooDeep(String),
}

/// Splits a signature into its complete single types.
///
/// An empty signature is valid and yields no segments. Each returned segment
/// borrows from `signature` and is itself a complete single type, suitable
/// for one `<arg type=..>` element of an introspection document.
///
/// # Errors
///
/// Returns a [`SignatureError`] describing the first malformed construct.
pub fn split(signature: &str) -> Result<Vec<&str>, SignatureError> {
	if signature.len() > MAX_SIGNATURE_LEN {
		return Err(SignatureError::TooLong(signature.len()));
	}

	let bytes = signature.as_bytes();
	let mut segments = Vec::new();
	let mut pos = 0;
	while pos < bytes.len() {
		let end = parse_single(signature, bytes, pos, 0, 0)?;
		segments.push(&signature[pos..end]);
		pos = end;
	}
	Ok(segments)
}

/// Validates a signature without keeping the segments.
///
/// # Errors
///
/// Same as [`split`].
pub fn validate(signature: &str) -> Result<(), SignatureError> {
	split(signature).map(|_| ())
}

fn is_basic(code: u8) -> bool {
	matches!(
		code,
		b'y' | b'b' | b'n' | b'q' | b'i' | b'u' | b'x' | b't' | b'd' | b'h' | b's' | b'o' | b'g'
	)
}

/// Parses one complete single type starting at `pos`, returning the offset
/// one past its end.
fn parse_single(
	signature: &str,
	bytes: &[u8],
	pos: usize,
	array_depth: usize,
	struct_depth: usize,
) -> Result<usize, SignatureError> {
	match bytes[pos] {
		code if is_basic(code) => Ok(pos + 1),
		b'v' => Ok(pos + 1),
		b'a' => {
			if array_depth + 1 > MAX_NESTING_DEPTH {
				return Err(SignatureError::TooDeep(signature.to_owned()));
			}
			if pos + 1 >= bytes.len() {
				return Err(SignatureError::MissingElementType(signature.to_owned()));
			}
			if bytes[pos + 1] == b'{' {
				parse_dict(signature, bytes, pos + 1, array_depth + 1, struct_depth)
			} else {
				parse_single(signature, bytes, pos + 1, array_depth + 1, struct_depth)
			}
		}
		b'(' => {
			if struct_depth + 1 > MAX_NESTING_DEPTH {
				return Err(SignatureError::TooDeep(signature.to_owned()));
			}
			let mut p = pos + 1;
			if p < bytes.len() && bytes[p] == b')' {
				return Err(SignatureError::EmptyStruct(signature.to_owned()));
			}
			while p < bytes.len() && bytes[p] != b')' {
				p = parse_single(signature, bytes, p, array_depth, struct_depth + 1)?;
			}
			if p >= bytes.len() {
				return Err(SignatureError::UnterminatedStruct(signature.to_owned()));
			}
			Ok(p + 1)
		}
		b'{' => Err(SignatureError::DictOutsideArray(signature.to_owned())),
		code => Err(SignatureError::UnknownType {
			signature: signature.to_owned(),
			offset: pos,
			code: code as char,
		}),
	}
}

/// Parses a dict entry starting at the `{` at `pos`. Dict entries only occur
/// as array element types; the caller has already consumed the `a`.
fn parse_dict(
	signature: &str,
	bytes: &[u8],
	pos: usize,
	array_depth: usize,
	struct_depth: usize,
) -> Result<usize, SignatureError> {
	if struct_depth + 1 > MAX_NESTING_DEPTH {
		return Err(SignatureError::TooDeep(signature.to_owned()));
	}
	let mut p = pos + 1;
	if p >= bytes.len() {
		return Err(SignatureError::UnterminatedDict(signature.to_owned()));
	}
	if bytes[p] == b'}' {
		return Err(SignatureError::DictFieldCount(signature.to_owned()));
	}
	if !is_basic(bytes[p]) {
		return Err(SignatureError::NonBasicDictKey(signature.to_owned()));
	}
	p += 1;
	if p >= bytes.len() {
		return Err(SignatureError::UnterminatedDict(signature.to_owned()));
	}
	if bytes[p] == b'}' {
		return Err(SignatureError::DictFieldCount(signature.to_owned()));
	}
	p = parse_single(signature, bytes, p, array_depth, struct_depth + 1)?;
	if p >= bytes.len() {
		return Err(SignatureError::UnterminatedDict(signature.to_owned()));
	}
	if bytes[p] != b'}' {
		return Err(SignatureError::DictFieldCount(signature.to_owned()));
	}
	Ok(p + 1)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_signature_is_valid() {
		assert_eq!(split("").unwrap(), Vec::<&str>::new());
	}

	#[test]
	fn basic_types_split_one_per_code() {
		assert_eq!(split("ii").unwrap(), vec!["i", "i"]);
		assert_eq!(split("ybnqiuxtdhsogv").unwrap().len(), 14);
	}

	#[test]
	fn containers_split_as_single_segments() {
		assert_eq!(split("a{sv}").unwrap(), vec!["a{sv}"]);
		assert_eq!(split("aai").unwrap(), vec!["aai"]);
		assert_eq!(split("(ii)").unwrap(), vec!["(ii)"]);
		assert_eq!(split("sa{sv}i").unwrap(), vec!["s", "a{sv}", "i"]);
		assert_eq!(split("(i(ss))ai").unwrap(), vec!["(i(ss))", "ai"]);
	}

	#[test]
	fn unknown_code_is_rejected_with_position() {
		let err = split("izi").unwrap_err();
		assert_eq!(
			err,
			SignatureError::UnknownType {
				signature: "izi".to_owned(),
				offset: 1,
				code: 'z',
			}
		);
	}

	#[test]
	fn bare_array_is_rejected() {
		assert_eq!(
			split("ia").unwrap_err(),
			SignatureError::MissingElementType("ia".to_owned())
		);
	}

	#[test]
	fn malformed_structs_are_rejected() {
		assert_eq!(
			split("(i").unwrap_err(),
			SignatureError::UnterminatedStruct("(i".to_owned())
		);
		assert_eq!(split("()").unwrap_err(), SignatureError::EmptyStruct("()".to_owned()));
	}

	#[test]
	fn malformed_dict_entries_are_rejected() {
		assert_eq!(
			split("{si}").unwrap_err(),
			SignatureError::DictOutsideArray("{si}".to_owned())
		);
		assert_eq!(
			split("a{vs}").unwrap_err(),
			SignatureError::NonBasicDictKey("a{vs}".to_owned())
		);
		assert_eq!(
			split("a{s}").unwrap_err(),
			SignatureError::DictFieldCount("a{s}".to_owned())
		);
		assert_eq!(
			split("a{sii}").unwrap_err(),
			SignatureError::DictFieldCount("a{sii}".to_owned())
		);
		assert_eq!(
			split("a{si").unwrap_err(),
			SignatureError::UnterminatedDict("a{si".to_owned())
		);
	}

	#[test]
	fn depth_and_length_limits_hold() {
		let deep = format!("{}i", "a".repeat(MAX_NESTING_DEPTH));
		assert!(validate(&deep).is_ok());

		let too_deep = format!("{}i", "a".repeat(MAX_NESTING_DEPTH + 1));
		assert_eq!(
			validate(&too_deep).unwrap_err(),
			SignatureError::TooDeep(too_deep.clone())
		);

		let too_long = "i".repeat(MAX_SIGNATURE_LEN + 1);
		assert_eq!(
			validate(&too_long).unwrap_err(),
			SignatureError::TooLong(MAX_SIGNATURE_LEN + 1)
		);
	}
}
