use thiserror::Error;

use crate::pick::{ConvertError, PathParseError, TraverseError};

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, PickError>;

/// Errors produced while reading a value tree and picking from it.
#[derive(Debug, Error)]
pub enum PickError {
	/// Path text did not parse.
	#[error(transparent)]
	Path(#[from] PathParseError),
	/// A path step could not be followed.
	#[error(transparent)]
	Traverse(#[from] TraverseError),
	/// The retrieved leaf did not convert.
	#[error(transparent)]
	Convert(#[from] ConvertError),
	/// Input was not valid JSON.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Conversion target name is not recognized.
	#[error("unknown conversion target {name:?}")]
	UnknownTarget {
		/// Name as given.
		name: String,
	},
	/// Option value is not one of the accepted names.
	#[error("invalid {option} {value:?}, expected one of: {expected}")]
	InvalidOption {
		/// Option being parsed.
		option: &'static str,
		/// Value as given.
		value: String,
		/// Accepted names, comma separated.
		expected: &'static str,
	},
}

impl PickError {
	/// Whether the failure is a missing field, the signal optional lookups key off.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::Traverse(err) if err.is_not_found())
	}
}
