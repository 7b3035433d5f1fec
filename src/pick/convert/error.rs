use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::pick::{Primitive, Value};

/// Category of a conversion failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertErrorKind {
	/// Numeric value lies outside the target's representable range.
	#[error("value out of range")]
	Overflow,
	/// Non-whole float was truncated to an integer.
	#[error("value has a fractional part")]
	LostDecimals,
	/// Text could not be parsed as the target.
	#[error("invalid syntax: {0}")]
	InvalidSyntax(String),
	/// No conversion exists between the source and the target.
	#[error("incompatible type")]
	InvalidType,
	/// Foreign value does not alias a basic value.
	#[error("value has no basic representation")]
	CannotConvertToBasic,
	/// Canonicalization was requested on a value that is already basic.
	#[error("value is already a basic type")]
	AlreadyBasicType,
	/// A foreign hook panicked.
	#[error("recovered panic: {0}")]
	RecoveredPanic(String),
}

impl ConvertErrorKind {
	/// Whether a best-effort value accompanies this kind.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Self::Overflow | Self::LostDecimals)
	}
}

/// Best-effort result carried by recoverable conversion errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Partial {
	/// Truncated or wrapped primitive.
	Primitive(Primitive),
	/// Instant computed from the truncated source.
	Instant(DateTime<Utc>),
	/// Duration computed from the truncated or wrapped source.
	Duration(TimeDelta),
}

/// Conversion failure with the offending source value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert {value_type} {value} to {target}: {kind}")]
pub struct ConvertError {
	/// Failure category.
	pub kind: ConvertErrorKind,
	/// Source value as given.
	pub value: Value,
	/// Type tag of the source value.
	pub value_type: String,
	/// Description of the requested target.
	pub target: String,
	/// Best-effort value for recoverable kinds.
	pub partial: Option<Partial>,
}

impl ConvertError {
	/// Error of `kind` for converting `value` into `target`.
	pub fn new(kind: ConvertErrorKind, value: &Value, target: impl fmt::Display) -> Self {
		Self {
			kind,
			value: value.clone(),
			value_type: value.type_name().into_owned(),
			target: target.to_string(),
			partial: None,
		}
	}

	/// Attach a best-effort value.
	pub fn with_partial(mut self, partial: Option<Partial>) -> Self {
		self.partial = partial;
		self
	}

	/// Replace the target description, keeping everything else.
	pub fn retarget(mut self, target: impl fmt::Display) -> Self {
		self.target = target.to_string();
		self
	}

	/// Whether the caller may use [`partial`](Self::partial) and ignore the error.
	pub fn is_recoverable(&self) -> bool {
		self.kind.is_recoverable()
	}

	/// Whether the failure is [`ConvertErrorKind::Overflow`].
	pub fn is_overflow(&self) -> bool {
		self.kind == ConvertErrorKind::Overflow
	}

	/// Whether the failure is [`ConvertErrorKind::LostDecimals`].
	pub fn is_lost_decimals(&self) -> bool {
		self.kind == ConvertErrorKind::LostDecimals
	}

	/// Whether the failure is [`ConvertErrorKind::InvalidSyntax`].
	pub fn is_invalid_syntax(&self) -> bool {
		matches!(self.kind, ConvertErrorKind::InvalidSyntax(_))
	}

	/// Whether the failure is [`ConvertErrorKind::InvalidType`].
	pub fn is_invalid_type(&self) -> bool {
		self.kind == ConvertErrorKind::InvalidType
	}
}

/// Internal failure of a typed cast, before the source value is attached.
#[derive(Debug, Clone)]
pub(crate) struct Fault<T> {
	pub kind: ConvertErrorKind,
	pub partial: Option<T>,
}

/// Internal typed cast result.
pub(crate) type Cast<T> = std::result::Result<T, Fault<T>>;

impl<T> Fault<T> {
	pub(crate) fn fatal(kind: ConvertErrorKind) -> Self {
		Self { kind, partial: None }
	}

	pub(crate) fn lossy(kind: ConvertErrorKind, partial: T) -> Self {
		Self {
			kind,
			partial: Some(partial),
		}
	}

	pub(crate) fn map<U>(self, f: impl FnOnce(T) -> U) -> Fault<U> {
		Fault {
			kind: self.kind,
			partial: self.partial.map(f),
		}
	}

	/// Same kind with the best-effort value dropped.
	pub(crate) fn discard<U>(self) -> Fault<U> {
		Fault::fatal(self.kind)
	}

	pub(crate) fn into_error(self, value: &Value, target: impl fmt::Display, partial: impl FnOnce(T) -> Partial) -> ConvertError {
		let partial = if self.kind.is_recoverable() { self.partial.map(partial) } else { None };
		ConvertError::new(self.kind, value, target).with_partial(partial)
	}
}

impl<T> From<ConvertErrorKind> for Fault<T> {
	fn from(kind: ConvertErrorKind) -> Self {
		Self::fatal(kind)
	}
}

/// Map both arms of a cast.
pub(crate) fn lift<T, U>(cast: Cast<T>, wrap: impl Fn(T) -> U) -> Cast<U> {
	match cast {
		Ok(value) => Ok(wrap(value)),
		Err(fault) => Err(fault.map(wrap)),
	}
}
