use std::any::{Any, TypeId};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::pick::{Array, Foreign, PickError, Primitive, PrimitiveKind, Value};

mod duration;
pub(crate) mod error;
mod instant;
mod scalar;
mod sequence;
mod text;
mod typed;

#[cfg(test)]
mod tests;

pub use duration::{DurationOptions, DurationUnit, parse_duration};
pub use error::{ConvertError, ConvertErrorKind, Partial};
pub use instant::{BytesFormat, InstantOptions, InstantUnit, TimeFormat, encode_instant_binary};
pub use typed::{Convert, TypeDesc, TypeRegistry, TypeShape};

/// Options for every conversion that is configurable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
	/// Instant conversion options.
	pub instant: InstantOptions,
	/// Duration conversion options.
	pub duration: DurationOptions,
}

/// Value-level conversion target, as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
	/// One primitive.
	Primitive(PrimitiveKind),
	/// Typed array of one primitive.
	Sequence(PrimitiveKind),
	/// UTC instant.
	Instant,
	/// Signed nanosecond duration.
	Duration,
}

impl fmt::Display for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Primitive(kind) => write!(f, "{kind}"),
			Self::Sequence(kind) => write!(f, "[{kind}]"),
			Self::Instant => f.write_str("instant"),
			Self::Duration => f.write_str("duration"),
		}
	}
}

impl FromStr for Target {
	type Err = PickError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"instant" | "time" => Ok(Self::Instant),
			"duration" => Ok(Self::Duration),
			"bytes" => Ok(Self::Sequence(PrimitiveKind::U8)),
			_ => match s.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
				Some(element) => Ok(Self::Sequence(element.parse()?)),
				None => Ok(Self::Primitive(s.parse()?)),
			},
		}
	}
}

/// Conversion engine.
///
/// Stateless apart from its options and type registry; one converter can be
/// shared across threads.
#[derive(Debug, Clone)]
pub struct Converter {
	/// Instant and duration options used by [`convert_to`](Self::convert_to).
	pub options: ConvertOptions,
	registry: Arc<TypeRegistry>,
}

impl Default for Converter {
	fn default() -> Self {
		Self::new(ConvertOptions::default())
	}
}

impl Converter {
	/// Converter over the shared default registry.
	pub fn new(options: ConvertOptions) -> Self {
		Self {
			options,
			registry: TypeRegistry::global(),
		}
	}

	/// Replace the type registry used by [`convert_by_type`](Self::convert_by_type).
	pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
		self.registry = Arc::new(registry);
		self
	}

	/// Type registry in use.
	pub fn registry(&self) -> &TypeRegistry {
		&self.registry
	}

	/// Convert into one primitive.
	pub fn convert(&self, value: &Value, kind: PrimitiveKind) -> Result<Primitive, ConvertError> {
		scalar::to_primitive(value, kind).map_err(|fault| fault.into_error(value, kind, Partial::Primitive))
	}

	/// Convert into a typed array of `kind`.
	pub fn convert_sequence(&self, value: &Value, kind: PrimitiveKind) -> Result<Array, ConvertError> {
		sequence::to_array(value, kind)
	}

	/// Convert into a UTC instant.
	pub fn convert_instant(&self, value: &Value, options: &InstantOptions) -> Result<DateTime<Utc>, ConvertError> {
		instant::to_instant(value, options)
	}

	/// Convert into a signed nanosecond duration.
	pub fn convert_duration(&self, value: &Value, options: &DurationOptions) -> Result<TimeDelta, ConvertError> {
		duration::to_duration(value, options)
	}

	/// Convert into `T`.
	///
	/// A foreign value that already holds a `T` is returned as is.
	pub fn convert_to<T: Convert>(&self, value: &Value) -> Result<T, ConvertError> {
		if let Some(held) = held::<T>(value) {
			return Ok(held);
		}
		T::convert(value, self)
	}

	/// Convert into `T`, accepting the best-effort value of a recoverable error.
	pub fn convert_lossy<T: Convert>(&self, value: &Value) -> Result<T, ConvertError> {
		match self.convert_to::<T>(value) {
			Ok(converted) => Ok(converted),
			Err(err) if err.is_recoverable() => match err.partial.clone().and_then(T::from_partial) {
				Some(partial) => Ok(partial),
				None => Err(err),
			},
			Err(err) => Err(err),
		}
	}

	/// Convert into the type identified by `type_id`, boxed.
	///
	/// Primitives and `Vec`s of primitives are answered directly; every other
	/// type must be in the registry. Registered types go through
	/// [`Converter::convert_to`], so a foreign value already holding the type
	/// is returned as is.
	pub fn convert_by_type(&self, value: &Value, type_id: TypeId) -> Result<Box<dyn Any + Send>, ConvertError> {
		if let Some(kind) = PrimitiveKind::of_type_id(type_id) {
			return self.convert(value, kind).map(Primitive::into_any);
		}
		if let Some(kind) = PrimitiveKind::of_sequence_type_id(type_id) {
			return self.convert_sequence(value, kind).map(Array::into_any);
		}
		match self.registry.get(type_id) {
			Some(desc) => desc.convert(value, self),
			None => Err(ConvertError::new(ConvertErrorKind::InvalidType, value, format!("{type_id:?}"))),
		}
	}

	/// Convert into a [`Target`], producing a value again.
	///
	/// Instants and durations come back as [`Value::Foreign`].
	pub fn convert_value(&self, value: &Value, target: Target) -> Result<Value, ConvertError> {
		Ok(match target {
			Target::Primitive(kind) => self.convert(value, kind)?.into(),
			Target::Sequence(kind) => Value::Array(self.convert_sequence(value, kind)?),
			Target::Instant => Value::Foreign(Foreign::new(self.convert_instant(value, &self.options.instant)?)),
			Target::Duration => Value::Foreign(Foreign::new(self.convert_duration(value, &self.options.duration)?)),
		})
	}

	/// Basic value behind a foreign alias.
	pub fn to_basic(&self, value: &Value) -> Result<Value, ConvertError> {
		match value {
			Value::Ref(inner) => self.to_basic(inner),
			Value::Foreign(foreign) => match foreign.to_basic() {
				Ok(Some(basic)) => Ok(basic),
				Ok(None) => Err(ConvertError::new(ConvertErrorKind::CannotConvertToBasic, value, "basic value")),
				Err(kind) => Err(ConvertError::new(kind, value, "basic value")),
			},
			_ => Err(ConvertError::new(ConvertErrorKind::AlreadyBasicType, value, "basic value")),
		}
	}
}

fn held<T: Convert>(value: &Value) -> Option<T> {
	match value {
		Value::Foreign(foreign) => foreign.downcast_ref::<T>().cloned(),
		Value::Ref(inner) => held(inner),
		_ => None,
	}
}

/// Convert `value` into `T` with default options.
pub fn convert<T: Convert>(value: &Value) -> Result<T, ConvertError> {
	Converter::default().convert_to(value)
}
