use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

use crate::pick::{ConvertErrorKind, Value};

/// Capabilities a caller-defined type exposes to the conversion engine.
///
/// A foreign value is typically a newtype over a basic value (an enum code stored
/// as `u8`, a unit-tagged number, ...). [`to_basic`](Self::to_basic) reduces it
/// to the core alphabet so every scalar conversion applies to it.
pub trait ForeignValue: fmt::Debug + Send + Sync + 'static {
	/// Type name reported in conversion errors.
	fn type_name(&self) -> &str;

	/// Underlying basic value, or `None` when the type does not alias one.
	fn to_basic(&self) -> Option<Value>;

	/// JSON rendering; defaults to the basic value's rendering.
	fn to_json(&self) -> Option<serde_json::Value> {
		None
	}

	/// Equality against another foreign payload of any type.
	fn eq_foreign(&self, other: &dyn Any) -> bool {
		let _ = other;
		false
	}
}

/// Shared handle to a [`ForeignValue`].
#[derive(Clone)]
pub struct Foreign {
	value: Arc<dyn ForeignValue>,
	any: Arc<dyn Any + Send + Sync>,
}

impl Foreign {
	/// Wrap a foreign payload.
	pub fn new<T: ForeignValue>(value: T) -> Self {
		let shared = Arc::new(value);
		Self {
			value: shared.clone(),
			any: shared,
		}
	}

	/// Type name of the payload.
	pub fn type_name(&self) -> &str {
		self.value.type_name()
	}

	/// Borrow the payload as `T` when it has that concrete type.
	pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
		self.any.downcast_ref::<T>()
	}

	/// Underlying basic value, with payload panics reported as errors.
	pub fn to_basic(&self) -> Result<Option<Value>, ConvertErrorKind> {
		guard(|| self.value.to_basic())
	}

	/// JSON rendering of the payload.
	pub fn to_json(&self) -> serde_json::Value {
		if let Ok(Some(json)) = guard(|| self.value.to_json()) {
			return json;
		}
		match self.to_basic() {
			Ok(Some(basic)) => basic.to_json(),
			_ => serde_json::Value::Null,
		}
	}
}

impl fmt::Debug for Foreign {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Foreign").field(&self.value).finish()
	}
}

impl PartialEq for Foreign {
	fn eq(&self, other: &Self) -> bool {
		if Arc::ptr_eq(&self.any, &other.any) || self.value.eq_foreign(other.any.as_ref()) {
			return true;
		}
		if self.type_name() != other.type_name() {
			return false;
		}
		matches!((self.to_basic(), other.to_basic()), (Ok(Some(lhs)), Ok(Some(rhs))) if lhs == rhs)
	}
}

/// Run a caller-supplied hook, turning a panic into [`ConvertErrorKind::RecoveredPanic`].
pub(crate) fn guard<T>(hook: impl FnOnce() -> T) -> Result<T, ConvertErrorKind> {
	catch_unwind(AssertUnwindSafe(hook)).map_err(|payload| {
		let message = payload
			.downcast_ref::<&str>()
			.map(|text| (*text).to_owned())
			.or_else(|| payload.downcast_ref::<String>().cloned())
			.unwrap_or_else(|| "unknown panic payload".to_owned());
		log::debug!("foreign hook panicked: {message}");
		ConvertErrorKind::RecoveredPanic(message)
	})
}

impl ForeignValue for DateTime<Utc> {
	fn type_name(&self) -> &str {
		"DateTime<Utc>"
	}

	fn to_basic(&self) -> Option<Value> {
		None
	}

	fn to_json(&self) -> Option<serde_json::Value> {
		Some(serde_json::Value::String(self.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
	}

	fn eq_foreign(&self, other: &dyn Any) -> bool {
		other.downcast_ref::<Self>().is_some_and(|other| other == self)
	}
}

impl ForeignValue for TimeDelta {
	fn type_name(&self) -> &str {
		"TimeDelta"
	}

	/// Durations reduce to their nanosecond count.
	fn to_basic(&self) -> Option<Value> {
		self.num_nanoseconds().map(Value::I64)
	}
}
