use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::pick::convert::error::{Cast, Fault};
use crate::pick::convert::scalar::{canonicalize, cast};
use crate::pick::{ConvertError, ConvertErrorKind, Partial, Value};

/// Target label used in duration conversion errors.
pub(crate) const DURATION_LABEL: &str = "TimeDelta";

const MAX_FOREIGN_DEPTH: usize = 8;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Largest magnitude a duration text may spell: `|i64::MIN|`.
const MAX_MAGNITUDE: u64 = 1 << 63;

/// Unit of numeric duration sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
	/// Nanoseconds.
	#[default]
	Nanoseconds,
	/// Microseconds.
	Microseconds,
	/// Milliseconds.
	Milliseconds,
	/// Seconds.
	Seconds,
	/// Minutes.
	Minutes,
	/// Hours.
	Hours,
}

impl DurationUnit {
	/// Length of one unit in nanoseconds.
	pub fn nanos_per_unit(self) -> i64 {
		let nanos = match self {
			Self::Nanoseconds => NANOSECOND,
			Self::Microseconds => MICROSECOND,
			Self::Milliseconds => MILLISECOND,
			Self::Seconds => SECOND,
			Self::Minutes => MINUTE,
			Self::Hours => HOUR,
		};
		nanos as i64
	}
}

/// Options for converting values into durations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationOptions {
	/// Unit of integer and float sources.
	pub number_format: DurationUnit,
}

impl DurationOptions {
	/// Numbers are counted in `unit`.
	pub fn for_unit(unit: DurationUnit) -> Self {
		Self { number_format: unit }
	}
}

/// Convert `value` into a signed nanosecond duration.
pub(crate) fn to_duration(value: &Value, options: &DurationOptions) -> Result<TimeDelta, ConvertError> {
	duration_at(value, options, 0).map_err(|fault| fault.into_error(value, DURATION_LABEL, Partial::Duration))
}

fn duration_at(value: &Value, options: &DurationOptions, depth: usize) -> Cast<TimeDelta> {
	match value {
		Value::Null => Ok(TimeDelta::zero()),
		Value::Ref(inner) => duration_at(inner, options, depth),
		Value::Bool(_) => Err(ConvertErrorKind::InvalidType.into()),
		Value::I8(_)
		| Value::I16(_)
		| Value::I32(_)
		| Value::I64(_)
		| Value::Isize(_)
		| Value::U8(_)
		| Value::U16(_)
		| Value::U32(_)
		| Value::U64(_)
		| Value::Usize(_)
		| Value::F32(_)
		| Value::F64(_)
		| Value::Number(_) => from_number(value, options.number_format),
		Value::String(text) | Value::RawJson(text) => from_text(text),
		Value::Bytes(bytes) => from_text(&String::from_utf8_lossy(bytes)),
		Value::Foreign(foreign) => {
			if let Some(duration) = foreign.downcast_ref::<TimeDelta>() {
				return Ok(*duration);
			}
			if depth >= MAX_FOREIGN_DEPTH {
				return Err(ConvertErrorKind::InvalidType.into());
			}
			let basic = canonicalize(foreign)?;
			duration_at(&basic, options, depth + 1)
		}
		Value::Seq(_) | Value::Array(_) | Value::Map(_) | Value::KeyedMap(_) | Value::Record(_) => Err(ConvertErrorKind::InvalidType.into()),
	}
}

fn from_text(text: &str) -> Cast<TimeDelta> {
	parse_duration(text).map_err(|message| Fault::fatal(ConvertErrorKind::InvalidSyntax(message)))
}

fn from_number(value: &Value, unit: DurationUnit) -> Cast<TimeDelta> {
	match cast::<i64>(value) {
		Ok(count) => scale(count, unit),
		Err(fault) => {
			let partial = fault.partial.map(|count| scale(count, unit).unwrap_or_else(|scaled| scaled.partial.unwrap_or_default()));
			Err(Fault { kind: fault.kind, partial })
		}
	}
}

fn scale(count: i64, unit: DurationUnit) -> Cast<TimeDelta> {
	let per_unit = unit.nanos_per_unit();
	if count > i64::MAX / per_unit || count < i64::MIN / per_unit {
		return Err(Fault::lossy(ConvertErrorKind::Overflow, TimeDelta::nanoseconds(count.wrapping_mul(per_unit))));
	}
	Ok(TimeDelta::nanoseconds(count * per_unit))
}

/// Parse a unit-suffixed duration such as `"1h15m30.5s"` or `"-8µs"`.
///
/// Accepted units are `ns`, `us` (also `µs` and `μs`), `ms`, `s`, `m` and `h`.
/// Every number needs a unit except a lone `"0"`.
pub fn parse_duration(text: &str) -> Result<TimeDelta, String> {
	parse_nanos(text).map(TimeDelta::nanoseconds)
}

fn parse_nanos(text: &str) -> Result<i64, String> {
	let invalid = || format!("invalid duration {text:?}");

	let (negative, mut rest) = match text.as_bytes().first() {
		Some(b'-') => (true, &text[1..]),
		Some(b'+') => (false, &text[1..]),
		_ => (false, text),
	};
	if rest == "0" {
		return Ok(0);
	}
	if rest.is_empty() {
		return Err(invalid());
	}

	let mut total: u64 = 0;
	while !rest.is_empty() {
		let (whole, after_whole) = split_digits(rest);
		let mut value = leading_int(whole).ok_or_else(invalid)?;
		rest = after_whole;

		let mut fraction = (0u64, 1.0f64);
		let mut has_fraction = false;
		if let Some(after_dot) = rest.strip_prefix('.') {
			let (digits, after_fraction) = split_digits(after_dot);
			fraction = leading_fraction(digits);
			has_fraction = !digits.is_empty();
			rest = after_fraction;
		}
		if whole.is_empty() && !has_fraction {
			return Err(invalid());
		}

		let unit_len = rest.find(|c: char| c == '.' || c.is_ascii_digit()).unwrap_or(rest.len());
		if unit_len == 0 {
			return Err(format!("missing unit in duration {text:?}"));
		}
		let (unit, after_unit) = rest.split_at(unit_len);
		rest = after_unit;
		let per_unit = match unit {
			"ns" => NANOSECOND,
			"us" | "µs" | "μs" => MICROSECOND,
			"ms" => MILLISECOND,
			"s" => SECOND,
			"m" => MINUTE,
			"h" => HOUR,
			_ => return Err(format!("unknown unit {unit:?} in duration {text:?}")),
		};

		if value > MAX_MAGNITUDE / per_unit {
			return Err(invalid());
		}
		value *= per_unit;
		let (digits, divisor) = fraction;
		if digits > 0 {
			value += (digits as f64 * (per_unit as f64 / divisor)) as u64;
			if value > MAX_MAGNITUDE {
				return Err(invalid());
			}
		}
		total = total.checked_add(value).filter(|sum| *sum <= MAX_MAGNITUDE).ok_or_else(invalid)?;
	}

	if negative {
		return Ok((total as i64).wrapping_neg());
	}
	i64::try_from(total).map_err(|_| invalid())
}

fn split_digits(text: &str) -> (&str, &str) {
	let end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
	text.split_at(end)
}

fn leading_int(digits: &str) -> Option<u64> {
	digits.bytes().try_fold(0u64, |acc, digit| {
		let next = acc.checked_mul(10)?.checked_add(u64::from(digit - b'0'))?;
		(next <= MAX_MAGNITUDE).then_some(next)
	})
}

/// Fraction digits as `(numerator, 10^kept_digits)`; digits past u64 precision are dropped.
fn leading_fraction(digits: &str) -> (u64, f64) {
	let mut numerator = 0u64;
	let mut divisor = 1.0;
	for digit in digits.bytes() {
		let Some(next) = numerator.checked_mul(10).and_then(|n| n.checked_add(u64::from(digit - b'0'))) else {
			break;
		};
		numerator = next;
		divisor *= 10.0;
	}
	(numerator, divisor)
}
