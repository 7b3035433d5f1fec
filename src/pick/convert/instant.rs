use chrono::format::ParseErrorKind;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::pick::convert::error::{Cast, Fault};
use crate::pick::convert::scalar::{canonicalize, cast};
use crate::pick::{ConvertError, ConvertErrorKind, Partial, Value};

/// Target label used in instant conversion errors.
pub(crate) const INSTANT_LABEL: &str = "DateTime<Utc>";

/// Version tag of the binary instant layout.
const BINARY_VERSION: u8 = 1;
/// `[version][i64 secs][u32 nanos][i16 offset minutes]`.
const BINARY_LEN: usize = 1 + 8 + 4 + 2;

const MAX_FOREIGN_DEPTH: usize = 8;

/// Unit of numeric instant sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstantUnit {
	/// Seconds since the Unix epoch.
	#[default]
	Unix,
	/// Milliseconds since the Unix epoch.
	UnixMilli,
	/// Microseconds since the Unix epoch.
	UnixMicro,
}

/// Text layout for text-to-instant parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
	/// RFC 3339 with optional fractional seconds.
	#[default]
	Rfc3339,
	/// `strftime`-style pattern as understood by `chrono`.
	Custom(String),
}

/// Interpretation of byte sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BytesFormat {
	/// Bytes are text.
	#[default]
	String,
	/// Bytes hold the binary instant layout produced by [`encode_instant_binary`].
	Binary,
}

/// Options for converting values into instants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstantOptions {
	/// Unit of integer and float sources.
	pub number_format: InstantUnit,
	/// Layout of text sources.
	pub string_format: TimeFormat,
	/// UTC offset in seconds applied to text without a zone; UTC when unset.
	pub parse_in_location: Option<i32>,
	/// Read text sources as integers in [`number_format`](Self::number_format) units.
	pub parse_string_as_number: bool,
	/// Interpretation of byte sources.
	pub byte_slice_format: BytesFormat,
}

impl InstantOptions {
	/// Integers are Unix milliseconds.
	pub fn unix_millis() -> Self {
		Self {
			number_format: InstantUnit::UnixMilli,
			..Self::default()
		}
	}

	/// Integers are Unix microseconds.
	pub fn unix_micros() -> Self {
		Self {
			number_format: InstantUnit::UnixMicro,
			..Self::default()
		}
	}

	/// Text is parsed with a custom `chrono` pattern.
	pub fn for_format(format: impl Into<String>) -> Self {
		Self {
			string_format: TimeFormat::Custom(format.into()),
			..Self::default()
		}
	}
}

/// Convert `value` into a UTC instant.
pub(crate) fn to_instant(value: &Value, options: &InstantOptions) -> Result<DateTime<Utc>, ConvertError> {
	instant_at(value, options, 0).map_err(|fault| fault.into_error(value, INSTANT_LABEL, Partial::Instant))
}

fn instant_at(value: &Value, options: &InstantOptions, depth: usize) -> Cast<DateTime<Utc>> {
	match value {
		Value::Null => Ok(DateTime::<Utc>::UNIX_EPOCH),
		Value::Ref(inner) => instant_at(inner, options, depth),
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
		Value::String(text) | Value::RawJson(text) => from_text(value, text, options),
		Value::Bytes(bytes) => match options.byte_slice_format {
			BytesFormat::Binary => decode_instant_binary(bytes),
			BytesFormat::String => from_text(value, &String::from_utf8_lossy(bytes), options),
		},
		Value::Foreign(foreign) => {
			if let Some(instant) = foreign.downcast_ref::<DateTime<Utc>>() {
				return Ok(*instant);
			}
			if depth >= MAX_FOREIGN_DEPTH {
				return Err(ConvertErrorKind::InvalidType.into());
			}
			let basic = canonicalize(foreign)?;
			instant_at(&basic, options, depth + 1)
		}
		Value::Seq(_) | Value::Array(_) | Value::Map(_) | Value::KeyedMap(_) | Value::Record(_) => Err(ConvertErrorKind::InvalidType.into()),
	}
}

fn from_text(value: &Value, text: &str, options: &InstantOptions) -> Cast<DateTime<Utc>> {
	if options.parse_string_as_number {
		return from_number(value, options.number_format);
	}
	match &options.string_format {
		TimeFormat::Rfc3339 => DateTime::parse_from_rfc3339(text)
			.map(|parsed| parsed.with_timezone(&Utc))
			.map_err(|err| syntax(text, err)),
		TimeFormat::Custom(format) => parse_custom(text, format, options.parse_in_location),
	}
}

fn parse_custom(text: &str, format: &str, location: Option<i32>) -> Cast<DateTime<Utc>> {
	match DateTime::parse_from_str(text, format) {
		Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
		Err(err) if err.kind() == ParseErrorKind::NotEnough => {
			let offset = FixedOffset::east_opt(location.unwrap_or(0))
				.ok_or_else(|| Fault::fatal(ConvertErrorKind::InvalidSyntax(format!("utc offset {location:?} out of range"))))?;
			let naive = NaiveDateTime::parse_from_str(text, format)
				.or_else(|_| NaiveDate::parse_from_str(text, format).map(|date| date.and_time(NaiveTime::MIN)))
				.map_err(|err| syntax(text, err))?;
			offset
				.from_local_datetime(&naive)
				.single()
				.map(|local| local.with_timezone(&Utc))
				.ok_or_else(|| Fault::fatal(ConvertErrorKind::InvalidSyntax(format!("{text:?} is not a valid local time"))))
		}
		Err(err) => Err(syntax(text, err)),
	}
}

fn syntax(text: &str, err: chrono::ParseError) -> Fault<DateTime<Utc>> {
	Fault::fatal(ConvertErrorKind::InvalidSyntax(format!("parsing {text:?} as instant: {err}")))
}

fn from_number(value: &Value, unit: InstantUnit) -> Cast<DateTime<Utc>> {
	match cast::<i64>(value) {
		Ok(count) => from_unit(count, unit),
		Err(fault) => {
			let partial = fault.partial.and_then(|count| from_unit(count, unit).ok());
			Err(Fault { kind: fault.kind, partial })
		}
	}
}

fn from_unit(count: i64, unit: InstantUnit) -> Cast<DateTime<Utc>> {
	let instant = match unit {
		InstantUnit::Unix => DateTime::from_timestamp(count, 0),
		InstantUnit::UnixMilli => DateTime::from_timestamp_millis(count),
		InstantUnit::UnixMicro => DateTime::from_timestamp_micros(count),
	};
	instant.ok_or(Fault::fatal(ConvertErrorKind::Overflow))
}

/// Encode an instant in the versioned big-endian binary layout.
///
/// The zone offset is stored in whole minutes; decoding always yields UTC.
pub fn encode_instant_binary<Tz: TimeZone>(instant: &DateTime<Tz>) -> Vec<u8> {
	let offset_minutes = (instant.offset().fix().local_minus_utc() / 60) as i16;
	let mut out = Vec::with_capacity(BINARY_LEN);
	out.push(BINARY_VERSION);
	out.extend_from_slice(&instant.timestamp().to_be_bytes());
	out.extend_from_slice(&instant.timestamp_subsec_nanos().to_be_bytes());
	out.extend_from_slice(&offset_minutes.to_be_bytes());
	out
}

fn decode_instant_binary(bytes: &[u8]) -> Cast<DateTime<Utc>> {
	let invalid = || Fault::fatal(ConvertErrorKind::InvalidSyntax(format!("invalid binary instant of {} bytes", bytes.len())));

	if bytes.len() != BINARY_LEN || bytes[0] != BINARY_VERSION {
		return Err(invalid());
	}
	let secs = bytes.get(1..9).and_then(|raw| raw.try_into().ok()).map(i64::from_be_bytes).ok_or_else(invalid)?;
	let nanos = bytes.get(9..13).and_then(|raw| raw.try_into().ok()).map(u32::from_be_bytes).ok_or_else(invalid)?;
	DateTime::from_timestamp(secs, nanos).ok_or(Fault::fatal(ConvertErrorKind::Overflow))
}
