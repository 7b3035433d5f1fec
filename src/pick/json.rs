use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pick::{PickError, Value};

/// How JSON numbers are carried into a [`Value`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonNumbers {
	/// `i64` when it fits, then `u64`, otherwise `f64`.
	#[default]
	Native,
	/// Every number as `f64`.
	Float,
	/// Every number as [`Value::Number`], in its shortest decimal spelling.
	Lexeme,
}

impl FromStr for JsonNumbers {
	type Err = PickError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"native" => Ok(Self::Native),
			"float" => Ok(Self::Float),
			"lexeme" => Ok(Self::Lexeme),
			_ => Err(PickError::InvalidOption {
				option: "number mode",
				value: s.to_owned(),
				expected: "native, float, lexeme",
			}),
		}
	}
}

impl Value {
	/// Build a value tree from decoded JSON.
	pub fn from_json(json: serde_json::Value, numbers: JsonNumbers) -> Self {
		match json {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(v) => Self::Bool(v),
			serde_json::Value::Number(number) => from_number(number, numbers),
			serde_json::Value::String(text) => Self::String(text),
			serde_json::Value::Array(items) => Self::Seq(items.into_iter().map(|item| Self::from_json(item, numbers)).collect()),
			serde_json::Value::Object(entries) => Self::Map(entries.into_iter().map(|(key, item)| (key, Self::from_json(item, numbers))).collect()),
		}
	}

	/// Parse JSON text into a value tree.
	pub fn parse_json(text: &str, numbers: JsonNumbers) -> serde_json::Result<Self> {
		let json: serde_json::Value = serde_json::from_str(text)?;
		Ok(Self::from_json(json, numbers))
	}

	/// Render as JSON.
	///
	/// Bytes become arrays of numbers, records and keyed maps become objects,
	/// and non-finite floats become `null`.
	pub fn to_json(&self) -> serde_json::Value {
		use serde_json::Value as Json;

		match self {
			Self::Null => Json::Null,
			Self::Bool(v) => Json::Bool(*v),
			Self::I8(v) => Json::from(*v),
			Self::I16(v) => Json::from(*v),
			Self::I32(v) => Json::from(*v),
			Self::I64(v) => Json::from(*v),
			Self::Isize(v) => Json::from(*v),
			Self::U8(v) => Json::from(*v),
			Self::U16(v) => Json::from(*v),
			Self::U32(v) => Json::from(*v),
			Self::U64(v) => Json::from(*v),
			Self::Usize(v) => Json::from(*v),
			Self::F32(v) => Json::from(*v),
			Self::F64(v) => Json::from(*v),
			Self::String(text) => Json::String(text.clone()),
			Self::Bytes(bytes) => Json::Array(bytes.iter().map(|byte| Json::from(*byte)).collect()),
			Self::RawJson(text) => serde_json::from_str(text).unwrap_or_else(|_| Json::String(text.clone())),
			Self::Number(text) => text.parse::<serde_json::Number>().map(Json::Number).unwrap_or_else(|_| Json::String(text.clone())),
			Self::Seq(items) => Json::Array(items.iter().map(Self::to_json).collect()),
			Self::Array(array) => Json::Array(array.iter().map(|item| item.to_json()).collect()),
			Self::Map(entries) => Json::Object(entries.iter().map(|(key, item)| (key.clone(), item.to_json())).collect()),
			Self::KeyedMap(map) => Json::Object(map.entries.iter().map(|(key, item)| (key.to_string(), item.to_json())).collect()),
			Self::Record(record) => Json::Object(record.fields.iter().map(|field| (field.name.clone(), field.value.to_json())).collect()),
			Self::Ref(inner) => inner.to_json(),
			Self::Foreign(foreign) => foreign.to_json(),
		}
	}
}

impl From<serde_json::Value> for Value {
	fn from(json: serde_json::Value) -> Self {
		Self::from_json(json, JsonNumbers::Native)
	}
}

fn from_number(number: serde_json::Number, numbers: JsonNumbers) -> Value {
	match numbers {
		JsonNumbers::Lexeme => Value::Number(number.to_string()),
		JsonNumbers::Float => number.as_f64().map_or_else(|| Value::Number(number.to_string()), Value::F64),
		JsonNumbers::Native => {
			if let Some(v) = number.as_i64() {
				Value::I64(v)
			} else if let Some(v) = number.as_u64() {
				Value::U64(v)
			} else {
				number.as_f64().map_or_else(|| Value::Number(number.to_string()), Value::F64)
			}
		}
	}
}
