use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::pick::{Foreign, Primitive, PrimitiveKind};

/// Dynamically typed value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Absent value.
	Null,
	/// Boolean.
	Bool(bool),
	/// 8-bit signed integer.
	I8(i8),
	/// 16-bit signed integer.
	I16(i16),
	/// 32-bit signed integer.
	I32(i32),
	/// 64-bit signed integer.
	I64(i64),
	/// Platform-width signed integer.
	Isize(isize),
	/// 8-bit unsigned integer.
	U8(u8),
	/// 16-bit unsigned integer.
	U16(u16),
	/// 32-bit unsigned integer.
	U32(u32),
	/// 64-bit unsigned integer.
	U64(u64),
	/// Platform-width unsigned integer.
	Usize(usize),
	/// 32-bit float.
	F32(f32),
	/// 64-bit float.
	F64(f64),
	/// UTF-8 text.
	String(String),
	/// Raw bytes.
	Bytes(Vec<u8>),
	/// Undecoded JSON text, kept byte-for-byte.
	RawJson(String),
	/// JSON number lexeme, kept as written.
	Number(String),
	/// Heterogeneous sequence.
	Seq(Vec<Value>),
	/// Homogeneous sequence of one primitive kind.
	Array(Array),
	/// String-keyed associative container.
	Map(HashMap<String, Value>),
	/// Associative container with non-string keys.
	KeyedMap(KeyedMap),
	/// Named record with ordered fields.
	Record(Record),
	/// Indirection to another value.
	Ref(Box<Value>),
	/// Value of a caller-defined type outside the core alphabet.
	Foreign(Foreign),
}

impl Value {
	/// Type tag reported in conversion errors.
	pub fn type_name(&self) -> Cow<'static, str> {
		match self {
			Self::Null => Cow::Borrowed("null"),
			Self::Bool(_) => Cow::Borrowed("bool"),
			Self::I8(_) => Cow::Borrowed("i8"),
			Self::I16(_) => Cow::Borrowed("i16"),
			Self::I32(_) => Cow::Borrowed("i32"),
			Self::I64(_) => Cow::Borrowed("i64"),
			Self::Isize(_) => Cow::Borrowed("isize"),
			Self::U8(_) => Cow::Borrowed("u8"),
			Self::U16(_) => Cow::Borrowed("u16"),
			Self::U32(_) => Cow::Borrowed("u32"),
			Self::U64(_) => Cow::Borrowed("u64"),
			Self::Usize(_) => Cow::Borrowed("usize"),
			Self::F32(_) => Cow::Borrowed("f32"),
			Self::F64(_) => Cow::Borrowed("f64"),
			Self::String(_) => Cow::Borrowed("String"),
			Self::Bytes(_) => Cow::Borrowed("bytes"),
			Self::RawJson(_) => Cow::Borrowed("raw_json"),
			Self::Number(_) => Cow::Borrowed("json_number"),
			Self::Seq(_) => Cow::Borrowed("[any]"),
			Self::Array(items) => Cow::Owned(format!("[{}]", items.kind())),
			Self::Map(_) => Cow::Borrowed("map<String, any>"),
			Self::KeyedMap(map) => Cow::Owned(format!("map<{}, any>", map.key_kind)),
			Self::Record(record) => Cow::Owned(record.type_name.clone()),
			Self::Ref(inner) => Cow::Owned(format!("&{}", inner.type_name())),
			Self::Foreign(foreign) => Cow::Owned(foreign.type_name().to_owned()),
		}
	}

	/// Whether this is [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Build a string-keyed map from `(key, value)` pairs.
	pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
		Self::Map(entries.into_iter().map(|(key, value)| (key.into(), value)).collect())
	}

	/// Build a heterogeneous sequence.
	pub fn seq(items: impl IntoIterator<Item = Value>) -> Self {
		Self::Seq(items.into_iter().collect())
	}

	/// Wrap in one level of indirection.
	pub fn boxed(self) -> Self {
		Self::Ref(Box::new(self))
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("null"),
			Self::Bool(v) => write!(f, "{v}"),
			Self::I8(v) => write!(f, "{v}"),
			Self::I16(v) => write!(f, "{v}"),
			Self::I32(v) => write!(f, "{v}"),
			Self::I64(v) => write!(f, "{v}"),
			Self::Isize(v) => write!(f, "{v}"),
			Self::U8(v) => write!(f, "{v}"),
			Self::U16(v) => write!(f, "{v}"),
			Self::U32(v) => write!(f, "{v}"),
			Self::U64(v) => write!(f, "{v}"),
			Self::Usize(v) => write!(f, "{v}"),
			Self::F32(v) => write!(f, "{v}"),
			Self::F64(v) => write!(f, "{v}"),
			Self::String(v) | Self::RawJson(v) => write!(f, "{v:?}"),
			Self::Number(v) => f.write_str(v),
			Self::Bytes(v) => write!(f, "bytes[{}]", v.len()),
			Self::Seq(items) => write!(f, "[... {} items]", items.len()),
			Self::Array(items) => write!(f, "[... {} {} items]", items.len(), items.kind()),
			Self::Map(map) => write!(f, "{{ ... {} entries }}", map.len()),
			Self::KeyedMap(map) => write!(f, "{{ ... {} entries }}", map.entries.len()),
			Self::Record(record) => write!(f, "{} {{ ... }}", record.type_name),
			Self::Ref(inner) => write!(f, "&{inner}"),
			Self::Foreign(foreign) => write!(f, "{}(..)", foreign.type_name()),
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Self::Seq(value)
	}
}

impl From<Array> for Value {
	fn from(value: Array) -> Self {
		Self::Array(value)
	}
}

impl From<Record> for Value {
	fn from(value: Record) -> Self {
		Self::Record(value)
	}
}

impl From<KeyedMap> for Value {
	fn from(value: KeyedMap) -> Self {
		Self::KeyedMap(value)
	}
}

impl From<Foreign> for Value {
	fn from(value: Foreign) -> Self {
		Self::Foreign(value)
	}
}

/// Homogeneous sequence of one primitive kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
	/// `Vec<bool>`.
	Bool(Vec<bool>),
	/// `Vec<i8>`.
	I8(Vec<i8>),
	/// `Vec<i16>`.
	I16(Vec<i16>),
	/// `Vec<i32>`.
	I32(Vec<i32>),
	/// `Vec<i64>`.
	I64(Vec<i64>),
	/// `Vec<isize>`.
	Isize(Vec<isize>),
	/// `Vec<u8>`.
	U8(Vec<u8>),
	/// `Vec<u16>`.
	U16(Vec<u16>),
	/// `Vec<u32>`.
	U32(Vec<u32>),
	/// `Vec<u64>`.
	U64(Vec<u64>),
	/// `Vec<usize>`.
	Usize(Vec<usize>),
	/// `Vec<f32>`.
	F32(Vec<f32>),
	/// `Vec<f64>`.
	F64(Vec<f64>),
	/// `Vec<String>`.
	String(Vec<String>),
}

macro_rules! each_array {
	($array:expr, $items:ident => $body:expr) => {
		match $array {
			Array::Bool($items) => $body,
			Array::I8($items) => $body,
			Array::I16($items) => $body,
			Array::I32($items) => $body,
			Array::I64($items) => $body,
			Array::Isize($items) => $body,
			Array::U8($items) => $body,
			Array::U16($items) => $body,
			Array::U32($items) => $body,
			Array::U64($items) => $body,
			Array::Usize($items) => $body,
			Array::F32($items) => $body,
			Array::F64($items) => $body,
			Array::String($items) => $body,
		}
	};
}

impl Array {
	/// Empty array of `kind` with room for `capacity` elements.
	pub fn with_capacity(kind: PrimitiveKind, capacity: usize) -> Self {
		match kind {
			PrimitiveKind::Bool => Self::Bool(Vec::with_capacity(capacity)),
			PrimitiveKind::I8 => Self::I8(Vec::with_capacity(capacity)),
			PrimitiveKind::I16 => Self::I16(Vec::with_capacity(capacity)),
			PrimitiveKind::I32 => Self::I32(Vec::with_capacity(capacity)),
			PrimitiveKind::I64 => Self::I64(Vec::with_capacity(capacity)),
			PrimitiveKind::Isize => Self::Isize(Vec::with_capacity(capacity)),
			PrimitiveKind::U8 => Self::U8(Vec::with_capacity(capacity)),
			PrimitiveKind::U16 => Self::U16(Vec::with_capacity(capacity)),
			PrimitiveKind::U32 => Self::U32(Vec::with_capacity(capacity)),
			PrimitiveKind::U64 => Self::U64(Vec::with_capacity(capacity)),
			PrimitiveKind::Usize => Self::Usize(Vec::with_capacity(capacity)),
			PrimitiveKind::F32 => Self::F32(Vec::with_capacity(capacity)),
			PrimitiveKind::F64 => Self::F64(Vec::with_capacity(capacity)),
			PrimitiveKind::String => Self::String(Vec::with_capacity(capacity)),
		}
	}

	/// Append one element; false when its kind differs from the array's.
	pub fn push(&mut self, value: Primitive) -> bool {
		match (self, value) {
			(Self::Bool(items), Primitive::Bool(v)) => items.push(v),
			(Self::I8(items), Primitive::I8(v)) => items.push(v),
			(Self::I16(items), Primitive::I16(v)) => items.push(v),
			(Self::I32(items), Primitive::I32(v)) => items.push(v),
			(Self::I64(items), Primitive::I64(v)) => items.push(v),
			(Self::Isize(items), Primitive::Isize(v)) => items.push(v),
			(Self::U8(items), Primitive::U8(v)) => items.push(v),
			(Self::U16(items), Primitive::U16(v)) => items.push(v),
			(Self::U32(items), Primitive::U32(v)) => items.push(v),
			(Self::U64(items), Primitive::U64(v)) => items.push(v),
			(Self::Usize(items), Primitive::Usize(v)) => items.push(v),
			(Self::F32(items), Primitive::F32(v)) => items.push(v),
			(Self::F64(items), Primitive::F64(v)) => items.push(v),
			(Self::String(items), Primitive::String(v)) => items.push(v),
			_ => return false,
		}
		true
	}

	/// Element kind.
	pub fn kind(&self) -> PrimitiveKind {
		match self {
			Self::Bool(_) => PrimitiveKind::Bool,
			Self::I8(_) => PrimitiveKind::I8,
			Self::I16(_) => PrimitiveKind::I16,
			Self::I32(_) => PrimitiveKind::I32,
			Self::I64(_) => PrimitiveKind::I64,
			Self::Isize(_) => PrimitiveKind::Isize,
			Self::U8(_) => PrimitiveKind::U8,
			Self::U16(_) => PrimitiveKind::U16,
			Self::U32(_) => PrimitiveKind::U32,
			Self::U64(_) => PrimitiveKind::U64,
			Self::Usize(_) => PrimitiveKind::Usize,
			Self::F32(_) => PrimitiveKind::F32,
			Self::F64(_) => PrimitiveKind::F64,
			Self::String(_) => PrimitiveKind::String,
		}
	}

	/// Number of elements.
	pub fn len(&self) -> usize {
		each_array!(self, items => items.len())
	}

	/// Whether the array has no elements.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Element at `index` as a standalone value.
	pub fn get(&self, index: usize) -> Option<Value> {
		each_array!(self, items => items.get(index).cloned().map(Value::from))
	}

	/// Iterate elements as standalone values.
	pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
		(0..self.len()).filter_map(move |index| self.get(index))
	}

	/// Replace the element at `index`; false when out of range or the kind differs.
	pub fn set(&mut self, index: usize, value: Primitive) -> bool {
		match (self, value) {
			(Self::Bool(items), Primitive::Bool(v)) => replace(items, index, v),
			(Self::I8(items), Primitive::I8(v)) => replace(items, index, v),
			(Self::I16(items), Primitive::I16(v)) => replace(items, index, v),
			(Self::I32(items), Primitive::I32(v)) => replace(items, index, v),
			(Self::I64(items), Primitive::I64(v)) => replace(items, index, v),
			(Self::Isize(items), Primitive::Isize(v)) => replace(items, index, v),
			(Self::U8(items), Primitive::U8(v)) => replace(items, index, v),
			(Self::U16(items), Primitive::U16(v)) => replace(items, index, v),
			(Self::U32(items), Primitive::U32(v)) => replace(items, index, v),
			(Self::U64(items), Primitive::U64(v)) => replace(items, index, v),
			(Self::Usize(items), Primitive::Usize(v)) => replace(items, index, v),
			(Self::F32(items), Primitive::F32(v)) => replace(items, index, v),
			(Self::F64(items), Primitive::F64(v)) => replace(items, index, v),
			(Self::String(items), Primitive::String(v)) => replace(items, index, v),
			_ => false,
		}
	}

	/// Box the inner `Vec<T>` for type-erased callers.
	pub fn into_any(self) -> Box<dyn std::any::Any + Send> {
		each_array!(self, items => Box::new(items) as Box<dyn std::any::Any + Send>)
	}
}

fn replace<T>(items: &mut [T], index: usize, value: T) -> bool {
	match items.get_mut(index) {
		Some(slot) => {
			*slot = value;
			true
		}
		None => false,
	}
}

/// Hashable key of a [`KeyedMap`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
	/// Boolean key.
	Bool(bool),
	/// 8-bit signed key.
	I8(i8),
	/// 16-bit signed key.
	I16(i16),
	/// 32-bit signed key.
	I32(i32),
	/// 64-bit signed key.
	I64(i64),
	/// Platform-width signed key.
	Isize(isize),
	/// 8-bit unsigned key.
	U8(u8),
	/// 16-bit unsigned key.
	U16(u16),
	/// 32-bit unsigned key.
	U32(u32),
	/// 64-bit unsigned key.
	U64(u64),
	/// Platform-width unsigned key.
	Usize(usize),
	/// Text key.
	String(String),
}

impl MapKey {
	/// Key for a converted primitive; floats are not hashable keys.
	pub fn from_primitive(primitive: Primitive) -> Option<Self> {
		Some(match primitive {
			Primitive::Bool(v) => Self::Bool(v),
			Primitive::I8(v) => Self::I8(v),
			Primitive::I16(v) => Self::I16(v),
			Primitive::I32(v) => Self::I32(v),
			Primitive::I64(v) => Self::I64(v),
			Primitive::Isize(v) => Self::Isize(v),
			Primitive::U8(v) => Self::U8(v),
			Primitive::U16(v) => Self::U16(v),
			Primitive::U32(v) => Self::U32(v),
			Primitive::U64(v) => Self::U64(v),
			Primitive::Usize(v) => Self::Usize(v),
			Primitive::String(v) => Self::String(v),
			Primitive::F32(_) | Primitive::F64(_) => return None,
		})
	}

	/// Key as a standalone value.
	pub fn to_value(&self) -> Value {
		match self {
			Self::Bool(v) => Value::Bool(*v),
			Self::I8(v) => Value::I8(*v),
			Self::I16(v) => Value::I16(*v),
			Self::I32(v) => Value::I32(*v),
			Self::I64(v) => Value::I64(*v),
			Self::Isize(v) => Value::Isize(*v),
			Self::U8(v) => Value::U8(*v),
			Self::U16(v) => Value::U16(*v),
			Self::U32(v) => Value::U32(*v),
			Self::U64(v) => Value::U64(*v),
			Self::Usize(v) => Value::Usize(*v),
			Self::String(v) => Value::String(v.clone()),
		}
	}
}

impl fmt::Display for MapKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::String(v) => f.write_str(v),
			other => write!(f, "{}", other.to_value()),
		}
	}
}

/// Associative container whose keys share one primitive kind.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedMap {
	/// Declared key kind; lookups coerce path steps into it.
	pub key_kind: PrimitiveKind,
	/// Stored entries.
	pub entries: HashMap<MapKey, Value>,
}

impl KeyedMap {
	/// Empty map keyed by `key_kind`.
	pub fn new(key_kind: PrimitiveKind) -> Self {
		Self {
			key_kind,
			entries: HashMap::new(),
		}
	}

	/// Builder-style insert.
	pub fn with(mut self, key: MapKey, value: Value) -> Self {
		self.entries.insert(key, value);
		self
	}
}

/// Named record with ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
	/// Record type name.
	pub type_name: String,
	/// Fields in declaration order.
	pub fields: Vec<RecordField>,
}

/// One record field.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
	/// Field name.
	pub name: String,
	/// Field value.
	pub value: Value,
}

impl Record {
	/// Empty record named `type_name`.
	pub fn new(type_name: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			fields: Vec::new(),
		}
	}

	/// Builder-style field append.
	pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
		self.fields.push(RecordField { name: name.into(), value });
		self
	}

	/// Field value by exact name.
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|field| field.name == name).map(|field| &field.value)
	}

	/// Mutable field value by exact name.
	pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
		self.fields.iter_mut().find(|field| field.name == name).map(|field| &mut field.value)
	}
}
