use std::any::{Any, TypeId};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pick::{Array, PickError, Value};

/// Primitive conversion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
	/// `bool`.
	Bool,
	/// `i8`.
	I8,
	/// `i16`.
	I16,
	/// `i32`.
	I32,
	/// `i64`.
	I64,
	/// Platform-width signed integer.
	Isize,
	/// `u8`.
	U8,
	/// `u16`.
	U16,
	/// `u32`.
	U32,
	/// `u64`.
	U64,
	/// Platform-width unsigned integer.
	Usize,
	/// `f32`.
	F32,
	/// `f64`.
	F64,
	/// Owned UTF-8 text.
	String,
}

impl PrimitiveKind {
	/// Every primitive kind, in declaration order.
	pub const ALL: [PrimitiveKind; 14] = [
		Self::Bool,
		Self::I8,
		Self::I16,
		Self::I32,
		Self::I64,
		Self::Isize,
		Self::U8,
		Self::U16,
		Self::U32,
		Self::U64,
		Self::Usize,
		Self::F32,
		Self::F64,
		Self::String,
	];

	/// Rust spelling of the kind.
	pub fn name(self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::I8 => "i8",
			Self::I16 => "i16",
			Self::I32 => "i32",
			Self::I64 => "i64",
			Self::Isize => "isize",
			Self::U8 => "u8",
			Self::U16 => "u16",
			Self::U32 => "u32",
			Self::U64 => "u64",
			Self::Usize => "usize",
			Self::F32 => "f32",
			Self::F64 => "f64",
			Self::String => "String",
		}
	}

	/// Whether the kind is an integer of any width.
	pub fn is_integer(self) -> bool {
		matches!(
			self,
			Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::Isize | Self::U8 | Self::U16 | Self::U32 | Self::U64 | Self::Usize
		)
	}

	/// Whether the kind is a signed integer.
	pub fn is_signed(self) -> bool {
		matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::Isize)
	}

	/// Whether the kind is a float.
	pub fn is_float(self) -> bool {
		matches!(self, Self::F32 | Self::F64)
	}

	/// `TypeId` of the Rust type this kind converts into.
	pub fn type_id(self) -> TypeId {
		match self {
			Self::Bool => TypeId::of::<bool>(),
			Self::I8 => TypeId::of::<i8>(),
			Self::I16 => TypeId::of::<i16>(),
			Self::I32 => TypeId::of::<i32>(),
			Self::I64 => TypeId::of::<i64>(),
			Self::Isize => TypeId::of::<isize>(),
			Self::U8 => TypeId::of::<u8>(),
			Self::U16 => TypeId::of::<u16>(),
			Self::U32 => TypeId::of::<u32>(),
			Self::U64 => TypeId::of::<u64>(),
			Self::Usize => TypeId::of::<usize>(),
			Self::F32 => TypeId::of::<f32>(),
			Self::F64 => TypeId::of::<f64>(),
			Self::String => TypeId::of::<String>(),
		}
	}

	/// `TypeId` of `Vec<T>` for this kind's Rust type.
	pub fn sequence_type_id(self) -> TypeId {
		match self {
			Self::Bool => TypeId::of::<Vec<bool>>(),
			Self::I8 => TypeId::of::<Vec<i8>>(),
			Self::I16 => TypeId::of::<Vec<i16>>(),
			Self::I32 => TypeId::of::<Vec<i32>>(),
			Self::I64 => TypeId::of::<Vec<i64>>(),
			Self::Isize => TypeId::of::<Vec<isize>>(),
			Self::U8 => TypeId::of::<Vec<u8>>(),
			Self::U16 => TypeId::of::<Vec<u16>>(),
			Self::U32 => TypeId::of::<Vec<u32>>(),
			Self::U64 => TypeId::of::<Vec<u64>>(),
			Self::Usize => TypeId::of::<Vec<usize>>(),
			Self::F32 => TypeId::of::<Vec<f32>>(),
			Self::F64 => TypeId::of::<Vec<f64>>(),
			Self::String => TypeId::of::<Vec<String>>(),
		}
	}

	/// Primitive kind whose Rust type has `type_id`.
	pub fn of_type_id(type_id: TypeId) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.type_id() == type_id)
	}

	/// Element kind of the `Vec<T>` whose type id is `type_id`.
	pub fn of_sequence_type_id(type_id: TypeId) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.sequence_type_id() == type_id)
	}
}

impl fmt::Display for PrimitiveKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for PrimitiveKind {
	type Err = PickError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s == "string" {
			return Ok(Self::String);
		}
		Self::ALL
			.into_iter()
			.find(|kind| kind.name() == s)
			.ok_or_else(|| PickError::UnknownTarget { name: s.to_owned() })
	}
}

/// One converted primitive value.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
	/// Boolean.
	Bool(bool),
	/// 8-bit signed.
	I8(i8),
	/// 16-bit signed.
	I16(i16),
	/// 32-bit signed.
	I32(i32),
	/// 64-bit signed.
	I64(i64),
	/// Platform-width signed.
	Isize(isize),
	/// 8-bit unsigned.
	U8(u8),
	/// 16-bit unsigned.
	U16(u16),
	/// 32-bit unsigned.
	U32(u32),
	/// 64-bit unsigned.
	U64(u64),
	/// Platform-width unsigned.
	Usize(usize),
	/// 32-bit float.
	F32(f32),
	/// 64-bit float.
	F64(f64),
	/// Text.
	String(String),
}

impl Primitive {
	/// Kind tag of this value.
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

	/// Zero value of `kind`.
	pub fn zero(kind: PrimitiveKind) -> Self {
		match kind {
			PrimitiveKind::Bool => Self::Bool(false),
			PrimitiveKind::I8 => Self::I8(0),
			PrimitiveKind::I16 => Self::I16(0),
			PrimitiveKind::I32 => Self::I32(0),
			PrimitiveKind::I64 => Self::I64(0),
			PrimitiveKind::Isize => Self::Isize(0),
			PrimitiveKind::U8 => Self::U8(0),
			PrimitiveKind::U16 => Self::U16(0),
			PrimitiveKind::U32 => Self::U32(0),
			PrimitiveKind::U64 => Self::U64(0),
			PrimitiveKind::Usize => Self::Usize(0),
			PrimitiveKind::F32 => Self::F32(0.0),
			PrimitiveKind::F64 => Self::F64(0.0),
			PrimitiveKind::String => Self::String(String::new()),
		}
	}

	/// Box the inner Rust value for type-erased callers.
	pub fn into_any(self) -> Box<dyn Any + Send> {
		match self {
			Self::Bool(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::I8(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::I16(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::I32(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::I64(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::Isize(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::U8(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::U16(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::U32(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::U64(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::Usize(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::F32(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::F64(v) => Box::new(v) as Box<dyn Any + Send>,
			Self::String(v) => Box::new(v) as Box<dyn Any + Send>,
		}
	}
}

impl fmt::Display for Primitive {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
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
			Self::String(v) => f.write_str(v),
		}
	}
}

impl From<Primitive> for Value {
	fn from(value: Primitive) -> Self {
		match value {
			Primitive::Bool(v) => Value::Bool(v),
			Primitive::I8(v) => Value::I8(v),
			Primitive::I16(v) => Value::I16(v),
			Primitive::I32(v) => Value::I32(v),
			Primitive::I64(v) => Value::I64(v),
			Primitive::Isize(v) => Value::Isize(v),
			Primitive::U8(v) => Value::U8(v),
			Primitive::U16(v) => Value::U16(v),
			Primitive::U32(v) => Value::U32(v),
			Primitive::U64(v) => Value::U64(v),
			Primitive::Usize(v) => Value::Usize(v),
			Primitive::F32(v) => Value::F32(v),
			Primitive::F64(v) => Value::F64(v),
			Primitive::String(v) => Value::String(v),
		}
	}
}

/// Rust types that correspond one-to-one with a [`PrimitiveKind`].
pub trait Scalar: Sized + Clone + Send + 'static {
	/// Kind tag for this type.
	const KIND: PrimitiveKind;

	/// Unwrap a primitive of the matching kind.
	fn from_primitive(primitive: Primitive) -> Option<Self>;

	/// Wrap into a tagged primitive.
	fn into_primitive(self) -> Primitive;

	/// Borrow the items of a typed array of the matching kind.
	fn slice_of(array: &Array) -> Option<&[Self]>;

	/// Take the items of a typed array of the matching kind.
	fn take_array(array: Array) -> Result<Vec<Self>, Array>;

	/// Wrap items into a typed array.
	fn into_array(items: Vec<Self>) -> Array;
}

macro_rules! impl_scalar {
	($($ty:ty => $variant:ident),* $(,)?) => {
		$(
			impl Scalar for $ty {
				const KIND: PrimitiveKind = PrimitiveKind::$variant;

				fn from_primitive(primitive: Primitive) -> Option<Self> {
					match primitive {
						Primitive::$variant(value) => Some(value),
						_ => None,
					}
				}

				fn into_primitive(self) -> Primitive {
					Primitive::$variant(self)
				}

				fn slice_of(array: &Array) -> Option<&[Self]> {
					match array {
						Array::$variant(items) => Some(items),
						_ => None,
					}
				}

				fn take_array(array: Array) -> Result<Vec<Self>, Array> {
					match array {
						Array::$variant(items) => Ok(items),
						other => Err(other),
					}
				}

				fn into_array(items: Vec<Self>) -> Array {
					Array::$variant(items)
				}
			}

			impl From<$ty> for Value {
				fn from(value: $ty) -> Self {
					Value::$variant(value)
				}
			}
		)*
	};
}

impl_scalar!(
	bool => Bool,
	i8 => I8,
	i16 => I16,
	i32 => I32,
	i64 => I64,
	isize => Isize,
	u8 => U8,
	u16 => U16,
	u32 => U32,
	u64 => U64,
	usize => Usize,
	f32 => F32,
	f64 => F64,
	String => String,
);
