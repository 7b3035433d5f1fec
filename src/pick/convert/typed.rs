use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, TimeDelta, Utc};

use crate::pick::convert::scalar::{canonicalize, cast};
use crate::pick::convert::sequence::to_vec;
use crate::pick::{ConvertError, ConvertErrorKind, Converter, Partial, PrimitiveKind, Scalar, Value};

/// Structural description of a [`Convert`] target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
	/// One primitive.
	Primitive(PrimitiveKind),
	/// `Vec` of one primitive.
	Sequence(PrimitiveKind),
	/// Map from a primitive key to any convertible value.
	Map {
		/// Key kind.
		key: PrimitiveKind,
		/// Value shape.
		value: Box<TypeShape>,
	},
	/// UTC instant.
	Instant,
	/// Signed nanosecond duration.
	Duration,
	/// Newtype over another shape.
	Alias {
		/// Newtype name.
		name: &'static str,
		/// Wrapped shape.
		of: Box<TypeShape>,
	},
}

impl TypeShape {
	/// Shape with every alias layer removed.
	pub fn underlying(&self) -> &TypeShape {
		match self {
			Self::Alias { of, .. } => of.underlying(),
			other => other,
		}
	}
}

impl fmt::Display for TypeShape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Primitive(kind) => write!(f, "{kind}"),
			Self::Sequence(kind) => write!(f, "[{kind}]"),
			Self::Map { key, value } => write!(f, "map<{key}, {value}>"),
			Self::Instant => f.write_str("instant"),
			Self::Duration => f.write_str("duration"),
			Self::Alias { name, .. } => f.write_str(name),
		}
	}
}

/// Rust types a [`Value`] can be converted into.
///
/// Implemented for every primitive, `Vec` of a primitive, maps keyed by a
/// primitive, `DateTime<Utc>` and `TimeDelta`. Newtypes over any of these get
/// an implementation from [`convert_newtype!`](crate::convert_newtype).
pub trait Convert: Sized + Clone + Send + 'static {
	/// Structural description used by the type registry.
	fn shape() -> TypeShape;

	/// Convert `value` using `converter`'s options.
	fn convert(value: &Value, converter: &Converter) -> Result<Self, ConvertError>;

	/// Best-effort value carried by a recoverable error, when it has this type.
	fn from_partial(partial: Partial) -> Option<Self> {
		let _ = partial;
		None
	}
}

fn convert_scalar<T: Scalar>(value: &Value) -> Result<T, ConvertError> {
	cast::<T>(value).map_err(|fault| fault.into_error(value, T::KIND, |partial| Partial::Primitive(partial.into_primitive())))
}

macro_rules! impl_convert_scalar {
	($($ty:ty),* $(,)?) => {
		$(
			impl Convert for $ty {
				fn shape() -> TypeShape {
					TypeShape::Primitive(<$ty as Scalar>::KIND)
				}

				fn convert(value: &Value, _converter: &Converter) -> Result<Self, ConvertError> {
					convert_scalar(value)
				}

				fn from_partial(partial: Partial) -> Option<Self> {
					match partial {
						Partial::Primitive(primitive) => <$ty as Scalar>::from_primitive(primitive),
						_ => None,
					}
				}
			}
		)*
	};
}

impl_convert_scalar!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String);

impl<T: Scalar> Convert for Vec<T> {
	fn shape() -> TypeShape {
		TypeShape::Sequence(T::KIND)
	}

	fn convert(value: &Value, _converter: &Converter) -> Result<Self, ConvertError> {
		to_vec(value)
	}
}

impl<K, V> Convert for HashMap<K, V>
where
	K: Scalar + Eq + Hash,
	V: Convert,
{
	fn shape() -> TypeShape {
		TypeShape::Map {
			key: K::KIND,
			value: Box::new(V::shape()),
		}
	}

	fn convert(value: &Value, converter: &Converter) -> Result<Self, ConvertError> {
		convert_map(value, value, converter, 0)
	}
}

const MAX_FOREIGN_DEPTH: usize = 8;

fn convert_map<K, V>(root: &Value, value: &Value, converter: &Converter, depth: usize) -> Result<HashMap<K, V>, ConvertError>
where
	K: Scalar + Eq + Hash,
	V: Convert,
{
	let fail = |kind: ConvertErrorKind| ConvertError::new(kind, root, HashMap::<K, V>::shape());

	match value {
		Value::Null => Ok(HashMap::new()),
		Value::Ref(inner) => convert_map(root, inner, converter, depth),
		Value::Seq(items) => items.iter().enumerate().map(|(index, item)| entry(&Value::Usize(index), item, converter)).collect(),
		Value::Array(array) => array.iter().enumerate().map(|(index, item)| entry(&Value::Usize(index), &item, converter)).collect(),
		Value::Bytes(bytes) => bytes.iter().enumerate().map(|(index, byte)| entry(&Value::Usize(index), &Value::U8(*byte), converter)).collect(),
		Value::Map(entries) => entries.iter().map(|(key, item)| entry(&Value::String(key.clone()), item, converter)).collect(),
		Value::KeyedMap(map) => map.entries.iter().map(|(key, item)| entry(&key.to_value(), item, converter)).collect(),
		Value::Foreign(foreign) if depth < MAX_FOREIGN_DEPTH => {
			let basic = canonicalize(foreign).map_err(fail)?;
			convert_map(root, &basic, converter, depth + 1)
		}
		_ => Err(fail(ConvertErrorKind::InvalidType)),
	}
}

fn entry<K: Scalar, V: Convert>(key: &Value, item: &Value, converter: &Converter) -> Result<(K, V), ConvertError> {
	let key = convert_scalar::<K>(key).map_err(|err| err.retarget(format!("map key {}", K::KIND)))?;
	Ok((key, V::convert(item, converter)?))
}

impl Convert for DateTime<Utc> {
	fn shape() -> TypeShape {
		TypeShape::Instant
	}

	fn convert(value: &Value, converter: &Converter) -> Result<Self, ConvertError> {
		converter.convert_instant(value, &converter.options.instant)
	}

	fn from_partial(partial: Partial) -> Option<Self> {
		match partial {
			Partial::Instant(instant) => Some(instant),
			_ => None,
		}
	}
}

impl Convert for TimeDelta {
	fn shape() -> TypeShape {
		TypeShape::Duration
	}

	fn convert(value: &Value, converter: &Converter) -> Result<Self, ConvertError> {
		converter.convert_duration(value, &converter.options.duration)
	}

	fn from_partial(partial: Partial) -> Option<Self> {
		match partial {
			Partial::Duration(duration) => Some(duration),
			_ => None,
		}
	}
}

/// Implement [`Convert`] for tuple newtypes over a convertible type.
///
/// ```
/// use anypick::convert_newtype;
/// use anypick::pick::{Converter, Value};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Celsius(f64);
///
/// convert_newtype!(Celsius(f64));
///
/// let value = Converter::default().convert_to::<Celsius>(&Value::I32(21)).expect("celsius");
/// assert_eq!(value, Celsius(21.0));
/// ```
#[macro_export]
macro_rules! convert_newtype {
	($($name:ident($inner:ty)),* $(,)?) => {
		$(
			impl $crate::pick::Convert for $name {
				fn shape() -> $crate::pick::TypeShape {
					$crate::pick::TypeShape::Alias {
						name: stringify!($name),
						of: ::std::boxed::Box::new(<$inner as $crate::pick::Convert>::shape()),
					}
				}

				fn convert(
					value: &$crate::pick::Value,
					converter: &$crate::pick::Converter,
				) -> ::std::result::Result<Self, $crate::pick::ConvertError> {
					<$inner as $crate::pick::Convert>::convert(value, converter)
						.map($name)
						.map_err(|err| err.retarget(stringify!($name)))
				}

				fn from_partial(partial: $crate::pick::Partial) -> ::std::option::Option<Self> {
					<$inner as $crate::pick::Convert>::from_partial(partial).map($name)
				}
			}
		)*
	};
}

type ErasedConvert = fn(&Value, &Converter) -> Result<Box<dyn Any + Send>, ConvertError>;

fn erased<T: Convert>(value: &Value, converter: &Converter) -> Result<Box<dyn Any + Send>, ConvertError> {
	converter.convert_to::<T>(value).map(|converted| Box::new(converted) as Box<dyn Any + Send>)
}

/// Registry entry for one convertible type.
#[derive(Clone)]
pub struct TypeDesc {
	/// Rust type id.
	pub type_id: TypeId,
	/// Rust type name.
	pub name: &'static str,
	/// Structural description.
	pub shape: TypeShape,
	convert: ErasedConvert,
}

impl TypeDesc {
	/// Descriptor for `T`.
	pub fn of<T: Convert>() -> Self {
		Self {
			type_id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
			shape: T::shape(),
			convert: erased::<T>,
		}
	}

	/// Convert `value` into this type, boxed.
	pub fn convert(&self, value: &Value, converter: &Converter) -> Result<Box<dyn Any + Send>, ConvertError> {
		(self.convert)(value, converter)
	}
}

impl fmt::Debug for TypeDesc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeDesc").field("name", &self.name).field("shape", &self.shape).finish_non_exhaustive()
	}
}

/// Table of convertible types keyed by [`TypeId`].
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
	types: HashMap<TypeId, TypeDesc>,
}

macro_rules! register_all {
	($registry:expr, $($ty:ty),* $(,)?) => {
		$(
			$registry.register::<$ty>();
			$registry.register::<Vec<$ty>>();
		)*
	};
}

impl TypeRegistry {
	/// Empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding every primitive, `Vec` of each, instants and durations.
	pub fn with_defaults() -> Self {
		let mut registry = Self::new();
		register_all!(registry, bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String);
		registry.register::<DateTime<Utc>>();
		registry.register::<TimeDelta>();
		registry
	}

	/// Shared default registry, built on first use.
	pub fn global() -> Arc<TypeRegistry> {
		static GLOBAL: OnceLock<Arc<TypeRegistry>> = OnceLock::new();
		GLOBAL
			.get_or_init(|| {
				let registry = TypeRegistry::with_defaults();
				log::debug!("type registry initialized with {} types", registry.len());
				Arc::new(registry)
			})
			.clone()
	}

	/// Add `T`, replacing any earlier entry for it.
	pub fn register<T: Convert>(&mut self) -> &mut Self {
		let desc = TypeDesc::of::<T>();
		self.types.insert(desc.type_id, desc);
		self
	}

	/// Builder form of [`register`](Self::register).
	pub fn with<T: Convert>(mut self) -> Self {
		self.register::<T>();
		self
	}

	/// Descriptor for `type_id`.
	pub fn get(&self, type_id: TypeId) -> Option<&TypeDesc> {
		self.types.get(&type_id)
	}

	/// Whether `type_id` is registered.
	pub fn contains(&self, type_id: TypeId) -> bool {
		self.types.contains_key(&type_id)
	}

	/// Number of registered types.
	pub fn len(&self) -> usize {
		self.types.len()
	}

	/// Whether no types are registered.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}
