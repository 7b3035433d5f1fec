use std::borrow::Cow;

use crate::pick::convert::error::{Cast, Fault, lift};
use crate::pick::convert::text::{FLOAT_TEXT_PRECISION, format_float, looks_fractional, parse_bool, parse_float, parse_i64, parse_u64};
use crate::pick::{ConvertErrorKind, Foreign, Primitive, PrimitiveKind, Scalar, Value};

/// How many foreign layers are unwrapped before giving up.
const MAX_FOREIGN_DEPTH: usize = 8;

/// Source value reduced to the handful of shapes the scalar rules distinguish.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Scalarish<'a> {
	Null,
	Bool(bool),
	Signed(i64),
	Unsigned(u64),
	F32(f32),
	F64(f64),
	Text(Cow<'a, str>),
}

impl Scalarish<'_> {
	fn into_owned(self) -> Scalarish<'static> {
		match self {
			Self::Null => Scalarish::Null,
			Self::Bool(v) => Scalarish::Bool(v),
			Self::Signed(v) => Scalarish::Signed(v),
			Self::Unsigned(v) => Scalarish::Unsigned(v),
			Self::F32(v) => Scalarish::F32(v),
			Self::F64(v) => Scalarish::F64(v),
			Self::Text(text) => Scalarish::Text(Cow::Owned(text.into_owned())),
		}
	}
}

/// Reduce `value` to a scalar shape, following references and foreign aliases.
pub(crate) fn classify(value: &Value) -> Result<Scalarish<'_>, ConvertErrorKind> {
	Ok(match value {
		Value::Null => Scalarish::Null,
		Value::Bool(v) => Scalarish::Bool(*v),
		Value::I8(v) => Scalarish::Signed(i64::from(*v)),
		Value::I16(v) => Scalarish::Signed(i64::from(*v)),
		Value::I32(v) => Scalarish::Signed(i64::from(*v)),
		Value::I64(v) => Scalarish::Signed(*v),
		Value::Isize(v) => Scalarish::Signed(*v as i64),
		Value::U8(v) => Scalarish::Unsigned(u64::from(*v)),
		Value::U16(v) => Scalarish::Unsigned(u64::from(*v)),
		Value::U32(v) => Scalarish::Unsigned(u64::from(*v)),
		Value::U64(v) => Scalarish::Unsigned(*v),
		Value::Usize(v) => Scalarish::Unsigned(*v as u64),
		Value::F32(v) => Scalarish::F32(*v),
		Value::F64(v) => Scalarish::F64(*v),
		Value::String(text) | Value::RawJson(text) | Value::Number(text) => Scalarish::Text(Cow::Borrowed(text)),
		Value::Bytes(bytes) => Scalarish::Text(String::from_utf8_lossy(bytes)),
		Value::Ref(inner) => return classify(inner),
		Value::Foreign(foreign) => return classify_foreign(foreign, 0),
		Value::Seq(_) | Value::Array(_) | Value::Map(_) | Value::KeyedMap(_) | Value::Record(_) => return Err(ConvertErrorKind::InvalidType),
	})
}

fn classify_foreign(foreign: &Foreign, depth: usize) -> Result<Scalarish<'static>, ConvertErrorKind> {
	if depth >= MAX_FOREIGN_DEPTH {
		return Err(ConvertErrorKind::InvalidType);
	}
	let basic = canonicalize(foreign)?;
	log::trace!("canonicalized {} to {}", foreign.type_name(), basic.type_name());
	let mut basic = &basic;
	while let Value::Ref(inner) = basic {
		basic = inner.as_ref();
	}
	match basic {
		Value::Foreign(inner) => classify_foreign(inner, depth + 1),
		other => classify(other).map(Scalarish::into_owned),
	}
}

/// Basic value behind a foreign alias; a type without one is incompatible.
pub(crate) fn canonicalize(foreign: &Foreign) -> Result<Value, ConvertErrorKind> {
	foreign.to_basic()?.ok_or(ConvertErrorKind::InvalidType)
}

/// Integer widths sharing one range-checked caster.
trait Int: Copy {
	const SIGNED: bool;
	const MIN: i128;
	const MAX: i128;

	/// Low bits of `bits` at this width.
	fn wrap(bits: i128) -> Self;
}

macro_rules! impl_int {
	($($ty:ty),* $(,)?) => {
		$(
			impl Int for $ty {
				const SIGNED: bool = <$ty>::MIN != 0;
				const MIN: i128 = <$ty>::MIN as i128;
				const MAX: i128 = <$ty>::MAX as i128;

				fn wrap(bits: i128) -> Self {
					bits as $ty
				}
			}
		)*
	};
}

impl_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// 2^63, the first float past the signed 64-bit range.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
/// 2^64, the first float past the unsigned 64-bit range.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

fn narrow<T: Int>(wide: i128) -> Cast<T> {
	if (T::MIN..=T::MAX).contains(&wide) {
		Ok(T::wrap(wide))
	} else {
		Err(Fault::lossy(ConvertErrorKind::Overflow, T::wrap(wide)))
	}
}

fn int_from_float<T: Int>(x: f64) -> Cast<T> {
	let in_wide_range = if T::SIGNED {
		(-TWO_POW_63..TWO_POW_63).contains(&x)
	} else {
		(0.0..TWO_POW_64).contains(&x)
	};
	if !in_wide_range && !x.is_nan() {
		return Err(Fault::lossy(ConvertErrorKind::Overflow, T::wrap(x as i128)));
	}

	// Range is checked on the whole part so overflow wins over lost decimals.
	let whole = x.trunc();
	let narrowed = narrow::<T>(whole as i128)?;
	if whole != x {
		return Err(Fault::lossy(ConvertErrorKind::LostDecimals, narrowed));
	}
	Ok(narrowed)
}

fn int_from_text<T: Int>(text: &str) -> Cast<T> {
	if looks_fractional(text) {
		return match parse_float::<f64>(text) {
			Ok(x) => int_from_float(x),
			Err(Fault { partial: Some(x), .. }) => int_from_float(x),
			Err(fault) => Err(fault.discard()),
		};
	}
	let wide = if T::SIGNED {
		lift(parse_i64(text), i128::from)
	} else {
		lift(parse_u64(text), i128::from)
	};
	match wide {
		Ok(wide) => narrow(wide),
		Err(fault) => Err(fault.map(T::wrap)),
	}
}

fn to_int<T: Int>(scalar: &Scalarish<'_>) -> Cast<T> {
	match scalar {
		Scalarish::Null => Ok(T::wrap(0)),
		Scalarish::Bool(v) => Ok(T::wrap(i128::from(*v))),
		Scalarish::Signed(v) => narrow(i128::from(*v)),
		Scalarish::Unsigned(v) => narrow(i128::from(*v)),
		Scalarish::F32(v) => int_from_float(f64::from(*v)),
		Scalarish::F64(v) => int_from_float(*v),
		Scalarish::Text(text) => int_from_text(text),
	}
}

fn to_f64(scalar: &Scalarish<'_>) -> Cast<f64> {
	match scalar {
		Scalarish::Null => Ok(0.0),
		Scalarish::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
		Scalarish::Signed(v) => Ok(*v as f64),
		Scalarish::Unsigned(v) => Ok(*v as f64),
		Scalarish::F32(v) => Ok(f64::from(*v)),
		Scalarish::F64(v) => Ok(*v),
		Scalarish::Text(text) => parse_float(text),
	}
}

fn to_f32(scalar: &Scalarish<'_>) -> Cast<f32> {
	match scalar {
		Scalarish::Null => Ok(0.0),
		Scalarish::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
		Scalarish::Signed(v) => Ok(*v as f32),
		Scalarish::Unsigned(v) => Ok(*v as f32),
		Scalarish::F32(v) => Ok(*v),
		Scalarish::F64(v) if v.is_finite() && v.abs() > f64::from(f32::MAX) => {
			let infinity = if v.is_sign_negative() { f32::NEG_INFINITY } else { f32::INFINITY };
			Err(Fault::lossy(ConvertErrorKind::Overflow, infinity))
		}
		Scalarish::F64(v) => Ok(*v as f32),
		Scalarish::Text(text) => parse_float(text),
	}
}

fn to_bool(scalar: &Scalarish<'_>) -> Cast<bool> {
	match scalar {
		Scalarish::Null => Ok(false),
		Scalarish::Bool(v) => Ok(*v),
		Scalarish::Signed(v) => Ok(*v != 0),
		Scalarish::Unsigned(v) => Ok(*v != 0),
		Scalarish::F32(v) => Ok(*v != 0.0),
		Scalarish::F64(v) => Ok(*v != 0.0),
		Scalarish::Text(text) => parse_bool(text),
	}
}

fn to_text(scalar: &Scalarish<'_>) -> String {
	match scalar {
		Scalarish::Null => String::new(),
		Scalarish::Bool(v) => v.to_string(),
		Scalarish::Signed(v) => v.to_string(),
		Scalarish::Unsigned(v) => v.to_string(),
		Scalarish::F32(v) => format_float(f64::from(*v), FLOAT_TEXT_PRECISION),
		Scalarish::F64(v) => format_float(*v, FLOAT_TEXT_PRECISION),
		Scalarish::Text(text) => text.clone().into_owned(),
	}
}

/// Convert an already-classified scalar into `kind`.
pub(crate) fn scalar_to_primitive(scalar: &Scalarish<'_>, kind: PrimitiveKind) -> Cast<Primitive> {
	match kind {
		PrimitiveKind::Bool => lift(to_bool(scalar), Primitive::Bool),
		PrimitiveKind::I8 => lift(to_int(scalar), Primitive::I8),
		PrimitiveKind::I16 => lift(to_int(scalar), Primitive::I16),
		PrimitiveKind::I32 => lift(to_int(scalar), Primitive::I32),
		PrimitiveKind::I64 => lift(to_int(scalar), Primitive::I64),
		PrimitiveKind::Isize => lift(to_int(scalar), Primitive::Isize),
		PrimitiveKind::U8 => lift(to_int(scalar), Primitive::U8),
		PrimitiveKind::U16 => lift(to_int(scalar), Primitive::U16),
		PrimitiveKind::U32 => lift(to_int(scalar), Primitive::U32),
		PrimitiveKind::U64 => lift(to_int(scalar), Primitive::U64),
		PrimitiveKind::Usize => lift(to_int(scalar), Primitive::Usize),
		PrimitiveKind::F32 => lift(to_f32(scalar), Primitive::F32),
		PrimitiveKind::F64 => lift(to_f64(scalar), Primitive::F64),
		PrimitiveKind::String => Ok(Primitive::String(to_text(scalar))),
	}
}

/// Convert any value into `kind` under the scalar rules.
pub(crate) fn to_primitive(value: &Value, kind: PrimitiveKind) -> Cast<Primitive> {
	if let Some(primitive) = exact(value, kind) {
		return Ok(primitive);
	}
	let scalar = classify(value)?;
	scalar_to_primitive(&scalar, kind)
}

/// Typed form of [`to_primitive`].
pub(crate) fn cast<T: Scalar>(value: &Value) -> Cast<T> {
	match to_primitive(value, T::KIND) {
		Ok(primitive) => T::from_primitive(primitive).ok_or(Fault::fatal(ConvertErrorKind::InvalidType)),
		Err(fault) => Err(Fault {
			kind: fault.kind,
			partial: fault.partial.and_then(T::from_primitive),
		}),
	}
}

/// Identity conversions, answered without classifying.
fn exact(value: &Value, kind: PrimitiveKind) -> Option<Primitive> {
	Some(match (value, kind) {
		(Value::Bool(v), PrimitiveKind::Bool) => Primitive::Bool(*v),
		(Value::I8(v), PrimitiveKind::I8) => Primitive::I8(*v),
		(Value::I16(v), PrimitiveKind::I16) => Primitive::I16(*v),
		(Value::I32(v), PrimitiveKind::I32) => Primitive::I32(*v),
		(Value::I64(v), PrimitiveKind::I64) => Primitive::I64(*v),
		(Value::Isize(v), PrimitiveKind::Isize) => Primitive::Isize(*v),
		(Value::U8(v), PrimitiveKind::U8) => Primitive::U8(*v),
		(Value::U16(v), PrimitiveKind::U16) => Primitive::U16(*v),
		(Value::U32(v), PrimitiveKind::U32) => Primitive::U32(*v),
		(Value::U64(v), PrimitiveKind::U64) => Primitive::U64(*v),
		(Value::Usize(v), PrimitiveKind::Usize) => Primitive::Usize(*v),
		(Value::F32(v), PrimitiveKind::F32) => Primitive::F32(*v),
		(Value::F64(v), PrimitiveKind::F64) => Primitive::F64(*v),
		(Value::String(v), PrimitiveKind::String) => Primitive::String(v.clone()),
		_ => return None,
	})
}
