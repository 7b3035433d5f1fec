use std::borrow::Cow;

use crate::pick::convert::error::Fault;
use crate::pick::convert::scalar::{canonicalize, to_primitive};
use crate::pick::{Array, ConvertError, ConvertErrorKind, Partial, Primitive, PrimitiveKind, Scalar, Value};

const MAX_FOREIGN_DEPTH: usize = 8;

/// Target label of a sequence of `kind`.
pub(crate) fn sequence_label(kind: PrimitiveKind) -> String {
	format!("[{kind}]")
}

/// Convert `value` into a typed array of `kind`.
///
/// Sequences and bytes convert element by element and stop at the first
/// failure; a scalar becomes a one-element array; null becomes an empty one.
pub(crate) fn to_array(value: &Value, kind: PrimitiveKind) -> Result<Array, ConvertError> {
	to_array_at(value, value, kind, 0)
}

/// Typed form of [`to_array`].
pub(crate) fn to_vec<T: Scalar>(value: &Value) -> Result<Vec<T>, ConvertError> {
	let array = to_array(value, T::KIND)?;
	T::take_array(array).map_err(|_| ConvertError::new(ConvertErrorKind::InvalidType, value, sequence_label(T::KIND)))
}

fn to_array_at(root: &Value, value: &Value, kind: PrimitiveKind, depth: usize) -> Result<Array, ConvertError> {
	let fail = |kind_of_error: ConvertErrorKind| ConvertError::new(kind_of_error, root, sequence_label(kind));

	match value {
		Value::Null => Ok(Array::with_capacity(kind, 0)),
		Value::Ref(inner) => to_array_at(root, inner, kind, depth),
		Value::Array(array) if array.kind() == kind => Ok(array.clone()),
		Value::Array(array) => collect(kind, array.len(), array.iter().enumerate().map(|(index, item)| (index, Cow::Owned(item)))),
		Value::Seq(items) => collect(kind, items.len(), items.iter().enumerate().map(|(index, item)| (index, Cow::Borrowed(item)))),
		Value::Bytes(bytes) if kind == PrimitiveKind::U8 => Ok(Array::U8(bytes.clone())),
		Value::Bytes(bytes) => collect(kind, bytes.len(), bytes.iter().enumerate().map(|(index, byte)| (index, Cow::Owned(Value::U8(*byte))))),
		Value::String(text) | Value::RawJson(text) if kind == PrimitiveKind::U8 => Ok(Array::U8(text.as_bytes().to_vec())),
		Value::Map(_) | Value::KeyedMap(_) | Value::Record(_) => Err(fail(ConvertErrorKind::InvalidType)),
		Value::Foreign(foreign) => {
			if depth >= MAX_FOREIGN_DEPTH {
				return Err(fail(ConvertErrorKind::InvalidType));
			}
			let basic = canonicalize(foreign).map_err(fail)?;
			log::trace!("canonicalized {} to {} for sequence conversion", foreign.type_name(), basic.type_name());
			to_array_at(root, &basic, kind, depth + 1)
		}
		scalar => {
			let primitive = to_primitive(scalar, kind).map_err(|fault| single_error(fault, root, kind))?;
			let mut array = Array::with_capacity(kind, 1);
			array.push(primitive);
			Ok(array)
		}
	}
}

fn single_error(fault: Fault<Primitive>, root: &Value, kind: PrimitiveKind) -> ConvertError {
	fault.into_error(root, sequence_label(kind), Partial::Primitive)
}

fn collect<'v>(kind: PrimitiveKind, len: usize, items: impl Iterator<Item = (usize, Cow<'v, Value>)>) -> Result<Array, ConvertError> {
	let mut array = Array::with_capacity(kind, len);
	for (index, item) in items {
		let primitive = to_primitive(&item, kind).map_err(|fault| fault.into_error(&item, format!("{}[{index}]", sequence_label(kind)), Partial::Primitive))?;
		array.push(primitive);
	}
	Ok(array)
}
