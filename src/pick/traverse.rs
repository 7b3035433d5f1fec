use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pick::{ConvertError, ConvertErrorKind, Converter, Key, MapKey, Path, PrimitiveKind, Record, Value};

/// Traversal switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraverseOptions {
	/// Return a terminal reference as is instead of following it once.
	pub skip_terminal_deref: bool,
}

/// Why a single step failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraverseErrorKind {
	/// The step names nothing in the current node.
	#[error("field not found")]
	FieldNotFound,
	/// Sequence index outside `0..len` after normalizing negatives.
	#[error("index {index} out of range for length {len}")]
	IndexOutOfRange {
		/// Index as written in the path.
		index: i64,
		/// Sequence length.
		len: usize,
	},
	/// Positional record field outside the field list.
	#[error("field index {index} out of range for record with {len} fields")]
	FieldIndexOutOfRange {
		/// Index as written in the path.
		index: i64,
		/// Number of record fields.
		len: usize,
	},
	/// The step could not be coerced into the container's key type.
	#[error("cannot convert key")]
	KeyConvert(#[source] ConvertError),
	/// The value given to `set` could not be stored in a typed container.
	#[error("cannot convert value")]
	ValueConvert(#[source] ConvertError),
}

/// Traversal failure at one step of a path.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{prefix}: {kind}")]
pub struct TraverseError {
	/// Failure category.
	#[source]
	pub kind: TraverseErrorKind,
	/// Path up to and including the failing step.
	pub prefix: Path,
	/// Zero-based position of the failing step.
	pub step: usize,
}

impl TraverseError {
	fn at(path: &Path, step: usize, kind: TraverseErrorKind) -> Self {
		let prefix = path.prefix(step + 1);
		log::trace!("traversal stopped at {prefix}: {kind}");
		Self { kind, prefix, step }
	}

	/// Whether the failing step named nothing.
	pub fn is_not_found(&self) -> bool {
		self.kind == TraverseErrorKind::FieldNotFound
	}

	/// Conversion error behind a key or value coercion failure.
	pub fn convert_error(&self) -> Option<&ConvertError> {
		match &self.kind {
			TraverseErrorKind::KeyConvert(err) | TraverseErrorKind::ValueConvert(err) => Some(err),
			_ => None,
		}
	}
}

/// Walks value trees along paths.
///
/// Never mutates during reads. The converter coerces path steps into the key
/// type of non-string maps and into sequence positions.
#[derive(Debug, Clone, Default)]
pub struct Traverser {
	/// Traversal switches.
	pub options: TraverseOptions,
	/// Converter used for key coercion.
	pub converter: Converter,
}

impl Traverser {
	/// Traverser with default conversion options.
	pub fn new(options: TraverseOptions) -> Self {
		Self {
			options,
			converter: Converter::default(),
		}
	}

	/// Replace the key-coercion converter.
	pub fn with_converter(mut self, converter: Converter) -> Self {
		self.converter = converter;
		self
	}

	/// Leaf addressed by `path`.
	///
	/// Typed-array and byte elements come back owned; everything else is
	/// borrowed from `root`.
	pub fn retrieve<'v>(&self, root: &'v Value, path: &Path) -> Result<Cow<'v, Value>, TraverseError> {
		let mut node = Cow::Borrowed(root);
		for (step, key) in path.iter().enumerate() {
			node = match node {
				Cow::Borrowed(current) => self.access(current, key).map_err(|kind| TraverseError::at(path, step, kind))?,
				Cow::Owned(_) => return Err(TraverseError::at(path, step, TraverseErrorKind::FieldNotFound)),
			};
		}

		if self.options.skip_terminal_deref {
			return Ok(node);
		}
		Ok(match node {
			Cow::Borrowed(Value::Ref(inner)) => Cow::Borrowed(inner.as_ref()),
			Cow::Owned(Value::Ref(inner)) => Cow::Owned(*inner),
			other => other,
		})
	}

	/// Elements of the sequence at `path`, each usable as a fresh root.
	///
	/// Null yields nothing and any other leaf yields itself once.
	pub fn elements<'v>(&self, root: &'v Value, path: &Path) -> Result<Vec<Cow<'v, Value>>, TraverseError> {
		Ok(match self.retrieve(root, path)? {
			Cow::Borrowed(Value::Seq(items)) => items.iter().map(Cow::Borrowed).collect(),
			Cow::Borrowed(Value::Array(array)) => array.iter().map(Cow::Owned).collect(),
			Cow::Owned(Value::Seq(items)) => items.into_iter().map(Cow::Owned).collect(),
			Cow::Owned(Value::Array(array)) => array.iter().map(Cow::Owned).collect(),
			Cow::Borrowed(Value::Bytes(bytes)) => bytes.iter().map(|byte| Cow::Owned(Value::U8(*byte))).collect(),
			Cow::Owned(Value::Bytes(bytes)) => bytes.into_iter().map(|byte| Cow::Owned(Value::U8(byte))).collect(),
			Cow::Borrowed(Value::Null) | Cow::Owned(Value::Null) => Vec::new(),
			leaf => vec![leaf],
		})
	}

	/// Store `value` at `path`.
	///
	/// Every step but the last must exist. The last step inserts or overwrites
	/// a map entry, or replaces an existing sequence element or record field.
	/// An empty path replaces the root.
	pub fn set(&self, root: &mut Value, path: &Path, value: Value) -> Result<(), TraverseError> {
		let Some((last, parents)) = path.keys.split_last() else {
			*root = value;
			return Ok(());
		};

		let mut node = root;
		for (step, key) in parents.iter().enumerate() {
			node = self.access_mut(node, key).map_err(|kind| TraverseError::at(path, step, kind))?;
		}
		self.assign(node, last, value).map_err(|kind| TraverseError::at(path, parents.len(), kind))
	}

	fn access<'v>(&self, node: &'v Value, key: &Key) -> Result<Cow<'v, Value>, TraverseErrorKind> {
		match node {
			Value::Map(entries) => {
				let found = match key {
					Key::Field(name) => entries.get(name.as_str()),
					Key::Index(index) => entries.get(&index.to_string()),
				};
				found.map(Cow::Borrowed).ok_or(TraverseErrorKind::FieldNotFound)
			}
			Value::Seq(items) => {
				let position = self.position(key, items.len())?;
				Ok(Cow::Borrowed(&items[position]))
			}
			Value::Ref(inner) => self.access(inner, key),
			Value::KeyedMap(map) => {
				let map_key = self.map_key(map.key_kind, key)?;
				map.entries.get(&map_key).map(Cow::Borrowed).ok_or(TraverseErrorKind::FieldNotFound)
			}
			Value::Array(array) => {
				let position = self.position(key, array.len())?;
				array.get(position).map(Cow::Owned).ok_or(TraverseErrorKind::FieldNotFound)
			}
			Value::Bytes(bytes) => {
				let position = self.position(key, bytes.len())?;
				Ok(Cow::Owned(Value::U8(bytes[position])))
			}
			Value::Record(record) => match key {
				Key::Field(name) => record.field(name).map(Cow::Borrowed).ok_or(TraverseErrorKind::FieldNotFound),
				Key::Index(index) => usize::try_from(*index)
					.ok()
					.and_then(|position| record.fields.get(position))
					.map(|field| Cow::Borrowed(&field.value))
					.ok_or(TraverseErrorKind::FieldIndexOutOfRange {
						index: *index,
						len: record.fields.len(),
					}),
			},
			_ => Err(TraverseErrorKind::FieldNotFound),
		}
	}

	fn access_mut<'v>(&self, node: &'v mut Value, key: &Key) -> Result<&'v mut Value, TraverseErrorKind> {
		match node {
			Value::Map(entries) => {
				let found = match key {
					Key::Field(name) => entries.get_mut(name.as_str()),
					Key::Index(index) => entries.get_mut(&index.to_string()),
				};
				found.ok_or(TraverseErrorKind::FieldNotFound)
			}
			Value::Seq(items) => {
				let position = self.position(key, items.len())?;
				Ok(&mut items[position])
			}
			Value::Ref(inner) => self.access_mut(inner, key),
			Value::KeyedMap(map) => {
				let map_key = self.map_key(map.key_kind, key)?;
				map.entries.get_mut(&map_key).ok_or(TraverseErrorKind::FieldNotFound)
			}
			Value::Record(record) => record_slot(record, key),
			_ => Err(TraverseErrorKind::FieldNotFound),
		}
	}

	fn assign(&self, node: &mut Value, key: &Key, value: Value) -> Result<(), TraverseErrorKind> {
		match node {
			Value::Map(entries) => {
				let name = match key {
					Key::Field(name) => name.clone(),
					Key::Index(index) => index.to_string(),
				};
				entries.insert(name, value);
			}
			Value::KeyedMap(map) => {
				let map_key = self.map_key(map.key_kind, key)?;
				map.entries.insert(map_key, value);
			}
			Value::Seq(items) => {
				let position = self.position(key, items.len())?;
				items[position] = value;
			}
			Value::Array(array) => {
				let position = self.position(key, array.len())?;
				let element = self.converter.convert(&value, array.kind()).map_err(TraverseErrorKind::ValueConvert)?;
				if !array.set(position, element) {
					let index = i64::try_from(position).unwrap_or(i64::MAX);
					return Err(TraverseErrorKind::IndexOutOfRange { index, len: array.len() });
				}
			}
			Value::Bytes(bytes) => {
				let position = self.position(key, bytes.len())?;
				let byte = self.converter.convert_to::<u8>(&value).map_err(TraverseErrorKind::ValueConvert)?;
				bytes[position] = byte;
			}
			Value::Ref(inner) => return self.assign(inner, key, value),
			Value::Record(record) => *record_slot(record, key)? = value,
			_ => return Err(TraverseErrorKind::FieldNotFound),
		}
		Ok(())
	}

	/// Sequence position for a step; negatives count from the end.
	fn position(&self, key: &Key, len: usize) -> Result<usize, TraverseErrorKind> {
		let index = match key {
			Key::Index(index) => *index,
			Key::Field(name) => self
				.converter
				.convert_to::<i64>(&Value::String(name.clone()))
				.map_err(TraverseErrorKind::KeyConvert)?,
		};
		let out_of_range = || TraverseErrorKind::IndexOutOfRange { index, len };
		let len_signed = i64::try_from(len).map_err(|_| out_of_range())?;
		let normalized = if index < 0 { index + len_signed } else { index };
		if !(0..len_signed).contains(&normalized) {
			return Err(out_of_range());
		}
		usize::try_from(normalized).map_err(|_| out_of_range())
	}

	/// Coerce a step into the key type of a non-string map.
	fn map_key(&self, kind: PrimitiveKind, key: &Key) -> Result<MapKey, TraverseErrorKind> {
		let source = match key {
			Key::Field(name) => Value::String(name.clone()),
			Key::Index(index) => Value::I64(*index),
		};
		let primitive = self.converter.convert(&source, kind).map_err(TraverseErrorKind::KeyConvert)?;
		MapKey::from_primitive(primitive)
			.ok_or_else(|| TraverseErrorKind::KeyConvert(ConvertError::new(ConvertErrorKind::InvalidType, &source, format!("map key {kind}"))))
	}
}

fn record_slot<'v>(record: &'v mut Record, key: &Key) -> Result<&'v mut Value, TraverseErrorKind> {
	match key {
		Key::Field(name) => record.field_mut(name).ok_or(TraverseErrorKind::FieldNotFound),
		Key::Index(index) => {
			let len = record.fields.len();
			usize::try_from(*index)
				.ok()
				.and_then(|position| record.fields.get_mut(position))
				.map(|field| &mut field.value)
				.ok_or(TraverseErrorKind::FieldIndexOutOfRange { index: *index, len })
		}
	}
}

/// Leaf addressed by `path`, with default options.
pub fn retrieve<'v>(root: &'v Value, path: &Path) -> Result<Cow<'v, Value>, TraverseError> {
	Traverser::default().retrieve(root, path)
}
