use std::borrow::Cow;

use crate::pick::{Convert, Converter, Path, Result, Target, Traverser, Value};

/// Parse, retrieve, and convert in one call.
///
/// Each phase keeps its own error variant in [`PickError`](crate::pick::PickError),
/// so callers can tell a missing field from a bad conversion.
#[derive(Debug, Clone, Default)]
pub struct Picker {
	/// Traverser; its converter also converts the retrieved leaf.
	pub traverser: Traverser,
}

impl Picker {
	/// Picker over `traverser`.
	pub fn new(traverser: Traverser) -> Self {
		Self { traverser }
	}

	/// Converter applied to retrieved leaves.
	pub fn converter(&self) -> &Converter {
		&self.traverser.converter
	}

	/// Leaf at `path` without conversion.
	pub fn get<'v>(&self, root: &'v Value, path: &str) -> Result<Cow<'v, Value>> {
		self.get_at(root, &Path::parse(path)?)
	}

	/// Leaf at an already parsed `path` without conversion.
	pub fn get_at<'v>(&self, root: &'v Value, path: &Path) -> Result<Cow<'v, Value>> {
		Ok(self.traverser.retrieve(root, path)?)
	}

	/// Leaf at `path` converted into `T`.
	pub fn pick<T: Convert>(&self, root: &Value, path: &str) -> Result<T> {
		let leaf = self.get(root, path)?;
		Ok(self.converter().convert_to(&leaf)?)
	}

	/// Like [`pick`](Self::pick), but a missing field yields `None`.
	pub fn pick_opt<T: Convert>(&self, root: &Value, path: &str) -> Result<Option<T>> {
		match self.pick(root, path) {
			Ok(value) => Ok(Some(value)),
			Err(err) if err.is_not_found() => Ok(None),
			Err(err) => Err(err),
		}
	}

	/// Like [`pick`](Self::pick), but recoverable conversion errors yield their best-effort value.
	pub fn pick_lossy<T: Convert>(&self, root: &Value, path: &str) -> Result<T> {
		let leaf = self.get(root, path)?;
		Ok(self.converter().convert_lossy(&leaf)?)
	}

	/// Leaf at `path` converted into `target`.
	pub fn pick_value(&self, root: &Value, path: &str, target: Target) -> Result<Value> {
		self.pick_value_at(root, &Path::parse(path)?, target)
	}

	/// Leaf at an already parsed `path` converted into `target`.
	pub fn pick_value_at(&self, root: &Value, path: &Path, target: Target) -> Result<Value> {
		let leaf = self.get_at(root, path)?;
		Ok(self.converter().convert_value(&leaf, target)?)
	}

	/// Elements of the sequence at `path`, each converted into `T`.
	pub fn pick_each<T: Convert>(&self, root: &Value, path: &str) -> Result<Vec<T>> {
		let path = Path::parse(path)?;
		let elements = self.traverser.elements(root, &path)?;
		let mut out = Vec::with_capacity(elements.len());
		for element in &elements {
			out.push(self.converter().convert_to(element)?);
		}
		Ok(out)
	}
}

/// Leaf at `path` converted into `T`, with default options.
pub fn pick<T: Convert>(root: &Value, path: &str) -> Result<T> {
	Picker::default().pick(root, path)
}
