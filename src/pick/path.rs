use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
	/// Named field or map key.
	Field(String),
	/// Position; negative counts from the end of a sequence.
	Index(i64),
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Field(name) => f.write_str(name),
			Self::Index(index) => write!(f, "[{index}]"),
		}
	}
}

impl From<&str> for Key {
	fn from(name: &str) -> Self {
		Self::Field(name.to_owned())
	}
}

impl From<String> for Key {
	fn from(name: String) -> Self {
		Self::Field(name)
	}
}

impl From<i64> for Key {
	fn from(index: i64) -> Self {
		Self::Index(index)
	}
}

/// Which part of a path was malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathErrorKind {
	/// Structural error, such as a stray `]` or a name glued to an index.
	#[error("invalid path format")]
	InvalidFormat,
	/// Empty or invalid name segment.
	#[error("invalid format for name")]
	InvalidFormatForName,
	/// Malformed `[...]` segment.
	#[error("invalid format for index")]
	InvalidFormatForIndex,
}

/// Path text that did not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset} in path {input:?}")]
pub struct PathParseError {
	/// Failure category.
	pub kind: PathErrorKind,
	/// Path text as given.
	pub input: String,
	/// Byte offset of the offending character.
	pub offset: usize,
}

/// Ordered steps into a value tree; empty addresses the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
	/// Steps in traversal order.
	pub keys: Vec<Key>,
}

impl Path {
	/// Path addressing the root itself.
	pub fn root() -> Self {
		Self::default()
	}

	/// Parse dotted names with `[index]` selectors, e.g. `items.2023-01-01[4].name`.
	///
	/// A leading `.` is accepted and dropped. Names run until `.`, `[`, `]` or a
	/// control character; indices are decimal with an optional `-`.
	pub fn parse(input: &str) -> Result<Self, PathParseError> {
		let fail = |kind, offset| PathParseError {
			kind,
			input: input.to_owned(),
			offset,
		};

		let mut keys = Vec::new();
		let mut chars = input.char_indices().peekable();

		while let Some(&(offset, ch)) = chars.peek() {
			match ch {
				'.' => {
					chars.next();
					match chars.peek() {
						None => return Err(fail(PathErrorKind::InvalidFormatForName, input.len())),
						Some(&(next, c)) if !is_name_char(c) => return Err(fail(PathErrorKind::InvalidFormatForName, next)),
						Some(_) => keys.push(Key::Field(read_name(input, &mut chars))),
					}
				}
				'[' => {
					chars.next();
					let start = offset + 1;
					let Some(end) = chars.by_ref().find(|&(_, c)| c == ']').map(|(end, _)| end) else {
						return Err(fail(PathErrorKind::InvalidFormatForIndex, offset));
					};
					let index = parse_index(&input[start..end]).ok_or_else(|| fail(PathErrorKind::InvalidFormatForIndex, start))?;
					keys.push(Key::Index(index));
				}
				']' => return Err(fail(PathErrorKind::InvalidFormat, offset)),
				c if c.is_control() => return Err(fail(PathErrorKind::InvalidFormatForName, offset)),
				_ if !keys.is_empty() => return Err(fail(PathErrorKind::InvalidFormat, offset)),
				_ => keys.push(Key::Field(read_name(input, &mut chars))),
			}
		}

		Ok(Self { keys })
	}

	/// Number of steps.
	pub fn len(&self) -> usize {
		self.keys.len()
	}

	/// Whether this addresses the root.
	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	/// Append a step.
	pub fn push(&mut self, key: impl Into<Key>) {
		self.keys.push(key.into());
	}

	/// Builder form of [`push`](Self::push) for a field step.
	pub fn field(mut self, name: impl Into<String>) -> Self {
		self.keys.push(Key::Field(name.into()));
		self
	}

	/// Builder form of [`push`](Self::push) for an index step.
	pub fn index(mut self, index: i64) -> Self {
		self.keys.push(Key::Index(index));
		self
	}

	/// Steps in order.
	pub fn iter(&self) -> std::slice::Iter<'_, Key> {
		self.keys.iter()
	}

	/// First `len` steps; the whole path when it is shorter.
	pub fn prefix(&self, len: usize) -> Path {
		Path {
			keys: self.keys[..len.min(self.keys.len())].to_vec(),
		}
	}

	/// Text of the first `len` steps.
	pub fn format_prefix(&self, len: usize) -> String {
		let mut out = String::new();
		for (position, key) in self.keys.iter().take(len).enumerate() {
			if position > 0 && matches!(key, Key::Field(_)) {
				out.push('.');
			}
			out.push_str(&key.to_string());
		}
		out
	}
}

fn is_name_char(c: char) -> bool {
	!matches!(c, '.' | '[' | ']') && !c.is_control()
}

fn read_name(input: &str, chars: &mut Peekable<CharIndices<'_>>) -> String {
	let Some(&(start, _)) = chars.peek() else {
		return String::new();
	};
	let mut end = input.len();
	while let Some(&(offset, c)) = chars.peek() {
		if !is_name_char(c) {
			end = offset;
			break;
		}
		chars.next();
	}
	input[start..end].to_owned()
}

fn parse_index(body: &str) -> Option<i64> {
	let digits = body.strip_prefix('-').unwrap_or(body);
	if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
		return None;
	}
	body.parse().ok()
}

impl fmt::Display for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.format_prefix(self.keys.len()))
	}
}

impl FromStr for Path {
	type Err = PathParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl From<Vec<Key>> for Path {
	fn from(keys: Vec<Key>) -> Self {
		Self { keys }
	}
}

impl<'a> IntoIterator for &'a Path {
	type Item = &'a Key;
	type IntoIter = std::slice::Iter<'a, Key>;

	fn into_iter(self) -> Self::IntoIter {
		self.keys.iter()
	}
}

impl Serialize for Path {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Path {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let text = String::deserialize(deserializer)?;
		Self::parse(&text).map_err(serde::de::Error::custom)
	}
}
