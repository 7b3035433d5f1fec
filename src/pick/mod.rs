mod convert;
mod error;
mod foreign;
mod json;
mod kind;
mod path;
mod picker;
mod traverse;
mod value;

/// Conversion engine, its options, and typed entry points.
pub use convert::{
	BytesFormat, Convert, ConvertError, ConvertErrorKind, ConvertOptions, Converter, DurationOptions, DurationUnit, InstantOptions, InstantUnit, Partial, Target,
	TimeFormat, TypeDesc, TypeRegistry, TypeShape, convert, encode_instant_binary, parse_duration,
};
/// Error and result aliases.
pub use error::{PickError, Result};
/// Caller-defined values outside the core alphabet.
pub use foreign::{Foreign, ForeignValue};
/// JSON decoding options.
pub use json::JsonNumbers;
/// Primitive kinds and their Rust counterparts.
pub use kind::{Primitive, PrimitiveKind, Scalar};
/// Path notation.
pub use path::{Key, Path, PathErrorKind, PathParseError};
/// One-call parse, retrieve, and convert.
pub use picker::{Picker, pick};
/// Tree traversal and narrow mutation.
pub use traverse::{TraverseError, TraverseErrorKind, TraverseOptions, Traverser, retrieve};
/// Dynamic value tree.
pub use value::{Array, KeyedMap, MapKey, Record, RecordField, Value};
