use std::path::PathBuf;

use anypick::pick::{JsonNumbers, Path, Result, Traverser, Value};

use crate::cmd::util::{print_json, read_document};

#[derive(clap::Args)]
pub struct Args {
	/// JSON document, or `-` for stdin.
	pub file: PathBuf,
	/// Path of the slot to store into.
	pub path: String,
	/// JSON text of the value to store.
	pub value: String,
}

/// Store a JSON value at a path and print the updated document.
pub fn run(args: Args) -> Result<()> {
	let path = Path::parse(&args.path)?;
	let value = Value::parse_json(&args.value, JsonNumbers::Native)?;
	let mut root = read_document(&args.file, JsonNumbers::Native)?;

	Traverser::default().set(&mut root, &path, value)?;
	log::debug!("stored value at {path}");
	print_json(&root.to_json())
}
