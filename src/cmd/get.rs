use std::path::PathBuf;

use anypick::pick::{Converter, JsonNumbers, Path, Picker, Result, Target, TraverseOptions, Traverser};
use serde_json::json;

use crate::cmd::util::{load_options, print_json, read_document, render_plain};

#[derive(clap::Args)]
pub struct Args {
	/// JSON document, or `-` for stdin.
	pub file: PathBuf,
	/// Path to the leaf, e.g. `items[0].name`.
	pub path: String,
	/// Conversion target: a primitive (`i32`, `f64`, `String`, ...), `[kind]`, `bytes`, `instant` or `duration`.
	#[arg(long = "as")]
	pub target: Option<Target>,
	#[arg(long)]
	pub json: bool,
	/// How JSON numbers are carried: `native`, `float` or `lexeme`.
	#[arg(long, default_value = "native")]
	pub numbers: JsonNumbers,
	/// JSON file with conversion options.
	#[arg(long)]
	pub config: Option<PathBuf>,
	/// Return a terminal reference without following it.
	#[arg(long = "no-deref")]
	pub no_deref: bool,
}

/// Retrieve the leaf at a path and print it, converted when a target is given.
pub fn run(args: Args) -> Result<()> {
	let Args {
		file,
		path,
		target,
		json,
		numbers,
		config,
		no_deref,
	} = args;

	let path = Path::parse(&path)?;
	let options = load_options(config.as_deref())?;
	let root = read_document(&file, numbers)?;

	let traverser = Traverser::new(TraverseOptions { skip_terminal_deref: no_deref }).with_converter(Converter::new(options));
	let picker = Picker::new(traverser);

	let leaf = match target {
		Some(target) => picker.pick_value_at(&root, &path, target)?,
		None => picker.get_at(&root, &path)?.into_owned(),
	};

	if json {
		return print_json(&json!({
			"path": path.to_string(),
			"target": target.map(|target| target.to_string()),
			"type": leaf.type_name(),
			"value": leaf.to_json(),
		}));
	}

	println!("{}", render_plain(&leaf));
	Ok(())
}
