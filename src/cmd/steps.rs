use anypick::pick::{Key, Path, Result};
use serde_json::json;

use crate::cmd::util::print_json;

#[derive(clap::Args)]
pub struct Args {
	/// Path text to parse.
	pub path: String,
	#[arg(long)]
	pub json: bool,
}

/// Parse a path and print its normalized form and steps.
pub fn run(args: Args) -> Result<()> {
	let path = Path::parse(&args.path)?;

	if args.json {
		let steps: Vec<serde_json::Value> = path.iter().map(step_json).collect();
		return print_json(&json!({
			"path": path.to_string(),
			"steps": steps,
		}));
	}

	println!("path: {path}");
	println!("steps: {}", path.len());
	println!("idx\tkind\tkey");
	for (idx, key) in path.iter().enumerate() {
		match key {
			Key::Field(name) => println!("{idx}\tfield\t{name}"),
			Key::Index(index) => println!("{idx}\tindex\t{index}"),
		}
	}
	Ok(())
}

fn step_json(key: &Key) -> serde_json::Value {
	match key {
		Key::Field(name) => json!({ "field": name }),
		Key::Index(index) => json!({ "index": index }),
	}
}
