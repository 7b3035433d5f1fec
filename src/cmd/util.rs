use std::io::Read;
use std::path::Path;

use anypick::pick::{ConvertOptions, JsonNumbers, Result, Value};

/// Read a JSON document from `source`, or from stdin when it is `-`.
pub(crate) fn read_document(source: &Path, numbers: JsonNumbers) -> Result<Value> {
	let text = if source.as_os_str() == "-" {
		let mut text = String::new();
		std::io::stdin().read_to_string(&mut text)?;
		text
	} else {
		std::fs::read_to_string(source)?
	};
	log::debug!("read {} bytes from {}", text.len(), source.display());
	Ok(Value::parse_json(&text, numbers)?)
}

/// Conversion options from a JSON file; defaults when no file is given.
pub(crate) fn load_options(config: Option<&Path>) -> Result<ConvertOptions> {
	let Some(config) = config else {
		return Ok(ConvertOptions::default());
	};
	let text = std::fs::read_to_string(config)?;
	Ok(serde_json::from_str(&text)?)
}

/// Print `json` pretty-printed on stdout.
pub(crate) fn print_json(json: &serde_json::Value) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(json)?);
	Ok(())
}

/// Plain-text rendering of a value: strings unquoted, everything else as compact JSON.
pub(crate) fn render_plain(value: &Value) -> String {
	match value.to_json() {
		serde_json::Value::String(text) => text,
		other => other.to_string(),
	}
}
