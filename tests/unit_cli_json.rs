#![allow(missing_docs)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

const DOCUMENT: &str = r#"{"item":{"three":["element 1",2,"element 3"]},"float":2.12,"stamp":1700000000000,"wait":"8ms"}"#;

#[test]
fn get_json_output_is_valid_and_structured() {
	let json = run_json(&["get", "-", "item.three[1]", "--as", "String", "--json"], DOCUMENT);

	assert_eq!(json["path"], "item.three[1]");
	assert_eq!(json["target"], "String");
	assert_eq!(json["type"], "String");
	assert_eq!(json["value"], "2");
}

#[test]
fn get_json_output_normalizes_the_path() {
	let json = run_json(&["get", "-", ".item.three[-1]", "--json"], DOCUMENT);

	assert_eq!(json["path"], "item.three[-1]");
	assert_eq!(json["target"], Value::Null);
	assert_eq!(json["value"], "element 3");
}

#[test]
fn get_plain_output_prints_the_leaf() {
	let output = run(&["get", "-", ".item.three[-1]"], DOCUMENT);
	assert!(output.status.success(), "command should succeed");
	assert_eq!(String::from_utf8_lossy(&output.stdout).trim_end(), "element 3");
}

#[test]
fn get_converts_instants_with_config_options() {
	let config = std::env::temp_dir().join(format!("anypick-config-{}.json", std::process::id()));
	std::fs::write(&config, r#"{"instant":{"number_format":"unix_milli"}}"#).expect("config written");

	let config_arg = config.display().to_string();
	let json = run_json(&["get", "-", "stamp", "--as", "instant", "--config", &config_arg, "--json"], DOCUMENT);
	let _ = std::fs::remove_file(&config);

	assert_eq!(json["type"], "DateTime<Utc>");
	assert_eq!(json["value"], "2023-11-14T22:13:20Z");
}

#[test]
fn get_reports_conversion_failures() {
	let output = run(&["get", "-", "float", "--as", "i64"], DOCUMENT);
	assert!(!output.status.success(), "command should fail");
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.starts_with("error: cannot convert f64 2.12 to i64"), "unexpected stderr: {stderr}");
}

#[test]
fn get_reports_missing_fields_with_prefix() {
	let output = run(&["get", "-", "item.four.five"], DOCUMENT);
	assert!(!output.status.success(), "command should fail");
	assert_eq!(String::from_utf8_lossy(&output.stderr).trim_end(), "error: item.four: field not found");
}

#[test]
fn steps_json_lists_fields_and_indices() {
	let json = run_json(&["steps", ".a.b[-2].c", "--json"], "");

	assert_eq!(json["path"], "a.b[-2].c");
	assert_eq!(json["steps"], serde_json::json!([{"field": "a"}, {"field": "b"}, {"index": -2}, {"field": "c"}]));
}

#[test]
fn steps_rejects_malformed_paths() {
	let output = run(&["steps", "[154].asd["], "");
	assert!(!output.status.success(), "command should fail");
	assert!(String::from_utf8_lossy(&output.stderr).contains("invalid format for index"));
}

#[test]
fn set_prints_updated_document() {
	let json = run_json(&["set", "-", "item.three[0]", r#"{"nested":true}"#], DOCUMENT);

	assert_eq!(json["item"]["three"][0], serde_json::json!({"nested": true}));
	assert_eq!(json["item"]["three"][2], "element 3");
	assert_eq!(json["wait"], "8ms");
}

fn run_json(args: &[&str], stdin: &str) -> Value {
	let output = run(args, stdin);
	assert!(output.status.success(), "command should succeed: {}", String::from_utf8_lossy(&output.stderr));
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

fn run(args: &[&str], stdin: &str) -> Output {
	let mut child = Command::new(env!("CARGO_BIN_EXE_anypick"))
		.args(args)
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
		.expect("command spawns");
	child.stdin.take().expect("stdin piped").write_all(stdin.as_bytes()).expect("stdin written");
	child.wait_with_output().expect("command executes")
}
