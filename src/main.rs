#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "anypick", about = "Pick and convert leaves of JSON documents by path")]
struct Cli {
	/// Raise the default log filter to `debug`.
	#[arg(short, long, global = true)]
	verbose: bool,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Retrieve the leaf at a path, optionally converting it.
	Get(cmd::get::Args),
	/// Parse a path and print its steps.
	Steps(cmd::steps::Args),
	/// Store a JSON value at a path and print the updated document.
	Set(cmd::set::Args),
}

fn main() {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn init_logging(verbose: bool) {
	let default_filter = if verbose { "debug" } else { "warn" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
		.format_timestamp(None)
		.init();
}

fn run(command: Commands) -> anypick::pick::Result<()> {
	match command {
		Commands::Get(args) => cmd::get::run(args),
		Commands::Steps(args) => cmd::steps::run(args),
		Commands::Set(args) => cmd::set::run(args),
	}
}
