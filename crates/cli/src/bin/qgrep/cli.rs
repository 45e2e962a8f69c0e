//! Argument parsing and output formatting for the qgrep binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde_json::json;

use crate::workflow::SearchOutcome;

/// Quick substring search across workspace text files.
#[derive(Debug, Parser)]
#[command(name = "qgrep", version, about)]
pub struct Cli {
	/// Literal pattern to search for.
	pub pattern: String,

	/// Root directory to search.
	#[arg(default_value = ".")]
	pub root: PathBuf,

	/// Match case-sensitively.
	#[arg(short = 's', long)]
	pub case_sensitive: bool,

	/// Comma-separated path fragments restricting the scope, e.g.
	/// "src/, *.md, !target".
	#[arg(long)]
	pub scope: Option<String>,

	/// Stop after this many results.
	#[arg(long, default_value_t = 200)]
	pub max_results: usize,

	/// Truncate reported lines to this many characters.
	#[arg(long, default_value_t = 1000)]
	pub max_line_len: usize,

	/// Cancel the search after this many milliseconds.
	#[arg(long)]
	pub deadline_ms: Option<u64>,

	/// Output format.
	#[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
	pub output: OutputFormat,
}

/// How results are printed once the search settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	Plain,
	Json,
}

pub fn parse_cli() -> Cli {
	Cli::parse()
}

/// Print `file:line: text` rows in the order the engine reported them.
pub fn print_plain(outcome: &SearchOutcome) {
	for item in &outcome.items {
		println!(
			"{}:{}: {}",
			item.file.display(),
			item.line_number,
			item.text
		);
	}
	if !outcome.complete {
		eprintln!("(search stopped early after {} ms)", outcome.elapsed_ms);
	}
}

/// Print the outcome as a single JSON document.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn print_json(outcome: &SearchOutcome) -> anyhow::Result<()> {
	let document = json!({
		"items": outcome.items,
		"elapsed_ms": outcome.elapsed_ms,
		"complete": outcome.complete,
	});
	println!("{}", serde_json::to_string_pretty(&document)?);
	Ok(())
}
