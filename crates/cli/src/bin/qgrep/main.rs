//! Command-line entry point for the qgrep quick-search engine.

mod cli;
mod workflow;

use anyhow::Result;
use cli::{OutputFormat, parse_cli, print_json, print_plain};
use tracing_subscriber::EnvFilter;
use workflow::SearchWorkflow;

fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.init();

	let cli = parse_cli();
	let workflow = SearchWorkflow::from_cli(&cli)?;
	let outcome = workflow.run()?;

	match cli.output {
		OutputFormat::Plain => print_plain(&outcome),
		OutputFormat::Json => print_json(&outcome)?,
	}

	Ok(())
}
