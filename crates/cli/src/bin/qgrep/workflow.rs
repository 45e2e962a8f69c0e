//! Wires the engine to a collecting sink and drives one search to
//! completion.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use qgrep_core::{
	EngineStatus, LineItem, Query, ScopeFilter, SearchEngine, SearchSink, WorkspaceFiles,
};

use crate::cli::Cli;

/// Final result set of one command-line search.
pub struct SearchOutcome {
	/// Matches in the order the engine reported them.
	pub items: Vec<LineItem>,
	/// Wall-clock milliseconds the scan ran for.
	pub elapsed_ms: u64,
	/// False when the deadline cancelled the search before it settled.
	pub complete: bool,
}

/// Sink that accumulates reported items behind a lock shared with the main
/// thread.
#[derive(Clone, Default)]
struct CollectingSink {
	items: Arc<Mutex<Vec<LineItem>>>,
}

impl SearchSink for CollectingSink {
	fn clear(&mut self) {
		self.items.lock().expect("result set poisoned").clear();
	}

	fn add(&mut self, item: &LineItem) {
		self.items
			.lock()
			.expect("result set poisoned")
			.push(item.clone());
	}

	fn remove(&mut self, item: &LineItem) {
		self.items
			.lock()
			.expect("result set poisoned")
			.retain(|held| held != item);
	}

	fn update(&mut self, _item: &LineItem) {}
}

/// One configured search run: engine plus the shared result set.
pub struct SearchWorkflow {
	engine: SearchEngine,
	items: Arc<Mutex<Vec<LineItem>>>,
	deadline: Option<Duration>,
}

impl SearchWorkflow {
	/// Build an engine for the parsed command line.
	///
	/// # Errors
	///
	/// Returns an error for invalid bounds such as `--max-results 0`.
	pub fn from_cli(cli: &Cli) -> Result<Self> {
		let sink = CollectingSink::default();
		let items = Arc::clone(&sink.items);

		let mut engine = SearchEngine::new(
			Query::new(cli.pattern.clone(), cli.case_sensitive),
			WorkspaceFiles::new(&cli.root),
			depth_priority,
			cli.max_line_len,
			sink,
		);
		engine
			.set_max_results(cli.max_results)
			.context("invalid --max-results")?;
		if let Some(scope) = &cli.scope {
			engine.set_scope(ScopeFilter::parse(scope));
		}

		Ok(Self {
			engine,
			items,
			deadline: cli.deadline_ms.map(Duration::from_millis),
		})
	}

	/// Poll the engine until it settles or the deadline passes, then
	/// collect the outcome.
	///
	/// # Errors
	///
	/// Currently infallible; kept fallible for parity with the setup path.
	pub fn run(mut self) -> Result<SearchOutcome> {
		let deadline = self.deadline.map(|limit| Instant::now() + limit);

		while self.engine.is_active() {
			if let Some(deadline) = deadline
				&& Instant::now() >= deadline
			{
				self.engine.cancel();
				// Give the worker a moment to observe the cancellation
				// before snapshotting the result set.
				thread::sleep(Duration::from_millis(20));
				break;
			}
			thread::sleep(Duration::from_millis(5));
		}

		let complete = self.engine.status() != EngineStatus::Cancelled;
		let elapsed_ms = self.engine.elapsed_ms();
		let items = self
			.items
			.lock()
			.expect("result set poisoned")
			.clone();

		Ok(SearchOutcome {
			items,
			elapsed_ms,
			complete,
		})
	}
}

/// Default priority heuristic: shallow files first, so top-level matches
/// stream before deeply nested ones when results are bounded.
fn depth_priority(path: &Path) -> i64 {
	i64::try_from(path.components().count()).unwrap_or(i64::MAX)
}
