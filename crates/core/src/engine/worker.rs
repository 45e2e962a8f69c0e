//! Scan and refine passes executed on the engine's worker thread.

use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use crate::item::LineItem;
use crate::priority::{self, PriorityFn};
use crate::provider::FileProvider;
use crate::query::Query;
use crate::scope::ScopeFilter;
use crate::sink::SearchSink;

use super::{Command, EngineShared};

/// Executes commands for one engine instance.
///
/// The worker owns the sink, so every callback is sequential by
/// construction: a superseded pass returns before the next command — and
/// therefore the next generation's `clear` — is processed, which is what
/// keeps stale callbacks from interleaving with a newer scan.
pub(super) struct Worker {
	provider: Box<dyn FileProvider>,
	priority: Box<dyn PriorityFn>,
	sink: Box<dyn SearchSink>,
	max_line_len: usize,
	shared: Arc<EngineShared>,
	matches: Vec<LineItem>,
}

impl Worker {
	pub(super) fn new(
		provider: Box<dyn FileProvider>,
		priority: Box<dyn PriorityFn>,
		sink: Box<dyn SearchSink>,
		max_line_len: usize,
		shared: Arc<EngineShared>,
	) -> Self {
		Self {
			provider,
			priority,
			sink,
			max_line_len,
			shared,
			matches: Vec::new(),
		}
	}

	pub(super) fn run(mut self, command_rx: Receiver<Command>) {
		while let Ok(command) = command_rx.recv() {
			let keep_going = self.handle(command);
			self.shared.finish_command();
			if !keep_going {
				break;
			}
		}
	}

	fn handle(&mut self, command: Command) -> bool {
		match command {
			Command::Scan {
				generation,
				query,
				scope,
			} => {
				self.run_scan(generation, &query, &scope);
				true
			}
			Command::Refine { generation, query } => {
				self.run_refine(generation, &query);
				true
			}
			Command::Shutdown => false,
		}
	}

	fn run_scan(&mut self, generation: u64, query: &Query, scope: &ScopeFilter) {
		if self.shared.superseded(generation) {
			return;
		}
		self.shared.begin_scan();
		self.sink.clear();
		self.matches.clear();
		if query.is_trivial() {
			self.shared.finish_scan(false);
			return;
		}

		tracing::info!(pattern = query.pattern(), "scan started");
		let files = match self.provider.files() {
			Ok(files) => files,
			Err(err) => {
				tracing::warn!(%err, "candidate enumeration failed");
				Vec::new()
			}
		};
		let candidates: Vec<PathBuf> = files
			.into_iter()
			.filter(|path| scope.matches(path))
			.collect();
		let ordered = priority::order(candidates, self.priority.as_ref());

		let mut complete = true;
		'files: for path in ordered {
			if self.shared.superseded(generation) || self.shared.at_capacity() {
				complete = false;
				break;
			}
			self.shared.set_current_file(Some(path.clone()));
			let text = match self.provider.read_text(&path) {
				Ok(text) => text,
				Err(err) => {
					tracing::debug!(path = %path.display(), %err, "skipping unreadable file");
					continue;
				}
			};

			let file: Arc<Path> = Arc::from(path.as_path());
			let mut line_start = 0u64;
			for (index, raw_line) in text.split('\n').enumerate() {
				if self.shared.superseded(generation) {
					complete = false;
					break 'files;
				}
				let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
				if query.find_first(line).is_some() {
					let item = LineItem::new(
						Arc::clone(&file),
						line_number(index),
						line_start,
						truncate_line(line, self.max_line_len),
					);
					self.sink.add(&item);
					self.matches.push(item);
					if self.shared.record_add() >= self.shared.capacity() {
						complete = false;
						break 'files;
					}
				}
				line_start += raw_line.len() as u64 + 1;
			}
		}

		self.shared.finish_scan(complete);
		tracing::info!(results = self.matches.len(), complete, "scan finished");
	}

	/// Re-test the held result set against a refined query.
	///
	/// Items that no longer match are removed; survivors are updated so
	/// consumers can refresh highlight ranges that moved with the longer
	/// pattern. The pass never clears and never adds, which is what makes
	/// typing-another-character O(result count) instead of O(workspace).
	fn run_refine(&mut self, generation: u64, query: &Query) {
		if self.shared.superseded(generation) {
			return;
		}
		self.shared.begin_refine();

		let items = mem::take(&mut self.matches);
		let mut aborted = false;
		for item in items {
			if aborted || self.shared.superseded(generation) {
				// Keep the unprocessed tail; the superseding scan clears
				// the sink either way.
				aborted = true;
				self.matches.push(item);
				continue;
			}
			if query.find_first(&item.text).is_some() {
				self.sink.update(&item);
				self.matches.push(item);
			} else {
				self.sink.remove(&item);
			}
		}

		self.shared.finish_refine(self.matches.len(), !aborted);
		if !aborted {
			tracing::debug!(
				pattern = query.pattern(),
				kept = self.matches.len(),
				"refined result set"
			);
		}
	}
}

fn line_number(index: usize) -> u32 {
	u32::try_from(index + 1).unwrap_or(u32::MAX)
}

/// Truncate to at most `max_len` characters, on a character boundary.
fn truncate_line(line: &str, max_len: usize) -> String {
	match line.char_indices().nth(max_len) {
		Some((cut, _)) => line[..cut].to_string(),
		None => line.to_string(),
	}
}
