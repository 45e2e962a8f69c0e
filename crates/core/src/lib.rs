//! Incremental, prioritized, cancellable quick search over workspace text
//! files.
//!
//! A [`SearchEngine`] owns one logical "current search": it scans candidate
//! files on a dedicated background worker, streams matching lines to a
//! [`SearchSink`] as they are found, and re-evaluates its work as the query
//! changes. When a new query is a strict textual extension of the previous
//! one, the engine re-filters the results it already holds instead of
//! rescanning the workspace, which keeps per-keystroke latency proportional
//! to the result count rather than the workspace size.
//!
//! ```no_run
//! use qgrep_core::{LineItem, Query, SearchEngine, SearchSink, WorkspaceFiles};
//!
//! struct Printer;
//!
//! impl SearchSink for Printer {
//! 	fn clear(&mut self) {}
//! 	fn add(&mut self, item: &LineItem) {
//! 		println!("{}:{}: {}", item.file.display(), item.line_number, item.text);
//! 	}
//! 	fn remove(&mut self, _item: &LineItem) {}
//! 	fn update(&mut self, _item: &LineItem) {}
//! }
//!
//! let mut engine = SearchEngine::new(
//! 	Query::new("needle", false),
//! 	WorkspaceFiles::new("."),
//! 	|_: &std::path::Path| 0,
//! 	1000,
//! 	Printer,
//! );
//! while !engine.is_done() {
//! 	std::thread::sleep(std::time::Duration::from_millis(5));
//! }
//! engine.set_query(Query::new("needles", false), false);
//! ```

pub mod engine;
pub mod item;
pub mod priority;
pub mod provider;
pub mod query;
pub mod scope;
pub mod sink;

pub use crate::engine::{ConfigError, DEFAULT_MAX_RESULTS, EngineStatus, SearchEngine};
pub use crate::item::LineItem;
pub use crate::priority::PriorityFn;
pub use crate::provider::{FileProvider, WorkspaceFiles};
pub use crate::query::{MatchRange, Query};
pub use crate::scope::ScopeFilter;
pub use crate::sink::SearchSink;
