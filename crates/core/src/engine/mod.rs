//! Search engine orchestration: scan lifecycle, refinement, cancellation.
//!
//! One [`SearchEngine`] instance owns one logical "current search". A
//! dedicated worker thread executes scan and refine passes and is the only
//! caller of the consumer sink, so sink callbacks are strictly sequential.
//! The caller's handle decides, per query change, whether the held result
//! set can be refined in place or a fresh scan generation must start; a
//! shared generation counter lets in-flight passes notice they have been
//! superseded and stop without leaking stale callbacks.

mod worker;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::priority::PriorityFn;
use crate::provider::FileProvider;
use crate::query::Query;
use crate::scope::ScopeFilter;
use crate::sink::SearchSink;
use worker::Worker;

/// Result bound applied until [`SearchEngine::set_max_results`] overrides
/// it.
pub const DEFAULT_MAX_RESULTS: usize = 200;

/// Errors rejected by engine configuration setters. The previous
/// configuration stays in effect when a setter fails.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The result bound must be at least one.
	#[error("max results must be greater than zero")]
	InvalidMaxResults,
}

/// Lifecycle state of the engine's current search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
	/// No pass in flight.
	Idle,
	/// A scan or refine pass is running on the worker.
	Scanning,
	/// The last pass was cancelled and no new one has started.
	Cancelled,
}

/// Commands processed by the worker thread.
enum Command {
	/// Run a full scan for the stamped generation.
	Scan {
		generation: u64,
		query: Query,
		scope: ScopeFilter,
	},
	/// Re-filter the held result set against a refined query.
	Refine { generation: u64, query: Query },
	/// Stop the worker thread.
	Shutdown,
}

/// Wall-clock bookkeeping for the current or most recent scan.
#[derive(Default)]
struct ScanClock {
	started: Option<Instant>,
	total: Duration,
}

/// State shared between the caller's handle and the worker thread.
struct EngineShared {
	latest_generation: AtomicU64,
	pending: AtomicUsize,
	result_count: AtomicUsize,
	max_results: AtomicUsize,
	refinable: AtomicBool,
	cancelled: AtomicBool,
	current_file: Mutex<Option<PathBuf>>,
	clock: Mutex<ScanClock>,
}

impl EngineShared {
	fn new(max_results: usize) -> Self {
		Self {
			latest_generation: AtomicU64::new(0),
			pending: AtomicUsize::new(0),
			result_count: AtomicUsize::new(0),
			max_results: AtomicUsize::new(max_results),
			refinable: AtomicBool::new(false),
			cancelled: AtomicBool::new(false),
			current_file: Mutex::new(None),
			clock: Mutex::new(ScanClock::default()),
		}
	}

	/// Whether `generation` has been superseded by a newer request.
	fn superseded(&self, generation: u64) -> bool {
		self.latest_generation.load(AtomicOrdering::Acquire) != generation
	}

	fn begin_scan(&self) {
		self.result_count.store(0, AtomicOrdering::Release);
		self.set_current_file(None);
		let mut clock = self.clock.lock().expect("engine clock poisoned");
		clock.started = Some(Instant::now());
	}

	/// `complete` is true only when the scan covered every candidate:
	/// capped, cancelled, and superseded scans hold a partial result set
	/// that a later refine pass must not trust.
	fn finish_scan(&self, complete: bool) {
		self.refinable.store(complete, AtomicOrdering::Release);
		if complete {
			self.set_current_file(None);
		}
		let mut clock = self.clock.lock().expect("engine clock poisoned");
		if let Some(started) = clock.started.take() {
			clock.total = started.elapsed();
		}
	}

	fn begin_refine(&self) {
		self.refinable.store(false, AtomicOrdering::Release);
	}

	fn finish_refine(&self, kept: usize, complete: bool) {
		self.result_count.store(kept, AtomicOrdering::Release);
		self.refinable.store(complete, AtomicOrdering::Release);
	}

	fn set_current_file(&self, file: Option<PathBuf>) {
		*self.current_file.lock().expect("engine state poisoned") = file;
	}

	/// Count one reported match; returns the new total.
	fn record_add(&self) -> usize {
		self.result_count.fetch_add(1, AtomicOrdering::AcqRel) + 1
	}

	fn capacity(&self) -> usize {
		self.max_results.load(AtomicOrdering::Acquire)
	}

	fn at_capacity(&self) -> bool {
		self.result_count.load(AtomicOrdering::Acquire) >= self.capacity()
	}

	fn finish_command(&self) {
		self.pending.fetch_sub(1, AtomicOrdering::AcqRel);
	}
}

/// Incremental, prioritized, cancellable search over a provider's files.
///
/// The handle is a self-contained value: it owns its worker thread, its
/// generation counter, and the current query and scope. Callers that swap
/// one live search for another hold and replace the handle themselves;
/// there is no ambient state. Dropping the handle shuts the worker down.
pub struct SearchEngine {
	command_tx: Sender<Command>,
	shared: Arc<EngineShared>,
	query: Query,
	scope: ScopeFilter,
	worker: Option<JoinHandle<()>>,
}

impl SearchEngine {
	/// Start a search for `query` over the provider's files.
	///
	/// Results stream to `sink` from a background worker, in priority
	/// order across files and line order within a file; `priority` is
	/// consulted once per file per scan. Reported line text is truncated
	/// to `max_line_len` characters, while offsets keep referring to the
	/// untruncated file. A trivial initial query starts the engine idle
	/// without any work or sink calls.
	pub fn new(
		query: Query,
		provider: impl FileProvider + 'static,
		priority: impl PriorityFn + 'static,
		max_line_len: usize,
		sink: impl SearchSink + 'static,
	) -> Self {
		let shared = Arc::new(EngineShared::new(DEFAULT_MAX_RESULTS));
		let (command_tx, command_rx) = mpsc::channel();
		let worker_shared = Arc::clone(&shared);
		let worker = thread::spawn(move || {
			Worker::new(
				Box::new(provider),
				Box::new(priority),
				Box::new(sink),
				max_line_len,
				worker_shared,
			)
			.run(command_rx);
		});

		let engine = Self {
			command_tx,
			shared,
			query,
			scope: ScopeFilter::default(),
			worker: Some(worker),
		};
		if !engine.query.is_trivial() {
			engine.submit_scan();
		}
		engine
	}

	/// Switch the engine to `query`.
	///
	/// With `force` the engine always rescans from zero; callers use this
	/// when the underlying files may have changed and cached matches
	/// cannot be trusted. Otherwise, when the new query refines the
	/// current one and the held result set is complete, the engine runs a
	/// refine pass instead: held items are re-tested against the new
	/// query, dropped ones are `remove`d, survivors are `update`d, and
	/// nothing is cleared or re-added. Any other change — including a
	/// trivial new query — starts a fresh scan generation.
	///
	/// The refine pass re-tests the stored line text, so a match that only
	/// existed beyond the truncation point is dropped with it.
	pub fn set_query(&mut self, query: Query, force: bool) {
		if !force && query == self.query && self.status() != EngineStatus::Cancelled {
			return;
		}
		let refine = !force
			&& !self.query.is_trivial()
			&& query.is_refinement_of(&self.query)
			&& self.is_done()
			&& self.shared.refinable.load(AtomicOrdering::Acquire);
		self.query = query.clone();
		if refine {
			let generation = self.shared.latest_generation.load(AtomicOrdering::Acquire);
			self.submit(Command::Refine { generation, query });
		} else {
			self.submit_scan();
		}
	}

	/// Replace the scope filter. Always forces a full rescan: narrowing
	/// could in principle be treated as a refinement, but rescanning is
	/// the simple policy that is always correct.
	pub fn set_scope(&mut self, scope: ScopeFilter) {
		self.scope = scope;
		self.submit_scan();
	}

	/// Bound the number of results a scan reports. The bound is re-read
	/// continuously while scanning, so lowering it mid-scan takes effect
	/// immediately.
	///
	/// # Errors
	///
	/// Rejects a zero bound, leaving the previous bound in effect.
	pub fn set_max_results(&mut self, max_results: usize) -> Result<(), ConfigError> {
		if max_results == 0 {
			return Err(ConfigError::InvalidMaxResults);
		}
		self.shared
			.max_results
			.store(max_results, AtomicOrdering::Release);
		Ok(())
	}

	/// Cooperatively stop any in-flight pass.
	///
	/// The running pass observes the supersession at its next check —
	/// between files, and between lines within a file — and stops without
	/// further sink calls. Calling this while idle is a no-op.
	pub fn cancel(&mut self) {
		if self.is_done() {
			return;
		}
		self.shared
			.latest_generation
			.fetch_add(1, AtomicOrdering::AcqRel);
		self.shared.refinable.store(false, AtomicOrdering::Release);
		self.shared.cancelled.store(true, AtomicOrdering::Release);
	}

	/// Current lifecycle state.
	#[must_use]
	pub fn status(&self) -> EngineStatus {
		if self.shared.cancelled.load(AtomicOrdering::Acquire) {
			EngineStatus::Cancelled
		} else if self.shared.pending.load(AtomicOrdering::Acquire) > 0 {
			EngineStatus::Scanning
		} else {
			EngineStatus::Idle
		}
	}

	/// Whether a scan or refine pass is in flight.
	#[must_use]
	pub fn is_active(&self) -> bool {
		self.status() == EngineStatus::Scanning
	}

	/// Whether the engine has settled; the complement of
	/// [`is_active`](SearchEngine::is_active).
	#[must_use]
	pub fn is_done(&self) -> bool {
		!self.is_active()
	}

	/// Number of results reported for the current search.
	#[must_use]
	pub fn result_count(&self) -> usize {
		self.shared.result_count.load(AtomicOrdering::Acquire)
	}

	/// File the scan is currently looking at, for progress display. After
	/// a scan that stopped early this keeps pointing at the last file it
	/// reached.
	#[must_use]
	pub fn current_file(&self) -> Option<PathBuf> {
		self.shared
			.current_file
			.lock()
			.expect("engine state poisoned")
			.clone()
	}

	/// Wall-clock milliseconds spent by the current scan, or by the most
	/// recent one once it settled.
	#[must_use]
	pub fn elapsed_ms(&self) -> u64 {
		let clock = self.shared.clock.lock().expect("engine clock poisoned");
		let elapsed = clock.started.map_or(clock.total, |started| started.elapsed());
		u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
	}

	fn submit_scan(&self) {
		let generation = self
			.shared
			.latest_generation
			.fetch_add(1, AtomicOrdering::AcqRel)
			+ 1;
		self.shared.cancelled.store(false, AtomicOrdering::Release);
		self.shared.refinable.store(false, AtomicOrdering::Release);
		self.submit(Command::Scan {
			generation,
			query: self.query.clone(),
			scope: self.scope.clone(),
		});
	}

	fn submit(&self, command: Command) {
		self.shared.pending.fetch_add(1, AtomicOrdering::AcqRel);
		if self.command_tx.send(command).is_err() {
			// Worker already gone; nothing will drain this command.
			self.shared.pending.fetch_sub(1, AtomicOrdering::AcqRel);
		}
	}
}

impl Drop for SearchEngine {
	fn drop(&mut self) {
		self.shared
			.latest_generation
			.fetch_add(1, AtomicOrdering::AcqRel);
		self.submit(Command::Shutdown);
		if let Some(worker) = self.worker.take() {
			let _ = worker.join();
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;
	use std::io;
	use std::path::Path;

	use super::*;
	use crate::item::LineItem;

	#[derive(Clone, Debug, PartialEq, Eq)]
	enum SinkEvent {
		Clear,
		Add(String),
		Remove(String),
		Update(String),
	}

	#[derive(Clone, Default)]
	struct RecordingSink {
		events: Arc<Mutex<Vec<SinkEvent>>>,
	}

	impl RecordingSink {
		fn push(&self, event: SinkEvent) {
			self.events.lock().unwrap().push(event);
		}
	}

	impl SearchSink for RecordingSink {
		fn clear(&mut self) {
			self.push(SinkEvent::Clear);
		}

		fn add(&mut self, item: &LineItem) {
			self.push(SinkEvent::Add(item.text.clone()));
		}

		fn remove(&mut self, item: &LineItem) {
			self.push(SinkEvent::Remove(item.text.clone()));
		}

		fn update(&mut self, item: &LineItem) {
			self.push(SinkEvent::Update(item.text.clone()));
		}
	}

	struct StaticProvider {
		files: BTreeMap<PathBuf, String>,
		read_delay: Duration,
	}

	impl StaticProvider {
		fn new(entries: &[(&str, &str)]) -> Self {
			let files = entries
				.iter()
				.map(|(path, text)| (PathBuf::from(path), (*text).to_string()))
				.collect();
			Self {
				files,
				read_delay: Duration::ZERO,
			}
		}

		fn with_read_delay(mut self, delay: Duration) -> Self {
			self.read_delay = delay;
			self
		}
	}

	impl FileProvider for StaticProvider {
		fn files(&self) -> io::Result<Vec<PathBuf>> {
			Ok(self.files.keys().cloned().collect())
		}

		fn read_text(&self, path: &Path) -> io::Result<String> {
			if !self.read_delay.is_zero() {
				thread::sleep(self.read_delay);
			}
			self.files
				.get(path)
				.cloned()
				.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "missing"))
		}
	}

	fn flat_priority() -> impl PriorityFn {
		|_: &Path| 0
	}

	fn wait_done(engine: &SearchEngine) {
		let deadline = Instant::now() + Duration::from_secs(5);
		while engine.is_active() {
			assert!(Instant::now() < deadline, "engine did not settle in time");
			thread::sleep(Duration::from_millis(2));
		}
	}

	fn recorded(events: &Arc<Mutex<Vec<SinkEvent>>>) -> Vec<SinkEvent> {
		events.lock().unwrap().clone()
	}

	#[test]
	fn trivial_query_engine_is_immediately_done_with_no_callbacks() {
		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let engine = SearchEngine::new(
			Query::new("", false),
			StaticProvider::new(&[("a.txt", "anything at all")]),
			flat_priority(),
			100,
			sink,
		);

		wait_done(&engine);
		assert!(engine.is_done());
		assert_eq!(engine.status(), EngineStatus::Idle);
		assert_eq!(engine.result_count(), 0);
		assert!(recorded(&events).is_empty());
	}

	#[test]
	fn full_scan_streams_adds_in_priority_order() {
		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let engine = SearchEngine::new(
			Query::new("match", true),
			StaticProvider::new(&[
				("a.txt", "match there"),
				("b.txt", "match here"),
				("c.txt", "nothing"),
			]),
			// a.txt is demoted, so b.txt streams first despite path order.
			|path: &Path| i64::from(path == Path::new("a.txt")),
			100,
			sink,
		);

		wait_done(&engine);
		assert_eq!(
			recorded(&events),
			vec![
				SinkEvent::Clear,
				SinkEvent::Add("match here".to_string()),
				SinkEvent::Add("match there".to_string()),
			]
		);
		assert_eq!(engine.result_count(), 2);
		assert_eq!(engine.current_file(), None);
	}

	#[test]
	fn refine_removes_dropped_items_and_updates_survivors() {
		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let mut engine = SearchEngine::new(
			Query::new("ab", true),
			StaticProvider::new(&[("f.txt", "abc line\nab line")]),
			flat_priority(),
			100,
			sink,
		);
		wait_done(&engine);
		assert_eq!(engine.result_count(), 2);

		engine.set_query(Query::new("abc", true), false);
		wait_done(&engine);

		let events = recorded(&events);
		assert_eq!(
			events,
			vec![
				SinkEvent::Clear,
				SinkEvent::Add("abc line".to_string()),
				SinkEvent::Add("ab line".to_string()),
				SinkEvent::Update("abc line".to_string()),
				SinkEvent::Remove("ab line".to_string()),
			]
		);
		assert_eq!(engine.result_count(), 1);
	}

	#[test]
	fn consecutive_refinements_keep_narrowing_without_rescans() {
		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let mut engine = SearchEngine::new(
			Query::new("a", true),
			StaticProvider::new(&[("f.txt", "abc\nabd\naxe")]),
			flat_priority(),
			100,
			sink,
		);
		wait_done(&engine);
		assert_eq!(engine.result_count(), 3);

		engine.set_query(Query::new("ab", true), false);
		wait_done(&engine);
		assert_eq!(engine.result_count(), 2);

		engine.set_query(Query::new("abd", true), false);
		wait_done(&engine);
		assert_eq!(engine.result_count(), 1);

		let clears = recorded(&events)
			.iter()
			.filter(|event| matches!(event, SinkEvent::Clear))
			.count();
		assert_eq!(clears, 1);
	}

	#[test]
	fn forced_rescan_clears_before_any_add() {
		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let mut engine = SearchEngine::new(
			Query::new("hit", true),
			StaticProvider::new(&[("a.txt", "hit once")]),
			flat_priority(),
			100,
			sink,
		);
		wait_done(&engine);

		engine.set_query(Query::new("hit", true), true);
		wait_done(&engine);

		assert_eq!(
			recorded(&events),
			vec![
				SinkEvent::Clear,
				SinkEvent::Add("hit once".to_string()),
				SinkEvent::Clear,
				SinkEvent::Add("hit once".to_string()),
			]
		);
	}

	#[test]
	fn superseded_generation_leaks_nothing_past_the_new_clear() {
		let mut entries = Vec::new();
		let contents: Vec<String> = (0..30)
			.map(|index| format!("alpha {index}\nomega {index}"))
			.collect();
		for (index, content) in contents.iter().enumerate() {
			entries.push((format!("f{index:02}.txt"), content.clone()));
		}
		let borrowed: Vec<(&str, &str)> = entries
			.iter()
			.map(|(path, text)| (path.as_str(), text.as_str()))
			.collect();

		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let mut engine = SearchEngine::new(
			Query::new("alpha", true),
			StaticProvider::new(&borrowed).with_read_delay(Duration::from_millis(2)),
			flat_priority(),
			100,
			sink,
		);
		engine.set_query(Query::new("omega", true), false);
		wait_done(&engine);

		let events = recorded(&events);
		let last_clear = events
			.iter()
			.rposition(|event| matches!(event, SinkEvent::Clear))
			.expect("the second generation must emit a clear");
		let tail: Vec<_> = events[last_clear + 1..].to_vec();
		assert_eq!(tail.len(), 30);
		for event in &tail {
			match event {
				SinkEvent::Add(text) => assert!(text.starts_with("omega")),
				other => panic!("unexpected event after final clear: {other:?}"),
			}
		}
		assert_eq!(engine.result_count(), 30);
	}

	#[test]
	fn result_bound_stops_the_scan_early() {
		let entries: Vec<(String, String)> = (0..10)
			.map(|index| (format!("f{index}.txt"), format!("match {index}")))
			.collect();
		let borrowed: Vec<(&str, &str)> = entries
			.iter()
			.map(|(path, text)| (path.as_str(), text.as_str()))
			.collect();

		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let mut engine = SearchEngine::new(
			Query::new("", true),
			StaticProvider::new(&borrowed),
			flat_priority(),
			100,
			sink,
		);
		engine.set_max_results(3).unwrap();
		engine.set_query(Query::new("match", true), false);
		wait_done(&engine);

		let adds = recorded(&events)
			.iter()
			.filter(|event| matches!(event, SinkEvent::Add(_)))
			.count();
		assert_eq!(adds, 3);
		assert_eq!(engine.result_count(), 3);
		// The capped scan stopped before the last candidate.
		assert!(engine.current_file().is_some());
	}

	#[test]
	fn zero_result_bound_is_rejected_and_leaves_the_old_bound() {
		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let mut engine = SearchEngine::new(
			Query::new("", true),
			StaticProvider::new(&[("a.txt", "match\nmatch\nmatch")]),
			flat_priority(),
			100,
			sink,
		);
		engine.set_max_results(2).unwrap();
		assert!(engine.set_max_results(0).is_err());

		engine.set_query(Query::new("match", true), false);
		wait_done(&engine);

		let adds = recorded(&events)
			.iter()
			.filter(|event| matches!(event, SinkEvent::Add(_)))
			.count();
		assert_eq!(adds, 2);
	}

	#[test]
	fn cancel_freezes_the_result_stream() {
		let entries: Vec<(String, String)> = (0..50)
			.map(|index| (format!("f{index:02}.txt"), format!("match {index}")))
			.collect();
		let borrowed: Vec<(&str, &str)> = entries
			.iter()
			.map(|(path, text)| (path.as_str(), text.as_str()))
			.collect();

		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let mut engine = SearchEngine::new(
			Query::new("match", true),
			StaticProvider::new(&borrowed).with_read_delay(Duration::from_millis(5)),
			flat_priority(),
			100,
			sink,
		);

		thread::sleep(Duration::from_millis(20));
		engine.cancel();
		assert!(engine.is_done());
		assert_eq!(engine.status(), EngineStatus::Cancelled);
		// Repeated cancellation of a settled engine is a no-op.
		engine.cancel();

		thread::sleep(Duration::from_millis(100));
		let settled = recorded(&events).len();
		thread::sleep(Duration::from_millis(100));
		assert_eq!(recorded(&events).len(), settled);
		assert!(engine.result_count() < 50);
	}

	#[test]
	fn scope_change_forces_a_fresh_scan() {
		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let mut engine = SearchEngine::new(
			Query::new("hit", true),
			StaticProvider::new(&[("src/a.txt", "hit a"), ("test/b.txt", "hit b")]),
			flat_priority(),
			100,
			sink,
		);
		wait_done(&engine);
		assert_eq!(engine.result_count(), 2);

		engine.set_scope(ScopeFilter::parse("src/"));
		wait_done(&engine);

		let events = recorded(&events);
		assert_eq!(
			&events[events.len() - 2..],
			&[SinkEvent::Clear, SinkEvent::Add("hit a".to_string())]
		);
		assert_eq!(engine.result_count(), 1);
	}

	#[test]
	fn trivial_new_query_clears_and_idles_immediately() {
		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let mut engine = SearchEngine::new(
			Query::new("hit", true),
			StaticProvider::new(&[("a.txt", "hit once\nhit twice")]),
			flat_priority(),
			100,
			sink,
		);
		wait_done(&engine);
		assert_eq!(engine.result_count(), 2);

		engine.set_query(Query::new("", true), false);
		wait_done(&engine);

		let events = recorded(&events);
		assert_eq!(events.last(), Some(&SinkEvent::Clear));
		assert_eq!(engine.result_count(), 0);
		assert_eq!(engine.status(), EngineStatus::Idle);
	}

	#[test]
	fn unchanged_query_without_force_is_a_no_op() {
		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let mut engine = SearchEngine::new(
			Query::new("hit", true),
			StaticProvider::new(&[("a.txt", "hit once")]),
			flat_priority(),
			100,
			sink,
		);
		wait_done(&engine);
		let settled = recorded(&events).len();

		engine.set_query(Query::new("hit", true), false);
		thread::sleep(Duration::from_millis(50));
		assert_eq!(recorded(&events).len(), settled);
	}

	#[test]
	fn refinement_after_a_capped_scan_rescans_instead() {
		let sink = RecordingSink::default();
		let events = Arc::clone(&sink.events);
		let mut engine = SearchEngine::new(
			Query::new("", true),
			StaticProvider::new(&[("f.txt", "abx\nabc\nabd")]),
			flat_priority(),
			100,
			sink,
		);
		engine.set_max_results(1).unwrap();
		engine.set_query(Query::new("ab", true), false);
		wait_done(&engine);
		assert_eq!(engine.result_count(), 1);

		// The held set is partial, so this refinement must not be answered
		// from it.
		engine.set_query(Query::new("abc", true), false);
		wait_done(&engine);

		let events = recorded(&events);
		assert_eq!(
			&events[events.len() - 2..],
			&[SinkEvent::Clear, SinkEvent::Add("abc".to_string())]
		);
	}

	#[test]
	fn truncated_text_keeps_offsets_anchored_to_the_file() {
		#[derive(Clone, Default)]
		struct CapturingSink {
			items: Arc<Mutex<Vec<LineItem>>>,
		}

		impl SearchSink for CapturingSink {
			fn clear(&mut self) {}
			fn add(&mut self, item: &LineItem) {
				self.items.lock().unwrap().push(item.clone());
			}
			fn remove(&mut self, _item: &LineItem) {}
			fn update(&mut self, _item: &LineItem) {}
		}

		let sink = CapturingSink::default();
		let items = Arc::clone(&sink.items);
		let engine = SearchEngine::new(
			Query::new("needle", true),
			StaticProvider::new(&[("a.txt", "first line\na needle in a very long line")]),
			flat_priority(),
			8,
			sink,
		);
		wait_done(&engine);

		let items = items.lock().unwrap();
		assert_eq!(items.len(), 1);
		let item = &items[0];
		assert_eq!(item.text, "a needle");
		assert_eq!(item.line_number, 2);
		// Offset of the second line in the untruncated file.
		assert_eq!(item.line_start_offset, 11);
	}
}
