//! Deterministic scan ordering derived from an external priority function.

use std::path::{Path, PathBuf};

/// Capability trait ranking candidate files for scan order.
///
/// Smaller ranks scan earlier, so under a bounded result count or time
/// budget the most contextually relevant matches are the ones that get
/// reported. Implementations may consult arbitrary session context (the
/// active editor, recent files); the engine snapshots each file's rank once
/// at scan start and never re-ranks mid-scan.
pub trait PriorityFn: Send {
	/// Rank for `path`; smaller values are scanned first.
	fn rank(&self, path: &Path) -> i64;
}

impl<F> PriorityFn for F
where
	F: Fn(&Path) -> i64 + Send,
{
	fn rank(&self, path: &Path) -> i64 {
		self(path)
	}
}

/// Order `files` by `(rank, path)`.
///
/// Ties on rank break on lexicographic path order, so scan order — and
/// therefore the order results stream in — is reproducible for a fixed
/// file set and priority function, independent of input order.
#[must_use]
pub fn order(files: Vec<PathBuf>, priority: &dyn PriorityFn) -> Vec<PathBuf> {
	let mut ranked: Vec<(i64, PathBuf)> = files
		.into_iter()
		.map(|path| (priority.rank(&path), path))
		.collect();
	ranked.sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
	ranked.into_iter().map(|(_, path)| path).collect()
}
