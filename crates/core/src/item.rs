//! Line-level search hits and their identity rule.

use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

/// One matching line reported by the engine.
///
/// The stored text may have been truncated for display, but
/// `line_start_offset` always refers to the untruncated file, so highlight
/// offsets computed against the original line stay valid. Items are never
/// mutated in place; a sink `update` means "re-render, identity unchanged".
#[derive(Clone, Debug, Serialize)]
pub struct LineItem {
	/// File the line belongs to.
	pub file: Arc<Path>,
	/// 1-based line number within the file.
	pub line_number: u32,
	/// Byte offset of the line start within the untruncated file.
	pub line_start_offset: u64,
	/// Raw line content, possibly truncated to the configured maximum
	/// length.
	pub text: String,
}

impl LineItem {
	/// Create a hit record for the given file position.
	#[must_use]
	pub fn new(file: Arc<Path>, line_number: u32, line_start_offset: u64, text: String) -> Self {
		Self {
			file,
			line_number,
			line_start_offset,
			text,
		}
	}
}

/// Identity for add/remove bookkeeping is `(file, line_start_offset)`: two
/// hits at the same file position are the same logical item even if their
/// displayed texts differ after truncation.
impl PartialEq for LineItem {
	fn eq(&self, other: &Self) -> bool {
		self.line_start_offset == other.line_start_offset && self.file == other.file
	}
}

impl Eq for LineItem {}

impl Hash for LineItem {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.file.hash(state);
		self.line_start_offset.hash(state);
	}
}
