//! File enumeration and content access consumed by the engine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// Capability trait supplying the candidate file set and file contents.
///
/// Implementations can fabricate file sets for tests or forward to the OS
/// with `.gitignore` support. Content is re-read on every scan; the engine
/// never caches it across scans.
pub trait FileProvider: Send {
	/// Enumerate the candidate files for one scan.
	///
	/// # Errors
	///
	/// Returns an error when the candidate set cannot be enumerated at
	/// all; per-file problems should instead surface from
	/// [`read_text`](FileProvider::read_text).
	fn files(&self) -> io::Result<Vec<PathBuf>>;

	/// Read the full text of one candidate file.
	///
	/// # Errors
	///
	/// Returns an error when the file cannot be read or does not hold
	/// searchable text; the engine skips the file and continues.
	fn read_text(&self, path: &Path) -> io::Result<String>;
}

/// Number of leading bytes sniffed for NUL when deciding whether a file is
/// binary.
const BINARY_SNIFF_LEN: usize = 8192;

/// OS-backed provider rooted at a directory.
///
/// Enumeration honours `.gitignore` defaults via the `ignore` crate and
/// yields paths relative to the root; reads reject binary and non-UTF-8
/// content so the engine only ever scans text.
pub struct WorkspaceFiles {
	root: PathBuf,
}

impl WorkspaceFiles {
	/// Create a provider for the tree rooted at `root`.
	#[must_use]
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}
}

impl FileProvider for WorkspaceFiles {
	fn files(&self) -> io::Result<Vec<PathBuf>> {
		let mut builder = WalkBuilder::new(&self.root);
		builder
			.hidden(true)
			.git_ignore(true)
			.git_global(true)
			.git_exclude(true)
			.ignore(true)
			.parents(true);

		let mut files = Vec::new();
		for entry in builder.build() {
			let entry = match entry {
				Ok(entry) => entry,
				Err(err) => {
					tracing::debug!(%err, "skipping unwalkable entry");
					continue;
				}
			};
			let Some(file_type) = entry.file_type() else {
				continue;
			};
			if !file_type.is_file() {
				continue;
			}
			let path = entry.into_path();
			let relative = path
				.strip_prefix(&self.root)
				.map(Path::to_path_buf)
				.unwrap_or(path);
			files.push(relative);
		}
		Ok(files)
	}

	fn read_text(&self, path: &Path) -> io::Result<String> {
		let full = if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.root.join(path)
		};
		let bytes = fs::read(full)?;
		if bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0) {
			return Err(io::Error::new(
				io::ErrorKind::InvalidData,
				"binary content",
			));
		}
		String::from_utf8(bytes)
			.map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "not valid UTF-8"))
	}
}
