//! Literal substring queries and the refinement relation between them.

use std::borrow::Cow;

use memchr::memmem::Finder;

/// Byte range of one match within a searched line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchRange {
	/// Byte offset of the match start within the searched text.
	pub offset: usize,
	/// Length of the match in bytes, always greater than zero.
	pub length: usize,
}

/// Compiled search query: a literal pattern plus a case policy.
///
/// Matching is defined on bytes. Case-insensitive queries fold the pattern
/// and a scratch copy of the haystack to ASCII lowercase, so reported
/// offsets always index the original text. Non-ASCII case differences are
/// not folded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
	pattern: String,
	case_sensitive: bool,
	needle: Vec<u8>,
}

impl Query {
	/// Compile a pattern. Never fails; there is no pattern syntax beyond
	/// the literal text itself.
	#[must_use]
	pub fn new(pattern: impl Into<String>, case_sensitive: bool) -> Self {
		let pattern = pattern.into();
		let needle = if case_sensitive {
			pattern.as_bytes().to_vec()
		} else {
			pattern.bytes().map(|b| b.to_ascii_lowercase()).collect()
		};
		Self {
			pattern,
			case_sensitive,
			needle,
		}
	}

	/// The raw pattern this query was compiled from.
	#[must_use]
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Whether matching is case-sensitive.
	#[must_use]
	pub fn case_sensitive(&self) -> bool {
		self.case_sensitive
	}

	/// A trivial query has an empty pattern. It matches nothing and an
	/// engine holding one performs no scan.
	#[must_use]
	pub fn is_trivial(&self) -> bool {
		self.pattern.is_empty()
	}

	/// Every occurrence of the pattern in `text`, left to right.
	///
	/// Earliest start wins: a match consumes its full length before the
	/// search continues from the following byte, so overlapping occurrences
	/// are not double-reported. Trivial queries yield an empty vector.
	#[must_use]
	pub fn find_all(&self, text: &str) -> Vec<MatchRange> {
		if self.is_trivial() {
			return Vec::new();
		}
		let haystack = self.fold_haystack(text);
		Finder::new(&self.needle)
			.find_iter(haystack.as_ref())
			.map(|offset| MatchRange {
				offset,
				length: self.needle.len(),
			})
			.collect()
	}

	/// First occurrence of the pattern in `text`, without paying for the
	/// rest of the enumeration.
	#[must_use]
	pub fn find_first(&self, text: &str) -> Option<MatchRange> {
		if self.is_trivial() {
			return None;
		}
		let haystack = self.fold_haystack(text);
		Finder::new(&self.needle)
			.find(haystack.as_ref())
			.map(|offset| MatchRange {
				offset,
				length: self.needle.len(),
			})
	}

	/// Whether this query is a refinement of `old`: an unchanged case
	/// policy and a strictly longer pattern that starts with the old one.
	///
	/// Every match of a refinement lies inside a match region of the old
	/// query on the same text, which licenses re-filtering an existing
	/// result set instead of rescanning.
	#[must_use]
	pub fn is_refinement_of(&self, old: &Query) -> bool {
		self.case_sensitive == old.case_sensitive
			&& self.pattern.len() > old.pattern.len()
			&& self.pattern.starts_with(&old.pattern)
	}

	fn fold_haystack<'t>(&self, text: &'t str) -> Cow<'t, [u8]> {
		if self.case_sensitive {
			Cow::Borrowed(text.as_bytes())
		} else {
			Cow::Owned(text.bytes().map(|b| b.to_ascii_lowercase()).collect())
		}
	}
}
