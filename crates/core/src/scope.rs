//! Path scope filters parsed from comma-separated fragment lists.
//!
//! A filter narrows the candidate file set independently of the query:
//! `"src/, *.md, !test"` keeps files under a `src` segment or matching
//! `*.md`, and rejects anything under a `test` segment. An empty filter
//! matches everything.

use std::borrow::Cow;
use std::path::Path;

use glob::{MatchOptions, Pattern};

/// One parsed fragment of a scope expression.
#[derive(Clone, Debug)]
enum FragmentKind {
	/// Matches when the fragment equals a path segment or is a suffix of
	/// the whole path.
	Literal(String),
	/// Matches when the glob covers the whole path or any suffix of it
	/// starting at a segment boundary.
	Glob(Pattern),
}

#[derive(Clone, Debug)]
struct Fragment {
	kind: FragmentKind,
	exclude: bool,
}

/// Immutable predicate over file paths, parsed from a comma-separated list
/// of path fragments.
///
/// Fragment semantics:
/// - a leading `!` turns the fragment into an exclusion; paths it matches
///   are rejected regardless of the other fragments,
/// - fragments containing `*` or `?` are globs (`**` is supported),
/// - anything else matches by path-segment equality or path suffix, with a
///   trailing `/` trimmed first.
///
/// Paths are compared slash-normalized. Case sensitivity is a policy flag
/// chosen at parse time, defaulting to case-sensitive.
#[derive(Clone, Debug, Default)]
pub struct ScopeFilter {
	fragments: Vec<Fragment>,
	case_insensitive: bool,
}

impl ScopeFilter {
	/// Parse a case-sensitive filter. Fragments are split on commas,
	/// trimmed, and empty ones are dropped; parsing never fails.
	#[must_use]
	pub fn parse(text: &str) -> Self {
		Self::parse_with(text, false)
	}

	/// Parse with an explicit case policy, for platforms where the
	/// underlying file system is case-insensitive.
	#[must_use]
	pub fn parse_with(text: &str, case_insensitive: bool) -> Self {
		let fragments = text
			.split(',')
			.filter_map(|raw| parse_fragment(raw, case_insensitive))
			.collect();
		Self {
			fragments,
			case_insensitive,
		}
	}

	/// Whether the filter has no fragments and therefore no restriction.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.fragments.is_empty()
	}

	/// Whether `path` is inside the scope.
	///
	/// False if any exclusion fragment matches; otherwise true if there are
	/// no inclusion fragments, or if any inclusion fragment matches.
	#[must_use]
	pub fn matches(&self, path: &Path) -> bool {
		if self.fragments.is_empty() {
			return true;
		}

		let normalized = path.to_string_lossy().replace('\\', "/");
		let mut any_include = false;
		let mut included = false;
		for fragment in &self.fragments {
			let hit = self.fragment_matches(fragment, &normalized);
			if fragment.exclude {
				if hit {
					return false;
				}
			} else {
				any_include = true;
				included = included || hit;
			}
		}

		!any_include || included
	}

	fn fragment_matches(&self, fragment: &Fragment, normalized: &str) -> bool {
		match &fragment.kind {
			FragmentKind::Literal(literal) => {
				let candidate: Cow<'_, str> = if self.case_insensitive {
					Cow::Owned(normalized.to_ascii_lowercase())
				} else {
					Cow::Borrowed(normalized)
				};
				candidate.split('/').any(|segment| segment == literal.as_str())
					|| candidate.ends_with(literal.as_str())
			}
			FragmentKind::Glob(pattern) => {
				// `*` must not cross segment boundaries; `**` exists for
				// that.
				let options = MatchOptions {
					case_sensitive: !self.case_insensitive,
					require_literal_separator: true,
					require_literal_leading_dot: false,
				};
				if pattern.matches_with(normalized, options) {
					return true;
				}
				// Anchor the glob to every segment boundary so `src/*.txt`
				// also covers `proj/src/a.txt`.
				let mut rest = normalized;
				while let Some(slash) = rest.find('/') {
					rest = &rest[slash + 1..];
					if pattern.matches_with(rest, options) {
						return true;
					}
				}
				false
			}
		}
	}
}

fn parse_fragment(raw: &str, case_insensitive: bool) -> Option<Fragment> {
	let trimmed = raw.trim();
	let (exclude, body) = match trimmed.strip_prefix('!') {
		Some(rest) => (true, rest.trim_start()),
		None => (false, trimmed),
	};
	let body = body.trim_end_matches('/');
	if body.is_empty() {
		return None;
	}

	let kind = if body.contains('*') || body.contains('?') {
		match Pattern::new(body) {
			Ok(pattern) => FragmentKind::Glob(pattern),
			// Malformed globs degrade to literal matching so parsing
			// stays total.
			Err(_) => FragmentKind::Literal(literal_body(body, case_insensitive)),
		}
	} else {
		FragmentKind::Literal(literal_body(body, case_insensitive))
	};

	Some(Fragment { kind, exclude })
}

fn literal_body(body: &str, case_insensitive: bool) -> String {
	if case_insensitive {
		body.to_ascii_lowercase()
	} else {
		body.to_string()
	}
}
