//! Navigation history tracking.
//!
//! [`NavigationHistory`] mirrors the host's back/forward stack: a capped list
//! of visited paths and a pointer to the current one. [`BackRoutes`] supplies
//! a fallback target when there is nothing recorded to go back to.

use crate::pattern::RoutePattern;
use std::collections::VecDeque;

/// Default number of entries kept in the history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// How a host back/forward event was reconciled with the recorded history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySync {
	/// The event carried a usable index.
	Indexed(usize),
	/// The path was found at or next to the current pointer.
	Adjacent(usize),
	/// The path was unknown; history now holds only that path.
	Reset,
}

/// Capped list of visited paths with a current-position pointer.
#[derive(Debug, Clone)]
pub struct NavigationHistory {
	entries: VecDeque<String>,
	pointer: Option<usize>,
	capacity: usize,
}

impl Default for NavigationHistory {
	fn default() -> Self {
		Self::new(DEFAULT_HISTORY_CAPACITY)
	}
}

impl NavigationHistory {
	/// Creates an empty history holding at most `capacity` entries.
	///
	/// A capacity of zero is treated as one.
	pub fn new(capacity: usize) -> Self {
		Self {
			entries: VecDeque::with_capacity(capacity.max(1)),
			pointer: None,
			capacity: capacity.max(1),
		}
	}

	/// Records a visit to `path`.
	///
	/// Entries after the pointer are discarded first, then the path is
	/// appended and becomes current. If that exceeds the capacity, the oldest
	/// entries are dropped and the pointer shifts with them.
	pub fn record(&mut self, path: impl Into<String>) {
		if let Some(pointer) = self.pointer {
			self.entries.truncate(pointer + 1);
		}
		self.entries.push_back(path.into());

		while self.entries.len() > self.capacity {
			self.entries.pop_front();
		}
		self.pointer = Some(self.entries.len() - 1);
	}

	/// Returns the entry before the pointer without moving it.
	pub fn previous(&self) -> Option<&str> {
		let pointer = self.pointer?.checked_sub(1)?;
		self.entries.get(pointer).map(String::as_str)
	}

	/// Returns the entry after the pointer without moving it.
	pub fn next(&self) -> Option<&str> {
		self.entries.get(self.pointer? + 1).map(String::as_str)
	}

	/// Moves the pointer back one entry and returns the path there.
	///
	/// Returns `None` without moving when already at the oldest entry.
	pub fn step_back(&mut self) -> Option<&str> {
		let pointer = self.pointer.filter(|p| *p > 0)? - 1;
		self.pointer = Some(pointer);
		self.entries.get(pointer).map(String::as_str)
	}

	/// Moves the pointer forward one entry and returns the path there.
	pub fn step_forward(&mut self) -> Option<&str> {
		let pointer = self.pointer? + 1;
		let path = self.entries.get(pointer)?;
		self.pointer = Some(pointer);
		Some(path.as_str())
	}

	/// Reconciles the pointer with a host back/forward event.
	///
	/// Resolution order: the carried `index` if it points at `path`; the
	/// current entry; the previous entry; the next entry. If none match, the
	/// history is reset to `path` alone.
	pub fn sync(&mut self, path: &str, index: Option<usize>) -> HistorySync {
		if let Some(index) = index
			&& self.entries.get(index).is_some_and(|entry| entry == path)
		{
			self.pointer = Some(index);
			return HistorySync::Indexed(index);
		}

		if let Some(pointer) = self.pointer {
			let candidates = [Some(pointer), pointer.checked_sub(1), Some(pointer + 1)];
			for candidate in candidates.into_iter().flatten() {
				if self.entries.get(candidate).is_some_and(|entry| entry == path) {
					self.pointer = Some(candidate);
					return HistorySync::Adjacent(candidate);
				}
			}
		}

		self.entries.clear();
		self.entries.push_back(path.to_string());
		self.pointer = Some(0);
		HistorySync::Reset
	}

	/// Returns the current path.
	pub fn current(&self) -> Option<&str> {
		self.pointer
			.and_then(|p| self.entries.get(p))
			.map(String::as_str)
	}

	/// Returns the pointer, or `None` before anything was recorded.
	pub fn pointer(&self) -> Option<usize> {
		self.pointer
	}

	/// Returns `true` if [`step_back`](Self::step_back) would move.
	pub fn can_go_back(&self) -> bool {
		self.pointer.is_some_and(|p| p > 0)
	}

	/// Returns `true` if [`step_forward`](Self::step_forward) would move.
	pub fn can_go_forward(&self) -> bool {
		self.pointer.is_some_and(|p| p + 1 < self.entries.len())
	}

	/// Returns the recorded paths, oldest first.
	pub fn entries(&self) -> Vec<String> {
		self.entries.iter().cloned().collect()
	}

	/// Returns the number of recorded entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if nothing was recorded.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the maximum number of entries.
	pub fn capacity(&self) -> usize {
		self.capacity
	}
}

/// A single fallback rule: paths matching `pattern` go back to `target`.
#[derive(Debug, Clone)]
struct BackRule {
	pattern: RoutePattern,
	target: String,
}

/// Rules computing the default back route for a path.
///
/// Rules are tried in order; a path matching none of them goes back to `/`.
#[derive(Debug, Clone)]
pub struct BackRoutes {
	rules: Vec<BackRule>,
}

impl Default for BackRoutes {
	/// Game rooms go back to the lobby, bracket and chat details to their lists.
	fn default() -> Self {
		Self::empty()
			.rule_unchecked("/game/:id", "/play")
			.rule_unchecked("/tournament/:id", "/tournament")
			.rule_unchecked("/chat/:id", "/chat")
	}
}

impl BackRoutes {
	/// Creates a rule set where every path falls back to `/`.
	pub fn empty() -> Self {
		Self { rules: Vec::new() }
	}

	/// Appends a rule.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`](crate::RouterError::InvalidPattern)
	/// if `pattern` does not compile.
	pub fn rule(mut self, pattern: &str, target: impl Into<String>) -> crate::Result<Self> {
		self.rules.push(BackRule {
			pattern: RoutePattern::new(pattern)?,
			target: target.into(),
		});
		Ok(self)
	}

	// Only for the literal default patterns, which are known to compile.
	fn rule_unchecked(mut self, pattern: &str, target: &str) -> Self {
		if let Ok(pattern) = RoutePattern::new(pattern) {
			self.rules.push(BackRule {
				pattern,
				target: target.to_string(),
			});
		}
		self
	}

	/// Returns the fallback target for `path`.
	///
	/// Total: unmatched paths, including `/` itself, map to `/`.
	pub fn resolve(&self, path: &str) -> String {
		self.rules
			.iter()
			.find(|rule| rule.pattern.is_match(path))
			.map(|rule| rule.target.clone())
			.unwrap_or_else(|| "/".to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;

	#[rstest]
	fn test_empty_history() {
		let history = NavigationHistory::default();

		assert_eq!(history.pointer(), None);
		assert_eq!(history.current(), None);
		assert!(!history.can_go_back());
	}

	#[rstest]
	fn test_record_after_back_discards_forward_branch() {
		// Arrange
		let mut history = NavigationHistory::default();
		history.record("/a");
		history.record("/b");

		// Act
		assert_eq!(history.step_back(), Some("/a"));
		history.record("/c");

		// Assert
		assert_eq!(history.entries(), vec!["/a", "/c"]);
		assert_eq!(history.pointer(), Some(1));
		assert!(!history.can_go_forward());
	}

	#[rstest]
	fn test_cap_drops_oldest_and_keeps_current() {
		// Arrange
		let mut history = NavigationHistory::new(10);

		// Act
		for i in 0..11 {
			history.record(format!("/p{}", i));
		}

		// Assert
		assert_eq!(history.len(), 10);
		assert_eq!(history.entries().first().map(String::as_str), Some("/p1"));
		assert_eq!(history.current(), Some("/p10"));
		assert_eq!(history.pointer(), Some(9));
	}

	#[rstest]
	fn test_discard_then_cap_at_boundary() {
		// Arrange: full history, pointer moved back two entries
		let mut history = NavigationHistory::new(3);
		history.record("/a");
		history.record("/b");
		history.record("/c");
		history.step_back();
		history.step_back();

		// Act
		history.record("/d");

		// Assert: the forward branch is discarded before capping, so nothing
		// older than the pointer is lost
		assert_eq!(history.entries(), vec!["/a", "/d"]);
		assert_eq!(history.current(), Some("/d"));
	}

	#[rstest]
	fn test_peek_does_not_move_pointer() {
		// Arrange
		let mut history = NavigationHistory::default();
		history.record("/a");
		history.record("/b");
		history.record("/c");
		history.step_back();

		// Act & Assert
		assert_eq!(history.previous(), Some("/a"));
		assert_eq!(history.next(), Some("/c"));
		assert_eq!(history.pointer(), Some(1));
		assert_eq!(NavigationHistory::default().previous(), None);
	}

	#[rstest]
	fn test_step_back_at_start_does_not_move() {
		let mut history = NavigationHistory::default();
		history.record("/");

		assert_eq!(history.step_back(), None);
		assert_eq!(history.pointer(), Some(0));
	}

	#[rstest]
	fn test_step_forward_after_back() {
		let mut history = NavigationHistory::default();
		history.record("/a");
		history.record("/b");
		history.step_back();

		assert_eq!(history.step_forward(), Some("/b"));
		assert_eq!(history.step_forward(), None);
		assert_eq!(history.pointer(), Some(1));
	}

	#[rstest]
	fn test_sync_prefers_carried_index() {
		// Arrange: "/a" appears twice, so only the index disambiguates
		let mut history = NavigationHistory::default();
		for path in ["/a", "/b", "/a", "/c"] {
			history.record(path);
		}

		// Act
		let sync = history.sync("/a", Some(0));

		// Assert
		assert_eq!(sync, HistorySync::Indexed(0));
		assert_eq!(history.pointer(), Some(0));
	}

	#[rstest]
	#[case("/b", HistorySync::Adjacent(1))]
	#[case("/d", HistorySync::Adjacent(3))]
	fn test_sync_searches_adjacent_entries(#[case] path: &str, #[case] expected: HistorySync) {
		let mut history = NavigationHistory::default();
		for p in ["/a", "/b", "/c", "/d"] {
			history.record(p);
		}
		history.step_back();

		assert_eq!(history.sync(path, None), expected);
	}

	#[rstest]
	fn test_sync_ignores_index_pointing_elsewhere() {
		let mut history = NavigationHistory::default();
		history.record("/a");
		history.record("/b");

		assert_eq!(history.sync("/a", Some(1)), HistorySync::Adjacent(0));
	}

	#[rstest]
	fn test_sync_unknown_path_resets() {
		// Arrange
		let mut history = NavigationHistory::default();
		for p in ["/a", "/b", "/c", "/d"] {
			history.record(p);
		}

		// Act
		let sync = history.sync("/a", None);

		// Assert
		assert_eq!(sync, HistorySync::Reset);
		assert_eq!(history.entries(), vec!["/a"]);
		assert_eq!(history.pointer(), Some(0));
	}

	#[rstest]
	#[case("/game/abc", "/play")]
	#[case("/tournament/7", "/tournament")]
	#[case("/chat/general", "/chat")]
	#[case("/settings", "/")]
	#[case("/", "/")]
	fn test_default_back_routes(#[case] path: &str, #[case] expected: &str) {
		assert_eq!(BackRoutes::default().resolve(path), expected);
	}

	#[rstest]
	fn test_custom_back_rule_takes_order() {
		let rules = BackRoutes::empty()
			.rule("/game/:id", "/leaderboard")
			.unwrap();

		assert_eq!(rules.resolve("/game/abc"), "/leaderboard");
		assert_eq!(rules.resolve("/tournament/7"), "/");
	}

	proptest! {
		#[rstest]
		fn prop_pointer_always_valid(
			ops in prop::collection::vec(prop_oneof![
				"[a-z]{1,4}".prop_map(Some),
				Just(None),
			], 1..60),
			capacity in 1usize..12,
		) {
			let mut history = NavigationHistory::new(capacity);
			for op in ops {
				match op {
					Some(path) => {
						let expected = format!("/{}", path);
						history.record(expected.clone());
						prop_assert_eq!(history.current(), Some(expected.as_str()));
					}
					None => {
						history.step_back();
					}
				}
				prop_assert!(history.len() <= capacity);
				if let Some(pointer) = history.pointer() {
					prop_assert!(pointer < history.len());
				}
			}
		}
	}
}
