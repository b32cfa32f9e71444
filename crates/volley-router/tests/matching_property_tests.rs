//! Route matching property-based tests
//!
//! Property-based tests for pattern compilation, path resolution, and history
//! bookkeeping.

use proptest::prelude::*;
use rstest::*;
use volley_router::{NavigationHistory, Route, RouteParams, RoutePattern, RouteTable, ViewModule};

fn segment() -> impl Strategy<Value = String> {
	"[a-z0-9_-]{1,12}"
}

// ============================================================================
// Property-Based Tests: Route resolution
// ============================================================================

proptest! {
	/// Test: static routes resolve to themselves
	///
	/// Category: Property
	/// Every registered static path resolves to its own route with no params.
	#[rstest]
	fn prop_static_routes_resolve_exactly(
		paths in prop::collection::hash_set(prop::collection::vec(segment(), 1..4), 1..8)
	) {
		let paths: Vec<String> = paths.into_iter().map(|segments| format!("/{}", segments.join("/"))).collect();
		let mut table = RouteTable::new();
		for path in &paths {
			table.register(Route::eager(path, ViewModule::markup(path.clone())));
		}

		for path in &paths {
			let matched = table.resolve(path);
			prop_assert!(matched.is_some());
			let matched = matched.unwrap();
			prop_assert_eq!(matched.route.id(), path.as_str());
			prop_assert!(matched.params.is_empty());
		}
	}

	/// Test: parameters are captured in declared order
	///
	/// Category: Property
	/// `/a/:x/b/:y` resolves any concrete `/a/{x}/b/{y}` to `[x, y]`.
	#[rstest]
	fn prop_params_captured_in_order(x in segment(), y in segment()) {
		let pattern = RoutePattern::new("/a/:x/b/:y").unwrap();
		let path = format!("/a/{}/b/{}", x, y);

		let params = pattern.matches(&path);

		prop_assert!(params.is_some());
		let params = params.unwrap();
		prop_assert_eq!(params.values(), vec![x.as_str(), y.as_str()]);
		prop_assert_eq!(params.get("x"), Some(x.as_str()));
		prop_assert_eq!(params.get("y"), Some(y.as_str()));
	}

	/// Test: a parameter never spans segments
	///
	/// Category: Property
	#[rstest]
	fn prop_param_does_not_cross_slash(x in segment(), extra in segment()) {
		let pattern = RoutePattern::new("/game/:id").unwrap();
		let path = format!("/game/{}/{}", x, extra);

		prop_assert!(pattern.matches(&path).is_none());
	}

	/// Test: reversing a pattern produces a path it matches
	///
	/// Category: Property
	#[rstest]
	fn prop_reverse_matches(id in segment(), slot in segment()) {
		let pattern = RoutePattern::new("/tournament/:id/slot/:slot").unwrap();
		let params: RouteParams = [("id", id.clone()), ("slot", slot.clone())].into_iter().collect();

		let path = pattern.reverse(&params);

		prop_assert!(path.is_some());
		let path = path.unwrap();
		prop_assert_eq!(pattern.matches(&path), Some(params));
	}
}

// ============================================================================
// Property-Based Tests: History
// ============================================================================

proptest! {
	/// Test: recording after stepping back discards the forward branch
	///
	/// Category: Property
	/// With a full history, the forward branch is discarded before the cap is
	/// applied, so the oldest entry survives.
	#[rstest]
	fn prop_record_after_back_truncates(
		paths in prop::collection::vec(segment(), 2..10),
		back in 1usize..9,
		next in segment(),
	) {
		let mut history = NavigationHistory::new(paths.len());
		for path in &paths {
			history.record(format!("/{}", path));
		}
		let back = back.min(paths.len() - 1);
		for _ in 0..back {
			history.step_back();
		}
		let oldest = format!("/{}", paths[0]);

		history.record(format!("/{}", next));

		let kept = paths.len() - back;
		let entries = history.entries();
		prop_assert_eq!(history.len(), kept + 1);
		prop_assert_eq!(history.pointer(), Some(kept));
		prop_assert_eq!(entries.first(), Some(&oldest));
		prop_assert!(!history.can_go_forward());
	}
}
