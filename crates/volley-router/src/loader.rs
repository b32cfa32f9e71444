//! On-demand view loading with caching.
//!
//! Each deferred route is loaded at most once at a time: a navigation or
//! prefetch that finds a load already in flight awaits the same shared future
//! instead of starting another. A successful load replaces the in-flight entry
//! with the resolved module; a failed load removes it so the next attempt
//! retries.

use crate::error::{LoadError, Result, RouterError};
use crate::route::{Route, ViewSource};
use crate::view::{Loader, ViewModule};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type InFlight = Shared<BoxFuture<'static, std::result::Result<ViewModule, LoadError>>>;

/// Cache slot for a single route.
enum CacheEntry {
	/// The module is resident.
	Loaded(ViewModule),
	/// A load is running; `generation` identifies which one.
	Loading { generation: u64, pending: InFlight },
}

#[derive(Default)]
struct CacheState {
	entries: HashMap<String, CacheEntry>,
	next_generation: u64,
}

/// Loaded view modules keyed by route pattern.
#[derive(Default)]
pub struct ModuleCache {
	state: Mutex<CacheState>,
}

impl std::fmt::Debug for ModuleCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.lock();
		let loaded = state
			.entries
			.values()
			.filter(|entry| matches!(entry, CacheEntry::Loaded(_)))
			.count();
		f.debug_struct("ModuleCache")
			.field("loaded", &loaded)
			.field("loading", &(state.entries.len() - loaded))
			.finish()
	}
}

impl ModuleCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the view module for `route`, loading it if needed.
	///
	/// Eager routes bypass the cache entirely.
	///
	/// # Errors
	///
	/// Returns [`RouterError::ModuleLoad`] if the loader fails. The cache is
	/// left without an entry for the route so a later call retries.
	pub async fn load_view(&self, route: &Route) -> Result<ViewModule> {
		let loader = match route.source() {
			ViewSource::Eager(view) => return Ok(view.clone()),
			ViewSource::Deferred(loader) => loader,
		};

		let (generation, pending) = {
			let mut guard = self.state.lock();
			let state = &mut *guard;
			match state.entries.get(route.id()) {
				Some(CacheEntry::Loaded(view)) => return Ok(view.clone()),
				Some(CacheEntry::Loading {
					generation,
					pending,
				}) => {
					tracing::debug!(route = route.id(), "joining in-flight view load");
					(*generation, pending.clone())
				}
				None => Self::start_load(state, route.id(), loader),
			}
		};

		let result = pending.await;
		self.settle(route.id(), generation, &result);
		result.map_err(|source| RouterError::ModuleLoad {
			route: route.id().to_string(),
			source,
		})
	}

	/// Starts loading `route` in the background if it is deferred and cold.
	///
	/// The in-flight entry is registered before this returns, so loads
	/// requested afterwards join it. The returned task drives the load to
	/// completion and must be spawned.
	pub fn prefetch(self: &Arc<Self>, route: &Route) -> Option<BoxFuture<'static, ()>> {
		let ViewSource::Deferred(loader) = route.source() else {
			return None;
		};

		let (generation, pending) = {
			let mut guard = self.state.lock();
			let state = &mut *guard;
			if state.entries.contains_key(route.id()) {
				return None;
			}
			Self::start_load(state, route.id(), loader)
		};

		let cache = Arc::clone(self);
		let route = route.id().to_string();
		Some(Box::pin(async move {
			let result = pending.await;
			cache.settle(&route, generation, &result);
			if let Err(err) = result {
				tracing::warn!(route = %route, error = %err, "prefetch failed");
			}
		}))
	}

	fn start_load(state: &mut CacheState, route: &str, loader: &Loader) -> (u64, InFlight) {
		tracing::debug!(route, "starting view load");
		let generation = state.next_generation;
		state.next_generation += 1;
		let pending = loader().shared();
		state.entries.insert(
			route.to_string(),
			CacheEntry::Loading {
				generation,
				pending: pending.clone(),
			},
		);
		(generation, pending)
	}

	/// Replaces the in-flight entry for `generation` with its outcome.
	///
	/// Every awaiter calls this; only the first one for a given generation
	/// finds the `Loading` entry, so later calls are no-ops.
	fn settle(
		&self,
		route: &str,
		generation: u64,
		result: &std::result::Result<ViewModule, LoadError>,
	) {
		let mut state = self.state.lock();
		let current = matches!(
			state.entries.get(route),
			Some(CacheEntry::Loading { generation: g, .. }) if *g == generation
		);
		if !current {
			return;
		}
		match result {
			Ok(view) => {
				tracing::debug!(route, "view load finished");
				state
					.entries
					.insert(route.to_string(), CacheEntry::Loaded(view.clone()));
			}
			Err(err) => {
				tracing::debug!(route, error = %err, "view load failed; clearing in-flight marker");
				state.entries.remove(route);
			}
		}
	}

	/// Returns `true` if a resolved module is cached for `route`.
	pub fn is_cached(&self, route: &str) -> bool {
		matches!(self.state.lock().entries.get(route), Some(CacheEntry::Loaded(_)))
	}

	/// Returns `true` if a load is in flight for `route`.
	pub fn is_loading(&self, route: &str) -> bool {
		matches!(
			self.state.lock().entries.get(route),
			Some(CacheEntry::Loading { .. })
		)
	}

	/// Returns `true` if `route` has neither a resolved module nor a pending load.
	pub fn is_cold(&self, route: &str) -> bool {
		!self.state.lock().entries.contains_key(route)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;

	fn counted_route(calls: Arc<AtomicUsize>, fail_first: bool) -> Route {
		Route::deferred("/play", move || {
			let attempt = calls.fetch_add(1, Ordering::SeqCst);
			async move {
				tokio::time::sleep(Duration::from_millis(10)).await;
				if fail_first && attempt == 0 {
					Err(LoadError::new("network error"))
				} else {
					Ok(ViewModule::markup("<section>lobby</section>"))
				}
			}
		})
	}

	#[rstest]
	#[tokio::test]
	async fn test_eager_route_is_not_cached() {
		let cache = ModuleCache::new();
		let route = Route::eager("/", ViewModule::markup("home"));

		let view = cache.load_view(&route).await.unwrap();

		assert_eq!(view.render(&Default::default()), "home");
		assert!(cache.is_cold("/"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_concurrent_loads_share_one_underlying_load() {
		// Arrange
		let calls = Arc::new(AtomicUsize::new(0));
		let cache = ModuleCache::new();
		let route = counted_route(Arc::clone(&calls), false);

		// Act
		let (first, second) = tokio::join!(cache.load_view(&route), cache.load_view(&route));

		// Assert
		let (first, second) = (first.unwrap(), second.unwrap());
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(first.ptr_eq(&second));
		assert!(cache.is_cached("/play"));
		assert!(!cache.is_loading("/play"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_cached_module_is_reused() {
		let calls = Arc::new(AtomicUsize::new(0));
		let cache = ModuleCache::new();
		let route = counted_route(Arc::clone(&calls), false);

		cache.load_view(&route).await.unwrap();
		cache.load_view(&route).await.unwrap();

		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_failed_load_leaves_no_entry_and_retries() {
		// Arrange
		let calls = Arc::new(AtomicUsize::new(0));
		let cache = ModuleCache::new();
		let route = counted_route(Arc::clone(&calls), true);

		// Act
		let failed = cache.load_view(&route).await;

		// Assert
		assert!(matches!(failed, Err(RouterError::ModuleLoad { ref route, .. }) if route == "/play"));
		assert!(cache.is_cold("/play"));

		// Act
		let retried = cache.load_view(&route).await;

		// Assert
		assert!(retried.is_ok());
		assert_eq!(calls.load(Ordering::SeqCst), 2);
		assert!(cache.is_cached("/play"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_concurrent_awaiters_of_failed_load_all_see_error() {
		let calls = Arc::new(AtomicUsize::new(0));
		let cache = ModuleCache::new();
		let route = counted_route(Arc::clone(&calls), true);

		let (first, second) = tokio::join!(cache.load_view(&route), cache.load_view(&route));

		assert!(first.is_err());
		assert!(second.is_err());
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(cache.is_cold("/play"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_prefetch_registers_load_immediately() {
		// Arrange
		let calls = Arc::new(AtomicUsize::new(0));
		let cache = Arc::new(ModuleCache::new());
		let route = counted_route(Arc::clone(&calls), false);

		// Act
		let task = cache.prefetch(&route);

		// Assert
		assert!(task.is_some());
		assert!(cache.is_loading("/play"));
		assert!(cache.prefetch(&route).is_none());

		// Act
		let (_, view) = tokio::join!(task.unwrap(), cache.load_view(&route));

		// Assert
		assert!(view.is_ok());
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(cache.is_cached("/play"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_prefetch_skips_eager_routes() {
		let cache = Arc::new(ModuleCache::new());

		assert!(cache.prefetch(&Route::eager("/", ViewModule::markup("home"))).is_none());
	}
}
