//! Route definitions and the route table.

use crate::error::{LoadError, Result, RouterError};
use crate::guard::Guard;
use crate::pattern::{RouteParams, RoutePattern};
use crate::view::{Loader, ViewModule, loader};
use std::future::Future;

/// How a route obtains its view.
#[derive(Clone)]
pub enum ViewSource {
	/// The view is compiled in and always resident.
	Eager(ViewModule),
	/// The view is produced on first use by an async loader.
	Deferred(Loader),
}

impl std::fmt::Debug for ViewSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Eager(view) => f.debug_tuple("Eager").field(view).finish(),
			Self::Deferred(_) => f.write_str("Deferred"),
		}
	}
}

/// A single route definition.
#[derive(Clone)]
pub struct Route {
	/// The path pattern.
	pattern: RoutePattern,
	/// Where the view comes from.
	source: ViewSource,
	/// Optional guard function.
	guard: Option<Guard>,
	/// Optional page title.
	title: Option<String>,
	/// Whether to warm the loader shortly after startup.
	prefetch: bool,
}

impl std::fmt::Debug for Route {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Route")
			.field("pattern", &self.pattern)
			.field("source", &self.source)
			.field("has_guard", &self.guard.is_some())
			.field("title", &self.title)
			.field("prefetch", &self.prefetch)
			.finish()
	}
}

impl Route {
	/// Creates a route from a pattern and a view source.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`](crate::RouterError::InvalidPattern)
	/// if the pattern does not compile.
	pub fn try_new(pattern: &str, source: ViewSource) -> Result<Self> {
		Ok(Self {
			pattern: RoutePattern::new(pattern)?,
			source,
			guard: None,
			title: None,
			prefetch: false,
		})
	}

	/// Creates a route whose view is always resident.
	///
	/// # Panics
	///
	/// Panics if the pattern is invalid. Use [`Route::try_new`] for fallible
	/// construction.
	pub fn eager(pattern: &str, view: ViewModule) -> Self {
		Self::try_new(pattern, ViewSource::Eager(view))
			.unwrap_or_else(|e| panic!("Invalid route pattern '{}': {}", pattern, e))
	}

	/// Creates a route whose view is loaded on first use.
	///
	/// # Panics
	///
	/// Panics if the pattern is invalid. Use [`Route::try_new`] for fallible
	/// construction.
	///
	/// # Example
	///
	/// ```
	/// use volley_router::{Route, ViewModule};
	///
	/// let route = Route::deferred("/play", || async {
	/// 	Ok(ViewModule::markup("<section id=\"lobby\"></section>"))
	/// });
	/// assert!(route.is_deferred());
	/// ```
	pub fn deferred<F, Fut>(pattern: &str, load: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = std::result::Result<ViewModule, LoadError>> + Send + 'static,
	{
		Self::try_new(pattern, ViewSource::Deferred(loader(load)))
			.unwrap_or_else(|e| panic!("Invalid route pattern '{}': {}", pattern, e))
	}

	/// Adds a guard to this route.
	pub fn with_guard(mut self, guard: Guard) -> Self {
		self.guard = Some(guard);
		self
	}

	/// Sets the page title shown while this route is active.
	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	/// Flags the route for background loading after startup.
	pub fn prefetch(mut self) -> Self {
		self.prefetch = true;
		self
	}

	/// Returns the pattern.
	pub fn pattern(&self) -> &RoutePattern {
		&self.pattern
	}

	/// Returns the pattern string, which also identifies the route.
	pub fn id(&self) -> &str {
		self.pattern.as_str()
	}

	/// Returns the view source.
	pub fn source(&self) -> &ViewSource {
		&self.source
	}

	/// Returns the route guard.
	pub fn guard(&self) -> Option<&Guard> {
		self.guard.as_ref()
	}

	/// Returns the page title.
	pub fn title(&self) -> Option<&str> {
		self.title.as_deref()
	}

	/// Returns whether the route is flagged for prefetching.
	pub fn is_prefetch(&self) -> bool {
		self.prefetch
	}

	/// Returns whether the view is loaded on demand.
	pub fn is_deferred(&self) -> bool {
		matches!(self.source, ViewSource::Deferred(_))
	}
}

/// A matched route with extracted parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch {
	/// The matched route.
	pub route: Route,
	/// Extracted path parameters.
	pub params: RouteParams,
}

/// Ordered collection of routes.
///
/// Routes are tested in registration order and the first match wins, so a
/// static route such as `/game/new` must be registered before `/game/:id`.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
	routes: Vec<Route>,
}

impl RouteTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a route.
	///
	/// A second route with an identical pattern is kept but can never match.
	pub fn register(&mut self, route: Route) {
		if self.routes.iter().any(|r| r.pattern == route.pattern) {
			tracing::warn!(
				route = route.id(),
				"route registered twice; the earlier registration shadows it"
			);
		}
		self.routes.push(route);
	}

	/// Adds a route, builder style.
	pub fn route(mut self, route: Route) -> Self {
		self.register(route);
		self
	}

	/// Resolves a path to the first matching route.
	pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
		self.routes.iter().find_map(|route| {
			route.pattern.matches(path).map(|params| RouteMatch {
				route: route.clone(),
				params,
			})
		})
	}

	/// Resolves a path, failing with [`RouterError::NoRouteMatch`] when nothing
	/// matches.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NoRouteMatch`] carrying the path.
	pub fn try_resolve(&self, path: &str) -> Result<RouteMatch> {
		self.resolve(path)
			.ok_or_else(|| RouterError::NoRouteMatch(path.to_string()))
	}

	/// Iterates over routes in registration order.
	pub fn iter(&self) -> impl Iterator<Item = &Route> {
		self.routes.iter()
	}

	/// Returns the number of registered routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns `true` if no route is registered.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}
