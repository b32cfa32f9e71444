//! Navigation lifecycle.
//!
//! [`Navigator`] owns all routing state (route table, module cache, history,
//! active view handle, global guard) and drives each navigation through the
//! same steps:
//!
//! 1. release the mounted view's cleanup
//! 2. resolve the path against the route table
//! 3. run the global and route guards, following redirects
//! 4. record the visit and update the host history stack
//! 5. load the view module
//! 6. render, mount, and keep the new cleanup
//!
//! Every navigation takes a ticket from a monotonically increasing sequence.
//! When a navigation resumes after an await and finds a newer ticket has been
//! issued, it stops without touching history or the page.

use crate::config::NavigatorConfig;
use crate::error::{Result, RouterError};
use crate::guard::{Guard, GuardContext, GuardOutcome, GuardPipeline};
use crate::history::{BackRoutes, NavigationHistory};
use crate::host::Host;
use crate::loader::ModuleCache;
use crate::pattern::RouteParams;
use crate::route::{Route, RouteMatch, RouteTable};
use crate::view::{ActiveViewHandle, ViewModule};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Markup shown when nothing can be mounted for a path.
const DEFAULT_NOT_FOUND_MARKUP: &str =
	"<section class=\"not-found\"><h1>404</h1><p>This page does not exist.</p></section>";

/// How a navigation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
	/// The view for `route` is rendered and mounted.
	Mounted {
		/// Final path, after any redirects.
		path: String,
		/// Pattern of the mounted route.
		route: String,
	},
	/// A guard denied the navigation; the page was left as it was.
	Denied {
		/// Path that was denied.
		path: String,
	},
	/// No route matched; the not-found surface is shown.
	NotFound {
		/// Path that did not match.
		path: String,
	},
	/// The route's loader failed; the not-found surface is shown.
	LoadFailed {
		/// Path being navigated to.
		path: String,
		/// Pattern of the route whose loader failed.
		route: String,
	},
	/// Already at the requested path, or nothing to move to.
	Unchanged {
		/// Current path.
		path: String,
	},
	/// A newer navigation started while this one was waiting.
	Superseded {
		/// Path this navigation was heading to.
		path: String,
	},
}

impl NavigationOutcome {
	/// Returns `true` for [`NavigationOutcome::Mounted`].
	pub fn is_mounted(&self) -> bool {
		matches!(self, Self::Mounted { .. })
	}
}

/// How a navigation interacts with recorded history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavigationMode {
	/// Record the visit and push (or replace) a host entry.
	Push,
	/// Step the pointer and the host back one entry.
	Back,
	/// Step the pointer and the host forward one entry.
	Forward,
	/// The host already moved its stack; leave it alone.
	Popstate,
}

/// Mutable state shared by navigations.
struct NavigatorState {
	history: NavigationHistory,
	active: Option<ActiveViewHandle>,
	previous_route: Option<String>,
	/// Path of an in-app traversal the host will report back as an event.
	pending_echo: Option<String>,
}

/// The client-side navigation runtime.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use volley_router::{MemoryHost, Navigator, Route, ViewModule};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> volley_router::Result<()> {
/// let host = Arc::new(MemoryHost::new("/"));
/// let navigator = Navigator::builder(host.clone())
/// 	.route(Route::eager("/", ViewModule::markup("<h1>Home</h1>")))
/// 	.route(Route::deferred("/play", || async {
/// 		Ok(ViewModule::markup("<h1>Lobby</h1>"))
/// 	}))
/// 	.build()?;
///
/// navigator.navigate("/play").await?;
/// assert_eq!(host.content().as_deref(), Some("<h1>Lobby</h1>"));
/// # Ok(())
/// # }
/// ```
pub struct Navigator {
	routes: RouteTable,
	modules: Arc<ModuleCache>,
	host: Arc<dyn Host>,
	config: NavigatorConfig,
	back_routes: BackRoutes,
	not_found: ViewModule,
	global_guard: RwLock<Option<Guard>>,
	state: Mutex<NavigatorState>,
	sequence: AtomicU64,
	started: AtomicBool,
}

impl std::fmt::Debug for Navigator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.lock();
		f.debug_struct("Navigator")
			.field("routes_count", &self.routes.len())
			.field("history", &state.history)
			.field("has_active_view", &state.active.is_some())
			.field("modules", &self.modules)
			.finish()
	}
}

impl Navigator {
	/// Starts building a navigator on top of `host`.
	pub fn builder(host: Arc<dyn Host>) -> NavigatorBuilder {
		NavigatorBuilder::new(host)
	}

	/// Navigates to `path`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::RedirectLimit`] if guards redirect more than
	/// `max_redirects` times in a row. Unmatched paths and failed loads are not
	/// errors; they show the not-found surface and are reported through the
	/// returned [`NavigationOutcome`].
	pub async fn navigate(&self, path: &str) -> Result<NavigationOutcome> {
		self.run(path, NavigationMode::Push).await
	}

	/// Navigates to `path` unless it is already the current path.
	pub async fn navigate_if_different(&self, path: &str) -> Result<NavigationOutcome> {
		let current = self.current_path();
		if current == path {
			tracing::debug!(path, "already at path; skipping navigation");
			return Ok(NavigationOutcome::Unchanged { path: current });
		}
		self.navigate(path).await
	}

	/// Goes back one recorded entry, or to the default back route if there is
	/// none.
	///
	/// The history pointer and the host stack only move once guards allow the
	/// step.
	pub async fn go_back(&self) -> Result<NavigationOutcome> {
		let previous = self.state.lock().history.previous().map(str::to_string);
		match previous {
			Some(path) => self.run(&path, NavigationMode::Back).await,
			None => {
				let current = self.current_path();
				let fallback = self.back_routes.resolve(&current);
				tracing::debug!(from = %current, to = %fallback, "no history to go back to; using default back route");
				self.run(&fallback, NavigationMode::Push).await
			}
		}
	}

	/// Goes forward one recorded entry, if any.
	pub async fn go_forward(&self) -> Result<NavigationOutcome> {
		let next = self.state.lock().history.next().map(str::to_string);
		match next {
			Some(path) => self.run(&path, NavigationMode::Forward).await,
			None => Ok(NavigationOutcome::Unchanged {
				path: self.current_path(),
			}),
		}
	}

	/// Handles a host back/forward event that landed on `path`.
	///
	/// `index` is the payload stored with the host entry, when the host
	/// provides one. History is reconciled without recording a new entry.
	///
	/// The event a host raises for an in-app [`go_back`](Self::go_back) or
	/// [`go_forward`](Self::go_forward) is absorbed and reported as
	/// [`NavigationOutcome::Unchanged`].
	pub async fn handle_popstate(&self, path: &str, index: Option<usize>) -> Result<NavigationOutcome> {
		let sync = {
			let mut state = self.state.lock();
			if state.pending_echo.take().is_some_and(|pending| pending == path) {
				None
			} else {
				Some(state.history.sync(path, index))
			}
		};
		let Some(sync) = sync else {
			tracing::debug!(path, "host confirmed in-app traversal");
			return Ok(NavigationOutcome::Unchanged {
				path: path.to_string(),
			});
		};
		tracing::debug!(path, ?index, ?sync, "reconciled host back/forward event");
		self.run(path, NavigationMode::Popstate).await
	}

	/// Starts loading the view for `path` in the background.
	///
	/// Returns `true` if a load was started; `false` if the path does not
	/// match, the route is eager, or its module is already cached or loading.
	pub fn prefetch(&self, path: &str) -> bool {
		let Some(matched) = self.routes.resolve(path) else {
			return false;
		};
		let Some(task) = self.modules.prefetch(&matched.route) else {
			return false;
		};
		tracing::debug!(path, route = matched.route.id(), "prefetching view");
		self.host.spawn(task);
		true
	}

	/// Installs the guard run before every route guard.
	pub fn set_global_guard(&self, guard: Guard) {
		*self.global_guard.write() = Some(guard);
	}

	/// Removes the global guard.
	pub fn clear_global_guard(&self) {
		*self.global_guard.write() = None;
	}

	/// Performs the initial navigation to the host's current path and
	/// schedules the prefetch of flagged routes.
	///
	/// Subsequent calls only repeat the navigation.
	pub async fn start(&self) -> Result<NavigationOutcome> {
		if !self.started.swap(true, Ordering::SeqCst) {
			self.schedule_prefetch();
		}
		let path = self.host.current_path();
		self.navigate(&path).await
	}

	/// Returns the current path: the history entry under the pointer, or the
	/// host location before anything was recorded.
	pub fn current_path(&self) -> String {
		let recorded = self.state.lock().history.current().map(str::to_string);
		recorded.unwrap_or_else(|| self.host.current_path())
	}

	/// Returns the recorded history paths, oldest first.
	pub fn history_entries(&self) -> Vec<String> {
		self.state.lock().history.entries()
	}

	/// Returns the history pointer.
	pub fn history_pointer(&self) -> Option<usize> {
		self.state.lock().history.pointer()
	}

	/// Returns `true` if a view cleanup is currently held.
	pub fn has_active_view(&self) -> bool {
		self.state.lock().active.is_some()
	}

	/// Returns `true` if the module for the route with pattern `route` is cached.
	pub fn is_cached(&self, route: &str) -> bool {
		self.modules.is_cached(route)
	}

	/// Returns the route table.
	pub fn routes(&self) -> &RouteTable {
		&self.routes
	}

	/// Returns the configuration.
	pub fn config(&self) -> &NavigatorConfig {
		&self.config
	}

	async fn run(&self, path: &str, mode: NavigationMode) -> Result<NavigationOutcome> {
		let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
		tracing::debug!(path, ticket, ?mode, "navigation started");

		self.release_active_view();

		let mut target = path.to_string();
		let mut mode = mode;
		let mut redirects = 0;

		let matched = loop {
			let matched = match self.routes.try_resolve(&target) {
				Ok(matched) => matched,
				Err(err) => {
					tracing::debug!(ticket, error = %err, "showing not-found surface");
					self.show_not_found();
					return Ok(NavigationOutcome::NotFound { path: target });
				}
			};

			let ctx = GuardContext {
				path: target.clone(),
				target: matched.route.id().to_string(),
				previous: self.state.lock().previous_route.clone(),
				params: matched.params.clone(),
			};
			let global = self.global_guard.read().clone();
			let outcome = GuardPipeline::new(global.as_ref(), matched.route.guard())
				.run(&ctx)
				.await;

			if self.is_stale(ticket) {
				return Ok(Self::superseded(target, ticket));
			}

			match outcome {
				GuardOutcome::Allow => break matched,
				GuardOutcome::Deny => {
					tracing::debug!(path = %target, ticket, "guard denied navigation");
					return Ok(NavigationOutcome::Denied { path: target });
				}
				GuardOutcome::Redirect(next) => {
					redirects += 1;
					if redirects > self.config.max_redirects {
						tracing::error!(
							path = %next,
							redirects,
							limit = self.config.max_redirects,
							"guard redirect limit exceeded"
						);
						return Err(RouterError::RedirectLimit {
							path: next,
							limit: self.config.max_redirects,
						});
					}
					tracing::debug!(from = %target, to = %next, redirects, "guard redirected navigation");
					target = next;
					mode = NavigationMode::Push;
				}
			}
		};

		self.commit_history(&target, mode);

		let view = match self.modules.load_view(&matched.route).await {
			Ok(view) => view,
			Err(err) => {
				if self.is_stale(ticket) {
					return Ok(Self::superseded(target, ticket));
				}
				tracing::error!(path = %target, route = matched.route.id(), error = %err, "view load failed");
				self.show_not_found();
				return Ok(NavigationOutcome::LoadFailed {
					path: target,
					route: matched.route.id().to_string(),
				});
			}
		};

		if self.is_stale(ticket) {
			return Ok(Self::superseded(target, ticket));
		}

		self.mount(&matched, &view);
		tracing::info!(path = %target, route = matched.route.id(), ticket, "navigation committed");
		Ok(NavigationOutcome::Mounted {
			path: target,
			route: matched.route.id().to_string(),
		})
	}

	fn is_stale(&self, ticket: u64) -> bool {
		self.sequence.load(Ordering::SeqCst) != ticket
	}

	fn superseded(path: String, ticket: u64) -> NavigationOutcome {
		tracing::warn!(path = %path, ticket, "navigation superseded by a newer one; discarding result");
		NavigationOutcome::Superseded { path }
	}

	/// Runs the mounted view's cleanup, if any, to completion.
	fn release_active_view(&self) {
		let active = self.state.lock().active.take();
		if let Some(handle) = active {
			tracing::debug!(route = handle.route(), "releasing mounted view");
			handle.release();
		}
	}

	fn commit_history(&self, path: &str, mode: NavigationMode) {
		let (index, recorded) = {
			let mut state = self.state.lock();
			let recorded = match mode {
				// Re-navigating to the current entry replaces it
				NavigationMode::Push if state.history.current() == Some(path) => false,
				NavigationMode::Push => {
					state.history.record(path);
					true
				}
				NavigationMode::Back => {
					state.history.step_back();
					false
				}
				NavigationMode::Forward => {
					state.history.step_forward();
					false
				}
				NavigationMode::Popstate => false,
			};
			(state.history.pointer().unwrap_or(0), recorded)
		};

		match mode {
			NavigationMode::Push if recorded && self.host.current_path() != path => {
				self.host.push_state(path, index)
			}
			NavigationMode::Push => self.host.replace_state(path, index),
			NavigationMode::Back => self.traverse_host(path, -1),
			NavigationMode::Forward => self.traverse_host(path, 1),
			NavigationMode::Popstate => {}
		}
	}

	fn traverse_host(&self, path: &str, delta: isize) {
		if self.host.reports_traversal() {
			self.state.lock().pending_echo = Some(path.to_string());
		}
		self.host.go(delta);
	}

	fn mount(&self, matched: &RouteMatch, view: &ViewModule) {
		self.release_active_view();

		let markup = view.render(&matched.params);
		self.host.render(&markup);
		self.host
			.set_title(matched.route.title().unwrap_or(self.config.default_title.as_str()));

		let cleanup = view.mount(&matched.params);
		let mut state = self.state.lock();
		state.active = cleanup.map(|cleanup| ActiveViewHandle::new(matched.route.id(), cleanup));
		state.previous_route = Some(matched.route.id().to_string());
	}

	fn show_not_found(&self) {
		self.host.render(&self.not_found.render(&RouteParams::new()));
		self.host.set_title(&self.config.not_found_title);
	}

	fn schedule_prefetch(&self) {
		let routes: Vec<Route> = self
			.routes
			.iter()
			.filter(|route| route.is_prefetch() && route.is_deferred())
			.cloned()
			.collect();
		if routes.is_empty() {
			return;
		}

		let delay = self.config.prefetch_delay();
		tracing::debug!(count = routes.len(), ?delay, "scheduling route prefetch");
		let modules = Arc::clone(&self.modules);
		self.host.spawn_after(
			delay,
			Box::pin(async move {
				for route in routes {
					if let Some(task) = modules.prefetch(&route) {
						task.await;
					}
				}
			}),
		);
	}
}

/// Builder for [`Navigator`].
pub struct NavigatorBuilder {
	host: Arc<dyn Host>,
	routes: RouteTable,
	config: NavigatorConfig,
	back_routes: BackRoutes,
	not_found: ViewModule,
	global_guard: Option<Guard>,
}

impl std::fmt::Debug for NavigatorBuilder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NavigatorBuilder")
			.field("routes", &self.routes)
			.field("config", &self.config)
			.field("has_global_guard", &self.global_guard.is_some())
			.finish()
	}
}

impl NavigatorBuilder {
	fn new(host: Arc<dyn Host>) -> Self {
		Self {
			host,
			routes: RouteTable::new(),
			config: NavigatorConfig::default(),
			back_routes: BackRoutes::default(),
			not_found: ViewModule::markup(DEFAULT_NOT_FOUND_MARKUP),
			global_guard: None,
		}
	}

	/// Registers a route. Registration order is match order.
	pub fn route(mut self, route: Route) -> Self {
		self.routes.register(route);
		self
	}

	/// Replaces the configuration.
	pub fn config(mut self, config: NavigatorConfig) -> Self {
		self.config = config;
		self
	}

	/// Replaces the default back route rules.
	pub fn back_routes(mut self, back_routes: BackRoutes) -> Self {
		self.back_routes = back_routes;
		self
	}

	/// Sets the view rendered when nothing can be mounted.
	pub fn not_found(mut self, view: ViewModule) -> Self {
		self.not_found = view;
		self
	}

	/// Sets the global guard.
	pub fn global_guard(mut self, guard: Guard) -> Self {
		self.global_guard = Some(guard);
		self
	}

	/// Builds the navigator.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Config`] if the configuration is invalid.
	pub fn build(self) -> Result<Navigator> {
		self.config.validate()?;
		Ok(Navigator {
			routes: self.routes,
			modules: Arc::new(ModuleCache::new()),
			host: self.host,
			back_routes: self.back_routes,
			not_found: self.not_found,
			global_guard: RwLock::new(self.global_guard),
			state: Mutex::new(NavigatorState {
				history: NavigationHistory::new(self.config.history_capacity),
				active: None,
				previous_route: None,
				pending_echo: None,
			}),
			config: self.config,
			sequence: AtomicU64::new(0),
			started: AtomicBool::new(false),
		})
	}
}
