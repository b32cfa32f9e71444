//! View module contract.
//!
//! A view module is the unit the router mounts: a render function producing a
//! markup string, and an optional mount function wiring up behavior after the
//! markup is in place. Mounting may hand back a [`Cleanup`] which the router
//! invokes before the next view is mounted.

use crate::error::LoadError;
use crate::pattern::RouteParams;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Teardown returned by a view's mount step.
pub type Cleanup = Box<dyn FnOnce() + Send>;

type RenderFn = Arc<dyn Fn(&RouteParams) -> String + Send + Sync>;
type MountFn = Arc<dyn Fn(&RouteParams) -> Option<Cleanup> + Send + Sync>;

/// Deferred loader producing a view module on demand.
pub type Loader = Arc<dyn Fn() -> BoxFuture<'static, Result<ViewModule, LoadError>> + Send + Sync>;

/// A renderable view with optional mount logic.
#[derive(Clone)]
pub struct ViewModule {
	render: RenderFn,
	mount: Option<MountFn>,
}

impl std::fmt::Debug for ViewModule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ViewModule")
			.field("has_mount", &self.mount.is_some())
			.finish()
	}
}

impl ViewModule {
	/// Creates a view module from a render function.
	pub fn new<R>(render: R) -> Self
	where
		R: Fn(&RouteParams) -> String + Send + Sync + 'static,
	{
		Self {
			render: Arc::new(render),
			mount: None,
		}
	}

	/// Creates a view module that always renders the same markup.
	pub fn markup(markup: impl Into<String>) -> Self {
		let markup = markup.into();
		Self::new(move |_| markup.clone())
	}

	/// Adds mount logic.
	///
	/// The closure runs after the markup has been handed to the host; any
	/// returned cleanup is retained as the active view handle.
	pub fn with_mount<M>(mut self, mount: M) -> Self
	where
		M: Fn(&RouteParams) -> Option<Cleanup> + Send + Sync + 'static,
	{
		self.mount = Some(Arc::new(mount));
		self
	}

	/// Produces the markup for `params`.
	pub fn render(&self, params: &RouteParams) -> String {
		(self.render)(params)
	}

	/// Runs the mount step, if any.
	pub fn mount(&self, params: &RouteParams) -> Option<Cleanup> {
		self.mount.as_ref().and_then(|mount| mount(params))
	}

	/// Returns `true` if the module has mount logic.
	pub fn has_mount(&self) -> bool {
		self.mount.is_some()
	}

	/// Returns `true` if both values share the same render function.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.render, &other.render)
	}
}

/// Cleanup of the currently mounted view.
pub struct ActiveViewHandle {
	route: String,
	cleanup: Cleanup,
}

impl std::fmt::Debug for ActiveViewHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActiveViewHandle")
			.field("route", &self.route)
			.finish_non_exhaustive()
	}
}

impl ActiveViewHandle {
	pub(crate) fn new(route: impl Into<String>, cleanup: Cleanup) -> Self {
		Self {
			route: route.into(),
			cleanup,
		}
	}

	/// Pattern of the route that mounted this view.
	pub fn route(&self) -> &str {
		&self.route
	}

	/// Runs the cleanup to completion, consuming the handle.
	pub fn release(self) {
		(self.cleanup)()
	}
}

/// Wraps an async function as a [`Loader`].
pub fn loader<F, Fut>(load: F) -> Loader
where
	F: Fn() -> Fut + Send + Sync + 'static,
	Fut: std::future::Future<Output = Result<ViewModule, LoadError>> + Send + 'static,
{
	Arc::new(move || Box::pin(load()) as BoxFuture<'static, _>)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::atomic::{AtomicBool, Ordering};

	#[rstest]
	fn test_render_uses_params() {
		let view = ViewModule::new(|params| format!("<h1>{}</h1>", params.get("id").unwrap_or("")));
		let params: RouteParams = [("id", "abc")].into_iter().collect();

		assert_eq!(view.render(&params), "<h1>abc</h1>");
		assert!(!view.has_mount());
	}

	#[rstest]
	fn test_mount_returns_cleanup_and_release_runs_it() {
		// Arrange
		let released = Arc::new(AtomicBool::new(false));
		let flag = Arc::clone(&released);
		let view = ViewModule::markup("<div></div>").with_mount(move |_| {
			let flag = Arc::clone(&flag);
			Some(Box::new(move || flag.store(true, Ordering::SeqCst)) as Cleanup)
		});

		// Act
		let cleanup = view.mount(&RouteParams::new()).unwrap();
		let handle = ActiveViewHandle::new("/play", cleanup);
		handle.release();

		// Assert
		assert!(released.load(Ordering::SeqCst));
	}

	#[rstest]
	fn test_clones_share_render_fn() {
		let view = ViewModule::markup("x");
		let other = ViewModule::markup("x");

		assert!(view.ptr_eq(&view.clone()));
		assert!(!view.ptr_eq(&other));
	}
}
