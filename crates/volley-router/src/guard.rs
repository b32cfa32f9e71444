//! Route guards.
//!
//! A guard inspects a pending navigation and allows it, denies it, or
//! redirects it elsewhere. The navigator runs the global guard first and the
//! route's own guard second, awaiting each in turn and stopping at the first
//! outcome that is not [`GuardOutcome::Allow`].

use crate::pattern::RouteParams;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Result of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
	/// Continue the navigation.
	Allow,
	/// Stop silently; the current view stays on screen.
	Deny,
	/// Stop and navigate to the given path instead.
	Redirect(String),
}

impl GuardOutcome {
	/// Returns `true` for [`GuardOutcome::Allow`].
	pub fn is_allow(&self) -> bool {
		matches!(self, Self::Allow)
	}
}

impl From<bool> for GuardOutcome {
	fn from(allowed: bool) -> Self {
		if allowed { Self::Allow } else { Self::Deny }
	}
}

impl From<String> for GuardOutcome {
	fn from(path: String) -> Self {
		Self::Redirect(path)
	}
}

impl From<&str> for GuardOutcome {
	fn from(path: &str) -> Self {
		Self::Redirect(path.to_string())
	}
}

/// What a guard sees about the pending navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardContext {
	/// Concrete path being navigated to.
	pub path: String,
	/// Pattern of the matched target route.
	pub target: String,
	/// Pattern of the route active before this navigation, if any.
	pub previous: Option<String>,
	/// Parameters extracted from `path`.
	pub params: RouteParams,
}

type GuardFn = Arc<dyn Fn(GuardContext) -> BoxFuture<'static, GuardOutcome> + Send + Sync>;

/// An access-control check run before a navigation commits.
#[derive(Clone)]
pub struct Guard {
	check: GuardFn,
}

impl std::fmt::Debug for Guard {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Guard").finish_non_exhaustive()
	}
}

impl Guard {
	/// Creates a guard from a synchronous check.
	///
	/// The closure may return `bool`, a redirect path, or a [`GuardOutcome`].
	///
	/// # Example
	///
	/// ```
	/// use volley_router::{Guard, GuardOutcome};
	///
	/// let members_only = Guard::new(|ctx| {
	/// 	if ctx.previous.is_some() {
	/// 		GuardOutcome::Allow
	/// 	} else {
	/// 		GuardOutcome::Redirect("/login".to_string())
	/// 	}
	/// });
	/// let closed = Guard::new(|_| false);
	/// # let _ = (members_only, closed);
	/// ```
	pub fn new<F, O>(check: F) -> Self
	where
		F: Fn(&GuardContext) -> O + Send + Sync + 'static,
		O: Into<GuardOutcome>,
	{
		Self {
			check: Arc::new(move |ctx: GuardContext| {
				let outcome = check(&ctx).into();
				Box::pin(futures::future::ready(outcome)) as BoxFuture<'static, GuardOutcome>
			}),
		}
	}

	/// Creates a guard from an asynchronous check.
	pub fn from_async<F, Fut, O>(check: F) -> Self
	where
		F: Fn(GuardContext) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = O> + Send + 'static,
		O: Into<GuardOutcome>,
	{
		Self {
			check: Arc::new(move |ctx: GuardContext| {
				let pending = check(ctx);
				Box::pin(async move { pending.await.into() }) as BoxFuture<'static, GuardOutcome>
			}),
		}
	}

	/// Runs the check.
	pub async fn check(&self, ctx: GuardContext) -> GuardOutcome {
		(self.check)(ctx).await
	}
}

/// Ordered guards for a single navigation attempt.
#[derive(Debug, Default)]
pub struct GuardPipeline<'a> {
	guards: Vec<&'a Guard>,
}

impl<'a> GuardPipeline<'a> {
	/// Builds the pipeline: the global guard, then the route guard.
	pub fn new(global: Option<&'a Guard>, route: Option<&'a Guard>) -> Self {
		Self {
			guards: global.into_iter().chain(route).collect(),
		}
	}

	/// Returns the number of guards that will run.
	pub fn len(&self) -> usize {
		self.guards.len()
	}

	/// Returns `true` if no guard is configured.
	pub fn is_empty(&self) -> bool {
		self.guards.is_empty()
	}

	/// Awaits each guard in order, short-circuiting on deny or redirect.
	pub async fn run(&self, ctx: &GuardContext) -> GuardOutcome {
		for guard in &self.guards {
			let outcome = guard.check(ctx.clone()).await;
			if !outcome.is_allow() {
				return outcome;
			}
		}
		GuardOutcome::Allow
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn context() -> GuardContext {
		GuardContext {
			path: "/secret".to_string(),
			target: "/secret".to_string(),
			previous: Some("/play".to_string()),
			params: RouteParams::new(),
		}
	}

	#[rstest]
	#[case(true, GuardOutcome::Allow)]
	#[case(false, GuardOutcome::Deny)]
	fn test_outcome_from_bool(#[case] allowed: bool, #[case] expected: GuardOutcome) {
		assert_eq!(GuardOutcome::from(allowed), expected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_empty_pipeline_allows() {
		let pipeline = GuardPipeline::new(None, None);

		assert!(pipeline.is_empty());
		assert_eq!(pipeline.run(&context()).await, GuardOutcome::Allow);
	}

	#[rstest]
	#[tokio::test]
	async fn test_global_deny_short_circuits_route_guard() {
		// Arrange
		let route_calls = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&route_calls);
		let global = Guard::new(|_| false);
		let route = Guard::new(move |_| {
			counter.fetch_add(1, Ordering::SeqCst);
			true
		});
		let pipeline = GuardPipeline::new(Some(&global), Some(&route));

		// Act
		let outcome = pipeline.run(&context()).await;

		// Assert
		assert_eq!(outcome, GuardOutcome::Deny);
		assert_eq!(route_calls.load(Ordering::SeqCst), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_async_route_guard_redirects() {
		// Arrange
		let global = Guard::new(|_| true);
		let route = Guard::from_async(|ctx: GuardContext| async move {
			tokio::task::yield_now().await;
			format!("/login?next={}", ctx.path)
		});
		let pipeline = GuardPipeline::new(Some(&global), Some(&route));

		// Act
		let outcome = pipeline.run(&context()).await;

		// Assert
		assert_eq!(outcome, GuardOutcome::Redirect("/login?next=/secret".to_string()));
	}

	#[rstest]
	#[tokio::test]
	async fn test_guard_sees_previous_route() {
		let guard = Guard::new(|ctx| ctx.previous.as_deref() == Some("/play"));

		assert_eq!(guard.check(context()).await, GuardOutcome::Allow);
	}
}
