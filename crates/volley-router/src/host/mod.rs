//! Host environment touchpoints.
//!
//! The navigator never talks to a browser directly. Everything it needs from
//! the page (a content sink, the platform history stack, the title, a task
//! executor) goes through the [`Host`] trait.
//!
//! - [`MemoryHost`]: in-memory host driven by tokio, for native builds and tests
//! - [`BrowserHost`]: `web-sys` backed host for `wasm32` builds

#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(not(target_arch = "wasm32"))]
mod memory;

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserHost, listen_popstate};
#[cfg(not(target_arch = "wasm32"))]
pub use memory::MemoryHost;

use futures::future::BoxFuture;
use std::time::Duration;

/// Services the navigator consumes from the page it runs in.
pub trait Host: Send + Sync {
	/// Replaces the page content with `markup`.
	fn render(&self, markup: &str);

	/// Sets the document title.
	fn set_title(&self, title: &str);

	/// Returns the path currently shown by the platform.
	fn current_path(&self) -> String;

	/// Pushes a platform history entry carrying `index` as its payload.
	fn push_state(&self, path: &str, index: usize);

	/// Replaces the current platform history entry.
	fn replace_state(&self, path: &str, index: usize);

	/// Moves the platform history position by `delta` entries.
	fn go(&self, delta: isize);

	/// Returns `true` if a move made through [`go`](Host::go) is later
	/// reported back as a back/forward event.
	fn reports_traversal(&self) -> bool {
		false
	}

	/// Runs `task` in the background.
	fn spawn(&self, task: BoxFuture<'static, ()>);

	/// Runs `task` in the background once `delay` has elapsed.
	fn spawn_after(&self, delay: Duration, task: BoxFuture<'static, ()>);
}
