//! In-memory host.

use super::Host;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::time::Duration;

#[derive(Debug)]
struct MemoryState {
	rendered: Vec<String>,
	title: String,
	/// Platform stack of `(path, index payload)`.
	stack: Vec<(String, usize)>,
	position: usize,
}

/// Host that keeps the page and the platform history stack in memory.
///
/// Background tasks are spawned on the ambient tokio runtime, so the host must
/// be used from within one.
#[derive(Debug)]
pub struct MemoryHost {
	state: Mutex<MemoryState>,
}

impl Default for MemoryHost {
	fn default() -> Self {
		Self::new("/")
	}
}

impl MemoryHost {
	/// Creates a host whose platform location starts at `initial_path`.
	pub fn new(initial_path: impl Into<String>) -> Self {
		Self {
			state: Mutex::new(MemoryState {
				rendered: Vec::new(),
				title: String::new(),
				stack: vec![(initial_path.into(), 0)],
				position: 0,
			}),
		}
	}

	/// Returns the markup most recently rendered.
	pub fn content(&self) -> Option<String> {
		self.state.lock().rendered.last().cloned()
	}

	/// Returns every render, oldest first.
	pub fn renders(&self) -> Vec<String> {
		self.state.lock().rendered.clone()
	}

	/// Returns the current title.
	pub fn title(&self) -> String {
		self.state.lock().title.clone()
	}

	/// Returns the platform stack paths, oldest first.
	pub fn stack(&self) -> Vec<String> {
		self.state
			.lock()
			.stack
			.iter()
			.map(|(path, _)| path.clone())
			.collect()
	}

	/// Moves the platform stack back one entry, like the browser back button.
	///
	/// Returns the landed-on path and its index payload, which the caller
	/// forwards to [`Navigator::handle_popstate`](crate::Navigator::handle_popstate).
	pub fn back(&self) -> Option<(String, usize)> {
		let mut state = self.state.lock();
		state.position = state.position.checked_sub(1)?;
		state.stack.get(state.position).cloned()
	}

	/// Moves the platform stack forward one entry.
	pub fn forward(&self) -> Option<(String, usize)> {
		let mut state = self.state.lock();
		let entry = state.stack.get(state.position + 1).cloned()?;
		state.position += 1;
		Some(entry)
	}
}

impl Host for MemoryHost {
	fn render(&self, markup: &str) {
		self.state.lock().rendered.push(markup.to_string());
	}

	fn set_title(&self, title: &str) {
		self.state.lock().title = title.to_string();
	}

	fn current_path(&self) -> String {
		let state = self.state.lock();
		state
			.stack
			.get(state.position)
			.map(|(path, _)| path.clone())
			.unwrap_or_else(|| "/".to_string())
	}

	fn push_state(&self, path: &str, index: usize) {
		let mut state = self.state.lock();
		let keep = state.position + 1;
		state.stack.truncate(keep);
		state.stack.push((path.to_string(), index));
		state.position = state.stack.len() - 1;
	}

	fn replace_state(&self, path: &str, index: usize) {
		let mut state = self.state.lock();
		let position = state.position;
		if let Some(entry) = state.stack.get_mut(position) {
			*entry = (path.to_string(), index);
		}
	}

	fn go(&self, delta: isize) {
		let mut state = self.state.lock();
		let last = state.stack.len().saturating_sub(1);
		state.position = state.position.saturating_add_signed(delta).min(last);
	}

	fn spawn(&self, task: BoxFuture<'static, ()>) {
		tokio::spawn(task);
	}

	fn spawn_after(&self, delay: Duration, task: BoxFuture<'static, ()>) {
		tokio::spawn(async move {
			tokio::time::sleep(delay).await;
			task.await;
		});
	}
}
