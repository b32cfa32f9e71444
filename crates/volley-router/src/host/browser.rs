//! Browser host backed by the History API.

use super::Host;
use crate::navigator::Navigator;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Host rendering into a DOM element and driving `window.history`.
#[derive(Debug, Clone)]
pub struct BrowserHost {
	/// `id` of the element receiving rendered markup.
	outlet_id: String,
}

impl BrowserHost {
	/// Creates a host rendering into the element with id `outlet_id`.
	pub fn new(outlet_id: impl Into<String>) -> Self {
		Self {
			outlet_id: outlet_id.into(),
		}
	}
}

impl Host for BrowserHost {
	fn render(&self, markup: &str) {
		let outlet = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.get_element_by_id(&self.outlet_id));
		match outlet {
			Some(element) => element.set_inner_html(markup),
			None => tracing::warn!(outlet = %self.outlet_id, "render outlet not found"),
		}
	}

	fn set_title(&self, title: &str) {
		if let Some(document) = web_sys::window().and_then(|w| w.document()) {
			document.set_title(title);
		}
	}

	fn current_path(&self) -> String {
		web_sys::window()
			.and_then(|w| w.location().pathname().ok())
			.unwrap_or_else(|| "/".to_string())
	}

	fn push_state(&self, path: &str, index: usize) {
		let result = web_sys::window()
			.ok_or_else(|| JsValue::from_str("window not available"))
			.and_then(|w| w.history())
			.and_then(|h| h.push_state_with_url(&JsValue::from_f64(index as f64), "", Some(path)));
		if let Err(err) = result {
			tracing::warn!(path, error = ?err, "pushState failed");
		}
	}

	fn replace_state(&self, path: &str, index: usize) {
		let result = web_sys::window()
			.ok_or_else(|| JsValue::from_str("window not available"))
			.and_then(|w| w.history())
			.and_then(|h| h.replace_state_with_url(&JsValue::from_f64(index as f64), "", Some(path)));
		if let Err(err) = result {
			tracing::warn!(path, error = ?err, "replaceState failed");
		}
	}

	fn go(&self, delta: isize) {
		let delta = i32::try_from(delta).unwrap_or(0);
		let result = web_sys::window()
			.ok_or_else(|| JsValue::from_str("window not available"))
			.and_then(|w| w.history())
			.and_then(|h| h.go_with_delta(delta));
		if let Err(err) = result {
			tracing::warn!(delta, error = ?err, "history.go failed");
		}
	}

	fn reports_traversal(&self) -> bool {
		true
	}

	fn spawn(&self, task: BoxFuture<'static, ()>) {
		wasm_bindgen_futures::spawn_local(task);
	}

	fn spawn_after(&self, delay: Duration, task: BoxFuture<'static, ()>) {
		let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
		wasm_bindgen_futures::spawn_local(async move {
			gloo_timers::future::TimeoutFuture::new(millis).await;
			task.await;
		});
	}
}

/// Forwards browser back/forward events to `navigator`.
///
/// The listener lives for the lifetime of the page.
pub fn listen_popstate(navigator: Arc<Navigator>) -> Result<(), JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("window not available"))?;

	let closure = Closure::<dyn FnMut(web_sys::PopStateEvent)>::new(
		move |event: web_sys::PopStateEvent| {
			let path = web_sys::window()
				.and_then(|w| w.location().pathname().ok())
				.unwrap_or_else(|| "/".to_string());
			let index = event.state().as_f64().map(|i| i as usize);
			let navigator = Arc::clone(&navigator);
			wasm_bindgen_futures::spawn_local(async move {
				if let Err(err) = navigator.handle_popstate(&path, index).await {
					tracing::error!(path = %path, error = %err, "popstate navigation failed");
				}
			});
		},
	);

	window.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())?;
	// Keep the closure alive for the lifetime of the page
	closure.forget();
	Ok(())
}
