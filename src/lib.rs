//! # Volley
//!
//! Navigation runtime for the Volley single-page application.
//!
//! This crate re-exports [`volley_router`] and provides a [`prelude`] with the
//! types an application needs to declare routes and drive navigation.
//!
//! ## Quick Example
//!
//! ```
//! use std::sync::Arc;
//! use volley::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> volley::Result<()> {
//! let host = Arc::new(MemoryHost::new("/"));
//! let navigator = Navigator::builder(host.clone())
//! 	.route(Route::eager("/", ViewModule::markup("<h1>Volley</h1>")))
//! 	.route(Route::deferred("/play", || async {
//! 		Ok(ViewModule::markup("<section id=\"lobby\"></section>"))
//! 	}))
//! 	.build()?;
//!
//! navigator.start().await?;
//! assert_eq!(host.content().as_deref(), Some("<h1>Volley</h1>"));
//! # Ok(())
//! # }
//! ```

pub use volley_router as router;

pub use volley_router::{NavigationOutcome, Navigator, NavigatorConfig, Result, RouterError};

/// Commonly used types.
pub mod prelude {
	pub use volley_router::{
		BackRoutes, Cleanup, Guard, GuardContext, GuardOutcome, Host, LoadError, NavigationOutcome,
		Navigator, NavigatorConfig, Route, RouteParams, RouterError, ViewModule,
	};

	#[cfg(not(target_arch = "wasm32"))]
	pub use volley_router::MemoryHost;

	#[cfg(target_arch = "wasm32")]
	pub use volley_router::{BrowserHost, listen_popstate};
}
