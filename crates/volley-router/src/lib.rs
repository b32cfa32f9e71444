//! # Volley Router
//!
//! Client-side navigation runtime for the Volley single-page application.
//!
//! The runtime maps URL paths to views, loads deferred views on first use,
//! runs guards before committing a navigation, and keeps its own bounded
//! history in step with the host's back/forward stack.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use volley_router::{Guard, MemoryHost, NavigationOutcome, Navigator, Route, ViewModule};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> volley_router::Result<()> {
//! let host = Arc::new(MemoryHost::new("/"));
//! let navigator = Navigator::builder(host.clone())
//! 	.route(Route::eager("/", ViewModule::markup("<h1>Home</h1>")).with_title("Home"))
//! 	.route(
//! 		Route::eager("/game/:id", ViewModule::new(|params| {
//! 			format!("<h1>Game {}</h1>", params.get("id").unwrap_or("?"))
//! 		}))
//! 		.with_guard(Guard::new(|ctx| ctx.previous.is_some())),
//! 	)
//! 	.build()?;
//!
//! navigator.start().await?;
//! let outcome = navigator.navigate("/game/42").await?;
//!
//! assert!(outcome.is_mounted());
//! assert_eq!(host.content().as_deref(), Some("<h1>Game 42</h1>"));
//! assert!(matches!(
//! 	navigator.navigate("/nowhere").await?,
//! 	NavigationOutcome::NotFound { .. }
//! ));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`pattern`]: path patterns and parameter extraction
//! - [`route`]: route definitions and the ordered route table
//! - [`view`]: view modules and mounted-view cleanup
//! - [`loader`]: cached, de-duplicated loading of deferred views
//! - [`guard`]: navigation guards and the guard pipeline
//! - [`history`]: bounded history and default back routes
//! - [`host`]: the page services the navigator depends on
//! - [`navigator`]: the navigation lifecycle

pub mod config;
pub mod error;
pub mod guard;
pub mod history;
pub mod host;
pub mod loader;
pub mod navigator;
pub mod pattern;
pub mod route;
pub mod view;

pub use config::NavigatorConfig;
pub use error::{LoadError, Result, RouterError};
pub use guard::{Guard, GuardContext, GuardOutcome, GuardPipeline};
pub use history::{BackRoutes, DEFAULT_HISTORY_CAPACITY, HistorySync, NavigationHistory};
pub use host::Host;
#[cfg(target_arch = "wasm32")]
pub use host::{BrowserHost, listen_popstate};
#[cfg(not(target_arch = "wasm32"))]
pub use host::MemoryHost;
pub use loader::ModuleCache;
pub use navigator::{NavigationOutcome, Navigator, NavigatorBuilder};
pub use pattern::{RouteParams, RoutePattern};
pub use route::{Route, RouteMatch, RouteTable, ViewSource};
pub use view::{ActiveViewHandle, Cleanup, Loader, ViewModule, loader};
