//! Error types for client-side navigation.

use thiserror::Error;

/// Result type for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;

/// Failure reported by a deferred view loader.
///
/// The error travels through a shared in-flight load, so every navigation
/// awaiting the same load receives its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
	message: String,
}

impl LoadError {
	/// Creates a load error with the given message.
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}

	/// Returns the error message.
	pub fn message(&self) -> &str {
		&self.message
	}
}

impl From<String> for LoadError {
	fn from(message: String) -> Self {
		Self::new(message)
	}
}

impl From<&str> for LoadError {
	fn from(message: &str) -> Self {
		Self::new(message)
	}
}

/// Router errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RouterError {
	/// No registered pattern matches the path.
	#[error("route not found: {0}")]
	NoRouteMatch(String),

	/// A deferred loader failed to produce a view module.
	#[error("failed to load view for route '{route}': {source}")]
	ModuleLoad {
		/// Pattern of the route whose loader failed.
		route: String,
		/// Loader failure.
		#[source]
		source: LoadError,
	},

	/// Guards kept redirecting past the configured limit.
	#[error("redirect limit of {limit} exceeded while navigating to '{path}'")]
	RedirectLimit {
		/// Last redirect target.
		path: String,
		/// Configured limit.
		limit: usize,
	},

	/// A route pattern could not be compiled.
	#[error("invalid route pattern '{pattern}': {reason}")]
	InvalidPattern {
		/// The offending pattern.
		pattern: String,
		/// Why it was rejected.
		reason: String,
	},

	/// Configuration could not be parsed or failed validation.
	#[error("invalid navigator configuration: {0}")]
	Config(String),
}
