//! Navigator configuration.

use crate::error::{Result, RouterError};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_history_capacity() -> usize {
	DEFAULT_HISTORY_CAPACITY
}

fn default_max_redirects() -> usize {
	5
}

fn default_prefetch_delay_ms() -> u64 {
	1500
}

fn default_title() -> String {
	"Volley".to_string()
}

fn default_not_found_title() -> String {
	"Not Found".to_string()
}

/// Tunables for a [`Navigator`](crate::Navigator).
///
/// Every field has a default, so a partial TOML document is enough:
///
/// ```
/// use volley_router::NavigatorConfig;
///
/// let config = NavigatorConfig::from_toml_str("max_redirects = 3").unwrap();
/// assert_eq!(config.max_redirects, 3);
/// assert_eq!(config.history_capacity, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorConfig {
	/// Maximum number of recorded history entries.
	#[serde(default = "default_history_capacity")]
	pub history_capacity: usize,

	/// Maximum chained guard redirects per navigation.
	#[serde(default = "default_max_redirects")]
	pub max_redirects: usize,

	/// Delay before flagged routes are prefetched after startup.
	#[serde(default = "default_prefetch_delay_ms")]
	pub prefetch_delay_ms: u64,

	/// Title used by routes without their own.
	#[serde(default = "default_title")]
	pub default_title: String,

	/// Title shown with the not-found surface.
	#[serde(default = "default_not_found_title")]
	pub not_found_title: String,
}

impl Default for NavigatorConfig {
	fn default() -> Self {
		Self {
			history_capacity: default_history_capacity(),
			max_redirects: default_max_redirects(),
			prefetch_delay_ms: default_prefetch_delay_ms(),
			default_title: default_title(),
			not_found_title: default_not_found_title(),
		}
	}
}

impl NavigatorConfig {
	/// Parses and validates a TOML document.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Config`] on malformed TOML or invalid values.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		let config: Self = toml::from_str(source).map_err(|e| RouterError::Config(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Checks value ranges.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Config`] if `history_capacity` is zero.
	pub fn validate(&self) -> Result<()> {
		if self.history_capacity == 0 {
			return Err(RouterError::Config(
				"history_capacity must be at least 1".to_string(),
			));
		}
		Ok(())
	}

	/// Returns the prefetch delay as a [`Duration`].
	pub fn prefetch_delay(&self) -> Duration {
		Duration::from_millis(self.prefetch_delay_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_empty_document_uses_defaults() {
		let config = NavigatorConfig::from_toml_str("").unwrap();

		assert_eq!(config, NavigatorConfig::default());
		assert_eq!(config.prefetch_delay(), Duration::from_millis(1500));
	}

	#[rstest]
	fn test_full_document() {
		// Arrange
		let source = r#"
			history_capacity = 4
			max_redirects = 2
			prefetch_delay_ms = 0
			default_title = "Pong"
			not_found_title = "Lost"
		"#;

		// Act
		let config = NavigatorConfig::from_toml_str(source).unwrap();

		// Assert
		assert_eq!(config.history_capacity, 4);
		assert_eq!(config.max_redirects, 2);
		assert_eq!(config.prefetch_delay(), Duration::ZERO);
		assert_eq!(config.default_title, "Pong");
		assert_eq!(config.not_found_title, "Lost");
	}

	#[rstest]
	#[case("history_capacity = 0")]
	#[case("max_redirects = \"many\"")]
	fn test_invalid_documents_rejected(#[case] source: &str) {
		let result = NavigatorConfig::from_toml_str(source);

		assert!(matches!(result, Err(RouterError::Config(_))));
	}
}
