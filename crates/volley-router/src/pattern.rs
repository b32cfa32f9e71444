//! Path pattern compilation and matching.
//!
//! Patterns use `:name` segments for parameters:
//! - `/play` - Exact match
//! - `/game/:id` - Single path parameter
//! - `/a/:x/b/:y` - Multiple parameters, captured in declaration order
//!
//! A parameter captures one path segment and never crosses a `/`.

use crate::error::{Result, RouterError};
use std::collections::HashMap;

/// Maximum allowed length for a pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in a pattern.
const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled pattern regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Path parameters extracted from a matched path.
///
/// Values are kept in the order their names appear in the pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
	entries: Vec<(String, String)>,
}

impl RouteParams {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a parameter.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.entries.push((name.into(), value.into()));
	}

	/// Returns the value captured for `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	/// Returns the number of captured parameters.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if nothing was captured.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over `(name, value)` pairs in pattern order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries
			.iter()
			.map(|(name, value)| (name.as_str(), value.as_str()))
	}

	/// Returns the captured values in pattern order.
	pub fn values(&self) -> Vec<&str> {
		self.entries.iter().map(|(_, value)| value.as_str()).collect()
	}

	/// Converts the parameters into an unordered map.
	pub fn to_map(&self) -> HashMap<String, String> {
		self.entries.iter().cloned().collect()
	}
}

impl<N, V> FromIterator<(N, V)> for RouteParams
where
	N: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
		let mut params = Self::new();
		for (name, value) in iter {
			params.insert(name, value);
		}
		params
	}
}

/// A compiled route pattern.
///
/// Patterns without `:` markers match by exact string equality; parameterized
/// patterns compile once into an anchored regex whose capture groups line up
/// positionally with [`param_names`](Self::param_names).
#[derive(Debug, Clone)]
pub struct RoutePattern {
	/// The original pattern string.
	pattern: String,
	/// Compiled regex, absent for exact patterns.
	regex: Option<regex::Regex>,
	/// Parameter names in order.
	param_names: Vec<String>,
}

impl RoutePattern {
	/// Compiles a pattern string.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`] if:
	/// - the pattern does not start with `/`
	/// - the pattern exceeds 1024 bytes or 32 segments
	/// - a `:` marker has an empty or non-identifier name
	/// - the compiled regex is rejected
	pub fn new(pattern: &str) -> Result<Self> {
		let invalid = |reason: String| RouterError::InvalidPattern {
			pattern: pattern.to_string(),
			reason,
		};

		if !pattern.starts_with('/') {
			return Err(invalid("pattern must start with '/'".to_string()));
		}

		// Reject patterns exceeding the maximum length to prevent ReDoS
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(invalid(format!(
				"pattern length {} exceeds maximum allowed length of {} bytes",
				pattern.len(),
				MAX_PATTERN_LENGTH
			)));
		}

		let segment_count = pattern.split('/').count();
		if segment_count > MAX_PATH_SEGMENTS {
			return Err(invalid(format!(
				"pattern has {} path segments, exceeding maximum of {}",
				segment_count, MAX_PATH_SEGMENTS
			)));
		}

		if !pattern.contains(':') {
			return Ok(Self {
				pattern: pattern.to_string(),
				regex: None,
				param_names: Vec::new(),
			});
		}

		let (regex_str, param_names) = Self::compile_pattern(pattern).map_err(invalid)?;

		let regex = regex::RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| invalid(format!("failed to compile pattern regex: {}", e)))?;

		Ok(Self {
			pattern: pattern.to_string(),
			regex: Some(regex),
			param_names,
		})
	}

	/// Translates `:name` segments into capture groups.
	fn compile_pattern(pattern: &str) -> std::result::Result<(String, Vec<String>), String> {
		let mut regex_str = String::from("^");
		let mut param_names = Vec::new();

		for (i, segment) in pattern.split('/').enumerate() {
			if i > 0 {
				regex_str.push('/');
			}
			match segment.strip_prefix(':') {
				Some(name) => {
					if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
					{
						return Err(format!("invalid parameter name ':{}'", name));
					}
					if param_names.iter().any(|existing| existing == name) {
						return Err(format!("duplicate parameter name ':{}'", name));
					}
					param_names.push(name.to_string());
					regex_str.push_str("([^/]+)");
				}
				None => regex_str.push_str(&regex::escape(segment)),
			}
		}

		regex_str.push('$');
		Ok((regex_str, param_names))
	}

	/// Returns the original pattern string.
	pub fn as_str(&self) -> &str {
		&self.pattern
	}

	/// Returns the parameter names in declaration order.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns whether this pattern matches by string equality only.
	pub fn is_exact(&self) -> bool {
		self.regex.is_none()
	}

	/// Attempts to match a concrete path.
	pub fn matches(&self, path: &str) -> Option<RouteParams> {
		let Some(regex) = &self.regex else {
			return (self.pattern == path).then(RouteParams::new);
		};

		let caps = regex.captures(path)?;
		Some(
			self.param_names
				.iter()
				.enumerate()
				.filter_map(|(i, name)| caps.get(i + 1).map(|m| (name.clone(), m.as_str())))
				.collect(),
		)
	}

	/// Checks if this pattern would match the given path.
	pub fn is_match(&self, path: &str) -> bool {
		match &self.regex {
			Some(regex) => regex.is_match(path),
			None => self.pattern == path,
		}
	}

	/// Builds a concrete path from this pattern.
	///
	/// Returns `None` if a parameter is missing or its value contains `/`.
	pub fn reverse(&self, params: &RouteParams) -> Option<String> {
		let mut segments = Vec::new();
		for segment in self.pattern.split('/') {
			match segment.strip_prefix(':') {
				Some(name) => {
					let value = params.get(name)?;
					if value.is_empty() || value.contains('/') {
						return None;
					}
					segments.push(value);
				}
				None => segments.push(segment),
			}
		}
		Some(segments.join("/"))
	}
}

impl PartialEq for RoutePattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for RoutePattern {}

impl std::fmt::Display for RoutePattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.pattern)
	}
}
