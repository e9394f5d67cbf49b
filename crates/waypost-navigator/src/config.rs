//! Navigator configuration.
//!
//! ```
//! use waypost_navigator::{ModeConfig, NavigatorConfig};
//!
//! let config = NavigatorConfig::from_json(r#"{"mode": {"kind": "hash"}}"#).unwrap();
//! assert_eq!(config.mode, ModeConfig::Hash);
//! assert_eq!(config.pop_timeout_ms, 500);
//! ```

use crate::mode::{HashMode, HistoryMode, Mode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use waypost_core::{Result, RouterError};

/// Default time `go`/`pop` wait for a `popstate` event.
pub const DEFAULT_POP_TIMEOUT_MS: u64 = 500;

fn default_base_path() -> String {
	"/".to_string()
}

/// Which [`Mode`] the navigator uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModeConfig {
	/// [`HistoryMode`] mounted at `base_path`.
	History {
		/// Base path the application is served from.
		#[serde(default = "default_base_path")]
		base_path: String,
	},
	/// [`HashMode`].
	Hash,
}

impl Default for ModeConfig {
	fn default() -> Self {
		Self::History {
			base_path: default_base_path(),
		}
	}
}

impl ModeConfig {
	/// Builds the configured mode.
	pub fn build(&self) -> Box<dyn Mode> {
		match self {
			Self::History { base_path } => Box::new(HistoryMode::new(base_path)),
			Self::Hash => Box::new(HashMode),
		}
	}
}

/// Settings for a [`Navigator`](crate::Navigator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
	/// URL mode, used when no mode is passed explicitly.
	pub mode: ModeConfig,
	/// How long `go` and `pop` wait for `popstate`, in milliseconds.
	pub pop_timeout_ms: u64,
}

impl Default for NavigatorConfig {
	fn default() -> Self {
		Self {
			mode: ModeConfig::default(),
			pop_timeout_ms: DEFAULT_POP_TIMEOUT_MS,
		}
	}
}

impl NavigatorConfig {
	/// Parses a configuration from JSON. Missing fields take their defaults.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Config`] if the JSON is malformed.
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(|e| RouterError::Config(e.to_string()))
	}

	/// Returns the pop timeout.
	pub fn pop_timeout(&self) -> Duration {
		Duration::from_millis(self.pop_timeout_ms)
	}

	/// Sets the pop timeout.
	pub fn with_pop_timeout(mut self, timeout: Duration) -> Self {
		self.pop_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
		self
	}

	/// Sets the mode.
	pub fn with_mode(mut self, mode: ModeConfig) -> Self {
		self.mode = mode;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mode::Location;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let config = NavigatorConfig::default();
		assert_eq!(config.pop_timeout(), Duration::from_millis(500));
		assert_eq!(
			config.mode,
			ModeConfig::History {
				base_path: "/".to_string()
			}
		);
		assert_eq!(NavigatorConfig::from_json("{}").unwrap(), config);
	}

	#[rstest]
	fn test_history_mode_from_json() {
		let config = NavigatorConfig::from_json(
			r#"{"mode": {"kind": "history", "base_path": "/app"}, "pop_timeout_ms": 50}"#,
		)
		.unwrap();

		assert_eq!(config.pop_timeout(), Duration::from_millis(50));
		let mode = config.mode.build();
		let location = Location::new("/app/foo", "", "");
		assert_eq!(mode.context_path(&location).unwrap(), "/foo");
	}

	#[rstest]
	fn test_history_mode_base_defaults_to_root() {
		let config = NavigatorConfig::from_json(r#"{"mode": {"kind": "history"}}"#).unwrap();
		assert_eq!(config.mode, ModeConfig::default());
	}

	#[rstest]
	#[case("{")]
	#[case(r#"{"mode": {"kind": "memory"}}"#)]
	#[case(r#"{"pop_timeout_ms": "soon"}"#)]
	fn test_invalid_config(#[case] json: &str) {
		let err = NavigatorConfig::from_json(json).unwrap_err();
		assert!(matches!(err, RouterError::Config(_)));
	}

	#[rstest]
	fn test_serialize_round_trip() {
		let config = NavigatorConfig::default()
			.with_mode(ModeConfig::Hash)
			.with_pop_timeout(Duration::from_millis(20));
		let json = serde_json::to_string(&config).unwrap();
		assert!(json.contains(r#""kind":"hash""#));
		assert_eq!(NavigatorConfig::from_json(&json).unwrap(), config);
	}
}
