//! Registry configuration, loaded from TOML.
//!
//! ```toml
//! [contributions]
//! after_first_render_ms = 50
//! eventually_ms = 5000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Delay windows used by [`ContributionHost`](crate::ContributionHost) when
/// no idle time or explicit request arrives first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContributionTimings {
	/// Upper bound between model attachment and constructing
	/// `AfterFirstRender` contributions.
	pub after_first_render_ms: u64,
	/// Upper bound between surface creation and constructing `Eventually`
	/// contributions.
	pub eventually_ms: u64,
}

impl Default for ContributionTimings {
	fn default() -> Self {
		Self {
			after_first_render_ms: 50,
			eventually_ms: 5000,
		}
	}
}

impl ContributionTimings {
	pub fn after_first_render(&self) -> Duration {
		Duration::from_millis(self.after_first_render_ms)
	}

	pub fn eventually(&self) -> Duration {
		Duration::from_millis(self.eventually_ms)
	}
}

/// Top-level registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	pub contributions: ContributionTimings,
}

impl RegistryConfig {
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}
}
