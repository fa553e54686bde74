//! Host configuration.
//!
//! ```toml
//! pending_capacity = 256
//!
//! [registry]
//! label = "resource-adapters"
//! ```

use std::path::{Path, PathBuf};

use adaptor_registry::RegistryConfig;
use serde::Deserialize;
use thiserror::Error;


/// Errors raised while loading a [`HostConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error(transparent)]
	Parse(#[from] toml::de::Error),
	#[error("pending_capacity must be at least 1")]
	ZeroCapacity,
}

/// Settings for an [`crate::AdapterHost`] and the registry it drives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
	/// Registrations accepted before activation.
	pub pending_capacity: usize,
	pub registry: RegistryConfig,
}

impl Default for HostConfig {
	fn default() -> Self {
		Self {
			pending_capacity: 1024,
			registry: RegistryConfig::default(),
		}
	}
}

impl HostConfig {
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		if config.pending_capacity == 0 {
			return Err(ConfigError::ZeroCapacity);
		}
		Ok(config)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&input)
	}
}
