use serde::Deserialize;

/// Registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	/// Name attached to every log event emitted by the registry.
	pub label: String,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			label: "adapters".to_string(),
		}
	}
}

impl RegistryConfig {
	pub fn with_label(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
		}
	}
}
