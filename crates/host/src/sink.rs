use adaptor_registry::{EventSink, ProviderEvent, SinkError};

/// [`EventSink`] that reports registration changes through `tracing`.
#[derive(Debug, Clone)]
pub struct TracingSink {
	label: String,
}

impl TracingSink {
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
		}
	}
}

impl EventSink for TracingSink {
	fn on_provider_added(&self, event: &ProviderEvent) -> Result<(), SinkError> {
		tracing::info!(
			label = %self.label,
			key = %event.key,
			sources = ?event.source_types,
			targets = ?event.target_types,
			"provider added"
		);
		Ok(())
	}

	fn on_provider_removed(&self, event: &ProviderEvent) -> Result<(), SinkError> {
		tracing::info!(
			label = %self.label,
			key = %event.key,
			sources = ?event.source_types,
			targets = ?event.target_types,
			"provider removed"
		);
		Ok(())
	}
}
