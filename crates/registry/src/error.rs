use thiserror::Error;

/// Reasons a registration is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterError {
	/// The registration names no source type.
	#[error("registration declares no source types")]
	EmptySourceTypes,
	/// The registration names no target type.
	#[error("registration declares no target types")]
	EmptyTargetTypes,
	/// The registry was closed and accepts no further registrations.
	#[error("registry is closed")]
	Closed,
	/// The key was not allocated by this registry.
	#[error("registration key was not issued by this registry")]
	UnknownKey,
}

/// Unexpected failure raised by a provider callback.
///
/// The registry hands this back to the caller of `resolve` untouched.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ProviderFault(Box<dyn std::error::Error + Send + Sync>);

impl ProviderFault {
	pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
		Self(err.into())
	}

	/// Returns the wrapped provider error.
	pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync> {
		self.0
	}
}

/// Failure reported by an [`crate::EventSink`]. Logged, never propagated.
#[derive(Debug, Clone, Error)]
#[error("event sink failed: {0}")]
pub struct SinkError(pub String);
