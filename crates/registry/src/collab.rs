//! Collaborators the registry calls into on registration changes.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SinkError;
use crate::registration::RegistrationKey;
use crate::types::{SourceType, TargetType};

/// Whether a provider appeared or went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
	Added,
	Removed,
}

/// Registration change delivered to an [`EventSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEvent {
	pub kind: ProviderEventKind,
	pub key: RegistrationKey,
	pub source_types: Vec<SourceType>,
	pub target_types: Vec<TargetType>,
}

/// Best-effort observer of registration changes.
///
/// Called after the change has been committed and without any registry lock
/// held. Errors are logged and never roll the change back.
pub trait EventSink: Send + Sync {
	fn on_provider_added(&self, event: &ProviderEvent) -> Result<(), SinkError>;

	fn on_provider_removed(&self, event: &ProviderEvent) -> Result<(), SinkError>;
}

/// Opaque handle for one published availability marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
	pub const fn new(id: u64) -> Self {
		Self(id)
	}

	#[inline]
	pub fn id(self) -> u64 {
		self.0
	}
}

/// Publishes "a provider for this pair exists" markers for dependents.
///
/// One marker is published per declared `(source, target)` pair of a
/// registration and withdrawn when that registration goes away. Calls happen
/// while the registry's writer lock is held, so implementations must not call
/// back into the registry.
pub trait AvailabilityPublisher: Send + Sync {
	fn publish(&self, source: &SourceType, target: &TargetType) -> MarkerHandle;

	fn withdraw(&self, handle: MarkerHandle);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
	fn on_provider_added(&self, _event: &ProviderEvent) -> Result<(), SinkError> {
		Ok(())
	}

	fn on_provider_removed(&self, _event: &ProviderEvent) -> Result<(), SinkError> {
		Ok(())
	}
}

/// Publisher that only hands out distinct handles.
#[derive(Debug, Default)]
pub struct NoopPublisher {
	next: AtomicU64,
}

impl AvailabilityPublisher for NoopPublisher {
	fn publish(&self, _source: &SourceType, _target: &TargetType) -> MarkerHandle {
		MarkerHandle::new(self.next.fetch_add(1, Ordering::Relaxed))
	}

	fn withdraw(&self, _handle: MarkerHandle) {}
}
