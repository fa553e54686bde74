//! Registration requests and their identity.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use smallvec::SmallVec;

use crate::error::RegisterError;
use crate::provider::Provider;
use crate::types::{SourceType, TargetType};

/// Handle identifying one registration for later removal.
///
/// Keys are handed out from a monotonic per-registry sequence, which also
/// makes them the tie-break between registrations of equal [`Priority`]. A
/// key also records which registry issued it; other registries refuse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationKey {
	owner: u64,
	seq: u64,
}

impl RegistrationKey {
	#[inline]
	pub(crate) const fn new(owner: u64, seq: u64) -> Self {
		Self { owner, seq }
	}

	#[cfg(test)]
	pub(crate) const fn from_seq(seq: u64) -> Self {
		Self::new(0, seq)
	}

	#[inline]
	pub(crate) const fn owner(self) -> u64 {
		self.owner
	}

	/// Returns the underlying sequence number.
	#[inline]
	pub fn as_u64(self) -> u64 {
		self.seq
	}
}

impl fmt::Display for RegistrationKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "reg#{}", self.seq)
	}
}

/// Ordering key among registrations under the same source type.
///
/// Lower values sort first, and the first registration to claim a target
/// type wins it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl From<i32> for Priority {
	fn from(value: i32) -> Self {
		Self(value)
	}
}

/// One provider bound under one or more source types.
///
/// Source and target lists are deduplicated on insertion and keep their
/// declaration order.
#[derive(Clone)]
pub struct Registration {
	provider: Arc<dyn Provider>,
	source_types: SmallVec<[SourceType; 2]>,
	target_types: SmallVec<[TargetType; 4]>,
	priority: Priority,
}

impl Registration {
	pub fn new(provider: impl Provider + 'static) -> Self {
		Self::from_arc(Arc::new(provider))
	}

	/// Wraps an already shared provider.
	pub fn from_arc(provider: Arc<dyn Provider>) -> Self {
		Self {
			provider,
			source_types: SmallVec::new(),
			target_types: SmallVec::new(),
			priority: Priority::default(),
		}
	}

	/// Declares a source type this provider adapts.
	pub fn source(mut self, source: impl Into<SourceType>) -> Self {
		let source = source.into();
		if !self.source_types.contains(&source) {
			self.source_types.push(source);
		}
		self
	}

	pub fn sources<I, S>(self, sources: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<SourceType>,
	{
		sources.into_iter().fold(self, |reg, s| reg.source(s))
	}

	/// Declares a target type this provider produces.
	pub fn target(mut self, target: impl Into<TargetType>) -> Self {
		let target = target.into();
		if !self.target_types.contains(&target) {
			self.target_types.push(target);
		}
		self
	}

	pub fn targets<I, T>(self, targets: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: Into<TargetType>,
	{
		targets.into_iter().fold(self, |reg, t| reg.target(t))
	}

	/// Sets the tie-break priority.
	pub fn ranked(mut self, priority: impl Into<Priority>) -> Self {
		self.priority = priority.into();
		self
	}

	#[inline]
	pub fn provider(&self) -> &Arc<dyn Provider> {
		&self.provider
	}

	#[inline]
	pub fn source_types(&self) -> &[SourceType] {
		&self.source_types
	}

	#[inline]
	pub fn target_types(&self) -> &[TargetType] {
		&self.target_types
	}

	#[inline]
	pub fn priority(&self) -> Priority {
		self.priority
	}

	/// Rejects registrations that could never be resolved.
	pub fn validate(&self) -> Result<(), RegisterError> {
		if self.source_types.is_empty() {
			return Err(RegisterError::EmptySourceTypes);
		}
		if self.target_types.is_empty() {
			return Err(RegisterError::EmptyTargetTypes);
		}
		Ok(())
	}
}

impl fmt::Debug for Registration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registration")
			.field("provider", &self.provider.name())
			.field("source_types", &self.source_types)
			.field("target_types", &self.target_types)
			.field("priority", &self.priority)
			.finish()
	}
}
