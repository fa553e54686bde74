//! Two-phase startup around a [`Registry`].
//!
//! Until [`AdapterHost::activate`] succeeds, bound registrations are kept in a
//! bounded FIFO. Each one receives its registry key at bind time, so callers
//! can unbind it before it ever reaches the registry, and key order matches
//! arrival order. Activation replays the queue once, in order, under the
//! host lock; binds racing with activation wait and then go straight to the
//! registry.

use std::collections::VecDeque;
use std::sync::Arc;

use adaptor_registry::{RegisterError, Registration, RegistrationKey, Registry};
use parking_lot::Mutex;
use thiserror::Error;

use crate::config::HostConfig;
use crate::gate::LifecycleGate;


/// Reasons [`AdapterHost::bind`] refuses a registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
	#[error(transparent)]
	Register(#[from] RegisterError),
	#[error("pending registration queue is full ({capacity} entries)")]
	QueueFull { capacity: usize },
}

/// Reasons [`AdapterHost::activate`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HostError {
	#[error("lifecycle gate is not ready")]
	NotReady,
	#[error("host has been deactivated")]
	Deactivated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
	Pending,
	Active,
	Deactivated,
}

struct Queued {
	key: RegistrationKey,
	registration: Registration,
}

struct HostState {
	phase: Phase,
	queue: VecDeque<Queued>,
}

/// Lifecycle wrapper feeding registrations into a [`Registry`].
pub struct AdapterHost {
	registry: Arc<Registry>,
	gate: Arc<dyn LifecycleGate>,
	capacity: usize,
	state: Mutex<HostState>,
}

impl AdapterHost {
	pub fn new(registry: Arc<Registry>, gate: Arc<dyn LifecycleGate>, config: &HostConfig) -> Self {
		Self {
			registry,
			gate,
			capacity: config.pending_capacity,
			state: Mutex::new(HostState {
				phase: Phase::Pending,
				queue: VecDeque::new(),
			}),
		}
	}

	#[inline]
	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}

	/// Binds a provider, queueing it if the host is not active yet.
	///
	/// Invalid registrations are rejected immediately in either phase.
	pub fn bind(&self, registration: Registration) -> Result<RegistrationKey, BindError> {
		registration.validate()?;

		let mut state = self.state.lock();
		match state.phase {
			Phase::Pending => {
				if state.queue.len() >= self.capacity {
					return Err(BindError::QueueFull {
						capacity: self.capacity,
					});
				}
				let key = self.registry.allocate_key();
				state.queue.push_back(Queued { key, registration });
				tracing::debug!(
					label = self.registry.label(),
					%key,
					pending = state.queue.len(),
					"registration queued until activation"
				);
				Ok(key)
			}
			Phase::Active => {
				drop(state);
				Ok(self.registry.register(registration)?)
			}
			Phase::Deactivated => Err(RegisterError::Closed.into()),
		}
	}

	/// Unbinds a provider, whether it is still queued or already registered.
	///
	/// Returns false for unknown keys.
	pub fn unbind(&self, key: RegistrationKey) -> bool {
		let mut state = self.state.lock();
		if let Some(pos) = state.queue.iter().position(|q| q.key == key) {
			state.queue.remove(pos);
			tracing::debug!(label = self.registry.label(), %key, "queued registration dropped");
			return true;
		}
		drop(state);
		self.registry.unregister(key)
	}

	/// Replays queued registrations once the gate is ready.
	///
	/// Returns how many queued registrations reached the registry. Calling
	/// it on an active host replays nothing and returns `Ok(0)`; a deactivated
	/// host fails with [`HostError::Deactivated`] before the gate is consulted.
	pub fn activate(&self) -> Result<usize, HostError> {
		let mut state = self.state.lock();
		match state.phase {
			Phase::Active => return Ok(0),
			Phase::Deactivated => return Err(HostError::Deactivated),
			Phase::Pending => {}
		}
		if !self.gate.is_ready() {
			return Err(HostError::NotReady);
		}
		state.phase = Phase::Active;

		let mut replayed = 0;
		while let Some(Queued { key, registration }) = state.queue.pop_front() {
			match self.registry.register_as(key, registration) {
				Ok(()) => replayed += 1,
				Err(err) => {
					tracing::warn!(
						label = self.registry.label(),
						%key,
						%err,
						"queued registration rejected on replay"
					);
				}
			}
		}

		tracing::info!(label = self.registry.label(), replayed, "adapter host activated");
		Ok(replayed)
	}

	/// Closes the registry and discards anything still queued.
	pub fn deactivate(&self) {
		let mut state = self.state.lock();
		if state.phase == Phase::Deactivated {
			return;
		}
		state.phase = Phase::Deactivated;
		let dropped = state.queue.len();
		state.queue.clear();
		drop(state);

		self.registry.close();
		tracing::info!(label = self.registry.label(), dropped, "adapter host deactivated");
	}

	#[inline]
	pub fn is_active(&self) -> bool {
		self.state.lock().phase == Phase::Active
	}

	/// Registrations waiting for activation.
	#[inline]
	pub fn pending_len(&self) -> usize {
		self.state.lock().queue.len()
	}
}

impl std::fmt::Debug for AdapterHost {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.lock();
		f.debug_struct("AdapterHost")
			.field("phase", &state.phase)
			.field("pending", &state.queue.len())
			.field("capacity", &self.capacity)
			.finish()
	}
}
