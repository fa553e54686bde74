//! Concurrent registry facade with generation-based publication.
//!
//! # Purpose
//!
//! Own the provider table and the resolution cache, and keep them consistent
//! while registrations change underneath concurrent lookups.
//!
//! # Mental model
//!
//! * A [`Generation`] bundles an immutable table snapshot with an initially
//!   empty resolution cache for that snapshot.
//! * Readers pin the current generation, resolve against its table and
//!   memoize into its cache. They never take the writer lock.
//! * Writers serialize on one mutex, build the next table from the current
//!   one and publish a new generation before returning.
//!
//! # Invariants
//!
//! * Once `register`/`update`/`unregister` returns, every later lookup sees
//!   the change. The new generation is stored before the writer lock is
//!   released, and a map computed from an older table can only ever land in
//!   the older generation's cache.
//! * No lock is held while a provider callback or the event sink runs.
//! * Marker handles are recorded under the writer lock together with the
//!   table change they belong to, so every published marker is withdrawn
//!   exactly once.
//!
//! # Concurrency & ordering
//!
//! * Lookups are an `ArcSwap` load plus one read-locked hash lookup once the
//!   concrete type is cached.
//! * Writers are mutually exclusive. Unrelated writes are not ordered beyond
//!   that.
//! * Event sink notifications are delivered after the writer lock is
//!   released; two racing writers may deliver their events in either order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;
use smallvec::SmallVec;

use crate::cache::{EffectiveMap, ResolutionCache};
use crate::collab::{
	AvailabilityPublisher, EventSink, MarkerHandle, NoopPublisher, NoopSink, ProviderEvent,
	ProviderEventKind,
};
use crate::config::RegistryConfig;
use crate::error::{ProviderFault, RegisterError};
use crate::provider::Capability;
use crate::registration::{Registration, RegistrationKey};
use crate::resolver::HierarchyResolver;
use crate::table::{ProviderTable, TableEntry};
use crate::types::{Adaptable, TargetType, TypeInfo};

#[cfg(test)]
mod invariants;

/// One published table state and the cache derived from it.
struct Generation {
	epoch: u64,
	table: ProviderTable,
	cache: ResolutionCache,
}

impl Generation {
	fn new(epoch: u64, table: ProviderTable) -> Self {
		Self {
			epoch,
			table,
			cache: ResolutionCache::new(),
		}
	}

	fn resolver(&self) -> HierarchyResolver<'_> {
		HierarchyResolver::new(&self.table, &self.cache)
	}
}

#[derive(Default)]
struct WriterState {
	markers: HashMap<RegistrationKey, Vec<MarkerHandle>>,
	closed: bool,
}

type Events = SmallVec<[ProviderEvent; 2]>;

/// Source of per-registry identities stamped into [`RegistrationKey`]s.
static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Point-in-time counters for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
	/// Live registrations.
	pub registrations: usize,
	/// Source types with at least one direct registration.
	pub source_types: usize,
	/// Concrete types with a memoized effective map.
	pub cached_types: usize,
	/// Number of table changes published so far.
	pub generation: u64,
	pub closed: bool,
}

/// Runtime registry of capability providers.
pub struct Registry {
	id: u64,
	label: Box<str>,
	next_key: AtomicU64,
	writer: Mutex<WriterState>,
	current: ArcSwap<Generation>,
	sink: Arc<dyn EventSink>,
	publisher: Arc<dyn AvailabilityPublisher>,
}

impl Registry {
	/// Creates a registry without external collaborators.
	pub fn new(config: RegistryConfig) -> Self {
		Self::with_collaborators(config, Arc::new(NoopSink), Arc::new(NoopPublisher::default()))
	}

	/// Creates a registry that reports changes to `sink` and `publisher`.
	pub fn with_collaborators(
		config: RegistryConfig,
		sink: Arc<dyn EventSink>,
		publisher: Arc<dyn AvailabilityPublisher>,
	) -> Self {
		Self {
			id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
			label: config.label.into_boxed_str(),
			next_key: AtomicU64::new(1),
			writer: Mutex::new(WriterState::default()),
			current: ArcSwap::from_pointee(Generation::new(0, ProviderTable::new())),
			sink,
			publisher,
		}
	}

	#[inline]
	pub fn label(&self) -> &str {
		&self.label
	}

	/// Hands out a fresh key without registering anything.
	///
	/// Keys are ordered by allocation, which makes them the tie-break between
	/// registrations of equal priority.
	pub fn allocate_key(&self) -> RegistrationKey {
		RegistrationKey::new(self.id, self.next_key.fetch_add(1, Ordering::Relaxed))
	}

	/// Returns true if `key` was handed out by [`Self::allocate_key`] here.
	fn issued(&self, key: RegistrationKey) -> bool {
		key.owner() == self.id && key.as_u64() < self.next_key.load(Ordering::Relaxed)
	}

	/// Registers a provider under a freshly allocated key.
	pub fn register(&self, registration: Registration) -> Result<RegistrationKey, RegisterError> {
		let key = self.allocate_key();
		self.commit(key, registration, false)?;
		Ok(key)
	}

	/// Registers a provider under a key obtained from [`Self::allocate_key`].
	///
	/// A live registration already stored under `key` is replaced. Keys issued
	/// by another registry, or never issued, fail with
	/// [`RegisterError::UnknownKey`].
	pub fn register_as(
		&self,
		key: RegistrationKey,
		registration: Registration,
	) -> Result<(), RegisterError> {
		self.commit(key, registration, false).map(|_| ())
	}

	/// Replaces the declaration of a live registration, keeping its key.
	///
	/// Returns `Ok(false)` when nothing is registered under `key`.
	pub fn update(
		&self,
		key: RegistrationKey,
		registration: Registration,
	) -> Result<bool, RegisterError> {
		self.commit(key, registration, true)
	}

	/// Removes the registration stored under `key`.
	///
	/// Returns false, and changes nothing, if the key is unknown.
	pub fn unregister(&self, key: RegistrationKey) -> bool {
		let event = {
			let mut writer = self.writer.lock();
			let old = self.current.load_full();
			if !old.table.contains(key) {
				return false;
			}

			let mut table = old.table.clone();
			let Some(removed) = table.remove(key) else {
				return false;
			};
			self.publish(&old, table);
			self.withdraw_markers(&mut writer, key);
			event_for(ProviderEventKind::Removed, &removed)
		};

		tracing::debug!(label = %self.label, %key, "provider unregistered");
		self.notify(std::slice::from_ref(&event));
		true
	}

	/// Drops every registration and refuses new ones.
	///
	/// Markers are withdrawn and a removal event is emitted per registration.
	/// Calling it again is a no-op.
	pub fn close(&self) {
		let events: Vec<_> = {
			let mut writer = self.writer.lock();
			if writer.closed {
				return;
			}
			writer.closed = true;

			let old = self.current.load_full();
			self.publish(&old, ProviderTable::new());
			for (_, handles) in writer.markers.drain() {
				for handle in handles {
					self.publisher.withdraw(handle);
				}
			}
			old.table
				.entries()
				.iter()
				.map(|entry| event_for(ProviderEventKind::Removed, entry))
				.collect()
		};

		tracing::debug!(label = %self.label, removed = events.len(), "registry closed");
		self.notify(&events);
	}

	#[inline]
	pub fn is_closed(&self) -> bool {
		self.writer.lock().closed
	}

	/// Adapts `instance` to `target`.
	///
	/// `Ok(None)` means either that no provider is responsible for the pair or
	/// that the responsible provider declined this instance. A declining
	/// provider is never replaced by another one.
	pub fn resolve(
		&self,
		instance: &dyn Adaptable,
		target: &TargetType,
	) -> Result<Option<Capability>, ProviderFault> {
		let Some(entry) = self.lookup(instance.type_info(), target) else {
			tracing::debug!(
				label = %self.label,
				source = %instance.type_info().name(),
				%target,
				"no provider found"
			);
			return Ok(None);
		};

		let provider = Arc::clone(entry.registration().provider());
		tracing::debug!(
			label = %self.label,
			source = %instance.type_info().name(),
			%target,
			provider = provider.name(),
			key = %entry.key(),
			"using provider"
		);
		drop(entry);
		provider.resolve(instance, target)
	}

	/// Typed form of [`Self::resolve`] for target [`TargetType::of::<T>`].
	///
	/// A capability of another concrete type counts as declined.
	pub fn adapt<T: 'static>(&self, instance: &dyn Adaptable) -> Result<Option<T>, ProviderFault> {
		let target = TargetType::of::<T>();
		let Some(capability) = self.resolve(instance, &target)? else {
			return Ok(None);
		};
		match capability.downcast::<T>() {
			Ok(value) => Ok(Some(*value)),
			Err(_) => {
				tracing::warn!(
					label = %self.label,
					source = %instance.type_info().name(),
					%target,
					"provider returned a capability of the wrong type"
				);
				Ok(None)
			}
		}
	}

	/// Registration currently responsible for `(ty, target)`.
	pub fn lookup(&self, ty: &TypeInfo, target: &TargetType) -> Option<Arc<TableEntry>> {
		let generation = self.current.load();
		generation.resolver().effective_map(ty).get(target).cloned()
	}

	/// Merged target mapping of `ty` in the current generation.
	pub fn effective_map(&self, ty: &TypeInfo) -> Arc<EffectiveMap> {
		self.current.load().resolver().effective_map(ty)
	}

	pub fn stats(&self) -> RegistryStats {
		let closed = self.writer.lock().closed;
		let generation = self.current.load();
		RegistryStats {
			registrations: generation.table.len(),
			source_types: generation.table.source_type_count(),
			cached_types: generation.cache.len(),
			generation: generation.epoch,
			closed,
		}
	}

	fn commit(
		&self,
		key: RegistrationKey,
		registration: Registration,
		require_existing: bool,
	) -> Result<bool, RegisterError> {
		registration.validate()?;
		if !self.issued(key) {
			return Err(RegisterError::UnknownKey);
		}

		let events = {
			let mut writer = self.writer.lock();
			if writer.closed {
				return Err(RegisterError::Closed);
			}

			let old = self.current.load_full();
			if require_existing && !old.table.contains(key) {
				return Ok(false);
			}

			let mut table = old.table.clone();
			let previous = table.insert(key, registration)?;
			let Some(entry) = table.get(key).cloned() else {
				return Ok(false);
			};
			self.publish(&old, table);

			let mut events = Events::new();
			if let Some(previous) = previous {
				self.withdraw_markers(&mut writer, key);
				events.push(event_for(ProviderEventKind::Removed, &previous));
			}
			let handles = self.publish_markers(&entry);
			writer.markers.insert(key, handles);
			events.push(event_for(ProviderEventKind::Added, &entry));
			events
		};

		tracing::debug!(
			label = %self.label,
			%key,
			replaced = events.len() > 1,
			"provider registered"
		);
		self.notify(&events);
		Ok(true)
	}

	/// Stores the next generation. Caller holds the writer lock.
	fn publish(&self, old: &Generation, table: ProviderTable) {
		self.current
			.store(Arc::new(Generation::new(old.epoch + 1, table)));
		// Readers still pinned to `old` may repopulate it; nobody new will see it.
		old.cache.invalidate_all();
	}

	fn publish_markers(&self, entry: &TableEntry) -> Vec<MarkerHandle> {
		let reg = entry.registration();
		let mut handles = Vec::with_capacity(reg.source_types().len() * reg.target_types().len());
		for source in reg.source_types() {
			for target in reg.target_types() {
				handles.push(self.publisher.publish(source, target));
			}
		}
		handles
	}

	fn withdraw_markers(&self, writer: &mut WriterState, key: RegistrationKey) {
		for handle in writer.markers.remove(&key).unwrap_or_default() {
			self.publisher.withdraw(handle);
		}
	}

	fn notify(&self, events: &[ProviderEvent]) {
		for event in events {
			let result = match event.kind {
				ProviderEventKind::Added => self.sink.on_provider_added(event),
				ProviderEventKind::Removed => self.sink.on_provider_removed(event),
			};
			if let Err(err) = result {
				tracing::warn!(
					label = %self.label,
					key = %event.key,
					kind = ?event.kind,
					%err,
					"event sink failed"
				);
			}
		}
	}
}

impl Default for Registry {
	fn default() -> Self {
		Self::new(RegistryConfig::default())
	}
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Registry")
			.field("label", &self.label)
			.field("stats", &self.stats())
			.finish()
	}
}

fn event_for(kind: ProviderEventKind, entry: &TableEntry) -> ProviderEvent {
	let reg = entry.registration();
	ProviderEvent {
		kind,
		key: entry.key(),
		source_types: reg.source_types().to_vec(),
		target_types: reg.target_types().to_vec(),
	}
}
