//! Registrations indexed by declared source type.
//!
//! Each source type keeps its registrations sorted by [`TableEntry::total_order_cmp`]
//! (priority, then key), so iteration order is total and reproducible. The
//! table is a plain value: the registry clones it, mutates the clone under its
//! writer lock and publishes the result as a new generation.

use std::cmp::Ordering;
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;

use crate::error::RegisterError;
use crate::registration::{Priority, Registration, RegistrationKey};
use crate::types::SourceType;

#[cfg(test)]
mod tests;

/// A registration as stored in the table.
#[derive(Debug)]
pub struct TableEntry {
	key: RegistrationKey,
	registration: Registration,
}

impl TableEntry {
	#[inline]
	pub fn key(&self) -> RegistrationKey {
		self.key
	}

	#[inline]
	pub fn registration(&self) -> &Registration {
		&self.registration
	}

	#[inline]
	pub fn priority(&self) -> Priority {
		self.registration.priority()
	}

	/// Ascending priority, ties broken by key sequence.
	///
	/// Two entries compare equal only if they share a key.
	#[inline]
	pub fn total_order_cmp(&self, other: &Self) -> Ordering {
		self.priority()
			.cmp(&other.priority())
			.then_with(|| self.key.cmp(&other.key))
	}
}

/// Per-source-type ordered registrations.
#[derive(Debug, Clone, Default)]
pub struct ProviderTable {
	by_source: HashMap<SourceType, Vec<Arc<TableEntry>>>,
	by_key: HashMap<RegistrationKey, Arc<TableEntry>>,
}

impl ProviderTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts `registration` under every declared source type.
	///
	/// A registration already stored under `key` is replaced and returned.
	/// Invalid registrations are rejected before anything is touched.
	pub fn insert(
		&mut self,
		key: RegistrationKey,
		registration: Registration,
	) -> Result<Option<Arc<TableEntry>>, RegisterError> {
		registration.validate()?;
		let previous = self.remove(key);

		let entry = Arc::new(TableEntry { key, registration });
		for source in entry.registration.source_types() {
			let entries = self.by_source.entry(source.clone()).or_default();
			let pos = entries
				.binary_search_by(|e| e.total_order_cmp(&entry))
				.unwrap_or_else(|p| p);
			entries.insert(pos, Arc::clone(&entry));
		}
		self.by_key.insert(key, entry);
		Ok(previous)
	}

	/// Removes the registration stored under `key` from every source type.
	///
	/// Unknown keys are a no-op and return `None`.
	pub fn remove(&mut self, key: RegistrationKey) -> Option<Arc<TableEntry>> {
		let entry = self.by_key.remove(&key)?;
		for source in entry.registration.source_types() {
			let Some(entries) = self.by_source.get_mut(source) else {
				continue;
			};
			entries.retain(|e| e.key != key);
			if entries.is_empty() {
				self.by_source.remove(source);
			}
		}
		Some(entry)
	}

	/// Registrations declared directly under `source`, in priority order.
	#[inline]
	pub fn direct_claims(&self, source: &SourceType) -> &[Arc<TableEntry>] {
		self.by_source.get(source).map_or(&[][..], Vec::as_slice)
	}

	#[inline]
	pub fn get(&self, key: RegistrationKey) -> Option<&Arc<TableEntry>> {
		self.by_key.get(&key)
	}

	#[inline]
	pub fn contains(&self, key: RegistrationKey) -> bool {
		self.by_key.contains_key(&key)
	}

	/// Number of registrations.
	#[inline]
	pub fn len(&self) -> usize {
		self.by_key.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.by_key.is_empty()
	}

	/// Number of source types with at least one registration.
	#[inline]
	pub fn source_type_count(&self) -> usize {
		self.by_source.len()
	}

	/// All registrations, ordered by key.
	pub fn entries(&self) -> Vec<Arc<TableEntry>> {
		let mut entries: Vec<_> = self.by_key.values().cloned().collect();
		entries.sort_by_key(|e| e.key);
		entries
	}
}
