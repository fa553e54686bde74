//! Memoized effective maps, one per concrete source type.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use crate::table::TableEntry;
use crate::types::{SourceType, TargetType};


/// Merged `target type -> provider` mapping for one concrete source type.
#[derive(Debug, Clone, Default)]
pub struct EffectiveMap {
	by_target: HashMap<TargetType, Arc<TableEntry>>,
}

impl EffectiveMap {
	/// Registration answering `target`, if any.
	#[inline]
	pub fn get(&self, target: &TargetType) -> Option<&Arc<TableEntry>> {
		self.by_target.get(target)
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.by_target.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.by_target.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&TargetType, &Arc<TableEntry>)> {
		self.by_target.iter()
	}

	/// Records `entry` for `target` unless the target is already claimed.
	pub(crate) fn claim(&mut self, target: &TargetType, entry: &Arc<TableEntry>) -> bool {
		if self.by_target.contains_key(target) {
			return false;
		}
		self.by_target.insert(target.clone(), Arc::clone(entry));
		true
	}

	/// Copies every pair of `ancestor` whose target is still unclaimed.
	pub(crate) fn inherit(&mut self, ancestor: &EffectiveMap) {
		for (target, entry) in &ancestor.by_target {
			self.claim(target, entry);
		}
	}
}

/// Per-type memoization of [`EffectiveMap`]s.
///
/// No lock is held while a missing map is computed, so the computation may
/// recurse into the same cache for ancestor types. Two threads racing on the
/// same type compute equal maps; the first insertion is kept.
#[derive(Debug, Default)]
pub struct ResolutionCache {
	maps: RwLock<HashMap<SourceType, Arc<EffectiveMap>>>,
}

impl ResolutionCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached map for `source`, if present.
	#[inline]
	pub fn get(&self, source: &SourceType) -> Option<Arc<EffectiveMap>> {
		self.maps.read().get(source).cloned()
	}

	/// Returns the cached map for `source`, computing and storing it on a miss.
	pub fn get_or_compute<F>(&self, source: &SourceType, compute: F) -> Arc<EffectiveMap>
	where
		F: FnOnce() -> EffectiveMap,
	{
		if let Some(map) = self.get(source) {
			return map;
		}

		let computed = Arc::new(compute());
		let mut maps = self.maps.write();
		Arc::clone(maps.entry(source.clone()).or_insert(computed))
	}

	/// Discards every cached map.
	pub fn invalidate_all(&self) {
		self.maps.write().clear();
	}

	/// Number of cached types.
	pub fn len(&self) -> usize {
		self.maps.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.maps.read().is_empty()
	}
}
