//! Hierarchy-aware computation of effective maps.
//!
//! # Precedence
//!
//! 1. Registrations declared directly under the concrete type, in priority
//!    order. The first one to claim a target keeps it.
//! 2. Effective maps of the declared interfaces, in declaration order.
//! 3. Effective map of the superclass.
//!
//! Later stages only fill targets that are still unclaimed, so a direct claim
//! is never shadowed by an inherited one. Ancestor maps come from the shared
//! [`ResolutionCache`]; a type reachable along several paths is computed once.

use std::sync::Arc;

use crate::cache::{EffectiveMap, ResolutionCache};
use crate::table::ProviderTable;
use crate::types::TypeInfo;


/// Builds effective maps from one table state, memoizing into one cache.
///
/// The table and the cache must belong to the same generation, otherwise a
/// map computed from an older table could be served for a newer one.
pub struct HierarchyResolver<'a> {
	table: &'a ProviderTable,
	cache: &'a ResolutionCache,
}

impl<'a> HierarchyResolver<'a> {
	pub fn new(table: &'a ProviderTable, cache: &'a ResolutionCache) -> Self {
		Self { table, cache }
	}

	/// Effective map of `ty`, from the cache or freshly computed.
	pub fn effective_map(&self, ty: &TypeInfo) -> Arc<EffectiveMap> {
		self.cache.get_or_compute(ty.name(), || self.compute(ty))
	}

	fn compute(&self, ty: &TypeInfo) -> EffectiveMap {
		let mut map = EffectiveMap::default();

		for entry in self.table.direct_claims(ty.name()) {
			for target in entry.registration().target_types() {
				map.claim(target, entry);
			}
		}

		for iface in ty.interfaces() {
			map.inherit(&self.effective_map(iface));
		}

		if let Some(parent) = ty.superclass() {
			map.inherit(&self.effective_map(parent));
		}

		tracing::trace!(source = %ty.name(), targets = map.len(), "computed effective map");
		map
	}
}
