use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use proptest::prelude::*;

use super::*;
use crate::testing::{Obj, named, who};

fn hierarchy() -> (Arc<TypeInfo>, Arc<TypeInfo>, Arc<TypeInfo>) {
	let base = TypeInfo::root("Base").build();
	let iface = TypeInfo::root("IFace").build();
	let leaf = TypeInfo::root("Leaf").implements(&iface).extends(&base).build();
	(base, iface, leaf)
}

/// Invariant: lookups are deterministic regardless of concurrent readers.
///
/// With the table frozen, every thread racing to populate the cache must
/// observe the same winner for every target.
pub(crate) fn inv_deterministic_under_concurrent_reads() {
	let registry = Registry::default();
	let (_, _, leaf) = hierarchy();
	registry.register(named("base").source("Base").targets(["A", "B", "C"])).unwrap();
	registry.register(named("iface").source("IFace").targets(["B", "C"])).unwrap();
	registry.register(named("leaf").source("Leaf").target("C")).unwrap();

	let expected = [("A", "base"), ("B", "iface"), ("C", "leaf")];
	std::thread::scope(|scope| {
		for _ in 0..8 {
			scope.spawn(|| {
				let obj = Obj::new(&leaf);
				for _ in 0..200 {
					for (target, provider) in expected {
						let got = who(registry.resolve(&obj, &TargetType::new(target)).unwrap());
						assert_eq!(got, Some(provider), "target {target}");
					}
				}
			});
		}
	});
}

#[test]
fn test_deterministic_under_concurrent_reads() {
	inv_deterministic_under_concurrent_reads()
}

/// Invariant: no stale read after a write returns.
///
/// A writer thread toggles a shadowing registration while readers hammer the
/// cache. After each `register`/`unregister` returns, the writer itself must
/// observe the new state on its very next lookup.
pub(crate) fn inv_no_stale_read_after_write() {
	let registry = Registry::default();
	let (base, _, leaf) = hierarchy();
	registry.register(named("fallback").source("Base").target("T")).unwrap();
	let done = AtomicBool::new(false);

	std::thread::scope(|scope| {
		for _ in 0..4 {
			scope.spawn(|| {
				let obj = Obj::new(&leaf);
				while !done.load(Ordering::Relaxed) {
					let got = who(registry.resolve(&obj, &TargetType::new("T")).unwrap());
					assert!(matches!(got, Some("fallback" | "shadow")));
				}
			});
		}

		let writer_obj = Obj::new(&leaf);
		let base_obj = Obj::new(&base);
		for _ in 0..200 {
			let key = registry.register(named("shadow").source("Leaf").target("T")).unwrap();
			assert_eq!(
				who(registry.resolve(&writer_obj, &TargetType::new("T")).unwrap()),
				Some("shadow")
			);
			assert_eq!(
				who(registry.resolve(&base_obj, &TargetType::new("T")).unwrap()),
				Some("fallback")
			);

			assert!(registry.unregister(key));
			assert_eq!(
				who(registry.resolve(&writer_obj, &TargetType::new("T")).unwrap()),
				Some("fallback")
			);
		}
		done.store(true, Ordering::Relaxed);
	});
}

#[test]
fn test_no_stale_read_after_write() {
	inv_no_stale_read_after_write()
}

/// Invariant: concurrent writers never lose a registration.
pub(crate) fn inv_no_lost_registrations() {
	let registry = Registry::default();
	let keys = parking_lot::Mutex::new(Vec::new());

	std::thread::scope(|scope| {
		for thread in 0..8 {
			let registry = &registry;
			let keys = &keys;
			scope.spawn(move || {
				for i in 0..50 {
					let source = format!("S{thread}");
					let target = format!("T{i}");
					let key = registry
						.register(named("p").source(source.as_str()).target(target.as_str()))
						.unwrap();
					keys.lock().push(key);
				}
			});
		}
	});

	let keys = keys.into_inner();
	let stats = registry.stats();
	assert_eq!(stats.registrations, 400);
	assert_eq!(stats.source_types, 8);
	assert_eq!(stats.generation, 400);
	for key in keys {
		assert!(registry.unregister(key));
	}
	assert_eq!(registry.stats().registrations, 0);
}

#[test]
fn test_no_lost_registrations() {
	inv_no_lost_registrations()
}

/// Invariant: the same-type winner depends on priority, not arrival order.
pub(crate) fn inv_winner_independent_of_registration_order(priorities: Vec<i32>, seed: usize) {
	let names: Vec<&'static str> = (0..priorities.len())
		.map(|i| &*Box::leak(format!("p{i}").into_boxed_str()))
		.collect();
	let best = priorities
		.iter()
		.enumerate()
		.min_by_key(|&(_, p)| *p)
		.map(|(i, _)| i)
		.unwrap();

	let mut order: Vec<usize> = (0..priorities.len()).collect();
	order.rotate_left(seed % priorities.len());

	let registry = Registry::default();
	let ty = TypeInfo::root("S").build();
	for &i in &order {
		registry
			.register(named(names[i]).source("S").target("T").ranked(priorities[i]))
			.unwrap();
	}

	let got = who(registry.resolve(&Obj::new(&ty), &TargetType::new("T")).unwrap());
	let winner = got.unwrap();
	let winner_priority = priorities[names.iter().position(|n| *n == winner).unwrap()];
	assert_eq!(winner_priority, priorities[best]);
}

proptest! {
	#[test]
	fn prop_winner_independent_of_registration_order(
		priorities in prop::collection::vec(-5i32..5, 1..8),
		seed in 0usize..16,
	) {
		inv_winner_independent_of_registration_order(priorities, seed);
	}

	/// Distinct priorities: the winner is unique, so it must be the same
	/// provider for every registration order.
	#[test]
	fn prop_distinct_priorities_pick_same_provider(
		priorities in prop::collection::hash_set(-50i32..50, 1..6),
		seed in 0usize..16,
	) {
		let priorities: Vec<i32> = priorities.into_iter().collect();
		let best = priorities.iter().min().copied().unwrap();
		let ty = TypeInfo::root("S").build();

		let mut order: Vec<i32> = priorities.clone();
		let n = order.len();
		order.rotate_left(seed % n);
		let registry = Registry::default();
		for p in order {
			let name: &'static str = Box::leak(p.to_string().into_boxed_str());
			registry.register(named(name).source("S").target("T").ranked(p)).unwrap();
		}

		let got = who(registry.resolve(&Obj::new(&ty), &TargetType::new("T")).unwrap());
		let expected = best.to_string();
		prop_assert_eq!(got, Some(expected.as_str()));
	}
}
