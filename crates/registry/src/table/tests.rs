use pretty_assertions::assert_eq;

use super::*;
use crate::testing::named;

fn key(seq: u64) -> RegistrationKey {
	RegistrationKey::from_seq(seq)
}

fn claim_keys(table: &ProviderTable, source: &str) -> Vec<u64> {
	table
		.direct_claims(&SourceType::new(source))
		.iter()
		.map(|e| e.key().as_u64())
		.collect()
}

#[test]
fn test_insert_sorted_by_priority_then_key() {
	let mut table = ProviderTable::new();
	table
		.insert(key(1), named("a").source("S").target("T").ranked(5))
		.unwrap();
	table
		.insert(key(2), named("b").source("S").target("T").ranked(-1))
		.unwrap();
	table
		.insert(key(3), named("c").source("S").target("T").ranked(5))
		.unwrap();
	table
		.insert(key(0), named("d").source("S").target("T").ranked(5))
		.unwrap();

	assert_eq!(claim_keys(&table, "S"), vec![2, 0, 1, 3]);
}

#[test]
fn test_insert_under_multiple_sources() {
	let mut table = ProviderTable::new();
	table
		.insert(key(1), named("a").sources(["S1", "S2"]).target("T"))
		.unwrap();

	assert_eq!(table.len(), 1);
	assert_eq!(table.source_type_count(), 2);
	assert_eq!(claim_keys(&table, "S1"), vec![1]);
	assert_eq!(claim_keys(&table, "S2"), vec![1]);
}

#[test]
fn test_reject_empty_declarations() {
	let mut table = ProviderTable::new();

	let err = table.insert(key(1), named("a").target("T")).unwrap_err();
	assert_eq!(err, RegisterError::EmptySourceTypes);

	let err = table.insert(key(2), named("a").source("S")).unwrap_err();
	assert_eq!(err, RegisterError::EmptyTargetTypes);

	assert!(table.is_empty());
	assert_eq!(table.source_type_count(), 0);
}

#[test]
fn test_remove_from_every_source() {
	let mut table = ProviderTable::new();
	table
		.insert(key(1), named("a").sources(["S1", "S2"]).target("T"))
		.unwrap();
	table.insert(key(2), named("b").source("S1").target("T")).unwrap();

	let removed = table.remove(key(1)).expect("entry removed");
	assert_eq!(removed.key(), key(1));
	assert_eq!(claim_keys(&table, "S1"), vec![2]);
	assert!(table.direct_claims(&SourceType::new("S2")).is_empty());
	assert_eq!(table.source_type_count(), 1);
}

#[test]
fn test_remove_unknown_is_noop() {
	let mut table = ProviderTable::new();
	table.insert(key(1), named("a").source("S").target("T")).unwrap();

	assert!(table.remove(key(7)).is_none());
	assert!(table.remove(key(1)).is_some());
	assert!(table.remove(key(1)).is_none());
	assert!(table.is_empty());
}

#[test]
fn test_reinsert_moves_between_sources() {
	let mut table = ProviderTable::new();
	table.insert(key(1), named("a").source("S1").target("T")).unwrap();

	let previous = table
		.insert(key(1), named("a").source("S2").target("T"))
		.unwrap();

	assert!(previous.is_some());
	assert_eq!(table.len(), 1);
	assert!(claim_keys(&table, "S1").is_empty());
	assert_eq!(claim_keys(&table, "S2"), vec![1]);
}

#[test]
fn test_duplicate_declarations_collapse() {
	let reg = named("a")
		.sources(["S", "S"])
		.targets(["T1", "T2", "T1"]);
	assert_eq!(reg.source_types().len(), 1);
	assert_eq!(
		reg.target_types(),
		&[crate::TargetType::new("T1"), crate::TargetType::new("T2")]
	);
}
