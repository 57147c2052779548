//! Set difference between a fresh extraction and the known-vehicle set.

use crate::model::VehicleRecord;
use std::collections::HashSet;

/// Ids present in `current` but absent from `known`, in extraction order and
/// deduplicated. Pure; ids in `known` but missing from `current` are left
/// alone — removal only ever happens when the caller writes back the full
/// current id set.
pub fn new_vehicle_ids(current: &[VehicleRecord], known: &HashSet<String>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    current
        .iter()
        .filter(|v| !known.contains(&v.id))
        .filter(|v| seen.insert(v.id.as_str()))
        .map(|v| v.id.clone())
        .collect()
}

/// The full id set of one extraction, used to replace the known set after a
/// cycle that produced changes.
pub fn current_id_set(current: &[VehicleRecord]) -> HashSet<String> {
    current.iter().map(|v| v.id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> VehicleRecord {
        VehicleRecord {
            id: id.to_string(),
            model: "Model 3".into(),
            details: String::new(),
            url: String::new(),
        }
    }

    fn known(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn returns_exactly_current_minus_known() {
        let current = vec![record("B"), record("C")];
        assert_eq!(new_vehicle_ids(&current, &known(&["A", "B"])), vec!["C"]);
    }

    #[test]
    fn preserves_extraction_order() {
        let current = vec![record("Z"), record("A"), record("M")];
        assert_eq!(
            new_vehicle_ids(&current, &known(&[])),
            vec!["Z", "A", "M"]
        );
    }

    #[test]
    fn is_idempotent() {
        let current = vec![record("A"), record("B")];
        let base = known(&["A"]);
        let first = new_vehicle_ids(&current, &base);
        let second = new_vehicle_ids(&current, &base);
        assert_eq!(first, second);
    }

    #[test]
    fn collapses_duplicate_ids() {
        let current = vec![record("A"), record("A"), record("B")];
        assert_eq!(new_vehicle_ids(&current, &known(&[])), vec!["A", "B"]);
    }

    #[test]
    fn empty_extraction_yields_nothing() {
        assert!(new_vehicle_ids(&[], &known(&["A"])).is_empty());
    }

    #[test]
    fn vanished_ids_are_not_reported() {
        let current = vec![record("B")];
        assert!(new_vehicle_ids(&current, &known(&["A", "B"])).is_empty());
    }

    #[test]
    fn current_id_set_collects_all_ids() {
        let current = vec![record("A"), record("B"), record("A")];
        assert_eq!(current_id_set(&current), known(&["A", "B"]));
    }
}
