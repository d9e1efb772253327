//! Change plan resolver
//!
//! Turns a [`Changes`] plan into the ordered list of create/delete calls
//! the record store needs. The remote API has no update verb and its
//! create/delete verbs take the full target list of a `(name, type)` key,
//! so updates are regrouped by key and collapse into at most one delete
//! and one create per changed key.
//!
//! ## Operation order
//!
//! ```text
//! 1. plan.create          -> Create, input order
//! 2. plan.delete          -> Delete, input order
//! 3. update_old/new keys  -> Delete(old set) then Create(new set), per key,
//!                            keys in first-seen order (old first, then new-only)
//! ```
//!
//! [`resolve`] and [`resolve_updates`] are pure; [`apply`] drives a
//! [`RecordStore`] from their result.

use crate::changes::Changes;
use crate::error::Result;
use crate::record::{Record, RecordKey, RecordType};
use crate::traits::RecordStore;
use std::collections::HashMap;
use tracing::{debug, info};

/// A single store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create the record with its full target list
    Create(Record),
    /// Delete the record with its full target list
    Delete(Record),
}

impl Operation {
    /// The record carried by this operation
    pub fn record(&self) -> &Record {
        match self {
            Operation::Create(record) | Operation::Delete(record) => record,
        }
    }

    /// Whether this is a create
    pub fn is_create(&self) -> bool {
        matches!(self, Operation::Create(_))
    }
}

/// Ordered store calls for one change plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPlan {
    operations: Vec<Operation>,
}

impl ResolvedPlan {
    /// All operations in the order they are applied
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Records that will be created, in application order
    pub fn creates(&self) -> impl Iterator<Item = &Record> {
        self.operations.iter().filter_map(|op| match op {
            Operation::Create(record) => Some(record),
            Operation::Delete(_) => None,
        })
    }

    /// Records that will be deleted, in application order
    pub fn deletes(&self) -> impl Iterator<Item = &Record> {
        self.operations.iter().filter_map(|op| match op {
            Operation::Delete(record) => Some(record),
            Operation::Create(_) => None,
        })
    }

    /// Number of store calls
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether no store call is needed
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl IntoIterator for ResolvedPlan {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

/// Targets accumulated for one key
#[derive(Debug)]
struct TargetGroup {
    /// First-seen spelling of the name
    name: String,
    /// Distinct targets in first-seen order
    targets: Vec<String>,
}

impl TargetGroup {
    fn extend(&mut self, targets: &[String]) {
        for target in targets {
            if !self.targets.contains(target) {
                self.targets.push(target.clone());
            }
        }
    }

    fn to_record(&self, record_type: RecordType) -> Record {
        Record::new(self.name.clone(), record_type, self.targets.iter().cloned())
    }
}

/// Key -> target set, keeping keys in first-seen order
#[derive(Debug, Default)]
struct Grouping {
    index: HashMap<RecordKey, usize>,
    groups: Vec<(RecordKey, TargetGroup)>,
}

impl Grouping {
    fn from_records(records: &[Record]) -> Self {
        let mut grouping = Self::default();

        for record in records {
            let key = record.key();
            let slot = match grouping.index.get(&key) {
                Some(&slot) => slot,
                None => {
                    grouping.index.insert(key.clone(), grouping.groups.len());
                    grouping.groups.push((
                        key,
                        TargetGroup {
                            name: record.name.clone(),
                            targets: Vec::new(),
                        },
                    ));
                    grouping.groups.len() - 1
                }
            };
            grouping.groups[slot].1.extend(&record.targets);
        }

        grouping
    }

    fn get(&self, key: &RecordKey) -> Option<&TargetGroup> {
        self.index.get(key).map(|&slot| &self.groups[slot].1)
    }

    fn contains(&self, key: &RecordKey) -> bool {
        self.index.contains_key(key)
    }

    fn keys(&self) -> impl Iterator<Item = &RecordKey> {
        self.groups.iter().map(|(key, _)| key)
    }
}

/// Set equality over two duplicate-free target lists
fn same_target_set(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().all(|target| b.contains(target))
}

/// Regroup update snapshots by key and emit the calls for changed keys
///
/// For every key in either input whose merged target sets differ, emits a
/// delete carrying the full old set (if non-empty) followed by a create
/// carrying the full new set (if non-empty). Keys whose sets are equal,
/// regardless of target order, produce nothing.
pub fn resolve_updates(update_old: &[Record], update_new: &[Record]) -> Vec<Operation> {
    let old = Grouping::from_records(update_old);
    let new = Grouping::from_records(update_new);

    let keys = old
        .keys()
        .chain(new.keys().filter(|key| !old.contains(key)));

    let mut operations = Vec::new();
    for key in keys {
        let old_group = old.get(key);
        let new_group = new.get(key);

        let old_targets = old_group.map_or(&[][..], |g| g.targets.as_slice());
        let new_targets = new_group.map_or(&[][..], |g| g.targets.as_slice());

        if same_target_set(old_targets, new_targets) {
            debug!("Update for {} leaves targets unchanged, skipping", key);
            continue;
        }

        if let Some(group) = old_group
            && !group.targets.is_empty()
        {
            operations.push(Operation::Delete(group.to_record(key.record_type)));
        }

        if let Some(group) = new_group
            && !group.targets.is_empty()
        {
            operations.push(Operation::Create(group.to_record(key.record_type)));
        }
    }

    operations
}

/// Resolve a full change plan into ordered store calls
pub fn resolve(changes: &Changes) -> ResolvedPlan {
    let mut operations = Vec::with_capacity(changes.create.len() + changes.delete.len());

    operations.extend(changes.create.iter().cloned().map(Operation::Create));
    operations.extend(changes.delete.iter().cloned().map(Operation::Delete));
    operations.extend(resolve_updates(&changes.update_old, &changes.update_new));

    ResolvedPlan { operations }
}

/// Resolve a change plan and apply it to the store
///
/// Calls are issued one at a time in [`ResolvedPlan`] order. The first
/// failing call stops the remaining ones and its error is returned
/// unchanged; calls already issued stay applied.
pub async fn apply(store: &dyn RecordStore, changes: &Changes) -> Result<()> {
    let plan = resolve(changes);
    debug!("Resolved change plan into {} store call(s)", plan.len());

    let mut created = 0usize;
    let mut deleted = 0usize;

    for operation in plan.operations() {
        match operation {
            Operation::Create(record) => {
                info!("Creating record {}", record);
                store.create_record(record).await?;
                created += 1;
            }
            Operation::Delete(record) => {
                info!("Deleting record {}", record);
                store.delete_record(record).await?;
                deleted += 1;
            }
        }
    }

    info!("Applied change plan: {} create(s), {} delete(s)", created, deleted);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(name: &str, targets: &[&str]) -> Record {
        Record::new(name, RecordType::A, targets.iter().copied())
    }

    fn aaaa(name: &str, targets: &[&str]) -> Record {
        Record::new(name, RecordType::Aaaa, targets.iter().copied())
    }

    #[test]
    fn test_split_targets_merge_into_one_create() {
        let ops = resolve_updates(
            &[a("test2", &["1.2"])],
            &[a("test2", &["3.4"]), a("test2", &["5.6"])],
        );

        assert_eq!(
            ops,
            vec![
                Operation::Delete(a("test2", &["1.2"])),
                Operation::Create(a("test2", &["3.4", "5.6"])),
            ]
        );
    }

    #[test]
    fn test_identical_sets_are_noop() {
        let ops = resolve_updates(
            &[a("test1.example.com", &["192.168.1.1"])],
            &[a("test1.example.com", &["192.168.1.1"])],
        );
        assert!(ops.is_empty());
    }

    #[test]
    fn test_target_order_does_not_matter() {
        let ops = resolve_updates(
            &[a("multi.example.com", &["10.0.0.1", "10.0.0.2"])],
            &[a("multi.example.com", &["10.0.0.2"]), a("multi.example.com", &["10.0.0.1"])],
        );
        assert!(ops.is_empty());
    }

    #[test]
    fn test_added_target_replaces_whole_set() {
        let ops = resolve_updates(
            &[a("grow.example.com", &["10.0.0.1"])],
            &[a("grow.example.com", &["10.0.0.1", "10.0.0.2"])],
        );

        assert_eq!(
            ops,
            vec![
                Operation::Delete(a("grow.example.com", &["10.0.0.1"])),
                Operation::Create(a("grow.example.com", &["10.0.0.1", "10.0.0.2"])),
            ]
        );
    }

    #[test]
    fn test_key_only_in_old_is_deleted() {
        let ops = resolve_updates(&[a("gone.example.com", &["10.0.0.1"])], &[]);
        assert_eq!(ops, vec![Operation::Delete(a("gone.example.com", &["10.0.0.1"]))]);
    }

    #[test]
    fn test_key_only_in_new_is_created() {
        let ops = resolve_updates(&[], &[aaaa("new.example.com", &["fc00::1"])]);
        assert_eq!(ops, vec![Operation::Create(aaaa("new.example.com", &["fc00::1"]))]);
    }

    #[test]
    fn test_duplicate_targets_collapse() {
        let ops = resolve_updates(
            &[a("dup.example.com", &["10.0.0.1"]), a("dup.example.com", &["10.0.0.1"])],
            &[a("dup.example.com", &["10.0.0.2", "10.0.0.2"])],
        );

        assert_eq!(
            ops,
            vec![
                Operation::Delete(a("dup.example.com", &["10.0.0.1"])),
                Operation::Create(a("dup.example.com", &["10.0.0.2"])),
            ]
        );
    }

    #[test]
    fn test_names_group_case_insensitively() {
        let ops = resolve_updates(
            &[a("Host.Example.com", &["10.0.0.1"])],
            &[a("host.example.com", &["10.0.0.1"])],
        );
        assert!(ops.is_empty());
    }

    #[test]
    fn test_types_are_separate_keys() {
        let ops = resolve_updates(
            &[a("dual.example.com", &["10.0.0.1"])],
            &[aaaa("dual.example.com", &["fc00::1"])],
        );

        assert_eq!(
            ops,
            vec![
                Operation::Delete(a("dual.example.com", &["10.0.0.1"])),
                Operation::Create(aaaa("dual.example.com", &["fc00::1"])),
            ]
        );
    }

    #[test]
    fn test_mixed_update_only_touches_changed_keys() {
        let old = vec![
            a("test1.example.com", &["192.168.1.1"]),
            a("test2.example.com", &["192.168.1.2"]),
            aaaa("test1.example.com", &["fc00::1:192:168:1:1"]),
            aaaa("test2.example.com", &["fc00::1:192:168:1:2"]),
        ];
        let new = vec![
            a("test1.example.com", &["192.168.1.1"]),
            a("test2.example.com", &["10.0.0.1"]),
            a("test2.example.com", &["10.0.0.2"]),
            aaaa("test1.example.com", &["fc00::1:192:168:1:1"]),
            aaaa("test2.example.com", &["fc00::1:10:0:0:1"]),
        ];

        let plan = resolve(&Changes::updating(old, new));

        let creates: Vec<_> = plan.creates().cloned().collect();
        let deletes: Vec<_> = plan.deletes().cloned().collect();

        assert_eq!(
            creates,
            vec![
                a("test2.example.com", &["10.0.0.1", "10.0.0.2"]),
                aaaa("test2.example.com", &["fc00::1:10:0:0:1"]),
            ]
        );
        assert_eq!(
            deletes,
            vec![
                a("test2.example.com", &["192.168.1.2"]),
                aaaa("test2.example.com", &["fc00::1:192:168:1:2"]),
            ]
        );
    }

    #[test]
    fn test_plan_order_creates_deletes_then_updates() {
        let changes = Changes {
            create: vec![a("c1", &["1"]), a("c2", &["2"])],
            delete: vec![a("d1", &["3"])],
            update_old: vec![a("u1", &["4"])],
            update_new: vec![a("u1", &["5"])],
        };

        let plan = resolve(&changes);
        let names: Vec<(bool, &str)> = plan
            .operations()
            .iter()
            .map(|op| (op.is_create(), op.record().name.as_str()))
            .collect();

        assert_eq!(
            names,
            vec![
                (true, "c1"),
                (true, "c2"),
                (false, "d1"),
                (false, "u1"),
                (true, "u1"),
            ]
        );
    }

    #[test]
    fn test_direct_creates_are_never_merged() {
        let plan = resolve(&Changes::creating(vec![
            a("same.example.com", &["10.0.0.1"]),
            a("same.example.com", &["10.0.0.2"]),
        ]));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.creates().count(), 2);
    }

    #[test]
    fn test_empty_plan_resolves_to_nothing() {
        assert!(resolve(&Changes::new()).is_empty());
    }
}
