//! Change plan
//!
//! A [`Changes`] value is the desired-state diff produced by the surrounding
//! reconciliation controller. `update_old` and `update_new` are before and
//! after snapshots of changed records; they are not paired by index and may
//! differ in length when target values are split or merged.

use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Desired create/delete/update operations for one `apply_changes` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Changes {
    /// Records to add verbatim
    #[serde(default)]
    pub create: Vec<Record>,

    /// Records as they are before the update
    #[serde(default)]
    pub update_old: Vec<Record>,

    /// Records as they should be after the update
    #[serde(default)]
    pub update_new: Vec<Record>,

    /// Records to remove verbatim
    #[serde(default)]
    pub delete: Vec<Record>,
}

impl Changes {
    /// Create an empty change plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan that only creates the given records
    pub fn creating(records: Vec<Record>) -> Self {
        Self {
            create: records,
            ..Self::default()
        }
    }

    /// Plan that only deletes the given records
    pub fn deleting(records: Vec<Record>) -> Self {
        Self {
            delete: records,
            ..Self::default()
        }
    }

    /// Plan that only updates records from `old` to `new`
    pub fn updating(old: Vec<Record>, new: Vec<Record>) -> Self {
        Self {
            update_old: old,
            update_new: new,
            ..Self::default()
        }
    }

    /// Whether the plan contains no records at all
    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.update_old.is_empty()
            && self.update_new.is_empty()
            && self.delete.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordType;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let changes: Changes = serde_json::from_str(
            r#"{"create": [{"dnsName": "a.example.com", "recordType": "A", "targets": ["10.0.0.1"]}]}"#,
        )
        .unwrap();

        assert_eq!(changes.create.len(), 1);
        assert_eq!(changes.create[0].record_type, RecordType::A);
        assert!(changes.update_old.is_empty());
        assert!(changes.update_new.is_empty());
        assert!(changes.delete.is_empty());
    }

    #[test]
    fn test_update_sections_use_camel_case() {
        let changes: Changes = serde_json::from_str(
            r#"{
                "updateOld": [{"dnsName": "a.example.com", "recordType": "A", "targets": ["10.0.0.1"]}],
                "updateNew": [{"dnsName": "a.example.com", "recordType": "A", "targets": ["10.0.0.2"]}]
            }"#,
        )
        .unwrap();

        assert_eq!(changes.update_old[0].targets, vec!["10.0.0.1"]);
        assert_eq!(changes.update_new[0].targets, vec!["10.0.0.2"]);
    }

    #[test]
    fn test_is_empty() {
        assert!(Changes::new().is_empty());
        assert!(
            !Changes::deleting(vec![Record::new("a.example.com", RecordType::A, ["10.0.0.1"])])
                .is_empty()
        );
    }
}
