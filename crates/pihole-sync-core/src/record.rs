//! DNS record model
//!
//! A [`Record`] is one name/type/target-set triple as known to the record
//! store. Records are never mutated in place: changes are expressed as a
//! delete of the old record and a create of the new one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DNS record type
///
/// The set is closed per deployment; only these types are listed and
/// reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    /// Address record (IPv4)
    #[serde(rename = "A")]
    A,
    /// Address record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
    /// Canonical-name record
    #[serde(rename = "CNAME")]
    Cname,
}

impl RecordType {
    /// Supported record types in snapshot enumeration order
    pub const SUPPORTED: [RecordType; 3] = [RecordType::A, RecordType::Aaaa, RecordType::Cname];

    /// The wire name of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
        }
    }

    /// Whether records of this type carry IP addresses as targets
    pub fn is_address(&self) -> bool {
        matches!(self, RecordType::A | RecordType::Aaaa)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            "CNAME" => Ok(RecordType::Cname),
            other => Err(crate::Error::invalid_input(format!(
                "unsupported record type: {}",
                other
            ))),
        }
    }
}

/// Grouping key for multi-valued records
///
/// The name is stored lowercased, so keys compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    /// Lowercased DNS name
    pub name: String,
    /// Record type
    pub record_type: RecordType,
}

impl RecordKey {
    /// Build a key, normalizing the name
    pub fn new(name: &str, record_type: RecordType) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            record_type,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.record_type)
    }
}

/// A DNS record: name, type and an ordered list of targets
///
/// For address records multiple targets are multiple A/AAAA values under
/// one name. Canonical-name records are expected to carry one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Fully qualified domain name
    #[serde(rename = "dnsName")]
    pub name: String,

    /// Record type
    #[serde(rename = "recordType")]
    pub record_type: RecordType,

    /// Target values (addresses or canonical name)
    #[serde(default)]
    pub targets: Vec<String>,
}

impl Record {
    /// Create a new record
    pub fn new<I, S>(name: impl Into<String>, record_type: RecordType, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            record_type,
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }

    /// The `(name, type)` grouping key of this record
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.name, self.record_type)
    }

    /// Delete-matching predicate
    ///
    /// Names compare case-insensitively; type and the full target list must
    /// be equal.
    pub fn matches(&self, other: &Record) -> bool {
        self.record_type == other.record_type
            && self.name.eq_ignore_ascii_case(&other.name)
            && self.targets == other.targets
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]", self.name, self.record_type, self.targets.join(", "))
    }
}
