use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown status: {0}")]
pub struct UnknownStatus(pub String);

/// Status of a single unit-tracked component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Planning,
    Manufactured,
    Transported,
    Accepted,
    Installed,
    Rejected,
}

impl ComponentStatus {
    /// Forward pipeline order. `Rejected` sits outside it.
    pub const PIPELINE: [ComponentStatus; 5] = [
        ComponentStatus::Planning,
        ComponentStatus::Manufactured,
        ComponentStatus::Transported,
        ComponentStatus::Accepted,
        ComponentStatus::Installed,
    ];

    pub const ALL: [ComponentStatus; 6] = [
        ComponentStatus::Planning,
        ComponentStatus::Manufactured,
        ComponentStatus::Transported,
        ComponentStatus::Accepted,
        ComponentStatus::Installed,
        ComponentStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Planning => "planning",
            ComponentStatus::Manufactured => "manufactured",
            ComponentStatus::Transported => "transported",
            ComponentStatus::Accepted => "accepted",
            ComponentStatus::Installed => "installed",
            ComponentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Bucket key of an aggregate ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketStatus {
    Planning,
    Manufactured,
    Transported,
    Rejected,
}

impl BucketStatus {
    pub const ALL: [BucketStatus; 4] = [
        BucketStatus::Planning,
        BucketStatus::Manufactured,
        BucketStatus::Transported,
        BucketStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketStatus::Planning => "planning",
            BucketStatus::Manufactured => "manufactured",
            BucketStatus::Transported => "transported",
            BucketStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for BucketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BucketStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BucketStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// The API hands out numeric ids for some resources and string ids for
/// others; both are kept as strings here.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn optional_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "id_string")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(id)| id))
}

/// One recorded status change of a unit component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: ComponentStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub status: ComponentStatus,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub section_id: Option<String>,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub project_id: Option<String>,
    /// Attachment references, passed through untouched.
    #[serde(default)]
    pub files: Vec<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, alias = "statusHistory")]
    pub status_history: Vec<StatusEntry>,
}

impl Component {
    /// Status changes, oldest first.
    pub fn history(&self) -> Vec<StatusEntry> {
        let mut entries = self.status_history.clone();
        entries.sort_by_key(|entry| entry.timestamp);
        entries
    }
}

/// Per-status counts of an aggregate component. Missing keys read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Buckets(BTreeMap<BucketStatus, u64>);

impl Buckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, status: BucketStatus) -> u64 {
        self.0.get(&status).copied().unwrap_or(0)
    }

    pub fn set(&mut self, status: BucketStatus, count: u64) {
        self.0.insert(status, count);
    }

    pub fn with(mut self, status: BucketStatus, count: u64) -> Self {
        self.set(status, count);
        self
    }

    /// Sum of all buckets, `None` if it does not fit in a `u64`.
    pub fn sum(&self) -> Option<u64> {
        self.0
            .values()
            .try_fold(0u64, |acc, count| acc.checked_add(*count))
    }

    pub fn iter(&self) -> impl Iterator<Item = (BucketStatus, u64)> + '_ {
        BucketStatus::ALL.into_iter().map(|status| (status, self.get(status)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateComponent {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub total: u64,
    #[serde(default)]
    pub statuses: Buckets,
}

/// A quantity moved between two buckets, as persisted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketMove {
    pub from_status: BucketStatus,
    pub to_status: BucketStatus,
    pub quantity: u64,
}

/// Entry of a project listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Project {
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.sections.iter().flat_map(|section| section.components.iter())
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }
}
