//! Row entities served by the data source.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable, unique record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// RECORD STATUS
// =============================================================================

/// Lifecycle status of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl RecordStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    /// The opposite status.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("Unknown record status: {s}")),
        }
    }
}

// =============================================================================
// GROUP REFERENCE
// =============================================================================

/// A group the record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRef {
    pub group_id: String,
    pub group_name: String,
}

impl GroupRef {
    pub fn new(group_id: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            group_name: group_name.into(),
        }
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// A row entity.
///
/// `id`, `status` and `groups` are typed; every other field is kept as a raw
/// JSON value so arbitrary column metadata can address it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Create a record without groups or extra fields.
    pub fn new(id: impl Into<RecordId>, status: RecordStatus) -> Self {
        Self {
            id: id.into(),
            status,
            groups: Vec::new(),
            fields: Map::new(),
        }
    }

    /// Add a field value.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a group membership.
    #[must_use]
    pub fn with_group(mut self, group: GroupRef) -> Self {
        self.groups.push(group);
        self
    }

    /// Raw value for a column key, `None` when the record has no such field.
    pub fn cell(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(Value::String(self.id.to_string())),
            "status" => Some(Value::String(self.status.as_str().to_string())),
            "groups" => serde_json::to_value(&self.groups).ok(),
            _ => self.fields.get(key).cloned(),
        }
    }

    /// Borrow an extra field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip_keeps_extra_fields() {
        let json = r#"{"id":"u1","status":"inactive","groups":[{"groupId":"g1","groupName":"Ops"}],"name":"Ada","age":36}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, RecordStatus::Inactive);
        assert_eq!(record.groups[0].group_name, "Ops");
        assert_eq!(record.field("name"), Some(&Value::from("Ada")));
        assert_eq!(record.cell("age"), Some(Value::from(36)));
    }

    #[test]
    fn test_cell_typed_fields() {
        let record = Record::new("u2", RecordStatus::Active).with_group(GroupRef::new("g1", "Ops"));
        assert_eq!(record.cell("status"), Some(Value::from("active")));
        assert_eq!(record.cell("id"), Some(Value::from("u2")));
        assert!(record.cell("groups").unwrap().is_array());
        assert_eq!(record.cell("missing"), None);
    }

    #[test]
    fn test_status_toggle() {
        assert_eq!(RecordStatus::Active.toggled(), RecordStatus::Inactive);
        assert_eq!("INACTIVE".parse::<RecordStatus>().unwrap(), RecordStatus::Inactive);
        assert!("archived".parse::<RecordStatus>().is_err());
    }
}
