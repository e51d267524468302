//! Column metadata and record documents as they arrive from a backend.

use grid_model::{ColumnSet, ColumnType, ModelError, Record, RecordId, RecordStatus};
use serde_json::json;

const COLUMNS: &str = r#"[
    {"key": "name", "header": "Name", "type": "string", "sortable": true, "pinned": true, "width": 200},
    {"key": "status", "header": "Status", "type": "badge"},
    {"key": "groups", "header": "Groups", "type": "chiplist"},
    {"key": "createdAt", "header": "Created", "type": "date", "dateFormat": "%Y-%m-%d"},
    {"key": "score", "header": "Score", "type": "sparkline"}
]"#;

#[test]
fn test_column_set_from_metadata() {
    let columns = ColumnSet::from_json(COLUMNS).unwrap();

    let types: Vec<ColumnType> = columns.iter().map(|c| c.column_type).collect();
    assert_eq!(
        types,
        vec![
            ColumnType::String,
            ColumnType::Badge,
            ColumnType::Chiplist,
            ColumnType::Date,
            ColumnType::Unknown,
        ]
    );

    let name = columns.get("name").unwrap();
    assert!(name.pinned && name.sortable);
    assert_eq!(name.width, Some(200));

    let created = columns.get("createdAt").unwrap();
    assert!(!created.sortable);
    assert_eq!(created.date_format.as_deref(), Some("%Y-%m-%d"));
}

#[test]
fn test_duplicate_keys_are_rejected() {
    let json = r#"[
        {"key": "name", "header": "Name"},
        {"key": "name", "header": "Full name"}
    ]"#;
    assert_eq!(
        ColumnSet::from_json(json).unwrap_err(),
        ModelError::DuplicateColumnKey {
            key: "name".to_string()
        }
    );
}

#[test]
fn test_malformed_metadata_is_reported() {
    let err = ColumnSet::from_json(r#"[{"header": "No key"}]"#).unwrap_err();
    assert!(matches!(err, ModelError::InvalidMetadata { .. }));
}

#[test]
fn test_record_document_keeps_extra_fields() {
    let record: Record = serde_json::from_value(json!({
        "id": "u7",
        "status": "inactive",
        "groups": [{"groupId": "g1", "groupName": "Admins"}],
        "name": "Grace Hopper",
        "lastLogin": null
    }))
    .unwrap();

    assert_eq!(record.id, RecordId::new("u7"));
    assert_eq!(record.status, RecordStatus::Inactive);
    assert_eq!(record.cell("name"), Some(json!("Grace Hopper")));
    assert_eq!(record.cell("lastLogin"), Some(json!(null)));
    assert_eq!(record.cell("missing"), None);
    assert_eq!(
        record.cell("groups"),
        Some(json!([{"groupId": "g1", "groupName": "Admins"}]))
    );
    assert_eq!(record.cell("status"), Some(json!("inactive")));
}
