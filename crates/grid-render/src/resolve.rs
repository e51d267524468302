//! Column resolver: column type + raw value -> render instruction.
//!
//! Resolution is pure and total. Malformed values degrade to
//! [`RenderInstruction::Placeholder`] so one bad cell never blanks the view.

use serde_json::Value;

use grid_model::{ColumnDescriptor, ColumnSet, ColumnType, GroupRef, Record, RecordStatus};

use crate::date::format_date;
use crate::instruction::{BadgeTone, Chip, RenderInstruction};

/// A resolved cell together with the column it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCell {
    pub key: String,
    pub instruction: RenderInstruction,
}

/// Resolve a raw cell value for a column.
pub fn resolve_cell(value: Option<&Value>, descriptor: &ColumnDescriptor) -> RenderInstruction {
    match descriptor.column_type {
        ColumnType::String => resolve_string(value),
        ColumnType::Badge => resolve_badge(value),
        ColumnType::Date => resolve_date(value, descriptor.date_format.as_deref()),
        ColumnType::Chiplist => resolve_chiplist(value),
        ColumnType::Unknown => resolve_fallback(value),
    }
}

/// Resolve every visible column of a record, in column order.
///
/// `is_visible` receives the column key; pinned columns are always included.
pub fn resolve_row(
    record: &Record,
    columns: &ColumnSet,
    is_visible: impl Fn(&str) -> bool,
) -> Vec<ResolvedCell> {
    columns
        .iter()
        .filter(|column| column.pinned || is_visible(&column.key))
        .map(|column| {
            let value = record.cell(&column.key);
            ResolvedCell {
                key: column.key.clone(),
                instruction: resolve_cell(value.as_ref(), column),
            }
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn resolve_string(value: Option<&Value>) -> RenderInstruction {
    value
        .and_then(scalar_text)
        .map_or(RenderInstruction::Placeholder, RenderInstruction::text)
}

fn resolve_badge(value: Option<&Value>) -> RenderInstruction {
    let Some(Value::String(raw)) = value else {
        return RenderInstruction::Placeholder;
    };
    match raw.parse::<RecordStatus>() {
        Ok(status) => RenderInstruction::badge(status.label(), BadgeTone::from(status)),
        Err(_) if raw.trim().is_empty() => RenderInstruction::Placeholder,
        Err(_) => RenderInstruction::badge(raw.trim(), BadgeTone::Neutral),
    }
}

fn resolve_date(value: Option<&Value>, format: Option<&str>) -> RenderInstruction {
    value
        .and_then(|v| format_date(v, format))
        .map_or(RenderInstruction::Placeholder, |text| {
            RenderInstruction::Date { text }
        })
}

fn resolve_chiplist(value: Option<&Value>) -> RenderInstruction {
    let items = match value {
        None | Some(Value::Null) => return RenderInstruction::NoItems,
        Some(Value::Array(items)) => items,
        Some(_) => return RenderInstruction::Placeholder,
    };
    if items.is_empty() {
        return RenderInstruction::NoItems;
    }

    let chips: Vec<Chip> = items
        .iter()
        .filter_map(group_from_value)
        .map(|group| Chip {
            key: group.group_id,
            label: group.group_name,
        })
        .collect();

    if chips.is_empty() {
        RenderInstruction::Placeholder
    } else {
        RenderInstruction::Chips { chips }
    }
}

fn resolve_fallback(value: Option<&Value>) -> RenderInstruction {
    match value {
        None | Some(Value::Null) => RenderInstruction::Placeholder,
        Some(structured @ (Value::Array(_) | Value::Object(_))) => serde_json::to_string(structured)
            .map_or(RenderInstruction::Placeholder, RenderInstruction::text),
        Some(scalar) => resolve_string(Some(scalar)),
    }
}

fn group_from_value(value: &Value) -> Option<GroupRef> {
    let object = value.as_object()?;
    let group_id = object.get("groupId")?.as_str()?;
    let group_name = object.get("groupName")?.as_str()?;
    Some(GroupRef::new(group_id, group_name))
}
