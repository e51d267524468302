//! Built-in demo data used when no data file is given.

use grid_model::{
    ColumnDescriptor, ColumnSet, ColumnType, GroupRef, Record, RecordStatus, Result,
};

/// Family of the built-in records.
pub const FAMILY: &str = "users";

const FIRST_NAMES: [&str; 8] = [
    "Ada", "Grace", "Alan", "Barbara", "Edsger", "Frances", "Donald", "Margaret",
];
const LAST_NAMES: [&str; 5] = ["Lovelace", "Hopper", "Turing", "Liskov", "Dijkstra"];
const GROUPS: [(&str, &str); 4] = [
    ("g-eng", "Engineering"),
    ("g-sales", "Sales"),
    ("g-ops", "Operations"),
    ("g-research", "Research"),
];

pub fn columns() -> Result<ColumnSet> {
    let columns = vec![
        ColumnDescriptor::new("name", "Name", ColumnType::String)
            .sortable()
            .pinned()
            .with_width(22),
        ColumnDescriptor::new("email", "Email", ColumnType::String).sortable(),
        ColumnDescriptor::new("status", "Status", ColumnType::Badge).sortable(),
        ColumnDescriptor::new("groups", "Groups", ColumnType::Chiplist),
        ColumnDescriptor::new("createdAt", "Created", ColumnType::Date).sortable(),
        ColumnDescriptor::new("lastLogin", "Last login", ColumnType::Date)
            .with_date_format("%Y-%m-%d %H:%M"),
    ];
    ColumnSet::new(columns)
}

/// Deterministic set of 25 users.
pub fn records() -> Vec<Record> {
    (0..25).map(record).collect()
}

fn record(n: usize) -> Record {
    let first = FIRST_NAMES[n % FIRST_NAMES.len()];
    let last = LAST_NAMES[n % LAST_NAMES.len()];
    let status = if n % 4 == 3 {
        RecordStatus::Inactive
    } else {
        RecordStatus::Active
    };

    let mut record = Record::new(format!("u{:03}", n + 1), status)
        .with_field("name", format!("{first} {last}"))
        .with_field(
            "email",
            format!("{}.{}{n}@example.com", first.to_lowercase(), last.to_lowercase()),
        )
        .with_field(
            "createdAt",
            format!("2024-{:02}-{:02}T09:30:00Z", n % 12 + 1, n % 28 + 1),
        );

    // Every fifth user never logged in.
    if n % 5 != 0 {
        record = record.with_field("lastLogin", 1_717_000_000_000_i64 + n as i64 * 86_400_000);
    }
    if n % 7 == 6 {
        return record;
    }
    for (offset, (id, name)) in GROUPS.iter().enumerate() {
        if (n + offset) % 3 == 0 {
            record = record.with_group(GroupRef::new(*id, *name));
        }
    }
    record
}
