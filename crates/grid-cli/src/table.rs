//! Terminal rendering of a page of records.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{
    Attribute, Cell, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use grid_model::{ColumnDescriptor, ColumnSet, PageData, ViewParams};
use grid_render::{BadgeTone, RenderInstruction, resolve_row};

/// Message shown in place of rows when the page is empty.
pub const EMPTY_MESSAGE: &str = "No records match the current view.";

/// Build the table for one page, honoring column visibility.
pub fn page_table(data: &PageData, columns: &ColumnSet, params: &ViewParams) -> Table {
    let visible: Vec<&ColumnDescriptor> = columns
        .iter()
        .filter(|c| c.pinned || params.is_column_visible(&c.key))
        .collect();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        visible
            .iter()
            .map(|column| header_cell(column, params))
            .collect::<Vec<_>>(),
    );
    table.set_constraints(visible.iter().map(|column| match column.width {
        Some(width) => {
            ColumnConstraint::UpperBoundary(Width::Fixed(u16::try_from(width).unwrap_or(u16::MAX)))
        }
        None => ColumnConstraint::ContentWidth,
    }));

    if data.records.is_empty() {
        table.add_row(vec![dim_cell(EMPTY_MESSAGE)]);
        return table;
    }

    for record in &data.records {
        let cells = resolve_row(record, columns, |key| params.is_column_visible(key));
        table.add_row(
            cells
                .iter()
                .map(|cell| instruction_cell(&cell.instruction))
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// Position summary, e.g. `Page 2 of 3 (25 records)`.
pub fn page_footer(data: &PageData, params: &ViewParams) -> String {
    let noun = if data.total_count == 1 {
        "record"
    } else {
        "records"
    };
    format!(
        "Page {} of {} ({} {noun})",
        params.page_index + 1,
        data.page_count(params.page_size),
        data.total_count
    )
}

fn header_cell(column: &ColumnDescriptor, params: &ViewParams) -> Cell {
    let label = match &params.sort {
        Some(sort) if sort.field_key == column.key => {
            let arrow = if sort.descending { "▼" } else { "▲" };
            format!("{} {arrow}", column.header)
        }
        _ => column.header.clone(),
    };
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn instruction_cell(instruction: &RenderInstruction) -> Cell {
    match instruction {
        RenderInstruction::Badge { label, tone } => Cell::new(label).fg(tone_color(*tone)),
        RenderInstruction::NoItems | RenderInstruction::Placeholder => {
            dim_cell(instruction.plain_text())
        }
        other => Cell::new(other.plain_text()),
    }
}

fn tone_color(tone: BadgeTone) -> Color {
    match tone {
        BadgeTone::Success => Color::Green,
        BadgeTone::Neutral => Color::DarkGrey,
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
