//! Metadata-driven cell rendering.
//!
//! Maps a column's declared [`ColumnType`](grid_model::ColumnType) and a raw
//! cell value to a [`RenderInstruction`] the presentation layer can paint.
//!
//! ```ignore
//! let instruction = resolve_cell(record.cell("groups").as_ref(), &column);
//! ```

pub mod date;
pub mod instruction;
pub mod resolve;

pub use date::{DEFAULT_DATE_FORMAT, format_date};
pub use instruction::{BadgeTone, Chip, NO_ITEMS_LABEL, PLACEHOLDER, RenderInstruction};
pub use resolve::{ResolvedCell, resolve_cell, resolve_row};
