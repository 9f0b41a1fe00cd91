//! Bulk recipe import from spreadsheet workbooks.

mod batch;
mod reader;
mod row;

pub use batch::{import_rows, ImportSummary, RecipeSink, RowFailure, CHUNK_SIZE};
pub use reader::{read_data_rows, SheetRow};
pub use row::{normalize_row, ROW_WIDTH};
