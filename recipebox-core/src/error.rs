use thiserror::Error;

use crate::recipe::FieldErrors;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook has no worksheets")]
    NoWorksheet,
}

/// Why a single spreadsheet row could not become a recipe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Expected 7 fields, found {found}")]
    FieldCount { found: usize },

    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be text, got {value}")]
    NotText { field: &'static str, value: String },

    #[error("{field} is not an integer: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} is not a valid id: {value}")]
    InvalidId { field: &'static str, value: String },

    #[error("Invalid row: {0}")]
    Invalid(FieldErrors),
}

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to render PDF: {0}")]
    Render(String),
}
