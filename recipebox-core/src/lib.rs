pub mod error;
pub mod import;
pub mod pdf;
pub mod recipe;

pub use error::{ImportError, PdfError, RowError};
pub use import::{import_rows, read_data_rows, ImportSummary, RecipeSink, RowFailure, SheetRow};
pub use pdf::{render_recipe_card, RecipeCard};
pub use recipe::{FieldErrors, RecipeDraft, RecipeFields, RecipePatch};
