use std::path::{Path, PathBuf};

use recipebox_core::{import_rows, read_data_rows, ImportSummary, RecipeDraft, RecipeSink};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::store::{RecipeStore, StoreError};

/// Spreadsheet extensions the reader understands.
const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// An uploaded spreadsheet on disk. The file is removed when this is dropped,
/// including during a panic unwind.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Write `data` to a fresh file in `dir`, keeping the original
    /// extension so the workbook format can be detected.
    pub async fn persist(dir: &Path, original_name: &str, data: &[u8]) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or_else(|| "xlsx".to_string());

        let path = dir.join(format!("{}.{}", Uuid::new_v4(), extension));
        tokio::fs::write(&path, data).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed uploaded spreadsheet"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove uploaded spreadsheet"),
        }
    }
}

/// Feeds imported rows to the store on behalf of one creator.
struct StoreSink<'a> {
    store: &'a dyn RecipeStore,
    creator_id: Uuid,
}

impl RecipeSink for StoreSink<'_> {
    type Error = StoreError;

    fn create_recipe(&mut self, draft: &RecipeDraft) -> Result<Uuid, StoreError> {
        self.store
            .create_recipe(self.creator_id, draft)
            .map(|recipe| recipe.id)
    }
}

/// Import every data row of the spreadsheet at `path` as recipes owned by
/// `user_id`. Blocking. Returns `None` when the job could not start.
pub fn run_bulk_import(
    store: &dyn RecipeStore,
    path: &Path,
    user_id: Uuid,
) -> Option<ImportSummary> {
    match store.get_user(user_id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!(%user_id, "Bulk import user no longer exists");
            return None;
        }
        Err(e) => {
            error!(%user_id, error = %e, "Failed to load bulk import user");
            return None;
        }
    }

    let rows = match read_data_rows(path) {
        Ok(rows) => rows,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read spreadsheet");
            return None;
        }
    };

    info!(%user_id, rows = rows.len(), "Starting bulk import");

    let mut sink = StoreSink {
        store,
        creator_id: user_id,
    };
    let summary = import_rows(&rows, &mut sink);

    info!(
        %user_id,
        created = summary.created,
        failed = summary.failed,
        skipped = summary.skipped,
        "Bulk import finished"
    );

    Some(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::{seed_catalog, seed_user, write_recipe_sheet};
    use crate::types::UserType;

    #[test]
    fn test_malformed_row_is_skipped_and_the_rest_imported() {
        let store = MemoryStore::new();
        let chef = seed_user(&store, "chef@example.com", UserType::Creator);
        let catalog = seed_catalog(&store);
        let dir = tempfile::tempdir().unwrap();
        let cuisine = catalog.cuisine.to_string();
        let ingredients = format!("{}, {}", catalog.ingredients[0], catalog.ingredients[1]);
        let orphan = Uuid::new_v4().to_string();

        let path = write_recipe_sheet(
            dir.path(),
            &[
                ["Soup", "Warm", "Boil", "5", "20", cuisine.as_str(), ingredients.as_str()],
                ["Bad", "", "Stir", "ten", "5", cuisine.as_str(), ""],
                ["Salad", "", "Toss", "10", "0", cuisine.as_str(), ""],
                ["Orphan", "", "Mix", "1", "1", cuisine.as_str(), orphan.as_str()],
                ["Stew", "", "Simmer", "15", "90", cuisine.as_str(), ""],
            ],
        );

        let summary = run_bulk_import(&store, &path, chef.id).unwrap();

        assert_eq!(summary.created, 3);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.failures[0].row, 3);
        assert_eq!(summary.failures[1].row, 5);
        assert_eq!(store.recipe_count(), 3);

        let soup = store
            .list_recipes(0, 10)
            .unwrap()
            .items
            .into_iter()
            .find(|r| r.title == "Soup")
            .unwrap();
        assert_eq!(soup.ingredients.len(), 2);
    }

    #[test]
    fn test_missing_user_imports_nothing() {
        let store = MemoryStore::new();
        let catalog = seed_catalog(&store);
        let dir = tempfile::tempdir().unwrap();
        let cuisine = catalog.cuisine.to_string();
        let path = write_recipe_sheet(dir.path(), &[["Soup", "", "Boil", "5", "20", cuisine.as_str(), ""]]);

        assert!(run_bulk_import(&store, &path, Uuid::new_v4()).is_none());
        assert_eq!(store.recipe_count(), 0);
    }

    #[test]
    fn test_unreadable_file_imports_nothing() {
        let store = MemoryStore::new();
        let chef = seed_user(&store, "chef@example.com", UserType::Creator);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();

        assert!(run_bulk_import(&store, &path, chef.id).is_none());
    }

    #[tokio::test]
    async fn test_temp_upload_keeps_extension_and_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let upload = TempUpload::persist(dir.path(), "Recipes.XLS", b"data")
            .await
            .unwrap();
        let path = upload.path().to_path_buf();
        assert_eq!(path.extension().unwrap(), "xls");
        assert!(path.exists());

        drop(upload);
        assert!(!path.exists());

        let upload = TempUpload::persist(dir.path(), "notes.txt", b"data")
            .await
            .unwrap();
        assert_eq!(upload.path().extension().unwrap(), "xlsx");
    }
}
