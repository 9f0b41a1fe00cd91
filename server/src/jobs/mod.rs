//! Background work that outlives the request that started it.

mod bulk_import;

pub use bulk_import::{run_bulk_import, TempUpload};

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::store::RecipeStore;

/// Bounded pool for spreadsheet imports. Each job holds a permit while it
/// runs on a blocking thread; extra jobs wait for a free permit.
#[derive(Clone)]
pub struct ImportJobs {
    store: Arc<dyn RecipeStore>,
    permits: Arc<Semaphore>,
}

impl ImportJobs {
    pub fn new(store: Arc<dyn RecipeStore>, workers: usize) -> Self {
        Self {
            store,
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Queue an import of `upload` on behalf of `user_id`. The upload is
    /// deleted when the job ends, whatever its outcome.
    pub fn dispatch(&self, upload: TempUpload, user_id: Uuid) -> JoinHandle<()> {
        let store = self.store.clone();
        let permits = self.permits.clone();

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Import pool closed, dropping upload");
                    return;
                }
            };

            let job = tokio::task::spawn_blocking(move || {
                run_bulk_import(store.as_ref(), upload.path(), user_id);
                drop(upload);
            });

            if let Err(e) = job.await {
                tracing::error!(%user_id, error = %e, "Bulk import worker failed");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::{seed_catalog, seed_user, write_recipe_sheet};
    use crate::types::UserType;

    #[tokio::test]
    async fn test_dispatch_imports_and_removes_file() {
        let store = Arc::new(MemoryStore::new());
        let chef = seed_user(store.as_ref(), "chef@example.com", UserType::Creator);
        let catalog = seed_catalog(store.as_ref());
        let dir = tempfile::tempdir().unwrap();
        let cuisine = catalog.cuisine.to_string();
        let sheet = write_recipe_sheet(
            dir.path(),
            &[
                ["Soup", "", "Boil", "5", "20", cuisine.as_str(), ""],
                ["Bad", "", "Boil", "-1", "20", cuisine.as_str(), ""],
            ],
        );
        let data = std::fs::read(&sheet).unwrap();
        let upload = TempUpload::persist(&dir.path().join("uploads"), "sheet.xlsx", &data)
            .await
            .unwrap();
        let path = upload.path().to_path_buf();

        let jobs = ImportJobs::new(store.clone(), 1);
        jobs.dispatch(upload, chef.id).await.unwrap();

        assert_eq!(store.recipe_count(), 1);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_dispatch_removes_file_when_workbook_is_invalid() {
        let store = Arc::new(MemoryStore::new());
        let chef = seed_user(store.as_ref(), "chef@example.com", UserType::Creator);
        let dir = tempfile::tempdir().unwrap();
        let upload = TempUpload::persist(dir.path(), "sheet.xlsx", b"garbage")
            .await
            .unwrap();
        let path = upload.path().to_path_buf();

        let jobs = ImportJobs::new(store.clone(), 2);
        jobs.dispatch(upload, chef.id).await.unwrap();

        assert_eq!(store.recipe_count(), 0);
        assert!(!path.exists());
    }
}
