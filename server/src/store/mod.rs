//! Persistence seam. Handlers and import jobs only talk to [`RecipeStore`];
//! `PgStore` backs production and `MemoryStore` backs tests and local demos.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use chrono::{DateTime, Utc};
use recipebox_core::{RecipeDraft, RecipePatch};
use thiserror::Error;
use uuid::Uuid;

use crate::types::UserType;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Not found")]
    NotFound,

    #[error("{field}: {message}")]
    Duplicate {
        field: &'static str,
        message: String,
    },

    #[error("{field}: {message}")]
    InvalidReference {
        field: &'static str,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn missing_reference(field: &'static str, id: Uuid) -> Self {
        StoreError::InvalidReference {
            field,
            message: format!("Invalid pk \"{}\" - object does not exist.", id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum Profile {
    Creator {
        restaurant_name: Option<String>,
    },
    Viewer {
        address: Option<String>,
        preferences: Option<serde_json::Value>,
    },
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub profile: Profile,
}

impl NewAccount {
    pub fn user_type(&self) -> UserType {
        match self.profile {
            Profile::Creator { .. } => UserType::Creator,
            Profile::Viewer { .. } => UserType::Viewer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cuisine {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A recipe with its associations resolved, in submission order.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub prep_duration: i32,
    pub cook_duration: i32,
    pub has_thumbnail: bool,
    pub cuisine: Option<Cuisine>,
    pub ingredients: Vec<IngredientSummary>,
    pub step_picture_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CuisineStat {
    pub cuisine_id: Uuid,
    pub cuisine_name: String,
    pub recipe_count: i64,
    /// Unrounded mean over every rating of every recipe in the cuisine.
    pub average_rating: Option<f64>,
}

/// One window of an ordered collection plus the size of the whole collection.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Every operation is synchronous and self-contained; multi-row writes are
/// atomic. Write paths take the acting user explicitly.
pub trait RecipeStore: Send + Sync + std::fmt::Debug {
    // Accounts

    /// Fails with `Duplicate { field: "email" }` when the email is taken.
    fn create_account(&self, account: &NewAccount) -> Result<User, StoreError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Idempotent.
    fn blacklist_token(
        &self,
        jti: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
    fn is_token_blacklisted(&self, jti: Uuid) -> Result<bool, StoreError>;

    // Catalog

    /// Fails with `Duplicate { field: "name" }` when the name is taken.
    fn create_cuisine(&self, name: &str) -> Result<Cuisine, StoreError>;
    fn create_ingredient(
        &self,
        name: &str,
        image: &StoredImage,
    ) -> Result<IngredientSummary, StoreError>;
    fn create_step_picture(&self, image: &StoredImage) -> Result<Uuid, StoreError>;
    fn ingredient_image(&self, id: Uuid) -> Result<StoredImage, StoreError>;
    fn step_picture_image(&self, id: Uuid) -> Result<StoredImage, StoreError>;
    /// JPEG bytes. `NotFound` when the recipe is missing or has no thumbnail.
    fn recipe_thumbnail(&self, recipe_id: Uuid) -> Result<Vec<u8>, StoreError>;

    // Recipes

    /// Unknown cuisine, ingredient or step picture ids fail with
    /// `InvalidReference` and nothing is written.
    fn create_recipe(
        &self,
        creator_id: Uuid,
        draft: &RecipeDraft,
    ) -> Result<RecipeDetail, StoreError>;
    /// `NotFound` unless the recipe exists and belongs to `creator_id`.
    fn update_recipe(
        &self,
        creator_id: Uuid,
        recipe_id: Uuid,
        patch: &RecipePatch,
    ) -> Result<RecipeDetail, StoreError>;
    /// `NotFound` unless the recipe exists and belongs to `creator_id`.
    fn delete_recipe(&self, creator_id: Uuid, recipe_id: Uuid) -> Result<(), StoreError>;
    /// `NotFound` unless the recipe exists and belongs to `creator_id`.
    fn set_recipe_thumbnail(
        &self,
        creator_id: Uuid,
        recipe_id: Uuid,
        jpeg: &[u8],
    ) -> Result<(), StoreError>;
    fn get_recipe(&self, recipe_id: Uuid) -> Result<RecipeDetail, StoreError>;
    /// Newest first.
    fn list_recipes(&self, offset: i64, limit: i64) -> Result<Page<RecipeDetail>, StoreError>;

    // Engagement

    /// Idempotent. `NotFound` when the recipe does not exist.
    fn add_favourite(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), StoreError>;
    /// Idempotent; removing an absent favourite succeeds.
    fn remove_favourite(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), StoreError>;
    /// Insert or overwrite the caller's rating. Unknown recipes fail with
    /// `InvalidReference { field: "recipe" }`.
    fn upsert_rating(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        score: i32,
    ) -> Result<Rating, StoreError>;
    /// Mean score over every rating of the recipe, `None` when unrated.
    fn recipe_average_rating(&self, recipe_id: Uuid) -> Result<Option<f64>, StoreError>;

    // Stats

    /// Ordered by cuisine name, then id.
    fn cuisine_stats(&self, offset: i64, limit: i64) -> Result<Page<CuisineStat>, StoreError>;
}
