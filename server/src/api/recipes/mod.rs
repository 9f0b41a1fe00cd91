pub mod create;
pub mod delete;
pub mod detail;
pub mod list;
pub mod pdf;
pub mod thumbnail;
pub mod update;

use axum::routing::{delete as delete_route, get, patch, post, put};
use axum::Router;
use chrono::{DateTime, Utc};
use recipebox_core::RecipeFields;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use super::catalog::{CuisineResponse, IngredientResponse, StepPictureResponse};
use super::{media, ApiError};
use crate::state::AppState;
use crate::store::{RecipeDetail, StoreError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-receipe/", post(create::create_recipe))
        .route("/update-receipe/{id}/", patch(update::update_recipe))
        .route(
            "/update-receipe/{id}/thumbnail/",
            put(thumbnail::upload_thumbnail),
        )
        .route("/delete-receipe/", delete_route(delete::delete_recipe))
        .route("/list-recipes/", get(list::list_recipes))
        .route("/detail-recipe/{id}/", get(detail::get_recipe))
        .route("/recipe-pdf/", get(pdf::download_pdf))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        update::update_recipe,
        thumbnail::upload_thumbnail,
        delete::delete_recipe,
        list::list_recipes,
        detail::get_recipe,
        pdf::download_pdf,
    ),
    components(schemas(RecipeRequest, RecipeResponse, thumbnail::ThumbnailUpload))
)]
pub struct ApiDoc;

pub const NOT_OWNED: &str = "Not found or not authorized";

/// Write-path lookups are scoped to the caller, so a recipe owned by someone
/// else is indistinguishable from a missing one.
fn owned(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound => ApiError::NotFound(NOT_OWNED.to_string()),
        other => other.into(),
    }
}

/// Recipe fields for create (required fields enforced) and partial update
/// (absent fields left unchanged).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    /// Minutes
    pub prep_duration: Option<i64>,
    /// Minutes
    pub cook_duration: Option<i64>,
    /// Cuisine ID
    pub cuisine: Option<Uuid>,
    /// Ingredient IDs; replaces the whole list on update
    pub ingredients: Option<Vec<Uuid>>,
    /// Step picture IDs; replaces the whole list on update
    pub step_pictures: Option<Vec<Uuid>>,
}

impl From<RecipeRequest> for RecipeFields {
    fn from(req: RecipeRequest) -> Self {
        RecipeFields {
            title: req.title,
            description: req.description,
            instructions: req.instructions,
            prep_duration: req.prep_duration,
            cook_duration: req.cook_duration,
            cuisine_id: req.cuisine,
            ingredient_ids: req.ingredients,
            step_picture_ids: req.step_pictures,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    /// ID of the owning creator
    pub creator: Uuid,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub prep_duration: i32,
    pub cook_duration: i32,
    /// Thumbnail URL, if one was uploaded
    pub thumbnail: Option<String>,
    pub cuisine: Option<CuisineResponse>,
    pub ingredients: Vec<IngredientResponse>,
    pub step_pictures: Vec<StepPictureResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RecipeDetail> for RecipeResponse {
    fn from(recipe: RecipeDetail) -> Self {
        Self {
            thumbnail: recipe
                .has_thumbnail
                .then(|| media::thumbnail_url(recipe.id)),
            id: recipe.id,
            creator: recipe.creator_id,
            title: recipe.title,
            description: recipe.description,
            instructions: recipe.instructions,
            prep_duration: recipe.prep_duration,
            cook_duration: recipe.cook_duration,
            cuisine: recipe.cuisine.map(Into::into),
            ingredients: recipe.ingredients.into_iter().map(Into::into).collect(),
            step_pictures: recipe
                .step_picture_ids
                .into_iter()
                .map(Into::into)
                .collect(),
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}
