use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use recipebox_core::RecipeFields;

use super::{owned, RecipeRequest, RecipeResponse, NOT_OWNED};
use crate::api::{ApiError, ErrorResponse, JsonBody, ValidationErrorResponse};
use crate::auth::CreatorUser;
use crate::state::AppState;
use uuid::Uuid;

/// Partial update. Only the fields present in the body change; a present
/// `ingredients` or `step_pictures` list replaces the stored one.
#[utoipa::path(
    patch,
    path = "/update-receipe/{id}/",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body(content = RecipeRequest, example = json!({"cook_duration": 15, "ingredients": []})),
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid input", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not a creator", body = ErrorResponse),
        (status = 404, description = "Not found or not authorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    CreatorUser(user): CreatorUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<RecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe_id = Uuid::parse_str(id.trim())
        .map_err(|_| ApiError::NotFound(NOT_OWNED.to_string()))?;

    let patch = RecipeFields::from(req)
        .into_patch()
        .map_err(ApiError::Validation)?;

    // Nothing to write, so updated_at stays put. Ownership still applies.
    if patch.is_empty() {
        let recipe = state.store.get_recipe(recipe_id).map_err(owned)?;
        if recipe.creator_id != user.id {
            return Err(ApiError::NotFound(NOT_OWNED.to_string()));
        }
        return Ok(Json(RecipeResponse::from(recipe)));
    }

    let recipe = state
        .store
        .update_recipe(user.id, recipe_id, &patch)
        .map_err(owned)?;
    tracing::info!(user_id = %user.id, %recipe_id, "Updated recipe");

    Ok(Json(RecipeResponse::from(recipe)))
}
