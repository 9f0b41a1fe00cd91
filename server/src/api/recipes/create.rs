use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use recipebox_core::RecipeFields;

use super::{RecipeRequest, RecipeResponse};
use crate::api::{ApiError, ErrorResponse, JsonBody, ValidationErrorResponse};
use crate::auth::CreatorUser;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/create-receipe/",
    tag = "recipes",
    request_body(content = RecipeRequest, example = json!({
        "title": "Cacio e pepe",
        "description": "Cheese and pepper",
        "instructions": "Boil pasta. Emulsify.",
        "prep_duration": 5,
        "cook_duration": 12,
        "cuisine": "7d0c5a4e-0f0e-4c52-9d51-2f0f3ee0c9a1",
        "ingredients": []
    })),
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid input", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not a creator", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    CreatorUser(user): CreatorUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = RecipeFields::from(req)
        .into_draft()
        .map_err(ApiError::Validation)?;

    let recipe = state.store.create_recipe(user.id, &draft)?;
    tracing::info!(user_id = %user.id, recipe_id = %recipe.id, "Created recipe");

    Ok((StatusCode::CREATED, Json(RecipeResponse::from(recipe))))
}
