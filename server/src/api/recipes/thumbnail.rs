use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use utoipa::ToSchema;

use super::{owned, RecipeResponse, NOT_OWNED};
use crate::api::uploads::Form;
use crate::api::{ApiError, ErrorResponse, ValidationErrorResponse};
use crate::auth::CreatorUser;
use crate::images::thumbnail_jpeg;
use crate::state::AppState;
use uuid::Uuid;

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ThumbnailUpload {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Replace the recipe thumbnail. The image is stored as a JPEG scaled down
/// to fit 400x400.
#[utoipa::path(
    put,
    path = "/update-receipe/{id}/thumbnail/",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body(content_type = "multipart/form-data", content = ThumbnailUpload),
    responses(
        (status = 200, description = "Thumbnail stored", body = RecipeResponse),
        (status = 400, description = "Missing or invalid image", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not a creator", body = ErrorResponse),
        (status = 404, description = "Not found or not authorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_thumbnail(
    CreatorUser(user): CreatorUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let recipe_id = Uuid::parse_str(id.trim())
        .map_err(|_| ApiError::NotFound(NOT_OWNED.to_string()))?;

    let mut form = Form::read(multipart).await?;
    let image = form.image("image")?;

    let jpeg = tokio::task::spawn_blocking(move || thumbnail_jpeg(&image.data))
        .await
        .map_err(|e| ApiError::Internal(format!("Thumbnail task failed: {}", e)))?
        .map_err(|e| ApiError::field("image", e))?;

    state
        .store
        .set_recipe_thumbnail(user.id, recipe_id, &jpeg)
        .map_err(owned)?;
    tracing::info!(user_id = %user.id, %recipe_id, bytes = jpeg.len(), "Stored recipe thumbnail");

    let recipe = state.store.get_recipe(recipe_id)?;
    Ok(Json(RecipeResponse::from(recipe)))
}
