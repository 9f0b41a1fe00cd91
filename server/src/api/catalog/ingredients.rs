use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use recipebox_core::recipe::{clean_name, REQUIRED};
use recipebox_core::FieldErrors;
use serde::Serialize;
use utoipa::ToSchema;

use super::IngredientResponse;
use crate::api::uploads::Form;
use crate::api::{ApiError, ErrorResponse, ValidationErrorResponse};
use crate::auth::CreatorUser;
use crate::state::AppState;

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CreateIngredientRequest {
    pub name: String,
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientCreated {
    pub message: String,
    pub data: IngredientResponse,
}

#[utoipa::path(
    post,
    path = "/create-ingredients/",
    tag = "catalog",
    request_body(content_type = "multipart/form-data", content = CreateIngredientRequest),
    responses(
        (status = 201, description = "Ingredient created", body = IngredientCreated),
        (status = 400, description = "Invalid name or image", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not a creator", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_ingredient(
    CreatorUser(user): CreatorUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = Form::read(multipart).await?;

    let mut errors = FieldErrors::new();
    let name = match form.text("name") {
        Some(name) => clean_name(&mut errors, "name", &name),
        None => {
            errors.add("name", REQUIRED);
            String::new()
        }
    };
    let image = form.collect_image(&mut errors, "image");
    let (Some(image), true) = (image, errors.is_empty()) else {
        return Err(ApiError::Validation(errors));
    };

    let ingredient = state.store.create_ingredient(&name, &image)?;
    tracing::info!(user_id = %user.id, ingredient_id = %ingredient.id, "Created ingredient");

    Ok((
        StatusCode::CREATED,
        Json(IngredientCreated {
            message: "Ingredient created successfully".to_string(),
            data: ingredient.into(),
        }),
    ))
}
