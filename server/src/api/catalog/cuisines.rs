use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use recipebox_core::recipe::{clean_name, REQUIRED};
use recipebox_core::FieldErrors;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::CuisineResponse;
use crate::api::{ApiError, ErrorResponse, JsonBody, ValidationErrorResponse};
use crate::auth::CreatorUser;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCuisineRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CuisineCreated {
    pub message: String,
    pub data: CuisineResponse,
}

#[utoipa::path(
    post,
    path = "/create-cuisine/",
    tag = "catalog",
    request_body(content = CreateCuisineRequest, example = json!({"name": "Italian"})),
    responses(
        (status = 201, description = "Cuisine created", body = CuisineCreated),
        (status = 400, description = "Invalid or duplicate name", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not a creator", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_cuisine(
    CreatorUser(user): CreatorUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateCuisineRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::new();
    let name = match req.name {
        Some(name) => clean_name(&mut errors, "name", &name),
        None => {
            errors.add("name", REQUIRED);
            String::new()
        }
    };
    errors.into_result().map_err(ApiError::Validation)?;

    let cuisine = state.store.create_cuisine(&name)?;
    tracing::info!(user_id = %user.id, cuisine_id = %cuisine.id, "Created cuisine");

    Ok((
        StatusCode::CREATED,
        Json(CuisineCreated {
            message: "Cuisine created successfully".to_string(),
            data: cuisine.into(),
        }),
    ))
}
