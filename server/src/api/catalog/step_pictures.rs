use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::StepPictureResponse;
use crate::api::uploads::Form;
use crate::api::{ApiError, ErrorResponse, ValidationErrorResponse};
use crate::auth::CreatorUser;
use crate::state::AppState;

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CreateStepPictureRequest {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StepPictureCreated {
    pub message: String,
    pub data: StepPictureResponse,
}

#[utoipa::path(
    post,
    path = "/create-step-picture/",
    tag = "catalog",
    request_body(content_type = "multipart/form-data", content = CreateStepPictureRequest),
    responses(
        (status = 201, description = "Step picture stored", body = StepPictureCreated),
        (status = 400, description = "Missing or invalid image", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not a creator", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_step_picture(
    CreatorUser(user): CreatorUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = Form::read(multipart).await?;
    let image = form.image("image")?;

    let id = state.store.create_step_picture(&image)?;
    tracing::info!(user_id = %user.id, step_picture_id = %id, "Stored step picture");

    Ok((
        StatusCode::CREATED,
        Json(StepPictureCreated {
            message: "Step picture uploaded successfully".to_string(),
            data: id.into(),
        }),
    ))
}
