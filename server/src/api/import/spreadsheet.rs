use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use utoipa::ToSchema;

use crate::api::uploads::Form;
use crate::api::{ApiError, ErrorResponse, MessageResponse};
use crate::auth::CreatorUser;
use crate::jobs::TempUpload;
use crate::state::AppState;

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct SpreadsheetUpload {
    /// Workbook whose first sheet holds one recipe per row
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Queue a spreadsheet for import. Rows are created in the background, so
/// the response says nothing about individual rows.
#[utoipa::path(
    post,
    path = "/upload-excel/",
    tag = "import",
    request_body(content = SpreadsheetUpload, content_type = "multipart/form-data"),
    responses(
        (status = 202, description = "Upload accepted, import running", body = MessageResponse),
        (status = 400, description = "No file uploaded", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not a creator", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_spreadsheet(
    CreatorUser(user): CreatorUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = Form::read(multipart).await?;
    let file = form
        .file("file")
        .ok_or_else(|| ApiError::BadRequest("No file uploaded.".to_string()))?;

    let filename = file.filename.as_deref().unwrap_or("upload.xlsx");
    let upload = TempUpload::persist(&state.config.upload_dir, filename, &file.data)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to store spreadsheet upload");
            ApiError::Internal(e.to_string())
        })?;

    tracing::info!(user_id = %user.id, path = %upload.path().display(), "Queued bulk import");
    state.jobs.dispatch(upload, user.id);

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("File uploaded. Processing started.")),
    ))
}
