mod spreadsheet;

pub use spreadsheet::upload_spreadsheet;

use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/upload-excel/", post(upload_spreadsheet))
}

#[derive(OpenApi)]
#[openapi(
    paths(spreadsheet::upload_spreadsheet),
    components(schemas(spreadsheet::SpreadsheetUpload))
)]
pub struct ApiDoc;
