use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use recipebox_core::{render_recipe_card, RecipeCard};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::media::parse_id;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::state::AppState;
use crate::store::RecipeDetail;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PdfParams {
    /// Recipe ID
    #[param(value_type = Option<Uuid>)]
    pub recipe_id: Option<String>,
}

fn card(recipe: RecipeDetail, average_rating: Option<f64>) -> RecipeCard {
    RecipeCard {
        title: recipe.title,
        cuisine: recipe.cuisine.map(|c| c.name),
        description: recipe.description,
        prep_duration: recipe.prep_duration,
        cook_duration: recipe.cook_duration,
        ingredients: recipe.ingredients.into_iter().map(|i| i.name).collect(),
        instructions: recipe.instructions,
        average_rating,
    }
}

/// Header-safe attachment name: printable ASCII only, no quotes.
fn attachment_filename(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim();
    if stem.is_empty() {
        "recipe.pdf".to_string()
    } else {
        format!("{}.pdf", stem)
    }
}

#[utoipa::path(
    get,
    path = "/recipe-pdf/",
    tag = "recipes",
    params(PdfParams),
    responses(
        (status = 200, description = "Recipe card as a PDF attachment", content_type = "application/pdf"),
        (status = 400, description = "Missing recipe_id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "PDF generation failed", content_type = "text/plain")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_pdf(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PdfParams>,
) -> Result<Response, ApiError> {
    let raw = params
        .recipe_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest("Missing recipe_id query parameter.".to_string())
        })?;
    let recipe_id: Uuid = parse_id(raw)?;

    let recipe = state.store.get_recipe(recipe_id)?;
    let average_rating = state.store.recipe_average_rating(recipe_id)?;
    let filename = attachment_filename(&recipe.title);

    let rendered = tokio::task::spawn_blocking(move || render_recipe_card(&card(recipe, average_rating)))
        .await
        .map_err(|e| e.to_string())
        .and_then(|result| result.map_err(|e| e.to_string()));

    match rendered {
        Ok(bytes) => Ok((
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            bytes,
        )
            .into_response()),
        Err(e) => {
            tracing::error!(%recipe_id, error = %e, "PDF generation failed");
            Ok((StatusCode::INTERNAL_SERVER_ERROR, "PDF generation failed").into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_filename_is_header_safe() {
        assert_eq!(attachment_filename("Pad Thai"), "Pad Thai.pdf");
        assert_eq!(attachment_filename("Crème \"brûlée\""), "Cr_me _br_l_e_.pdf");
        assert_eq!(attachment_filename("  "), "recipe.pdf");
    }
}
