use std::sync::LazyLock;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use recipebox_core::recipe::{BLANK, REQUIRED};
use recipebox_core::FieldErrors;
use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;

use super::{issue_tokens, AuthResponse};
use crate::api::{ApiError, JsonBody, ValidationErrorResponse};
use crate::auth::hash_password;
use crate::state::AppState;
use crate::store::{NewAccount, Profile};
use crate::types::UserType;

pub const PHONE_MAX_LEN: usize = 15;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    /// `creator` or `viewer`
    pub user_type: Option<String>,
    pub phone_number: Option<String>,
    /// Creators only
    pub restaurant_name: Option<String>,
    /// Viewers only
    pub address: Option<String>,
    /// Viewers only; any JSON value
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<serde_json::Value>,
}

struct ValidRegistration {
    email: String,
    password: String,
    phone_number: Option<String>,
    profile: Profile,
}

fn validate(req: RegisterRequest) -> Result<ValidRegistration, FieldErrors> {
    let mut errors = FieldErrors::new();

    let email = match req.email.as_deref().map(str::trim) {
        None => {
            errors.add("email", REQUIRED);
            String::new()
        }
        Some("") => {
            errors.add("email", BLANK);
            String::new()
        }
        Some(email) if !EMAIL_PATTERN.is_match(email) => {
            errors.add("email", "Enter a valid email address.");
            String::new()
        }
        Some(email) => email.to_lowercase(),
    };

    let password = match req.password {
        None => {
            errors.add("password", REQUIRED);
            String::new()
        }
        Some(password) if password.is_empty() => {
            errors.add("password", BLANK);
            String::new()
        }
        Some(password) => password,
    };

    let user_type = match req.user_type.as_deref().map(str::trim) {
        None | Some("") => {
            errors.add("user_type", REQUIRED);
            None
        }
        Some(value) => match value.parse::<UserType>() {
            Ok(user_type) => Some(user_type),
            Err(e) => {
                errors.add("user_type", e);
                None
            }
        },
    };

    let phone_number = req
        .phone_number
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
    if phone_number
        .as_ref()
        .is_some_and(|p| p.chars().count() > PHONE_MAX_LEN)
    {
        errors.add(
            "phone_number",
            format!("Ensure this field has no more than {PHONE_MAX_LEN} characters."),
        );
    }

    errors.into_result()?;

    let profile = match user_type {
        Some(UserType::Creator) => Profile::Creator {
            restaurant_name: req.restaurant_name.filter(|n| !n.trim().is_empty()),
        },
        _ => Profile::Viewer {
            address: req.address.filter(|a| !a.trim().is_empty()),
            preferences: req.preferences,
        },
    };

    Ok(ValidRegistration {
        email,
        password,
        phone_number,
        profile,
    })
}

#[utoipa::path(
    post,
    path = "/users/register-user/",
    tag = "users",
    request_body(content = RegisterRequest, example = json!({
        "email": "chef@example.com",
        "password": "s3cret",
        "user_type": "creator",
        "restaurant_name": "Trattoria"
    })),
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ValidationErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let registration = validate(req).map_err(ApiError::Validation)?;

    let password_hash = hash_password(&registration.password)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;

    let user = state.store.create_account(&NewAccount {
        email: registration.email,
        password_hash,
        phone_number: registration.phone_number,
        profile: registration.profile,
    })?;

    tracing::info!(user_id = %user.id, user_type = %user.user_type, "Registered user");

    let tokens = issue_tokens(&state, &user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(user, tokens))))
}
