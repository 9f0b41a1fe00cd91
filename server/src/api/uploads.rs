use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use recipebox_core::FieldErrors;

use super::ApiError;
use crate::images::sniff_image;
use crate::store::StoredImage;

pub const NO_FILE: &str = "No file was submitted.";

pub struct FormField {
    pub filename: Option<String>,
    pub data: Bytes,
}

/// A fully buffered `multipart/form-data` body, keyed by field name.
/// A repeated field keeps its last value.
pub struct Form {
    fields: HashMap<String, FormField>,
}

fn multipart_error(e: MultipartError) -> ApiError {
    tracing::warn!("Multipart read error: {}", e);
    let message = if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        "File too large.".to_string()
    } else {
        format!("Failed to read multipart data: {}", e.body_text())
    };
    ApiError::Upload {
        status: e.status(),
        message,
    }
}

impl Form {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let filename = field.file_name().map(str::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            fields.insert(name, FormField { filename, data });
        }

        Ok(Self { fields })
    }

    pub fn file(&mut self, name: &str) -> Option<FormField> {
        self.fields.remove(name).filter(|f| !f.data.is_empty())
    }

    /// A text field, trimmed. Non-UTF-8 content counts as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .and_then(|f| std::str::from_utf8(&f.data).ok())
            .map(|s| s.trim().to_string())
    }

    /// Take an image field and check its format. Problems are recorded
    /// against the field name and `None` is returned.
    pub fn collect_image(&mut self, errors: &mut FieldErrors, name: &str) -> Option<StoredImage> {
        let Some(field) = self.file(name) else {
            errors.add(name, NO_FILE);
            return None;
        };
        match sniff_image(&field.data) {
            Ok(content_type) => Some(StoredImage {
                content_type: content_type.to_string(),
                data: field.data.to_vec(),
            }),
            Err(e) => {
                errors.add(name, e);
                None
            }
        }
    }

    pub fn image(&mut self, name: &str) -> Result<StoredImage, ApiError> {
        let mut errors = FieldErrors::new();
        self.collect_image(&mut errors, name)
            .ok_or(ApiError::Validation(errors))
    }
}
