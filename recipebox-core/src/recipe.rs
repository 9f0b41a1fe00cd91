//! Recipe field validation shared by the JSON write path and the spreadsheet importer.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use uuid::Uuid;

pub const TITLE_MAX_LEN: usize = 200;
pub const NAME_MAX_LEN: usize = 100;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Field-level validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error set holding a single message.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// A validated recipe, ready to be persisted with its associations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub prep_duration: i32,
    pub cook_duration: i32,
    pub cuisine_id: Uuid,
    /// Unique, in submission order.
    pub ingredient_ids: Vec<Uuid>,
    /// Unique, in submission order.
    pub step_picture_ids: Vec<Uuid>,
}

/// A validated partial update. `None` leaves the stored value untouched;
/// `Some` list values replace the association set wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub prep_duration: Option<i32>,
    pub cook_duration: Option<i32>,
    pub cuisine_id: Option<Uuid>,
    pub ingredient_ids: Option<Vec<Uuid>>,
    pub step_picture_ids: Option<Vec<Uuid>>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Unvalidated recipe input, as received from a client or a spreadsheet row.
#[derive(Debug, Clone, Default)]
pub struct RecipeFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub prep_duration: Option<i64>,
    pub cook_duration: Option<i64>,
    pub cuisine_id: Option<Uuid>,
    pub ingredient_ids: Option<Vec<Uuid>>,
    pub step_picture_ids: Option<Vec<Uuid>>,
}

impl RecipeFields {
    /// Validate for creation: title, instructions, both durations and the
    /// cuisine are required.
    pub fn into_draft(self) -> Result<RecipeDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = match self.title {
            Some(title) => clean_title(&mut errors, &title),
            None => {
                errors.add("title", REQUIRED);
                String::new()
            }
        };
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or_default();
        let instructions = match self.instructions {
            Some(instructions) => clean_instructions(&mut errors, &instructions),
            None => {
                errors.add("instructions", REQUIRED);
                String::new()
            }
        };
        let prep_duration = match self.prep_duration {
            Some(value) => clean_duration(&mut errors, "prep_duration", value),
            None => {
                errors.add("prep_duration", REQUIRED);
                0
            }
        };
        let cook_duration = match self.cook_duration {
            Some(value) => clean_duration(&mut errors, "cook_duration", value),
            None => {
                errors.add("cook_duration", REQUIRED);
                0
            }
        };
        let cuisine_id = match self.cuisine_id {
            Some(id) => id,
            None => {
                errors.add("cuisine", REQUIRED);
                Uuid::nil()
            }
        };

        errors.into_result()?;

        Ok(RecipeDraft {
            title,
            description,
            instructions,
            prep_duration,
            cook_duration,
            cuisine_id,
            ingredient_ids: unique_ids(self.ingredient_ids.unwrap_or_default()),
            step_picture_ids: unique_ids(self.step_picture_ids.unwrap_or_default()),
        })
    }

    /// Validate for a partial update: only the present fields are checked.
    pub fn into_patch(self) -> Result<RecipePatch, FieldErrors> {
        let mut errors = FieldErrors::new();

        let patch = RecipePatch {
            title: self.title.map(|t| clean_title(&mut errors, &t)),
            description: self.description.map(|d| d.trim().to_string()),
            instructions: self
                .instructions
                .map(|i| clean_instructions(&mut errors, &i)),
            prep_duration: self
                .prep_duration
                .map(|v| clean_duration(&mut errors, "prep_duration", v)),
            cook_duration: self
                .cook_duration
                .map(|v| clean_duration(&mut errors, "cook_duration", v)),
            cuisine_id: self.cuisine_id,
            ingredient_ids: self.ingredient_ids.map(unique_ids),
            step_picture_ids: self.step_picture_ids.map(unique_ids),
        };

        errors.into_result()?;
        Ok(patch)
    }
}

/// Trim and check a short name (cuisine, ingredient).
pub fn clean_name(errors: &mut FieldErrors, field: &str, value: &str) -> String {
    let name = value.trim();
    if name.is_empty() {
        errors.add(field, BLANK);
    } else if name.chars().count() > NAME_MAX_LEN {
        errors.add(
            field,
            format!("Ensure this field has no more than {NAME_MAX_LEN} characters."),
        );
    }
    name.to_string()
}

fn clean_title(errors: &mut FieldErrors, value: &str) -> String {
    let title = value.trim();
    if title.is_empty() {
        errors.add("title", BLANK);
    } else if title.chars().count() > TITLE_MAX_LEN {
        errors.add(
            "title",
            format!("Ensure this field has no more than {TITLE_MAX_LEN} characters."),
        );
    }
    title.to_string()
}

fn clean_instructions(errors: &mut FieldErrors, value: &str) -> String {
    let instructions = value.trim();
    if instructions.is_empty() {
        errors.add("instructions", BLANK);
    }
    instructions.to_string()
}

fn clean_duration(errors: &mut FieldErrors, field: &str, value: i64) -> i32 {
    if value < 0 {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
        return 0;
    }
    match i32::try_from(value) {
        Ok(v) => v,
        Err(_) => {
            errors.add(
                field,
                format!("Ensure this value is less than or equal to {}.", i32::MAX),
            );
            0
        }
    }
}

/// Drop repeated ids, keeping the first occurrence.
pub fn unique_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_fields() -> RecipeFields {
        RecipeFields {
            title: Some("  Shakshuka ".to_string()),
            description: Some(" Eggs in tomato sauce ".to_string()),
            instructions: Some("Simmer, then crack the eggs in.".to_string()),
            prep_duration: Some(10),
            cook_duration: Some(25),
            cuisine_id: Some(Uuid::new_v4()),
            ingredient_ids: Some(vec![]),
            step_picture_ids: None,
        }
    }

    #[test]
    fn test_draft_trims_text_fields() {
        let draft = complete_fields().into_draft().unwrap();
        assert_eq!(draft.title, "Shakshuka");
        assert_eq!(draft.description, "Eggs in tomato sauce");
        assert!(draft.step_picture_ids.is_empty());
    }

    #[test]
    fn test_draft_reports_every_missing_field() {
        let errors = RecipeFields::default().into_draft().unwrap_err();
        for field in [
            "title",
            "instructions",
            "prep_duration",
            "cook_duration",
            "cuisine",
        ] {
            assert_eq!(errors.get(field), Some(&[REQUIRED.to_string()][..]));
        }
        assert!(!errors.contains("description"));
    }

    #[test]
    fn test_draft_rejects_blank_title_and_negative_duration() {
        let mut fields = complete_fields();
        fields.title = Some("   ".to_string());
        fields.cook_duration = Some(-5);
        let errors = fields.into_draft().unwrap_err();
        assert_eq!(errors.get("title"), Some(&[BLANK.to_string()][..]));
        assert!(errors.contains("cook_duration"));
    }

    #[test]
    fn test_draft_rejects_overlong_title() {
        let mut fields = complete_fields();
        fields.title = Some("x".repeat(TITLE_MAX_LEN + 1));
        assert!(fields.into_draft().unwrap_err().contains("title"));
    }

    #[test]
    fn test_draft_collapses_duplicate_ingredients() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut fields = complete_fields();
        fields.ingredient_ids = Some(vec![a, b, a]);
        let draft = fields.into_draft().unwrap();
        assert_eq!(draft.ingredient_ids, vec![a, b]);
    }

    #[test]
    fn test_patch_only_checks_present_fields() {
        let patch = RecipeFields {
            prep_duration: Some(3),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.prep_duration, Some(3));
        assert!(patch.title.is_none());
        assert!(patch.ingredient_ids.is_none());
    }

    #[test]
    fn test_patch_keeps_explicit_empty_ingredient_list() {
        let patch = RecipeFields {
            ingredient_ids: Some(vec![]),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.ingredient_ids, Some(vec![]));
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_rejects_blank_instructions() {
        let errors = RecipeFields {
            instructions: Some(" ".to_string()),
            ..Default::default()
        }
        .into_patch()
        .unwrap_err();
        assert!(errors.contains("instructions"));
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::single("title", "bad");
        errors.add("cuisine", "missing");
        assert_eq!(errors.to_string(), "cuisine: missing; title: bad");
    }
}
