//! Turns one positional spreadsheet row into a validated [`RecipeDraft`].
//!
//! Column layout: title, description, instructions, prep_duration,
//! cook_duration, cuisine_id, comma-separated ingredient ids.

use calamine::Data;
use uuid::Uuid;

use crate::error::RowError;
use crate::recipe::{RecipeDraft, RecipeFields};

pub const ROW_WIDTH: usize = 7;

const EMPTY: &Data = &Data::Empty;

/// Normalize a row. Returns `Ok(None)` for a row with no content at all.
pub fn normalize_row(cells: &[Data]) -> Result<Option<RecipeDraft>, RowError> {
    let Some(last_filled) = cells.iter().rposition(|c| !is_blank(c)) else {
        return Ok(None);
    };
    if last_filled >= ROW_WIDTH {
        return Err(RowError::FieldCount {
            found: last_filled + 1,
        });
    }

    let cell = |index: usize| cells.get(index).unwrap_or(EMPTY);

    let title = text(cell(0), "title")?.ok_or(RowError::Missing { field: "title" })?;
    // Optional, as on the JSON create path.
    let description = text(cell(1), "description")?;
    let instructions = text(cell(2), "instructions")?.ok_or(RowError::Missing {
        field: "instructions",
    })?;
    let prep_duration = integer(cell(3), "prep_duration")?;
    let cook_duration = integer(cell(4), "cook_duration")?;
    let cuisine_id = id(cell(5), "cuisine_id")?;
    let ingredient_ids = id_list(cell(6), "ingredient_ids")?;

    RecipeFields {
        title: Some(title),
        description,
        instructions: Some(instructions),
        prep_duration: Some(prep_duration),
        cook_duration: Some(cook_duration),
        cuisine_id: Some(cuisine_id),
        ingredient_ids: Some(ingredient_ids),
        step_picture_ids: None,
    }
    .into_draft()
    .map(Some)
    .map_err(RowError::Invalid)
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn describe(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty => String::new(),
        other => format!("{:?}", other),
    }
}

/// Trimmed text, `None` when blank.
fn text(cell: &Data, field: &'static str) -> Result<Option<String>, RowError> {
    match cell {
        Data::Empty => Ok(None),
        Data::String(s) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        other => Err(RowError::NotText {
            field,
            value: describe(other),
        }),
    }
}

/// Whole minutes. Numeric cells are truncated toward zero; text cells must
/// hold a base-10 integer.
fn integer(cell: &Data, field: &'static str) -> Result<i64, RowError> {
    let invalid = || RowError::InvalidNumber {
        field,
        value: describe(cell),
    };

    match cell {
        Data::Empty => Err(RowError::Missing { field }),
        Data::Int(i) => Ok(*i),
        Data::Float(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(f.trunc() as i64),
        Data::String(s) if s.trim().is_empty() => Err(RowError::Missing { field }),
        Data::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn id(cell: &Data, field: &'static str) -> Result<Uuid, RowError> {
    match cell {
        Data::Empty => Err(RowError::Missing { field }),
        Data::String(s) if s.trim().is_empty() => Err(RowError::Missing { field }),
        Data::String(s) => Uuid::parse_str(s.trim()).map_err(|_| RowError::InvalidId {
            field,
            value: s.trim().to_string(),
        }),
        other => Err(RowError::InvalidId {
            field,
            value: describe(other),
        }),
    }
}

/// Split on commas, trim each token and skip empty ones.
fn id_list(cell: &Data, field: &'static str) -> Result<Vec<Uuid>, RowError> {
    match cell {
        Data::Empty => Ok(Vec::new()),
        Data::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                Uuid::parse_str(token).map_err(|_| RowError::InvalidId {
                    field,
                    value: token.to_string(),
                })
            })
            .collect(),
        other => Err(RowError::InvalidId {
            field,
            value: describe(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> Data {
        Data::String(value.to_string())
    }

    fn row(prep: Data, ingredients: Data) -> Vec<Data> {
        vec![
            s("  Pad Thai  "),
            s(" Street noodles "),
            s(" Soak, fry, toss. "),
            prep,
            Data::Float(10.0),
            s("6f1c2f1e-4f7e-4a53-9a39-0c0e4cbd2f11"),
            ingredients,
        ]
    }

    #[test]
    fn test_normalizes_a_complete_row() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let draft = normalize_row(&row(Data::Int(20), s(&format!(" {a} , ,{b},"))))
            .unwrap()
            .unwrap();

        assert_eq!(draft.title, "Pad Thai");
        assert_eq!(draft.description, "Street noodles");
        assert_eq!(draft.instructions, "Soak, fry, toss.");
        assert_eq!(draft.prep_duration, 20);
        assert_eq!(draft.cook_duration, 10);
        assert_eq!(draft.ingredient_ids, vec![a, b]);
    }

    #[test]
    fn test_numeric_text_is_coerced() {
        let draft = normalize_row(&row(s(" 45 "), Data::Empty))
            .unwrap()
            .unwrap();
        assert_eq!(draft.prep_duration, 45);
        assert!(draft.ingredient_ids.is_empty());
    }

    #[test]
    fn test_fractional_number_cell_is_truncated() {
        let draft = normalize_row(&row(Data::Float(12.9), Data::Empty))
            .unwrap()
            .unwrap();
        assert_eq!(draft.prep_duration, 12);
    }

    #[test]
    fn test_non_numeric_duration_fails() {
        let err = normalize_row(&row(s("ten"), Data::Empty)).unwrap_err();
        assert_eq!(
            err,
            RowError::InvalidNumber {
                field: "prep_duration",
                value: "ten".to_string()
            }
        );
    }

    #[test]
    fn test_fractional_text_duration_fails() {
        assert!(matches!(
            normalize_row(&row(s("1.5"), Data::Empty)),
            Err(RowError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_negative_duration_fails_validation() {
        assert!(matches!(
            normalize_row(&row(Data::Int(-1), Data::Empty)),
            Err(RowError::Invalid(errors)) if errors.contains("prep_duration")
        ));
    }

    #[test]
    fn test_bad_ingredient_token_fails() {
        assert_eq!(
            normalize_row(&row(Data::Int(1), s("abc"))).unwrap_err(),
            RowError::InvalidId {
                field: "ingredient_ids",
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_missing_title_fails() {
        let mut cells = row(Data::Int(1), Data::Empty);
        cells[0] = Data::Empty;
        assert_eq!(
            normalize_row(&cells).unwrap_err(),
            RowError::Missing { field: "title" }
        );
    }

    #[test]
    fn test_blank_description_imports_as_empty() {
        for blank in [Data::Empty, s("   ")] {
            let mut cells = row(Data::Int(1), Data::Empty);
            cells[1] = blank;
            let draft = normalize_row(&cells).unwrap().unwrap();
            assert_eq!(draft.description, "");
        }
    }

    #[test]
    fn test_numeric_title_fails() {
        let mut cells = row(Data::Int(1), Data::Empty);
        cells[0] = Data::Int(7);
        assert!(matches!(
            normalize_row(&cells),
            Err(RowError::NotText { field: "title", .. })
        ));
    }

    #[test]
    fn test_blank_row_is_skipped() {
        assert_eq!(normalize_row(&[]).unwrap(), None);
        assert_eq!(
            normalize_row(&[Data::Empty, s("  "), Data::Empty]).unwrap(),
            None
        );
    }

    #[test]
    fn test_trailing_blank_cells_are_ignored() {
        let mut cells = row(Data::Int(1), Data::Empty);
        cells.push(Data::Empty);
        cells.push(s(" "));
        assert!(normalize_row(&cells).unwrap().is_some());
    }

    #[test]
    fn test_extra_filled_column_fails() {
        let mut cells = row(Data::Int(1), Data::Empty);
        cells.push(s("surprise"));
        assert_eq!(
            normalize_row(&cells).unwrap_err(),
            RowError::FieldCount { found: 8 }
        );
    }

    #[test]
    fn test_short_row_reports_missing_field() {
        let cells = vec![s("Toast"), s(""), s("Toast the bread")];
        assert_eq!(
            normalize_row(&cells).unwrap_err(),
            RowError::Missing {
                field: "prep_duration"
            }
        );
    }
}
