use std::fmt::Display;

use serde::Serialize;
use uuid::Uuid;

use super::reader::SheetRow;
use super::row::normalize_row;
use crate::recipe::RecipeDraft;

/// Rows handed to the sink between progress log lines.
pub const CHUNK_SIZE: usize = 100;

/// Destination for imported recipes. Each call must be atomic: either the
/// recipe and all its ingredient links exist afterwards, or nothing does.
pub trait RecipeSink {
    type Error: Display;

    fn create_recipe(&mut self, draft: &RecipeDraft) -> Result<Uuid, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub row: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<RowFailure>,
}

impl ImportSummary {
    fn fail(&mut self, row: u32, reason: String) {
        tracing::warn!(row, %reason, "Skipping spreadsheet row");
        self.failed += 1;
        self.failures.push(RowFailure { row, reason });
    }
}

/// Create one recipe per row. A failing row is logged and recorded, and
/// processing moves on to the next one.
pub fn import_rows<S: RecipeSink>(rows: &[SheetRow], sink: &mut S) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for (chunk_index, chunk) in rows.chunks(CHUNK_SIZE).enumerate() {
        for row in chunk {
            let draft = match normalize_row(&row.cells) {
                Ok(Some(draft)) => draft,
                Ok(None) => {
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    summary.fail(row.number, e.to_string());
                    continue;
                }
            };

            match sink.create_recipe(&draft) {
                Ok(id) => {
                    tracing::debug!(row = row.number, recipe_id = %id, "Imported recipe");
                    summary.created += 1;
                }
                Err(e) => summary.fail(row.number, e.to_string()),
            }
        }

        tracing::info!(
            processed = (chunk_index * CHUNK_SIZE + chunk.len()),
            total = rows.len(),
            created = summary.created,
            failed = summary.failed,
            "Import progress"
        );
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    #[derive(Default)]
    struct RecordingSink {
        created: Vec<RecipeDraft>,
        reject_title: Option<&'static str>,
    }

    impl RecipeSink for RecordingSink {
        type Error = String;

        fn create_recipe(&mut self, draft: &RecipeDraft) -> Result<Uuid, String> {
            if self.reject_title == Some(draft.title.as_str()) {
                return Err("cuisine does not exist".to_string());
            }
            self.created.push(draft.clone());
            Ok(Uuid::new_v4())
        }
    }

    fn recipe_row(number: u32, title: &str, prep: Data) -> SheetRow {
        SheetRow {
            number,
            cells: vec![
                Data::String(title.to_string()),
                Data::Empty,
                Data::String("Cook it".to_string()),
                prep,
                Data::Int(5),
                Data::String(Uuid::new_v4().to_string()),
                Data::Empty,
            ],
        }
    }

    #[test]
    fn test_bad_row_does_not_stop_the_batch() {
        let rows = vec![
            recipe_row(2, "Soup", Data::Int(10)),
            recipe_row(3, "Broken", Data::String("soon".to_string())),
            recipe_row(4, "Stew", Data::Int(20)),
        ];
        let mut sink = RecordingSink::default();

        let summary = import_rows(&rows, &mut sink);

        assert_eq!(summary.created, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].row, 3);
        let titles: Vec<_> = sink.created.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Soup", "Stew"]);
    }

    #[test]
    fn test_sink_errors_are_recorded_per_row() {
        let rows = vec![
            recipe_row(2, "Soup", Data::Int(10)),
            recipe_row(3, "Orphan", Data::Int(10)),
        ];
        let mut sink = RecordingSink {
            reject_title: Some("Orphan"),
            ..Default::default()
        };

        let summary = import_rows(&rows, &mut sink);

        assert_eq!(summary.created, 1);
        assert_eq!(
            summary.failures,
            vec![RowFailure {
                row: 3,
                reason: "cuisine does not exist".to_string()
            }]
        );
    }

    #[test]
    fn test_blank_rows_are_skipped_not_failed() {
        let rows = vec![
            SheetRow {
                number: 2,
                cells: vec![Data::Empty; 7],
            },
            recipe_row(3, "Soup", Data::Int(10)),
        ];
        let summary = import_rows(&rows, &mut RecordingSink::default());
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_processes_more_rows_than_one_chunk() {
        let rows: Vec<_> = (0..(CHUNK_SIZE as u32 * 2 + 3))
            .map(|i| recipe_row(i + 2, "Bulk", Data::Int(1)))
            .collect();
        let mut sink = RecordingSink::default();

        let summary = import_rows(&rows, &mut sink);

        assert_eq!(summary.created, rows.len());
        assert_eq!(sink.created.len(), rows.len());
    }
}
