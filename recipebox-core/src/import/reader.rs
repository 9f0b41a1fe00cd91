use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::ImportError;

/// One data row from the first worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// 1-based row number as shown by spreadsheet applications.
    pub number: u32,
    /// Cells starting at column A.
    pub cells: Vec<Data>,
}

/// Read every row of the first worksheet except the header (row 1).
///
/// The workbook format is picked from the file extension (xlsx, xlsm, xls, ods).
pub fn read_data_rows(path: &Path) -> Result<Vec<SheetRow>, ImportError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoWorksheet)??;

    let Some((first_row, first_col)) = range.start() else {
        return Ok(Vec::new());
    };

    let rows = range
        .rows()
        .enumerate()
        .filter_map(|(offset, row)| {
            let index = first_row + offset as u32;
            if index == 0 {
                return None;
            }
            let mut cells = vec![Data::Empty; first_col as usize];
            cells.extend_from_slice(row);
            Some(SheetRow {
                number: index + 1,
                cells,
            })
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn write_workbook(build: impl FnOnce(&mut rust_xlsxwriter::Worksheet)) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut workbook = Workbook::new();
        build(workbook.add_worksheet());
        workbook.save(dir.path().join("recipes.xlsx")).unwrap();
        dir
    }

    #[test]
    fn test_skips_header_and_numbers_rows() {
        let dir = write_workbook(|sheet| {
            sheet.write_string(0, 0, "title").unwrap();
            sheet.write_string(1, 0, "Soup").unwrap();
            sheet.write_number(1, 3, 15.0).unwrap();
            sheet.write_string(2, 0, "Stew").unwrap();
        });

        let rows = read_data_rows(&dir.path().join("recipes.xlsx")).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number, 2);
        assert_eq!(rows[0].cells[0], Data::String("Soup".to_string()));
        assert_eq!(rows[0].cells[3], Data::Float(15.0));
        assert_eq!(rows[1].number, 3);
    }

    #[test]
    fn test_pads_leading_empty_columns() {
        let dir = write_workbook(|sheet| {
            sheet.write_string(0, 2, "header").unwrap();
            sheet.write_string(1, 2, "Soup").unwrap();
        });

        let rows = read_data_rows(&dir.path().join("recipes.xlsx")).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells[0], Data::Empty);
        assert_eq!(rows[0].cells[2], Data::String("Soup".to_string()));
    }

    #[test]
    fn test_header_only_sheet_has_no_rows() {
        let dir = write_workbook(|sheet| {
            sheet.write_string(0, 0, "title").unwrap();
        });

        assert!(read_data_rows(&dir.path().join("recipes.xlsx"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        assert!(matches!(
            read_data_rows(&path),
            Err(ImportError::Workbook(_))
        ));
    }
}
