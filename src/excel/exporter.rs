//! Report workbook: accumulates one sheet per company and writes them all at once

use crate::error::{ReportError, ReportResult};
use crate::excel::importer::{SheetCells, SheetValue};
use crate::excel::ExcelImporter;
use crate::types::{CellValue, Table};
use rust_xlsxwriter::{Color, Format, FormatPattern, Formula, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Header fill (dark blue)
pub const HEADER_FILL: u32 = 0x002060;

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

#[derive(Debug, Clone)]
enum Sheet {
    /// Written by this run
    Report(Table),
    /// Already in the file; written back cell for cell
    Carried(SheetCells),
}

/// In-memory report workbook bound to a destination path.
///
/// Sheets are kept in insertion order. Nothing touches the disk until [`ReportWorkbook::save`].
#[derive(Debug)]
pub struct ReportWorkbook {
    path: PathBuf,
    sheets: Vec<(String, Sheet)>,
    report_header: Option<Vec<String>>,
}

impl ReportWorkbook {
    /// Start an empty workbook for `path`, ignoring any file already there.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheets: Vec::new(),
            report_header: None,
        }
    }

    /// Open the workbook at `path`, keeping the sheets it already holds.
    ///
    /// Existing sheets keep their cell positions, values and formulas. Their styles are
    /// not read (see [`ReportWorkbook::with_report_header`]).
    pub fn open<P: AsRef<Path>>(path: P) -> ReportResult<Self> {
        let mut workbook = Self::new(path);
        if workbook.path.exists() {
            workbook.sheets = ExcelImporter::new(&workbook.path)
                .import_cells()?
                .into_iter()
                .map(|(name, cells)| (name, Sheet::Carried(cells)))
                .collect();
            debug!(
                path = %workbook.path.display(),
                sheets = workbook.sheets.len(),
                "loaded existing workbook"
            );
        }
        Ok(workbook)
    }

    /// Existing sheets whose first row is exactly `columns` from A1 get the header
    /// style again on save.
    pub fn with_report_header(mut self, columns: &[&str]) -> Self {
        self.report_header = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Report table put under `name` during this session.
    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find_map(|(sheet, content)| match content {
            Sheet::Report(table) if sheet == name => Some(table),
            _ => None,
        })
    }

    /// Replace the sheet called `name` in place, or append it.
    pub fn put_sheet(&mut self, name: &str, table: Table) {
        match self.sheets.iter_mut().find(|(sheet, _)| sheet == name) {
            Some(slot) => slot.1 = Sheet::Report(table),
            None => self.sheets.push((name.to_string(), Sheet::Report(table))),
        }
    }

    /// Write every sheet to the destination path.
    pub fn save(&self) -> ReportResult<()> {
        let mut workbook = Workbook::new();
        let header_format = header_format();
        let date_format = Format::new().set_num_format(DATE_FORMAT);

        for (name, sheet) in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).map_err(|e| {
                ReportError::Export(format!("Failed to set worksheet name '{}': {}", name, e))
            })?;
            match sheet {
                Sheet::Report(table) => write_table(worksheet, table, &header_format)?,
                Sheet::Carried(cells) => {
                    let header = self
                        .report_header
                        .as_ref()
                        .filter(|columns| {
                            let names: Vec<&str> = columns.iter().map(String::as_str).collect();
                            cells.has_header(&names)
                        })
                        .map(|_| &header_format);
                    write_carried(worksheet, cells, header, &date_format)?;
                }
            }
        }

        workbook.save(&self.path).map_err(|e| {
            ReportError::Export(format!(
                "Failed to save Excel file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(path = %self.path.display(), sheets = self.sheets.len(), "saved workbook");
        Ok(())
    }
}

/// Solid dark-blue fill, bold white text.
fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_pattern(FormatPattern::Solid)
}

fn export_error(row: u32, col: u16, e: impl std::fmt::Display) -> ReportError {
    ReportError::Export(format!("Failed to write cell ({}, {}): {}", row, col, e))
}

/// Header in row 0, data from row 1.
fn write_table(worksheet: &mut Worksheet, table: &Table, header: &Format) -> ReportResult<()> {
    for (col_idx, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_idx as u16, name, header)
            .map_err(|e| ReportError::Export(format!("Failed to write header: {}", e)))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, value) in row.iter().enumerate() {
            write_cell(worksheet, excel_row, col_idx as u16, value)?;
        }
    }

    Ok(())
}

/// Flags become `1` or `-` here and nowhere else.
fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> ReportResult<()> {
    let result = match value {
        CellValue::Empty => return Ok(()),
        CellValue::Number(n) => worksheet.write_number(row, col, *n),
        CellValue::Text(s) => worksheet.write_string(row, col, s),
        CellValue::Flag(true) => worksheet.write_number(row, col, 1.0),
        CellValue::Flag(false) => worksheet.write_string(row, col, "-"),
    };
    result.map(|_| ()).map_err(|e| export_error(row, col, e))
}

/// Cells at their original positions; row 0 styled only when `header` is given.
fn write_carried(
    worksheet: &mut Worksheet,
    sheet: &SheetCells,
    header: Option<&Format>,
    date_format: &Format,
) -> ReportResult<()> {
    for cell in &sheet.cells {
        let (row, col) = (cell.row, cell.col);
        let result = match (&cell.value, header.filter(|_| row == 0)) {
            (SheetValue::Text(s), Some(format)) => {
                worksheet.write_string_with_format(row, col, s, format)
            }
            (SheetValue::Number(n), _) => worksheet.write_number(row, col, *n),
            (SheetValue::Text(s), None) => worksheet.write_string(row, col, s),
            (SheetValue::Bool(b), _) => worksheet.write_boolean(row, col, *b),
            (SheetValue::DateTime(serial), _) => {
                worksheet.write_number_with_format(row, col, *serial, date_format)
            }
            (SheetValue::Formula { formula, cached }, _) => worksheet.write_formula(
                row,
                col,
                Formula::new(formula.as_str()).set_result(cached.as_str()),
            ),
        };
        result.map_err(|e| export_error(row, col, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::importer::SheetCell;

    fn table(value: &str) -> Table {
        let mut table = Table::new(vec!["A".to_string()]);
        table.push_row(vec![CellValue::Text(value.into())]).unwrap();
        table
    }

    #[test]
    fn test_put_sheet_appends_in_order() {
        let mut workbook = ReportWorkbook::new("unused.xlsx");
        workbook.put_sheet("Rogers", table("r"));
        workbook.put_sheet("TELUS", table("t"));
        assert_eq!(workbook.sheet_names(), vec!["Rogers", "TELUS"]);
    }

    #[test]
    fn test_put_sheet_replaces_in_place() {
        let mut workbook = ReportWorkbook::new("unused.xlsx");
        workbook.put_sheet("Rogers", table("old"));
        workbook.put_sheet("TELUS", table("t"));
        workbook.put_sheet("Rogers", table("new"));

        assert_eq!(workbook.sheet_names(), vec!["Rogers", "TELUS"]);
        let rogers = workbook.sheet("Rogers").unwrap();
        assert_eq!(rogers.rows[0][0], CellValue::Text("new".into()));
    }

    #[test]
    fn test_put_sheet_replaces_carried_sheet() {
        let mut workbook = ReportWorkbook::new("unused.xlsx");
        workbook.sheets.push((
            "Rogers".to_string(),
            Sheet::Carried(SheetCells {
                cells: vec![SheetCell {
                    row: 0,
                    col: 0,
                    value: SheetValue::Text("old".into()),
                }],
            }),
        ));
        assert!(workbook.sheet("Rogers").is_none());

        workbook.put_sheet("Rogers", table("new"));
        assert_eq!(workbook.sheet_names(), vec!["Rogers"]);
        assert!(workbook.sheet("Rogers").is_some());
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let workbook = ReportWorkbook::open(dir.path().join("new.xlsx")).unwrap();
        assert!(workbook.sheet_names().is_empty());
    }

    #[test]
    fn test_invalid_sheet_name_is_export_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut workbook = ReportWorkbook::new(dir.path().join("bad.xlsx"));
        workbook.put_sheet("bad[name]", table("x"));
        assert!(matches!(workbook.save(), Err(ReportError::Export(_))));
    }
}
