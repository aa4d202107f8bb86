//! Excel importer - reads back the sheets of an existing report workbook
//!
//! Two views of a sheet:
//! - [`ExcelImporter::import`]: header + rows `Table`, values only
//! - [`ExcelImporter::import_cells`]: every populated cell at its own position,
//!   formulas included, so a sheet can be written back unchanged

use crate::error::{ReportError, ReportResult};
use crate::types::{CellValue, Table};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Value of one cell carried over from an existing sheet
#[derive(Debug, Clone, PartialEq)]
pub enum SheetValue {
    Number(f64),
    Text(String),
    Bool(bool),
    /// Excel serial date
    DateTime(f64),
    /// Formula text without the leading `=`, plus the value Excel last computed
    Formula { formula: String, cached: String },
}

/// One populated cell, 0-based absolute row / column
#[derive(Debug, Clone, PartialEq)]
pub struct SheetCell {
    pub row: u32,
    pub col: u16,
    pub value: SheetValue,
}

/// Populated cells of a sheet, sorted by row then column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetCells {
    pub cells: Vec<SheetCell>,
}

impl SheetCells {
    pub fn get(&self, row: u32, col: u16) -> Option<&SheetValue> {
        self.cells
            .iter()
            .find(|c| c.row == row && c.col == col)
            .map(|c| &c.value)
    }

    /// True when row 0 holds exactly `columns`, as text, starting at A1.
    pub fn has_header(&self, columns: &[&str]) -> bool {
        let first_row: Vec<&SheetCell> = self.cells.iter().filter(|c| c.row == 0).collect();
        first_row.len() == columns.len()
            && first_row.iter().zip(columns).enumerate().all(|(i, (cell, name))| {
                cell.col as usize == i && cell.value == SheetValue::Text(name.to_string())
            })
    }
}

/// Reads every worksheet of an .xlsx file
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn open(&self) -> ReportResult<Xlsx<BufReader<File>>> {
        open_workbook(&self.path).map_err(|e| {
            ReportError::Import(format!(
                "Failed to open Excel file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Import all sheets as tables, in workbook order. Values only; styles are not read.
    pub fn import(&self) -> ReportResult<Vec<(String, Table)>> {
        let mut workbook = self.open()?;
        let sheet_names = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(sheet_names.len());

        for sheet_name in sheet_names {
            let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
                ReportError::Import(format!("Failed to read sheet '{}': {}", sheet_name, e))
            })?;
            sheets.push((sheet_name, Self::range_to_table(&range)));
        }

        Ok(sheets)
    }

    /// Import all sheets cell by cell, in workbook order, keeping positions and formulas.
    pub fn import_cells(&self) -> ReportResult<Vec<(String, SheetCells)>> {
        let mut workbook = self.open()?;
        let sheet_names = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(sheet_names.len());

        for sheet_name in sheet_names {
            let values = workbook.worksheet_range(&sheet_name).map_err(|e| {
                ReportError::Import(format!("Failed to read sheet '{}': {}", sheet_name, e))
            })?;
            let formulas = workbook.worksheet_formula(&sheet_name).map_err(|e| {
                ReportError::Import(format!(
                    "Failed to read formulas of sheet '{}': {}",
                    sheet_name, e
                ))
            })?;
            sheets.push((sheet_name, Self::collect_cells(&values, &formulas)));
        }

        Ok(sheets)
    }

    /// First row becomes the column names, the rest become rows. Blank header cells
    /// stay blank.
    fn range_to_table(range: &Range<Data>) -> Table {
        let (height, width) = range.get_size();
        if height == 0 {
            return Table::default();
        }

        let columns = (0..width)
            .map(|col| match range.get((0, col)) {
                Some(Data::Empty) | None => String::new(),
                Some(cell) => cell.to_string(),
            })
            .collect();

        let mut table = Table::new(columns);
        table.rows = (1..height)
            .map(|row| {
                (0..width)
                    .map(|col| range.get((row, col)).map_or(CellValue::Empty, Self::to_cell))
                    .collect()
            })
            .collect();
        table
    }

    fn to_cell(data: &Data) -> CellValue {
        match data {
            Data::Empty => CellValue::Empty,
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    /// Merge the value and formula ranges into absolute cells. Range offsets are
    /// kept, so a table starting at B3 is written back at B3.
    fn collect_cells(values: &Range<Data>, formulas: &Range<String>) -> SheetCells {
        let mut formula_at: HashMap<(u32, u32), &str> = HashMap::new();
        if let Some((row0, col0)) = formulas.start() {
            for (row, col, formula) in formulas.used_cells() {
                formula_at.insert((row0 + row as u32, col0 + col as u32), formula.as_str());
            }
        }

        let mut cells = Vec::new();
        if let Some((row0, col0)) = values.start() {
            for (row, col, data) in values.used_cells() {
                let (row, col) = (row0 + row as u32, col0 + col as u32);
                let value = match formula_at.remove(&(row, col)) {
                    Some(formula) => SheetValue::Formula {
                        formula: formula.to_string(),
                        cached: data.to_string(),
                    },
                    None => match Self::to_sheet_value(data) {
                        Some(value) => value,
                        None => continue,
                    },
                };
                cells.push(SheetCell {
                    row,
                    col: col as u16,
                    value,
                });
            }
        }

        // Formulas whose cached value is empty
        for ((row, col), formula) in formula_at {
            cells.push(SheetCell {
                row,
                col: col as u16,
                value: SheetValue::Formula {
                    formula: formula.to_string(),
                    cached: String::new(),
                },
            });
        }

        cells.sort_by_key(|c| (c.row, c.col));
        SheetCells { cells }
    }

    fn to_sheet_value(data: &Data) -> Option<SheetValue> {
        match data {
            Data::Empty => None,
            Data::Float(f) => Some(SheetValue::Number(*f)),
            Data::Int(i) => Some(SheetValue::Number(*i as f64)),
            Data::String(s) => Some(SheetValue::Text(s.clone())),
            Data::Bool(b) => Some(SheetValue::Bool(*b)),
            Data::DateTime(dt) => Some(SheetValue::DateTime(dt.as_f64())),
            other => Some(SheetValue::Text(other.to_string())),
        }
    }
}
