use crate::error::{ReportError, ReportResult};
use std::collections::HashMap;
use std::fmt;

//==============================================================================
// Input: sector records
//==============================================================================

/// One sector record read from a company export.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorRow {
    /// 1-based line in the source file (header is line 1)
    pub line: u64,
    pub fields: HashMap<String, String>,
}

impl SectorRow {
    pub fn new(line: u64) -> Self {
        Self {
            line,
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Field value, or a schema error naming the column and the stage that needed it.
    pub fn require(&self, name: &str, stage: &'static str) -> ReportResult<&str> {
        self.get(name)
            .ok_or_else(|| ReportError::schema(name, stage))
    }

    /// Parse a field as f64, failing with a parse error carrying the source line.
    pub fn require_number(&self, name: &str, stage: &'static str) -> ReportResult<f64> {
        let raw = self.require(name, stage)?;
        parse_number(raw).ok_or_else(|| ReportError::Parse {
            column: name.to_string(),
            value: raw.to_string(),
            location: format!("line {}", self.line),
        })
    }
}

/// Rows of one company export, in file order.
#[derive(Debug, Clone, Default)]
pub struct SectorTable {
    pub headers: Vec<String>,
    pub rows: Vec<SectorRow>,
}

impl SectorTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

//==============================================================================
// Output: typed report table
//==============================================================================

/// A single cell of a report table
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    /// Classification marker; rendered as `1` / `-` only when written to a sheet
    Flag(bool),
}

impl CellValue {
    /// Numeric text becomes `Number`, blank text becomes `Empty`, anything else stays text.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else if let Some(n) = parse_number(trimmed) {
            CellValue::Number(n)
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Flag(true) => f.write_str("1"),
            CellValue::Flag(false) => f.write_str("-"),
        }
    }
}

/// Column-named table of cells. Column order is significant: it is the sheet order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str, stage: &'static str) -> ReportResult<usize> {
        self.column_index(name)
            .ok_or_else(|| ReportError::schema(name, stage))
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) -> ReportResult<()> {
        if row.len() != self.columns.len() {
            return Err(ReportError::Validation(format!(
                "Row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a column; `values` must have one entry per row.
    pub fn push_column(&mut self, name: &str, values: Vec<CellValue>) -> ReportResult<()> {
        if values.len() != self.rows.len() {
            return Err(ReportError::Validation(format!(
                "Column '{}' has {} values, expected {}",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Set or append a column holding the same value in every row.
    pub fn set_constant(&mut self, name: &str, value: CellValue) -> ReportResult<()> {
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.clone();
                }
                Ok(())
            }
            None => {
                let values = vec![value; self.rows.len()];
                self.push_column(name, values)
            }
        }
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Rename every `(from, to)` pair. Every `from` must exist.
    pub fn rename_columns(&mut self, mapping: &[(&str, &str)], stage: &'static str) -> ReportResult<()> {
        let indices = mapping
            .iter()
            .map(|(from, _)| self.require_column(from, stage))
            .collect::<ReportResult<Vec<_>>>()?;
        for (idx, (_, to)) in indices.into_iter().zip(mapping) {
            self.columns[idx] = to.to_string();
        }
        Ok(())
    }

    /// New table with exactly `order` as its columns.
    pub fn select_columns(&self, order: &[&str], stage: &'static str) -> ReportResult<Table> {
        let indices = order
            .iter()
            .map(|name| self.require_column(name, stage))
            .collect::<ReportResult<Vec<_>>>()?;

        let mut selected = Table::new(order.iter().map(|c| c.to_string()).collect());
        selected.rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(selected)
    }
}

//==============================================================================
// Domain classifications
//==============================================================================

/// Radio technology of a sector record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Technology {
    Lte,
    Nr,
    Other(String),
}

impl Technology {
    /// Exact, case-sensitive match on the export's labels.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "LTE" => Technology::Lte,
            "5G" => Technology::Nr,
            other => Technology::Other(other.to_string()),
        }
    }
}

/// Structures strictly below this height are micro sites.
pub const MICRO_HEIGHT_LIMIT_M: f64 = 10.0;

/// Site size classification derived from structure height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteType {
    Micro,
    Macro,
}

impl SiteType {
    pub fn classify(height_m: f64) -> Self {
        if height_m < MICRO_HEIGHT_LIMIT_M {
            SiteType::Micro
        } else {
            SiteType::Macro
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SiteType::Micro => "Micro",
            SiteType::Macro => "Macro",
        }
    }
}
