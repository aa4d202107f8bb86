//! Excel report output
//!
//! - Export: report tables → styled .xlsx sheets
//! - Import: existing .xlsx sheets → cells, so sheets already in the file survive a rewrite

mod exporter;
mod importer;

pub use exporter::{ReportWorkbook, HEADER_FILL};
pub use importer::{ExcelImporter, SheetCell, SheetCells, SheetValue};
