//! Report workbook write / read-back tests

use calamine::Reader;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Formula, Workbook};
use sector_report::core::REPORT_COLUMNS;
use sector_report::excel::{ExcelImporter, ReportWorkbook, SheetValue, HEADER_FILL};
use sector_report::pipeline::open_workbook;
use sector_report::{CellValue, ReportError, Table};
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

fn sample_table() -> Table {
    let mut table = Table::new(vec![
        "Tower ID".to_string(),
        "Height (m)".to_string(),
        "Micro".to_string(),
        "Macro".to_string(),
        "Name".to_string(),
        "SERVICES".to_string(),
    ]);
    table
        .push_row(vec![
            CellValue::Text("E5015".into()),
            CellValue::Number(35.0),
            CellValue::Flag(false),
            CellValue::Flag(true),
            CellValue::Text("Montreal".into()),
            CellValue::Text("Cellular|PCS".into()),
        ])
        .unwrap();
    table
        .push_row(vec![
            CellValue::Text("E6120".into()),
            CellValue::Number(8.5),
            CellValue::Flag(true),
            CellValue::Flag(false),
            CellValue::Empty,
            CellValue::Text("AWS".into()),
        ])
        .unwrap();
    table
}

/// Raw XML of one part of a saved .xlsx package
fn xlsx_part(path: &Path, name: &str) -> String {
    let file = fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

/// XML of `<row r="n" ...>...</row>` inside a worksheet part
fn row_xml(sheet_xml: &str, row: u32) -> &str {
    let start = sheet_xml.find(&format!("<row r=\"{}\"", row)).unwrap();
    let end = start + sheet_xml[start..].find("</row>").unwrap();
    &sheet_xml[start..end]
}

/// A hand-made sheet the report tool never wrote: table at B3, a blank header
/// cell, a formula and a boolean.
fn write_dcf_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("DCF").unwrap();
    worksheet.write_string(2, 1, "Site").unwrap();
    worksheet.write_string(2, 3, "Total").unwrap();
    worksheet.write_number(3, 1, 42.0).unwrap();
    worksheet
        .write_formula(3, 3, Formula::new("=B4*2").set_result("84"))
        .unwrap();
    worksheet.write_boolean(3, 4, true).unwrap();
    workbook.save(path).unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT / IMPORT ROUND TRIP
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cells_read_back_as_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    let mut workbook = ReportWorkbook::new(&path);
    workbook.put_sheet("Rogers", sample_table());
    workbook.save().unwrap();

    let sheets = ExcelImporter::new(&path).import().unwrap();
    assert_eq!(sheets.len(), 1);
    let table = &sheets[0].1;

    assert_eq!(table.columns, sample_table().columns);
    assert_eq!(
        table.rows[0],
        vec![
            CellValue::Text("E5015".into()),
            CellValue::Number(35.0),
            CellValue::Text("-".into()),
            CellValue::Number(1.0),
            CellValue::Text("Montreal".into()),
            CellValue::Text("Cellular|PCS".into()),
        ]
    );
    assert_eq!(table.rows[1][1], CellValue::Number(8.5));
    assert_eq!(table.rows[1][2], CellValue::Number(1.0));
    assert_eq!(table.rows[1][4], CellValue::Empty);
}

#[test]
fn test_header_only_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.xlsx");

    let mut workbook = ReportWorkbook::new(&path);
    workbook.put_sheet("Nobody", Table::new(vec!["Code".into(), "Name".into()]));
    workbook.save().unwrap();

    let sheets = ExcelImporter::new(&path).import().unwrap();
    assert_eq!(sheets[0].0, "Nobody");
    assert_eq!(sheets[0].1.columns, vec!["Code", "Name"]);
    assert_eq!(sheets[0].1.row_count(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// EXISTING WORKBOOKS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_reopen_keeps_sheets_and_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    for name in ["Rogers", "Bell", "TELUS"] {
        let mut workbook = ReportWorkbook::open(&path).unwrap();
        workbook.put_sheet(name, sample_table());
        workbook.save().unwrap();
    }

    let reopened = ReportWorkbook::open(&path).unwrap();
    assert_eq!(reopened.sheet_names(), vec!["Rogers", "Bell", "TELUS"]);
    assert_eq!(reopened.path(), path.as_path());

    // Sheets carried over survive another save untouched
    reopened.save().unwrap();
    let sheets = ExcelImporter::new(&path).import().unwrap();
    assert_eq!(sheets.len(), 3);
    assert_eq!(sheets[2].1.rows[0][3], CellValue::Number(1.0));
    assert_eq!(sheets[2].1.rows[0][2], CellValue::Text("-".into()));
}

#[test]
fn test_replaced_sheet_keeps_position() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    let mut workbook = ReportWorkbook::new(&path);
    workbook.put_sheet("Rogers", sample_table());
    workbook.put_sheet("TELUS", sample_table());
    workbook.save().unwrap();

    let mut replacement = Table::new(vec!["Tower ID".to_string()]);
    replacement
        .push_row(vec![CellValue::Text("NEW".into())])
        .unwrap();

    let mut workbook = ReportWorkbook::open(&path).unwrap();
    workbook.put_sheet("Rogers", replacement);
    workbook.save().unwrap();

    let sheets = ExcelImporter::new(&path).import().unwrap();
    let names: Vec<&str> = sheets.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Rogers", "TELUS"]);
    assert_eq!(sheets[0].1.rows, vec![vec![CellValue::Text("NEW".into())]]);
    assert_eq!(sheets[1].1.row_count(), 2);
}

#[test]
fn test_open_non_workbook_is_import_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("not_excel.xlsx");
    fs::write(&path, "this is not a zip archive").unwrap();

    let result = ReportWorkbook::open(&path);
    assert!(matches!(result, Err(ReportError::Import(_))));
}

#[test]
fn test_save_into_missing_directory_is_export_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("report.xlsx");

    let mut workbook = ReportWorkbook::new(&path);
    workbook.put_sheet("Rogers", sample_table());
    assert!(matches!(workbook.save(), Err(ReportError::Export(_))));
}

#[test]
fn test_foreign_sheet_written_back_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("models.xlsx");
    write_dcf_workbook(&path);

    let mut workbook = open_workbook(&path).unwrap();
    workbook.put_sheet("Rogers", sample_table());
    workbook.save().unwrap();

    let sheets = ExcelImporter::new(&path).import_cells().unwrap();
    let names: Vec<&str> = sheets.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["DCF", "Rogers"]);

    let dcf = &sheets[0].1;
    assert_eq!(dcf.get(2, 1), Some(&SheetValue::Text("Site".into())));
    assert_eq!(dcf.get(2, 2), None);
    assert_eq!(dcf.get(2, 3), Some(&SheetValue::Text("Total".into())));
    assert_eq!(dcf.get(3, 1), Some(&SheetValue::Number(42.0)));
    assert_eq!(dcf.get(3, 4), Some(&SheetValue::Bool(true)));
    match dcf.get(3, 3) {
        Some(SheetValue::Formula { formula, .. }) => assert_eq!(formula, "B4*2"),
        other => panic!("expected formula at D4, got {:?}", other),
    }
    assert_eq!(dcf.get(0, 0), None);

    // Range still starts at B3
    let mut reader: calamine::Xlsx<_> = calamine::open_workbook(&path).unwrap();
    let range = reader.worksheet_range("DCF").unwrap();
    assert_eq!(range.start(), Some((2, 1)));

    // Not a report sheet: no header style added
    assert!(!xlsx_part(&path, "xl/worksheets/sheet1.xml").contains(" s=\""));
}

// ═══════════════════════════════════════════════════════════════════════════
// HEADER STYLE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_header_style_in_saved_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    let mut workbook = ReportWorkbook::new(&path);
    workbook.put_sheet("Rogers", sample_table());
    workbook.save().unwrap();

    let styles = xlsx_part(&path, "xl/styles.xml");
    assert!(styles.contains(&format!("rgb=\"FF{:06X}\"", HEADER_FILL)));
    assert!(styles.contains("patternType=\"solid\""));
    assert!(styles.contains("<b/>"));
    assert!(styles.contains("rgb=\"FFFFFFFF\""));

    let sheet = xlsx_part(&path, "xl/worksheets/sheet1.xml");
    let header = row_xml(&sheet, 1);
    for col in ["A", "B", "C", "D", "E", "F"] {
        assert!(header.contains(&format!("<c r=\"{}1\" s=\"", col)), "{}1 unstyled", col);
    }
    assert!(!row_xml(&sheet, 2).contains(" s=\""));
    assert!(!row_xml(&sheet, 3).contains(" s=\""));
}

#[test]
fn test_earlier_report_sheet_keeps_header_style() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    let mut report = Table::new(REPORT_COLUMNS.iter().map(|c| c.to_string()).collect());
    report
        .push_row(REPORT_COLUMNS.iter().map(|_| CellValue::Text("x".into())).collect())
        .unwrap();

    let mut first = open_workbook(&path).unwrap();
    first.put_sheet("Rogers", report.clone());
    first.save().unwrap();

    // Second run only adds TELUS; Rogers is carried over from the file
    let mut second = open_workbook(&path).unwrap();
    second.put_sheet("TELUS", report);
    second.save().unwrap();

    let rogers = xlsx_part(&path, "xl/worksheets/sheet1.xml");
    assert!(row_xml(&rogers, 1).contains("<c r=\"A1\" s=\""));
    assert!(!row_xml(&rogers, 2).contains(" s=\""));
}
