//! Error handling tests

use sector_report::config::BatchConfig;
use sector_report::loader::load_sectors_from_reader;
use sector_report::ReportError;

#[test]
fn test_inconsistent_group_display() {
    let err = ReportError::InconsistentGroup {
        key: "E5015".to_string(),
        column: "latitude".to_string(),
        expected: "45.5".to_string(),
        found: "45.6".to_string(),
        line: 9,
    };
    assert_eq!(
        err.to_string(),
        "Tower 'E5015' has inconsistent 'latitude': expected '45.5', found '45.6' (line 9)"
    );
}

#[test]
fn test_schema_error_display() {
    let err = ReportError::schema("Tower ID", "transform");
    assert_eq!(
        err.to_string(),
        "Schema error in transform: missing column 'Tower ID'"
    );
}

#[test]
fn test_string_variants_display() {
    assert_eq!(
        ReportError::Export("disk full".into()).to_string(),
        "Export error: disk full"
    );
    assert_eq!(
        ReportError::Import("bad zip".into()).to_string(),
        "Import error: bad zip"
    );
    assert_eq!(
        ReportError::Validation("no companies".into()).to_string(),
        "Validation error: no companies"
    );
}

#[test]
fn test_ragged_csv_reports_line() {
    let csv = "Tier-4 id,record_id,area_name*,latitude,longitude,structure_height,tx_ant_azimuth,licence_category*,technology,tx_power,bandwidth
T4,E1,A,45,-73,20,0,PCS,LTE,40,10
T4,E1,A,45,-73
";
    let err = load_sectors_from_reader(csv.as_bytes()).unwrap_err();
    match err {
        ReportError::Csv { line, .. } => assert_eq!(line, 3),
        other => panic!("expected CSV error, got {:?}", other),
    }
}

#[test]
fn test_bad_yaml_is_yaml_error() {
    let err = BatchConfig::from_yaml("workbook: [unterminated").unwrap_err();
    assert!(matches!(err, ReportError::Yaml(_)));
    assert!(err.to_string().starts_with("YAML parsing error"));
}

#[test]
fn test_empty_batch_is_validation_error() {
    let err = BatchConfig::from_yaml("workbook: out.xlsx\ncompanies: []\n").unwrap_err();
    assert!(matches!(err, ReportError::Validation(_)));
}

#[test]
fn test_errors_convert_into_anyhow() {
    fn run() -> anyhow::Result<()> {
        Err(ReportError::Validation("boom".into()))?;
        Ok(())
    }
    let err = run().unwrap_err();
    assert!(err.downcast_ref::<ReportError>().is_some());
}
