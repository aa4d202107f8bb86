//! Reshape aggregated towers into the report layout: display names, site
//! classification, display delimiters, caller-supplied constants, fixed column order.
//!
//! Only SERVICES switches to the `|` display delimiter. TECHNOLOGY keeps the `~`
//! join and only has `LTE` rewritten to `4G`, so `LTE~LTE~5G` becomes `4G~4G~5G`,
//! not `4G|4G|5G`.

use crate::core::aggregator::{BW_4G, BW_5G, JOIN_DELIMITER};
use crate::error::{ReportError, ReportResult};
use crate::loader::{
    BANDWIDTH, LATITUDE, LICENCE_CATEGORY, LONGITUDE, RECORD_ID, STRUCTURE_HEIGHT, TECHNOLOGY,
    TIER4_ID, TX_ANT_AZIMUTH, TX_POWER,
};
use crate::types::{CellValue, SiteType, Table};

pub const CODE: &str = "Code";
pub const NAME: &str = "Name";
pub const PROVINCE: &str = "Province";
pub const TOWER_ID: &str = "Tower ID";
pub const LICENSEE: &str = "Licensee";
pub const HEIGHT: &str = "Height (m)";
pub const TYPE: &str = "Type";
pub const MICRO: &str = "Micro";
pub const MACRO: &str = "Macro";
pub const SERVICES: &str = "SERVICES";
pub const TECHNOLOGY_COL: &str = "TECHNOLOGY";

/// Separator shown between services in the report
pub const DISPLAY_DELIMITER: &str = "|";

/// Placeholder written to the Name column
pub const NAME_PLACEHOLDER: &str = " ";

/// Internal field → report column
pub const COLUMN_RENAMES: [(&str, &str); 10] = [
    (TIER4_ID, CODE),
    (RECORD_ID, TOWER_ID),
    (LATITUDE, "LATITUDE"),
    (LONGITUDE, "LONGITUDE"),
    (STRUCTURE_HEIGHT, HEIGHT),
    (TX_ANT_AZIMUTH, "TX_ANT_AZI"),
    (LICENCE_CATEGORY, SERVICES),
    (TECHNOLOGY, TECHNOLOGY_COL),
    (TX_POWER, "TX_PWR"),
    (BANDWIDTH, "TR_BW_BLOCS"),
];

/// Column order of every report sheet
pub const REPORT_COLUMNS: [&str; 18] = [
    CODE,
    NAME,
    PROVINCE,
    TOWER_ID,
    LICENSEE,
    "LATITUDE",
    "LONGITUDE",
    HEIGHT,
    TYPE,
    MICRO,
    MACRO,
    "TX_ANT_AZI",
    SERVICES,
    TECHNOLOGY_COL,
    "TR_BW_BLOCS",
    BW_4G,
    BW_5G,
    "TX_PWR",
];

const STAGE: &str = "transform";

/// Per-invocation constants stamped on every row
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    pub province: String,
    pub licensee: String,
}

impl ReportContext {
    pub fn new(province: impl Into<String>, licensee: impl Into<String>) -> Self {
        Self {
            province: province.into(),
            licensee: licensee.into(),
        }
    }
}

/// Produce the report table from the aggregator's output.
pub fn transform(aggregated: &Table, context: &ReportContext) -> ReportResult<Table> {
    let mut table = aggregated.clone();
    table.rename_columns(&COLUMN_RENAMES, STAGE)?;

    table.set_constant(NAME, CellValue::Text(NAME_PLACEHOLDER.to_string()))?;
    table.set_constant(PROVINCE, CellValue::Text(context.province.clone()))?;
    table.set_constant(LICENSEE, CellValue::Text(context.licensee.clone()))?;

    let site_types = classify_sites(&table)?;
    table.push_column(
        TYPE,
        site_types
            .iter()
            .map(|t| CellValue::Text(t.label().to_string()))
            .collect(),
    )?;
    table.push_column(
        MICRO,
        site_types
            .iter()
            .map(|t| CellValue::Flag(*t == SiteType::Micro))
            .collect(),
    )?;
    table.push_column(
        MACRO,
        site_types
            .iter()
            .map(|t| CellValue::Flag(*t == SiteType::Macro))
            .collect(),
    )?;

    replace_in_column(&mut table, SERVICES, JOIN_DELIMITER, DISPLAY_DELIMITER)?;
    replace_in_column(&mut table, TECHNOLOGY_COL, "LTE", "4G")?;

    table.select_columns(&REPORT_COLUMNS, STAGE)
}

/// Site type of every row from its height column.
pub fn classify_sites(table: &Table) -> ReportResult<Vec<SiteType>> {
    let height_idx = table.require_column(HEIGHT, STAGE)?;
    let tower_idx = table.column_index(TOWER_ID);

    table
        .rows
        .iter()
        .map(|row| {
            let height = &row[height_idx];
            height.as_number().map(SiteType::classify).ok_or_else(|| {
                let tower = tower_idx.map_or_else(String::new, |i| row[i].to_string());
                ReportError::Parse {
                    column: HEIGHT.to_string(),
                    value: height.to_string(),
                    location: format!("tower '{}'", tower),
                }
            })
        })
        .collect()
}

/// Literal substring replacement over a text column.
fn replace_in_column(table: &mut Table, column: &str, from: &str, to: &str) -> ReportResult<()> {
    let idx = table.require_column(column, STAGE)?;
    for row in &mut table.rows {
        if let CellValue::Text(text) = &row[idx] {
            row[idx] = CellValue::Text(text.replace(from, to));
        }
    }
    Ok(())
}
