//! Company export loader - CSV → `SectorTable`

use crate::error::{ReportError, ReportResult};
use crate::types::{SectorRow, SectorTable};
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub const TIER4_ID: &str = "Tier-4 id";
pub const RECORD_ID: &str = "record_id";
pub const AREA_NAME: &str = "area_name*";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const STRUCTURE_HEIGHT: &str = "structure_height";
pub const TX_ANT_AZIMUTH: &str = "tx_ant_azimuth";
pub const LICENCE_CATEGORY: &str = "licence_category*";
pub const TECHNOLOGY: &str = "technology";
pub const TX_POWER: &str = "tx_power";
pub const BANDWIDTH: &str = "bandwidth";

/// Columns every company export must carry. Anything else is dropped on load.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    TIER4_ID,
    RECORD_ID,
    AREA_NAME,
    LATITUDE,
    LONGITUDE,
    STRUCTURE_HEIGHT,
    TX_ANT_AZIMUTH,
    LICENCE_CATEGORY,
    TECHNOLOGY,
    TX_POWER,
    BANDWIDTH,
];

/// Load one company export from disk.
pub fn load_sectors(path: &Path) -> ReportResult<SectorTable> {
    let file = std::fs::File::open(path)?;
    let table = load_sectors_from_reader(file)?;
    debug!(
        path = %path.display(),
        rows = table.len(),
        "loaded sector export"
    );
    Ok(table)
}

/// Load sector records from any reader holding comma-separated text with a header row.
pub fn load_sectors_from_reader<R: Read>(reader: R) -> ReportResult<SectorTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    // Column positions of the required fields, in REQUIRED_COLUMNS order
    let positions = REQUIRED_COLUMNS
        .iter()
        .map(|&name| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ReportError::schema(name, "load"))
        })
        .collect::<ReportResult<Vec<_>>>()?;

    let mut table = SectorTable::new(headers);
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |pos| pos.line());

        let mut row = SectorRow::new(line);
        for (&name, &pos) in REQUIRED_COLUMNS.iter().zip(&positions) {
            let value = record.get(pos).ok_or_else(|| ReportError::Csv {
                line,
                message: format!("missing value for column '{}'", name),
            })?;
            row.fields.insert(name.to_string(), value.to_string());
        }
        table.rows.push(row);
    }

    Ok(table)
}
