//! Collapse each tower group into a single row.
//!
//! Per-tower fields come from the group's first row; per-sector fields are joined
//! with [`JOIN_DELIMITER`] in row order; bandwidth is summed per technology.

use crate::core::grouper::{TowerGroup, TowerGroups};
use crate::error::ReportResult;
use crate::loader::{
    BANDWIDTH, LATITUDE, LICENCE_CATEGORY, LONGITUDE, RECORD_ID, STRUCTURE_HEIGHT, TECHNOLOGY,
    TIER4_ID, TX_ANT_AZIMUTH, TX_POWER,
};
use crate::types::{CellValue, SectorRow, Table, Technology};
use tracing::debug;

/// Separator between per-sector values inside one joined cell
pub const JOIN_DELIMITER: &str = "~";

pub const BW_4G: &str = "4G_BW";
pub const BW_5G: &str = "5G_BW";

const STAGE: &str = "aggregate";

/// Which fields are per-tower, which are per-sector, and where bandwidth lives.
#[derive(Debug, Clone)]
pub struct AggregationPlan {
    pub invariant_fields: Vec<String>,
    /// Per-tower fields written as text exactly as read (`00123` stays `00123`)
    pub identifier_fields: Vec<String>,
    pub variable_fields: Vec<String>,
    pub technology_field: String,
    pub bandwidth_field: String,
}

impl Default for AggregationPlan {
    fn default() -> Self {
        Self {
            invariant_fields: [TIER4_ID, RECORD_ID, LATITUDE, LONGITUDE, STRUCTURE_HEIGHT]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            identifier_fields: vec![TIER4_ID.to_string(), RECORD_ID.to_string()],
            variable_fields: [LICENCE_CATEGORY, TX_ANT_AZIMUTH, TECHNOLOGY, BANDWIDTH, TX_POWER]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            technology_field: TECHNOLOGY.to_string(),
            bandwidth_field: BANDWIDTH.to_string(),
        }
    }
}

impl AggregationPlan {
    /// Output columns: per-tower fields, joined per-sector fields, then the two totals.
    pub fn output_columns(&self) -> Vec<String> {
        self.invariant_fields
            .iter()
            .chain(&self.variable_fields)
            .cloned()
            .chain([BW_4G.to_string(), BW_5G.to_string()])
            .collect()
    }
}

/// Bandwidth summed by technology for one tower
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandwidthTotals {
    pub lte: f64,
    pub nr: f64,
}

/// Sum bandwidth per technology. Every row's bandwidth must be numeric, even when
/// its technology counts toward neither total.
pub fn sum_bandwidth(rows: &[SectorRow], plan: &AggregationPlan) -> ReportResult<BandwidthTotals> {
    let mut totals = BandwidthTotals::default();
    for row in rows {
        let technology = Technology::parse(row.require(&plan.technology_field, STAGE)?);
        let bandwidth = row.require_number(&plan.bandwidth_field, STAGE)?;
        match technology {
            Technology::Lte => totals.lte += bandwidth,
            Technology::Nr => totals.nr += bandwidth,
            Technology::Other(_) => {}
        }
    }
    Ok(totals)
}

/// Join one field's values across the group, preserving row order.
pub fn join_field(rows: &[SectorRow], field: &str) -> ReportResult<String> {
    let values = rows
        .iter()
        .map(|row| row.require(field, STAGE))
        .collect::<ReportResult<Vec<_>>>()?;
    Ok(values.join(JOIN_DELIMITER))
}

/// One output row for one group, cells ordered as [`AggregationPlan::output_columns`].
pub fn aggregate_group(group: &TowerGroup, plan: &AggregationPlan) -> ReportResult<Vec<CellValue>> {
    let mut cells = Vec::with_capacity(plan.invariant_fields.len() + plan.variable_fields.len() + 2);

    let first = group.first();
    for field in &plan.invariant_fields {
        let raw = first.require(field, STAGE)?;
        if plan.identifier_fields.contains(field) {
            cells.push(CellValue::Text(raw.to_string()));
        } else {
            cells.push(CellValue::infer(raw));
        }
    }

    for field in &plan.variable_fields {
        cells.push(CellValue::Text(join_field(&group.rows, field)?));
    }

    let totals = sum_bandwidth(&group.rows, plan)?;
    cells.push(CellValue::Number(totals.lte));
    cells.push(CellValue::Number(totals.nr));

    Ok(cells)
}

/// Aggregate every group into a table with one row per tower, in group order.
pub fn aggregate(groups: &TowerGroups, plan: &AggregationPlan) -> ReportResult<Table> {
    let mut table = Table::new(plan.output_columns());
    for group in groups {
        table.push_row(aggregate_group(group, plan)?)?;
    }
    debug!(towers = table.row_count(), "aggregated tower groups");
    Ok(table)
}
