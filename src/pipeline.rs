//! End-to-end processing of company exports
//!
//! load → group by tower → consistency check → aggregate → transform → sheet

use crate::config::{BatchConfig, CompanyJob};
use crate::core::aggregator::{BW_4G, BW_5G};
use crate::core::transformer::{MACRO, MICRO};
use crate::core::{
    aggregate, check_group_consistency, group_rows, transform, AggregationPlan, Inconsistency,
    ReportContext, REPORT_COLUMNS,
};
use crate::error::ReportResult;
use crate::excel::ReportWorkbook;
use crate::loader::{load_sectors, RECORD_ID};
use crate::types::{CellValue, SectorTable, Table};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Processing switches shared by every company in a run
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// Reject towers whose per-tower fields disagree across rows instead of warning
    pub strict: bool,
}

/// Counts and totals for one processed company
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySummary {
    pub company: String,
    pub sheet: String,
    pub input_rows: usize,
    pub towers: usize,
    pub micro: usize,
    pub macro_sites: usize,
    pub bw_4g_total: f64,
    pub bw_5g_total: f64,
}

/// A transformed company report that has not been written anywhere yet
#[derive(Debug, Clone)]
pub struct CompanyReport {
    pub summary: CompanySummary,
    pub table: Table,
    pub inconsistencies: Vec<Inconsistency>,
}

/// Run the core transform over already-loaded sector rows.
pub fn build_table(
    sectors: &SectorTable,
    context: &ReportContext,
    options: &ProcessOptions,
) -> ReportResult<(Table, Vec<Inconsistency>)> {
    let plan = AggregationPlan::default();

    let groups = group_rows(&sectors.rows, RECORD_ID)?;
    debug!(rows = sectors.len(), towers = groups.len(), "grouped sector rows");

    let inconsistencies = check_group_consistency(&groups, &plan.invariant_fields);
    if options.strict {
        if let Some(first) = inconsistencies.first() {
            return Err(first.clone().into());
        }
    }
    for inconsistency in &inconsistencies {
        warn!("{}", inconsistency);
    }

    let aggregated = aggregate(&groups, &plan)?;
    let table = transform(&aggregated, context)?;
    Ok((table, inconsistencies))
}

/// Load and transform one company export without touching any workbook.
pub fn build_report(job: &CompanyJob, options: &ProcessOptions) -> ReportResult<CompanyReport> {
    let sectors = load_sectors(&job.input)?;
    let context = ReportContext::new(&job.province, &job.licensee);
    let (table, inconsistencies) = build_table(&sectors, &context, options)?;

    let summary = summarize(job, sectors.len(), &table);
    Ok(CompanyReport {
        summary,
        table,
        inconsistencies,
    })
}

/// Open (or start) the destination workbook. Report sheets from earlier runs get
/// their header style back on save; every other existing sheet is written back as is.
pub fn open_workbook(path: &Path) -> ReportResult<ReportWorkbook> {
    Ok(ReportWorkbook::open(path)?.with_report_header(&REPORT_COLUMNS))
}

/// Transform one company export and place it in `workbook` under its sheet name.
pub fn process_company(
    job: &CompanyJob,
    workbook: &mut ReportWorkbook,
    options: &ProcessOptions,
) -> ReportResult<CompanySummary> {
    info!(company = %job.company, input = %job.input.display(), "processing company");

    let report = build_report(job, options)?;
    workbook.put_sheet(job.sheet_name(), report.table);

    info!(
        company = %job.company,
        sheet = job.sheet_name(),
        towers = report.summary.towers,
        "added worksheet"
    );
    Ok(report.summary)
}

/// Process every company of a batch into one workbook, in order.
///
/// On failure the sheets of companies already processed are still saved, then the
/// error is returned and the remaining companies are skipped.
pub fn run_batch(config: &BatchConfig, options: &ProcessOptions) -> ReportResult<Vec<CompanySummary>> {
    let mut workbook = open_workbook(&config.workbook)?;
    let mut summaries = Vec::with_capacity(config.companies.len());

    for job in &config.companies {
        match process_company(job, &mut workbook, options) {
            Ok(summary) => summaries.push(summary),
            Err(err) => {
                if !summaries.is_empty() {
                    workbook.save()?;
                    warn!(
                        saved = summaries.len(),
                        company = %job.company,
                        "saved completed companies before failure"
                    );
                }
                return Err(err);
            }
        }
    }

    workbook.save()?;
    info!(
        path = %workbook.path().display(),
        sheets = workbook.sheet_names().len(),
        "saved workbook"
    );
    Ok(summaries)
}

fn summarize(job: &CompanyJob, input_rows: usize, table: &Table) -> CompanySummary {
    let count_flags = |column: &str| {
        table
            .column(column)
            .map_or(0, |cells| cells.filter(|c| **c == CellValue::Flag(true)).count())
    };
    let total = |column: &str| {
        table
            .column(column)
            .map_or(0.0, |cells| cells.filter_map(CellValue::as_number).sum())
    };

    CompanySummary {
        company: job.company.clone(),
        sheet: job.sheet_name().to_string(),
        input_rows,
        towers: table.row_count(),
        micro: count_flags(MICRO),
        macro_sites: count_flags(MACRO),
        bw_4g_total: total(BW_4G),
        bw_5g_total: total(BW_5G),
    }
}
