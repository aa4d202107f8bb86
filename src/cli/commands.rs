use crate::config::{BatchConfig, CompanyJob};
use crate::error::ReportResult;
use crate::pipeline::{self, CompanySummary, ProcessOptions};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Bandwidth total rounded to three decimals, no trailing zeros (`20`, `12.5`)
fn format_bandwidth(total: f64) -> String {
    let rounded = (total * 1000.0).round() / 1000.0;
    format!("{}", rounded)
}

fn print_summary(summary: &CompanySummary) {
    println!(
        "   📊 {} → sheet {}",
        summary.company.bright_blue().bold(),
        summary.sheet.cyan()
    );
    println!(
        "      {} sector rows → {} towers ({} micro, {} macro)",
        summary.input_rows,
        summary.towers.to_string().bold(),
        summary.micro,
        summary.macro_sites
    );
    println!(
        "      4G bandwidth: {}   5G bandwidth: {}",
        format_bandwidth(summary.bw_4g_total).green(),
        format_bandwidth(summary.bw_5g_total).green()
    );
}

/// Execute the process command: one company into one workbook sheet
pub fn process(job: CompanyJob, workbook_path: PathBuf, strict: bool) -> ReportResult<()> {
    println!("{}", "📡 Sector Report - Processing company".bold().green());
    println!("   Input:    {}", job.input.display());
    println!("   Workbook: {}\n", workbook_path.display());

    let options = ProcessOptions { strict };
    let mut workbook = pipeline::open_workbook(&workbook_path)?;
    let summary = pipeline::process_company(&job, &mut workbook, &options)?;
    workbook.save()?;

    print_summary(&summary);
    println!();
    println!(
        "{} Added worksheet '{}' for {} to {}",
        "✅".green(),
        summary.sheet,
        summary.company,
        workbook_path.display()
    );

    Ok(())
}

/// Execute the batch command: every company listed in a YAML file
pub fn batch(config_path: PathBuf, strict: bool) -> ReportResult<()> {
    println!("{}", "📡 Sector Report - Batch".bold().green());
    println!("   Config: {}", config_path.display());

    let config = BatchConfig::load(&config_path)?;
    println!("   Workbook: {}", config.workbook.display());
    println!("   Companies: {}\n", config.companies.len());

    let options = ProcessOptions { strict };
    let summaries = pipeline::run_batch(&config, &options)?;

    for summary in &summaries {
        print_summary(summary);
    }
    println!();
    println!(
        "{} {} worksheets written to {}",
        "✅".green(),
        summaries.len(),
        config.workbook.display()
    );

    Ok(())
}

#[derive(Serialize)]
struct InspectOutput<'a> {
    summary: &'a CompanySummary,
    inconsistencies: &'a [crate::core::Inconsistency],
}

/// Execute the inspect command: run the transform and report, without writing
pub fn inspect(input: PathBuf, json: bool) -> ReportResult<()> {
    let job = CompanyJob {
        company: input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "input".to_string()),
        input,
        licensee: String::new(),
        province: String::new(),
        sheet: None,
    };
    let report = pipeline::build_report(&job, &ProcessOptions::default())?;

    if json {
        let output = InspectOutput {
            summary: &report.summary,
            inconsistencies: &report.inconsistencies,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "🔍 Sector Report - Inspect".bold().green());
    println!("   File: {}\n", job.input.display());
    print_summary(&report.summary);
    println!();

    if report.inconsistencies.is_empty() {
        println!("{}", "✅ Per-tower fields agree across all sector rows".green());
    } else {
        println!(
            "{}",
            format!(
                "⚠️  {} sector rows disagree with their tower's first row:",
                report.inconsistencies.len()
            )
            .yellow()
        );
        for inconsistency in &report.inconsistencies {
            println!("   {}", inconsistency);
        }
    }

    Ok(())
}
