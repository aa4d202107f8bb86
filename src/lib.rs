//! Sector Report - tower-level Excel reports from cellular sector exports
//!
//! Each company export lists one row per sector. This library groups those rows
//! by tower, merges per-sector fields, sums LTE / 5G bandwidth, classifies sites
//! as micro or macro and writes one styled sheet per company into a shared workbook.
//!
//! # Example
//!
//! ```no_run
//! use sector_report::config::CompanyJob;
//! use sector_report::pipeline::{open_workbook, process_company, ProcessOptions};
//! use std::path::Path;
//!
//! let job = CompanyJob {
//!     input: "Rogers sectors.csv".into(),
//!     company: "Rogers".to_string(),
//!     licensee: "Rogers Communications Canada Inc.".to_string(),
//!     province: "QC".to_string(),
//!     sheet: None,
//! };
//!
//! let mut workbook = open_workbook(Path::new("Telecom_Data.xlsx"))?;
//! let summary = process_company(&job, &mut workbook, &ProcessOptions::default())?;
//! workbook.save()?;
//!
//! println!("{} towers", summary.towers);
//! # Ok::<(), sector_report::error::ReportError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod loader;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use error::{ReportError, ReportResult};
pub use types::{CellValue, SectorRow, SectorTable, SiteType, Table, Technology};
