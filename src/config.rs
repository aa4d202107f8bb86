//! Invocation parameters and the YAML batch file
//!
//! ```yaml
//! workbook: Telecom_Data.xlsx
//! companies:
//!   - input: "Rogers sectors.csv"
//!     company: Rogers
//!     licensee: Rogers Communications Canada Inc.
//!     province: QC
//!   - input: "TELUS sectors.csv"
//!     company: TELUS
//!     licensee: TELUS
//!     province: QC
//!     sheet: TELUS-QC
//! ```
//!
//! Relative `input` and `workbook` paths are resolved against the batch file's directory.

use crate::error::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Everything needed to turn one company export into one sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyJob {
    pub input: PathBuf,
    pub company: String,
    pub licensee: String,
    pub province: String,
    /// Sheet name; the company name when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

impl CompanyJob {
    pub fn sheet_name(&self) -> &str {
        self.sheet.as_deref().unwrap_or(&self.company)
    }
}

/// Several companies written into one workbook, in listed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub workbook: PathBuf,
    pub companies: Vec<CompanyJob>,
}

impl BatchConfig {
    /// Read, parse, resolve relative paths and validate a batch file.
    pub fn load(path: &Path) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> ReportResult<Self> {
        let config: BatchConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// At least one company, and no two companies writing the same sheet.
    pub fn validate(&self) -> ReportResult<()> {
        if self.companies.is_empty() {
            return Err(ReportError::Validation(
                "Batch file lists no companies".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for job in &self.companies {
            if !seen.insert(job.sheet_name()) {
                return Err(ReportError::Validation(format!(
                    "Sheet '{}' is assigned to more than one company",
                    job.sheet_name()
                )));
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &PathBuf| {
            if p.is_relative() {
                base.join(p)
            } else {
                p.clone()
            }
        };
        self.workbook = resolve(&self.workbook);
        for job in &mut self.companies {
            job.input = resolve(&job.input);
        }
    }
}
