use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error at line {line}: {message}")]
    Csv { line: u64, message: String },

    #[error("Schema error in {stage}: missing column '{column}'")]
    Schema { column: String, stage: &'static str },

    #[error("Parse error at {location}: column '{column}' has non-numeric value '{value}'")]
    Parse {
        column: String,
        value: String,
        location: String,
    },

    #[error(
        "Tower '{key}' has inconsistent '{column}': expected '{expected}', found '{found}' (line {line})"
    )]
    InconsistentGroup {
        key: String,
        column: String,
        expected: String,
        found: String,
        line: u64,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ReportError {
    pub fn schema(column: impl Into<String>, stage: &'static str) -> Self {
        ReportError::Schema {
            column: column.into(),
            stage,
        }
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map_or(0, |pos| pos.line());
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => ReportError::Io(io),
            _ => ReportError::Csv { line, message },
        }
    }
}
