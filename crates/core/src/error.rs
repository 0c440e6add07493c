use thiserror::Error;

pub type DashboardResult<T> = Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Data directory not found; checked: {}", .candidates.join(", "))]
    DirectoryNotFound { candidates: Vec<String> },

    #[error("Data file not found: {file}")]
    FileNotFound { file: String },

    #[error("Parse error in {file} at line {line}: {message}")]
    Parse {
        file: String,
        line: u64,
        message: String,
    },

    #[error("Column '{column}' missing from table '{table}'")]
    ColumnMissing { table: String, column: String },

    #[error("Table shape error: {0}")]
    Shape(String),

    #[error("Table bundle is incomplete; missing: {}", .missing.join(", "))]
    IncompleteBundle { missing: Vec<String> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown page: {0}")]
    UnknownPage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Loader failures abort the session; only a missing column is recoverable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DashboardError::ColumnMissing { .. })
    }
}

impl From<config::ConfigError> for DashboardError {
    fn from(err: config::ConfigError) -> Self {
        DashboardError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_not_found_lists_candidates() {
        let err = DashboardError::DirectoryNotFound {
            candidates: vec!["data".into(), "marketing_dataset".into()],
        };
        assert_eq!(
            err.to_string(),
            "Data directory not found; checked: data, marketing_dataset"
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_column_missing_is_recoverable() {
        let err = DashboardError::ColumnMissing {
            table: "customers".into(),
            column: "age".into(),
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("'age'"));
    }
}
