use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Input file is missing required columns: {columns}")]
    MissingColumnsError { columns: String },

    #[error("Cannot forecast an empty series: {reason}")]
    EmptySeriesError { reason: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashError::CsvError(_) | DashError::MissingColumnsError { .. } => {
                ErrorCategory::Input
            }
            DashError::ConfigValidationError { .. }
            | DashError::InvalidConfigValueError { .. }
            | DashError::MissingConfigError { .. } => ErrorCategory::Configuration,
            DashError::ZipError(_)
            | DashError::SerializationError(_)
            | DashError::EmptySeriesError { .. }
            | DashError::ProcessingError { .. } => ErrorCategory::Processing,
            DashError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DashError::EmptySeriesError { .. } => ErrorSeverity::Low,
            DashError::ConfigValidationError { .. }
            | DashError::InvalidConfigValueError { .. }
            | DashError::MissingConfigError { .. } => ErrorSeverity::Medium,
            DashError::CsvError(_)
            | DashError::MissingColumnsError { .. }
            | DashError::ZipError(_)
            | DashError::SerializationError(_)
            | DashError::ProcessingError { .. } => ErrorSeverity::High,
            DashError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DashError::CsvError(e) => format!("The sales file could not be read: {}", e),
            DashError::MissingColumnsError { columns } => format!(
                "The sales file does not look like a supermarket sales export (missing columns: {})",
                columns
            ),
            DashError::EmptySeriesError { reason } => {
                format!("There is no sales history to forecast from ({})", reason)
            }
            DashError::IoError(e) => format!("A file operation failed: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DashError::CsvError(_) => {
                "Check that the input file is a CSV export of the Sales sheet".to_string()
            }
            DashError::MissingColumnsError { .. } => {
                "Export the sheet with its original header row intact".to_string()
            }
            DashError::EmptySeriesError { .. } => {
                "Widen the filter criteria so at least one transaction remains".to_string()
            }
            DashError::ConfigValidationError { field, .. }
            | DashError::InvalidConfigValueError { field, .. }
            | DashError::MissingConfigError { field } => {
                format!("Correct the '{}' setting and run again", field)
            }
            DashError::IoError(_) => {
                "Check that the input exists and the output directory is writable".to_string()
            }
            DashError::ZipError(_) | DashError::SerializationError(_) => {
                "Delete any partial report bundle and run again".to_string()
            }
            DashError::ProcessingError { .. } => {
                "Run with --verbose to see which step failed".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DashError>;
