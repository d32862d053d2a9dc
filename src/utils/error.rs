use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet processing error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Search service returned {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("{message}")]
    InputError { message: String },

    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("File is too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Unknown field type '{field_type}' on field '{field}'")]
    UnknownFieldType { field: String, field_type: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Service,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AdminError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AdminError::ApiError(_) => ErrorCategory::Network,
            AdminError::ServiceError { .. } => ErrorCategory::Service,
            AdminError::CsvError(_)
            | AdminError::SpreadsheetError(_)
            | AdminError::SerializationError(_)
            | AdminError::UnknownFieldType { .. }
            | AdminError::ValidationError { .. } => ErrorCategory::Data,
            AdminError::IoError(_) => ErrorCategory::System,
            AdminError::ConfigError { .. }
            | AdminError::ConfigValidationError { .. }
            | AdminError::InvalidConfigValueError { .. }
            | AdminError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AdminError::InputError { .. }
            | AdminError::UnsupportedFormat { .. }
            | AdminError::FileTooLarge { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Service => match self {
                AdminError::ServiceError { status, .. } if *status >= 500 => {
                    ErrorSeverity::Medium
                }
                _ => ErrorSeverity::High,
            },
            ErrorCategory::Input | ErrorCategory::Data | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AdminError::ApiError(_) => {
                "Check that the search service is reachable and the host/port are correct".to_string()
            }
            AdminError::ServiceError { status: 401, .. } => {
                "Check the API key; the service rejected it".to_string()
            }
            AdminError::ServiceError { status: 404, .. } => {
                "Check the collection or resource name".to_string()
            }
            AdminError::ServiceError { .. } => {
                "Inspect the service response and retry once the issue is fixed".to_string()
            }
            AdminError::CsvError(_) | AdminError::SpreadsheetError(_) => {
                "Make sure the file is a valid spreadsheet with a header row".to_string()
            }
            AdminError::SerializationError(_) => {
                "Make sure the JSON input is well formed".to_string()
            }
            AdminError::IoError(_) => "Check the file path and permissions".to_string(),
            AdminError::ConfigError { .. }
            | AdminError::ConfigValidationError { .. }
            | AdminError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command-line options".to_string()
            }
            AdminError::MissingConfigError { field } => {
                format!("Provide '{}' in the configuration file or on the command line", field)
            }
            AdminError::InputError { .. } => "Select exactly one file to upload".to_string(),
            AdminError::UnsupportedFormat { .. } => {
                "Upload an .xlsx, .xls, .ods, .csv or .json file".to_string()
            }
            AdminError::FileTooLarge { .. } => {
                "Split the file or raise import.max_file_size_mb".to_string()
            }
            AdminError::UnknownFieldType { .. } => {
                "Fix the collection schema or run without --strict-types".to_string()
            }
            AdminError::ValidationError { .. } => {
                "Fix the highlighted fields and resubmit".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AdminError::ApiError(e) if e.is_timeout() => {
                "The search service did not answer in time".to_string()
            }
            AdminError::ApiError(_) => "Could not reach the search service".to_string(),
            AdminError::ServiceError { message, .. } => message.clone(),
            AdminError::InputError { message } => message.clone(),
            AdminError::ValidationError { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
