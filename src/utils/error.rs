use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaintError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Document store returned {status}: {message}")]
    StoreError { status: u16, message: String },

    #[error("Document '{id}' not found in collection '{collection}'")]
    DocumentNotFound { collection: String, id: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("{failed} verification check(s) failed")]
    VerificationFailed { failed: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Data,
    Verification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code used by the binary.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl MaintError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MaintError::ConfigError { .. }
            | MaintError::MissingConfigError { .. }
            | MaintError::InvalidConfigValueError { .. }
            | MaintError::TomlParseError(_) => ErrorCategory::Configuration,
            MaintError::HttpError(_) => ErrorCategory::Network,
            MaintError::IoError(_)
            | MaintError::StoreError { .. }
            | MaintError::DocumentNotFound { .. } => ErrorCategory::Storage,
            MaintError::CsvError(_)
            | MaintError::SerializationError(_)
            | MaintError::ProcessingError { .. } => ErrorCategory::Data,
            MaintError::VerificationFailed { .. } => ErrorCategory::Verification,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MaintError::HttpError(_) => ErrorSeverity::Medium,
            MaintError::StoreError { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            MaintError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the TOML config file and any ${VAR} environment variables it references"
            }
            ErrorCategory::Network => "Check connectivity to the document store and retry",
            ErrorCategory::Storage => {
                "Check that the store path or endpoint exists and the credentials allow writes"
            }
            ErrorCategory::Data => "Inspect the offending documents; run with --verbose for details",
            ErrorCategory::Verification => "Review the rank table in the [[ranks]] config section",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MaintError::MissingConfigError { field } => {
                format!("Configuration is missing '{}'", field)
            }
            MaintError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            MaintError::StoreError { status, .. } => {
                format!("The document store rejected the request (HTTP {})", status)
            }
            MaintError::HttpError(_) => "Could not reach the document store".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MaintError>;
