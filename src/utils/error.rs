use thiserror::Error;

#[derive(Error, Debug)]
pub enum CargoError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream service error ({status}): {message}")]
    UpstreamError { status: u16, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Lookup error: {message}")]
    LookupError { message: String },

    #[error("Booking conflict: {message}")]
    ConflictError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Lookup,
    Conflict,
    Transient,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CargoError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Self::LookupError {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::ConflictError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::LookupError { .. } => ErrorCategory::Lookup,
            Self::ConflictError { .. } => ErrorCategory::Conflict,
            Self::ApiError(_) | Self::UpstreamError { .. } => ErrorCategory::Transient,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Lookup => ErrorSeverity::Low,
            ErrorCategory::Conflict | ErrorCategory::Transient => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 只有暫時性錯誤適合讓使用者手動重送
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    /// 可顯示給客戶的訊息，內部細節只留在日誌
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message } => format!("Please check your input: {}", message),
            Self::LookupError { .. } => "Please select a destination.".to_string(),
            Self::ConflictError { .. } => {
                "That time window is no longer available. Please choose another.".to_string()
            }
            Self::ApiError(_) | Self::UpstreamError { .. } => {
                "Something went wrong while contacting our servers. Please try again.".to_string()
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => format!("Configuration problem: {}", self),
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                "An unexpected error occurred. Please try again later.".to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Correct the highlighted values and submit again",
            ErrorCategory::Lookup => "Choose one of the active destinations",
            ErrorCategory::Conflict => "Re-query availability and pick a different window",
            ErrorCategory::Transient => "Check the network connection and re-submit manually",
            ErrorCategory::Configuration => {
                "Review the configuration file and environment variables"
            }
            ErrorCategory::System => "Check file paths and permissions, then run again",
        }
    }
}

pub type Result<T> = std::result::Result<T, CargoError>;
