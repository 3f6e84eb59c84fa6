use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Listing endpoint {url} responded with status {status}")]
    HttpStatusError { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid listing payload: {message}")]
    InvalidPayloadError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FeedError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FeedError::ApiError(_) | FeedError::HttpStatusError { .. } => ErrorCategory::Network,
            FeedError::ConfigError { .. }
            | FeedError::MissingConfigError { .. }
            | FeedError::InvalidConfigValueError { .. }
            | FeedError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            FeedError::IoError(_) | FeedError::ZipError(_) => ErrorCategory::Storage,
            FeedError::CsvError(_)
            | FeedError::SerializationError(_)
            | FeedError::InvalidPayloadError { .. }
            | FeedError::ProcessingError { .. }
            | FeedError::ValidationError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 上游暫時性錯誤，可以重試
            FeedError::ApiError(_) | FeedError::HttpStatusError { .. } => ErrorSeverity::Medium,
            FeedError::InvalidPayloadError { .. }
            | FeedError::CsvError(_)
            | FeedError::SerializationError(_)
            | FeedError::ProcessingError { .. }
            | FeedError::ValidationError { .. } => ErrorSeverity::High,
            FeedError::ConfigError { .. }
            | FeedError::MissingConfigError { .. }
            | FeedError::InvalidConfigValueError { .. }
            | FeedError::ConfigValidationError { .. } => ErrorSeverity::High,
            FeedError::IoError(_) | FeedError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    /// 是否值得重新發送請求
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::ApiError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FeedError::HttpStatusError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            FeedError::ApiError(_) => {
                "Check network connectivity and that the listing endpoint is reachable".to_string()
            }
            FeedError::HttpStatusError { status, .. } if *status >= 500 => {
                "The listing service is failing; retry later or raise --retry-attempts".to_string()
            }
            FeedError::HttpStatusError { .. } => {
                "Verify the endpoint path and any required query parameters".to_string()
            }
            FeedError::InvalidPayloadError { .. } => {
                "The endpoint must return a JSON array of listings or an object with a products/events array"
                    .to_string()
            }
            FeedError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            FeedError::InvalidConfigValueError { field, .. }
            | FeedError::ConfigValidationError { field, .. } => {
                format!("Fix the value of '{}' and run again", field)
            }
            FeedError::ConfigError { .. } => "Review the configuration file or CLI flags".to_string(),
            FeedError::IoError(_) | FeedError::ZipError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            FeedError::CsvError(_) | FeedError::SerializationError(_) => {
                "Inspect the listing data for values that cannot be encoded".to_string()
            }
            FeedError::ProcessingError { .. } | FeedError::ValidationError { .. } => {
                "Run with --verbose to see which listing triggered the failure".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not fetch listings: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Could not build the feed: {}", self),
            ErrorCategory::Storage => format!("Could not write the feed: {}", self),
        }
    }

    /// CLI 結束碼，依嚴重程度決定
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_are_retryable_only_for_server_side() {
        let server = FeedError::HttpStatusError {
            status: 503,
            url: "http://localhost/products".to_string(),
        };
        let client = FeedError::HttpStatusError {
            status: 404,
            url: "http://localhost/products".to_string(),
        };

        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert_eq!(server.category(), ErrorCategory::Network);
        assert_eq!(server.exit_code(), 2);
    }

    #[test]
    fn test_config_errors_map_to_high_severity() {
        let err = FeedError::MissingConfigError {
            field: "source.endpoint".to_string(),
        };

        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.recovery_suggestion().contains("source.endpoint"));
        assert!(err.user_friendly_message().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = FeedError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));

        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.exit_code(), 3);
    }
}
