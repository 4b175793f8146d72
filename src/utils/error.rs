use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("JSON parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid quote file format: {message}")]
    FormatError { message: String },

    #[error("No quotes available to display")]
    EmptyCollectionError,

    #[error("Remote request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Remote returned HTTP {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("Remote request timed out after {millis}ms")]
    TimeoutError { millis: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤分類，用於日誌與退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    User,
    Data,
    Network,
    System,
    Configuration,
}

impl QuoteError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::FormatError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::EmptyCollectionError => ErrorCategory::User,
            Self::ParseError(_) | Self::FormatError { .. } => ErrorCategory::Data,
            Self::NetworkError(_) | Self::HttpStatusError { .. } | Self::TimeoutError { .. } => {
                ErrorCategory::Network
            }
            Self::IoError(_) => ErrorCategory::System,
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    /// 同步失敗只影響當次週期，下一次 tick 會再試
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkError(_) | Self::TimeoutError { .. } => true,
            Self::HttpStatusError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { .. } => {
                "Please enter both the quote text and category.".to_string()
            }
            Self::ParseError(_) => "The file is not valid JSON.".to_string(),
            Self::FormatError { message } => format!("Invalid quotes file: {}", message),
            Self::EmptyCollectionError => "There are no quotes to show yet.".to_string(),
            Self::NetworkError(_) | Self::HttpStatusError { .. } | Self::TimeoutError { .. } => {
                format!("Could not reach the quote server ({})", self)
            }
            Self::IoError(e) => format!("File operation failed: {}", e),
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::User => "Provide a non-empty text and category, or add a quote first",
            ErrorCategory::Data => {
                "Use a JSON array of objects with non-empty \"text\" and \"category\" fields"
            }
            ErrorCategory::Network => "Check the sync endpoint and your connection; sync retries on the next tick",
            ErrorCategory::System => "Check that the data directory exists and is writable",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::User => 1,
            ErrorCategory::Data => 1,
            ErrorCategory::Network => 2,
            ErrorCategory::System => 3,
            ErrorCategory::Configuration => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(QuoteError::validation("x").category(), ErrorCategory::User);
        assert_eq!(QuoteError::format("x").category(), ErrorCategory::Data);
        assert_eq!(
            QuoteError::TimeoutError { millis: 5000 }.category(),
            ErrorCategory::Network
        );
        assert_eq!(QuoteError::EmptyCollectionError.exit_code(), 1);
    }

    #[test]
    fn test_retryable_status() {
        let server_error = QuoteError::HttpStatusError {
            status: 503,
            url: "http://x".to_string(),
        };
        let not_found = QuoteError::HttpStatusError {
            status: 404,
            url: "http://x".to_string(),
        };
        assert!(server_error.is_retryable());
        assert!(!not_found.is_retryable());
        assert!(QuoteError::TimeoutError { millis: 1000 }.is_retryable());
        assert!(!QuoteError::EmptyCollectionError.is_retryable());
    }

    #[test]
    fn test_timeout_reports_milliseconds() {
        let err = QuoteError::TimeoutError { millis: 250 };
        assert_eq!(err.to_string(), "Remote request timed out after 250ms");
    }
}
