//! Error handling for coupon-forge

use thiserror::Error;

/// Main error type for coupon-forge
#[derive(Error, Debug, Clone)]
pub enum CouponForgeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Counter overflow: carry out of digit {digit} exceeds the {digits}-digit code space")]
    Overflow { digit: usize, digits: usize },

    #[error("Retry budget exhausted: {retries} collisions after {accepted} accepted codes")]
    RetryBudgetExhausted { retries: u64, accepted: usize },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("CLI error: {message}")]
    Cli { message: String },
}

impl CouponForgeError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a counter overflow error
    pub fn overflow(digit: usize, digits: usize) -> Self {
        Self::Overflow { digit, digits }
    }

    /// Create a retry budget error
    pub fn retry_budget(retries: u64, accepted: usize) -> Self {
        Self::RetryBudgetExhausted { retries, accepted }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>, path: Option<String>) -> Self {
        Self::Io {
            message: message.into(),
            path,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a CLI error
    pub fn cli(message: impl Into<String>) -> Self {
        Self::Cli {
            message: message.into(),
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message } => {
                format!("❌ Configuration problem: {}\n💡 Check the quantity, digit count and grouping options", message)
            }
            Self::Overflow { digits, .. } => {
                format!("❌ The counter ran past the {}-digit code space\n💡 This is a tuning bug, please report it with the options used", digits)
            }
            Self::RetryBudgetExhausted { retries, accepted } => {
                format!("⏱️  Gave up after {} collisions ({} codes accepted)\n💡 Request fewer codes or use more digits", retries, accepted)
            }
            Self::Parse { message } => {
                format!("❌ Parse error: {}\n💡 Check the file contents", message)
            }
            Self::Validation { message } => {
                format!("❌ Validation error: {}\n💡 Check your input format", message)
            }
            Self::Io { message, path } => {
                let path_info = path.as_ref().map_or(String::new(), |p| format!(" ({})", p));
                format!("❌ File error{}: {}\n💡 Check file permissions and paths", path_info, message)
            }
            Self::Internal { message } => {
                format!("❌ Internal error: {}\n💡 This is a bug, please report it", message)
            }
            Self::Cli { message } => {
                format!("❌ Command error: {}\n💡 Use --help for usage information", message)
            }
        }
    }
}

impl From<serde_json::Error> for CouponForgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<std::io::Error> for CouponForgeError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string(), None)
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CouponForgeError>;

/// Helper macros for common error patterns
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::CouponForgeError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::CouponForgeError::config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr) => {
        $crate::error::CouponForgeError::validation($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::CouponForgeError::validation(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_format() {
        let err = config_error!("quantity {} is too large", 42);
        assert!(matches!(err, CouponForgeError::Config { .. }));
        assert!(err.to_string().contains("quantity 42 is too large"));

        let err = validation_error!("bad symbol");
        assert!(err.to_string().contains("bad symbol"));
    }

    #[test]
    fn test_user_message_includes_path() {
        let err = CouponForgeError::io("denied", Some("codes.csv".to_string()));
        assert!(err.user_message().contains("codes.csv"));
    }
}
