//! Error types for sanitization operations

use std::fmt;

/// Errors that can occur while sanitizing HTML
#[derive(Debug)]
pub enum SanitizeError {
    /// Input bytes could not be decoded for the resolved charset
    EncodingError(String),
    /// Invalid input data
    InvalidInput(String),
    /// Configuration document could not be read or parsed
    ConfigError(String),
    /// Internal error
    InternalError(String),
}

impl SanitizeError {
    /// Get numeric error code for FFI
    pub fn code(&self) -> u32 {
        match self {
            SanitizeError::EncodingError(_) => 2,
            SanitizeError::InvalidInput(_) => 5,
            SanitizeError::ConfigError(_) => 6,
            SanitizeError::InternalError(_) => 99,
        }
    }
}

impl fmt::Display for SanitizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanitizeError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            SanitizeError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            SanitizeError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            SanitizeError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for SanitizeError {}
