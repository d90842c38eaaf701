//! Error handling for keyreel
//!
//! This module defines the crate error type and a Result alias for use
//! throughout the library. Binding rejections and out-of-range keyframe
//! updates are not errors: those calls report `false` and log instead.

use thiserror::Error;

/// Main error type for keyreel operations
#[derive(Error, Debug)]
pub enum ReelError {
    /// IO errors (missing file, short read or write)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The sequence file does not start with the `MBDF` signature
    #[error("Bad sequence signature: expected \"MBDF\", found {found:02X?}")]
    BadSignature { found: Vec<u8> },

    /// The record area is not a whole number of keyframe records
    #[error("Truncated sequence file: {trailing} trailing bytes after the last full record")]
    Truncated { trailing: usize },

    /// Errors related to bound memory access
    #[error("Memory access error at address 0x{address:08X}: {message}")]
    MemoryAccess { address: u64, message: String },

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ReelError>,
    },
}

impl ReelError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ReelError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True if this error (or the error it wraps) is a file format problem
    pub fn is_format_error(&self) -> bool {
        match self {
            ReelError::BadSignature { .. } | ReelError::Truncated { .. } => true,
            ReelError::WithContext { source, .. } => source.is_format_error(),
            _ => false,
        }
    }
}

/// Result type alias for keyreel operations
pub type Result<T> = std::result::Result<T, ReelError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ReelError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ReelError::Io(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReelError::Config("max_vars must be non-zero".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: max_vars must be non-zero"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = ReelError::Truncated { trailing: 3 };
        let with_ctx = err.with_context("Failed to load demo.bin");
        assert!(with_ctx.to_string().contains("Failed to load demo.bin"));
        assert!(with_ctx.is_format_error());
    }

    #[test]
    fn test_memory_access_error() {
        let err = ReelError::MemoryAccess {
            address: 0x2000_0000,
            message: "unmapped".to_string(),
        };
        assert!(err.to_string().contains("0x20000000"));
        assert!(err.to_string().contains("unmapped"));
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_io_context() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let err = res.context("Opening sequence").unwrap_err();
        assert!(err.to_string().starts_with("Opening sequence"));
    }
}
