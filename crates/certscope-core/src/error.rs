//! Error types for certscope.
//!
//! All errors implement `std::error::Error` and are serializable so a host UI
//! can render the kind, offset, and detail without string parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias using CertscopeError as the error type.
pub type Result<T> = std::result::Result<T, CertscopeError>;

/// Top-level error type for all certscope operations.
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum CertscopeError {
    /// Structural decoding errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Certificate and CA record loading errors
    #[error("Certificate error: {0}")]
    Certificate(#[from] CertificateError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Settings store errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Internal errors that shouldn't normally occur
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The failure classes a decode can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecodeErrorKind {
    /// No normalization path produced any bytes
    InvalidEncoding,
    /// A declared length runs past the end of the buffer or the parent
    TruncatedInput,
    /// Length-of-length is zero, above four, or the length is over the limit
    MalformedLength,
    /// High-tag-number form is truncated or overflows
    MalformedTag,
    /// NULL carries content
    InvalidNull,
    /// A primitive value violates its type's grammar
    InvalidContent,
    /// Constructed nodes nest deeper than the configured limit
    NestingTooDeep,
}

impl DecodeErrorKind {
    /// Stable identifier used in logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeErrorKind::InvalidEncoding => "InvalidEncoding",
            DecodeErrorKind::TruncatedInput => "TruncatedInput",
            DecodeErrorKind::MalformedLength => "MalformedLength",
            DecodeErrorKind::MalformedTag => "MalformedTag",
            DecodeErrorKind::InvalidNull => "InvalidNull",
            DecodeErrorKind::InvalidContent => "InvalidContent",
            DecodeErrorKind::NestingTooDeep => "NestingTooDeep",
        }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decode failure with the byte offset where it was detected.
///
/// `tag` names the innermost element being decoded when the failure
/// happened, if one had been identified.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind} at offset {offset}{}: {detail}", tag_context(.tag))]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub offset: usize,
    pub tag: Option<String>,
    pub detail: String,
}

fn tag_context(tag: &Option<String>) -> String {
    match tag {
        Some(tag) => format!(" in {}", tag),
        None => String::new(),
    }
}

impl DecodeError {
    /// Creates a decode error without tag context.
    pub fn new(kind: DecodeErrorKind, offset: usize, detail: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            tag: None,
            detail: detail.into(),
        }
    }

    /// Attaches tag context unless a more specific one is already set.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        if self.tag.is_none() {
            self.tag = Some(tag.into());
        }
        self
    }

    /// Creates an invalid encoding error.
    pub fn invalid_encoding(detail: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::InvalidEncoding, 0, detail)
    }

    /// Creates a truncated input error.
    pub fn truncated(offset: usize, declared: usize, available: usize) -> Self {
        Self::new(
            DecodeErrorKind::TruncatedInput,
            offset,
            format!(
                "declared length {} exceeds the {} byte(s) available",
                declared, available
            ),
        )
    }

    /// Creates a malformed length error.
    pub fn malformed_length(offset: usize, detail: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::MalformedLength, offset, detail)
    }

    /// Creates a malformed tag error.
    pub fn malformed_tag(offset: usize, detail: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::MalformedTag, offset, detail)
    }

    /// Creates an invalid NULL error.
    pub fn invalid_null(offset: usize, length: usize) -> Self {
        Self::new(
            DecodeErrorKind::InvalidNull,
            offset,
            format!("NULL must be empty, found {} content byte(s)", length),
        )
    }

    /// Creates an invalid content error.
    pub fn invalid_content(offset: usize, detail: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::InvalidContent, offset, detail)
    }
}

/// Errors raised while loading certificates and CA records.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum CertificateError {
    /// PEM text could not be read
    #[error("Invalid PEM data: {reason}")]
    InvalidPem { reason: String },

    /// The DER body is not a parseable X.509 certificate
    #[error("Failed to parse certificate: {reason}")]
    ParseFailed { reason: String },

    /// No certificate blocks were found
    #[error("No certificates found in {source_name}")]
    NoCertificates { source_name: String },

    /// A CA record list could not be read
    #[error("Invalid CA record list in {path}: {reason}")]
    InvalidRecordList { path: String, reason: String },
}

impl CertificateError {
    /// Creates an invalid PEM error.
    pub fn invalid_pem(reason: impl Into<String>) -> Self {
        Self::InvalidPem {
            reason: reason.into(),
        }
    }

    /// Creates a parse failed error.
    pub fn parse_failed(reason: impl Into<String>) -> Self {
        Self::ParseFailed {
            reason: reason.into(),
        }
    }
}

/// Errors related to configuration.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {reason}")]
    InvalidFormat { reason: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by settings stores.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum SettingsError {
    /// The backing file exists but could not be read
    #[error("Failed to load settings from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// The backing file could not be written
    #[error("Failed to save settings to {path}: {reason}")]
    SaveFailed { path: String, reason: String },

    /// A stored value does not parse as the expected type
    #[error("Invalid value for setting '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Wrapper for I/O errors to make them serializable.
#[derive(Debug, Error, Serialize, Deserialize)]
#[error("I/O error: {kind:?}: {message}")]
pub struct IoError {
    pub kind: IoErrorKind,
    pub message: String,
}

impl From<io::Error> for IoError {
    fn from(err: io::Error) -> Self {
        Self {
            kind: err.kind().into(),
            message: err.to_string(),
        }
    }
}

impl From<io::Error> for CertscopeError {
    fn from(err: io::Error) -> Self {
        CertscopeError::Io(err.into())
    }
}

/// Serializable version of std::io::ErrorKind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoErrorKind {
    NotFound,
    PermissionDenied,
    AlreadyExists,
    InvalidInput,
    InvalidData,
    UnexpectedEof,
    Interrupted,
    Other,
}

impl From<io::ErrorKind> for IoErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => IoErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => IoErrorKind::PermissionDenied,
            io::ErrorKind::AlreadyExists => IoErrorKind::AlreadyExists,
            io::ErrorKind::InvalidInput => IoErrorKind::InvalidInput,
            io::ErrorKind::InvalidData => IoErrorKind::InvalidData,
            io::ErrorKind::UnexpectedEof => IoErrorKind::UnexpectedEof,
            io::ErrorKind::Interrupted => IoErrorKind::Interrupted,
            _ => IoErrorKind::Other,
        }
    }
}

/// Extension trait for converting Results to CertscopeError.
pub trait ResultExt<T> {
    /// Converts the error to an internal error with context.
    fn internal_context(self, context: &str) -> Result<T>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn internal_context(self, context: &str) -> Result<T> {
        self.map_err(|e| CertscopeError::Internal(format!("{}: {}", context, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display_includes_offset_and_tag() {
        let err = DecodeError::truncated(2, 5, 3).with_tag("SEQUENCE");
        let display = err.to_string();
        assert!(display.starts_with("TruncatedInput at offset 2 in SEQUENCE"));
        assert!(display.contains("declared length 5"));
    }

    #[test]
    fn test_with_tag_keeps_innermost() {
        let err = DecodeError::invalid_null(4, 1)
            .with_tag("NULL")
            .with_tag("SEQUENCE");
        assert_eq!(err.tag.as_deref(), Some("NULL"));
    }

    #[test]
    fn test_decode_error_without_tag() {
        let err = DecodeError::invalid_encoding("empty input");
        assert_eq!(err.to_string(), "InvalidEncoding at offset 0: empty input");
    }

    #[test]
    fn test_error_serialization() {
        let err = CertscopeError::Decode(DecodeError::malformed_length(1, "length-of-length 5"));
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"type\":\"Decode\""));
        assert!(json.contains("MalformedLength"));
        assert!(json.contains("\"offset\":1"));
    }

    #[test]
    fn test_certificate_error_helpers() {
        let err = CertificateError::invalid_pem("missing END line");
        assert!(matches!(err, CertificateError::InvalidPem { .. }));

        let err = CertificateError::parse_failed("bad der");
        assert!(err.to_string().contains("bad der"));
    }

    #[test]
    fn test_config_error_helpers() {
        let err = ConfigError::file_not_found("/etc/certscope/config.yaml");
        assert!(matches!(err, ConfigError::FileNotFound { .. }));

        let err = ConfigError::invalid_value("chain.max_depth", "must be at least 1");
        assert!(err.to_string().contains("chain.max_depth"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: CertscopeError = io_err.into();
        assert!(matches!(
            err,
            CertscopeError::Io(IoError {
                kind: IoErrorKind::NotFound,
                ..
            })
        ));
    }

    #[test]
    fn test_internal_context() {
        let res: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::Other, "boom"));
        let err = res.internal_context("flushing").unwrap_err();
        assert_eq!(err.to_string(), "Internal error: flushing: boom");
    }
}
