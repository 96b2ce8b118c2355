//! Layered error definitions
//!
//! Categorized by source: configuration / trace / transport / filter

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type
///
/// Every variant is fatal for the loop that raised it; nothing in the core retries.
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid rate, address or other configuration value
    #[error("configuration error at '{field}': {message}")]
    Configuration { field: String, message: String },

    // ===== Trace Errors =====
    /// Trace file does not exist
    #[error("trace file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Malformed trace row or wire payload
    #[error("format error in {origin}{}: {message}", line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Format {
        origin: String,
        line: Option<u64>,
        message: String,
    },

    // ===== Transport Errors =====
    /// Bind/connect failure, or send/receive failure mid-stream
    #[error("transport error on '{endpoint}': {message}")]
    Transport { endpoint: String, message: String },

    // ===== Filter Errors =====
    /// A relay filter rejected a sample it could not interpret
    #[error("filter '{filter}' failed: {message}")]
    Filter { filter: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration error
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create not-found error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create format error without a line number
    pub fn format(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            origin: origin.into(),
            line: None,
            message: message.into(),
        }
    }

    /// Create format error pinned to a line
    pub fn format_at(origin: impl Into<String>, line: u64, message: impl Into<String>) -> Self {
        Self::Format {
            origin: origin.into(),
            line: Some(line),
            message: message.into(),
        }
    }

    /// Create transport error
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create filter error
    pub fn filter(filter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Filter {
            filter: filter.into(),
            message: message.into(),
        }
    }
}
