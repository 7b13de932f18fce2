//! Biodata Readers Library
//!
//! A Rust library for downloading and parsing flat-file biological databases
//! into typed in-memory records suitable for downstream triple serialization.
//!
//! This library provides tools for:
//! - Streaming tab-delimited report files line-by-line with byte/line provenance
//! - Validating expected file headers with a lenient drift-detection policy
//! - Parsing per-format column layouts into validated, typed records
//! - Resolving raw identifier strings into checked identifier types
//! - Reusing previously downloaded files via on-disk ready markers
//! - Comprehensive error handling with file/line context
//!
//! Supported formats: GOA GAF annotation files, NCBI taxonomy dump files
//! (`names.dmp`, `nodes.dmp`), the MGI `MRK_Sequence.rpt` marker report, and
//! KEGG gene-ID list files.

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod formats;
        pub mod line_reader;
        pub mod record_reader;
        pub mod retrieval;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::services::line_reader::{LineReader, RawLine};
pub use app::services::record_reader::{FormatSpec, ReadStats, RecordReader};
pub use app::services::retrieval::{RemoteFetcher, RemoteResource};
pub use config::{CharacterEncoding, HeaderPolicy};

/// Result type alias for biodata reader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for download and parsing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Remote fetch failed
    #[error("transport error for '{location}': {message}")]
    Transport {
        location: String,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Byte stream could not be decoded under the declared encoding
    #[error("encoding error in '{path}' at line {line_number}: {message}")]
    Encoding {
        path: String,
        line_number: u64,
        message: String,
    },

    /// Structural line error (wrong token count, required field missing)
    #[error("format error in '{file}'{}: {message}", fmt_line(.line_number))]
    Format {
        file: String,
        line_number: Option<u64>,
        message: String,
    },

    /// An identifier string did not match its expected lexical form
    #[error("invalid {kind} identifier: '{value}'")]
    InvalidIdentifier { kind: &'static str, value: String },

    /// Caller programming error (e.g. operating a closed reader)
    #[error("usage error: {message}")]
    Usage { message: String },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

fn fmt_line(line_number: &Option<u64>) -> String {
    match line_number {
        Some(n) => format!(" at line {}", n),
        None => String::new(),
    }
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a transport error with context
    pub fn transport(
        location: impl Into<String>,
        message: impl Into<String>,
        source: Option<reqwest::Error>,
    ) -> Self {
        Self::Transport {
            location: location.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an encoding error for a specific file line
    pub fn encoding(
        path: impl Into<String>,
        line_number: u64,
        message: impl Into<String>,
    ) -> Self {
        Self::Encoding {
            path: path.into(),
            line_number,
            message: message.into(),
        }
    }

    /// Create a format error scoped to a whole file
    pub fn format(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            file: file.into(),
            line_number: None,
            message: message.into(),
        }
    }

    /// Create a format error scoped to a specific line
    pub fn format_at(
        file: impl Into<String>,
        line_number: u64,
        message: impl Into<String>,
    ) -> Self {
        Self::Format {
            file: file.into(),
            line_number: Some(line_number),
            message: message.into(),
        }
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            kind,
            value: value.into(),
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        let location = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Self::Transport {
            location,
            message: "remote fetch failed".to_string(),
            source: Some(error),
        }
    }
}
