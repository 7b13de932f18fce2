//! Configuration types accepted by the reader core.
//!
//! Provides the character-encoding declaration, the header-drift policy,
//! and the download working-directory settings passed at construction time.

use crate::constants::DEFAULT_WORK_DIR_NAME;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Character encoding declared for a source file
///
/// The upstream databases publish either plain ASCII report files or UTF-8
/// text. Decoding failures are fatal: a corrupt byte stream cannot be
/// recovered from locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterEncoding {
    Utf8,
    UsAscii,
}

impl CharacterEncoding {
    /// Decode a raw line under this encoding, returning a description of the
    /// failure on undecodable input
    pub fn decode(&self, bytes: Vec<u8>) -> std::result::Result<String, &'static str> {
        match self {
            CharacterEncoding::Utf8 => {
                String::from_utf8(bytes).map_err(|_| "byte stream is not valid UTF-8")
            }
            CharacterEncoding::UsAscii => {
                if bytes.is_ascii() {
                    // ASCII is a strict subset of UTF-8
                    Ok(String::from_utf8(bytes).expect("ascii bytes are valid utf-8"))
                } else {
                    Err("byte stream contains non-ASCII bytes")
                }
            }
        }
    }

    /// Human-readable encoding label for diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            CharacterEncoding::Utf8 => "UTF-8",
            CharacterEncoding::UsAscii => "US-ASCII",
        }
    }
}

impl Default for CharacterEncoding {
    fn default() -> Self {
        CharacterEncoding::Utf8
    }
}

/// Policy applied when a file's header line differs from the expected constant
///
/// Externally maintained files drift: header wording and whitespace change
/// between releases. The lenient default records a warning and parses
/// optimistically against the declared column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderPolicy {
    /// Log a warning on mismatch and continue parsing
    Lenient,
    /// Fail the parse on mismatch
    Strict,
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        HeaderPolicy::Lenient
    }
}

/// Settings for the download cache gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Local working directory for downloaded files and ready markers
    pub work_dir: PathBuf,

    /// Ignore any cached local copy and force a re-fetch
    pub clean: bool,
}

impl FetchConfig {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            clean: false,
        }
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            clean: false,
        }
    }
}

/// Default local working directory (platform cache dir, falling back to cwd)
pub fn default_work_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_WORK_DIR_NAME)
}
