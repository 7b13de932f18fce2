//! Column extraction utilities shared by the format parsers
//!
//! This module provides helper functions for splitting delimited lines and
//! parsing individual column values with proper error context. Multi-value
//! columns collapse duplicates and drop empty tokens; the strict variants
//! abort the record on a malformed value while the lenient variants log and
//! drop it.

use crate::app::services::line_reader::RawLine;
use crate::constants::MULTI_VALUE_DELIMITER;
use crate::{Error, Result};
use std::collections::BTreeSet;
use tracing::warn;

/// Split a line on a single-character delimiter, keeping empty columns
///
/// Fails with a structural format error when fewer than `min_columns`
/// columns are present.
pub fn split_columns<'a>(
    line: &'a RawLine,
    file: &str,
    delimiter: char,
    min_columns: usize,
) -> Result<Vec<&'a str>> {
    let columns: Vec<&str> = line.text.split(delimiter).collect();
    if columns.len() < min_columns {
        return Err(Error::format_at(
            file,
            line.line_number,
            format!(
                "expected at least {} columns, found {}",
                min_columns,
                columns.len()
            ),
        ));
    }
    Ok(columns)
}

/// Trimmed column value, `None` when empty
pub fn optional_str(token: &str) -> Option<String> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trimmed column value; empty is a structural error
pub fn required_str(token: &str, file: &str, line_number: u64, column: &str) -> Result<String> {
    optional_str(token).ok_or_else(|| {
        Error::format_at(
            file,
            line_number,
            format!("empty value for required column '{}'", column),
        )
    })
}

/// Optional integer column: empty means no value, never zero
pub fn optional_u64(
    token: &str,
    file: &str,
    line_number: u64,
    column: &str,
) -> Result<Option<u64>> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<u64>().map(Some).map_err(|_| {
        Error::format_at(
            file,
            line_number,
            format!("invalid integer '{}' in column '{}'", trimmed, column),
        )
    })
}

/// Parse a pipe-separated multi-value column strictly
///
/// Empty tokens are dropped and duplicates collapsed; any remaining token
/// that fails to construct aborts the record with line context.
pub fn identifier_set<T, F>(
    token: &str,
    file: &str,
    line_number: u64,
    construct: F,
) -> Result<BTreeSet<T>>
where
    T: Ord,
    F: Fn(&str) -> Result<T>,
{
    let mut values = BTreeSet::new();
    for raw in token.split(MULTI_VALUE_DELIMITER) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = construct(trimmed)
            .map_err(|e| Error::format_at(file, line_number, e.to_string()))?;
        values.insert(value);
    }
    Ok(values)
}

/// Parse a pipe-separated multi-value column leniently
///
/// Malformed individual values are logged and dropped; they do not abort
/// the record.
pub fn identifier_set_lenient<T, F>(
    token: &str,
    kind: &str,
    line_number: u64,
    construct: F,
) -> BTreeSet<T>
where
    T: Ord,
    F: Fn(&str) -> Result<T>,
{
    let mut values = BTreeSet::new();
    for raw in token.split(MULTI_VALUE_DELIMITER) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        match construct(trimmed) {
            Ok(value) => {
                values.insert(value);
            }
            Err(_) => {
                warn!(
                    value = trimmed,
                    kind, line_number, "unable to resolve identifier; value dropped"
                );
            }
        }
    }
    values
}

/// Split a pipe-separated free-text column into a de-duplicated set
pub fn string_set(token: &str) -> BTreeSet<String> {
    token
        .split(MULTI_VALUE_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
