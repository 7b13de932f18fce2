//! NCBI taxonomy dump files (`names.dmp`, `nodes.dmp`)
//!
//! The taxonomy dump format delimits columns with `<TAB>|<TAB>` and
//! terminates each line with `<TAB>|`:
//!
//! ```text
//! 9606	|	Homo sapiens	|		|	scientific name	|
//! ```
//!
//! `names.dmp` carries exactly four fields (tax_id, name, unique name, name
//! class); `nodes.dmp` carries thirteen of which the first three (tax_id,
//! parent tax_id, rank) are consumed here.

use super::fields;
use crate::app::models::TaxonomyId;
use crate::app::services::line_reader::RawLine;
use crate::app::services::record_reader::{FormatSpec, RecordReader};
use crate::config::CharacterEncoding;
use crate::constants::{DMP_DELIMITER, DMP_LINE_TERMINATOR};
use crate::{Error, Result};
use serde::Serialize;
use std::path::Path;

pub const NAMES_FORMAT_NAME: &str = "NCBI taxonomy names.dmp";
pub const NODES_FORMAT_NAME: &str = "NCBI taxonomy nodes.dmp";

/// Number of fields on every names.dmp line
const NAMES_FIELD_COUNT: usize = 4;

/// Minimum number of fields on a nodes.dmp line (13 in current dumps)
const NODES_MIN_FIELD_COUNT: usize = 3;

/// One name attached to a taxonomy node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonomyNameRecord {
    /// The node this name belongs to
    pub taxonomy_id: TaxonomyId,

    /// The name itself
    pub name: String,

    /// The unique variant of this name if the name is not unique
    pub unique_name: Option<String>,

    /// Name class (scientific name, synonym, common name, ...)
    pub name_class: String,

    pub byte_offset: u64,
    pub line_number: u64,
}

/// One edge of the taxonomy tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonomyNodeRecord {
    pub taxonomy_id: TaxonomyId,

    /// Parent node; the root node lists itself
    pub parent_taxonomy_id: TaxonomyId,

    /// Rank of this node (superkingdom, genus, species, ...)
    pub rank: String,

    pub byte_offset: u64,
    pub line_number: u64,
}

/// Reader configuration for names.dmp (no header, no comments)
pub fn names_spec() -> FormatSpec {
    FormatSpec::new(NAMES_FORMAT_NAME, CharacterEncoding::UsAscii)
}

/// Reader configuration for nodes.dmp
pub fn nodes_spec() -> FormatSpec {
    FormatSpec::new(NODES_FORMAT_NAME, CharacterEncoding::UsAscii)
}

/// Split a dump line into its fields, dropping the line terminator
fn split_dmp_fields<'a>(
    line: &'a RawLine,
    file: &str,
    min_fields: usize,
) -> Result<Vec<&'a str>> {
    let text = line
        .text
        .strip_suffix(DMP_LINE_TERMINATOR)
        .unwrap_or(&line.text);
    let columns: Vec<&str> = text.split(DMP_DELIMITER).collect();
    if columns.len() < min_fields {
        return Err(Error::format_at(
            file,
            line.line_number,
            format!(
                "expected at least {} dump fields, found {}",
                min_fields,
                columns.len()
            ),
        ));
    }
    Ok(columns)
}

/// Parse one names.dmp line
pub fn parse_names_line(line: &RawLine, file: &str) -> Result<TaxonomyNameRecord> {
    let columns = split_dmp_fields(line, file, NAMES_FIELD_COUNT)?;
    if columns.len() != NAMES_FIELD_COUNT {
        return Err(Error::format_at(
            file,
            line.line_number,
            format!(
                "expected exactly {} dump fields, found {}",
                NAMES_FIELD_COUNT,
                columns.len()
            ),
        ));
    }

    let taxonomy_id = TaxonomyId::new(columns[0])
        .map_err(|e| Error::format_at(file, line.line_number, e.to_string()))?;

    Ok(TaxonomyNameRecord {
        taxonomy_id,
        name: fields::required_str(columns[1], file, line.line_number, "name_txt")?,
        unique_name: fields::optional_str(columns[2]),
        name_class: fields::required_str(columns[3], file, line.line_number, "name class")?,
        byte_offset: line.byte_offset,
        line_number: line.line_number,
    })
}

/// Parse one nodes.dmp line
pub fn parse_nodes_line(line: &RawLine, file: &str) -> Result<TaxonomyNodeRecord> {
    let columns = split_dmp_fields(line, file, NODES_MIN_FIELD_COUNT)?;

    let taxonomy_id = TaxonomyId::new(columns[0])
        .map_err(|e| Error::format_at(file, line.line_number, e.to_string()))?;
    let parent_taxonomy_id = TaxonomyId::new(columns[1])
        .map_err(|e| Error::format_at(file, line.line_number, e.to_string()))?;

    Ok(TaxonomyNodeRecord {
        taxonomy_id,
        parent_taxonomy_id,
        rank: fields::required_str(columns[2], file, line.line_number, "rank")?,
        byte_offset: line.byte_offset,
        line_number: line.line_number,
    })
}

/// Open a record reader over a local names.dmp file
pub fn names_reader(path: &Path) -> Result<RecordReader<TaxonomyNameRecord>> {
    let file = path.display().to_string();
    RecordReader::open(
        path,
        names_spec(),
        Box::new(move |line| parse_names_line(line, &file).map(Some)),
    )
}

/// Open a record reader over a local nodes.dmp file
pub fn nodes_reader(path: &Path) -> Result<RecordReader<TaxonomyNodeRecord>> {
    let file = path.display().to_string();
    RecordReader::open(
        path,
        nodes_spec(),
        Box::new(move |line| parse_nodes_line(line, &file).map(Some)),
    )
}
