//! KEGG gene-ID list files
//!
//! These files link KEGG's per-organism gene identifiers to an external
//! namespace, one pair per line:
//!
//! ```text
//! aae:aq_001	ncbi-geneid:1192533
//! ```
//!
//! The internal column is `<organism>:<gene>`; only the gene token is kept.
//! The external column is `<namespace>:<id>` where the namespace selects the
//! identifier type.

use super::fields;
use crate::app::models::{EntrezGeneId, KeggGeneId, NcbiGiId, UniProtAccession};
use crate::app::services::line_reader::RawLine;
use crate::app::services::record_reader::{FormatSpec, RecordReader};
use crate::config::CharacterEncoding;
use crate::constants::TAB;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub const FORMAT_NAME: &str = "KEGG gene-ID list";

/// External gene reference resolved from the list's namespace prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ExternalGeneRef {
    Entrez(EntrezGeneId),
    Gi(NcbiGiId),
    UniProt(UniProtAccession),
}

/// One internal-to-external gene mapping with provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeggGeneListRecord {
    pub kegg_gene_id: KeggGeneId,
    pub external_ref: ExternalGeneRef,
    pub byte_offset: u64,
    pub line_number: u64,
}

/// Reader configuration for KEGG gene-ID list files (no header, no comments)
pub fn spec() -> FormatSpec {
    FormatSpec::new(FORMAT_NAME, CharacterEncoding::UsAscii)
}

/// Parse one gene-ID list line
pub fn parse_line(line: &RawLine, file: &str) -> Result<KeggGeneListRecord> {
    let columns = fields::split_columns(line, file, TAB, 2)?;
    if columns.len() != 2 {
        return Err(Error::format_at(
            file,
            line.line_number,
            format!("expected exactly 2 columns, found {}", columns.len()),
        ));
    }

    let Some((_, gene_token)) = columns[0].split_once(':') else {
        return Err(Error::format_at(
            file,
            line.line_number,
            format!("missing organism prefix in '{}'", columns[0]),
        ));
    };
    let kegg_gene_id = KeggGeneId::new(gene_token)
        .map_err(|e| Error::format_at(file, line.line_number, e.to_string()))?;

    let external_ref = parse_external_ref(columns[1], file, line.line_number)?;

    Ok(KeggGeneListRecord {
        kegg_gene_id,
        external_ref,
        byte_offset: line.byte_offset,
        line_number: line.line_number,
    })
}

fn parse_external_ref(token: &str, file: &str, line_number: u64) -> Result<ExternalGeneRef> {
    let Some((namespace, id)) = token.split_once(':') else {
        return Err(Error::format_at(
            file,
            line_number,
            format!("missing namespace prefix in '{}'", token),
        ));
    };

    let resolved = match namespace {
        "ncbi-geneid" => EntrezGeneId::new(id).map(ExternalGeneRef::Entrez),
        "ncbi-gi" => NcbiGiId::new(id).map(ExternalGeneRef::Gi),
        "up" | "uniprot" => UniProtAccession::new(id).map(ExternalGeneRef::UniProt),
        other => {
            return Err(Error::format_at(
                file,
                line_number,
                format!("unrecognized external gene namespace '{}'", other),
            ));
        }
    };
    resolved.map_err(|e| Error::format_at(file, line_number, e.to_string()))
}

/// Open a record reader over a local gene-ID list file
pub fn reader(path: &Path) -> Result<RecordReader<KeggGeneListRecord>> {
    let file = path.display().to_string();
    RecordReader::open(
        path,
        spec(),
        Box::new(move |line| parse_line(line, &file).map(Some)),
    )
}

/// Aggregate a whole gene-ID list file into an internal-to-external multimap
pub fn internal_to_external_map(
    path: &Path,
) -> Result<BTreeMap<KeggGeneId, BTreeSet<ExternalGeneRef>>> {
    let mut reader = reader(path)?;
    let mut map: BTreeMap<KeggGeneId, BTreeSet<ExternalGeneRef>> = BTreeMap::new();

    while reader.has_next()? {
        let record = reader.next_record()?;
        map.entry(record.kegg_gene_id)
            .or_default()
            .insert(record.external_ref);
    }
    reader.close();
    Ok(map)
}
