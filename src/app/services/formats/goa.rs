//! GOA GAF 2.x annotation files
//!
//! Gene Ontology annotation files from the EBI GOA project. Comment lines
//! start with `!`; data lines carry 17 tab-separated columns of which the
//! last two are optional. GOA publishes dedicated per-species files for a
//! fixed set of organisms plus a combined `goa_uniprot_all` set covering
//! everything; the reader factory fetches the dedicated file when exactly
//! one requested taxon has one, and otherwise fetches the combined set and
//! filters it during reading.

use super::fields;
use crate::app::models::{GoTermId, TaxonomyId};
use crate::app::services::line_reader::RawLine;
use crate::app::services::record_reader::{FormatSpec, RecordReader};
use crate::app::services::retrieval::{self, RemoteFetcher, RemoteResource};
use crate::config::{CharacterEncoding, FetchConfig};
use crate::constants::{GAF_COMMENT_PREFIX, GAF_TAXON_PREFIX, MULTI_VALUE_DELIMITER, TAB};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

pub const FORMAT_NAME: &str = "GOA GAF";

/// Annotation date format in GAF column 14
const GAF_DATE_FORMAT: &str = "%Y%m%d";

/// GAF 2.x carries 17 columns; the last two are optional
const MIN_COLUMN_COUNT: usize = 15;

/// Base URL of the EBI GOA mirror
pub const GOA_HOST: &str = "https://ftp.ebi.ac.uk";

// =============================================================================
// Annotation Sets and Remote File Layout
// =============================================================================

/// GOA publishes four annotation sets per species, distinguished by file
/// suffix; the combined all-species set exists only for canonical
/// annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnnotationType {
    /// Annotations to canonical accessions from the reference proteome
    Canonical,
    /// Annotations to isoforms
    Isoform,
    /// Annotations to complexes
    Complex,
    /// Annotations to RNAs
    Rna,
}

impl AnnotationType {
    pub fn suffix(&self) -> &'static str {
        match self {
            AnnotationType::Canonical => ".gaf.gz",
            AnnotationType::Isoform => "_isoform.gaf.gz",
            AnnotationType::Complex => "_complex.gaf.gz",
            AnnotationType::Rna => "_rna.gaf.gz",
        }
    }
}

/// Remote directory and file prefix of one species' annotation set
#[derive(Debug, Clone, Copy)]
struct SpeciesFile {
    remote_dir: &'static str,
    file_prefix: &'static str,
}

/// Combined all-species annotation set; a superset of every dedicated file
const ALL_SPECIES: SpeciesFile = SpeciesFile {
    remote_dir: "pub/databases/GO/goa/UNIPROT",
    file_prefix: "goa_uniprot_all",
};

/// Species with dedicated per-taxon annotation files, keyed by taxonomy ID
static SPECIES_FILES: LazyLock<HashMap<TaxonomyId, SpeciesFile>> = LazyLock::new(|| {
    let entry = |dir, prefix| SpeciesFile {
        remote_dir: dir,
        file_prefix: prefix,
    };
    HashMap::from([
        (TaxonomyId::from_u32(3702), entry("pub/databases/GO/goa/ARABIDOPSIS", "goa_arabidopsis")),
        (TaxonomyId::from_u32(9031), entry("pub/databases/GO/goa/CHICKEN", "goa_chicken")),
        (TaxonomyId::from_u32(9913), entry("pub/databases/GO/goa/COW", "goa_cow")),
        (TaxonomyId::from_u32(44689), entry("pub/databases/GO/goa/DICTY", "goa_dicty")),
        (TaxonomyId::from_u32(9615), entry("pub/databases/GO/goa/DOG", "goa_dog")),
        (TaxonomyId::from_u32(7227), entry("pub/databases/GO/goa/FLY", "goa_fly")),
        (TaxonomyId::from_u32(9606), entry("pub/databases/GO/goa/HUMAN", "goa_human")),
        (TaxonomyId::from_u32(10090), entry("pub/databases/GO/goa/MOUSE", "goa_mouse")),
        (TaxonomyId::from_u32(9823), entry("pub/databases/GO/goa/PIG", "goa_pig")),
        (TaxonomyId::from_u32(10116), entry("pub/databases/GO/goa/RAT", "goa_rat")),
        (TaxonomyId::from_u32(6239), entry("pub/databases/GO/goa/WORM", "goa_worm")),
        (TaxonomyId::from_u32(559292), entry("pub/databases/GO/goa/YEAST", "goa_yeast")),
        (TaxonomyId::from_u32(7955), entry("pub/databases/GO/goa/ZEBRAFISH", "goa_zebrafish")),
    ])
});

fn resource_for(info: &SpeciesFile, annot_type: AnnotationType) -> RemoteResource {
    let file_name = format!("{}{}", info.file_prefix, annot_type.suffix());
    RemoteResource::new(
        format!("{}/{}/{}", GOA_HOST, info.remote_dir, file_name),
        file_name,
    )
}

/// Choose the remote file serving a set of requested taxa
///
/// Exactly one requested taxon with a dedicated per-species file selects
/// that file (the second tuple element is `true`). Zero or several taxa, or
/// a taxon without a dedicated file, select the combined all-species set;
/// the annotation type only applies where per-set files exist.
pub fn select_resource(
    taxa: &BTreeSet<TaxonomyId>,
    annot_type: AnnotationType,
) -> (RemoteResource, bool) {
    if taxa.len() == 1 {
        let taxon = taxa.iter().next().copied();
        if let Some(info) = taxon.and_then(|t| SPECIES_FILES.get(&t)) {
            return (resource_for(info, annot_type), true);
        }
        return (resource_for(&ALL_SPECIES, annot_type), false);
    }
    (resource_for(&ALL_SPECIES, AnnotationType::Canonical), false)
}

// =============================================================================
// Record and Parser
// =============================================================================

/// One GAF 2.x annotation line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GafRecord {
    pub database: String,
    pub db_object_id: String,
    pub db_object_symbol: String,
    pub qualifiers: BTreeSet<String>,
    pub go_id: GoTermId,
    pub db_references: BTreeSet<String>,
    pub evidence_code: String,
    pub with_or_from: BTreeSet<String>,
    pub aspect: String,
    pub db_object_name: Option<String>,
    pub db_object_synonyms: BTreeSet<String>,
    pub db_object_type: String,
    /// Annotated taxa; two entries for multi-organism interactions
    pub taxon_ids: BTreeSet<TaxonomyId>,
    pub annotation_date: NaiveDate,
    pub assigned_by: String,
    pub annotation_extensions: BTreeSet<String>,
    pub gene_product_form_id: Option<String>,
    pub byte_offset: u64,
    pub line_number: u64,
}

/// Reader configuration for GAF files (no header line, `!` comments)
pub fn spec() -> FormatSpec {
    FormatSpec::new(FORMAT_NAME, CharacterEncoding::Utf8).with_skip_prefix(GAF_COMMENT_PREFIX)
}

/// Parse one annotation line
pub fn parse_line(line: &RawLine, file: &str) -> Result<GafRecord> {
    let cols = fields::split_columns(line, file, TAB, MIN_COLUMN_COUNT)?;
    let n = line.line_number;

    let go_id =
        GoTermId::new(cols[4]).map_err(|e| Error::format_at(file, n, e.to_string()))?;
    let taxon_ids = parse_taxon_column(cols[12], file, n)?;

    let annotation_date = NaiveDate::parse_from_str(cols[13].trim(), GAF_DATE_FORMAT)
        .map_err(|_| {
            Error::format_at(file, n, format!("invalid annotation date '{}'", cols[13]))
        })?;

    Ok(GafRecord {
        database: fields::required_str(cols[0], file, n, "DB")?,
        db_object_id: fields::required_str(cols[1], file, n, "DB Object ID")?,
        db_object_symbol: fields::required_str(cols[2], file, n, "DB Object Symbol")?,
        qualifiers: fields::string_set(cols[3]),
        go_id,
        db_references: fields::string_set(cols[5]),
        evidence_code: fields::required_str(cols[6], file, n, "Evidence Code")?,
        with_or_from: fields::string_set(cols[7]),
        aspect: fields::required_str(cols[8], file, n, "Aspect")?,
        db_object_name: fields::optional_str(cols[9]),
        db_object_synonyms: fields::string_set(cols[10]),
        db_object_type: fields::required_str(cols[11], file, n, "DB Object Type")?,
        taxon_ids,
        annotation_date,
        assigned_by: fields::required_str(cols[14], file, n, "Assigned By")?,
        annotation_extensions: cols
            .get(15)
            .map(|c| fields::string_set(c))
            .unwrap_or_default(),
        gene_product_form_id: cols.get(16).and_then(|c| fields::optional_str(c)),
        byte_offset: line.byte_offset,
        line_number: n,
    })
}

/// Parse the `taxon:<id>(|taxon:<id>)` column
///
/// Malformed individual tokens are logged and dropped; a column with no
/// usable taxon at all is a structural error since the taxon scopes the
/// whole annotation.
fn parse_taxon_column(token: &str, file: &str, line_number: u64) -> Result<BTreeSet<TaxonomyId>> {
    let mut taxa = BTreeSet::new();
    for raw in token.split(MULTI_VALUE_DELIMITER) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed = trimmed
            .strip_prefix(GAF_TAXON_PREFIX)
            .ok_or(())
            .and_then(|id| TaxonomyId::new(id).map_err(|_| ()));
        match parsed {
            Ok(taxon) => {
                taxa.insert(taxon);
            }
            Err(()) => warn!(
                value = trimmed,
                line_number, "unable to resolve taxon token; value dropped"
            ),
        }
    }
    if taxa.is_empty() {
        return Err(Error::format_at(
            file,
            line_number,
            format!("no usable taxon in column value '{}'", token),
        ));
    }
    Ok(taxa)
}

// =============================================================================
// Readers
// =============================================================================

/// Open a reader over a local GAF file, filtered to the given taxa
///
/// An empty filter yields every record.
pub fn reader_for_file(
    path: &Path,
    taxon_filter: BTreeSet<TaxonomyId>,
) -> Result<RecordReader<GafRecord>> {
    let file = path.display().to_string();
    RecordReader::open(
        path,
        spec(),
        Box::new(move |line| {
            let record = parse_line(line, &file)?;
            if !taxon_filter.is_empty() && record.taxon_ids.is_disjoint(&taxon_filter) {
                return Ok(None);
            }
            Ok(Some(record))
        }),
    )
}

/// Download the annotation set serving the requested taxa and open a reader
///
/// If the dedicated per-species fetch fails, the combined all-species set is
/// fetched instead; its superset contents are narrowed by the taxon filter.
pub fn record_reader(
    fetcher: &dyn RemoteFetcher,
    config: &FetchConfig,
    taxa: &BTreeSet<TaxonomyId>,
    annot_type: AnnotationType,
) -> Result<RecordReader<GafRecord>> {
    let (resource, dedicated) = select_resource(taxa, annot_type);

    let local = match retrieval::ensure_local(fetcher, &resource, &config.work_dir, config.clean) {
        Ok(path) => path,
        Err(error) if dedicated => {
            warn!(
                location = %resource.location,
                error = %error,
                "dedicated annotation file unavailable; falling back to the combined set"
            );
            let combined = resource_for(&ALL_SPECIES, AnnotationType::Canonical);
            retrieval::ensure_local(fetcher, &combined, &config.work_dir, config.clean)?
        }
        Err(error) => return Err(error),
    };

    reader_for_file(&local, taxa.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_LINE: &str = "UniProtKB\tQ4V8C5\tTmx2\tenables\tGO:0005515\tPMID:21873635\tIPI\tUniProtKB:P35569\tF\tThioredoxin-related transmembrane protein 2\tTmx2|Txndc14\tprotein\ttaxon:10116\t20060208\tUniProt\t\t";

    fn raw(text: &str) -> RawLine {
        RawLine {
            text: text.to_string(),
            byte_offset: 1024,
            line_number: 12,
        }
    }

    fn taxa(ids: &[u32]) -> BTreeSet<TaxonomyId> {
        ids.iter().map(|&id| TaxonomyId::from_u32(id)).collect()
    }

    #[test]
    fn test_parse_annotation_line() {
        let record = parse_line(&raw(SAMPLE_LINE), "goa_rat.gaf").unwrap();

        assert_eq!(record.database, "UniProtKB");
        assert_eq!(record.db_object_id, "Q4V8C5");
        assert_eq!(record.go_id, GoTermId::new("GO:0005515").unwrap());
        assert_eq!(record.evidence_code, "IPI");
        assert_eq!(record.aspect, "F");
        assert_eq!(record.taxon_ids, taxa(&[10116]));
        assert_eq!(
            record.annotation_date,
            NaiveDate::from_ymd_opt(2006, 2, 8).unwrap()
        );
        assert_eq!(record.db_object_synonyms.len(), 2);
        assert_eq!(record.annotation_extensions.len(), 0);
        assert_eq!(record.gene_product_form_id, None);
        assert_eq!(record.line_number, 12);
    }

    #[test]
    fn test_multi_organism_taxon_column() {
        let line = SAMPLE_LINE.replace("taxon:10116", "taxon:10116|taxon:10090");
        let record = parse_line(&raw(&line), "goa_rat.gaf").unwrap();
        assert_eq!(record.taxon_ids, taxa(&[10116, 10090]));
    }

    #[test]
    fn test_malformed_taxon_token_dropped() {
        let line = SAMPLE_LINE.replace("taxon:10116", "taxon:10116|taxid=10090");
        let record = parse_line(&raw(&line), "goa_rat.gaf").unwrap();
        assert_eq!(record.taxon_ids, taxa(&[10116]));
    }

    #[test]
    fn test_no_usable_taxon_is_fatal() {
        let line = SAMPLE_LINE.replace("taxon:10116", "taxid=10116");
        assert!(parse_line(&raw(&line), "goa_rat.gaf").is_err());
    }

    #[test]
    fn test_invalid_go_id_is_fatal() {
        let line = SAMPLE_LINE.replace("GO:0005515", "GO_0005515");
        assert!(parse_line(&raw(&line), "goa_rat.gaf").is_err());
    }

    #[test]
    fn test_invalid_date_is_fatal() {
        let line = SAMPLE_LINE.replace("20060208", "2006-02-08");
        assert!(parse_line(&raw(&line), "goa_rat.gaf").is_err());
    }

    #[test]
    fn test_short_line_is_fatal() {
        assert!(parse_line(&raw("UniProtKB\tQ4V8C5\tTmx2"), "goa_rat.gaf").is_err());
    }

    #[test]
    fn test_select_single_known_taxon_uses_dedicated_file() {
        let (resource, dedicated) = select_resource(&taxa(&[9606]), AnnotationType::Canonical);
        assert!(dedicated);
        assert_eq!(resource.file_name, "goa_human.gaf.gz");
        assert_eq!(
            resource.location,
            "https://ftp.ebi.ac.uk/pub/databases/GO/goa/HUMAN/goa_human.gaf.gz"
        );
    }

    #[test]
    fn test_select_annotation_type_suffix() {
        let (resource, _) = select_resource(&taxa(&[10090]), AnnotationType::Isoform);
        assert_eq!(resource.file_name, "goa_mouse_isoform.gaf.gz");
    }

    #[test]
    fn test_select_multiple_taxa_uses_combined_file() {
        let (resource, dedicated) =
            select_resource(&taxa(&[9606, 10090]), AnnotationType::Canonical);
        assert!(!dedicated);
        assert_eq!(resource.file_name, "goa_uniprot_all.gaf.gz");
    }

    #[test]
    fn test_select_empty_taxa_uses_combined_file() {
        let (resource, dedicated) = select_resource(&taxa(&[]), AnnotationType::Isoform);
        assert!(!dedicated);
        // The combined set only exists for canonical annotations
        assert_eq!(resource.file_name, "goa_uniprot_all.gaf.gz");
    }

    #[test]
    fn test_select_unknown_single_taxon_uses_combined_file() {
        let (resource, dedicated) = select_resource(&taxa(&[4932]), AnnotationType::Canonical);
        assert!(!dedicated);
        assert_eq!(resource.file_name, "goa_uniprot_all.gaf.gz");
    }

    fn write_gaf(lines: &[String]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "!gaf-version: 2.1").unwrap();
        writeln!(file, "!Generated: 2006-02-10").unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_reader_skips_comment_lines() {
        let file = write_gaf(&[SAMPLE_LINE.to_string(), SAMPLE_LINE.to_string()]);
        let mut reader = reader_for_file(file.path(), BTreeSet::new()).unwrap();

        let mut count = 0;
        while reader.has_next().unwrap() {
            reader.next_record().unwrap();
            count += 1;
        }
        assert_eq!(count, 2);
        assert_eq!(reader.stats().lines_read, 2);
    }

    #[test]
    fn test_taxon_filter_narrows_records() {
        let mouse_line = SAMPLE_LINE.replace("taxon:10116", "taxon:10090");
        let file = write_gaf(&[SAMPLE_LINE.to_string(), mouse_line, SAMPLE_LINE.to_string()]);

        let mut reader = reader_for_file(file.path(), taxa(&[10090])).unwrap();
        let record = reader.next_record().unwrap();
        assert_eq!(record.taxon_ids, taxa(&[10090]));
        assert!(!reader.has_next().unwrap());
        assert_eq!(reader.stats().records_filtered, 2);
    }
}
