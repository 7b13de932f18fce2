//! MGI MRK_Sequence.rpt marker report
//!
//! A 20-column tab-delimited report published by the Mouse Genome
//! Informatics group, linking each MGI marker to its sequence identifiers in
//! other databases. The report carries a header line that is validated
//! against the expected column layout; nine of its columns are
//! pipe-separated multi-value identifier lists.

use super::fields;
use crate::app::models::{
    Chromosome, EnsemblId, GenBankAccession, MgiAccessionId, RefSeqId, UniGeneId,
    UniProtAccession, VegaId,
};
use crate::app::services::line_reader::RawLine;
use crate::app::services::record_reader::{FormatSpec, RecordReader};
use crate::app::services::retrieval::{self, RemoteFetcher, RemoteResource};
use crate::config::{CharacterEncoding, FetchConfig, HeaderPolicy};
use crate::constants::{TAB, UNKNOWN_CHROMOSOME};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub const FORMAT_NAME: &str = "MGI MRK_Sequence";

/// Expected header line of MRK_Sequence.rpt
pub const EXPECTED_HEADER: &str = "MGI Marker Accession ID\tMarker Symbol\tStatus\tMarker Type\tMarker Name\tcM position\tChromosome\tGenome Coordinate Start\tGenome Coordinate End\tStrand\tGenBank ID\tRefSeq transcript ID\tVEGA transcript ID\tEnsembl transcript ID\tUniProt ID\tTrEMBL ID\tVEGA protein ID\tEnsembl protein ID\tRefSeq protein ID\tUniGene ID";

/// Remote location of the report on the MGI download server
pub const REMOTE_LOCATION: &str =
    "https://www.informatics.jax.org/downloads/reports/MRK_Sequence.rpt";

pub const FILE_NAME: &str = "MRK_Sequence.rpt";

const COLUMN_COUNT: usize = 20;

/// Marker feature types used by MGI reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MgiMarkerType {
    Gene,
    DnaSegment,
    Pseudogene,
    Qtl,
    Transgene,
    ComplexClusterRegion,
    CytogeneticMarker,
    BacYacEnd,
    OtherGenomeFeature,
}

impl MgiMarkerType {
    /// Resolve the label used in the report's Marker Type column
    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim() {
            "Gene" => Ok(Self::Gene),
            "DNA Segment" => Ok(Self::DnaSegment),
            "Pseudogene" => Ok(Self::Pseudogene),
            "QTL" => Ok(Self::Qtl),
            "Transgene" => Ok(Self::Transgene),
            "Complex/Cluster/Region" => Ok(Self::ComplexClusterRegion),
            "Cytogenetic Marker" => Ok(Self::CytogeneticMarker),
            "BAC/YAC end" => Ok(Self::BacYacEnd),
            "Other Genome Feature" => Ok(Self::OtherGenomeFeature),
            other => Err(Error::invalid_identifier("MGI marker type", other)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Gene => "Gene",
            Self::DnaSegment => "DNA Segment",
            Self::Pseudogene => "Pseudogene",
            Self::Qtl => "QTL",
            Self::Transgene => "Transgene",
            Self::ComplexClusterRegion => "Complex/Cluster/Region",
            Self::CytogeneticMarker => "Cytogenetic Marker",
            Self::BacYacEnd => "BAC/YAC end",
            Self::OtherGenomeFeature => "Other Genome Feature",
        }
    }
}

/// One marker row of MRK_Sequence.rpt
///
/// The accession ID is the record's key field and is never absent; optional
/// scalar columns are `None` when empty, multi-value columns are empty sets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MrkSequenceRecord {
    pub mgi_accession_id: MgiAccessionId,
    pub marker_symbol: String,
    pub status: String,
    pub marker_type: MgiMarkerType,
    pub marker_name: String,
    pub cm_position: String,
    pub chromosome: Option<Chromosome>,
    pub genome_coordinate_start: Option<u64>,
    pub genome_coordinate_end: Option<u64>,
    pub strand: Option<String>,
    pub genbank_accession_ids: BTreeSet<GenBankAccession>,
    pub refseq_transcript_ids: BTreeSet<RefSeqId>,
    pub vega_transcript_ids: BTreeSet<VegaId>,
    pub ensembl_transcript_ids: BTreeSet<EnsemblId>,
    pub uniprot_ids: BTreeSet<UniProtAccession>,
    pub trembl_ids: BTreeSet<UniProtAccession>,
    pub vega_protein_ids: BTreeSet<VegaId>,
    pub ensembl_protein_ids: BTreeSet<EnsemblId>,
    pub refseq_protein_ids: BTreeSet<RefSeqId>,
    pub unigene_ids: BTreeSet<UniGeneId>,
    pub byte_offset: u64,
    pub line_number: u64,
}

/// Reader configuration for MRK_Sequence.rpt
pub fn spec() -> FormatSpec {
    FormatSpec::new(FORMAT_NAME, CharacterEncoding::UsAscii).with_header(EXPECTED_HEADER)
}

/// Parse one marker row
pub fn parse_line(line: &RawLine, file: &str) -> Result<MrkSequenceRecord> {
    let cols = fields::split_columns(line, file, TAB, COLUMN_COUNT)?;
    let n = line.line_number;

    let mgi_accession_id = MgiAccessionId::new(cols[0])
        .map_err(|e| Error::format_at(file, n, e.to_string()))?;
    let marker_type = MgiMarkerType::from_label(cols[3])
        .map_err(|e| Error::format_at(file, n, e.to_string()))?;

    // "UN" marks a marker not yet mapped to a chromosome
    let chromosome = if cols[6].trim() == UNKNOWN_CHROMOSOME {
        None
    } else {
        Some(
            Chromosome::new(cols[6]).map_err(|e| Error::format_at(file, n, e.to_string()))?,
        )
    };

    Ok(MrkSequenceRecord {
        mgi_accession_id,
        marker_symbol: fields::required_str(cols[1], file, n, "Marker Symbol")?,
        status: fields::required_str(cols[2], file, n, "Status")?,
        marker_type,
        marker_name: fields::required_str(cols[4], file, n, "Marker Name")?,
        cm_position: fields::required_str(cols[5], file, n, "cM position")?,
        chromosome,
        genome_coordinate_start: fields::optional_u64(cols[7], file, n, "Genome Coordinate Start")?,
        genome_coordinate_end: fields::optional_u64(cols[8], file, n, "Genome Coordinate End")?,
        strand: fields::optional_str(cols[9]),
        // GenBank and RefSeq protein columns routinely carry identifiers from
        // withdrawn namespaces; those values are dropped rather than fatal
        genbank_accession_ids: fields::identifier_set_lenient(
            cols[10],
            "GenBank",
            n,
            GenBankAccession::new,
        ),
        refseq_transcript_ids: fields::identifier_set(cols[11], file, n, RefSeqId::new)?,
        vega_transcript_ids: fields::identifier_set(cols[12], file, n, VegaId::new)?,
        ensembl_transcript_ids: fields::identifier_set(cols[13], file, n, EnsemblId::new)?,
        uniprot_ids: fields::identifier_set(cols[14], file, n, UniProtAccession::new)?,
        trembl_ids: fields::identifier_set(cols[15], file, n, UniProtAccession::new)?,
        vega_protein_ids: fields::identifier_set(cols[16], file, n, VegaId::new)?,
        ensembl_protein_ids: fields::identifier_set(cols[17], file, n, EnsemblId::new)?,
        refseq_protein_ids: fields::identifier_set_lenient(cols[18], "RefSeq", n, RefSeqId::new),
        unigene_ids: fields::identifier_set(cols[19], file, n, UniGeneId::new)?,
        byte_offset: line.byte_offset,
        line_number: n,
    })
}

/// Open a record reader over a local MRK_Sequence.rpt file
pub fn reader(path: &Path) -> Result<RecordReader<MrkSequenceRecord>> {
    reader_with_policy(path, HeaderPolicy::Lenient)
}

/// Open a reader with an explicit header-drift policy
pub fn reader_with_policy(
    path: &Path,
    policy: HeaderPolicy,
) -> Result<RecordReader<MrkSequenceRecord>> {
    let file = path.display().to_string();
    RecordReader::open(
        path,
        spec().with_header_policy(policy),
        Box::new(move |line| parse_line(line, &file).map(Some)),
    )
}

/// The report's location on the MGI download server
pub fn remote_resource() -> RemoteResource {
    RemoteResource::new(REMOTE_LOCATION, FILE_NAME)
}

/// Download the report if no complete local copy exists, then open a reader
pub fn download_reader(
    fetcher: &dyn RemoteFetcher,
    config: &FetchConfig,
) -> Result<RecordReader<MrkSequenceRecord>> {
    let local = retrieval::ensure_local(fetcher, &remote_resource(), &config.work_dir, config.clean)?;
    reader(&local)
}

/// Aggregate a whole report into a RefSeq-to-MGI multimap
///
/// Both transcript and protein RefSeq identifiers contribute to the map.
pub fn refseq_to_mgi_map(
    path: &Path,
) -> Result<BTreeMap<RefSeqId, BTreeSet<MgiAccessionId>>> {
    let mut reader = reader(path)?;
    let mut map: BTreeMap<RefSeqId, BTreeSet<MgiAccessionId>> = BTreeMap::new();

    while reader.has_next()? {
        let record = reader.next_record()?;
        for refseq_id in record
            .refseq_transcript_ids
            .iter()
            .chain(record.refseq_protein_ids.iter())
        {
            map.entry(refseq_id.clone())
                .or_default()
                .insert(record.mgi_accession_id.clone());
        }
    }
    reader.close();
    Ok(map)
}
