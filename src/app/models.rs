//! Identifier types for biological database records
//!
//! This module contains the validated identifier wrappers used throughout the
//! format readers. Construction checks the raw string against the
//! identifier's expected lexical form and fails on mismatch; identifiers are
//! value types, equal iff their validated content is equal.

use crate::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// =============================================================================
// Numeric Identifiers
// =============================================================================

/// NCBI taxonomy identifier (e.g. 9606 for human, 10090 for mouse)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TaxonomyId(u32);

impl TaxonomyId {
    /// Validate and wrap a raw taxonomy ID string
    pub fn new(raw: &str) -> Result<Self> {
        raw.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| Error::invalid_identifier("NCBI taxonomy", raw))
    }

    pub fn from_u32(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TaxonomyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaxonomyId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Entrez (NCBI) gene identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntrezGeneId(u64);

impl EntrezGeneId {
    pub fn new(raw: &str) -> Result<Self> {
        raw.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| Error::invalid_identifier("Entrez gene", raw))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntrezGeneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NCBI GI sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NcbiGiId(u64);

impl NcbiGiId {
    pub fn new(raw: &str) -> Result<Self> {
        raw.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| Error::invalid_identifier("NCBI GI", raw))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NcbiGiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// String Identifiers
// =============================================================================

/// Define a validated string-backed identifier type.
///
/// Each type owns its trimmed raw string and rejects construction when the
/// string does not match the identifier's lexical form.
macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $pattern:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(String);

        impl $name {
            fn pattern() -> &'static Regex {
                static PATTERN: LazyLock<Regex> =
                    LazyLock::new(|| Regex::new($pattern).expect("identifier pattern compiles"));
                &PATTERN
            }

            /// Validate and wrap a raw identifier string
            pub fn new(raw: &str) -> Result<Self> {
                let trimmed = raw.trim();
                if Self::pattern().is_match(trimmed) {
                    Ok(Self(trimmed.to_string()))
                } else {
                    Err(Error::invalid_identifier($kind, raw))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }
    };
}

string_identifier!(
    /// MGI marker accession (e.g. "MGI:1918911")
    MgiAccessionId,
    "MGI accession",
    r"^MGI:\d+$"
);

string_identifier!(
    /// Gene Ontology term identifier (e.g. "GO:0005634")
    GoTermId,
    "GO term",
    r"^GO:\d{7}$"
);

string_identifier!(
    /// RefSeq accession with optional version (e.g. "NM_001001130.3")
    RefSeqId,
    "RefSeq",
    r"^[A-Z]{2}_\d+(\.\d+)?$"
);

string_identifier!(
    /// GenBank nucleotide accession (e.g. "AC087559", "BC052055.1")
    GenBankAccession,
    "GenBank nucleotide accession",
    r"^[A-Z]{1,4}\d{5,10}(\.\d+)?$"
);

string_identifier!(
    /// UniProtKB accession (Swiss-Prot or TrEMBL)
    UniProtAccession,
    "UniProt accession",
    r"^([OPQ][0-9][A-Z0-9]{3}[0-9]|[A-NR-Z][0-9]([A-Z][A-Z0-9]{2}[0-9]){1,2})$"
);

string_identifier!(
    /// Ensembl stable identifier (gene, transcript, or protein)
    EnsemblId,
    "Ensembl",
    r"^ENS[A-Z]*\d{6,}(\.\d+)?$"
);

string_identifier!(
    /// VEGA stable identifier (e.g. "OTTMUST00000042924")
    VegaId,
    "VEGA",
    r"^OTT[A-Z]*\d{6,}(\.\d+)?$"
);

string_identifier!(
    /// UniGene cluster identifier (e.g. "Mm.329815")
    UniGeneId,
    "UniGene",
    r"^[A-Za-z]{1,5}\.\d+$"
);

string_identifier!(
    /// KEGG gene identifier, the per-organism gene token (e.g. "aq_001")
    KeggGeneId,
    "KEGG gene",
    r"^\S+$"
);

string_identifier!(
    /// Mouse chromosome name: 1-19, X, Y, XY, or MT
    Chromosome,
    "chromosome",
    r"^(\d{1,2}|X|Y|XY|MT)$"
);

#[cfg(test)]
mod tests {
    use super::*;

    mod numeric_ids {
        use super::*;

        #[test]
        fn test_taxonomy_id_valid() {
            let id = TaxonomyId::new("9606").unwrap();
            assert_eq!(id.value(), 9606);
            assert_eq!(id, TaxonomyId::from_u32(9606));
            assert_eq!(id.to_string(), "9606");
        }

        #[test]
        fn test_taxonomy_id_trims_whitespace() {
            assert_eq!(
                TaxonomyId::new(" 10090 ").unwrap(),
                TaxonomyId::from_u32(10090)
            );
        }

        #[test]
        fn test_taxonomy_id_invalid() {
            assert!(TaxonomyId::new("taxon:9606").is_err());
            assert!(TaxonomyId::new("").is_err());
            assert!(TaxonomyId::new("-1").is_err());
        }

        #[test]
        fn test_entrez_gene_id() {
            let id = EntrezGeneId::new("1192533").unwrap();
            assert_eq!(id.value(), 1192533);
            assert!(EntrezGeneId::new("ncbi-geneid:1192533").is_err());
        }
    }

    mod string_ids {
        use super::*;

        #[test]
        fn test_mgi_accession() {
            assert!(MgiAccessionId::new("MGI:1918911").is_ok());
            assert!(MgiAccessionId::new("MGI_1918911").is_err());
            assert!(MgiAccessionId::new("1918911").is_err());
        }

        #[test]
        fn test_go_term() {
            assert!(GoTermId::new("GO:0005634").is_ok());
            assert!(GoTermId::new("GO:5634").is_err());
            assert!(GoTermId::new("GO:00056349").is_err());
        }

        #[test]
        fn test_refseq() {
            assert!(RefSeqId::new("NM_001001130").is_ok());
            assert!(RefSeqId::new("XP_039727.2").is_ok());
            assert!(RefSeqId::new("NM001001130").is_err());
            assert!(RefSeqId::new("RefSeq1").is_err());
        }

        #[test]
        fn test_genbank_accession() {
            assert!(GenBankAccession::new("AC087559").is_ok());
            assert!(GenBankAccession::new("U58105").is_ok());
            assert!(GenBankAccession::new("BC052055.1").is_ok());
            assert!(GenBankAccession::new("not-an-accession").is_err());
        }

        #[test]
        fn test_uniprot_accession() {
            assert!(UniProtAccession::new("P12345").is_ok());
            assert!(UniProtAccession::new("Q9CQV8").is_ok());
            assert!(UniProtAccession::new("A0A087WPF7").is_ok());
            assert!(UniProtAccession::new("12345P").is_err());
        }

        #[test]
        fn test_ensembl_and_vega() {
            assert!(EnsemblId::new("ENSMUST00000082908").is_ok());
            assert!(EnsemblId::new("ENSMUSP00000095360.2").is_ok());
            assert!(VegaId::new("OTTMUST00000042924").is_ok());
            assert!(EnsemblId::new("OTTMUST00000042924").is_err());
            assert!(VegaId::new("ENSMUST00000082908").is_err());
        }

        #[test]
        fn test_unigene() {
            assert!(UniGeneId::new("Mm.329815").is_ok());
            assert!(UniGeneId::new("Hs.1").is_ok());
            assert!(UniGeneId::new("329815").is_err());
        }

        #[test]
        fn test_kegg_gene() {
            assert!(KeggGeneId::new("aq_001").is_ok());
            assert!(KeggGeneId::new("").is_err());
            assert!(KeggGeneId::new("aq 001").is_err());
        }

        #[test]
        fn test_chromosome() {
            assert!(Chromosome::new("1").is_ok());
            assert!(Chromosome::new("19").is_ok());
            assert!(Chromosome::new("X").is_ok());
            assert!(Chromosome::new("MT").is_ok());
            // The unmapped sentinel is not a constructible chromosome;
            // parsers map it to None before construction
            assert!(Chromosome::new("UN").is_err());
        }

        #[test]
        fn test_value_semantics() {
            let a = RefSeqId::new("NM_011655").unwrap();
            let b = RefSeqId::new(" NM_011655 ").unwrap();
            assert_eq!(a, b);
            assert_eq!(a.as_str(), "NM_011655");
        }
    }
}
