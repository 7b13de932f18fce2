//! Per-format record parsers for the supported databases
//!
//! Each format module supplies three things in the same shape:
//! - a typed record carrying its originating byte offset and line number,
//! - a pure line-parse function over the declared column layout,
//! - a [`FormatSpec`](crate::app::services::record_reader::FormatSpec) and a
//!   reader constructor wiring both into the generic record reader.
//!
//! ## Formats
//!
//! - [`goa`] - GOA GAF 2.x annotation files
//! - [`kegg`] - KEGG gene-ID list files
//! - [`mgi`] - MGI MRK_Sequence.rpt marker report
//! - [`ncbi_taxonomy`] - NCBI taxonomy names.dmp and nodes.dmp dumps
//!
//! Column extraction rules shared by every format live in [`fields`].

pub mod fields;
pub mod goa;
pub mod kegg;
pub mod mgi;
pub mod ncbi_taxonomy;

// Re-export record types for easy access
pub use goa::GafRecord;
pub use kegg::KeggGeneListRecord;
pub use mgi::MrkSequenceRecord;
pub use ncbi_taxonomy::{TaxonomyNameRecord, TaxonomyNodeRecord};
