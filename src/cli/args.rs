//! Command-line argument definitions for the biodata readers tool
//!
//! This module defines the complete CLI interface using the clap derive API.

use crate::app::services::formats::goa;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the biodata readers tool
///
/// Downloads and parses flat-file biological databases into typed records,
/// optionally emitting them as JSON lines for downstream serialization.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "biodata-readers",
    version,
    about = "Download and parse flat-file biological databases into typed records",
    long_about = "Streams GOA GAF annotation files, NCBI taxonomy dumps, the MGI \
                  MRK_Sequence.rpt marker report, and KEGG gene-ID lists into typed, \
                  validated records. Remote files are downloaded once into a local \
                  working directory and reused on later runs via on-disk ready markers."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug-level diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Log level derived from the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Download a database file into the local working directory
    Fetch(FetchArgs),
    /// Parse a database file and report or emit its records
    Parse(ParseArgs),
}

/// Supported datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    /// GOA GAF annotation file
    Goa,
    /// KEGG gene-ID list file
    Kegg,
    /// MGI MRK_Sequence.rpt marker report
    Mgi,
    /// NCBI taxonomy names.dmp dump
    TaxonomyNames,
    /// NCBI taxonomy nodes.dmp dump
    TaxonomyNodes,
}

/// GOA annotation sets published per species
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnnotationSet {
    Canonical,
    Isoform,
    Complex,
    Rna,
}

impl From<AnnotationSet> for goa::AnnotationType {
    fn from(set: AnnotationSet) -> Self {
        match set {
            AnnotationSet::Canonical => goa::AnnotationType::Canonical,
            AnnotationSet::Isoform => goa::AnnotationType::Isoform,
            AnnotationSet::Complex => goa::AnnotationType::Complex,
            AnnotationSet::Rna => goa::AnnotationType::Rna,
        }
    }
}

/// Arguments for the fetch command
#[derive(Debug, Clone, Parser)]
pub struct FetchArgs {
    /// Dataset to download
    #[arg(value_enum)]
    pub dataset: Dataset,

    /// Local working directory for downloads and ready markers
    ///
    /// Defaults to the platform cache directory.
    #[arg(long, value_name = "PATH")]
    pub work_dir: Option<PathBuf>,

    /// Taxonomy IDs narrowing the GOA download
    ///
    /// Exactly one taxon with a dedicated per-species file downloads that
    /// file; otherwise the combined all-species set is downloaded.
    #[arg(long = "taxon", value_name = "TAXID")]
    pub taxa: Vec<u32>,

    /// GOA annotation set to download
    #[arg(long, value_enum, default_value = "canonical")]
    pub annotation_set: AnnotationSet,

    /// Ignore any cached local copy and re-download
    #[arg(long)]
    pub clean: bool,
}

/// Arguments for the parse command
#[derive(Debug, Clone, Parser)]
pub struct ParseArgs {
    /// Dataset format to parse
    #[arg(value_enum)]
    pub dataset: Dataset,

    /// Local file to parse
    ///
    /// When omitted, datasets with a registered remote source (goa, mgi)
    /// are downloaded into the working directory first.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Local working directory for downloads and ready markers
    #[arg(long, value_name = "PATH")]
    pub work_dir: Option<PathBuf>,

    /// Taxonomy IDs to keep (GOA); records for other taxa are filtered out
    #[arg(long = "taxon", value_name = "TAXID")]
    pub taxa: Vec<u32>,

    /// GOA annotation set to download when no input file is given
    #[arg(long, value_enum, default_value = "canonical")]
    pub annotation_set: AnnotationSet,

    /// Ignore any cached local copy and re-download
    #[arg(long)]
    pub clean: bool,

    /// Emit each record as a JSON line on stdout
    #[arg(long)]
    pub json: bool,

    /// Stop after this many records
    #[arg(long, value_name = "N")]
    pub limit: Option<u64>,

    /// Fail on header drift instead of warning (mgi)
    #[arg(long)]
    pub strict_header: bool,
}
