//! Integration tests for the download gate and format readers
//!
//! These tests drive the full download-then-parse sequence with an in-memory
//! fetcher double: file selection, ready-marker reuse, clean re-fetching,
//! gzip decompression, and record streaming.

use biodata_readers::app::models::TaxonomyId;
use biodata_readers::app::services::formats::{goa, kegg, mgi};
use biodata_readers::app::services::retrieval::{RemoteFetcher, RemoteResource};
use biodata_readers::config::FetchConfig;
use biodata_readers::{Error, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fetcher double serving canned content by file name
struct FixtureFetcher {
    content_by_name: HashMap<String, Vec<u8>>,
    failing_names: BTreeSet<String>,
    fetched: RefCell<Vec<String>>,
}

impl FixtureFetcher {
    fn new() -> Self {
        Self {
            content_by_name: HashMap::new(),
            failing_names: BTreeSet::new(),
            fetched: RefCell::new(Vec::new()),
        }
    }

    fn with_file(mut self, name: &str, content: &[u8]) -> Self {
        self.content_by_name.insert(name.to_string(), content.to_vec());
        self
    }

    fn with_failing(mut self, name: &str) -> Self {
        self.failing_names.insert(name.to_string());
        self
    }

    fn fetch_count(&self) -> usize {
        self.fetched.borrow().len()
    }

    fn fetched_names(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl RemoteFetcher for FixtureFetcher {
    fn fetch(&self, resource: &RemoteResource, dest_dir: &Path) -> Result<PathBuf> {
        self.fetched.borrow_mut().push(resource.file_name.clone());

        if self.failing_names.contains(&resource.file_name) {
            return Err(Error::transport(
                &resource.location,
                "fixture marked unavailable",
                None,
            ));
        }
        let content = self.content_by_name.get(&resource.file_name).ok_or_else(|| {
            Error::transport(&resource.location, "no fixture registered", None)
        })?;

        let target = dest_dir.join(&resource.file_name);
        std::fs::write(&target, content).unwrap();
        Ok(target)
    }
}

fn gzip(content: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn gaf_line(taxon: u32) -> String {
    format!(
        "UniProtKB\tQ4V8C5\tTmx2\tenables\tGO:0005515\tPMID:21873635\tIPI\t\
         \tF\t\tTmx2|Txndc14\tprotein\ttaxon:{}\t20060208\tUniProt\t\t",
        taxon
    )
}

fn human_gaf_content() -> String {
    format!(
        "!gaf-version: 2.1\n{}\n{}\n{}\n",
        gaf_line(9606),
        gaf_line(9606),
        gaf_line(10090)
    )
}

fn taxa(ids: &[u32]) -> BTreeSet<TaxonomyId> {
    ids.iter().map(|&id| TaxonomyId::from_u32(id)).collect()
}

#[test]
fn test_goa_single_taxon_downloads_dedicated_file() {
    let work_dir = TempDir::new().unwrap();
    let config = FetchConfig::new(work_dir.path());
    let fetcher =
        FixtureFetcher::new().with_file("goa_human.gaf.gz", &gzip(&human_gaf_content()));

    let mut reader = goa::record_reader(
        &fetcher,
        &config,
        &taxa(&[9606]),
        goa::AnnotationType::Canonical,
    )
    .unwrap();

    assert_eq!(fetcher.fetched_names(), vec!["goa_human.gaf.gz".to_string()]);

    let mut records = Vec::new();
    while reader.has_next().unwrap() {
        records.push(reader.next_record().unwrap());
    }
    reader.close();

    // The mouse annotation in the file is filtered out
    assert_eq!(records.len(), 2);
    for record in &records {
        assert!(record.taxon_ids.contains(&TaxonomyId::from_u32(9606)));
    }
}

#[test]
fn test_goa_rerun_reuses_completed_download() {
    let work_dir = TempDir::new().unwrap();
    let config = FetchConfig::new(work_dir.path());
    let fetcher =
        FixtureFetcher::new().with_file("goa_human.gaf.gz", &gzip(&human_gaf_content()));
    let requested = taxa(&[9606]);

    for _ in 0..3 {
        let reader = goa::record_reader(
            &fetcher,
            &config,
            &requested,
            goa::AnnotationType::Canonical,
        )
        .unwrap();
        let count = reader.filter_map(|r| r.ok()).count();
        assert_eq!(count, 2);
    }

    // One fetch total across three runs
    assert_eq!(fetcher.fetch_count(), 1);
}

#[test]
fn test_goa_clean_forces_refetch() {
    let work_dir = TempDir::new().unwrap();
    let fetcher =
        FixtureFetcher::new().with_file("goa_human.gaf.gz", &gzip(&human_gaf_content()));
    let requested = taxa(&[9606]);

    let config = FetchConfig::new(work_dir.path());
    goa::record_reader(&fetcher, &config, &requested, goa::AnnotationType::Canonical).unwrap();

    let clean_config = FetchConfig::new(work_dir.path()).with_clean(true);
    goa::record_reader(
        &fetcher,
        &clean_config,
        &requested,
        goa::AnnotationType::Canonical,
    )
    .unwrap();

    assert_eq!(fetcher.fetch_count(), 2);
}

#[test]
fn test_goa_multiple_taxa_download_combined_file() {
    let work_dir = TempDir::new().unwrap();
    let config = FetchConfig::new(work_dir.path());
    let combined = format!(
        "!gaf-version: 2.1\n{}\n{}\n{}\n",
        gaf_line(9606),
        gaf_line(10090),
        gaf_line(7227)
    );
    let fetcher = FixtureFetcher::new().with_file("goa_uniprot_all.gaf.gz", &gzip(&combined));

    let reader = goa::record_reader(
        &fetcher,
        &config,
        &taxa(&[9606, 10090]),
        goa::AnnotationType::Canonical,
    )
    .unwrap();

    assert_eq!(
        fetcher.fetched_names(),
        vec!["goa_uniprot_all.gaf.gz".to_string()]
    );

    // The fly annotation is filtered; both requested taxa survive
    let records: Vec<_> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
}

#[test]
fn test_goa_dedicated_failure_falls_back_to_combined() {
    let work_dir = TempDir::new().unwrap();
    let config = FetchConfig::new(work_dir.path());
    let fetcher = FixtureFetcher::new()
        .with_failing("goa_zebrafish.gaf.gz")
        .with_file(
            "goa_uniprot_all.gaf.gz",
            &gzip(&format!("!gaf-version: 2.1\n{}\n", gaf_line(7955))),
        );

    let reader = goa::record_reader(
        &fetcher,
        &config,
        &taxa(&[7955]),
        goa::AnnotationType::Canonical,
    )
    .unwrap();

    assert_eq!(
        fetcher.fetched_names(),
        vec![
            "goa_zebrafish.gaf.gz".to_string(),
            "goa_uniprot_all.gaf.gz".to_string()
        ]
    );
    let records: Vec<_> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 1);
}

#[test]
fn test_mgi_download_then_parse() {
    let header = mgi::EXPECTED_HEADER;
    let row = "MGI:1918911\t0610005C13Rik\tO\tGene\tRIKEN cDNA 0610005C13 gene\tsyntenic\t7\
               \t45567793\t45575327\t-\tAK002809\tNM_001001130\t\t\t\t\t\t\tNP_001001130\tMm.329815";
    let report = format!("{}\n{}\n", header, row);

    let work_dir = TempDir::new().unwrap();
    let config = FetchConfig::new(work_dir.path());
    let fetcher = FixtureFetcher::new().with_file("MRK_Sequence.rpt", report.as_bytes());

    let mut reader = mgi::download_reader(&fetcher, &config).unwrap();
    let record = reader.next_record().unwrap();
    assert_eq!(record.mgi_accession_id.as_str(), "MGI:1918911");
    assert!(!reader.has_next().unwrap());
    assert_eq!(reader.stats().header_warnings, 0);
    reader.close();

    // A second run reuses the marker-completed download
    let mut again = mgi::download_reader(&fetcher, &config).unwrap();
    assert!(again.has_next().unwrap());
    again.close();
    assert_eq!(fetcher.fetch_count(), 1);
}

#[test]
fn test_kegg_records_preserve_input_order_without_loss() {
    let work_dir = TempDir::new().unwrap();
    let list_path = work_dir.path().join("KEGG_aae_ncbi-geneid.list");
    let mut content = String::new();
    for i in 0..50 {
        content.push_str(&format!("aae:aq_{0:03}\tncbi-geneid:{1}\n", i, 1192533 + i));
    }
    std::fs::write(&list_path, &content).unwrap();

    let reader = kegg::reader(&list_path).unwrap();
    let records: Vec<_> = reader.map(|r| r.unwrap()).collect();

    // No loss, no duplication, strictly increasing line numbers
    assert_eq!(records.len(), 50);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.line_number, (i + 1) as u64);
        assert_eq!(record.kegg_gene_id.as_str(), format!("aq_{:03}", i));
    }
}
