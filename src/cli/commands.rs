//! Command implementations for the biodata readers CLI
//!
//! Wires the download cache gate and the format readers together behind the
//! `fetch` and `parse` subcommands. Records are streamed one at a time;
//! nothing is held in memory beyond the record in flight.

use crate::app::models::TaxonomyId;
use crate::app::services::formats::{goa, kegg, mgi, ncbi_taxonomy};
use crate::app::services::record_reader::{ReadStats, RecordReader};
use crate::app::services::retrieval::{self, HttpFetcher};
use crate::cli::args::{Args, Commands, Dataset, FetchArgs, ParseArgs};
use crate::config::{FetchConfig, HeaderPolicy, default_work_dir};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Run the selected subcommand
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args);

    match args.command {
        Some(Commands::Fetch(fetch)) => run_fetch(fetch),
        Some(Commands::Parse(parse)) => run_parse(parse),
        None => Err(Error::configuration(
            "no command provided; run with --help for usage",
        )),
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("biodata_readers={}", args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("logging initialized at level: {}", args.log_level());
}

fn taxon_set(taxa: &[u32]) -> BTreeSet<TaxonomyId> {
    taxa.iter().copied().map(TaxonomyId::from_u32).collect()
}

fn fetch_config(work_dir: Option<PathBuf>, clean: bool) -> FetchConfig {
    FetchConfig::new(work_dir.unwrap_or_else(default_work_dir)).with_clean(clean)
}

/// Download a dataset into the working directory
fn run_fetch(args: FetchArgs) -> Result<()> {
    let config = fetch_config(args.work_dir, args.clean);
    let fetcher = HttpFetcher::new()?;

    let local = match args.dataset {
        Dataset::Mgi => retrieval::ensure_local(
            &fetcher,
            &mgi::remote_resource(),
            &config.work_dir,
            config.clean,
        )?,
        Dataset::Goa => {
            let (resource, dedicated) =
                goa::select_resource(&taxon_set(&args.taxa), args.annotation_set.into());
            info!(
                location = %resource.location,
                dedicated, "selected GOA annotation file"
            );
            retrieval::ensure_local(&fetcher, &resource, &config.work_dir, config.clean)?
        }
        other => {
            return Err(Error::configuration(format!(
                "dataset '{:?}' has no registered remote source; parse a local file instead",
                other
            )));
        }
    };

    println!("{}", local.display());
    Ok(())
}

/// Parse a dataset and report or emit its records
fn run_parse(args: ParseArgs) -> Result<()> {
    let taxa = taxon_set(&args.taxa);

    let stats = match args.dataset {
        Dataset::Kegg => {
            let input = require_input(args.input, "kegg")?;
            stream_records(kegg::reader(&input)?, args.json, args.limit)?
        }
        Dataset::TaxonomyNames => {
            let input = require_input(args.input, "taxonomy-names")?;
            stream_records(ncbi_taxonomy::names_reader(&input)?, args.json, args.limit)?
        }
        Dataset::TaxonomyNodes => {
            let input = require_input(args.input, "taxonomy-nodes")?;
            stream_records(ncbi_taxonomy::nodes_reader(&input)?, args.json, args.limit)?
        }
        Dataset::Mgi => {
            let policy = if args.strict_header {
                HeaderPolicy::Strict
            } else {
                HeaderPolicy::Lenient
            };
            let reader = match args.input {
                Some(input) => mgi::reader_with_policy(&input, policy)?,
                None => {
                    let config = fetch_config(args.work_dir, args.clean);
                    let fetcher = HttpFetcher::new()?;
                    mgi::download_reader(&fetcher, &config)?
                }
            };
            stream_records(reader, args.json, args.limit)?
        }
        Dataset::Goa => {
            let reader = match args.input {
                Some(input) => goa::reader_for_file(&input, taxa)?,
                None => {
                    let config = fetch_config(args.work_dir, args.clean);
                    let fetcher = HttpFetcher::new()?;
                    goa::record_reader(&fetcher, &config, &taxa, args.annotation_set.into())?
                }
            };
            stream_records(reader, args.json, args.limit)?
        }
    };

    if !args.json {
        println!(
            "{} records parsed ({} filtered, {} header warnings)",
            stats.records_parsed, stats.records_filtered, stats.header_warnings
        );
    }
    Ok(())
}

fn require_input(input: Option<PathBuf>, dataset: &str) -> Result<PathBuf> {
    input.ok_or_else(|| {
        Error::configuration(format!(
            "dataset '{}' has no registered remote source; pass --input",
            dataset
        ))
    })
}

/// Stream records out of a reader, optionally emitting them as JSON lines
fn stream_records<R: Serialize>(
    mut reader: RecordReader<R>,
    json: bool,
    limit: Option<u64>,
) -> Result<ReadStats> {
    info!(
        file = %reader.path().display(),
        format = reader.format_name(),
        "parsing records"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut emitted: u64 = 0;

    while reader.has_next()? {
        if let Some(max) = limit {
            if emitted >= max {
                debug!(limit = max, "record limit reached");
                break;
            }
        }
        let record = reader.next_record()?;
        if json {
            let line = serde_json::to_string(&record).map_err(|e| {
                Error::io(
                    "failed to serialize record",
                    std::io::Error::new(std::io::ErrorKind::InvalidData, e),
                )
            })?;
            writeln!(out, "{}", line)
                .map_err(|e| Error::io("failed to write record to stdout", e))?;
        }
        emitted += 1;
    }

    let stats = reader.stats().clone();
    reader.close();

    info!(
        records = stats.records_parsed,
        filtered = stats.records_filtered,
        header_warnings = stats.header_warnings,
        "parse complete"
    );
    Ok(stats)
}
