//! Download-if-missing cache gate for remote database files
//!
//! Before any file is parsed it passes through this gate: a previously
//! completed download is reused without touching the network, a missing or
//! partial download is (re-)fetched, and a `clean` request discards any
//! cached copy first. Completion is recorded as a zero-content ready marker
//! written next to the downloaded file only after the fetch has finished;
//! the marker's existence is the only signal consulted.
//!
//! The gate is not safe under concurrent multi-process invocation of the
//! same target path; there is at most one writer per target in practice.

use crate::constants::{decompressed_path, is_gzip_path, ready_marker_path};
use crate::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Location of a remote database file and its local name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResource {
    /// Full remote location (URL), treated as opaque by the gate
    pub location: String,

    /// File name the local copy is stored under
    pub file_name: String,
}

impl RemoteResource {
    pub fn new(location: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            file_name: file_name.into(),
        }
    }
}

/// Remote file transport collaborator
///
/// `fetch` stores the resource under its `file_name` inside `dest_dir` and
/// returns the stored path. Retries and backoff, if any, are the
/// implementation's responsibility; the gate performs none.
pub trait RemoteFetcher {
    fn fetch(&self, resource: &RemoteResource, dest_dir: &Path) -> Result<PathBuf>;
}

/// Blocking HTTP(S) fetcher for database mirrors
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("biodata_readers/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                Error::transport("http client", "failed to build HTTP client", Some(e))
            })?;
        Ok(Self { client })
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(&self, resource: &RemoteResource, dest_dir: &Path) -> Result<PathBuf> {
        info!(location = %resource.location, "fetching remote file");

        let response = self
            .client
            .get(&resource.location)
            .send()?
            .error_for_status()
            .map_err(|e| {
                Error::transport(
                    &resource.location,
                    "remote returned an error status",
                    Some(e),
                )
            })?;

        let target = dest_dir.join(&resource.file_name);
        let mut file = File::create(&target)
            .map_err(|e| Error::io(format!("failed to create '{}'", target.display()), e))?;
        let mut body = response;
        io::copy(&mut body, &mut file).map_err(|e| {
            Error::io(
                format!("failed to store download at '{}'", target.display()),
                e,
            )
        })?;

        Ok(target)
    }
}

/// Resolve a remote resource to a complete, parseable local file
///
/// Decision order:
/// - `clean` discards the local copy, its marker, and any decompressed
///   sibling, then always fetches;
/// - an existing ready marker plus an existing target reuses the local copy
///   without contacting the remote source;
/// - otherwise the resource is fetched and the marker written once the fetch
///   has completed. A file without a marker is treated as a partial download
///   from an interrupted prior run and re-fetched.
///
/// Gzip-compressed downloads are decompressed next to the archive; the
/// decompressed path is returned for those.
pub fn ensure_local(
    fetcher: &dyn RemoteFetcher,
    resource: &RemoteResource,
    work_dir: &Path,
    clean: bool,
) -> Result<PathBuf> {
    let target = work_dir.join(&resource.file_name);
    let marker = ready_marker_path(&target);

    if clean {
        info!(file = %target.display(), "clean requested; discarding any cached copy");
        remove_if_present(&target)?;
        remove_if_present(&marker)?;
        if is_gzip_path(&target) {
            remove_if_present(&decompressed_path(&target))?;
        }
    }

    if is_ready(resource, work_dir) {
        debug!(file = %target.display(), "ready marker present; reusing local copy");
    } else {
        fs::create_dir_all(work_dir).map_err(|e| {
            Error::io(
                format!("failed to create work directory '{}'", work_dir.display()),
                e,
            )
        })?;

        let fetched = fetcher.fetch(resource, work_dir)?;
        if fetched != target {
            return Err(Error::configuration(format!(
                "fetch collaborator stored '{}' instead of '{}'",
                fetched.display(),
                target.display()
            )));
        }

        // Written only after the fetch completed; absence on a later run is
        // evidence of an interrupted download and forces a re-fetch
        fs::write(&marker, b"").map_err(|e| {
            Error::io(
                format!("failed to write ready marker '{}'", marker.display()),
                e,
            )
        })?;
        info!(file = %target.display(), "download complete");
    }

    if is_gzip_path(&target) {
        let plain = decompressed_path(&target);
        if !plain.exists() {
            decompress_gzip(&target, &plain)?;
        }
        return Ok(plain);
    }
    Ok(target)
}

/// True when a resource has a complete prior download in `work_dir`
///
/// Both the file and its ready marker must exist; a file without a marker
/// counts as incomplete.
pub fn is_ready(resource: &RemoteResource, work_dir: &Path) -> bool {
    let target = work_dir.join(&resource.file_name);
    target.exists() && ready_marker_path(&target).exists()
}

/// Decompress a gzip archive into `dest`
pub fn decompress_gzip(archive: &Path, dest: &Path) -> Result<()> {
    debug!(archive = %archive.display(), "decompressing gzip download");

    let file = File::open(archive)
        .map_err(|e| Error::io(format!("failed to open '{}'", archive.display()), e))?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut out = File::create(dest)
        .map_err(|e| Error::io(format!("failed to create '{}'", dest.display()), e))?;
    io::copy(&mut decoder, &mut out).map_err(|e| {
        Error::io(format!("failed to decompress '{}'", archive.display()), e)
    })?;
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(format!("failed to remove '{}'", path.display()), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::io::Write;
    use tempfile::TempDir;

    /// Fetcher double that counts invocations and writes fixed content
    struct CountingFetcher {
        calls: Cell<usize>,
        content: RefCell<Vec<u8>>,
        fail: Cell<bool>,
    }

    impl CountingFetcher {
        fn with_content(content: &[u8]) -> Self {
            Self {
                calls: Cell::new(0),
                content: RefCell::new(content.to_vec()),
                fail: Cell::new(false),
            }
        }
    }

    impl RemoteFetcher for CountingFetcher {
        fn fetch(&self, resource: &RemoteResource, dest_dir: &Path) -> Result<PathBuf> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(Error::transport(
                    &resource.location,
                    "simulated connectivity failure",
                    None,
                ));
            }
            let target = dest_dir.join(&resource.file_name);
            fs::write(&target, &*self.content.borrow()).unwrap();
            Ok(target)
        }
    }

    fn sample_resource() -> RemoteResource {
        RemoteResource::new("https://example.org/reports/sample.rpt", "sample.rpt")
    }

    #[test]
    fn test_first_run_fetches_and_writes_marker() {
        let work_dir = TempDir::new().unwrap();
        let fetcher = CountingFetcher::with_content(b"record data\n");

        let local =
            ensure_local(&fetcher, &sample_resource(), work_dir.path(), false).unwrap();

        assert_eq!(fetcher.calls.get(), 1);
        assert_eq!(local, work_dir.path().join("sample.rpt"));
        assert!(ready_marker_path(&local).exists());
        assert!(is_ready(&sample_resource(), work_dir.path()));
    }

    #[test]
    fn test_completed_copy_is_reused_without_fetching() {
        let work_dir = TempDir::new().unwrap();
        let fetcher = CountingFetcher::with_content(b"record data\n");
        let resource = sample_resource();

        ensure_local(&fetcher, &resource, work_dir.path(), false).unwrap();
        ensure_local(&fetcher, &resource, work_dir.path(), false).unwrap();
        ensure_local(&fetcher, &resource, work_dir.path(), false).unwrap();

        assert_eq!(fetcher.calls.get(), 1);
    }

    #[test]
    fn test_clean_always_fetches_once() {
        let work_dir = TempDir::new().unwrap();
        let fetcher = CountingFetcher::with_content(b"record data\n");
        let resource = sample_resource();

        ensure_local(&fetcher, &resource, work_dir.path(), false).unwrap();
        ensure_local(&fetcher, &resource, work_dir.path(), true).unwrap();
        assert_eq!(fetcher.calls.get(), 2);

        // Clean fetches exactly once even with no prior marker state
        let fresh_dir = TempDir::new().unwrap();
        let fresh_fetcher = CountingFetcher::with_content(b"record data\n");
        ensure_local(&fresh_fetcher, &resource, fresh_dir.path(), true).unwrap();
        assert_eq!(fresh_fetcher.calls.get(), 1);
    }

    #[test]
    fn test_missing_marker_forces_refetch() {
        let work_dir = TempDir::new().unwrap();
        let fetcher = CountingFetcher::with_content(b"record data\n");
        let resource = sample_resource();

        // Simulate an interrupted prior run: file present, marker absent
        let target = work_dir.path().join(&resource.file_name);
        let mut partial = File::create(&target).unwrap();
        partial.write_all(b"truncated").unwrap();

        let local = ensure_local(&fetcher, &resource, work_dir.path(), false).unwrap();
        assert_eq!(fetcher.calls.get(), 1);
        assert_eq!(fs::read(&local).unwrap(), b"record data\n");
    }

    #[test]
    fn test_failed_fetch_leaves_no_marker() {
        let work_dir = TempDir::new().unwrap();
        let fetcher = CountingFetcher::with_content(b"");
        fetcher.fail.set(true);
        let resource = sample_resource();

        let result = ensure_local(&fetcher, &resource, work_dir.path(), false);
        assert!(matches!(result.unwrap_err(), Error::Transport { .. }));
        assert!(!ready_marker_path(&work_dir.path().join(&resource.file_name)).exists());
    }

    #[test]
    fn test_gzip_download_is_decompressed() {
        use flate2::Compression;
        use flate2::write::GzEncoder;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"line one\nline two\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let work_dir = TempDir::new().unwrap();
        let fetcher = CountingFetcher::with_content(&compressed);
        let resource =
            RemoteResource::new("https://example.org/goa/goa_human.gaf.gz", "goa_human.gaf.gz");

        let local = ensure_local(&fetcher, &resource, work_dir.path(), false).unwrap();
        assert_eq!(local, work_dir.path().join("goa_human.gaf"));
        assert_eq!(fs::read(&local).unwrap(), b"line one\nline two\n");

        // Reuse keeps both the archive marker and the decompressed sibling
        let again = ensure_local(&fetcher, &resource, work_dir.path(), false).unwrap();
        assert_eq!(again, local);
        assert_eq!(fetcher.calls.get(), 1);
    }
}
