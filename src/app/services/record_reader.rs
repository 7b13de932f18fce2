//! Generic forward-only record reader
//!
//! This module composes a [`LineReader`] with a per-format parse function
//! into a single iterator over typed records. One reader instance owns one
//! private line source and serves one consumer; records come back in input
//! line order with no reordering, duplication, or silent loss beyond the
//! documented skip policies.
//!
//! The reader is parameterized by a [`FormatSpec`] configuration value and a
//! pure parse function rather than by subclassing: a format is its column
//! layout, its expected header, and its skip rule.

use crate::app::services::line_reader::{LineReader, RawLine};
use crate::config::{CharacterEncoding, HeaderPolicy};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Pure per-format parse function: one raw line in, one typed record out.
///
/// Returning `Ok(None)` skips the line (e.g. a record excluded by a taxon
/// filter or a trailing section marker); returning an error aborts the parse.
pub type ParseFn<R> = Box<dyn Fn(&RawLine) -> Result<Option<R>>>;

/// Per-format reader configuration
#[derive(Debug, Clone)]
pub struct FormatSpec {
    /// Short format name used in diagnostics (e.g. "MGI MRK_Sequence")
    pub name: &'static str,

    /// Declared character encoding of the source file
    pub encoding: CharacterEncoding,

    /// Expected verbatim header line, if the format carries one
    pub expected_header: Option<&'static str>,

    /// Prefix marking lines that are structurally not data (e.g. "!")
    pub skip_prefix: Option<&'static str>,

    /// What to do when the header line differs from the expected constant
    pub header_policy: HeaderPolicy,
}

impl FormatSpec {
    pub fn new(name: &'static str, encoding: CharacterEncoding) -> Self {
        Self {
            name,
            encoding,
            expected_header: None,
            skip_prefix: None,
            header_policy: HeaderPolicy::default(),
        }
    }

    pub fn with_header(mut self, header: &'static str) -> Self {
        self.expected_header = Some(header);
        self
    }

    pub fn with_skip_prefix(mut self, prefix: &'static str) -> Self {
        self.skip_prefix = Some(prefix);
        self
    }

    pub fn with_header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.header_policy = policy;
        self
    }
}

/// Counters accumulated over one reader's lifetime
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReadStats {
    /// Data lines handed to the parse function (header and skip-prefix
    /// lines excluded)
    pub lines_read: u64,

    /// Records yielded to the caller
    pub records_parsed: u64,

    /// Lines the parse function declined (filtered or non-record lines)
    pub records_filtered: u64,

    /// Header mismatches recorded under the lenient policy
    pub header_warnings: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Unstarted,
    HeaderChecked,
    Streaming,
    Exhausted,
    Closed,
}

/// Forward-only iterator over typed records from one source file
///
/// State machine: `Unstarted -> HeaderChecked -> Streaming -> Exhausted`,
/// with `Closed` reachable from any state via [`RecordReader::close`].
/// Operating a closed reader, or requesting a record after exhaustion, is a
/// caller programming error distinct from any data error.
pub struct RecordReader<R> {
    spec: FormatSpec,
    parse: ParseFn<R>,
    lines: Option<LineReader>,
    buffered: Option<R>,
    state: ReaderState,
    stats: ReadStats,
    path: PathBuf,
}

impl<R> RecordReader<R> {
    /// Open a reader over a local file
    pub fn open(path: &Path, spec: FormatSpec, parse: ParseFn<R>) -> Result<Self> {
        let lines = LineReader::open(path, spec.encoding, spec.skip_prefix)?;
        debug!(file = %path.display(), format = spec.name, "opened record reader");

        Ok(Self {
            spec,
            parse,
            lines: Some(lines),
            buffered: None,
            state: ReaderState::Unstarted,
            stats: ReadStats::default(),
            path: path.to_path_buf(),
        })
    }

    /// True when at least one more record can be produced
    ///
    /// The first call consumes and validates the header line, if the format
    /// declares one. After exhaustion this returns `false` deterministically
    /// and repeatedly.
    pub fn has_next(&mut self) -> Result<bool> {
        match self.state {
            ReaderState::Closed => {
                return Err(Error::usage(format!(
                    "record reader for '{}' is closed",
                    self.path.display()
                )));
            }
            ReaderState::Exhausted => return Ok(false),
            ReaderState::Unstarted => {
                self.check_header()?;
                self.state = ReaderState::HeaderChecked;
            }
            ReaderState::HeaderChecked | ReaderState::Streaming => {}
        }

        self.fill_buffer()?;
        if self.buffered.is_some() {
            self.state = ReaderState::Streaming;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Return the next record and advance
    pub fn next_record(&mut self) -> Result<R> {
        if !self.has_next()? {
            return Err(Error::usage(format!(
                "no records remain in '{}'",
                self.path.display()
            )));
        }
        self.buffered.take().ok_or_else(|| {
            Error::usage(format!(
                "record buffer for '{}' unexpectedly empty",
                self.path.display()
            ))
        })
    }

    /// Release the underlying line source
    ///
    /// Safe to call from any state, including repeatedly; every subsequent
    /// `has_next`/`next_record` call fails with a usage error.
    pub fn close(&mut self) {
        self.state = ReaderState::Closed;
        self.buffered = None;
        self.lines = None;
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    /// Path of the source file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the format this reader parses
    pub fn format_name(&self) -> &'static str {
        self.spec.name
    }

    fn lines_mut(&mut self) -> Result<&mut LineReader> {
        self.lines.as_mut().ok_or_else(|| {
            Error::usage(format!(
                "line source for '{}' already released",
                self.path.display()
            ))
        })
    }

    /// Consume exactly one header line and compare it verbatim
    fn check_header(&mut self) -> Result<()> {
        let Some(expected) = self.spec.expected_header else {
            return Ok(());
        };
        let path = self.path.display().to_string();

        let header = self.lines_mut()?.next_line()?.ok_or_else(|| {
            Error::format(&path, "file ended before the expected header line")
        })?;

        if header.text != expected {
            match self.spec.header_policy {
                HeaderPolicy::Lenient => {
                    warn!(
                        file = %path,
                        format = self.spec.name,
                        found = %header.text,
                        "unexpected file header; parsing continues against the declared column layout"
                    );
                    self.stats.header_warnings += 1;
                }
                HeaderPolicy::Strict => {
                    return Err(Error::format_at(
                        path,
                        header.line_number,
                        format!(
                            "unexpected file header: expected '{}', found '{}'",
                            expected, header.text
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Buffer the next parsable record, marking exhaustion at end of file
    fn fill_buffer(&mut self) -> Result<()> {
        while self.buffered.is_none() {
            let line = match self.lines_mut()?.next_line()? {
                Some(line) => line,
                None => {
                    self.state = ReaderState::Exhausted;
                    self.lines = None;
                    return Ok(());
                }
            };
            self.stats.lines_read += 1;

            match (self.parse)(&line)? {
                Some(record) => {
                    self.stats.records_parsed += 1;
                    self.buffered = Some(record);
                }
                None => self.stats.records_filtered += 1,
            }
        }
        Ok(())
    }
}

impl<R> Iterator for RecordReader<R> {
    type Item = Result<R>;

    /// Adapter over the `has_next`/`next_record` contract.
    ///
    /// A fatal error is yielded once; the iterator is fused afterwards.
    fn next(&mut self) -> Option<Self::Item> {
        match self.has_next() {
            Ok(true) => Some(self.next_record()),
            Ok(false) => None,
            Err(error) => {
                self.state = ReaderState::Exhausted;
                self.buffered = None;
                self.lines = None;
                Some(Err(error))
            }
        }
    }
}

impl<R> std::fmt::Debug for RecordReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordReader")
            .field("format", &self.spec.name)
            .field("path", &self.path)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish()
    }
}
