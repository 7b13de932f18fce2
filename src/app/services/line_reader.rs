//! Line-by-line file source with byte and line provenance
//!
//! This module provides the lazy line source underneath every record reader.
//! Each yielded line carries the byte offset at which it starts and its
//! 1-based line number, so downstream records can report exactly where they
//! came from. Lines matching a configured skip prefix advance the offset and
//! line bookkeeping but are never yielded.

use crate::config::CharacterEncoding;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// One physical line of input with its provenance
///
/// Produced once per line and consumed within a single iteration step;
/// never reused across files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// Line text with the line terminator stripped
    pub text: String,

    /// Byte offset of the first byte of this line within the file
    pub byte_offset: u64,

    /// 1-based physical line number
    pub line_number: u64,
}

/// Forward-only line source over a local file
///
/// The source is not restartable; to resume a previously interrupted scan,
/// construct a new source with [`LineReader::resume`] from persisted offsets.
#[derive(Debug)]
pub struct LineReader {
    reader: BufReader<File>,
    path: PathBuf,
    encoding: CharacterEncoding,
    skip_prefix: Option<String>,
    next_byte_offset: u64,
    next_line_number: u64,
}

impl LineReader {
    /// Open a file for line streaming from its beginning
    pub fn open(
        path: &Path,
        encoding: CharacterEncoding,
        skip_prefix: Option<&str>,
    ) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::io(format!("failed to open '{}'", path.display()), e))?;

        Ok(Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            encoding,
            skip_prefix: skip_prefix.map(str::to_string),
            next_byte_offset: 0,
            next_line_number: 1,
        })
    }

    /// Open a file and resume streaming from a previously recorded position
    ///
    /// `byte_offset` must point at the start of a line and `line_number` must
    /// be that line's 1-based number, both as previously reported in a
    /// [`RawLine`] (or the reader's end-of-scan position).
    pub fn resume(
        path: &Path,
        encoding: CharacterEncoding,
        skip_prefix: Option<&str>,
        byte_offset: u64,
        line_number: u64,
    ) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| Error::io(format!("failed to open '{}'", path.display()), e))?;
        file.seek(SeekFrom::Start(byte_offset)).map_err(|e| {
            Error::io(
                format!(
                    "failed to seek to byte {} in '{}'",
                    byte_offset,
                    path.display()
                ),
                e,
            )
        })?;

        Ok(Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            encoding,
            skip_prefix: skip_prefix.map(str::to_string),
            next_byte_offset: byte_offset,
            next_line_number: line_number,
        })
    }

    /// Produce the next non-skipped line, or `None` at end of file
    pub fn next_line(&mut self) -> Result<Option<RawLine>> {
        loop {
            let byte_offset = self.next_byte_offset;
            let line_number = self.next_line_number;

            let mut bytes = Vec::new();
            let consumed = self.reader.read_until(b'\n', &mut bytes).map_err(|e| {
                Error::io(
                    format!(
                        "failed to read line {} of '{}'",
                        line_number,
                        self.path.display()
                    ),
                    e,
                )
            })?;
            if consumed == 0 {
                return Ok(None);
            }

            // Skipped lines still advance byte and line bookkeeping
            self.next_byte_offset += consumed as u64;
            self.next_line_number += 1;

            if bytes.last() == Some(&b'\n') {
                bytes.pop();
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
            }

            let text = self.encoding.decode(bytes).map_err(|message| {
                Error::encoding(self.path.display().to_string(), line_number, message)
            })?;

            if let Some(prefix) = &self.skip_prefix {
                if text.starts_with(prefix.as_str()) {
                    continue;
                }
            }

            return Ok(Some(RawLine {
                text,
                byte_offset,
                line_number,
            }));
        }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset at which the next unread line starts
    pub fn byte_offset(&self) -> u64 {
        self.next_byte_offset
    }

    /// 1-based number of the next unread line
    pub fn line_number(&self) -> u64 {
        self.next_line_number
    }
}
