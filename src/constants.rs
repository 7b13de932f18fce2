//! Application constants for biodata readers
//!
//! This module contains file-format delimiters, sentinel values, and
//! cache-marker naming rules shared across the individual format readers.

use std::path::{Path, PathBuf};

// =============================================================================
// Delimiters and Sentinels
// =============================================================================

/// Primary column delimiter for report-style files (MGI, KEGG, GAF)
pub const TAB: char = '\t';

/// Column delimiter for NCBI taxonomy dump files
pub const DMP_DELIMITER: &str = "\t|\t";

/// Line terminator suffix carried by NCBI taxonomy dump lines
pub const DMP_LINE_TERMINATOR: &str = "\t|";

/// Secondary delimiter for multi-value columns (e.g. RefSeq ID lists)
pub const MULTI_VALUE_DELIMITER: char = '|';

/// Sentinel for an unmapped chromosome in MGI reports; maps to no value
pub const UNKNOWN_CHROMOSOME: &str = "UN";

/// Comment prefix for GAF annotation files
pub const GAF_COMMENT_PREFIX: &str = "!";

/// Namespace prefix carried by the GAF taxon column
pub const GAF_TAXON_PREFIX: &str = "taxon:";

// =============================================================================
// Download Cache Constants
// =============================================================================

/// Extension appended to a downloaded file to mark it complete
pub const READY_MARKER_EXTENSION: &str = "ready";

/// Extension identifying gzip-compressed downloads
pub const GZIP_EXTENSION: &str = "gz";

/// Directory name for the default local working directory
pub const DEFAULT_WORK_DIR_NAME: &str = "biodata-readers";

// =============================================================================
// Helper Functions
// =============================================================================

/// Path of the ready marker adjacent to a downloaded file
pub fn ready_marker_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(".");
    name.push(READY_MARKER_EXTENSION);
    PathBuf::from(name)
}

/// Check whether a downloaded file is gzip-compressed by extension
pub fn is_gzip_path(file: &Path) -> bool {
    file.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(GZIP_EXTENSION))
}

/// Path of the decompressed sibling for a gzip-compressed download
pub fn decompressed_path(file: &Path) -> PathBuf {
    file.with_extension("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_marker_path() {
        assert_eq!(
            ready_marker_path(Path::new("/data/goa_human.gaf.gz")),
            PathBuf::from("/data/goa_human.gaf.gz.ready")
        );
        assert_eq!(
            ready_marker_path(Path::new("MRK_Sequence.rpt")),
            PathBuf::from("MRK_Sequence.rpt.ready")
        );
    }

    #[test]
    fn test_gzip_detection() {
        assert!(is_gzip_path(Path::new("goa_human.gaf.gz")));
        assert!(is_gzip_path(Path::new("goa_human.gaf.GZ")));
        assert!(!is_gzip_path(Path::new("MRK_Sequence.rpt")));
        assert!(!is_gzip_path(Path::new("names.dmp")));
    }

    #[test]
    fn test_decompressed_path() {
        assert_eq!(
            decompressed_path(Path::new("/data/goa_human.gaf.gz")),
            PathBuf::from("/data/goa_human.gaf")
        );
    }
}
