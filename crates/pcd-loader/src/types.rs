//! Parser-specific types for RF2 file processing.

use std::path::PathBuf;

use pcd_types::SctId;
use thiserror::Error;

/// Errors that can occur while reading and normalizing RF2 files.
#[derive(Error, Debug)]
pub enum Rf2Error {
    /// I/O error reading RF2 file.
    #[error("IO error reading RF2 file: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error reading or writing the description dictionary.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid SCTID format.
    #[error("Invalid SCTID format: {value}")]
    InvalidSctId {
        /// The invalid value that was encountered.
        value: String,
    },

    /// Invalid date format.
    #[error("Invalid date format: {value}")]
    InvalidDate {
        /// The invalid date value.
        value: String,
    },

    /// Invalid boolean value.
    #[error("Invalid boolean value: {value} (expected 0 or 1)")]
    InvalidBoolean {
        /// The invalid boolean value.
        value: String,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Directory not found.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Required file missing from an extracted release.
    #[error("Required RF2 file not found: {file_type} in {directory}")]
    RequiredFileMissing {
        /// The type of file that was missing.
        file_type: String,
        /// The directory that was searched.
        directory: String,
    },

    /// Invalid header - column count mismatch.
    #[error("Invalid header: expected {expected} columns, found {found}")]
    InvalidHeader {
        /// Expected column count.
        expected: usize,
        /// Found column count.
        found: usize,
    },

    /// Unexpected column name.
    #[error("Unexpected column '{found}' at position {position}, expected '{expected}'")]
    UnexpectedColumn {
        /// The column position.
        position: usize,
        /// Expected column name.
        expected: String,
        /// Found column name.
        found: String,
    },

    /// A refset member id was seen with two different referenced components.
    ///
    /// Membership rows are assumed to only ever change their active flag; if
    /// this fires, the input is malformed or the parsing model is wrong.
    #[error(
        "Refset member {member_id} in refset {refset_id} changed concept from {previous} to {found}"
    )]
    DataIntegrity {
        /// The membership row id.
        member_id: SctId,
        /// The refset the row belongs to.
        refset_id: SctId,
        /// Concept id recorded by the earlier row.
        previous: SctId,
        /// Concept id found on the conflicting row.
        found: SctId,
    },
}

/// Result type for RF2 operations.
pub type Rf2Result<T> = Result<T, Rf2Error>;

/// Counters reported after merging a file into a keyed table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Data rows read from the file.
    pub rows: usize,
    /// Rows whose id had not been seen before.
    pub inserted: usize,
    /// Rows that replaced an older version of the same id.
    pub superseded: usize,
    /// Rows that were older than (or as old as) the stored version.
    pub ignored: usize,
}

/// The two RF2 files the pipeline reads from an extracted release.
#[derive(Debug, Clone, Default)]
pub struct ReleaseFiles {
    /// Path to the Full simple refset content file.
    pub simple_refset_file: Option<PathBuf>,
    /// Path to the Full description file.
    pub description_file: Option<PathBuf>,
    /// Release date extracted from the description filename (YYYYMMDD).
    pub release_date: Option<String>,
}

impl ReleaseFiles {
    /// Creates a new empty ReleaseFiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if both required files are present.
    pub fn has_required_files(&self) -> bool {
        self.simple_refset_file.is_some() && self.description_file.is_some()
    }

    /// Returns a list of missing required files.
    pub fn missing_files(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.simple_refset_file.is_none() {
            missing.push("Simple refset");
        }
        if self.description_file.is_none() {
            missing.push("Description");
        }
        missing
    }
}
