//! Error types for the pipeline stages.

use pcd_loader::Rf2Error;
use pcd_types::SctId;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failure of a single remote concept lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    /// Transport or decoding failure.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The browser answered with a non-success status.
    #[error("Unexpected status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body was not a concept.
    #[error("Malformed concept: {0}")]
    Malformed(String),
}

/// Errors that stop a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Something the run depends on is missing before any work starts.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Error from the RF2 loader.
    #[error(transparent)]
    Rf2(#[from] Rf2Error),

    /// A remote concept lookup failed; the resolver aborts the run.
    #[error("Lookup of concept {concept_id} failed: {source}")]
    ExternalLookup {
        /// The concept being resolved.
        concept_id: SctId,
        /// Underlying lookup failure.
        #[source]
        source: LookupError,
    },

    /// Error talking to TRUD.
    #[error("TRUD error: {0}")]
    Trud(String),

    /// HTTP error outside the concept lookup.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error reading the release archive.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An archive entry would be written outside the raw directory.
    #[error("Archive entry escapes the extraction directory: {entry}")]
    UnsafeEntry {
        /// Entry name as stored in the archive.
        entry: String,
    },

    /// Error uploading an artifact.
    #[error("Publish error for {key}: {reason}")]
    Publish {
        /// Object key being written.
        key: String,
        /// What went wrong.
        reason: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
