//! # pcd-loader
//!
//! Builds the Primary Care Domain refset dictionary from SNOMED CT RF2
//! Full files.
//!
//! The crate covers the deterministic part of the pipeline:
//!
//! - [`RefsetTable`] reduces the simple refset file to the latest row per
//!   membership id and summarizes each refset.
//! - [`ConceptDescriptionSet`] merges the description file into a
//!   dictionary that persists across releases.
//! - [`select_best_terms`] picks one term per concept.
//! - [`name_refsets`] keys each refset summary by its own term.
//!
//! [`process_release`] chains all four. Content problems that do not stop
//! the run are returned as [`Diagnostic`] values.

#![warn(missing_docs)]

pub mod description;
pub mod diagnostics;
pub mod dictionary;
pub mod loader;
pub mod namer;
pub mod parser;
pub mod reducer;
pub mod refset;
pub mod release;
pub mod selector;
pub mod types;

pub use diagnostics::Diagnostic;
pub use dictionary::{ConceptDescriptionSet, ConceptDescriptions};
pub use loader::{discover_release_files, format_bytes};
pub use namer::{name_refsets, Naming};
pub use parser::{Fields, Rf2Parser, Rf2Record};
pub use reducer::{upsert_latest, Upsert, Versioned};
pub use refset::RefsetTable;
pub use release::{process_readers, process_release, ProcessedRelease};
pub use selector::{best_definition, select_best_terms, Selection, TermTier};
pub use types::{MergeStats, ReleaseFiles, Rf2Error, Rf2Result};

// Re-export pcd-types for convenience
pub use pcd_types;
