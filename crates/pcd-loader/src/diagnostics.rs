//! Non-fatal content problems found while building the dictionary.
//!
//! None of these stop the pipeline; they are collected so the caller can
//! log them and carry on with partial output.

use pcd_types::SctId;
use thiserror::Error;

/// A content-quality issue in the source data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A refset id has no selectable description and is left out of the
    /// named output.
    #[error("No description for refset with id: {refset_id}")]
    MissingRefsetDefinition {
        /// The unnamed refset.
        refset_id: SctId,
    },

    /// A member concept has no selectable description locally.
    #[error("No description found for concept {concept_id}")]
    MissingConceptDefinition {
        /// The concept without a term.
        concept_id: SctId,
        /// True if the dictionary has an entry for the concept, but it is
        /// empty.
        known: bool,
    },

    /// Two refsets resolved to the same display name; the later one wins.
    #[error("Refsets {previous} and {replacement} are both named '{name}'; keeping {replacement}")]
    NamingCollision {
        /// The shared display name.
        name: String,
        /// Refset id that was overwritten.
        previous: SctId,
        /// Refset id now stored under the name.
        replacement: SctId,
    },
}
