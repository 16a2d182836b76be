//! # pcd-types
//!
//! Type definitions for the Primary Care Domain refset dictionary.
//!
//! The raw side mirrors the two SNOMED CT RF2 files the pipeline reads
//! (descriptions and simple refset members). The output side is the compact
//! JSON vocabulary the browser UI consumes: [`SimpleDefinition`] for terms and
//! [`RefsetSummary`] for code-lists.
//!
//! ## Usage
//!
//! ```rust
//! use pcd_types::{RefsetSummary, Rf2SimpleRefsetMember, SimpleDefinition, SctId};
//!
//! let member = Rf2SimpleRefsetMember {
//!     id: 1,
//!     effective_time: 20200101,
//!     active: true,
//!     module_id: 999000011000230102,
//!     refset_id: 999012131000230109,
//!     referenced_component_id: 22298006,
//! };
//! let summary = RefsetSummary::from_members([&member]);
//! assert_eq!(summary.active, vec![22298006]);
//!
//! let def = SimpleDefinition {
//!     term: "Myocardial infarction (disorder)".to_string(),
//!     effective_time: 20020131,
//!     is_active: true,
//!     is_main: true,
//! };
//! let id: SctId = 22298006;
//! # let _ = (def, id);
//! ```

#![warn(missing_docs)]

mod definition;
mod description;
mod enums;
pub mod refset;
mod sctid;
#[allow(missing_docs)]
pub mod serde_format;
mod summary;

// Re-export all public types at crate root
pub use definition::SimpleDefinition;
pub use description::Rf2Description;
pub use enums::DescriptionType;
pub use refset::Rf2SimpleRefsetMember;
pub use sctid::{EffectiveTime, SctId};
pub use summary::{DefinitionTable, NamedRefsets, RefsetSummaries, RefsetSummary};
