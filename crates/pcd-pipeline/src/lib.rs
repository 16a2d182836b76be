//! # pcd-pipeline
//!
//! Fetches the NHS Primary Care Domain refset release from TRUD, builds the
//! definitions and named refset artifacts with `pcd-loader`, and publishes
//! brotli-compressed copies.
//!
//! Stages run one after another; each one skips itself when its output is
//! already on disk, so a failed run can simply be started again:
//!
//! 1. [`trud`]: log in, find the latest release, download it.
//! 2. [`archive`]: unpack the Full refset and description files.
//! 3. [`pipeline::build_artifacts`]: core stages plus the
//!    [`resolver`] for concepts the dictionary has never seen.
//! 4. [`compress`]: brotli variants of both artifacts.
//! 5. [`publish`]: upload to the R2 bucket (or a local directory) unless
//!    already there.
//! 6. [`artifacts::write_version_index`]: rewrite `routes.json`.

#![warn(missing_docs)]

pub mod archive;
pub mod artifacts;
pub mod cache;
pub mod compress;
pub mod config;
pub mod error;
pub mod layout;
pub mod lookup;
pub mod pipeline;
pub mod publish;
pub mod resolver;
pub mod trud;

pub use cache::UnknownCodeCache;
pub use config::{BucketConfig, PipelineConfig};
pub use error::{LookupError, PipelineError, PipelineResult};
pub use layout::{FilesLayout, ReleasePaths};
pub use lookup::{BrowserLookup, ConceptLookup, RemoteConcept};
pub use pipeline::{build_artifacts, run, BuildReport, RunSummary};
pub use publish::{LocalObjectStore, ObjectStore, R2ObjectStore};
pub use resolver::{Pacer, RandomPacer, UnknownConceptResolver};
pub use trud::TrudClient;
