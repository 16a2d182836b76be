//! Turns one extracted release into the definitions table and named
//! code-lists.
//!
//! ```ignore
//! let files = discover_release_files("files/raw/uk_sct2pc_38.0.0_20240417000001Z")?;
//! let dictionary = ConceptDescriptionSet::load("defs.json")?;
//! let release = process_release(&files, dictionary)?;
//!
//! println!("{} refsets named", release.named.len());
//! println!("{} concepts still need a term", release.unresolved.len());
//! ```

use std::collections::BTreeSet;
use std::io::Read;

use pcd_types::{DefinitionTable, NamedRefsets, RefsetSummaries, SctId};

use crate::diagnostics::Diagnostic;
use crate::dictionary::ConceptDescriptionSet;
use crate::namer::name_refsets;
use crate::refset::RefsetTable;
use crate::selector::select_best_terms;
use crate::types::{MergeStats, ReleaseFiles, Rf2Error, Rf2Result};

/// Everything the core stages produce for one release.
#[derive(Debug)]
pub struct ProcessedRelease {
    /// The dictionary after merging this release's descriptions.
    pub dictionary: ConceptDescriptionSet,
    /// Summaries keyed by refset id.
    pub summaries: RefsetSummaries,
    /// Chosen term per concept (`pcd-defs.json`).
    pub definitions: DefinitionTable,
    /// Summaries keyed by refset term (`pcd-refSets.json`).
    pub named: NamedRefsets,
    /// Member concepts (of any refset) that still lack a definition.
    pub unresolved: Vec<SctId>,
    /// Missing terms and naming collisions, in the order found.
    pub diagnostics: Vec<Diagnostic>,
    /// Counters from the refset file.
    pub refset_stats: MergeStats,
    /// Counters from the description file.
    pub description_stats: MergeStats,
}

/// Runs the core stages over the files of one release.
pub fn process_release(
    files: &ReleaseFiles,
    mut dictionary: ConceptDescriptionSet,
) -> Rf2Result<ProcessedRelease> {
    let (Some(refset_file), Some(description_file)) =
        (&files.simple_refset_file, &files.description_file)
    else {
        return Err(Rf2Error::RequiredFileMissing {
            file_type: files.missing_files().join(", "),
            directory: "release".to_string(),
        });
    };

    let mut refsets = RefsetTable::new();
    let refset_stats = refsets.load_file(refset_file)?;
    let description_stats = dictionary.merge_file(description_file)?;

    Ok(assemble(refsets, dictionary, refset_stats, description_stats))
}

/// Runs the core stages over in-memory RF2 content.
pub fn process_readers<A: Read, B: Read>(
    refset_rows: A,
    description_rows: B,
    mut dictionary: ConceptDescriptionSet,
) -> Rf2Result<ProcessedRelease> {
    let mut refsets = RefsetTable::new();
    let refset_stats = refsets.load_reader(refset_rows)?;
    let description_stats = dictionary.merge_reader(description_rows)?;

    Ok(assemble(refsets, dictionary, refset_stats, description_stats))
}

fn assemble(
    refsets: RefsetTable,
    dictionary: ConceptDescriptionSet,
    refset_stats: MergeStats,
    description_stats: MergeStats,
) -> ProcessedRelease {
    let summaries = refsets.summarize();
    let refset_ids: BTreeSet<SctId> = refsets.refset_ids().collect();

    let selection = select_best_terms(&dictionary, &refsets.referenced_concepts(), &refset_ids);
    let naming = name_refsets(&summaries, &selection.definitions);

    let unresolved: Vec<SctId> = summaries
        .values()
        .flat_map(|summary| summary.concept_ids())
        .filter(|id| !selection.definitions.contains_key(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut diagnostics = selection.diagnostics;
    diagnostics.extend(naming.collisions);

    ProcessedRelease {
        dictionary,
        summaries,
        definitions: selection.definitions,
        named: naming.named,
        unresolved,
        diagnostics,
        refset_stats,
        description_stats,
    }
}
