//! Best-term selection.
//!
//! Every concept used by a refset gets exactly one display term, picked by
//! a strict priority cascade over its descriptions:
//!
//! 1. active Fully Specified Name
//! 2. active synonym
//! 3. inactive Fully Specified Name
//! 4. inactive synonym
//!
//! Within the first non-empty tier the most recent description wins; equal
//! effective times fall back to the lowest description id.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use pcd_types::{DefinitionTable, SctId, SimpleDefinition};

use crate::diagnostics::Diagnostic;
use crate::dictionary::{ConceptDescriptionSet, ConceptDescriptions};

/// Priority tier of a description; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TermTier {
    /// Active Fully Specified Name.
    ActiveMain = 1,
    /// Active synonym.
    ActiveSynonym = 2,
    /// Inactive Fully Specified Name.
    InactiveMain = 3,
    /// Inactive synonym.
    InactiveSynonym = 4,
}

impl TermTier {
    /// Classifies a description.
    pub fn of(definition: &SimpleDefinition) -> Self {
        match (definition.is_active, definition.is_main) {
            (true, true) => Self::ActiveMain,
            (true, false) => Self::ActiveSynonym,
            (false, true) => Self::InactiveMain,
            (false, false) => Self::InactiveSynonym,
        }
    }
}

/// Sort key: better tier, then newer, then lower description id.
fn rank(description_id: SctId, definition: &SimpleDefinition) -> (TermTier, Reverse<u32>, SctId) {
    (
        TermTier::of(definition),
        Reverse(definition.effective_time),
        description_id,
    )
}

/// Picks the best description of one concept.
///
/// Returns `None` only if `descriptions` is empty.
pub fn best_definition(descriptions: &ConceptDescriptions) -> Option<&SimpleDefinition> {
    descriptions
        .iter()
        .min_by_key(|(id, definition)| rank(**id, definition))
        .map(|(_, definition)| definition)
}

/// Result of running the selector over a release.
#[derive(Debug, Default)]
pub struct Selection {
    /// Chosen definition per concept.
    pub definitions: DefinitionTable,
    /// Refset ids without any description.
    pub missing_refsets: Vec<SctId>,
    /// Member concepts without any description, in ascending order.
    pub missing_concepts: Vec<SctId>,
    /// One diagnostic per missing refset or concept.
    pub diagnostics: Vec<Diagnostic>,
}

/// Selects a definition for every concept in `concepts`.
///
/// `refset_ids` marks which of those concepts name a refset, so that
/// missing refset names are reported apart from missing member terms.
pub fn select_best_terms(
    dictionary: &ConceptDescriptionSet,
    concepts: &BTreeSet<SctId>,
    refset_ids: &BTreeSet<SctId>,
) -> Selection {
    let mut selection = Selection::default();
    for &concept_id in concepts {
        match dictionary.get(concept_id).and_then(best_definition) {
            Some(definition) => {
                selection.definitions.insert(concept_id, definition.clone());
            }
            None if refset_ids.contains(&concept_id) => {
                selection.missing_refsets.push(concept_id);
                selection
                    .diagnostics
                    .push(Diagnostic::MissingRefsetDefinition { refset_id: concept_id });
            }
            None => {
                selection.missing_concepts.push(concept_id);
                selection.diagnostics.push(Diagnostic::MissingConceptDefinition {
                    concept_id,
                    known: dictionary.contains(concept_id),
                });
            }
        }
    }
    selection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(term: &str, et: u32, active: bool, main: bool) -> SimpleDefinition {
        SimpleDefinition {
            term: term.to_string(),
            effective_time: et,
            is_active: active,
            is_main: main,
        }
    }

    fn descriptions(entries: &[(SctId, SimpleDefinition)]) -> ConceptDescriptions {
        entries.iter().cloned().collect()
    }

    #[test]
    fn test_tier_one_dominates() {
        let descs = descriptions(&[
            (1, def("old fsn", 20100101, true, true)),
            (2, def("new fsn", 20200101, true, true)),
            (3, def("newest synonym", 20230101, true, false)),
            (4, def("newest inactive fsn", 20240101, false, true)),
        ]);
        assert_eq!(best_definition(&descs).unwrap().term, "new fsn");
    }

    #[test]
    fn test_cascade_falls_through_tiers() {
        let synonym_only = descriptions(&[
            (1, def("inactive fsn", 20240101, false, true)),
            (2, def("synonym", 20100101, true, false)),
        ]);
        assert_eq!(best_definition(&synonym_only).unwrap().term, "synonym");

        let inactive_only = descriptions(&[
            (1, def("inactive synonym", 20240101, false, false)),
            (2, def("inactive fsn", 20100101, false, true)),
        ]);
        assert_eq!(best_definition(&inactive_only).unwrap().term, "inactive fsn");

        let last_resort = descriptions(&[(1, def("inactive synonym", 20240101, false, false))]);
        assert_eq!(best_definition(&last_resort).unwrap().term, "inactive synonym");

        assert!(best_definition(&ConceptDescriptions::new()).is_none());
    }

    #[test]
    fn test_ties_go_to_lowest_description_id() {
        let descs = descriptions(&[
            (9, def("nine", 20200101, true, true)),
            (5, def("five", 20200101, true, true)),
        ]);
        assert_eq!(best_definition(&descs).unwrap().term, "five");
    }

    #[test]
    fn test_missing_refsets_and_concepts_are_reported_separately() {
        let seed = r#"{
            "100": {"1": {"t": "Refset", "e": "20200101", "a": 1, "m": 1}},
            "201": {}
        }"#;
        let dict = ConceptDescriptionSet::from_reader(seed.as_bytes()).unwrap();
        let concepts = BTreeSet::from([100, 101, 200, 201]);
        let refsets = BTreeSet::from([100, 101]);

        let selection = select_best_terms(&dict, &concepts, &refsets);

        assert_eq!(selection.definitions.len(), 1);
        assert_eq!(selection.definitions[&100].term, "Refset");
        assert_eq!(selection.missing_refsets, vec![101]);
        assert_eq!(selection.missing_concepts, vec![200, 201]);
        assert!(selection.diagnostics.contains(&Diagnostic::MissingConceptDefinition {
            concept_id: 201,
            known: true,
        }));
        assert!(selection.diagnostics.contains(&Diagnostic::MissingConceptDefinition {
            concept_id: 200,
            known: false,
        }));
    }
}
