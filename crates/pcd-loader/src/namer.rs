//! Names each refset after its own preferred term.

use pcd_types::{DefinitionTable, NamedRefsets, RefsetSummaries, SctId};
use std::collections::BTreeMap;

use crate::diagnostics::Diagnostic;

/// Named code-lists plus the collisions met while naming them.
#[derive(Debug, Default)]
pub struct Naming {
    /// Display name → summary.
    pub named: NamedRefsets,
    /// Refset id that ended up under each name.
    pub owners: BTreeMap<String, SctId>,
    /// One entry per overwritten name.
    pub collisions: Vec<Diagnostic>,
}

/// Keys every summary by the term chosen for its refset id.
///
/// Refsets are visited in ascending id order; when two share a term the
/// later one replaces the earlier one and a [`Diagnostic::NamingCollision`]
/// is recorded. Refsets without a definition are skipped (the selector
/// already reported them).
pub fn name_refsets(summaries: &RefsetSummaries, definitions: &DefinitionTable) -> Naming {
    let mut naming = Naming::default();

    for (refset_id, summary) in summaries {
        let Some(definition) = definitions.get(refset_id) else {
            continue;
        };
        let name = definition.term.clone();

        if let Some(previous) = naming.owners.insert(name.clone(), *refset_id) {
            naming.collisions.push(Diagnostic::NamingCollision {
                name: name.clone(),
                previous,
                replacement: *refset_id,
            });
        }
        naming.named.insert(name, summary.clone());
    }

    naming
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcd_types::{RefsetSummary, SimpleDefinition};

    fn def(term: &str) -> SimpleDefinition {
        SimpleDefinition {
            term: term.to_string(),
            effective_time: 20200101,
            is_active: true,
            is_main: true,
        }
    }

    fn active(concept_id: SctId) -> RefsetSummary {
        RefsetSummary {
            active: vec![concept_id],
            inactive: vec![],
        }
    }

    #[test]
    fn test_refsets_are_keyed_by_term() {
        let summaries = RefsetSummaries::from([(1, active(10))]);
        let definitions = DefinitionTable::from([(1, def("Asthma codes"))]);

        let naming = name_refsets(&summaries, &definitions);

        assert_eq!(naming.named.len(), 1);
        assert_eq!(naming.named["Asthma codes"].active, vec![10]);
        assert!(naming.collisions.is_empty());
    }

    #[test]
    fn test_collision_keeps_last_and_reports_both_ids() {
        let summaries = RefsetSummaries::from([
            (1, active(10)),
            (2, active(20)),
        ]);
        let definitions = DefinitionTable::from([(1, def("Same")), (2, def("Same"))]);

        let naming = name_refsets(&summaries, &definitions);

        assert_eq!(naming.named.len(), 1);
        assert_eq!(naming.named["Same"].active, vec![20]);
        assert_eq!(naming.owners["Same"], 2);
        assert_eq!(
            naming.collisions,
            vec![Diagnostic::NamingCollision {
                name: "Same".to_string(),
                previous: 1,
                replacement: 2,
            }]
        );
    }

    #[test]
    fn test_unnamed_refsets_are_dropped() {
        let summaries = RefsetSummaries::from([(1, active(10))]);
        let naming = name_refsets(&summaries, &DefinitionTable::new());
        assert!(naming.named.is_empty());
        assert!(naming.collisions.is_empty());
    }
}
