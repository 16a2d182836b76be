//! Per-refset membership summaries and the named code-lists built from them.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::serde_format::sctid_list;
use crate::{EffectiveTime, Rf2SimpleRefsetMember, SctId, SimpleDefinition};

/// Final membership of one reference set.
///
/// A concept appears in at most one of the two lists. Both lists are sorted
/// and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefsetSummary {
    /// Concepts whose latest membership row is active.
    #[serde(with = "sctid_list")]
    pub active: Vec<SctId>,
    /// Concepts whose latest membership row is inactive.
    #[serde(with = "sctid_list")]
    pub inactive: Vec<SctId>,
}

impl RefsetSummary {
    /// Builds a summary from the reduced membership rows of one refset.
    ///
    /// A concept referenced by several membership ids takes the flag of the
    /// row with the greatest effective time. Equal effective times go to the
    /// lowest member id.
    pub fn from_members<'a>(members: impl IntoIterator<Item = &'a Rf2SimpleRefsetMember>) -> Self {
        let mut latest: BTreeMap<SctId, (EffectiveTime, Reverse<SctId>, bool)> = BTreeMap::new();
        for member in members {
            let candidate = (member.effective_time, Reverse(member.id), member.active);
            latest
                .entry(member.referenced_component_id)
                .and_modify(|current| {
                    if (candidate.0, candidate.1) > (current.0, current.1) {
                        *current = candidate;
                    }
                })
                .or_insert(candidate);
        }

        let mut summary = Self::default();
        for (concept_id, (_, _, is_active)) in latest {
            if is_active {
                summary.active.push(concept_id);
            } else {
                summary.inactive.push(concept_id);
            }
        }
        summary
    }

    /// Iterates over every concept in the refset, active first.
    pub fn concept_ids(&self) -> impl Iterator<Item = SctId> + '_ {
        self.active.iter().chain(self.inactive.iter()).copied()
    }

    /// Total number of concepts.
    pub fn len(&self) -> usize {
        self.active.len() + self.inactive.len()
    }

    /// Returns true if the refset has no members at all.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.inactive.is_empty()
    }
}

/// Refset summaries keyed by refset id.
pub type RefsetSummaries = BTreeMap<SctId, RefsetSummary>;

/// Refset summaries keyed by the refset's display term (`pcd-refSets.json`).
pub type NamedRefsets = BTreeMap<String, RefsetSummary>;

/// Chosen definitions keyed by concept id (`pcd-defs.json`).
pub type DefinitionTable = BTreeMap<SctId, SimpleDefinition>;
