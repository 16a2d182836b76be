//! Simple reference set content parser.
//!
//! Reads the Full `der2_Refset_Simple*` file and reduces it to the latest
//! membership row per member id, then to one [`RefsetSummary`] per refset.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use pcd_types::{EffectiveTime, RefsetSummaries, RefsetSummary, Rf2SimpleRefsetMember, SctId};

use crate::parser::{Fields, Rf2Parser, Rf2Record};
use crate::reducer::{upsert_latest, Upsert, Versioned};
use crate::types::{MergeStats, Rf2Error, Rf2Result};

impl Rf2Record for Rf2SimpleRefsetMember {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "effectiveTime",
        "active",
        "moduleId",
        "refsetId",
        "referencedComponentId",
    ];

    // referencedComponentId
    const KEY_COLUMN: usize = 5;

    fn from_fields(fields: Fields<'_>) -> Rf2Result<Self> {
        Ok(Self {
            id: fields.sctid(0)?,
            effective_time: fields.effective_time(1)?,
            active: fields.flag(2)?,
            module_id: fields.sctid(3)?,
            refset_id: fields.sctid(4)?,
            referenced_component_id: fields.sctid(5)?,
        })
    }
}

impl Versioned for Rf2SimpleRefsetMember {
    fn effective_time(&self) -> EffectiveTime {
        self.effective_time
    }

    fn check_consistent(&self, incoming: &Self) -> Rf2Result<()> {
        if self.referenced_component_id != incoming.referenced_component_id {
            return Err(Rf2Error::DataIntegrity {
                member_id: self.id,
                refset_id: self.refset_id,
                previous: self.referenced_component_id,
                found: incoming.referenced_component_id,
            });
        }
        Ok(())
    }
}

/// Latest membership rows, grouped by refset and keyed by member id.
#[derive(Debug, Default)]
pub struct RefsetTable {
    refsets: BTreeMap<SctId, BTreeMap<SctId, Rf2SimpleRefsetMember>>,
}

impl RefsetTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one membership row.
    ///
    /// # Errors
    /// [`Rf2Error::DataIntegrity`] if the member id is already known with a
    /// different referenced concept.
    pub fn ingest(&mut self, member: Rf2SimpleRefsetMember) -> Rf2Result<Upsert> {
        let members = self.refsets.entry(member.refset_id).or_default();
        upsert_latest(members, member.id, member)
    }

    /// Merges every row of a simple refset file.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Rf2Result<MergeStats> {
        let parser = Rf2Parser::<_, Rf2SimpleRefsetMember>::from_path(path)?;
        self.load_rows(parser)
    }

    /// Merges every row read from `reader` (header included).
    pub fn load_reader<R: Read>(&mut self, reader: R) -> Rf2Result<MergeStats> {
        let parser = Rf2Parser::<_, Rf2SimpleRefsetMember>::from_reader(reader)?;
        self.load_rows(parser)
    }

    fn load_rows<I>(&mut self, rows: I) -> Rf2Result<MergeStats>
    where
        I: Iterator<Item = Rf2Result<Rf2SimpleRefsetMember>>,
    {
        let mut stats = MergeStats::default();
        for member in rows {
            stats.rows += 1;
            match self.ingest(member?)? {
                Upsert::Inserted => stats.inserted += 1,
                Upsert::Superseded => stats.superseded += 1,
                Upsert::Ignored => stats.ignored += 1,
            }
        }
        Ok(stats)
    }

    /// Returns the latest row for a member id within a refset.
    pub fn get_member(&self, refset_id: SctId, member_id: SctId) -> Option<&Rf2SimpleRefsetMember> {
        self.refsets.get(&refset_id)?.get(&member_id)
    }

    /// Number of distinct refsets.
    pub fn refset_count(&self) -> usize {
        self.refsets.len()
    }

    /// Number of distinct membership ids across all refsets.
    pub fn member_count(&self) -> usize {
        self.refsets.values().map(BTreeMap::len).sum()
    }

    /// Refset ids in ascending order.
    pub fn refset_ids(&self) -> impl Iterator<Item = SctId> + '_ {
        self.refsets.keys().copied()
    }

    /// Every concept that needs a term: refset ids and member concepts.
    pub fn referenced_concepts(&self) -> BTreeSet<SctId> {
        let mut concepts = BTreeSet::new();
        for (refset_id, members) in &self.refsets {
            concepts.insert(*refset_id);
            concepts.extend(members.values().map(|m| m.referenced_component_id));
        }
        concepts
    }

    /// Collapses each refset into its active/inactive concept lists.
    ///
    /// See [`RefsetSummary::from_members`] for concepts reached through more
    /// than one member id.
    pub fn summarize(&self) -> RefsetSummaries {
        self.refsets
            .iter()
            .map(|(refset_id, members)| (*refset_id, RefsetSummary::from_members(members.values())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id\teffectiveTime\tactive\tmoduleId\trefsetId\treferencedComponentId\n";
    const MODULE: &str = "999000011000230102";

    fn table_from(rows: &[(u64, &str, &str, u64, u64)]) -> Rf2Result<RefsetTable> {
        let mut text = HEADER.to_string();
        for (id, et, active, refset, concept) in rows {
            text.push_str(&format!("{id}\t{et}\t{active}\t{MODULE}\t{refset}\t{concept}\r\n"));
        }
        let mut table = RefsetTable::new();
        table.load_reader(text.as_bytes())?;
        Ok(table)
    }

    #[test]
    fn test_refset_row_fields() {
        let table = table_from(&[(11, "20200101", "1", 500, 600)]).unwrap();
        let member = table.get_member(500, 11).unwrap();
        assert_eq!(member.id, 11);
        assert_eq!(member.module_id, 999000011000230102);
        assert_eq!(member.refset_id, 500);
        assert_eq!(member.referenced_component_id, 600);
        assert!(member.active);
    }

    #[test]
    fn test_header_with_byte_order_mark() {
        let text = format!("\u{feff}{HEADER}1\t20200101\t1\t{MODULE}\t500\t600\n");
        let mut table = RefsetTable::new();
        let stats = table.load_reader(text.as_bytes()).unwrap();
        assert_eq!(stats.inserted, 1);
        assert_eq!(table.summarize()[&500].active, vec![600]);
    }

    #[test]
    fn test_repeated_header_and_blank_lines_are_skipped() {
        let text = format!(
            "{HEADER}1\t20200101\t1\t{MODULE}\t500\t600\n\n{HEADER}2\t20200101\t0\t{MODULE}\t500\t601\n"
        );
        let mut table = RefsetTable::new();
        let stats = table.load_reader(text.as_bytes()).unwrap();
        assert_eq!(stats.rows, 2);
        assert_eq!(table.member_count(), 2);
    }

    #[test]
    fn test_latest_effective_time_wins() {
        let table = table_from(&[
            (1, "20200101", "1", 500, 600),
            (1, "20220101", "0", 500, 600),
            (1, "20210101", "1", 500, 600),
        ])
        .unwrap();

        let member = table.get_member(500, 1).unwrap();
        assert_eq!(member.effective_time, 20220101);
        assert!(!member.active);

        let summaries = table.summarize();
        assert_eq!(summaries[&500].active, Vec::<SctId>::new());
        assert_eq!(summaries[&500].inactive, vec![600]);
    }

    #[test]
    fn test_lower_effective_time_never_overrides_active_flag() {
        let table = table_from(&[
            (1, "20220101", "1", 500, 600),
            (1, "20200101", "0", 500, 600),
        ])
        .unwrap();
        assert!(table.get_member(500, 1).unwrap().active);
    }

    #[test]
    fn test_concept_change_is_data_integrity_error() {
        let result = table_from(&[
            (1, "20200101", "1", 500, 600),
            (1, "20210101", "1", 500, 601),
        ]);
        assert!(matches!(
            result,
            Err(Rf2Error::DataIntegrity {
                member_id: 1,
                refset_id: 500,
                previous: 600,
                found: 601,
            })
        ));
    }

    #[test]
    fn test_summaries_are_disjoint_and_cover_all_members() {
        let table = table_from(&[
            (1, "20200101", "1", 500, 600),
            (2, "20200101", "1", 500, 601),
            (2, "20210101", "0", 500, 601),
            (3, "20200101", "0", 500, 602),
            (4, "20200101", "1", 500, 602),
            (5, "20200101", "1", 700, 600),
        ])
        .unwrap();

        let summaries = table.summarize();
        let summary = &summaries[&500];
        // 602: both rows at 20200101, member 3 (inactive) has the lower id.
        assert_eq!(summary.active, vec![600]);
        assert_eq!(summary.inactive, vec![601, 602]);
        assert!(summary.active.iter().all(|id| !summary.inactive.contains(id)));

        let union: BTreeSet<SctId> = summary.concept_ids().collect();
        assert_eq!(union, BTreeSet::from([600, 601, 602]));

        assert_eq!(summaries[&700].active, vec![600]);
        assert_eq!(table.refset_count(), 2);
        assert_eq!(table.member_count(), 5);
    }

    #[test]
    fn test_concept_follows_its_latest_membership_row() {
        let table = table_from(&[
            (1, "20150101", "1", 500, 600),
            (2, "20180101", "1", 500, 600),
            (2, "20200101", "0", 500, 600),
        ])
        .unwrap();

        let summaries = table.summarize();
        assert!(summaries[&500].active.is_empty());
        assert_eq!(summaries[&500].inactive, vec![600]);
    }

    #[test]
    fn test_newer_membership_id_can_reactivate_a_concept() {
        let table = table_from(&[
            (1, "20150101", "1", 500, 600),
            (1, "20180101", "0", 500, 600),
            (2, "20220101", "1", 500, 600),
        ])
        .unwrap();

        assert_eq!(table.summarize()[&500].active, vec![600]);
    }

    #[test]
    fn test_referenced_concepts_include_refset_ids() {
        let table = table_from(&[(1, "20200101", "1", 500, 600)]).unwrap();
        assert_eq!(table.referenced_concepts(), BTreeSet::from([500, 600]));
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let text = format!("{HEADER}1\t20200101\t1\t{MODULE}\t500\t\n2\t20200101\t1\t{MODULE}\t500\t601\n");
        let mut table = RefsetTable::new();
        let stats = table.load_reader(text.as_bytes()).unwrap();
        assert_eq!(stats.rows, 1);
        assert_eq!(table.member_count(), 1);
    }

    #[test]
    fn test_wrong_header_is_rejected() {
        let text = "id\teffectiveTime\tactive\tmoduleId\tconceptId\tlanguageCode\n";
        let mut table = RefsetTable::new();
        assert!(matches!(
            table.load_reader(text.as_bytes()),
            Err(Rf2Error::UnexpectedColumn { position: 4, .. })
        ));
    }
}
