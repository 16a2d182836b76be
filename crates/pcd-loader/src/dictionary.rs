//! Cross-release description dictionary.
//!
//! The dictionary maps concept id → description id → latest known
//! description. It is seeded from a JSON file produced by a previous run
//! (or by the sibling SNOMED dictionary build) and grows with every release
//! merged into it.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use pcd_types::{Rf2Description, SctId, SimpleDefinition};
use serde::{Deserialize, Serialize};

use crate::parser::Rf2Parser;
use crate::reducer::{upsert_latest, Upsert};
use crate::types::{MergeStats, Rf2Error, Rf2Result};

/// Descriptions of one concept, keyed by description id.
pub type ConceptDescriptions = BTreeMap<SctId, SimpleDefinition>;

/// Concept id → description id → latest description.
///
/// Serialized as `{"<conceptId>": {"<descriptionId>": {"t", "e", "a"?, "m"?}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptDescriptionSet {
    concepts: BTreeMap<SctId, ConceptDescriptions>,
}

impl ConceptDescriptionSet {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a dictionary from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Rf2Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Rf2Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Reads a dictionary from JSON.
    pub fn from_reader<R: Read>(reader: R) -> Rf2Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Writes the dictionary as compact JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Rf2Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Merges one description row.
    ///
    /// A known description id is only replaced by a strictly newer row, and
    /// the replacement takes every field (flags included) from that row.
    pub fn merge(&mut self, description: &Rf2Description) -> Rf2Result<Upsert> {
        let descriptions = self.concepts.entry(description.concept_id).or_default();
        upsert_latest(descriptions, description.id, description.to_definition())
    }

    /// Merges every row of a description file.
    pub fn merge_file<P: AsRef<Path>>(&mut self, path: P) -> Rf2Result<MergeStats> {
        let parser = Rf2Parser::<_, Rf2Description>::from_path(path)?;
        self.merge_rows(parser)
    }

    /// Merges every row read from `reader` (header included).
    pub fn merge_reader<R: Read>(&mut self, reader: R) -> Rf2Result<MergeStats> {
        let parser = Rf2Parser::<_, Rf2Description>::from_reader(reader)?;
        self.merge_rows(parser)
    }

    fn merge_rows<I>(&mut self, rows: I) -> Rf2Result<MergeStats>
    where
        I: Iterator<Item = Rf2Result<Rf2Description>>,
    {
        let mut stats = MergeStats::default();
        for description in rows {
            stats.rows += 1;
            match self.merge(&description?)? {
                Upsert::Inserted => stats.inserted += 1,
                Upsert::Superseded => stats.superseded += 1,
                Upsert::Ignored => stats.ignored += 1,
            }
        }
        Ok(stats)
    }

    /// Returns the descriptions known for a concept.
    pub fn get(&self, concept_id: SctId) -> Option<&ConceptDescriptions> {
        self.concepts.get(&concept_id)
    }

    /// Returns true if the concept has an entry (possibly with no descriptions).
    pub fn contains(&self, concept_id: SctId) -> bool {
        self.concepts.contains_key(&concept_id)
    }

    /// Number of concepts in the dictionary.
    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    /// Number of descriptions across all concepts.
    pub fn description_count(&self) -> usize {
        self.concepts.values().map(BTreeMap::len).sum()
    }
}
