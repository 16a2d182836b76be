//! Persistent cache of concepts resolved through the terminology browser.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use pcd_types::{DefinitionTable, SctId, SimpleDefinition};

use crate::artifacts::write_json_pretty;
use crate::error::PipelineResult;

/// `conceptId → SimpleDefinition`, mirrored to a JSON file.
#[derive(Debug, Clone)]
pub struct UnknownCodeCache {
    path: PathBuf,
    entries: DefinitionTable,
}

impl UnknownCodeCache {
    /// Loads the cache at `path`, starting empty if the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            serde_json::from_reader(BufReader::new(File::open(&path)?))?
        } else {
            DefinitionTable::new()
        };
        Ok(Self { path, entries })
    }

    /// Rewrites the backing file with the current entries.
    pub fn save(&self) -> PipelineResult<()> {
        write_json_pretty(&self.path, &self.entries)
    }

    /// Cached definition of a concept.
    pub fn get(&self, concept_id: SctId) -> Option<&SimpleDefinition> {
        self.entries.get(&concept_id)
    }

    /// Adds or replaces an entry in memory; call [`save`](Self::save) to persist.
    pub fn insert(&mut self, concept_id: SctId, definition: SimpleDefinition) {
        self.entries.insert(concept_id, definition);
    }

    /// Number of cached concepts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
