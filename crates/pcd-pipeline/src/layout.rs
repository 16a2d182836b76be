//! On-disk layout of downloaded, extracted and processed releases.
//!
//! ```text
//! files/
//!   zip/<archive>.zip
//!   raw/<release>/...            extracted RF2 entries
//!   processed/<release>/
//!     pcd-defs.json      pcd-defs.json.br
//!     pcd-refSets.json   pcd-refSets.json.br
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineResult;

/// Definitions artifact name.
pub const DEFINITIONS_ARTIFACT: &str = "pcd-defs.json";

/// Named refsets artifact name.
pub const REFSETS_ARTIFACT: &str = "pcd-refSets.json";

/// The three top-level directories under the files root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesLayout {
    /// Downloaded archives.
    pub zip_dir: PathBuf,
    /// Extracted releases.
    pub raw_dir: PathBuf,
    /// Built artifacts, one directory per release.
    pub processed_dir: PathBuf,
}

impl FilesLayout {
    /// Describes the layout under `files_dir` without touching the disk.
    pub fn new<P: AsRef<Path>>(files_dir: P) -> Self {
        let root = files_dir.as_ref();
        Self {
            zip_dir: root.join("zip"),
            raw_dir: root.join("raw"),
            processed_dir: root.join("processed"),
        }
    }

    /// Creates any of the directories that are missing.
    pub fn ensure_dirs(&self) -> PipelineResult<()> {
        for dir in [&self.zip_dir, &self.raw_dir, &self.processed_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Paths for one release.
    pub fn release(&self, name: &str) -> ReleasePaths {
        let processed_dir = self.processed_dir.join(name);
        ReleasePaths {
            name: name.to_string(),
            raw_dir: self.raw_dir.join(name),
            definitions_json: processed_dir.join(DEFINITIONS_ARTIFACT),
            refsets_json: processed_dir.join(REFSETS_ARTIFACT),
            definitions_br: processed_dir.join(format!("{DEFINITIONS_ARTIFACT}.br")),
            refsets_br: processed_dir.join(format!("{REFSETS_ARTIFACT}.br")),
            processed_dir,
        }
    }
}

/// Every path derived from a release name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePaths {
    /// Release name (archive file stem).
    pub name: String,
    /// Extraction target.
    pub raw_dir: PathBuf,
    /// Artifact directory.
    pub processed_dir: PathBuf,
    /// `pcd-defs.json`.
    pub definitions_json: PathBuf,
    /// `pcd-refSets.json`.
    pub refsets_json: PathBuf,
    /// Brotli copy of the definitions.
    pub definitions_br: PathBuf,
    /// Brotli copy of the named refsets.
    pub refsets_br: PathBuf,
}

impl ReleasePaths {
    /// Object key of an artifact, always `/`-separated.
    pub fn object_key(&self, artifact: &str) -> String {
        format!("files/processed/{}/{}", self.name, artifact)
    }

    /// True when both JSON artifacts are on disk.
    pub fn json_artifacts_exist(&self) -> bool {
        self.definitions_json.exists() && self.refsets_json.exists()
    }

    /// True when both compressed artifacts are on disk.
    pub fn compressed_artifacts_exist(&self) -> bool {
        self.definitions_br.exists() && self.refsets_br.exists()
    }

    /// `(object key, compressed file)` for each artifact.
    pub fn publishable(&self) -> [(String, &Path); 2] {
        [
            (self.object_key(DEFINITIONS_ARTIFACT), self.definitions_br.as_path()),
            (self.object_key(REFSETS_ARTIFACT), self.refsets_br.as_path()),
        ]
    }
}

/// Release name from an archive file name: everything before the extension.
pub fn release_name(archive_file: &str) -> &str {
    archive_file
        .rsplit_once('.')
        .map_or(archive_file, |(stem, _)| stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_paths() {
        let layout = FilesLayout::new("files");
        let paths = layout.release("uk_sct2pc_38.0.0_20240417000001Z");

        assert_eq!(
            paths.raw_dir,
            PathBuf::from("files/raw/uk_sct2pc_38.0.0_20240417000001Z")
        );
        assert_eq!(
            paths.definitions_br,
            PathBuf::from("files/processed/uk_sct2pc_38.0.0_20240417000001Z/pcd-defs.json.br")
        );
        assert_eq!(
            paths.object_key(REFSETS_ARTIFACT),
            "files/processed/uk_sct2pc_38.0.0_20240417000001Z/pcd-refSets.json"
        );
    }

    #[test]
    fn test_release_name() {
        assert_eq!(release_name("uk_sct2pc_38.0.0_20240417000001Z.zip"), "uk_sct2pc_38.0.0_20240417000001Z");
        assert_eq!(release_name("plain"), "plain");
    }

    #[test]
    fn test_ensure_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = FilesLayout::new(dir.path());
        layout.ensure_dirs().unwrap();
        assert!(layout.zip_dir.is_dir());
        assert!(layout.raw_dir.is_dir());
        assert!(layout.processed_dir.is_dir());
    }
}
