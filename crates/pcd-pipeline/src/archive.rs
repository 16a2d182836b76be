//! Selective extraction of the release archive.
//!
//! Only the Full simple refset content files and the Full description files
//! are unpacked; everything else in the archive is ignored.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use regex::Regex;
use zip::ZipArchive;

use crate::error::{PipelineError, PipelineResult};

/// Archive entries matching this are extracted.
pub const ENTRY_PATTERN: &str = r"(?i)full.*content.*refset_simple|full.*sct2_description";

/// Decides which archive entries the pipeline needs.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    pattern: Regex,
}

impl EntryFilter {
    /// Compiles [`ENTRY_PATTERN`].
    pub fn new() -> PipelineResult<Self> {
        let pattern = Regex::new(ENTRY_PATTERN)
            .map_err(|e| PipelineError::Precondition(format!("bad entry pattern: {e}")))?;
        Ok(Self { pattern })
    }

    /// True for entries to extract.
    pub fn is_wanted(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

/// What [`extract_release`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The target directory already existed.
    Skipped,
    /// Files written, by path below the target directory.
    Extracted(Vec<PathBuf>),
}

/// Extracts the wanted entries of `zip_path` into `target_dir`.
///
/// Nothing happens if `target_dir` exists. Entries are unpacked into a
/// sibling `.partial` directory first and moved into place at the end, so an
/// interrupted extraction is retried on the next run.
pub fn extract_release(zip_path: &Path, target_dir: &Path) -> PipelineResult<Extraction> {
    if target_dir.exists() {
        return Ok(Extraction::Skipped);
    }

    let mut partial_name = target_dir.file_name().unwrap_or_default().to_os_string();
    partial_name.push(".partial");
    let partial_dir = target_dir.with_file_name(partial_name);
    if partial_dir.exists() {
        fs::remove_dir_all(&partial_dir)?;
    }
    fs::create_dir_all(&partial_dir)?;

    let filter = EntryFilter::new()?;
    let mut archive = ZipArchive::new(BufReader::new(File::open(zip_path)?))?;
    let mut extracted = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() || !filter.is_wanted(entry.name()) {
            continue;
        }
        let Some(relative) = entry.enclosed_name() else {
            return Err(PipelineError::UnsafeEntry {
                entry: entry.name().to_string(),
            });
        };
        let relative = relative.to_path_buf();

        let out_path = partial_dir.join(&relative);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        extracted.push(relative);
    }

    fs::rename(&partial_dir, target_dir)?;
    Ok(Extraction::Extracted(extracted))
}
