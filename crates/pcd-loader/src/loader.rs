//! Release file discovery and loading utilities.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{ReleaseFiles, Rf2Error, Rf2Result};

/// Discovers the two RF2 files the pipeline needs in an extracted release.
///
/// The UK Primary Care Domain archive nests its content under a directory
/// whose name contains `PrimaryCare`; inside it the Full refset content and
/// terminology live at `Full/Refset/Content` and `Full/Terminology`.
pub fn discover_release_files<P: AsRef<Path>>(path: P) -> Rf2Result<ReleaseFiles> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Rf2Error::DirectoryNotFound {
            path: path.display().to_string(),
        });
    }

    let release_dir = find_primary_care_dir(path)?;
    let full_dir = release_dir.join("Full");

    let mut files = ReleaseFiles::new();
    files.simple_refset_file =
        find_file(&full_dir.join("Refset").join("Content"), |name| name.contains("Simple"))?;
    files.description_file =
        find_file(&full_dir.join("Terminology"), |name| name.contains("_Description_"))?;

    if let Some(description) = &files.description_file {
        files.release_date = description
            .file_name()
            .and_then(|name| extract_release_date(&name.to_string_lossy()));
    }

    if !files.has_required_files() {
        return Err(Rf2Error::RequiredFileMissing {
            file_type: files.missing_files().join(", "),
            directory: full_dir.display().to_string(),
        });
    }

    Ok(files)
}

/// Finds the `PrimaryCare` release directory, or `base` itself if it
/// already holds a `Full` directory.
fn find_primary_care_dir(base: &Path) -> Rf2Result<PathBuf> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(base)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() && entry.file_name().to_string_lossy().contains("PrimaryCare") {
            candidates.push(entry.path());
        }
    }
    candidates.sort();

    if let Some(dir) = candidates.into_iter().next() {
        return Ok(dir);
    }
    if base.join("Full").is_dir() {
        return Ok(base.to_path_buf());
    }

    Err(Rf2Error::DirectoryNotFound {
        path: format!("PrimaryCare release directory not found in {}", base.display()),
    })
}

/// Returns the first `.txt` file (by name) in `dir` accepted by `predicate`.
fn find_file(dir: &Path, predicate: impl Fn(&str) -> bool) -> Rf2Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut matches = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let filename = entry.file_name();
        let filename_str = filename.to_string_lossy();
        if filename_str.ends_with(".txt") && predicate(&filename_str) {
            matches.push(entry.path());
        }
    }
    matches.sort();
    Ok(matches.into_iter().next())
}

/// Extracts release date from RF2 filename.
///
/// RF2 files have names like `sct2_Description_UKPCFull-en_GB1000230_20240417.txt`
fn extract_release_date(filename: &str) -> Option<String> {
    let without_ext = filename.trim_end_matches(".txt");
    let parts: Vec<&str> = without_ext.split('_').collect();

    if let Some(&last) = parts.last() {
        if last.len() == 8 && last.chars().all(|c| c.is_ascii_digit()) {
            return Some(last.to_string());
        }
    }

    None
}

/// Formats a byte count as a human-readable string.
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
