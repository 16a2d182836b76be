//! Writing the JSON artifacts and the version index.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pcd_types::{DefinitionTable, NamedRefsets};
use serde::Serialize;

use crate::error::PipelineResult;
use crate::layout::ReleasePaths;

/// Version index file name inside the web directory.
pub const ROUTES_FILE: &str = "routes.json";

/// Writes `value` as indented JSON, going through a temporary file so a
/// crash never leaves a truncated artifact behind.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> PipelineResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let partial = partial_path(path);
    {
        let mut writer = BufWriter::new(File::create(&partial)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    fs::rename(&partial, path)?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Writes `pcd-defs.json` and `pcd-refSets.json` for a release.
pub fn write_artifacts(
    paths: &ReleasePaths,
    definitions: &DefinitionTable,
    named: &NamedRefsets,
) -> PipelineResult<()> {
    write_json_pretty(&paths.definitions_json, definitions)?;
    write_json_pretty(&paths.refsets_json, named)?;
    Ok(())
}

/// Lists the processed release directories, sorted.
pub fn processed_versions(processed_dir: &Path) -> PipelineResult<Vec<String>> {
    let mut versions = Vec::new();
    for entry in fs::read_dir(processed_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == ".gitignore" || !entry.file_type()?.is_dir() {
            continue;
        }
        versions.push(name);
    }
    versions.sort();
    Ok(versions)
}

/// Rewrites `routes.json` in `web_dir` with every processed version.
pub fn write_version_index(processed_dir: &Path, web_dir: &Path) -> PipelineResult<Vec<String>> {
    let versions = processed_versions(processed_dir)?;
    write_json_pretty(&web_dir.join(ROUTES_FILE), &versions)?;
    Ok(versions)
}
