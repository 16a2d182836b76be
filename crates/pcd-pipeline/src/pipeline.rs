//! One end-to-end run: fetch, extract, build, compress, publish, index.
//!
//! Every stage checks whether its output already exists and skips itself if
//! so, which makes reruns after a failure cheap.

use pcd_loader::{discover_release_files, process_release, ConceptDescriptionSet};
use tracing::{info, warn};

use crate::archive::{extract_release, Extraction};
use crate::artifacts::{write_artifacts, write_version_index};
use crate::cache::UnknownCodeCache;
use crate::compress::compress_artifacts;
use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::layout::{release_name, FilesLayout, ReleasePaths};
use crate::lookup::{BrowserLookup, ConceptLookup};
use crate::publish::{publish_release, LocalObjectStore, ObjectStore, PublishOutcome, R2ObjectStore};
use crate::resolver::{Pacer, RandomPacer, ResolveReport, UnknownConceptResolver};
use crate::trud::TrudClient;

/// Counters from building one release's artifacts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Entries in `pcd-defs.json`.
    pub definitions: usize,
    /// Entries in `pcd-refSets.json`.
    pub named_refsets: usize,
    /// Non-fatal issues logged during the build.
    pub diagnostics: usize,
    /// What the resolver did.
    pub resolved: ResolveReport,
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Release that was processed.
    pub release: String,
    /// `None` when the artifacts already existed.
    pub build: Option<BuildReport>,
    /// Objects newly uploaded.
    pub uploaded: usize,
    /// Versions now listed in `routes.json`.
    pub versions: Vec<String>,
}

/// Runs the whole pipeline against TRUD and the terminology browser.
pub async fn run(config: &PipelineConfig) -> PipelineResult<RunSummary> {
    config.check_preconditions()?;

    let layout = FilesLayout::new(&config.files_dir);
    layout.ensure_dirs()?;

    let mut trud = TrudClient::new()?;
    trud.login(&config.email, &config.password).await?;
    let archive = trud.latest_release(config.trud_item).await?;
    let zip_path = trud.download_if_absent(&archive, &layout.zip_dir).await?;

    let paths = layout.release(release_name(&archive.file_name));

    match extract_release(&zip_path, &paths.raw_dir)? {
        Extraction::Skipped => info!("Raw directory for {} already exists, skipping extraction", paths.name),
        Extraction::Extracted(files) => info!("Extracted {} files from {}", files.len(), archive.file_name),
    }

    let build = if paths.json_artifacts_exist() {
        info!("Artifacts for {} already exist, skipping build", paths.name);
        None
    } else {
        let lookup = BrowserLookup::new(&config.browser_edition)?;
        Some(build_artifacts(config, &paths, &lookup, &RandomPacer).await?)
    };

    if compress_artifacts(&paths)? {
        info!("Compressed artifacts for {}", paths.name);
    } else {
        info!("Compressed artifacts for {} already exist", paths.name);
    }

    let store: Box<dyn ObjectStore> = match &config.bucket {
        Some(bucket) => {
            info!("Publishing to R2 bucket {}", bucket.bucket);
            Box::new(R2ObjectStore::new(bucket))
        }
        None => {
            info!("No R2 credentials, publishing to {}", config.publish_dir.display());
            Box::new(LocalObjectStore::new(&config.publish_dir))
        }
    };
    let uploaded = publish_release(store.as_ref(), &paths)
        .await?
        .iter()
        .filter(|(_, outcome)| matches!(outcome, PublishOutcome::Uploaded { .. }))
        .count();

    let versions = write_version_index(&layout.processed_dir, &config.web_dir)?;
    info!("Version index lists {} releases", versions.len());

    Ok(RunSummary {
        release: paths.name,
        build,
        uploaded,
        versions,
    })
}

/// Builds `pcd-defs.json` and `pcd-refSets.json` from an extracted release.
///
/// Loads the seed dictionary, runs the core stages, resolves the member
/// concepts still lacking a term through `lookup`, then writes both files.
pub async fn build_artifacts<L: ConceptLookup, P: Pacer>(
    config: &PipelineConfig,
    paths: &ReleasePaths,
    lookup: &L,
    pacer: &P,
) -> PipelineResult<BuildReport> {
    let files = discover_release_files(&paths.raw_dir)?;
    if let Some(date) = &files.release_date {
        info!("Building release {} ({})", paths.name, date);
    }

    let dictionary = ConceptDescriptionSet::load(&config.definitions_file)?;
    info!(
        "Loaded {} concepts ({} descriptions) from {}",
        dictionary.concept_count(),
        dictionary.description_count(),
        config.definitions_file.display()
    );

    let release = process_release(&files, dictionary)?;
    info!(
        rows = release.refset_stats.rows,
        members = release.refset_stats.inserted,
        refsets = release.summaries.len(),
        "Refset file loaded"
    );
    info!(
        rows = release.description_stats.rows,
        inserted = release.description_stats.inserted,
        superseded = release.description_stats.superseded,
        "Description file merged"
    );
    for diagnostic in &release.diagnostics {
        warn!("{diagnostic}");
    }

    if let Some(path) = &config.merged_definitions_file {
        release.dictionary.save(path)?;
        info!("Merged dictionary written to {}", path.display());
    }

    let mut definitions = release.definitions;
    let mut cache = UnknownCodeCache::load(&config.code_lookup_file)?;
    let resolved = UnknownConceptResolver::new(lookup, pacer)
        .resolve(&release.unresolved, &mut definitions, &mut cache)
        .await?;
    info!(
        "Resolved {} unknown concepts ({} cached, {} remote)",
        release.unresolved.len(),
        resolved.from_cache,
        resolved.from_remote
    );

    write_artifacts(paths, &definitions, &release.named)?;
    info!(
        "Wrote {} definitions and {} named refsets",
        definitions.len(),
        release.named.len()
    );

    Ok(BuildReport {
        definitions: definitions.len(),
        named_refsets: release.named.len(),
        diagnostics: release.diagnostics.len(),
        resolved,
    })
}
