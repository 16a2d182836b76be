//! Run configuration, read from the environment.
//!
//! A `.env` file in the working directory is honoured (see `main`).

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

/// Default location of the dictionary produced by the sibling SNOMED project.
pub const DEFAULT_DEFINITIONS_FILE: &str = "../nhs-snomed/files/processed/latest/defs.json";

/// TRUD item number of the Primary Care Domain refsets.
pub const DEFAULT_TRUD_ITEM: u32 = 659;

/// Terminology browser edition used for unknown concepts.
pub const DEFAULT_BROWSER_EDITION: &str = "v20230927";

/// Cloudflare R2 bucket the artifacts are published to.
pub const DEFAULT_BUCKET: &str = "nhs-drug-refset";

/// Credentials and target of the R2 bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketConfig {
    /// Cloudflare account id; selects the R2 endpoint.
    pub account_id: String,
    /// R2 access key id.
    pub access_key_id: String,
    /// R2 secret access key.
    pub secret_access_key: String,
    /// Bucket name.
    pub bucket: String,
}

impl BucketConfig {
    /// S3-compatible endpoint of the account.
    pub fn endpoint_url(&self) -> String {
        format!("https://{}.r2.cloudflarestorage.com", self.account_id)
    }
}

/// Everything a run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// TRUD account email.
    pub email: String,
    /// TRUD account password.
    pub password: String,
    /// Root of `zip/`, `raw/` and `processed/`.
    pub files_dir: PathBuf,
    /// Directory receiving `routes.json`.
    pub web_dir: PathBuf,
    /// Seed dictionary of previously seen descriptions.
    pub definitions_file: PathBuf,
    /// Where to write the merged dictionary, if anywhere.
    pub merged_definitions_file: Option<PathBuf>,
    /// Cache of concepts resolved through the browser.
    pub code_lookup_file: PathBuf,
    /// TRUD item to download.
    pub trud_item: u32,
    /// Browser edition segment.
    pub browser_edition: String,
    /// Root of the local object store, used when `bucket` is unset.
    pub publish_dir: PathBuf,
    /// R2 bucket to publish to.
    pub bucket: Option<BucketConfig>,
}

impl PipelineConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> PipelineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `var`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(var: F) -> PipelineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| var(key).filter(|value| !value.trim().is_empty());

        let (Some(email), Some(password)) = (present("email"), present("password")) else {
            return Err(PipelineError::Precondition(
                "TRUD credentials missing: set `email` and `password` (a .env file works)"
                    .to_string(),
            ));
        };

        let files_dir = PathBuf::from(present("PCD_FILES_DIR").unwrap_or_else(|| "files".into()));

        let trud_item = match present("PCD_TRUD_ITEM") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                PipelineError::Precondition(format!("PCD_TRUD_ITEM is not a number: {raw}"))
            })?,
            None => DEFAULT_TRUD_ITEM,
        };

        let bucket = match (
            present("ACCOUNT_ID"),
            present("ACCESS_KEY_ID"),
            present("SECRET_ACCESS_KEY"),
        ) {
            (Some(account_id), Some(access_key_id), Some(secret_access_key)) => Some(BucketConfig {
                account_id,
                access_key_id,
                secret_access_key,
                bucket: present("PCD_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.into()),
            }),
            (None, None, None) => None,
            _ => {
                return Err(PipelineError::Precondition(
                    "R2 credentials incomplete: set all of ACCOUNT_ID, ACCESS_KEY_ID and SECRET_ACCESS_KEY"
                        .to_string(),
                ))
            }
        };

        Ok(Self {
            email,
            password,
            web_dir: present("PCD_WEB_DIR").unwrap_or_else(|| "web".into()).into(),
            definitions_file: present("PCD_DEFINITIONS_FILE")
                .unwrap_or_else(|| DEFAULT_DEFINITIONS_FILE.into())
                .into(),
            merged_definitions_file: present("PCD_MERGED_DEFINITIONS_FILE").map(PathBuf::from),
            code_lookup_file: present("PCD_CODE_LOOKUP_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| files_dir.join("code-lookup.json")),
            trud_item,
            browser_edition: present("PCD_BROWSER_EDITION")
                .unwrap_or_else(|| DEFAULT_BROWSER_EDITION.into()),
            publish_dir: present("PCD_PUBLISH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| files_dir.join("bucket")),
            bucket,
            files_dir,
        })
    }

    /// Fails unless the seed dictionary exists.
    pub fn check_preconditions(&self) -> PipelineResult<()> {
        if !Path::new(&self.definitions_file).is_file() {
            return Err(PipelineError::Precondition(format!(
                "definitions file not found at {}; build the SNOMED dictionary first",
                self.definitions_file.display()
            )));
        }
        Ok(())
    }
}
