//! Publishing compressed artifacts to object storage.
//!
//! Production publishes to a Cloudflare R2 bucket through its S3 API; without
//! R2 credentials the objects land in a local directory instead.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region, RequestChecksumCalculation};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::BucketConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::layout::ReleasePaths;

/// Content type of every artifact.
pub const CONTENT_TYPE: &str = "application/json";

/// Content encoding of every artifact body.
pub const CONTENT_ENCODING: &str = "br";

/// One object to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    /// `/`-separated object key.
    pub key: String,
    /// Raw body bytes.
    pub body: Vec<u8>,
    /// `Content-Encoding` header.
    pub content_encoding: String,
    /// `Content-Type` header.
    pub content_type: String,
}

/// Minimal object storage interface.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// True if an object with `key` exists.
    async fn exists(&self, key: &str) -> PipelineResult<bool>;

    /// Stores an object, replacing any previous one.
    async fn put(&self, object: PutObject) -> PipelineResult<()>;
}

/// Headers stored beside each object of a [`LocalObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// `Content-Encoding` header.
    pub content_encoding: String,
    /// `Content-Type` header.
    pub content_type: String,
}

/// Filesystem-backed store: object `a/b/c` lives at `<root>/a/b/c`, with
/// its headers in `<root>/a/b/c.meta.json`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Creates a store rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn object_path(&self, key: &str) -> PipelineResult<PathBuf> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(PipelineError::Publish {
                    key: key.to_string(),
                    reason: "invalid key segment".to_string(),
                });
            }
            path.push(segment);
        }
        Ok(path)
    }

    fn metadata_path(object_path: &Path) -> PathBuf {
        let mut name = object_path.file_name().unwrap_or_default().to_os_string();
        name.push(".meta.json");
        object_path.with_file_name(name)
    }

    /// Reads back the headers of a stored object.
    pub async fn metadata(&self, key: &str) -> PipelineResult<ObjectMetadata> {
        let path = Self::metadata_path(&self.object_path(key)?);
        let raw = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn exists(&self, key: &str) -> PipelineResult<bool> {
        Ok(tokio::fs::try_exists(self.object_path(key)?).await?)
    }

    async fn put(&self, object: PutObject) -> PipelineResult<()> {
        let path = self.object_path(&object.key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let metadata = ObjectMetadata {
            content_encoding: object.content_encoding,
            content_type: object.content_type,
        };
        tokio::fs::write(Self::metadata_path(&path), serde_json::to_vec_pretty(&metadata)?).await?;
        tokio::fs::write(&path, object.body).await?;
        Ok(())
    }
}

/// S3-compatible store backed by a Cloudflare R2 bucket.
#[derive(Debug, Clone)]
pub struct R2ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl R2ObjectStore {
    /// Creates a client for the account and bucket in `config`.
    pub fn new(config: &BucketConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "pcd-pipeline",
        );
        // R2 rejects the flexible checksum headers newer SDKs send by default.
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .endpoint_url(config.endpoint_url())
            .credentials_provider(credentials)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

/// Reads a failed HeadObject: a 404 means the key is free, anything else
/// (no response at all included) is an error.
fn head_says_missing(status: Option<u16>) -> bool {
    status == Some(404)
}

#[async_trait]
impl ObjectStore for R2ObjectStore {
    async fn exists(&self, key: &str) -> PipelineResult<bool> {
        let head = self.client.head_object().bucket(&self.bucket).key(key).send().await;
        match head {
            Ok(_) => Ok(true),
            Err(e) => {
                let status = e.raw_response().map(|response| response.status().as_u16());
                if head_says_missing(status) {
                    debug!("HeadObject {key}: not found");
                    Ok(false)
                } else {
                    Err(PipelineError::Publish {
                        key: key.to_string(),
                        reason: format!("HeadObject failed: {}", DisplayErrorContext(&e)),
                    })
                }
            }
        }
    }

    async fn put(&self, object: PutObject) -> PipelineResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object.key)
            .body(ByteStream::from(object.body))
            .content_encoding(object.content_encoding)
            .content_type(object.content_type)
            .send()
            .await
            .map_err(|e| PipelineError::Publish {
                key: object.key.clone(),
                reason: format!("PutObject failed: {}", DisplayErrorContext(&e)),
            })?;
        Ok(())
    }
}

/// Result of publishing one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The key already existed and was left alone.
    AlreadyPresent,
    /// The object was uploaded.
    Uploaded {
        /// Body size in bytes.
        bytes: usize,
    },
}

/// Uploads the brotli file at `path` under `key` unless the key exists.
pub async fn publish_artifact<S: ObjectStore + ?Sized>(
    store: &S,
    key: &str,
    path: &Path,
) -> PipelineResult<PublishOutcome> {
    if store.exists(key).await? {
        info!("{key} already exists in the bucket, skipping upload");
        return Ok(PublishOutcome::AlreadyPresent);
    }

    let body = tokio::fs::read(path).await?;
    let bytes = body.len();
    store
        .put(PutObject {
            key: key.to_string(),
            body,
            content_encoding: CONTENT_ENCODING.to_string(),
            content_type: CONTENT_TYPE.to_string(),
        })
        .await?;
    info!("Uploaded {key} ({})", pcd_loader::format_bytes(bytes));
    Ok(PublishOutcome::Uploaded { bytes })
}

/// Publishes both compressed artifacts of a release.
pub async fn publish_release<S: ObjectStore + ?Sized>(
    store: &S,
    paths: &ReleasePaths,
) -> PipelineResult<Vec<(String, PublishOutcome)>> {
    let mut outcomes = Vec::new();
    for (key, path) in paths.publishable() {
        let outcome = publish_artifact(store, &key, path).await?;
        outcomes.push((key, outcome));
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FilesLayout;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory bucket answering HeadObject with 200, 404 or a fixed error
    /// status, and logging every request.
    #[derive(Default)]
    struct FakeBucket {
        objects: Mutex<HashMap<String, PutObject>>,
        failing_head: HashMap<String, u16>,
        requests: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStore for FakeBucket {
        async fn exists(&self, key: &str) -> PipelineResult<bool> {
            self.requests.lock().unwrap().push(format!("HEAD {key}"));
            if let Some(status) = self.failing_head.get(key) {
                return Err(PipelineError::Publish {
                    key: key.to_string(),
                    reason: format!("HeadObject failed: status {status}"),
                });
            }
            let status = if self.objects.lock().unwrap().contains_key(key) { 200 } else { 404 };
            Ok(!head_says_missing(Some(status)))
        }

        async fn put(&self, object: PutObject) -> PipelineResult<()> {
            self.requests.lock().unwrap().push(format!("PUT {}", object.key));
            self.objects.lock().unwrap().insert(object.key.clone(), object);
            Ok(())
        }
    }

    fn compressed_release(root: &Path) -> ReleasePaths {
        let paths = FilesLayout::new(root.join("files")).release("r1");
        std::fs::create_dir_all(&paths.processed_dir).unwrap();
        std::fs::write(&paths.definitions_br, b"defs").unwrap();
        std::fs::write(&paths.refsets_br, b"refsets").unwrap();
        paths
    }

    #[test]
    fn test_only_404_means_missing() {
        assert!(head_says_missing(Some(404)));
        assert!(!head_says_missing(Some(403)));
        assert!(!head_says_missing(Some(500)));
        assert!(!head_says_missing(None));
    }

    #[tokio::test]
    async fn test_missing_key_is_headed_then_put() {
        let dir = tempfile::tempdir().unwrap();
        let paths = compressed_release(dir.path());
        let bucket = FakeBucket::default();

        let outcomes = publish_release(&bucket, &paths).await.unwrap();

        assert_eq!(
            *bucket.requests.lock().unwrap(),
            vec![
                "HEAD files/processed/r1/pcd-defs.json",
                "PUT files/processed/r1/pcd-defs.json",
                "HEAD files/processed/r1/pcd-refSets.json",
                "PUT files/processed/r1/pcd-refSets.json",
            ]
        );
        assert_eq!(outcomes[1].1, PublishOutcome::Uploaded { bytes: 7 });

        let objects = bucket.objects.lock().unwrap();
        let defs = &objects["files/processed/r1/pcd-defs.json"];
        assert_eq!(defs.body, b"defs");
        assert_eq!(defs.content_encoding, "br");
        assert_eq!(defs.content_type, "application/json");
    }

    #[tokio::test]
    async fn test_failed_head_stops_before_put() {
        let dir = tempfile::tempdir().unwrap();
        let paths = compressed_release(dir.path());
        let bucket = FakeBucket {
            failing_head: HashMap::from([("files/processed/r1/pcd-defs.json".to_string(), 403)]),
            ..Default::default()
        };

        let result = publish_release(&bucket, &paths).await;

        assert!(matches!(result, Err(PipelineError::Publish { .. })));
        assert_eq!(
            *bucket.requests.lock().unwrap(),
            vec!["HEAD files/processed/r1/pcd-defs.json"]
        );
    }

    #[tokio::test]
    async fn test_r2_store_targets_the_configured_bucket() {
        let store = R2ObjectStore::new(&BucketConfig {
            account_id: "abc123".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            bucket: "nhs-drug-refset".to_string(),
        });
        assert_eq!(store.bucket, "nhs-drug-refset");
    }

    #[tokio::test]
    async fn test_put_then_exists() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        let key = "files/processed/r1/pcd-defs.json";

        assert!(!store.exists(key).await.unwrap());
        store
            .put(PutObject {
                key: key.to_string(),
                body: b"compressed".to_vec(),
                content_encoding: CONTENT_ENCODING.to_string(),
                content_type: CONTENT_TYPE.to_string(),
            })
            .await
            .unwrap();

        assert!(store.exists(key).await.unwrap());
        let meta = store.metadata(key).await.unwrap();
        assert_eq!(meta.content_encoding, "br");
        assert_eq!(meta.content_type, "application/json");
    }

    #[tokio::test]
    async fn test_invalid_keys_are_rejected() {
        let store = LocalObjectStore::new("bucket");
        assert!(store.exists("files/../secret").await.is_err());
        assert!(store.exists("/absolute").await.is_err());
    }

    #[tokio::test]
    async fn test_publish_release_skips_existing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let paths = compressed_release(dir.path());
        let store = LocalObjectStore::new(dir.path().join("bucket"));

        let first = publish_release(&store, &paths).await.unwrap();
        assert_eq!(first[0].0, "files/processed/r1/pcd-defs.json");
        assert_eq!(first[0].1, PublishOutcome::Uploaded { bytes: 4 });
        assert_eq!(first[1].1, PublishOutcome::Uploaded { bytes: 7 });

        std::fs::write(&paths.definitions_br, b"changed").unwrap();
        let second = publish_release(&store, &paths).await.unwrap();
        assert!(second
            .iter()
            .all(|(_, outcome)| *outcome == PublishOutcome::AlreadyPresent));

        let stored = std::fs::read(dir.path().join("bucket/files/processed/r1/pcd-defs.json")).unwrap();
        assert_eq!(stored, b"defs");
    }
}
