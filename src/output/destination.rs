//! Output destinations (local directory, S3, R2, GCS, Azure)

use crate::error::{Error, Phase, Result, ResultExt};
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Where the job output lands
#[derive(Debug, Clone)]
pub struct Destination {
    location: Location,
}

#[derive(Debug, Clone)]
enum Location {
    Local(PathBuf),
    Cloud {
        /// The object store implementation
        store: Arc<dyn ObjectStore>,
        /// Bucket or container name
        bucket: String,
        /// Path prefix within the bucket/container
        prefix: String,
        /// URL scheme (s3, r2, gs, az)
        scheme: String,
    },
}

impl Destination {
    /// Parse a destination URL or path
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `/local/path/`, `./path/` or `file:///path/` - Local filesystem
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.starts_with("s3://") {
            Self::parse_s3(url, false)
        } else if url.starts_with("r2://") {
            Self::parse_s3(url, true)
        } else if url.starts_with("gs://") {
            Self::parse_gcs(url)
        } else if url.starts_with("az://") {
            Self::parse_azure(url)
        } else {
            Ok(Self::parse_local(url))
        }
    }

    /// Parse S3 or R2 URL
    fn parse_s3(url: &str, is_r2: bool) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let (bucket, prefix) = split_bucket(url, scheme)?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(&bucket);

        // AWS_ENDPOINT is read by from_env(); R2 also honours its own variable
        if is_r2 {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .with_phase_context(Phase::Write, || format!("Failed to create {scheme} client"))?;

        Ok(Self::cloud(Arc::new(store), bucket, prefix, scheme))
    }

    /// Parse GCS URL
    fn parse_gcs(url: &str) -> Result<Self> {
        let (bucket, prefix) = split_bucket(url, "gs")?;

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(&bucket)
            .build()
            .phase_context(Phase::Write, "Failed to create GCS client")?;

        Ok(Self::cloud(Arc::new(store), bucket, prefix, "gs"))
    }

    /// Parse Azure Blob URL
    fn parse_azure(url: &str) -> Result<Self> {
        let (container, prefix) = split_bucket(url, "az")?;

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(&container)
            .build()
            .phase_context(Phase::Write, "Failed to create Azure client")?;

        Ok(Self::cloud(Arc::new(store), container, prefix, "az"))
    }

    /// Parse local filesystem path
    fn parse_local(path: &str) -> Self {
        let path = path.strip_prefix("file://").unwrap_or(path);
        Self {
            location: Location::Local(PathBuf::from(path.trim_end_matches('/'))),
        }
    }

    fn cloud(store: Arc<dyn ObjectStore>, bucket: String, prefix: String, scheme: &str) -> Self {
        Self {
            location: Location::Cloud {
                store,
                bucket,
                prefix: prefix.trim_end_matches('/').to_string(),
                scheme: scheme.to_string(),
            },
        }
    }

    /// Check if this is a cloud destination (not local)
    pub fn is_cloud(&self) -> bool {
        matches!(self.location, Location::Cloud { .. })
    }

    /// Get the scheme (s3, r2, gs, az, file)
    pub fn scheme(&self) -> &str {
        match &self.location {
            Location::Local(_) => "file",
            Location::Cloud { scheme, .. } => scheme,
        }
    }

    /// Local directory, if this is a local destination
    pub fn local_path(&self) -> Option<&std::path::Path> {
        match &self.location {
            Location::Local(path) => Some(path),
            Location::Cloud { .. } => None,
        }
    }

    /// Root directory as the query engine addresses it
    ///
    /// R2 is written through DuckDB's S3 support, so `r2://` becomes `s3://`.
    pub fn engine_root(&self) -> String {
        match &self.location {
            Location::Local(path) => path.to_string_lossy().to_string(),
            Location::Cloud {
                bucket,
                prefix,
                scheme,
                ..
            } => {
                let scheme = if scheme == "r2" { "s3" } else { scheme.as_str() };
                if prefix.is_empty() {
                    format!("{scheme}://{bucket}")
                } else {
                    format!("{scheme}://{bucket}/{prefix}")
                }
            }
        }
    }

    /// Remove everything currently at the destination, returning the count of removed entries
    pub async fn clear(&self) -> Result<usize> {
        match &self.location {
            Location::Local(path) => clear_local(path),
            Location::Cloud {
                store,
                bucket,
                prefix,
                scheme,
            } => {
                if prefix.is_empty() {
                    return Err(Error::write(format!(
                        "Refusing to overwrite the root of {scheme}://{bucket}; add a path prefix"
                    )));
                }

                let prefix = ObjectPath::from(prefix.as_str());
                let objects: Vec<ObjectMeta> = store
                    .list(Some(&prefix))
                    .try_collect()
                    .await
                    .with_phase_context(Phase::Write, || format!("Failed to list {prefix}"))?;

                for object in &objects {
                    store
                        .delete(&object.location)
                        .await
                        .with_phase_context(Phase::Write, || {
                            format!("Failed to delete {}", object.location)
                        })?;
                }

                Ok(objects.len())
            }
        }
    }

    /// Make the destination ready to receive files
    pub fn prepare(&self) -> Result<()> {
        if let Location::Local(path) = &self.location {
            std::fs::create_dir_all(path).with_phase_context(Phase::Write, || {
                format!("Failed to create directory {}", path.display())
            })?;
        }
        Ok(())
    }
}

fn clear_local(path: &std::path::Path) -> Result<usize> {
    if path.parent().is_none() {
        return Err(Error::write(format!(
            "Refusing to overwrite filesystem root '{}'",
            path.display()
        )));
    }
    if contains_working_dir(path) {
        return Err(Error::write(format!(
            "Refusing to overwrite '{}', it contains the working directory",
            path.display()
        )));
    }

    let removed = if path.is_dir() {
        std::fs::remove_dir_all(path).map(|()| 1)
    } else if path.exists() {
        std::fs::remove_file(path).map(|()| 1)
    } else {
        Ok(0)
    };

    removed.with_phase_context(Phase::Write, || {
        format!("Failed to remove existing output at {}", path.display())
    })
}

/// Whether `path` is `.`, the working directory, or one of its ancestors
fn contains_working_dir(path: &std::path::Path) -> bool {
    if path
        .components()
        .all(|c| matches!(c, std::path::Component::CurDir))
    {
        return true;
    }

    let (Ok(resolved), Ok(cwd)) = (
        path.canonicalize(),
        std::env::current_dir().and_then(|dir| dir.canonicalize()),
    ) else {
        return false;
    };
    resolved.parent().is_none() || cwd.starts_with(&resolved)
}

/// Split `scheme://bucket/prefix` into bucket and prefix
fn split_bucket(url: &str, scheme: &str) -> Result<(String, String)> {
    let without_scheme = url
        .strip_prefix(&format!("{scheme}://"))
        .ok_or_else(|| Error::write(format!("Invalid {scheme} URL: {url}")))?;

    let (bucket, prefix) = match without_scheme.find('/') {
        Some(idx) => (&without_scheme[..idx], &without_scheme[idx + 1..]),
        None => (without_scheme, ""),
    };

    if bucket.is_empty() {
        return Err(Error::write(format!("Missing bucket in {scheme} URL: {url}")));
    }

    Ok((bucket.to_string(), prefix.to_string()))
}
