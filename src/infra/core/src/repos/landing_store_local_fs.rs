// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use internal_error::*;
use strix_bronze_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Lands artifacts under a local directory root. Writes go through a staging
/// file in the destination directory followed by an atomic rename, so a run
/// killed mid-write never leaves a truncated artifact at its final key.
pub struct LandingStoreLocalFs {
    root: PathBuf,
}

impl LandingStoreLocalFs {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    fn staging_path(dir: &Path) -> PathBuf {
        dir.join(format!(
            ".staging-{}-{}",
            std::process::id(),
            STAGING_COUNTER.fetch_add(1, Ordering::Relaxed),
        ))
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let segments: Vec<&str> = rel
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(segments.join("/"))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl LandingStore for LandingStoreLocalFs {
    fn url(&self) -> String {
        format!("file://{}", self.root.display())
    }

    async fn contains(&self, key: &str) -> Result<bool, InternalError> {
        Ok(self.path_for(key).exists())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(key))]
    async fn size_of(&self, key: &str) -> Result<u64, GetError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Err(ArtifactNotFoundError {
                key: key.to_string(),
            }
            .into());
        }
        let metadata = tokio::fs::metadata(path).await.int_err()?;
        Ok(metadata.len())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(key))]
    async fn get(&self, key: &str) -> Result<Bytes, GetError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Err(ArtifactNotFoundError {
                key: key.to_string(),
            }
            .into());
        }
        let data = tokio::fs::read(path).await.int_err()?;
        Ok(Bytes::from(data))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(key, size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> Result<u64, WriteError> {
        let path = self.path_for(key);
        let dir = path
            .parent()
            .ok_or_else(|| "Artifact key has no parent directory".int_err())?
            .to_path_buf();

        std::fs::create_dir_all(&dir).int_err()?;

        // Stage in the destination directory to keep the rename on one
        // file system
        let staging_path = Self::staging_path(&dir);
        tokio::fs::write(&staging_path, &data).await.int_err()?;
        std::fs::rename(&staging_path, &path).int_err()?;

        tracing::debug!(?path, "Landed artifact");

        let metadata = tokio::fs::metadata(&path).await.int_err()?;
        Ok(metadata.len())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, InternalError> {
        let mut keys = Vec::new();

        for entry in walkdir::WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(key) = self.key_for(entry.path()) {
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort_unstable();
        Ok(keys)
    }
}
