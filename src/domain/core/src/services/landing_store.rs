// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use internal_error::{BoxedError, InternalError};
use thiserror::Error;

use crate::{Artifact, DatasetName, PartitionKey};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Service
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Landing target abstraction over the local file system and remote object
/// stores. Keys are `/`-separated paths relative to the store root.
#[async_trait::async_trait]
pub trait LandingStore: Send + Sync {
    /// Base URL of the target, for display purposes
    fn url(&self) -> String;

    async fn contains(&self, key: &str) -> Result<bool, InternalError>;

    async fn size_of(&self, key: &str) -> Result<u64, GetError>;

    async fn get(&self, key: &str) -> Result<Bytes, GetError>;

    /// Persists the payload and returns its size in bytes as observed by the
    /// target
    async fn put(&self, key: &str, data: Bytes) -> Result<u64, WriteError>;

    /// All keys under the prefix, lexicographically ordered
    async fn list(&self, prefix: &str) -> Result<Vec<String>, InternalError>;

    /// Lands one artifact under the partition. Existing keys are rejected
    /// rather than overwritten - the landing model is append-only and two
    /// runs collide only when they share a time-of-day suffix.
    async fn write(
        &self,
        partition: &PartitionKey,
        file_name: &str,
        data: Bytes,
        created_at: DateTime<Utc>,
    ) -> Result<Artifact, WriteError> {
        let key = format!("{}{}", partition.prefix(), file_name);

        if self.contains(&key).await? {
            return Err(ArtifactAlreadyExistsError { key }.into());
        }

        let size = self.put(&key, data).await?;

        Ok(Artifact {
            partition: partition.clone(),
            file_name: file_name.to_string(),
            size,
            created_at,
        })
    }

    /// Execution dates that have at least one artifact for the dataset,
    /// ascending. Drives the discovery fallback of verification.
    async fn list_execution_dates(
        &self,
        source_name: &str,
        dataset_name: &DatasetName,
    ) -> Result<Vec<NaiveDate>, InternalError> {
        let prefix = format!("bronze/{source_name}/{dataset_name}/");
        let keys = self.list(&prefix).await?;

        let mut dates: Vec<NaiveDate> = keys
            .iter()
            .filter_map(|key| {
                key.split('/')
                    .find_map(|segment| segment.strip_prefix("execution_date="))
                    .and_then(|date| date.parse().ok())
            })
            .collect();
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug)]
pub enum WriteError {
    #[error(transparent)]
    AlreadyExists(#[from] ArtifactAlreadyExistsError),
    #[error(transparent)]
    Access(#[from] StorageAccessError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(Error, Debug)]
pub enum GetError {
    #[error(transparent)]
    NotFound(#[from] ArtifactNotFoundError),
    #[error(transparent)]
    Access(#[from] StorageAccessError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(Error, Debug)]
#[error("Artifact already exists at '{key}'")]
pub struct ArtifactAlreadyExistsError {
    pub key: String,
}

#[derive(Error, Debug)]
#[error("Artifact not found at '{key}'")]
pub struct ArtifactNotFoundError {
    pub key: String,
}

/// Credential or authorization failure of the storage target. Distinguished
/// so callers can short-circuit remaining work instead of retrying per key.
#[derive(Error, Debug)]
#[error("Storage target access denied: {reason}")]
pub struct StorageAccessError {
    pub reason: String,
    #[source]
    pub source: Option<BoxedError>,
}

impl StorageAccessError {
    pub fn new<E: Into<BoxedError>>(reason: impl Into<String>, source: E) -> Self {
        Self {
            reason: reason.into(),
            source: Some(source.into()),
        }
    }

    pub fn no_credentials(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            source: None,
        }
    }
}
