// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use bytes::Bytes;
use internal_error::*;
use strix_bronze_core::*;
use tokio::sync::OnceCell;

use crate::utils::s3_context::S3Context;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Lands artifacts in an S3 bucket. Partial uploads are left to the store's
/// own atomicity - S3 does not make an object visible until the put
/// completes. The bucket is probed for reachability once per process before
/// the first write.
pub struct LandingStoreS3 {
    s3: S3Context,
    bucket_probe: OnceCell<()>,
}

impl LandingStoreS3 {
    const CONTENT_TYPE: &'static str = "application/octet-stream";

    pub fn new(s3: S3Context) -> Self {
        Self {
            s3,
            bucket_probe: OnceCell::new(),
        }
    }

    async fn ensure_bucket_reachable(&self) -> Result<(), WriteError> {
        self.bucket_probe
            .get_or_try_init(|| async {
                tracing::info!(bucket = %self.s3.bucket, "Probing landing bucket");

                match self.s3.head_bucket().await {
                    Ok(()) => Ok(()),
                    Err(e) if is_auth_error(e.code()) => Err(WriteError::Access(
                        StorageAccessError::new("bucket probe was denied", e),
                    )),
                    Err(e) if e.as_service_error().is_some_and(HeadBucketError::is_not_found) => {
                        Err(WriteError::Internal(
                            format!("Bucket '{}' not found", self.s3.bucket).int_err(),
                        ))
                    }
                    Err(e) => Err(WriteError::Internal(e.int_err())),
                }
            })
            .await
            .map(|_| ())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl LandingStore for LandingStoreS3 {
    fn url(&self) -> String {
        self.s3.make_url()
    }

    #[tracing::instrument(level = "debug", skip_all, fields(key))]
    async fn contains(&self, key: &str) -> Result<bool, InternalError> {
        match self.s3.head_object(key.to_string()).await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(HeadObjectError::is_not_found) => Ok(false),
            Err(e) => Err(e.int_err()),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(key))]
    async fn size_of(&self, key: &str) -> Result<u64, GetError> {
        match self.s3.head_object(key.to_string()).await {
            Ok(head) => Ok(u64::try_from(head.content_length().unwrap_or_default()).int_err()?),
            Err(e) if e.as_service_error().is_some_and(HeadObjectError::is_not_found) => {
                Err(ArtifactNotFoundError {
                    key: key.to_string(),
                }
                .into())
            }
            Err(e) if is_auth_error(e.code()) => {
                Err(StorageAccessError::new("object metadata read was denied", e).into())
            }
            Err(e) => Err(e.int_err().into()),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(key))]
    async fn get(&self, key: &str) -> Result<Bytes, GetError> {
        match self.s3.get_object(key.to_string()).await {
            Ok(output) => Ok(output.body.collect().await.int_err()?.into_bytes()),
            Err(e) if e.as_service_error().is_some_and(GetObjectError::is_no_such_key) => {
                Err(ArtifactNotFoundError {
                    key: key.to_string(),
                }
                .into())
            }
            Err(e) if is_auth_error(e.code()) => {
                Err(StorageAccessError::new("object read was denied", e).into())
            }
            Err(e) => Err(e.int_err().into()),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(key, size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> Result<u64, WriteError> {
        self.ensure_bucket_reachable().await?;

        let size = data.len() as u64;

        match self
            .s3
            .put_object(key.to_string(), &data, Self::CONTENT_TYPE)
            .await
        {
            Ok(_) => {
                tracing::debug!(key, "Landed artifact");
                Ok(size)
            }
            Err(e) if is_auth_error(e.code()) => {
                Err(StorageAccessError::new("object upload was denied", e).into())
            }
            Err(e) => Err(WriteError::Internal(e.int_err())),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, InternalError> {
        let mut keys = self.s3.list_objects(prefix).await?;
        keys.sort_unstable();
        Ok(keys)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn is_auth_error(code: Option<&str>) -> bool {
    matches!(
        code,
        Some(
            "AccessDenied"
                | "InvalidAccessKeyId"
                | "SignatureDoesNotMatch"
                | "ExpiredToken"
                | "TokenRefreshRequired"
        )
    )
}
