// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use aws_config::BehaviorVersion;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::operation::head_object::{HeadObjectError, HeadObjectOutput};
use aws_sdk_s3::operation::put_object::{PutObjectError, PutObjectOutput};
use aws_sdk_s3::Client;
use internal_error::{InternalError, ResultIntoInternal};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Thin wrapper over the S3 client bound to one bucket
#[derive(Clone)]
pub struct S3Context {
    pub client: Client,
    pub endpoint: Option<String>,
    pub bucket: String,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl S3Context {
    const MAX_LISTED_OBJECTS: i32 = 1000;

    pub fn new(client: Client, endpoint: Option<String>, bucket: impl Into<String>) -> Self {
        Self {
            client,
            endpoint,
            bucket: bucket.into(),
        }
    }

    #[tracing::instrument(level = "info", name = "init_s3_context", skip_all, fields(bucket))]
    pub async fn from_items(endpoint: Option<String>, bucket: String) -> Self {
        // Note: Falling back to `unspecified` region as the SDK errors out
        // when the region is not set even if using a custom endpoint
        let region_provider = aws_config::meta::region::RegionProviderChain::default_provider()
            .or_else("unspecified");
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        let s3_config = if let Some(endpoint) = endpoint.clone() {
            aws_sdk_s3::config::Builder::from(&sdk_config)
                .endpoint_url(endpoint)
                .force_path_style(true)
                .build()
        } else {
            aws_sdk_s3::config::Builder::from(&sdk_config).build()
        };

        Self::new(Client::from_conf(s3_config), endpoint, bucket)
    }

    pub fn make_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("s3+{}/{}/", endpoint, self.bucket),
            None => format!("s3://{}/", self.bucket),
        }
    }

    pub async fn head_bucket(&self) -> Result<(), SdkError<HeadBucketError>> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await?;
        Ok(())
    }

    pub async fn head_object(
        &self,
        key: String,
    ) -> Result<HeadObjectOutput, SdkError<HeadObjectError>> {
        self.client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
    }

    pub async fn get_object(
        &self,
        key: String,
    ) -> Result<GetObjectOutput, SdkError<GetObjectError>> {
        self.client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
    }

    pub async fn put_object(
        &self,
        key: String,
        data: &[u8],
        content_type: &str,
    ) -> Result<PutObjectOutput, SdkError<PutObjectError>> {
        let size = i64::try_from(data.len()).unwrap();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(Vec::from(data).into())
            .content_length(size)
            .content_type(content_type)
            .send()
            .await
    }

    /// All keys under the prefix, following continuation tokens
    pub async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, InternalError> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let list_response = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .max_keys(Self::MAX_LISTED_OBJECTS)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .int_err()?;

            if let Some(contents) = list_response.contents {
                keys.extend(contents.into_iter().filter_map(|obj| obj.key));
            }

            match list_response.next_continuation_token {
                Some(token) if list_response.is_truncated.unwrap_or_default() => {
                    continuation_token = Some(token);
                }
                _ => break,
            }
        }

        Ok(keys)
    }
}
