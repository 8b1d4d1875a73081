// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use internal_error::*;
use strix_bronze_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct VerificationServiceImpl {
    store: Arc<dyn LandingStore>,
    encoder: Arc<dyn PayloadEncoder>,
}

impl VerificationServiceImpl {
    pub fn new(store: Arc<dyn LandingStore>, encoder: Arc<dyn PayloadEncoder>) -> Self {
        Self { store, encoder }
    }

    async fn available_dates(
        &self,
        partition: &PartitionKey,
    ) -> Result<Vec<chrono::NaiveDate>, VerificationError> {
        Ok(self
            .store
            .list_execution_dates(&partition.source_name, &partition.dataset_name)
            .await?)
    }

    async fn build_report(
        &self,
        key: String,
        size: u64,
        options: &VerificationOptions,
    ) -> Result<VerificationReport, VerificationError> {
        let payload = match self.store.get(&key).await {
            Ok(payload) => payload,
            Err(GetError::NotFound(e)) => return Err(e.int_err().into()),
            Err(GetError::Access(e)) => return Err(e.into()),
            Err(GetError::Internal(e)) => return Err(e.into()),
        };

        // Only this re-read path decodes; encoding correctness is never
        // assumed
        let decoded = self.encoder.decode(&payload)?;

        let null_ratios = decoded.null_ratios();
        let null_density = decoded.total_null_ratio();

        let checks = vec![
            QualityCheck::new(
                format!("non-empty: {} records > 0", decoded.num_records()),
                decoded.num_records() > 0,
            ),
            QualityCheck::new(
                format!("has columns: {} columns > 0", decoded.num_columns()),
                decoded.num_columns() > 0,
            ),
            QualityCheck::new(
                format!(
                    "minimum size: {size} bytes > {} bytes",
                    options.min_artifact_size
                ),
                size > options.min_artifact_size,
            ),
            QualityCheck::new(
                format!(
                    "null density: {null_density:.3} < {:.3}",
                    options.max_null_density
                ),
                null_density < options.max_null_density,
            ),
        ];

        Ok(VerificationReport {
            artifact_key: key,
            size,
            num_records: decoded.num_records(),
            num_columns: decoded.num_columns(),
            columns: decoded.columns.clone(),
            null_ratios,
            sample: decoded.head(options.sample_size).to_vec(),
            checks,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl VerificationService for VerificationServiceImpl {
    #[tracing::instrument(level = "info", skip_all, fields(%partition, file_name))]
    async fn verify_artifact(
        &self,
        partition: &PartitionKey,
        file_name: &str,
        options: &VerificationOptions,
    ) -> Result<ArtifactVerification, VerificationError> {
        let key = format!("{}{}", partition.prefix(), file_name);

        let size = match self.store.size_of(&key).await {
            Ok(size) => size,
            Err(GetError::NotFound(_)) => {
                tracing::info!(key, "Artifact not found, switching to partition discovery");
                return Ok(ArtifactVerification::NotFound {
                    key,
                    available_dates: self.available_dates(partition).await?,
                });
            }
            Err(GetError::Access(e)) => return Err(e.into()),
            Err(GetError::Internal(e)) => return Err(e.into()),
        };

        let report = self.build_report(key, size, options).await?;

        tracing::info!(
            num_records = report.num_records,
            num_columns = report.num_columns,
            passed = report.passed(),
            "Artifact verification complete",
        );

        Ok(ArtifactVerification::Verified(report))
    }

    #[tracing::instrument(level = "info", skip_all, fields(%partition))]
    async fn verify_partition(
        &self,
        partition: &PartitionKey,
        options: &VerificationOptions,
    ) -> Result<PartitionVerification, VerificationError> {
        let keys = self.store.list(&partition.prefix()).await?;

        if keys.is_empty() {
            tracing::info!("Partition holds no artifacts, reporting available dates");
            return Ok(PartitionVerification::NotFound {
                partition: partition.clone(),
                available_dates: self.available_dates(partition).await?,
            });
        }

        let mut reports = Vec::with_capacity(keys.len());
        for key in keys {
            let size = match self.store.size_of(&key).await {
                Ok(size) => size,
                Err(GetError::NotFound(e)) => return Err(e.int_err().into()),
                Err(GetError::Access(e)) => return Err(e.into()),
                Err(GetError::Internal(e)) => return Err(e.into()),
            };
            reports.push(self.build_report(key, size, options).await?);
        }

        Ok(PartitionVerification::Verified(
            PartitionVerificationSummary::from_reports(reports),
        ))
    }
}
