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

/// The unified pipeline: one registry and one flow, parameterized by the
/// injected store variant instead of branching per storage target
pub struct LandingServiceImpl {
    registry: Arc<dyn DatasetRegistry>,
    extraction_svc: Arc<dyn ExtractionService>,
    encoder: Arc<dyn PayloadEncoder>,
    store: Arc<dyn LandingStore>,
    verification_svc: Arc<dyn VerificationService>,
    time_source: Arc<dyn SystemTimeSource>,
    source_name: String,
}

impl LandingServiceImpl {
    pub fn new(
        registry: Arc<dyn DatasetRegistry>,
        extraction_svc: Arc<dyn ExtractionService>,
        encoder: Arc<dyn PayloadEncoder>,
        store: Arc<dyn LandingStore>,
        verification_svc: Arc<dyn VerificationService>,
        time_source: Arc<dyn SystemTimeSource>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            extraction_svc,
            encoder,
            store,
            verification_svc,
            time_source,
            source_name: source_name.into(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl LandingService for LandingServiceImpl {
    #[tracing::instrument(level = "info", skip_all, fields(%dataset_name))]
    async fn land(&self, dataset_name: &DatasetName) -> Result<LandingResult, LandingError> {
        let spec = self.registry.resolve(dataset_name)?.clone();

        // Execution date is wall clock at run start, never data content
        let execution_date = self.time_source.now().date_naive();

        let result = self.extraction_svc.extract(&spec).await?;

        if result.is_empty() {
            tracing::info!("Extraction produced no rows, halting before write");
            return Ok(LandingResult::NoNewData {
                dataset_name: dataset_name.clone(),
            });
        }

        let payload = self.encoder.encode(&result)?;

        let partition = PartitionKey::new(&self.source_name, dataset_name.clone(), execution_date);

        let written_at = self.time_source.now();
        let file_name = artifact_file_name(dataset_name, written_at.time());

        let artifact = self
            .store
            .write(&partition, &file_name, payload, written_at)
            .await?;

        tracing::info!(key = %artifact.key(), size = artifact.size, "Artifact landed");

        let verification = match self
            .verification_svc
            .verify_artifact(&partition, &file_name, &VerificationOptions::default())
            .await
            .map_err(ErrorIntoInternal::int_err)?
        {
            ArtifactVerification::Verified(report) => report,
            ArtifactVerification::NotFound { key, .. } => {
                return Err(
                    format!("Artifact '{key}' disappeared between write and verification")
                        .int_err()
                        .into(),
                );
            }
        };

        Ok(LandingResult::Landed {
            artifact,
            verification,
        })
    }
}
