// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use chrono::NaiveDate;
use internal_error::InternalError;
use thiserror::Error;

use crate::{
    EncodingError,
    PartitionKey,
    PartitionVerificationSummary,
    StorageAccessError,
    VerificationReport,
};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Service
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Independently re-reads landed artifacts and recomputes their structural
/// stats and quality checks. Never assumes encoding correctness and never
/// mutates the store - a failed check is a diagnostic signal, not a trigger
/// for compensating action.
#[async_trait::async_trait]
pub trait VerificationService: Send + Sync {
    async fn verify_artifact(
        &self,
        partition: &PartitionKey,
        file_name: &str,
        options: &VerificationOptions,
    ) -> Result<ArtifactVerification, VerificationError>;

    /// One report per artifact found under the partition prefix
    async fn verify_partition(
        &self,
        partition: &PartitionKey,
        options: &VerificationOptions,
    ) -> Result<PartitionVerification, VerificationError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// DTOs
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug)]
pub struct VerificationOptions {
    /// Rows to include in the spot-check sample
    pub sample_size: usize,
    /// "Not suspiciously small" guard, not a format-level constraint
    pub min_artifact_size: u64,
    /// Upper bound on total nulls / total cells
    pub max_null_density: f64,
}

impl Default for VerificationOptions {
    fn default() -> Self {
        Self {
            sample_size: 5,
            min_artifact_size: 1024,
            max_null_density: 0.9,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug)]
pub enum ArtifactVerification {
    Verified(VerificationReport),
    /// Discovery fallback: the artifact is absent, but nearby partitions are
    /// reported to help operators locate the correct execution date
    NotFound {
        key: String,
        available_dates: Vec<NaiveDate>,
    },
}

#[derive(Debug)]
pub enum PartitionVerification {
    Verified(PartitionVerificationSummary),
    NotFound {
        partition: PartitionKey,
        available_dates: Vec<NaiveDate>,
    },
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug)]
pub enum VerificationError {
    /// The artifact could be fetched but its payload does not decode
    #[error(transparent)]
    Decode(#[from] EncodingError),
    #[error(transparent)]
    Access(#[from] StorageAccessError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}
