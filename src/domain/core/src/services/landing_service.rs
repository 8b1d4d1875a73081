// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;
use thiserror::Error;

use crate::{
    Artifact,
    DatasetName,
    EncodingError,
    ExtractionError,
    UnknownDatasetError,
    VerificationReport,
    WriteError,
};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Service
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// One full pipeline run for a single dataset: resolve, extract, encode,
/// write, verify. A run either lands a complete artifact or nothing - there
/// is no partial-success state, and no step is retried.
#[async_trait::async_trait]
pub trait LandingService: Send + Sync {
    async fn land(&self, dataset_name: &DatasetName) -> Result<LandingResult, LandingError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// DTOs
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug)]
pub enum LandingResult {
    Landed {
        artifact: Artifact,
        verification: VerificationReport,
    },
    /// Extraction produced zero rows - nothing was written
    NoNewData { dataset_name: DatasetName },
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug)]
pub enum LandingError {
    #[error(transparent)]
    UnknownDataset(#[from] UnknownDatasetError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}
