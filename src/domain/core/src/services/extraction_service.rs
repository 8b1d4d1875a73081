// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::{BoxedError, InternalError};
use thiserror::Error;

use crate::{DatasetName, DatasetSpec, ExtractionResult};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Service
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Executes a dataset's extraction specification against the relational
/// source. A result with zero rows is not an error - callers treat it as "no
/// data produced" and halt before write. The query is attempted exactly once;
/// transient failures propagate to the invoker.
#[async_trait::async_trait]
pub trait ExtractionService: Send + Sync {
    async fn extract(&self, spec: &DatasetSpec) -> Result<ExtractionResult, ExtractionError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    Query(#[from] ExtractionQueryError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(Error, Debug)]
#[error("Extraction of dataset '{dataset_name}' failed: {source}")]
pub struct ExtractionQueryError {
    pub dataset_name: DatasetName,
    #[source]
    pub source: BoxedError,
}

impl ExtractionQueryError {
    pub fn new<E: Into<BoxedError>>(dataset_name: DatasetName, source: E) -> Self {
        Self {
            dataset_name,
            source: source.into(),
        }
    }
}
