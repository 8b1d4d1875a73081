// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use strix_bronze_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Returns a canned result regardless of the requested spec
pub struct ExtractionServiceStub {
    result: ExtractionResult,
}

impl ExtractionServiceStub {
    pub fn new(result: ExtractionResult) -> Self {
        Self { result }
    }

    pub fn empty() -> Self {
        Self::new(ExtractionResult::empty(Vec::new()))
    }
}

#[async_trait::async_trait]
impl ExtractionService for ExtractionServiceStub {
    async fn extract(&self, _spec: &DatasetSpec) -> Result<ExtractionResult, ExtractionError> {
        Ok(self.result.clone())
    }
}
