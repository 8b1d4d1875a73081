// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt;

use thiserror::Error;

use crate::{DatasetName, DatasetSpec};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Service
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Read-only catalog mapping dataset names to their extraction
/// specifications. Initialized once at process start; adding a dataset means
/// adding an entry, not changing pipeline code.
pub trait DatasetRegistry: Send + Sync {
    fn resolve(&self, name: &DatasetName) -> Result<&DatasetSpec, UnknownDatasetError>;

    /// All registered names, for diagnostics
    fn names(&self) -> Vec<DatasetName>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug)]
pub struct UnknownDatasetError {
    pub dataset_name: DatasetName,
    pub valid_names: Vec<DatasetName>,
}

impl fmt::Display for UnknownDatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid = self
            .valid_names
            .iter()
            .map(DatasetName::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "Dataset '{}' is not registered, valid datasets are: {valid}",
            self.dataset_name,
        )
    }
}
