// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use strix_bronze_core::DatasetRegistry;

use super::Command;
use crate::CLIError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct DatasetsCommand {
    registry: Arc<dyn DatasetRegistry>,
}

impl DatasetsCommand {
    pub fn new(registry: Arc<dyn DatasetRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait::async_trait(?Send)]
impl Command for DatasetsCommand {
    async fn run(&mut self) -> Result<(), CLIError> {
        for name in self.registry.names() {
            println!("{name}");
        }
        Ok(())
    }
}
