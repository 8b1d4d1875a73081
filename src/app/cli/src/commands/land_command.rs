// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use console::style;
use strix_bronze_core::*;

use super::{parse_dataset_name, print_report, Command};
use crate::CLIError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct LandCommand {
    landing_svc: Arc<dyn LandingService>,
    store_url: String,
    source_name: String,
    dataset: String,
}

impl LandCommand {
    pub fn new(
        landing_svc: Arc<dyn LandingService>,
        store_url: String,
        source_name: String,
        dataset: String,
    ) -> Self {
        Self {
            landing_svc,
            store_url,
            source_name,
            dataset,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl Command for LandCommand {
    async fn run(&mut self) -> Result<(), CLIError> {
        let dataset_name = parse_dataset_name(&self.dataset)?;

        eprintln!(
            "{} dataset '{}' from source '{}' into {}",
            style("Landing").green().bold(),
            dataset_name,
            self.source_name,
            self.store_url,
        );

        match self.landing_svc.land(&dataset_name).await? {
            LandingResult::NoNewData { dataset_name } => {
                eprintln!(
                    "{}",
                    style(format!(
                        "Extraction of '{dataset_name}' produced no rows - nothing was landed"
                    ))
                    .yellow(),
                );
                Ok(())
            }
            LandingResult::Landed {
                artifact,
                verification,
            } => {
                eprintln!(
                    "{} {} ({})",
                    style("Landed").green().bold(),
                    artifact.key(),
                    humansize::format_size(artifact.size, humansize::BINARY),
                );

                print_report(&verification);

                if verification.passed() {
                    eprintln!("{}", style("Verification passed").green().bold());
                    Ok(())
                } else {
                    Err(CLIError::failure(format!(
                        "Verification checks failed for {}",
                        artifact.key(),
                    )))
                }
            }
        }
    }
}
