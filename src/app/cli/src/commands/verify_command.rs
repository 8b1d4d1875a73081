// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use chrono::NaiveDate;
use console::style;
use strix_bronze_core::*;

use super::{parse_dataset_name, print_report, Command};
use crate::CLIError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct VerifyCommand {
    registry: Arc<dyn DatasetRegistry>,
    verification_svc: Arc<dyn VerificationService>,
    time_source: Arc<dyn SystemTimeSource>,
    source_name: String,
    dataset: String,
    date: Option<NaiveDate>,
    sample: usize,
}

impl VerifyCommand {
    pub fn new(
        registry: Arc<dyn DatasetRegistry>,
        verification_svc: Arc<dyn VerificationService>,
        time_source: Arc<dyn SystemTimeSource>,
        source_name: String,
        dataset: String,
        date: Option<NaiveDate>,
        sample: usize,
    ) -> Self {
        Self {
            registry,
            verification_svc,
            time_source,
            source_name,
            dataset,
            date,
            sample,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl Command for VerifyCommand {
    async fn run(&mut self) -> Result<(), CLIError> {
        let dataset_name = parse_dataset_name(&self.dataset)?;
        let dataset_name = self
            .registry
            .resolve(&dataset_name)
            .map_err(|e| CLIError::usage_error(e.to_string()))?
            .name
            .clone();

        let execution_date = self
            .date
            .unwrap_or_else(|| self.time_source.now().date_naive());
        let partition = PartitionKey::new(&self.source_name, dataset_name, execution_date);

        let options = VerificationOptions {
            sample_size: self.sample,
            ..VerificationOptions::default()
        };

        match self
            .verification_svc
            .verify_partition(&partition, &options)
            .await?
        {
            PartitionVerification::NotFound {
                partition,
                available_dates,
            } => {
                eprintln!(
                    "{}",
                    style(format!("No artifacts found under {}", partition.prefix())).yellow(),
                );
                if !available_dates.is_empty() {
                    eprintln!(
                        "Available execution dates for '{}':",
                        partition.dataset_name
                    );
                    for date in available_dates {
                        eprintln!("  {date}");
                    }
                }
                Ok(())
            }
            PartitionVerification::Verified(summary) => {
                for report in &summary.reports {
                    print_report(report);
                }

                eprintln!(
                    "{} artifact(s), {} record(s), {}",
                    summary.total_artifacts(),
                    summary.total_records,
                    humansize::format_size(summary.total_bytes, humansize::BINARY),
                );

                if summary.all_passed() {
                    eprintln!("{}", style("All checks passed").green().bold());
                    Ok(())
                } else {
                    let failed = summary
                        .reports
                        .iter()
                        .filter(|r| !r.passed())
                        .count();
                    Err(CLIError::failure(format!(
                        "{failed} artifact(s) failed verification",
                    )))
                }
            }
        }
    }
}
