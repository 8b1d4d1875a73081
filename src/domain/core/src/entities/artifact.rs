// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::DatasetName;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Addresses the set of artifacts sharing a dataset and execution date.
/// `execution_date` is wall-clock date at run start, never derived from data
/// content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionKey {
    pub source_name: String,
    pub dataset_name: DatasetName,
    pub execution_date: NaiveDate,
}

impl PartitionKey {
    pub fn new(source_name: &str, dataset_name: DatasetName, execution_date: NaiveDate) -> Self {
        Self {
            source_name: source_name.to_string(),
            dataset_name,
            execution_date,
        }
    }

    /// Bit-exact path contract:
    /// `bronze/{source}/{dataset}/execution_date={YYYY-MM-DD}/`
    pub fn prefix(&self) -> String {
        format!(
            "bronze/{}/{}/execution_date={}/",
            self.source_name,
            self.dataset_name,
            self.execution_date.format("%Y-%m-%d"),
        )
    }

    /// Prefix under which all of the dataset's partitions live:
    /// `bronze/{source}/{dataset}/`
    pub fn dataset_prefix(&self) -> String {
        format!("bronze/{}/{}/", self.source_name, self.dataset_name)
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Artifact file name: `{dataset}_{HHMMSS}.parquet`. Time-of-day suffixed
/// rather than content-addressed, so repeated runs on one date accumulate
/// sibling files instead of replacing each other.
pub fn artifact_file_name(dataset_name: &DatasetName, time_of_day: NaiveTime) -> String {
    format!("{}_{}.parquet", dataset_name, time_of_day.format("%H%M%S"))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// One landed columnar file produced by a single pipeline run. Created by the
/// landing store, immutable thereafter.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub partition: PartitionKey,
    pub file_name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// Full storage key of the artifact
    pub fn key(&self) -> String {
        format!("{}{}", self.partition.prefix(), self.file_name)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_prefix_is_bit_exact() {
        let key = PartitionKey::new(
            "magenta",
            DatasetName::new_unchecked("vehicles"),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        );
        assert_eq!(key.prefix(), "bronze/magenta/vehicles/execution_date=2024-01-15/");
    }

    #[test]
    fn artifact_name_is_time_suffixed() {
        let name = artifact_file_name(
            &DatasetName::new_unchecked("vehicles"),
            NaiveTime::from_hms_opt(9, 15, 30).unwrap(),
        );
        assert_eq!(name, "vehicles_091530.parquet");
    }

    #[test]
    fn artifact_key_concatenates_prefix_and_file_name() {
        let artifact = Artifact {
            partition: PartitionKey::new(
                "magenta",
                DatasetName::new_unchecked("vehicles"),
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            ),
            file_name: "vehicles_091530.parquet".to_string(),
            size: 2048,
            created_at: Utc::now(),
        };
        assert_eq!(
            artifact.key(),
            "bronze/magenta/vehicles/execution_date=2024-06-01/vehicles_091530.parquet"
        );
    }
}
