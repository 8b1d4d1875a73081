// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use strix_bronze::testing::LandingStoreInMemory;
use strix_bronze::{CompressionCodec, ParquetEncoder, VerificationServiceImpl};
use strix_bronze_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

struct Harness {
    store: Arc<LandingStoreInMemory>,
    encoder: Arc<ParquetEncoder>,
    verification_svc: VerificationServiceImpl,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(LandingStoreInMemory::new());
        let encoder = Arc::new(ParquetEncoder::new(CompressionCodec::Snappy));
        let verification_svc = VerificationServiceImpl::new(store.clone(), encoder.clone());
        Self {
            store,
            encoder,
            verification_svc,
        }
    }

    async fn land(&self, partition: &PartitionKey, file_name: &str, result: &ExtractionResult) {
        let payload = self.encoder.encode(result).unwrap();
        self.store
            .write(
                partition,
                file_name,
                payload,
                Utc.with_ymd_and_hms(2024, 1, 15, 9, 15, 30).unwrap(),
            )
            .await
            .unwrap();
    }
}

fn partition(date: (i32, u32, u32)) -> PartitionKey {
    PartitionKey::new(
        "magenta",
        DatasetName::new_unchecked("vehicles"),
        NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
    )
}

/// 100 rows x 5 columns where `things` is entirely null
fn result_with_null_column() -> ExtractionResult {
    ExtractionResult {
        columns: vec![
            ColumnDef::new("id", ColumnType::Int64),
            ColumnDef::new("make", ColumnType::Utf8),
            ColumnDef::new("mileage", ColumnType::Float64),
            ColumnDef::new("things", ColumnType::Utf8),
            ColumnDef::new("created_datetime", ColumnType::Timestamp),
        ],
        rows: (0..100i64)
            .map(|i| {
                vec![
                    Value::Int(i),
                    Value::Text(format!("make-{i}")),
                    Value::Float(i as f64 * 1000.5),
                    Value::Null,
                    Value::Timestamp(Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()),
                ]
            })
            .collect(),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[tokio::test]
async fn empty_artifact_fails_the_non_empty_check() {
    let harness = Harness::new();
    let partition = partition((2024, 1, 15));

    let empty = ExtractionResult::empty(vec![
        ColumnDef::new("id", ColumnType::Int64),
        ColumnDef::new("make", ColumnType::Utf8),
    ]);
    harness
        .land(&partition, "vehicles_091530.parquet", &empty)
        .await;

    let ArtifactVerification::Verified(report) = harness
        .verification_svc
        .verify_artifact(
            &partition,
            "vehicles_091530.parquet",
            &VerificationOptions::default(),
        )
        .await
        .unwrap()
    else {
        panic!("expected a report");
    };

    assert_eq!(report.num_records, 0);
    assert_eq!(report.num_columns, 2);
    assert!(!report.passed());

    let non_empty = &report.checks[0];
    assert!(non_empty.description.starts_with("non-empty"));
    assert!(!non_empty.passed);

    // Structural checks may still pass on an empty artifact
    let has_columns = &report.checks[1];
    assert!(has_columns.description.starts_with("has columns"));
    assert!(has_columns.passed);
}

#[tokio::test]
async fn fully_null_column_is_reported_but_stays_under_density_bound() {
    let harness = Harness::new();
    let partition = partition((2024, 1, 15));

    harness
        .land(
            &partition,
            "vehicles_091530.parquet",
            &result_with_null_column(),
        )
        .await;

    let ArtifactVerification::Verified(report) = harness
        .verification_svc
        .verify_artifact(
            &partition,
            "vehicles_091530.parquet",
            &VerificationOptions::default(),
        )
        .await
        .unwrap()
    else {
        panic!("expected a report");
    };

    assert_eq!(report.null_ratios["things"], 1.0);
    assert_eq!(report.null_ratios["id"], 0.0);

    // 100 nulls over 500 cells
    let density_check = report
        .checks
        .iter()
        .find(|c| c.description.starts_with("null density"))
        .unwrap();
    assert!(density_check.passed);
}

#[tokio::test]
async fn sample_is_capped_to_requested_size() {
    let harness = Harness::new();
    let partition = partition((2024, 1, 15));

    harness
        .land(
            &partition,
            "vehicles_091530.parquet",
            &result_with_null_column(),
        )
        .await;

    let options = VerificationOptions {
        sample_size: 3,
        ..VerificationOptions::default()
    };
    let ArtifactVerification::Verified(report) = harness
        .verification_svc
        .verify_artifact(&partition, "vehicles_091530.parquet", &options)
        .await
        .unwrap()
    else {
        panic!("expected a report");
    };

    assert_eq!(report.sample.len(), 3);
    assert_eq!(report.sample[0][0], Value::Int(0));
}

#[tokio::test]
async fn missing_artifact_switches_to_discovery() {
    let harness = Harness::new();

    // Artifacts exist on two other dates
    for date in [(2024, 1, 14), (2024, 1, 16)] {
        harness
            .land(
                &partition(date),
                "vehicles_091530.parquet",
                &result_with_null_column(),
            )
            .await;
    }

    let requested = partition((2024, 1, 15));
    let outcome = harness
        .verification_svc
        .verify_artifact(
            &requested,
            "vehicles_091530.parquet",
            &VerificationOptions::default(),
        )
        .await
        .unwrap();

    let ArtifactVerification::NotFound {
        key,
        available_dates,
    } = outcome
    else {
        panic!("expected discovery fallback");
    };
    assert_eq!(
        key,
        "bronze/magenta/vehicles/execution_date=2024-01-15/vehicles_091530.parquet"
    );
    assert_eq!(
        available_dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
        ]
    );
}

#[tokio::test]
async fn empty_partition_reports_available_dates() {
    let harness = Harness::new();

    harness
        .land(
            &partition((2024, 1, 14)),
            "vehicles_091530.parquet",
            &result_with_null_column(),
        )
        .await;

    let outcome = harness
        .verification_svc
        .verify_partition(&partition((2024, 1, 15)), &VerificationOptions::default())
        .await
        .unwrap();

    let PartitionVerification::NotFound {
        partition: missing,
        available_dates,
    } = outcome
    else {
        panic!("expected discovery fallback");
    };
    assert_eq!(
        missing.execution_date,
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    );
    assert_eq!(
        available_dates,
        vec![NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()]
    );
}

#[tokio::test]
async fn partition_summary_aggregates_all_artifacts() {
    let harness = Harness::new();
    let partition = partition((2024, 1, 15));

    harness
        .land(
            &partition,
            "vehicles_091530.parquet",
            &result_with_null_column(),
        )
        .await;
    harness
        .land(
            &partition,
            "vehicles_110000.parquet",
            &result_with_null_column(),
        )
        .await;

    let outcome = harness
        .verification_svc
        .verify_partition(&partition, &VerificationOptions::default())
        .await
        .unwrap();

    let PartitionVerification::Verified(summary) = outcome else {
        panic!("expected a summary");
    };
    assert_eq!(summary.total_artifacts(), 2);
    assert_eq!(summary.total_records, 200);
    assert_eq!(
        summary.total_bytes,
        summary.reports.iter().map(|r| r.size).sum::<u64>()
    );
}
