// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use bytes::Bytes;
use chrono::{NaiveDate, TimeZone, Utc};
use strix_bronze::LandingStoreLocalFs;
use strix_bronze_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn partition(dataset: &str, date: (i32, u32, u32)) -> PartitionKey {
    PartitionKey::new(
        "magenta",
        DatasetName::new_unchecked(dataset),
        NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
    )
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[tokio::test]
async fn put_get_size_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let store = LandingStoreLocalFs::new(tmp.path());

    let key = "bronze/magenta/vehicles/execution_date=2024-01-15/vehicles_091530.parquet";
    let data = Bytes::from_static(b"not really parquet");

    assert!(!store.contains(key).await.unwrap());

    let size = store.put(key, data.clone()).await.unwrap();
    assert_eq!(size, data.len() as u64);

    assert!(store.contains(key).await.unwrap());
    assert_eq!(store.size_of(key).await.unwrap(), data.len() as u64);
    assert_eq!(store.get(key).await.unwrap(), data);
}

#[tokio::test]
async fn missing_artifact_reports_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let store = LandingStoreLocalFs::new(tmp.path());

    let res = store.size_of("bronze/magenta/vehicles/nope.parquet").await;
    assert!(matches!(res, Err(GetError::NotFound(_))));
}

#[tokio::test]
async fn put_leaves_no_staging_files_behind() {
    let tmp = tempfile::tempdir().unwrap();
    let store = LandingStoreLocalFs::new(tmp.path());

    let key = "bronze/magenta/users/execution_date=2024-01-15/users_120000.parquet";
    store.put(key, Bytes::from_static(b"abc")).await.unwrap();

    let leftovers: Vec<_> = walkdir::WalkDir::new(tmp.path())
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(".staging-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn write_rejects_existing_key() {
    let tmp = tempfile::tempdir().unwrap();
    let store = LandingStoreLocalFs::new(tmp.path());

    let partition = partition("vehicles", (2024, 1, 15));
    let created_at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 15, 30).unwrap();

    let artifact = store
        .write(
            &partition,
            "vehicles_091530.parquet",
            Bytes::from_static(b"first"),
            created_at,
        )
        .await
        .unwrap();
    assert_eq!(
        artifact.key(),
        "bronze/magenta/vehicles/execution_date=2024-01-15/vehicles_091530.parquet"
    );

    let res = store
        .write(
            &partition,
            "vehicles_091530.parquet",
            Bytes::from_static(b"second"),
            created_at,
        )
        .await;
    assert!(matches!(res, Err(WriteError::AlreadyExists(_))));

    // Original content is untouched
    assert_eq!(
        store.get(&artifact.key()).await.unwrap(),
        Bytes::from_static(b"first")
    );
}

#[tokio::test]
async fn sibling_artifacts_accumulate_under_one_partition() {
    let tmp = tempfile::tempdir().unwrap();
    let store = LandingStoreLocalFs::new(tmp.path());

    let partition = partition("vehicles", (2024, 1, 15));
    let created_at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 15, 30).unwrap();

    for file_name in ["vehicles_091530.parquet", "vehicles_104501.parquet"] {
        store
            .write(&partition, file_name, Bytes::from_static(b"x"), created_at)
            .await
            .unwrap();
    }

    let keys = store.list(&partition.prefix()).await.unwrap();
    assert_eq!(
        keys,
        vec![
            "bronze/magenta/vehicles/execution_date=2024-01-15/vehicles_091530.parquet",
            "bronze/magenta/vehicles/execution_date=2024-01-15/vehicles_104501.parquet",
        ]
    );
}

#[tokio::test]
async fn lists_execution_dates_across_partitions() {
    let tmp = tempfile::tempdir().unwrap();
    let store = LandingStoreLocalFs::new(tmp.path());

    let created_at = Utc.with_ymd_and_hms(2024, 1, 16, 8, 0, 0).unwrap();
    for (date, file_name) in [
        ((2024, 1, 15), "vehicles_091530.parquet"),
        ((2024, 1, 16), "vehicles_091530.parquet"),
        ((2024, 1, 16), "vehicles_110000.parquet"),
    ] {
        store
            .write(
                &partition("vehicles", date),
                file_name,
                Bytes::from_static(b"x"),
                created_at,
            )
            .await
            .unwrap();
    }

    // Another dataset's partitions must not leak in
    store
        .write(
            &partition("users", (2024, 1, 17)),
            "users_091530.parquet",
            Bytes::from_static(b"x"),
            created_at,
        )
        .await
        .unwrap();

    let dates = store
        .list_execution_dates("magenta", &DatasetName::new_unchecked("vehicles"))
        .await
        .unwrap();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
        ]
    );
}
