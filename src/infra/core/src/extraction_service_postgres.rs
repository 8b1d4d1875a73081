// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row, TypeInfo};
use strix_bronze_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Runs extraction queries against the operational PostgreSQL store. The
/// pool is constructed by the application layer and consumed here as an
/// opaque capability; queries are attempted exactly once.
pub struct ExtractionServicePostgres {
    pool: PgPool,
    watermark: WatermarkStrategy,
}

impl ExtractionServicePostgres {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            watermark: WatermarkStrategy::default(),
        }
    }

    pub fn with_watermark_strategy(mut self, watermark: WatermarkStrategy) -> Self {
        self.watermark = watermark;
        self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl ExtractionService for ExtractionServicePostgres {
    #[tracing::instrument(level = "info", skip_all, fields(dataset_name = %spec.name))]
    async fn extract(&self, spec: &DatasetSpec) -> Result<ExtractionResult, ExtractionError> {
        let sql = spec.query.render(
            spec.watermark_column
                .as_deref()
                .map(|column| self.watermark.render_predicate(column)),
        );

        tracing::debug!(%sql, "Executing extraction query");

        let pg_rows: Vec<PgRow> = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ExtractionQueryError::new(spec.name.clone(), e))?;

        let Some(first) = pg_rows.first() else {
            tracing::info!("Extraction query produced no rows");
            return Ok(ExtractionResult::empty(Vec::new()));
        };

        let columns = first
            .columns()
            .iter()
            .map(|col| {
                let pg_type = col.type_info().name().to_string();
                let data_type = column_type_for(&pg_type).ok_or_else(|| {
                    ExtractionQueryError::new(
                        spec.name.clone(),
                        format!(
                            "column '{}' has a type with no columnar mapping: {pg_type}",
                            col.name()
                        ),
                    )
                })?;
                Ok((pg_type, ColumnDef::new(col.name(), data_type)))
            })
            .collect::<Result<Vec<_>, ExtractionQueryError>>()?;

        let mut rows = Vec::with_capacity(pg_rows.len());
        for pg_row in &pg_rows {
            let row = columns
                .iter()
                .enumerate()
                .map(|(idx, (pg_type, col))| {
                    decode_value(pg_row, idx, pg_type, col.data_type)
                        .map_err(|e| ExtractionQueryError::new(spec.name.clone(), e))
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        let result = ExtractionResult {
            columns: columns.into_iter().map(|(_, col)| col).collect(),
            rows,
        };

        tracing::info!(
            num_records = result.num_records(),
            num_columns = result.num_columns(),
            "Extraction complete",
        );

        Ok(result)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn column_type_for(pg_type: &str) -> Option<ColumnType> {
    match pg_type {
        "INT2" | "INT4" | "INT8" => Some(ColumnType::Int64),
        "FLOAT4" | "FLOAT8" => Some(ColumnType::Float64),
        "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" | "UUID" | "JSON" | "JSONB" => {
            Some(ColumnType::Utf8)
        }
        "TIMESTAMP" | "TIMESTAMPTZ" | "DATE" => Some(ColumnType::Timestamp),
        "BOOL" => Some(ColumnType::Boolean),
        _ => None,
    }
}

fn decode_value(
    row: &PgRow,
    idx: usize,
    pg_type: &str,
    data_type: ColumnType,
) -> Result<Value, sqlx::Error> {
    let value = match (data_type, pg_type) {
        (ColumnType::Int64, "INT2") => row
            .try_get::<Option<i16>, _>(idx)?
            .map_or(Value::Null, |v| Value::Int(i64::from(v))),
        (ColumnType::Int64, "INT4") => row
            .try_get::<Option<i32>, _>(idx)?
            .map_or(Value::Null, |v| Value::Int(i64::from(v))),
        (ColumnType::Int64, _) => row
            .try_get::<Option<i64>, _>(idx)?
            .map_or(Value::Null, Value::Int),
        (ColumnType::Float64, "FLOAT4") => row
            .try_get::<Option<f32>, _>(idx)?
            .map_or(Value::Null, |v| Value::Float(f64::from(v))),
        (ColumnType::Float64, _) => row
            .try_get::<Option<f64>, _>(idx)?
            .map_or(Value::Null, Value::Float),
        (ColumnType::Utf8, "UUID") => row
            .try_get::<Option<sqlx::types::Uuid>, _>(idx)?
            .map_or(Value::Null, |v| Value::Text(v.to_string())),
        (ColumnType::Utf8, "JSON" | "JSONB") => row
            .try_get::<Option<sqlx::types::JsonValue>, _>(idx)?
            .map_or(Value::Null, |v| Value::Text(v.to_string())),
        (ColumnType::Utf8, _) => row
            .try_get::<Option<String>, _>(idx)?
            .map_or(Value::Null, Value::Text),
        (ColumnType::Timestamp, "TIMESTAMPTZ") => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map_or(Value::Null, Value::Timestamp),
        (ColumnType::Timestamp, "DATE") => row
            .try_get::<Option<NaiveDate>, _>(idx)?
            .map_or(Value::Null, |v| {
                Value::Timestamp(v.and_hms_opt(0, 0, 0).unwrap().and_utc())
            }),
        (ColumnType::Timestamp, _) => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map_or(Value::Null, |v| Value::Timestamp(v.and_utc())),
        (ColumnType::Boolean, _) => row
            .try_get::<Option<bool>, _>(idx)?
            .map_or(Value::Null, Value::Bool),
    };
    Ok(value)
}
