// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{
    ArrayRef,
    BooleanArray,
    Float64Array,
    Int64Array,
    StringArray,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::DateTime;
use internal_error::*;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{BrotliLevel, Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use strix_bronze_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Compression codecs accepted for the landed payload. Name set mirrors what
/// the downstream consumers' readers accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompressionCodec {
    Snappy,
    Gzip,
    Zstd,
    Lz4,
    Brotli,
    Uncompressed,
}

impl Default for CompressionCodec {
    fn default() -> Self {
        Self::Snappy
    }
}

impl FromStr for CompressionCodec {
    type Err = UnsupportedCodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "snappy" => Ok(Self::Snappy),
            "gzip" => Ok(Self::Gzip),
            "zstd" => Ok(Self::Zstd),
            "lz4" => Ok(Self::Lz4),
            "brotli" => Ok(Self::Brotli),
            "uncompressed" | "none" => Ok(Self::Uncompressed),
            _ => Err(UnsupportedCodecError {
                codec_name: s.to_string(),
            }),
        }
    }
}

impl CompressionCodec {
    fn to_parquet(self) -> Compression {
        match self {
            Self::Snappy => Compression::SNAPPY,
            Self::Gzip => Compression::GZIP(GzipLevel::default()),
            Self::Zstd => Compression::ZSTD(ZstdLevel::default()),
            Self::Lz4 => Compression::LZ4_RAW,
            Self::Brotli => Compression::BROTLI(BrotliLevel::default()),
            Self::Uncompressed => Compression::UNCOMPRESSED,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Encodes extraction results as self-describing Parquet, preserving the
/// query's column order. Timestamps are stored as microseconds in UTC.
#[derive(Debug)]
pub struct ParquetEncoder {
    codec: CompressionCodec,
}

impl ParquetEncoder {
    pub fn new(codec: CompressionCodec) -> Self {
        Self { codec }
    }

    /// The codec name is a configuration input; an unsupported name is a
    /// fatal configuration error surfaced at this boundary
    pub fn from_codec_name(name: &str) -> Result<Self, UnsupportedCodecError> {
        Ok(Self::new(name.parse()?))
    }

    fn arrow_schema(columns: &[ColumnDef]) -> SchemaRef {
        Arc::new(Schema::new(
            columns
                .iter()
                .map(|col| Field::new(&col.name, arrow_type(col.data_type), true))
                .collect::<Vec<_>>(),
        ))
    }

    fn column_to_array(
        result: &ExtractionResult,
        idx: usize,
    ) -> Result<ArrayRef, TypeMappingError> {
        let col = &result.columns[idx];
        let mismatch = |value: &Value| TypeMappingError {
            column_name: col.name.clone(),
            num_records: result.num_records(),
            num_columns: result.num_columns(),
            source: format!("value {value:?} does not match column type {}", col.data_type).into(),
        };

        let array: ArrayRef = match col.data_type {
            ColumnType::Int64 => {
                let values: Vec<Option<i64>> = result
                    .rows
                    .iter()
                    .map(|row| match &row[idx] {
                        Value::Null => Ok(None),
                        Value::Int(v) => Ok(Some(*v)),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<_, _>>()?;
                Arc::new(Int64Array::from(values))
            }
            ColumnType::Float64 => {
                let values: Vec<Option<f64>> = result
                    .rows
                    .iter()
                    .map(|row| match &row[idx] {
                        Value::Null => Ok(None),
                        Value::Float(v) => Ok(Some(*v)),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<_, _>>()?;
                Arc::new(Float64Array::from(values))
            }
            ColumnType::Utf8 => {
                let values: Vec<Option<String>> = result
                    .rows
                    .iter()
                    .map(|row| match &row[idx] {
                        Value::Null => Ok(None),
                        Value::Text(v) => Ok(Some(v.clone())),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<_, _>>()?;
                Arc::new(StringArray::from(values))
            }
            ColumnType::Timestamp => {
                let values: Vec<Option<i64>> = result
                    .rows
                    .iter()
                    .map(|row| match &row[idx] {
                        Value::Null => Ok(None),
                        Value::Timestamp(v) => Ok(Some(v.timestamp_micros())),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<_, _>>()?;
                Arc::new(TimestampMicrosecondArray::from(values).with_timezone("UTC"))
            }
            ColumnType::Boolean => {
                let values: Vec<Option<bool>> = result
                    .rows
                    .iter()
                    .map(|row| match &row[idx] {
                        Value::Null => Ok(None),
                        Value::Bool(v) => Ok(Some(*v)),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<_, _>>()?;
                Arc::new(BooleanArray::from(values))
            }
        };
        Ok(array)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl PayloadEncoder for ParquetEncoder {
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(num_records = result.num_records(), num_columns = result.num_columns())
    )]
    fn encode(&self, result: &ExtractionResult) -> Result<Bytes, EncodingError> {
        let schema = Self::arrow_schema(&result.columns);

        let arrays = (0..result.num_columns())
            .map(|idx| Self::column_to_array(result, idx))
            .collect::<Result<Vec<_>, _>>()?;

        let batch = RecordBatch::try_new(schema.clone(), arrays).int_err()?;

        let props = WriterProperties::builder()
            .set_compression(self.codec.to_parquet())
            .build();

        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, Some(props)).int_err()?;
        writer.write(&batch).int_err()?;
        writer.close().int_err()?;

        Ok(Bytes::from(buf))
    }

    fn decode(&self, data: &[u8]) -> Result<ExtractionResult, EncodingError> {
        let builder =
            ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(data)).int_err()?;

        // Schema comes from the file footer, so it is recoverable even when
        // the file holds zero rows
        let schema = builder.schema().clone();
        let columns = schema
            .fields()
            .iter()
            .map(|field| {
                Ok(ColumnDef::new(
                    field.name(),
                    column_type(field.data_type()).ok_or_else(|| TypeMappingError {
                        column_name: field.name().clone(),
                        num_records: 0,
                        num_columns: schema.fields().len(),
                        source: format!("unexpected columnar type {:?}", field.data_type()).into(),
                    })?,
                ))
            })
            .collect::<Result<Vec<_>, TypeMappingError>>()?;

        let reader = builder.build().int_err()?;

        let mut rows = Vec::new();
        for batch in reader {
            let batch = batch.int_err()?;
            append_rows(&mut rows, &batch)?;
        }

        Ok(ExtractionResult { columns, rows })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn arrow_type(t: ColumnType) -> DataType {
    match t {
        ColumnType::Int64 => DataType::Int64,
        ColumnType::Float64 => DataType::Float64,
        ColumnType::Utf8 => DataType::Utf8,
        ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        ColumnType::Boolean => DataType::Boolean,
    }
}

fn column_type(t: &DataType) -> Option<ColumnType> {
    match t {
        DataType::Int64 => Some(ColumnType::Int64),
        DataType::Float64 => Some(ColumnType::Float64),
        DataType::Utf8 => Some(ColumnType::Utf8),
        DataType::Timestamp(TimeUnit::Microsecond, _) => Some(ColumnType::Timestamp),
        DataType::Boolean => Some(ColumnType::Boolean),
        _ => None,
    }
}

fn append_rows(rows: &mut Vec<Vec<Value>>, batch: &RecordBatch) -> Result<(), EncodingError> {
    use arrow::array::Array;

    for row_idx in 0..batch.num_rows() {
        let mut row = Vec::with_capacity(batch.num_columns());

        for col_idx in 0..batch.num_columns() {
            let array = batch.column(col_idx);
            if array.is_null(row_idx) {
                row.push(Value::Null);
                continue;
            }

            let value = match array.data_type() {
                DataType::Int64 => {
                    let array = array.as_any().downcast_ref::<Int64Array>().unwrap();
                    Value::Int(array.value(row_idx))
                }
                DataType::Float64 => {
                    let array = array.as_any().downcast_ref::<Float64Array>().unwrap();
                    Value::Float(array.value(row_idx))
                }
                DataType::Utf8 => {
                    let array = array.as_any().downcast_ref::<StringArray>().unwrap();
                    Value::Text(array.value(row_idx).to_string())
                }
                DataType::Timestamp(TimeUnit::Microsecond, _) => {
                    let array = array
                        .as_any()
                        .downcast_ref::<TimestampMicrosecondArray>()
                        .unwrap();
                    let micros = array.value(row_idx);
                    Value::Timestamp(
                        DateTime::from_timestamp_micros(micros)
                            .ok_or_else(|| format!("timestamp out of range: {micros}").int_err())?,
                    )
                }
                DataType::Boolean => {
                    let array = array.as_any().downcast_ref::<BooleanArray>().unwrap();
                    Value::Bool(array.value(row_idx))
                }
                other => {
                    return Err(TypeMappingError {
                        column_name: batch.schema().field(col_idx).name().clone(),
                        num_records: batch.num_rows(),
                        num_columns: batch.num_columns(),
                        source: format!("unexpected columnar type {other:?}").into(),
                    }
                    .into())
                }
            };
            row.push(value);
        }

        rows.push(row);
    }

    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn mixed_result() -> ExtractionResult {
        ExtractionResult {
            columns: vec![
                ColumnDef::new("id", ColumnType::Int64),
                ColumnDef::new("battery_level", ColumnType::Float64),
                ColumnDef::new("label", ColumnType::Utf8),
                ColumnDef::new("created_datetime", ColumnType::Timestamp),
                ColumnDef::new("active", ColumnType::Boolean),
            ],
            rows: vec![
                vec![
                    Value::Int(1),
                    Value::Float(0.87),
                    Value::Text("pickup".to_string()),
                    Value::Timestamp(Utc.with_ymd_and_hms(2024, 6, 1, 9, 15, 30).unwrap()),
                    Value::Bool(true),
                ],
                vec![
                    Value::Int(2),
                    Value::Null,
                    Value::Null,
                    Value::Null,
                    Value::Null,
                ],
            ],
        }
    }

    #[test]
    fn round_trip_preserves_counts_order_and_values() {
        let encoder = ParquetEncoder::new(CompressionCodec::Snappy);
        let original = mixed_result();

        let payload = encoder.encode(&original).unwrap();
        let decoded = encoder.decode(&payload).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn round_trip_of_empty_result_keeps_schema() {
        let encoder = ParquetEncoder::new(CompressionCodec::Gzip);
        let original = ExtractionResult::empty(vec![
            ColumnDef::new("id", ColumnType::Int64),
            ColumnDef::new("label", ColumnType::Utf8),
        ]);

        let payload = encoder.encode(&original).unwrap();
        let decoded = encoder.decode(&payload).unwrap();

        assert_eq!(decoded.num_records(), 0);
        assert_eq!(decoded.columns, original.columns);
    }

    #[test]
    fn rejects_unsupported_codec_name() {
        let err = ParquetEncoder::from_codec_name("pied-piper").unwrap_err();
        assert_eq!(err.codec_name, "pied-piper");
    }

    #[test]
    fn reports_shape_on_type_mismatch() {
        let encoder = ParquetEncoder::new(CompressionCodec::default());
        let broken = ExtractionResult {
            columns: vec![ColumnDef::new("id", ColumnType::Int64)],
            rows: vec![vec![Value::Text("not-a-number".to_string())]],
        };

        let err = encoder.encode(&broken).unwrap_err();
        let EncodingError::TypeMapping(err) = err else {
            panic!("expected type mapping error, got: {err}");
        };
        assert_eq!(err.column_name, "id");
        assert_eq!(err.num_records, 1);
        assert_eq!(err.num_columns, 1);
    }
}
