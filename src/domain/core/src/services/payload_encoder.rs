// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use bytes::Bytes;
use internal_error::{BoxedError, InternalError};
use thiserror::Error;

use crate::ExtractionResult;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Service
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Serializes a tabular extraction result into a self-describing compressed
/// columnar payload and back. Column order of the payload exactly matches the
/// result's column order. The decode direction exists so verification can
/// re-read artifacts without assuming encoding correctness.
pub trait PayloadEncoder: Send + Sync {
    fn encode(&self, result: &ExtractionResult) -> Result<Bytes, EncodingError>;

    fn decode(&self, data: &[u8]) -> Result<ExtractionResult, EncodingError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error(transparent)]
    UnsupportedCodec(#[from] UnsupportedCodecError),
    #[error(transparent)]
    TypeMapping(#[from] TypeMappingError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(Error, Debug)]
#[error("Unsupported compression codec: '{codec_name}'")]
pub struct UnsupportedCodecError {
    pub codec_name: String,
}

/// A column's representation could not be mapped to a columnar-format type.
/// Reports the shape of the offending data for diagnosis.
#[derive(Error, Debug)]
#[error(
    "Cannot map column '{column_name}' to a columnar type ({num_records} records x \
     {num_columns} columns): {source}"
)]
pub struct TypeMappingError {
    pub column_name: String,
    pub num_records: usize,
    pub num_columns: usize,
    #[source]
    pub source: BoxedError,
}
