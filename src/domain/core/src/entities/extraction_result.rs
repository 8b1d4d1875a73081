// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Semantic column types that survive a round trip through the landed file.
/// The schema of every artifact must be recoverable from the file alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Int64,
    Float64,
    Utf8,
    Timestamp,
    Boolean,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int64 => write!(f, "INTEGER"),
            Self::Float64 => write!(f, "FLOAT"),
            Self::Utf8 => write!(f, "STRING"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: &str, data_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// A single cell value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Bool(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Tabular outcome of one extraction run. Column order is the query's
/// projection order and is preserved through encoding. Owned by the pipeline
/// run that produced it and discarded after the payload is encoded.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionResult {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Value>>,
}

impl ExtractionResult {
    pub fn empty(columns: Vec<ColumnDef>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn num_records(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Per-column ratio of null cells, keyed by column name
    pub fn null_ratios(&self) -> BTreeMap<String, f64> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let nulls = self.rows.iter().filter(|row| row[idx].is_null()).count();
                let ratio = if self.rows.is_empty() {
                    0.0
                } else {
                    nulls as f64 / self.rows.len() as f64
                };
                (col.name.clone(), ratio)
            })
            .collect()
    }

    /// Ratio of null cells across the whole table
    pub fn total_null_ratio(&self) -> f64 {
        let total_cells = self.rows.len() * self.columns.len();
        if total_cells == 0 {
            return 0.0;
        }
        let nulls: usize = self
            .rows
            .iter()
            .map(|row| row.iter().filter(|v| v.is_null()).count())
            .sum();
        nulls as f64 / total_cells as f64
    }

    /// First `n` rows, for spot inspection
    pub fn head(&self, n: usize) -> &[Vec<Value>] {
        &self.rows[..self.rows.len().min(n)]
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_three() -> ExtractionResult {
        ExtractionResult {
            columns: vec![
                ColumnDef::new("id", ColumnType::Int64),
                ColumnDef::new("label", ColumnType::Utf8),
                ColumnDef::new("active", ColumnType::Boolean),
            ],
            rows: vec![
                vec![Value::Int(1), Value::Null, Value::Bool(true)],
                vec![Value::Int(2), Value::Null, Value::Null],
            ],
        }
    }

    #[test]
    fn null_ratios_per_column() {
        let res = two_by_three();
        let ratios = res.null_ratios();
        assert_eq!(ratios["id"], 0.0);
        assert_eq!(ratios["label"], 1.0);
        assert_eq!(ratios["active"], 0.5);
    }

    #[test]
    fn total_null_ratio_counts_all_cells() {
        let res = two_by_three();
        assert_eq!(res.total_null_ratio(), 0.5);
    }

    #[test]
    fn empty_table_has_zero_ratios() {
        let res = ExtractionResult::empty(vec![ColumnDef::new("id", ColumnType::Int64)]);
        assert_eq!(res.total_null_ratio(), 0.0);
        assert_eq!(res.null_ratios()["id"], 0.0);
    }
}
