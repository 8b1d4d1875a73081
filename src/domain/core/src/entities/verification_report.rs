// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use crate::{ColumnDef, Value};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Outcome of one quality check applied to a landed artifact
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualityCheck {
    pub description: String,
    pub passed: bool,
}

impl QualityCheck {
    pub fn new(description: impl Into<String>, passed: bool) -> Self {
        Self {
            description: description.into(),
            passed,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Structural stats and quality checks recomputed from an independent re-read
/// of one landed artifact. Exists for the duration of one verification call.
#[derive(Clone, Debug)]
pub struct VerificationReport {
    pub artifact_key: String,
    pub size: u64,
    pub num_records: usize,
    pub num_columns: usize,
    pub columns: Vec<ColumnDef>,
    pub null_ratios: BTreeMap<String, f64>,
    /// First rows of the decoded payload, for spot inspection
    pub sample: Vec<Vec<Value>>,
    pub checks: Vec<QualityCheck>,
}

impl VerificationReport {
    /// Conjunction of all applied checks
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Aggregate over all artifacts of one partition
#[derive(Debug)]
pub struct PartitionVerificationSummary {
    pub reports: Vec<VerificationReport>,
    pub total_bytes: u64,
    pub total_records: usize,
}

impl PartitionVerificationSummary {
    pub fn from_reports(reports: Vec<VerificationReport>) -> Self {
        let total_bytes = reports.iter().map(|r| r.size).sum();
        let total_records = reports.iter().map(|r| r.num_records).sum();
        Self {
            reports,
            total_bytes,
            total_records,
        }
    }

    pub fn total_artifacts(&self) -> usize {
        self.reports.len()
    }

    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(VerificationReport::passed)
    }
}
