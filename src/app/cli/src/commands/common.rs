// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use console::style;
use strix_bronze_core::{DatasetName, InvalidDatasetNameError, VerificationReport};

use crate::CLIError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

const MAX_SCHEMA_COLUMNS_SHOWN: usize = 10;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub fn parse_dataset_name(s: &str) -> Result<DatasetName, CLIError> {
    s.parse()
        .map_err(|e: InvalidDatasetNameError| CLIError::usage_error(e.to_string()))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub fn print_report(report: &VerificationReport) {
    eprintln!("  {}", style(&report.artifact_key).bold());
    eprintln!(
        "    Size: {}    Records: {}    Columns: {}",
        humansize::format_size(report.size, humansize::BINARY),
        report.num_records,
        report.num_columns,
    );

    for col in report.columns.iter().take(MAX_SCHEMA_COLUMNS_SHOWN) {
        eprintln!(
            "    {:<24} {:<10} nulls: {:.2}",
            col.name, col.data_type, report.null_ratios[&col.name],
        );
    }
    if report.columns.len() > MAX_SCHEMA_COLUMNS_SHOWN {
        eprintln!(
            "    ... and {} more columns",
            report.columns.len() - MAX_SCHEMA_COLUMNS_SHOWN
        );
    }

    for check in &report.checks {
        let mark = if check.passed {
            style("ok").green()
        } else {
            style("FAILED").red().bold()
        };
        eprintln!("    [{mark}] {}", check.description);
    }
}
