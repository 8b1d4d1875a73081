// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Parser, Debug)]
#[command(
    name = crate::app::BINARY_NAME,
    version,
    about = "Lands relational datasets into the bronze layer of the data lake",
)]
pub struct Cli {
    /// Sets the level of logging verbosity (repeat for more)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Landing target to use [env: LANDING_TARGET]
    #[arg(long, global = true, value_enum)]
    pub target: Option<TargetKind>,

    /// Root directory of the local landing target [env: LANDING_OUTPUT_DIR]
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Bucket of the remote landing target [env: LANDING_S3_BUCKET]
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    Local,
    S3,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extracts a dataset from the relational source and lands it as a
    /// partitioned artifact
    Land(LandArgs),

    /// Re-reads landed artifacts of one partition and reports their quality
    Verify(VerifyArgs),

    /// Lists the registered datasets
    Datasets(DatasetsArgs),
}

#[derive(clap::Args, Debug)]
pub struct LandArgs {
    /// Name of the dataset to land
    pub dataset: String,
}

#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    /// Name of the dataset to verify
    pub dataset: String,

    /// Execution date of the partition [default: today]
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Number of rows to sample for spot inspection
    #[arg(long, default_value_t = 5)]
    pub sample: usize,
}

#[derive(clap::Args, Debug)]
pub struct DatasetsArgs {}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_verify_with_date_and_sample() {
        let cli = Cli::parse_from([
            "strix-bronze",
            "verify",
            "vehicles",
            "--date",
            "2024-01-15",
            "--sample",
            "10",
        ]);

        let Command::Verify(args) = cli.command else {
            panic!("expected verify subcommand");
        };
        assert_eq!(args.dataset, "vehicles");
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(args.sample, 10);
    }

    #[test]
    fn parses_global_target_flags() {
        let cli = Cli::parse_from([
            "strix-bronze",
            "land",
            "devices",
            "--target",
            "s3",
            "--bucket",
            "growth-datalake",
        ]);

        assert_eq!(cli.target, Some(TargetKind::S3));
        assert_eq!(cli.bucket.as_deref(), Some("growth-datalake"));
    }
}
