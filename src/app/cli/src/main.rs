// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use clap::Parser;
use console::style;
use strix_bronze_cli::{app, cli};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args = cli::Cli::parse();
    app::configure_logging(args.verbose);

    match app::run(args).await {
        Ok(()) => (),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn display_error(e: &impl std::error::Error) {
    eprintln!("{}: {e}", style("Error").red().bold());

    let mut source = e.source();
    while let Some(cause) = source {
        eprintln!("  {} {cause}", style("Caused by:").dim());
        source = cause.source();
    }
}
