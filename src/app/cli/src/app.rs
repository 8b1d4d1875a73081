// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use console::style;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use strix_bronze::utils::s3_context::S3Context;
use strix_bronze::*;
use strix_bronze_core::*;

use crate::commands::*;
use crate::config::*;
use crate::{cli, CLIError};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub const BINARY_NAME: &str = "strix-bronze";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LOGGING_CONFIG: &str = "warn";
const VERBOSE_LOGGING_CONFIG: &str = "info";
const VERY_VERBOSE_LOGGING_CONFIG: &str = "debug";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn run(args: cli::Cli) -> Result<(), CLIError> {
    let config = RuntimeConfig::from_env(&args)?;

    tracing::info!(
        version = VERSION,
        args = ?std::env::args().collect::<Vec<_>>(),
        ?config,
        "Initializing strix-bronze",
    );

    let registry: Arc<dyn DatasetRegistry> = Arc::new(DatasetRegistryImpl::builtin());

    let mut command: Box<dyn Command> = match args.command {
        cli::Command::Land(c) => {
            let pool = connect_pool(&DbConfig::from_env()?).await?;
            let store = build_store(&config.storage).await;
            let encoder = build_encoder(&config.compression)?;
            let verification_svc: Arc<dyn VerificationService> =
                Arc::new(VerificationServiceImpl::new(store.clone(), encoder.clone()));

            let landing_svc: Arc<dyn LandingService> = Arc::new(LandingServiceImpl::new(
                registry,
                Arc::new(ExtractionServicePostgres::new(pool)),
                encoder,
                store.clone(),
                verification_svc,
                Arc::new(SystemTimeSourceDefault),
                config.source_name.clone(),
            ));

            Box::new(LandCommand::new(
                landing_svc,
                store.url(),
                config.source_name,
                c.dataset,
            ))
        }

        cli::Command::Verify(c) => {
            let store = build_store(&config.storage).await;
            let encoder = build_encoder(&config.compression)?;
            let verification_svc: Arc<dyn VerificationService> =
                Arc::new(VerificationServiceImpl::new(store, encoder));

            Box::new(VerifyCommand::new(
                registry,
                verification_svc,
                Arc::new(SystemTimeSourceDefault),
                config.source_name,
                c.dataset,
                c.date,
                c.sample,
            ))
        }

        cli::Command::Datasets(_) => Box::new(DatasetsCommand::new(registry)),
    };

    let result = command.run().await;

    match &result {
        Ok(()) => tracing::info!("Command successful"),
        Err(e) => tracing::error!(error = ?e, "Command failed"),
    }

    result
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

async fn connect_pool(db: &DbConfig) -> Result<PgPool, CLIError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&db.connection_url())
        .await
        .map_err(|e| CLIError::ConnectionFailed { source: e.into() })?;

    eprintln!(
        "{} {}:{}/{}",
        style("Connected to PostgreSQL at").green(),
        db.host,
        db.port,
        db.database,
    );

    Ok(pool)
}

async fn build_store(storage: &StorageConfig) -> Arc<dyn LandingStore> {
    match storage {
        StorageConfig::LocalFs { root } => Arc::new(LandingStoreLocalFs::new(root.clone())),
        StorageConfig::S3 { bucket, endpoint } => Arc::new(LandingStoreS3::new(
            S3Context::from_items(endpoint.clone(), bucket.clone()).await,
        )),
    }
}

fn build_encoder(compression: &str) -> Result<Arc<dyn PayloadEncoder>, CLIError> {
    Ok(Arc::new(
        ParquetEncoder::from_codec_name(compression)
            .map_err(|e| CLIError::usage_error(e.to_string()))?,
    ))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub fn configure_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let default_directive = match verbosity {
        0 => DEFAULT_LOGGING_CONFIG,
        1 => VERBOSE_LOGGING_CONFIG,
        _ => VERY_VERBOSE_LOGGING_CONFIG,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
