// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::{BoxedError, InternalError};
use strix_bronze_core::{LandingError, VerificationError};
use thiserror::Error;

use crate::config::ConfigError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug)]
pub enum CLIError {
    /// Invalid command-line invocation or configuration
    #[error("{msg}")]
    UsageError { msg: String },

    /// The run failed in a way already explained to the user
    #[error("{msg}")]
    Failure { msg: String },

    #[error("Failed to connect to PostgreSQL: {source}")]
    ConnectionFailed {
        #[source]
        source: BoxedError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Landing(#[from] LandingError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl CLIError {
    pub fn usage_error(msg: impl Into<String>) -> Self {
        Self::UsageError { msg: msg.into() }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self::Failure { msg: msg.into() }
    }
}
