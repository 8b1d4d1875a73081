// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod common;
pub use common::*;

mod datasets_command;
pub use datasets_command::*;

mod land_command;
pub use land_command::*;

mod verify_command;
pub use verify_command::*;

use crate::CLIError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait(?Send)]
pub trait Command {
    async fn run(&mut self) -> Result<(), CLIError>;
}
