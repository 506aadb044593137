// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::logging::{effective_level, init_logging};
use crate::runtime::RuntimeBuilder;

/// Executes the `run` command to start the server.
///
/// Logging is installed after the configuration loads, since the file may
/// set the level and format.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    let runtime = RuntimeBuilder::new()
        .config_path(cli.config_path())
        .dev_mode(args.dev_mode)
        .build()?;

    let logging = &runtime.config().logging;
    let level = effective_level(cli.log_level_override(), logging.level.as_str());
    let format = cli.log_format.map(Into::into).unwrap_or(logging.format);
    init_logging(level, format)?;

    runtime.run().await
}
