// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! NoteKeep server entry point.

use notekeep_bin::cli::Cli;
use notekeep_bin::commands;
use notekeep_bin::error::report_error_and_exit;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(err) = commands::execute(cli).await {
        report_error_and_exit(err);
    }
}
