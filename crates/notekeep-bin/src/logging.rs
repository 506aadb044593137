// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.
//!
//! `RUST_LOG`, when set, replaces the configured level entirely. Noisy
//! transport crates are clamped either way.

use notekeep_config::LogFormat;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{BinError, BinResult};

const CLAMPED_DIRECTIVES: [&str; 3] = ["hyper=warn", "tower=warn", "tokio=info"];

// =============================================================================
// Logging Initialization
// =============================================================================

/// Initializes the global subscriber.
///
/// # Errors
///
/// Fails if `level` is not a valid filter directive or a global subscriber
/// is already installed.
pub fn init_logging(level: &str, format: LogFormat) -> BinResult<()> {
    let filter = build_filter(level)?;

    let result = match format {
        LogFormat::Text => {
            let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_ansi(is_terminal),
                )
                .try_init()
        }
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Compact => {
            let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_ansi(is_terminal),
                )
                .try_init()
        }
    };

    result.map_err(|e| BinError::init(format!("Failed to install log subscriber: {e}")))
}

/// Builds the filter from `RUST_LOG` or the given level.
pub fn build_filter(level: &str) -> BinResult<EnvFilter> {
    let base = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| BinError::config(format!("Invalid log level '{level}': {e}")))?,
    };

    CLAMPED_DIRECTIVES.iter().try_fold(base, |filter, directive| {
        directive
            .parse()
            .map(|d| filter.add_directive(d))
            .map_err(|e| BinError::init(format!("Invalid log directive '{directive}': {e}")))
    })
}

/// Resolves the effective level from a command-line override and the
/// configured level.
pub fn effective_level<'a>(cli_override: Option<&'a str>, configured: &'a str) -> &'a str {
    cli_override.unwrap_or(configured)
}

// =============================================================================
// Tests
// =============================================================================
