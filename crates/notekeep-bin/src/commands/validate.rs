// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use notekeep_api::auth::MIN_SECRET_LEN;
use notekeep_config::{ConfigLoader, NoteKeepConfig};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command.
///
/// Secrets never appear in the output, even with `--show-config`.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = cli.config_path();
    let source = config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults and environment)".to_string());

    let config = ConfigLoader::new()
        .load_optional(config_path.as_deref())
        .map_err(|e| BinError::from(e).with_context("Configuration validation failed"))?;

    let warnings = config_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", source);
            println!();
            println!("Summary:");
            println!("  Listen:          {}", config.server.socket_addr());
            println!("  Role source:     {}", config.auth.role_source);
            println!("  Token lifetime:  {}s", config.auth.jwt.expiration_secs);
            println!("  Admin emails:    {}", config.auth.admin_emails.len());
            println!("  Bootstrap admins: {}", config.bootstrap.admins.len());

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_pretty_json(&config)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": source,
                "summary": {
                    "listen": config.server.socket_addr().to_string(),
                    "role_source": config.auth.role_source,
                    "token_expiration_secs": config.auth.jwt.expiration_secs,
                    "admin_email_count": config.auth.admin_emails.len(),
                    "bootstrap_admin_count": config.bootstrap.admins.len(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!("{}", to_pretty_json(&output)?);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Lists settings that are valid but likely unintended.
pub fn config_warnings(config: &NoteKeepConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    let secret_len = config.auth.jwt.secret.expose().len();
    if secret_len < MIN_SECRET_LEN {
        warnings.push(format!(
            "JWT secret is {} bytes, at least {} recommended",
            secret_len, MIN_SECRET_LEN
        ));
    }

    if config.auth.admin_emails.is_empty() && config.bootstrap.admins.is_empty() {
        warnings.push("No admin emails or bootstrap admins: no account can become admin".to_string());
    }

    let cors = &config.server.cors;
    if cors.allow_credentials && cors.allowed_origins.iter().any(|o| o == "*") {
        warnings.push("CORS allows credentials from any origin".to_string());
    }

    if !config.auth.cookie.secure {
        warnings.push("Session cookie is sent without the Secure attribute".to_string());
    }

    if config.server.expose_internal_errors {
        warnings.push("Internal error details are returned to clients".to_string());
    }

    warnings
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> BinResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BinError::runtime(format!("Failed to render output: {e}")))
}

// =============================================================================
// Tests
// =============================================================================
