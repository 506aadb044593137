// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::BufRead;

use crate::cli::{Cli, HashPasswordArgs};
use crate::error::{BinError, BinResult};

/// Prints the Argon2id PHC string for a password.
pub fn hash_password(_cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = match args.value {
        Some(value) if !args.stdin => value,
        _ => read_password(std::io::stdin().lock())?,
    };

    println!("{}", hash_value(&password)?);
    Ok(())
}

fn read_password(mut input: impl BufRead) -> BinResult<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn hash_value(password: &str) -> BinResult<String> {
    if password.is_empty() {
        return Err(BinError::runtime("Password must not be empty"));
    }
    Ok(notekeep_core::password::hash_password(password)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_password_strips_line_ending() {
        let password = read_password("hunter2\r\n".as_bytes()).unwrap();
        assert_eq!(password, "hunter2");

        let password = read_password(" spaced \n".as_bytes()).unwrap();
        assert_eq!(password, " spaced ");
    }

    #[test]
    fn test_hash_value() {
        let phc = hash_value("hunter2").unwrap();
        assert!(phc.starts_with("$argon2id$"));
        assert!(notekeep_core::password::verify_password("hunter2", &phc).unwrap());

        assert!(hash_value("").is_err());
    }
}
