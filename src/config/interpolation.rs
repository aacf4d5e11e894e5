// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

use super::error::ConfigError;

/// Resolves `${VAR_NAME}` references in a string from environment variables.
/// Returns `ConfigError::UndefinedVariable` if a referenced variable is not set.
pub fn resolve_variables(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                let value =
                    std::env::var(name).map_err(|_| ConfigError::UndefinedVariable {
                        name: name.to_string(),
                    })?;
                result.push_str(&value);
                rest = &after[end + 1..];
            }
            // Unclosed or empty reference is kept literally
            _ => {
                result.push_str("${");
                rest = after;
            }
        }
    }
    result.push_str(rest);

    Ok(result)
}
