// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use crate::course::CourseLevel;

use super::error::ConfigError;
use super::interpolation::resolve_variables;
use super::raw;
use super::source::ConfigSource;
use super::types::*;

/// Upper bound on sentences per generated course.
pub const MAX_SENTENCE_COUNT: u32 = 100;

/// Load and validate a laoshi config from the given source.
///
/// Steps:
/// 1. Read raw YAML from source
/// 2. Parse YAML into raw deserialization types
/// 3. Validate required fields and values
/// 4. Resolve variable interpolation in api_key fields
/// 5. Build typed Config struct
pub fn load_config(source: &dyn ConfigSource) -> Result<Config, ConfigError> {
    let raw_yaml = source.load()?;
    let raw: raw::RawConfig = serde_yaml::from_str(&raw_yaml)?;

    // Validate version
    if raw.laoshi != "v1" {
        return Err(ConfigError::Validation(format!(
            "unsupported config version \"{}\", expected \"v1\"",
            raw.laoshi
        )));
    }

    if raw.endpoints.is_empty() {
        return Err(ConfigError::Validation(
            "config must define at least one endpoint".into(),
        ));
    }

    // Build endpoints
    let mut endpoints = HashMap::with_capacity(raw.endpoints.len());
    for (name, raw_endpoint) in raw.endpoints {
        let endpoint = build_endpoint(&name, raw_endpoint)?;
        endpoints.insert(name, endpoint);
    }

    // The default endpoint must exist. With a single endpoint it may be
    // left implicit.
    let default_endpoint = match raw.default_endpoint {
        Some(name) => {
            if !endpoints.contains_key(&name) {
                return Err(ConfigError::Validation(format!(
                    "default_endpoint \"{name}\" is not a configured endpoint"
                )));
            }
            name
        }
        None if endpoints.len() == 1 => endpoints.keys().next().cloned().unwrap_or_default(),
        None => {
            return Err(ConfigError::Validation(
                "default_endpoint is required when multiple endpoints are configured".into(),
            ));
        }
    };

    let generation = build_generation_defaults(raw.generation)?;

    Ok(Config {
        version: raw.laoshi,
        endpoints,
        default_endpoint,
        generation,
    })
}

fn build_endpoint(name: &str, raw: raw::RawEndpoint) -> Result<EndpointConfig, ConfigError> {
    if raw.base_url.is_empty() {
        return Err(ConfigError::Validation(format!(
            "endpoint \"{name}\" has an empty base_url"
        )));
    }
    if raw.model.is_empty() {
        return Err(ConfigError::Validation(format!(
            "endpoint \"{name}\" has an empty model"
        )));
    }
    if raw.timeout_ms == 0 {
        return Err(ConfigError::Validation(format!(
            "endpoint \"{name}\" timeout_ms must be > 0"
        )));
    }

    // Resolve ${VAR} references in the API key so secrets stay out of the
    // config file.
    let api_key = match &raw.api_key {
        Some(key) => {
            let resolved = resolve_variables(key)?;
            if resolved.is_empty() {
                None
            } else {
                Some(resolved)
            }
        }
        None => None,
    };

    Ok(EndpointConfig {
        name: name.to_string(),
        base_url: raw.base_url.trim_end_matches('/').to_string(),
        model: raw.model,
        api_key,
        timeout_ms: raw.timeout_ms,
    })
}

fn build_generation_defaults(
    raw: Option<raw::RawGenerationDefaults>,
) -> Result<GenerationDefaults, ConfigError> {
    let raw = match raw {
        Some(r) => r,
        None => return Ok(GenerationDefaults::default()),
    };

    let defaults = GenerationDefaults::default();

    let sentence_count = raw.sentence_count.unwrap_or(defaults.sentence_count);
    if sentence_count == 0 || sentence_count > MAX_SENTENCE_COUNT {
        return Err(ConfigError::Validation(format!(
            "generation sentence_count must be in 1..={MAX_SENTENCE_COUNT}, got {sentence_count}"
        )));
    }

    let level = match raw.level.as_deref() {
        Some(s) => CourseLevel::parse(s).ok_or_else(|| {
            ConfigError::Validation(format!(
                "unknown generation level \"{s}\", expected \"beginner\", \"intermediate\", or \"advanced\""
            ))
        })?,
        None => defaults.level,
    };

    Ok(GenerationDefaults {
        sentence_count,
        level,
    })
}
