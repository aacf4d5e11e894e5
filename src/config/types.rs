// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use crate::course::CourseLevel;

/// Fully validated configuration, produced by `load_config`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Contract version string (currently always "v1").
    pub version: String,
    /// Named upstream endpoints, keyed by their config name.
    pub endpoints: HashMap<String, EndpointConfig>,
    /// Name of the endpoint used when none is requested explicitly.
    pub default_endpoint: String,
    /// Defaults applied to generation requests.
    pub generation: GenerationDefaults,
}

impl Config {
    /// Look up an endpoint by name, falling back to the default endpoint.
    pub fn endpoint(&self, name: Option<&str>) -> Option<&EndpointConfig> {
        self.endpoints
            .get(name.unwrap_or(self.default_endpoint.as_str()))
    }
}

/// One upstream chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub name: String,
    /// Base URL without the `/v1/chat/completions` suffix and without a
    /// trailing slash.
    pub base_url: String,
    pub model: String,
    /// Bearer token, already interpolated from the environment. `None`
    /// means the endpoint is unauthenticated (local model servers).
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

/// Defaults for generation requests that do not specify them.
#[derive(Debug, Clone)]
pub struct GenerationDefaults {
    pub sentence_count: u32,
    pub level: CourseLevel,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            sentence_count: 20,
            level: CourseLevel::Beginner,
        }
    }
}
