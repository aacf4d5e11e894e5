// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

// Raw YAML deserialization types (internal)
// These are separate from the public Config structs because we do variable
// interpolation and validation between raw and public, and it keeps the
// public API clean.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub laoshi: String,
    #[serde(default)]
    pub endpoints: HashMap<String, RawEndpoint>,
    pub default_endpoint: Option<String>,
    pub generation: Option<RawGenerationDefaults>,
}

#[derive(Debug, Deserialize)]
pub struct RawEndpoint {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct RawGenerationDefaults {
    pub sentence_count: Option<u32>,
    pub level: Option<String>,
}

fn default_timeout_ms() -> u64 {
    120_000
}
