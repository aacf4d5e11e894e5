// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Everything that can go wrong between a config path and a usable
/// `Config`. Messages name the offending value so a bad laoshi.yaml is
/// fixable from the error alone.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Validation(String),

    #[error("config references ${{{name}}} but it is not set in the environment")]
    UndefinedVariable { name: String },
}
