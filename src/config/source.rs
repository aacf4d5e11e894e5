// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use super::error::ConfigError;

/// Where the laoshi.yaml content comes from.
///
/// Production loads the path the CLI picked; tests hand YAML in
/// directly so no fixture files are needed.
pub trait ConfigSource {
    fn load(&self) -> Result<String, ConfigError>;
}

/// Reads the config file from disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<String, ConfigError> {
        std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

/// Inline YAML content, used by tests.
pub struct StringSource {
    pub content: String,
}

impl ConfigSource for StringSource {
    fn load(&self) -> Result<String, ConfigError> {
        Ok(self.content.clone())
    }
}
