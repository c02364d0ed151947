// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! On-disk settings consulted by command handlers.
//!
//! Settings live in a single JSON file. A missing file is not an error;
//! it means defaults, so a fresh install works without any setup step.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::doc::DetailTier;

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config file I/O failed: {err}"),
            Self::Parse(err) => write!(f, "config file is not valid JSON: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Settings controlling how much detail serialized documents carry by
/// default, plus free-form prompt snippets clients may fetch by name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailConfig {
    pub output_detail_level: DetailTier,
    pub output_detail_prompts: BTreeMap<String, String>,
}

impl DetailConfig {
    /// Read settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let rendered = serde_json::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    /// Look up a single settings field by its serialized name.
    pub fn variable(&self, name: &str) -> Option<Value> {
        match self.all_variables() {
            Value::Object(mut fields) => fields.remove(name),
            _ => None,
        }
    }

    /// Every settings field, keyed by serialized name.
    pub fn all_variables(&self) -> Value {
        // A struct of plain fields always converts.
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}
