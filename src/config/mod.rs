//! Flat job configuration shipped from the driver to every worker
//!
//! The job framework only carries string keys mapped to string values. All
//! structured input settings are encoded into a [`JobConfig`] by the driver
//! and decoded again on each worker; see [`crate::codec`] for the escaping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ErrorCode, InputError, Result};

pub mod job_file;

pub use job_file::{IteratorEntry, JobFile, OptionEntry};

/// Flat string-keyed configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobConfig {
    entries: BTreeMap<String, String>,
}

impl JobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize for transport to a worker
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            InputError::malformed_with_code(
                ErrorCode::CONFIG_PARSE_ERROR,
                "<config>",
                "cannot serialize configuration",
            )
            .with_source(e)
        })
    }

    /// Rebuild a configuration received from the driver
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            InputError::malformed_with_code(
                ErrorCode::CONFIG_PARSE_ERROR,
                "<config>",
                "configuration is not a flat JSON object of strings",
            )
            .with_source(e)
        })
    }
}

/// Reserved configuration keys under one stable prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigKeys {
    prefix: String,
}

impl ConfigKeys {
    pub const DEFAULT_PREFIX: &'static str = "TabletInputFormat";

    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn max_versions(&self) -> String {
        format!("{}.maxVersions", self.prefix)
    }

    pub fn iterators(&self) -> String {
        format!("{}.iterators", self.prefix)
    }

    pub fn iterator_options(&self) -> String {
        format!("{}.iterators.options", self.prefix)
    }

    pub fn table(&self) -> String {
        format!("{}.table", self.prefix)
    }

    pub fn authorizations(&self) -> String {
        format!("{}.authorizations", self.prefix)
    }
}

impl Default for ConfigKeys {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX)
    }
}
