//! Iterator-stack encoding
//!
//! Iterators and their options are kept in two parallel append-only lists:
//!
//! - `<prefix>.iterators` holds one `priority:class:name` record per iterator
//! - `<prefix>.iterators.options` holds one `name:key:value` record per option
//!
//! [`iterator_stack`] joins the two by name on the worker side.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::codec::{self, CodecError};
use crate::config::{ConfigKeys, JobConfig};
use crate::error::{ErrorCode, InputError, Result};

/// A named, prioritized server-side iterator with its options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IteratorSetting {
    priority: u32,
    name: String,
    class_name: String,
    options: Vec<(String, String)>,
}

impl IteratorSetting {
    pub fn new(priority: u32, name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            priority,
            name: name.into(),
            class_name: class_name.into(),
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_option(key, value);
        self
    }

    /// Append an option; keys may repeat
    pub fn add_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.push((key.into(), value.into()));
    }

    pub fn set_priority(&mut self, priority: u32) {
        self.priority = priority;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }

    /// Last value set for `key`, if any
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn to_token(&self) -> String {
        let priority = self.priority.to_string();
        codec::encode_record(&[
            priority.as_str(),
            self.class_name.as_str(),
            self.name.as_str(),
        ])
    }
}

/// One flattened option record as stored in the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IteratorOption {
    pub iterator_name: String,
    pub key: String,
    pub value: String,
}

impl IteratorOption {
    pub fn new(
        iterator_name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            iterator_name: iterator_name.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Encoded record for this option
    pub fn to_token(&self) -> String {
        codec::encode_record(&[&self.iterator_name, &self.key, &self.value])
    }
}

impl fmt::Display for IteratorOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

/// Iterators ordered by ascending priority, options attached
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IteratorStack {
    settings: Vec<IteratorSetting>,
}

impl IteratorStack {
    /// Build a stack, stably sorting by priority
    pub fn new(mut settings: Vec<IteratorSetting>) -> Self {
        settings.sort_by_key(IteratorSetting::priority);
        Self { settings }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IteratorSetting> {
        self.settings.iter()
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&IteratorSetting> {
        self.settings.iter().find(|s| s.name == name)
    }

    pub fn into_settings(self) -> Vec<IteratorSetting> {
        self.settings
    }
}

impl<'a> IntoIterator for &'a IteratorStack {
    type Item = &'a IteratorSetting;
    type IntoIter = std::slice::Iter<'a, IteratorSetting>;

    fn into_iter(self) -> Self::IntoIter {
        self.settings.iter()
    }
}

/// Append an iterator and its options to the configuration
///
/// Both lists are computed before either is written, so a corrupt existing
/// value leaves the configuration untouched.
pub fn add_iterator(
    keys: &ConfigKeys,
    config: &mut JobConfig,
    setting: &IteratorSetting,
) -> Result<()> {
    let iterators_key = keys.iterators();
    let options_key = keys.iterator_options();

    let iterators = codec::append_to_list(config.get(&iterators_key), &setting.to_token())
        .map_err(|e| malformed_list(&iterators_key, e))?;

    let mut options = config.get(&options_key).map(str::to_string);
    for (key, value) in &setting.options {
        let token = IteratorOption::new(&setting.name, key, value).to_token();
        let appended = codec::append_to_list(options.as_deref(), &token)
            .map_err(|e| malformed_list(&options_key, e))?;
        options = Some(appended);
    }

    config.set(iterators_key, iterators);
    if let Some(options) = options {
        config.set(options_key, options);
    }

    debug!(
        priority = setting.priority,
        name = %setting.name,
        class = %setting.class_name,
        options = setting.options.len(),
        "Added iterator to job configuration"
    );
    Ok(())
}

/// Decode the iterators in the order they were added, without options
pub fn iterators(keys: &ConfigKeys, config: &JobConfig) -> Result<Vec<IteratorSetting>> {
    let key = keys.iterators();
    let records = decode_records(config, &key)?;

    let settings = records
        .into_iter()
        .map(|fields| {
            let [priority, class_name, name] = three_fields(&key, fields)?;
            let priority = priority.parse::<u32>().map_err(|e| {
                InputError::malformed_with_code(
                    ErrorCode::CONFIG_MALFORMED_RECORD,
                    &key,
                    format!("iterator priority '{}' is not a non-negative integer", priority),
                )
                .with_source(e)
            })?;
            Ok(IteratorSetting::new(priority, name, class_name))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(count = settings.len(), "Decoded iterators");
    Ok(settings)
}

/// Decode every option record in the order it was added
pub fn iterator_options(keys: &ConfigKeys, config: &JobConfig) -> Result<Vec<IteratorOption>> {
    let key = keys.iterator_options();
    let records = decode_records(config, &key)?;

    let options = records
        .into_iter()
        .map(|fields| {
            let [iterator_name, option_key, value] = three_fields(&key, fields)?;
            Ok(IteratorOption {
                iterator_name,
                key: option_key,
                value,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(count = options.len(), "Decoded iterator options");
    Ok(options)
}

/// Decode the complete stack: options joined onto their iterators, sorted by priority
pub fn iterator_stack(keys: &ConfigKeys, config: &JobConfig) -> Result<IteratorStack> {
    let mut settings = iterators(keys, config)?;

    let mut by_name = HashMap::with_capacity(settings.len());
    for (idx, setting) in settings.iter().enumerate() {
        if by_name.insert(setting.name.clone(), idx).is_some() {
            return Err(InputError::malformed_with_code(
                ErrorCode::CONFIG_DUPLICATE_ITERATOR,
                keys.iterators(),
                format!("iterator name '{}' is used more than once", setting.name),
            ));
        }
    }

    for option in iterator_options(keys, config)? {
        let idx = *by_name.get(&option.iterator_name).ok_or_else(|| {
            InputError::malformed_with_code(
                ErrorCode::CONFIG_UNKNOWN_ITERATOR,
                keys.iterator_options(),
                format!(
                    "option '{}' refers to unknown iterator '{}'",
                    option.key, option.iterator_name
                ),
            )
        })?;
        settings[idx].add_option(option.key, option.value);
    }

    Ok(IteratorStack::new(settings))
}

fn decode_records(config: &JobConfig, key: &str) -> Result<Vec<Vec<String>>> {
    let Some(encoded) = config.get(key) else {
        return Ok(Vec::new());
    };

    codec::decode_list(encoded)
        .map_err(|e| malformed_list(key, e))?
        .iter()
        .map(|token| {
            codec::decode_record(token).map_err(|e| {
                InputError::malformed_with_code(
                    ErrorCode::CONFIG_MALFORMED_RECORD,
                    key,
                    "cannot decode record",
                )
                .with_source(e)
            })
        })
        .collect()
}

fn three_fields(key: &str, fields: Vec<String>) -> Result<[String; 3]> {
    let count = fields.len();
    <[String; 3]>::try_from(fields).map_err(|_| {
        InputError::malformed_with_code(
            ErrorCode::CONFIG_MALFORMED_RECORD,
            key,
            format!("expected 3 fields per record, found {}", count),
        )
    })
}

fn malformed_list(key: &str, err: CodecError) -> InputError {
    InputError::malformed_with_code(ErrorCode::CONFIG_MALFORMED_LIST, key, "cannot decode list")
        .with_source(err)
}
