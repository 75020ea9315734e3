//! Server-side iterators the in-memory store knows how to run
//!
//! Iterator classes are resolved by the last `.`-separated segment of the
//! configured class name, so `VersioningIterator` and
//! `some.package.VersioningIterator` resolve to the same implementation.

use regex::bytes::Regex;

use super::error::{StoreError, StoreResult};
use super::types::Entry;
use crate::iterators::IteratorSetting;

/// A transformation applied to the sorted entries of a scan
pub trait ServerIterator: Send + Sync {
    fn apply(&self, entries: Vec<Entry>) -> Vec<Entry>;
}

/// Instantiate the iterator named by `setting`
pub fn build_iterator(setting: &IteratorSetting) -> StoreResult<Box<dyn ServerIterator>> {
    match simple_class_name(setting.class_name()) {
        VersioningIterator::CLASS => Ok(Box::new(VersioningIterator::from_setting(setting)?)),
        RegExFilter::CLASS => Ok(Box::new(RegExFilter::from_setting(setting)?)),
        _ => Err(StoreError::UnknownIterator {
            name: setting.name().to_string(),
            class_name: setting.class_name().to_string(),
        }),
    }
}

fn simple_class_name(class_name: &str) -> &str {
    class_name
        .rsplit_once('.')
        .map_or(class_name, |(_, simple)| simple)
}

/// Keep the newest entries of each column
pub fn limit_versions(entries: Vec<Entry>, max_versions: usize) -> Vec<Entry> {
    let mut kept: Vec<Entry> = Vec::with_capacity(entries.len());
    let mut seen = 0;
    for (key, value) in entries {
        match kept.last() {
            Some((last, _)) if last.same_column(&key) => seen += 1,
            _ => seen = 1,
        }
        if seen <= max_versions {
            kept.push((key, value));
        }
    }
    kept
}

/// Retains at most `maxVersions` timestamps per column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersioningIterator {
    max_versions: usize,
}

impl VersioningIterator {
    pub const CLASS: &'static str = "VersioningIterator";
    pub const MAX_VERSIONS: &'static str = "maxVersions";

    pub fn from_setting(setting: &IteratorSetting) -> StoreResult<Self> {
        let max_versions = match setting.option(Self::MAX_VERSIONS) {
            None => 1,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n >= 1 => n,
                Ok(_) => {
                    return Err(StoreError::invalid_option(
                        setting.name(),
                        Self::MAX_VERSIONS,
                        "must be at least 1",
                    ))
                }
                Err(e) => {
                    return Err(StoreError::invalid_option(
                        setting.name(),
                        Self::MAX_VERSIONS,
                        e,
                    ))
                }
            },
        };
        Ok(Self { max_versions })
    }
}

impl ServerIterator for VersioningIterator {
    fn apply(&self, entries: Vec<Entry>) -> Vec<Entry> {
        limit_versions(entries, self.max_versions)
    }
}

/// Filters entries by regular expressions over row, family, qualifier and value
#[derive(Debug, Clone)]
pub struct RegExFilter {
    row: Option<Regex>,
    family: Option<Regex>,
    qualifier: Option<Regex>,
    value: Option<Regex>,
    or_fields: bool,
}

impl RegExFilter {
    pub const CLASS: &'static str = "RegExFilter";
    pub const ROW_REGEX: &'static str = "rowRegex";
    pub const COLF_REGEX: &'static str = "colfRegex";
    pub const COLQ_REGEX: &'static str = "colqRegex";
    pub const VALUE_REGEX: &'static str = "valueRegex";
    pub const OR_FIELDS: &'static str = "orFields";
    pub const MATCH_SUBSTRING: &'static str = "matchSubstring";

    /// Store the filter's options on an iterator setting
    pub fn configure(
        setting: &mut IteratorSetting,
        row: Option<&str>,
        family: Option<&str>,
        qualifier: Option<&str>,
        value: Option<&str>,
        or_fields: bool,
    ) {
        let patterns = [
            (Self::ROW_REGEX, row),
            (Self::COLF_REGEX, family),
            (Self::COLQ_REGEX, qualifier),
            (Self::VALUE_REGEX, value),
        ];
        for (key, pattern) in patterns
            .into_iter()
            .filter_map(|(key, pattern)| pattern.map(|p| (key, p)))
        {
            setting.add_option(key, pattern);
        }
        setting.add_option(Self::OR_FIELDS, or_fields.to_string());
    }

    pub fn from_setting(setting: &IteratorSetting) -> StoreResult<Self> {
        let match_substring = parse_bool(setting, Self::MATCH_SUBSTRING)?;
        let compile = |key: &str| -> StoreResult<Option<Regex>> {
            setting
                .option(key)
                .map(|pattern| {
                    let pattern = if match_substring {
                        pattern.to_string()
                    } else {
                        format!("^(?:{})$", pattern)
                    };
                    Regex::new(&pattern)
                        .map_err(|e| StoreError::invalid_option(setting.name(), key, e))
                })
                .transpose()
        };

        Ok(Self {
            row: compile(Self::ROW_REGEX)?,
            family: compile(Self::COLF_REGEX)?,
            qualifier: compile(Self::COLQ_REGEX)?,
            value: compile(Self::VALUE_REGEX)?,
            or_fields: parse_bool(setting, Self::OR_FIELDS)?,
        })
    }

    fn accepts(&self, entry: &Entry) -> bool {
        let (key, value) = entry;
        let checks = [
            (self.row.as_ref(), key.row.as_slice()),
            (self.family.as_ref(), key.family.as_slice()),
            (self.qualifier.as_ref(), key.qualifier.as_slice()),
            (self.value.as_ref(), value.as_bytes()),
        ];
        let mut results = checks
            .into_iter()
            .filter_map(|(regex, bytes)| regex.map(|r| r.is_match(bytes)))
            .peekable();

        if results.peek().is_none() {
            return true;
        }
        if self.or_fields {
            results.any(|matched| matched)
        } else {
            results.all(|matched| matched)
        }
    }
}

impl ServerIterator for RegExFilter {
    fn apply(&self, entries: Vec<Entry>) -> Vec<Entry> {
        entries.into_iter().filter(|e| self.accepts(e)).collect()
    }
}

fn parse_bool(setting: &IteratorSetting, key: &str) -> StoreResult<bool> {
    match setting.option(key) {
        None => Ok(false),
        Some(raw) => raw
            .parse::<bool>()
            .map_err(|e| StoreError::invalid_option(setting.name(), key, e)),
    }
}
