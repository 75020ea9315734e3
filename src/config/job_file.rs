//! YAML description of a job's input settings
//!
//! ```yaml
//! table: events
//! authorizations: [public]
//! max_versions: 3
//! iterators:
//!   - priority: 50
//!     name: only-errors
//!     class: RegExFilter
//!     options:
//!       - key: valueRegex
//!         value: "ERROR.*"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::JobConfig;
use crate::error::{ErrorCode, InputError, Result};
use crate::input::InputFormat;
use crate::iterators::IteratorSetting;
use crate::store::Authorizations;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    pub table: String,
    #[serde(default)]
    pub authorizations: Vec<String>,
    #[serde(default)]
    pub max_versions: Option<i32>,
    #[serde(default)]
    pub iterators: Vec<IteratorEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IteratorEntry {
    pub priority: u32,
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(default)]
    pub options: Vec<OptionEntry>,
}

/// Options are a list, not a map, so keys may repeat and order is kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionEntry {
    pub key: String,
    pub value: String,
}

impl IteratorEntry {
    pub fn to_setting(&self) -> IteratorSetting {
        self.options.iter().fold(
            IteratorSetting::new(self.priority, &self.name, &self.class_name),
            |setting, option| setting.with_option(&option.key, &option.value),
        )
    }
}

impl JobFile {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            InputError::malformed_with_code(
                ErrorCode::CONFIG_PARSE_ERROR,
                "<job file>",
                "invalid job file",
            )
            .with_source(e)
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            InputError::malformed_with_code(
                ErrorCode::CONFIG_PARSE_ERROR,
                path.display().to_string(),
                "cannot read job file",
            )
            .with_source(e)
        })?;
        Self::from_yaml(&yaml)
    }

    /// Write every setting into `config` through the regular encoders
    ///
    /// Validation runs before anything is written: on error `config` is
    /// left as it was.
    pub fn apply(&self, format: &InputFormat, config: &mut JobConfig) -> Result<()> {
        let mut staged = config.clone();

        format.set_input_info(
            &mut staged,
            &self.table,
            &Authorizations::new(self.authorizations.iter().cloned()),
        )?;
        if let Some(n) = self.max_versions {
            format.set_max_versions(&mut staged, n)?;
        }
        for entry in &self.iterators {
            format.add_iterator(&mut staged, &entry.to_setting())?;
        }

        debug!(
            table = %self.table,
            iterators = self.iterators.len(),
            "Applied job file"
        );
        *config = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: &str = r#"
table: events
authorizations: [public, ops]
max_versions: 2
iterators:
  - priority: 50
    name: filter
    class: RegExFilter
    options:
      - key: rowRegex
        value: "row:[0-9]+,x"
      - key: rowRegex
        value: second
  - priority: 10
    name: vers
    class: VersioningIterator
"#;

    #[test]
    fn test_parse_job_file() {
        let job = JobFile::from_yaml(JOB).unwrap();
        assert_eq!(job.table, "events");
        assert_eq!(job.max_versions, Some(2));
        assert_eq!(job.iterators.len(), 2);
        assert_eq!(job.iterators[0].options.len(), 2);
        assert_eq!(job.iterators[0].options[0].value, "row:[0-9]+,x");
    }

    #[test]
    fn test_apply_job_file() {
        let job = JobFile::from_yaml(JOB).unwrap();
        let format = InputFormat::new("p");
        let mut config = JobConfig::new();
        job.apply(&format, &mut config).unwrap();

        assert_eq!(format.table(&config).unwrap(), "events");
        assert_eq!(format.max_versions(&config).unwrap(), 2);

        let stack = format.iterator_stack(&config).unwrap();
        let names: Vec<_> = stack.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["vers", "filter"]);
        assert_eq!(
            stack.get("filter").unwrap().options(),
            &[
                ("rowRegex".to_string(), "row:[0-9]+,x".to_string()),
                ("rowRegex".to_string(), "second".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_max_versions_leaves_config_untouched() {
        let job = JobFile::from_yaml("table: t\nmax_versions: 0\n").unwrap();
        let mut config = JobConfig::new();
        let err = job
            .apply(&InputFormat::default(), &mut config)
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidArgument { .. }));
        assert!(config.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = JobFile::from_yaml("table: t\nmax_version: 3\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_PARSE_ERROR);
    }
}
