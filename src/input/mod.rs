//! Input format for tables in a [`TabletStore`]
//!
//! The driver uses [`InputFormat`] to write settings into a [`JobConfig`]
//! and to plan splits; each worker uses the same type, bound to the same
//! prefix, to decode those settings and open a [`RecordReader`] on its split.

use tracing::info;

use crate::codec;
use crate::config::{ConfigKeys, JobConfig};
use crate::error::{ErrorCode, InputError, Result};
use crate::iterators::{self, IteratorOption, IteratorSetting, IteratorStack};
use crate::store::{Authorizations, ScanRequest, TabletStore};

pub mod reader;
pub mod splits;
pub mod versions;

pub use reader::RecordReader;
pub use splits::{compute_splits, SplitDescriptor};

/// Reads and writes input settings under one configuration prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFormat {
    keys: ConfigKeys,
}

impl InputFormat {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            keys: ConfigKeys::new(prefix),
        }
    }

    pub fn keys(&self) -> &ConfigKeys {
        &self.keys
    }

    /// Name the table to read and the labels the reader holds
    pub fn set_input_info(
        &self,
        config: &mut JobConfig,
        table: &str,
        authorizations: &Authorizations,
    ) -> Result<()> {
        if table.is_empty() {
            return Err(InputError::invalid_argument_with_code(
                ErrorCode::VALIDATION_EMPTY_VALUE,
                "table name must not be empty",
                Some(self.keys.table()),
            ));
        }
        let labels: Vec<&str> = authorizations.labels().collect();
        config.set(self.keys.table(), table);
        config.set(self.keys.authorizations(), codec::encode_list(&labels));
        Ok(())
    }

    pub fn table(&self, config: &JobConfig) -> Result<String> {
        let key = self.keys.table();
        config
            .get(&key)
            .map(str::to_string)
            .ok_or_else(|| InputError::missing(key))
    }

    pub fn authorizations(&self, config: &JobConfig) -> Result<Authorizations> {
        let key = self.keys.authorizations();
        match config.get(&key) {
            None => Ok(Authorizations::empty()),
            Some(encoded) => codec::decode_list(encoded)
                .map(Authorizations::new)
                .map_err(|e| {
                    InputError::malformed_with_code(
                        ErrorCode::CONFIG_MALFORMED_LIST,
                        &key,
                        "cannot decode authorizations",
                    )
                    .with_source(e)
                }),
        }
    }

    pub fn add_iterator(&self, config: &mut JobConfig, setting: &IteratorSetting) -> Result<()> {
        iterators::add_iterator(&self.keys, config, setting)
    }

    pub fn iterators(&self, config: &JobConfig) -> Result<Vec<IteratorSetting>> {
        iterators::iterators(&self.keys, config)
    }

    pub fn iterator_options(&self, config: &JobConfig) -> Result<Vec<IteratorOption>> {
        iterators::iterator_options(&self.keys, config)
    }

    pub fn iterator_stack(&self, config: &JobConfig) -> Result<IteratorStack> {
        iterators::iterator_stack(&self.keys, config)
    }

    pub fn set_max_versions(&self, config: &mut JobConfig, n: i32) -> Result<()> {
        versions::set_max_versions(&self.keys, config, n)
    }

    pub fn max_versions(&self, config: &JobConfig) -> Result<i32> {
        versions::max_versions(&self.keys, config)
    }

    pub fn version_limit(&self, config: &JobConfig) -> Result<Option<u32>> {
        versions::version_limit(&self.keys, config)
    }

    /// One split per tablet range the store currently reports
    pub fn get_splits(
        &self,
        config: &JobConfig,
        store: &dyn TabletStore,
    ) -> Result<Vec<SplitDescriptor>> {
        let table = self.table(config)?;
        let ranges = store.list_ranges(&table)?;
        let splits = compute_splits(ranges, |range| store.locations_of(&table, range))?;

        info!(table = %table, splits = splits.len(), "Computed input splits");
        Ok(splits)
    }

    /// Decode every setting, then scan the split's range
    ///
    /// A decode failure aborts before the store is contacted; no partial
    /// iterator stack is ever applied.
    pub fn create_record_reader(
        &self,
        split: &SplitDescriptor,
        config: &JobConfig,
        store: &dyn TabletStore,
    ) -> Result<RecordReader> {
        let request = ScanRequest {
            table: self.table(config)?,
            range: split.range.clone(),
            iterators: self.iterator_stack(config)?,
            max_versions: self.version_limit(config)?,
            authorizations: self.authorizations(config)?,
        };

        let entries = store.scan(&request)?;
        info!(
            table = %request.table,
            range = %request.range,
            iterators = request.iterators.len(),
            records = entries.len(),
            "Opened record reader"
        );
        Ok(RecordReader::new(split.clone(), entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        let format = InputFormat::default();
        assert_eq!(format.keys().prefix(), ConfigKeys::DEFAULT_PREFIX);
    }

    #[test]
    fn test_input_info_round_trip() {
        let format = InputFormat::new("p");
        let mut config = JobConfig::new();
        let auths = Authorizations::new(["a,b", "c:d", "plain"]);

        format.set_input_info(&mut config, "table", &auths).unwrap();

        assert_eq!(format.table(&config).unwrap(), "table");
        assert_eq!(format.authorizations(&config).unwrap(), auths);
    }

    #[test]
    fn test_missing_table() {
        let format = InputFormat::new("p");
        let err = format.table(&JobConfig::new()).unwrap_err();
        assert!(matches!(err, InputError::MissingConfig { .. }));
        assert_eq!(err.key(), Some("p.table"));
    }

    #[test]
    fn test_empty_table_name_is_rejected() {
        let format = InputFormat::new("p");
        let mut config = JobConfig::new();
        let err = format
            .set_input_info(&mut config, "", &Authorizations::empty())
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidArgument { .. }));
        assert!(config.is_empty());
    }

    #[test]
    fn test_absent_authorizations_are_empty() {
        let format = InputFormat::new("p");
        assert!(format.authorizations(&JobConfig::new()).unwrap().is_empty());
    }

    #[test]
    fn test_prefixes_do_not_interfere() {
        let a = InputFormat::new("a");
        let b = InputFormat::new("b");
        let mut config = JobConfig::new();

        a.set_max_versions(&mut config, 3).unwrap();
        b.add_iterator(&mut config, &IteratorSetting::new(1, "x", "X"))
            .unwrap();

        assert_eq!(a.max_versions(&config).unwrap(), 3);
        assert_eq!(b.max_versions(&config).unwrap(), -1);
        assert!(a.iterators(&config).unwrap().is_empty());
        assert_eq!(b.iterators(&config).unwrap().len(), 1);
    }
}
