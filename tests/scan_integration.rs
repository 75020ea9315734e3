//! End-to-end tests: driver encodes settings, plans splits, workers read them

use std::collections::BTreeSet;

use tablet_input::error::ErrorCode;
use tablet_input::store::{
    Authorizations, Entry, KeyRange, MemoryStore, Mutation, RegExFilter, ScanRequest, StoreError,
    StoreResult, TabletStore, VersioningIterator,
};
use tablet_input::{InputError, InputFormat, IteratorSetting, JobConfig};

const TABLE: &str = "testtable";

fn populated_store(hosts: &[&str], rows: usize) -> MemoryStore {
    let store = MemoryStore::new(hosts.iter().copied());
    store.create_table(TABLE).unwrap();
    let mut writer = store.batch_writer(TABLE).unwrap();
    for i in 0..rows {
        let mut m = Mutation::new(format!("{:09x}", i + 1));
        m.put("", "", format!("{:09x}", i));
        writer.add_mutation(m).unwrap();
    }
    writer.close().unwrap();
    store
}

fn driver_config(format: &InputFormat) -> JobConfig {
    let mut config = JobConfig::new();
    format
        .set_input_info(&mut config, TABLE, &Authorizations::empty())
        .unwrap();
    config
}

fn read_all(format: &InputFormat, config: &JobConfig, store: &dyn TabletStore) -> Vec<Entry> {
    format
        .get_splits(config, store)
        .unwrap()
        .iter()
        .flat_map(|split| format.create_record_reader(split, config, store).unwrap())
        .collect()
}

#[test]
fn test_single_tablet_reads_every_row_in_order() {
    let store = populated_store(&["localhost"], 100);
    let format = InputFormat::default();
    let config = driver_config(&format);

    let splits = format.get_splits(&config, &store).unwrap();
    assert_eq!(splits.len(), 1);
    assert!(splits[0].range.is_infinite());
    assert_eq!(
        splits[0].locations,
        BTreeSet::from(["localhost".to_string()])
    );

    let mut reader = format
        .create_record_reader(&splits[0], &config, &store)
        .unwrap();
    let mut count = 0;
    for (key, value) in reader.by_ref() {
        assert_eq!(key.row_str(), format!("{:09x}", count + 1));
        assert_eq!(value.to_string(), format!("{:09x}", count));
        count += 1;
    }
    assert_eq!(count, 100);
    assert_eq!(reader.records_read(), 100);
}

#[test]
fn test_one_split_per_tablet_with_hosts() {
    let store = populated_store(&["tserver1", "tserver2"], 100);
    store
        .add_splits(TABLE, [format!("{:09x}", 30), format!("{:09x}", 60)])
        .unwrap();

    let format = InputFormat::default();
    let config = driver_config(&format);
    let splits = format.get_splits(&config, &store).unwrap();

    assert_eq!(splits.len(), 3);
    assert_eq!(splits[0].range.start, None);
    assert_eq!(splits[2].range.end, None);
    assert_eq!(splits[0].range.end, splits[1].range.start);
    assert_eq!(splits[1].range.end, splits[2].range.start);
    for split in &splits {
        assert_eq!(split.locations.len(), 1);
    }
    assert_ne!(splits[0].locations, splits[1].locations);

    let per_split: Vec<usize> = splits
        .iter()
        .map(|split| {
            format
                .create_record_reader(split, &config, &store)
                .unwrap()
                .count()
        })
        .collect();
    assert_eq!(per_split, vec![29, 30, 41]);
    assert_eq!(read_all(&format, &config, &store).len(), 100);
}

#[test]
fn test_version_limit_reaches_the_scan() {
    let store = MemoryStore::default();
    store.create_table(TABLE).unwrap();
    let mut writer = store.batch_writer(TABLE).unwrap();
    for ts in 1..=5 {
        let mut m = Mutation::new("row");
        m.put_at("f", "q", ts, format!("v{}", ts));
        writer.add_mutation(m).unwrap();
    }
    writer.close().unwrap();

    let format = InputFormat::default();
    let mut config = driver_config(&format);
    assert_eq!(read_all(&format, &config, &store).len(), 5);

    format.set_max_versions(&mut config, 2).unwrap();
    let values: Vec<String> = read_all(&format, &config, &store)
        .into_iter()
        .map(|(_, v)| v.to_string())
        .collect();
    assert_eq!(values, vec!["v5", "v4"]);
}

#[test]
fn test_iterator_stack_reaches_the_scan() {
    let store = populated_store(&["localhost"], 20);
    let format = InputFormat::default();
    let mut config = driver_config(&format);

    let mut filter = IteratorSetting::new(50, "odd-values", RegExFilter::CLASS);
    RegExFilter::configure(&mut filter, None, None, None, Some(".*[13579bdf]"), false);
    format.add_iterator(&mut config, &filter).unwrap();

    let entries = read_all(&format, &config, &store);
    assert_eq!(entries.len(), 10);
    assert!(entries
        .iter()
        .all(|(_, v)| v.to_string().ends_with(|c: char| "13579bdf".contains(c))));
}

#[test]
fn test_iterators_apply_in_priority_order() {
    let store = MemoryStore::default();
    store.create_table(TABLE).unwrap();
    let mut writer = store.batch_writer(TABLE).unwrap();
    for ts in 1..=3 {
        let mut m = Mutation::new("r");
        m.put_at("f", "q", ts, if ts == 3 { "drop" } else { "keep" });
        writer.add_mutation(m).unwrap();
    }
    writer.close().unwrap();

    let format = InputFormat::default();
    let mut config = driver_config(&format);
    // added out of order: the filter at 10 runs before versioning at 20
    format
        .add_iterator(
            &mut config,
            &IteratorSetting::new(20, "vers", VersioningIterator::CLASS)
                .with_option(VersioningIterator::MAX_VERSIONS, "1"),
        )
        .unwrap();
    format
        .add_iterator(
            &mut config,
            &IteratorSetting::new(10, "keep", RegExFilter::CLASS)
                .with_option(RegExFilter::VALUE_REGEX, "keep"),
        )
        .unwrap();

    let entries = read_all(&format, &config, &store);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0.timestamp, 2);
}

#[test]
fn test_corrupt_config_fails_before_scanning() {
    let store = populated_store(&["localhost"], 3);
    let format = InputFormat::default();
    let mut config = driver_config(&format);
    let split = format.get_splits(&config, &store).unwrap().remove(0);

    config.set(format.keys().iterators(), "1:OnlyTwo");
    let err = format
        .create_record_reader(&split, &config, &store)
        .unwrap_err();
    assert!(matches!(err, InputError::MalformedConfigValue { .. }));
    assert_eq!(err.key(), Some("TabletInputFormat.iterators"));
}

#[test]
fn test_unknown_iterator_class_surfaces_as_store_error() {
    let store = populated_store(&["localhost"], 3);
    let format = InputFormat::default();
    let mut config = driver_config(&format);
    format
        .add_iterator(&mut config, &IteratorSetting::new(1, "x", "com.example.Missing"))
        .unwrap();

    let split = format.get_splits(&config, &store).unwrap().remove(0);
    let err = format
        .create_record_reader(&split, &config, &store)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::STORE_UNKNOWN_ITERATOR);
}

#[test]
fn test_missing_table_fails_planning() {
    let store = MemoryStore::default();
    let format = InputFormat::default();
    let config = driver_config(&format);

    let err = format.get_splits(&config, &store).unwrap_err();
    assert_eq!(err.code(), ErrorCode::STORE_TABLE_NOT_FOUND);
}

struct Unreachable;

impl TabletStore for Unreachable {
    fn list_ranges(&self, _table: &str) -> StoreResult<Vec<KeyRange>> {
        Ok(vec![KeyRange::new(None, Some(b"m".to_vec())), KeyRange::all()])
    }

    fn locations_of(&self, _table: &str, range: &KeyRange) -> StoreResult<BTreeSet<String>> {
        if range.is_infinite() {
            Err(StoreError::lock("tablet locator unavailable"))
        } else {
            Ok(BTreeSet::new())
        }
    }

    fn scan(&self, _request: &ScanRequest) -> StoreResult<Vec<Entry>> {
        Ok(Vec::new())
    }
}

#[test]
fn test_location_lookup_failure_aborts_planning() {
    let format = InputFormat::default();
    let config = driver_config(&format);

    let err = format.get_splits(&config, &Unreachable).unwrap_err();
    assert_eq!(err.code(), ErrorCode::STORE_LOCK_FAILED);
    assert!(err.to_string().contains("tablet locator unavailable"));
}
