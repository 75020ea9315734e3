//! Per-split record reader

use crate::store::Entry;

use super::splits::SplitDescriptor;

/// Key/value pairs of one split, in key order
#[derive(Debug)]
pub struct RecordReader {
    split: SplitDescriptor,
    entries: std::vec::IntoIter<Entry>,
    records_read: usize,
}

impl RecordReader {
    pub(crate) fn new(split: SplitDescriptor, entries: Vec<Entry>) -> Self {
        Self {
            split,
            entries: entries.into_iter(),
            records_read: 0,
        }
    }

    pub fn split(&self) -> &SplitDescriptor {
        &self.split
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Records not yet returned
    pub fn remaining(&self) -> usize {
        self.entries.len()
    }
}

impl Iterator for RecordReader {
    type Item = Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        self.records_read += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for RecordReader {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Key, KeyRange, Value};
    use std::collections::BTreeSet;

    #[test]
    fn test_counts_records_as_they_are_read() {
        let split = SplitDescriptor::new(KeyRange::all(), BTreeSet::new());
        let entries = vec![
            (Key::new("a", "", "", 1), Value::from("1")),
            (Key::new("b", "", "", 1), Value::from("2")),
        ];
        let mut reader = RecordReader::new(split, entries);

        assert_eq!(reader.len(), 2);
        let (key, _) = reader.next().unwrap();
        assert_eq!(key.row, b"a");
        assert_eq!(reader.records_read(), 1);
        assert_eq!(reader.remaining(), 1);

        assert!(reader.next().is_some());
        assert!(reader.next().is_none());
        assert_eq!(reader.records_read(), 2);
    }
}
