//! Data model shared by the store contract and the input format

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::iterators::IteratorStack;

/// A contiguous row range: start inclusive, end exclusive, `None` open-ended
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyRange {
    pub start: Option<Vec<u8>>,
    pub end: Option<Vec<u8>>,
}

impl KeyRange {
    /// The whole key space
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(start: Option<Vec<u8>>, end: Option<Vec<u8>>) -> Self {
        Self { start, end }
    }

    pub fn between(start: impl Into<Vec<u8>>, end: impl Into<Vec<u8>>) -> Self {
        Self::new(Some(start.into()), Some(end.into()))
    }

    pub fn is_infinite(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains_row(&self, row: &[u8]) -> bool {
        let after_start = self.start.as_deref().map_or(true, |start| row >= start);
        let before_end = self.end.as_deref().map_or(true, |end| row < end);
        after_start && before_end
    }

    /// Whether the two ranges share at least one row
    pub fn overlaps(&self, other: &KeyRange) -> bool {
        let starts_before_other_ends = match (&self.start, &other.end) {
            (Some(start), Some(end)) => start < end,
            _ => true,
        };
        let other_starts_before_end = match (&other.start, &self.end) {
            (Some(start), Some(end)) => start < end,
            _ => true,
        };
        starts_before_other_ends && other_starts_before_end
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self
            .start
            .as_deref()
            .map_or_else(|| "-inf".into(), String::from_utf8_lossy);
        let end = self
            .end
            .as_deref()
            .map_or_else(|| "+inf".into(), String::from_utf8_lossy);
        write!(f, "[{}, {})", start, end)
    }
}

/// A cell coordinate; sorts by row, family, qualifier, visibility, then newest first
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub row: Vec<u8>,
    pub family: Vec<u8>,
    pub qualifier: Vec<u8>,
    pub visibility: String,
    pub timestamp: u64,
}

impl Key {
    pub fn new(
        row: impl Into<Vec<u8>>,
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
        timestamp: u64,
    ) -> Self {
        Self {
            row: row.into(),
            family: family.into(),
            qualifier: qualifier.into(),
            visibility: String::new(),
            timestamp,
        }
    }

    /// Same cell, ignoring the timestamp
    pub fn same_column(&self, other: &Key) -> bool {
        self.row == other.row
            && self.family == other.family
            && self.qualifier == other.qualifier
            && self.visibility == other.visibility
    }

    pub fn row_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.row)
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.family.cmp(&other.family))
            .then_with(|| self.qualifier.cmp(&other.qualifier))
            .then_with(|| self.visibility.cmp(&other.visibility))
            .then_with(|| other.timestamp.cmp(&self.timestamp))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Opaque cell contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Value(Vec<u8>);

impl Value {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// A key and its value as returned by a scan
pub type Entry = (Key, Value);

/// Visibility labels a reader holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorizations {
    labels: BTreeSet<String>,
}

impl Authorizations {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Unlabelled cells are visible to everyone
    pub fn can_see(&self, visibility: &str) -> bool {
        visibility.is_empty() || self.labels.contains(visibility)
    }
}

/// One column write within a [`Mutation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnUpdate {
    pub family: Vec<u8>,
    pub qualifier: Vec<u8>,
    pub visibility: String,
    pub timestamp: Option<u64>,
    pub value: Value,
}

/// All writes to a single row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    row: Vec<u8>,
    updates: Vec<ColumnUpdate>,
}

impl Mutation {
    pub fn new(row: impl Into<Vec<u8>>) -> Self {
        Self {
            row: row.into(),
            updates: Vec::new(),
        }
    }

    pub fn put(
        &mut self,
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.push(family.into(), qualifier.into(), String::new(), None, value.into())
    }

    pub fn put_with_visibility(
        &mut self,
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
        visibility: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.push(family.into(), qualifier.into(), visibility.into(), None, value.into())
    }

    pub fn put_at(
        &mut self,
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
        timestamp: u64,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.push(
            family.into(),
            qualifier.into(),
            String::new(),
            Some(timestamp),
            value.into(),
        )
    }

    pub fn row(&self) -> &[u8] {
        &self.row
    }

    pub fn updates(&self) -> &[ColumnUpdate] {
        &self.updates
    }

    fn push(
        &mut self,
        family: Vec<u8>,
        qualifier: Vec<u8>,
        visibility: String,
        timestamp: Option<u64>,
        value: Value,
    ) -> &mut Self {
        self.updates.push(ColumnUpdate {
            family,
            qualifier,
            visibility,
            timestamp,
            value,
        });
        self
    }
}

/// Everything a store needs to serve one split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub table: String,
    pub range: KeyRange,
    pub iterators: IteratorStack,
    pub max_versions: Option<u32>,
    pub authorizations: Authorizations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds() {
        let range = KeyRange::between("b", "d");
        assert!(!range.contains_row(b"a"));
        assert!(range.contains_row(b"b"));
        assert!(range.contains_row(b"c"));
        assert!(!range.contains_row(b"d"));

        let all = KeyRange::all();
        assert!(all.is_infinite());
        assert!(all.contains_row(b""));
        assert!(all.contains_row(b"\xff\xff"));
    }

    #[test]
    fn test_range_overlap() {
        let left = KeyRange::new(None, Some(b"m".to_vec()));
        let right = KeyRange::new(Some(b"m".to_vec()), None);
        assert!(!left.overlaps(&right));
        assert!(left.overlaps(&KeyRange::between("a", "n")));
        assert!(right.overlaps(&KeyRange::between("a", "n")));
        assert!(KeyRange::all().overlaps(&left));
    }

    #[test]
    fn test_range_display() {
        assert_eq!(KeyRange::all().to_string(), "[-inf, +inf)");
        assert_eq!(
            KeyRange::new(Some(b"m".to_vec()), None).to_string(),
            "[m, +inf)"
        );
    }

    #[test]
    fn test_key_order_is_newest_first_within_a_column() {
        let old = Key::new("r", "f", "q", 1);
        let new = Key::new("r", "f", "q", 2);
        let next_row = Key::new("s", "f", "q", 9);

        let mut keys = vec![next_row.clone(), old.clone(), new.clone()];
        keys.sort();
        assert_eq!(keys, vec![new.clone(), old.clone(), next_row]);
        assert!(new.same_column(&old));
    }

    #[test]
    fn test_authorizations_visibility() {
        let auths = Authorizations::new(["public"]);
        assert!(auths.can_see(""));
        assert!(auths.can_see("public"));
        assert!(!auths.can_see("secret"));
        assert!(!Authorizations::empty().can_see("public"));
    }
}
