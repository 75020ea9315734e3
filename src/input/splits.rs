//! Pure split planning
//!
//! Turns the tablet ranges a store reports into one unit of work per range.
//! No I/O happens here: host lookups come in through a closure so the same
//! function serves live stores and tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::store::KeyRange;

/// One unit of work: a key range and the hosts able to serve it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitDescriptor {
    pub range: KeyRange,
    pub locations: BTreeSet<String>,
}

impl SplitDescriptor {
    pub fn new(range: KeyRange, locations: BTreeSet<String>) -> Self {
        Self { range, locations }
    }
}

/// Pure: one descriptor per range, in input order
///
/// Locations are a snapshot taken while planning. Ranges are neither merged
/// nor subdivided. The first lookup error is returned unchanged.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use std::convert::Infallible;
/// use tablet_input::input::splits::compute_splits;
/// use tablet_input::store::KeyRange;
///
/// let splits = compute_splits(vec![KeyRange::all()], |_| {
///     Ok::<_, Infallible>(BTreeSet::from(["localhost".to_string()]))
/// })
/// .unwrap();
///
/// assert_eq!(splits.len(), 1);
/// assert!(splits[0].range.is_infinite());
/// ```
pub fn compute_splits<F, E>(
    ranges: Vec<KeyRange>,
    mut locations_of: F,
) -> Result<Vec<SplitDescriptor>, E>
where
    F: FnMut(&KeyRange) -> Result<BTreeSet<String>, E>,
{
    ranges
        .into_iter()
        .map(|range| {
            let locations = locations_of(&range)?;
            Ok(SplitDescriptor::new(range, locations))
        })
        .collect()
}
