//! Maximum number of versions returned per column

use tracing::debug;

use crate::config::{ConfigKeys, JobConfig};
use crate::error::{ErrorCode, InputError, Result};

/// Value reported when no limit was set
pub const UNSET: i32 = -1;

/// Store a version limit; `n` must be at least 1
///
/// An invalid value is rejected before anything is written, so a previously
/// stored limit stays in place.
pub fn set_max_versions(keys: &ConfigKeys, config: &mut JobConfig, n: i32) -> Result<()> {
    if n < 1 {
        return Err(InputError::invalid_argument_with_code(
            ErrorCode::VALIDATION_OUT_OF_RANGE,
            format!("maxVersions must be at least 1, got {}", n),
            Some(keys.max_versions()),
        ));
    }
    config.set(keys.max_versions(), n.to_string());
    debug!(max_versions = n, "Set version limit");
    Ok(())
}

/// The stored limit, or [`UNSET`]
pub fn max_versions(keys: &ConfigKeys, config: &JobConfig) -> Result<i32> {
    Ok(version_limit(keys, config)?.map_or(UNSET, |n| n as i32))
}

/// The stored limit as a typed value, `None` when unset
pub fn version_limit(keys: &ConfigKeys, config: &JobConfig) -> Result<Option<u32>> {
    let key = keys.max_versions();
    let Some(raw) = config.get(&key) else {
        return Ok(None);
    };

    let parsed = raw.parse::<i32>().map_err(|e| {
        InputError::malformed_with_code(
            ErrorCode::CONFIG_PARSE_ERROR,
            &key,
            format!("'{}' is not a decimal integer", raw),
        )
        .with_source(e)
    })?;

    match parsed {
        UNSET => Ok(None),
        n if n >= 1 => Ok(Some(n as u32)),
        n => Err(InputError::malformed(
            &key,
            format!("stored limit {} is neither -1 nor at least 1", n),
        )),
    }
}
