/// Error code registry for tablet-input
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 3000-3999: Store errors
/// - 7000-7999: Validation errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_MISSING_REQUIRED: u16 = 1004;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;
    pub const CONFIG_PARSE_ERROR: u16 = 1007;
    pub const CONFIG_MALFORMED_LIST: u16 = 1010;
    pub const CONFIG_MALFORMED_RECORD: u16 = 1011;
    pub const CONFIG_UNKNOWN_ITERATOR: u16 = 1012;
    pub const CONFIG_DUPLICATE_ITERATOR: u16 = 1013;

    // Store errors (3000-3999)
    pub const STORE_GENERIC: u16 = 3000;
    pub const STORE_TABLE_NOT_FOUND: u16 = 3004;
    pub const STORE_TABLE_EXISTS: u16 = 3005;
    pub const STORE_LOCK_FAILED: u16 = 3007;
    pub const STORE_UNKNOWN_ITERATOR: u16 = 3020;
    pub const STORE_INVALID_ITERATOR_OPTION: u16 = 3021;

    // Validation errors (7000-7999)
    pub const VALIDATION_GENERIC: u16 = 7000;
    pub const VALIDATION_OUT_OF_RANGE: u16 = 7003;
    pub const VALIDATION_EMPTY_VALUE: u16 = 7004;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "General configuration error",
        ErrorCode::CONFIG_MISSING_REQUIRED => "Required configuration key is missing",
        ErrorCode::CONFIG_INVALID_VALUE => "Configuration value is invalid",
        ErrorCode::CONFIG_PARSE_ERROR => "Configuration value could not be parsed",
        ErrorCode::CONFIG_MALFORMED_LIST => "Encoded list is malformed",
        ErrorCode::CONFIG_MALFORMED_RECORD => "Encoded record is malformed",
        ErrorCode::CONFIG_UNKNOWN_ITERATOR => "Option refers to an iterator that was never added",
        ErrorCode::CONFIG_DUPLICATE_ITERATOR => "Two iterators share the same name",

        ErrorCode::STORE_GENERIC => "General store error",
        ErrorCode::STORE_TABLE_NOT_FOUND => "Table does not exist",
        ErrorCode::STORE_TABLE_EXISTS => "Table already exists",
        ErrorCode::STORE_LOCK_FAILED => "Store lock is poisoned",
        ErrorCode::STORE_UNKNOWN_ITERATOR => "Iterator class is not known to the store",
        ErrorCode::STORE_INVALID_ITERATOR_OPTION => "Iterator option is invalid",

        ErrorCode::VALIDATION_GENERIC => "General validation error",
        ErrorCode::VALIDATION_OUT_OF_RANGE => "Value is out of range",
        ErrorCode::VALIDATION_EMPTY_VALUE => "Value must not be empty",

        _ => "Unknown error code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_descriptions() {
        assert_eq!(
            describe_error_code(ErrorCode::CONFIG_MISSING_REQUIRED),
            "Required configuration key is missing"
        );
        assert_eq!(
            describe_error_code(ErrorCode::STORE_UNKNOWN_ITERATOR),
            "Iterator class is not known to the store"
        );
        assert_eq!(describe_error_code(9999), "Unknown error code");
    }

    #[test]
    fn test_error_code_ranges() {
        assert!((1000..2000).contains(&ErrorCode::CONFIG_MALFORMED_RECORD));
        assert!((3000..4000).contains(&ErrorCode::STORE_LOCK_FAILED));
        assert!((7000..8000).contains(&ErrorCode::VALIDATION_OUT_OF_RANGE));
    }
}
