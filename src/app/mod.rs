//! Application module
//!
//! Logging setup and fatal-error handling shared by the command-line driver.

pub mod error_handling;
pub mod logging;

pub use error_handling::handle_fatal_error;
pub use logging::{init_logging, log_level};
