//! Error handling utilities

use tracing::error;

use crate::error::InputError;

/// Report a fatal error and exit with a status code matching its category
///
/// - `verbose = 0`: the error message only
/// - `verbose >= 1`: the full source chain as well
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);
    eprintln!("Error: {error}");

    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    let exit_code = error
        .downcast_ref::<InputError>()
        .map_or(1, InputError::exit_code);
    std::process::exit(exit_code)
}
