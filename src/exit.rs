//! # Contractual process exit codes.
//!
//! Wrapping programs report controller outcomes through these codes, so
//! sub-systems can determine the cause of a failure without parsing
//! output or help text. Error codes start at 10.

use crate::error::CtrlError;

/// Clean exit.
pub const EXIT_CODE_OK: i32 = 0;
/// Generic runtime error.
pub const EXIT_CODE_ERROR: i32 = 10;
/// Terminated by an interrupt (signal or root-context cancellation).
pub const EXIT_CODE_INTERRUPT: i32 = 11;
/// Required command-line flags were missing.
pub const EXIT_CODE_REQUIRED_FLAGS_ERROR: i32 = 12;
/// Command-line flags could not be parsed.
pub const EXIT_CODE_PARSE_FLAGS_ERROR: i32 = 13;
/// Configuration was invalid.
pub const EXIT_CODE_CONFIG_ERROR: i32 = 14;
/// Driver setup or registration failed.
pub const EXIT_CODE_DRIVER_ERROR: i32 = 15;

/// Maps a controller outcome to the exit code a wrapper must report.
pub fn exit_code(err: &CtrlError) -> i32 {
    match err {
        CtrlError::Canceled => EXIT_CODE_INTERRUPT,
        CtrlError::Registry(_) => EXIT_CODE_DRIVER_ERROR,
        _ => EXIT_CODE_ERROR,
    }
}
