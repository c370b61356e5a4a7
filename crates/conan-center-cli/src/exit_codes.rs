//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Input error - malformed reference or argument value
pub const INPUT_ERROR: i32 = 2;

/// Not found - repository, server, revisions or properties missing
pub const NOT_FOUND: i32 = 3;

/// Remote error - the server could not be reached or refused the request
pub const REMOTE_ERROR: i32 = 4;

/// Data error - the repository content is inconsistent or malformed
pub const DATA_ERROR: i32 = 5;

/// Configuration error - servers or credentials
pub const CONFIG_ERROR: i32 = 6;

/// Usage error - invalid combination of options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
