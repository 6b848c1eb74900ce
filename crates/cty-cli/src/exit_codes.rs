//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure, or some CRDs of a batch failed
pub const ERROR: i32 = 1;

/// Breaking changes found with `--fail-on-breaking`
pub const BREAKING_CHANGES: i32 = 2;

/// CRD error - the input is not a usable CRD, or a version is unknown
pub const CRD_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Network error - a CRD URL could not be fetched
pub const NETWORK_ERROR: i32 = 6;

/// Usage error - invalid arguments or configuration (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
