//! Exit codes following sysexits.h conventions.
//!
//! These give scripts and CI systems a way to distinguish a bad input file
//! from a service outage without parsing stderr.

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Cannot open or decode the input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Diagnosis service unavailable (classifier or enrichment).
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const SERVICE_ERROR: i32 = 69;

/// History storage error.
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;
