//! Stable exit codes for redgreen CLI commands.

/// Command succeeded. Hook commands always exit with this code.
pub const OK: i32 = 0;
/// Usage error, or `status` could not read the session record.
pub const INVALID: i32 = 1;
/// `redgreen status` found no session record.
pub const NO_SESSION: i32 = 2;
