//! I/O helpers for the hook commands.

pub mod config;
pub mod hook_log;
pub mod paths;
pub mod session_store;
pub mod transcript;
