//! Deterministic, pure logic shared by the hooks.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values (decoded payloads, parsed session documents) and return
//! deterministic decisions suitable for tests.

pub mod classifier;
pub mod continuation;
pub mod edit_gate;
pub mod feedback;
pub mod guidance;
pub mod header;
pub mod payload;
pub mod phase;
pub mod record;
pub mod types;
