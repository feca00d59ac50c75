//! Session-scoped TDD loop controller for agent hook events.
//!
//! Three interception points keep an agent inside a five-phase
//! RED → GREEN → REFACTOR discipline:
//!
//! - **pre-edit** ([`edit`]): denies implementation edits while the session
//!   is in RED; test files and the `.claude/` control plane stay editable.
//! - **post-command** ([`observe`]): advisory feedback after a recognized
//!   test command, keyed on the current substate and the exit status.
//! - **stop** ([`stop`]): blocks session exit until the loop completes or
//!   runs out of iterations, and is the only writer of the session record.
//!
//! The crate is split the usual way:
//!
//! - **[`core`]**: Pure, deterministic logic (payload extraction, classification,
//!   phase machine, decisions). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, record store, transcript,
//!   hook log).
//!
//! Orchestration modules ([`edit`], [`observe`], [`stop`], [`status`]) load
//! what they need through [`io`] and call into [`core`]. Gates never fail:
//! every I/O error degrades to the documented default.

pub mod context;
pub mod core;
pub mod edit;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod observe;
pub mod status;
pub mod stop;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
