//! Phase and substate machine for the five-phase TDD loop.
//!
//! Phases are ordered `CORE < EDGE < SECURITY < PERFORMANCE < SIMPLICITY` and
//! each phase cycles through `RED -> GREEN -> REFACTOR`. The hooks never drive
//! transitions themselves; they read the current position and key their
//! gating and feedback rules off it. [`is_legal_transition`] is the single
//! definition of which moves between positions are allowed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of behavioral guarantee currently being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Core,
    Edge,
    Security,
    Performance,
    Simplicity,
}

/// Position within a single test-first micro-cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Substate {
    Red,
    Green,
    Refactor,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Core,
        Phase::Edge,
        Phase::Security,
        Phase::Performance,
        Phase::Simplicity,
    ];

    /// Parse a stored phase value. Case-insensitive, surrounding quotes allowed.
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "CORE" => Some(Phase::Core),
            "EDGE" => Some(Phase::Edge),
            "SECURITY" => Some(Phase::Security),
            "PERFORMANCE" => Some(Phase::Performance),
            "SIMPLICITY" => Some(Phase::Simplicity),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Core => "CORE",
            Phase::Edge => "EDGE",
            Phase::Security => "SECURITY",
            Phase::Performance => "PERFORMANCE",
            Phase::Simplicity => "SIMPLICITY",
        }
    }

    /// 1-based position in the phase sequence.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    /// The following phase, or `None` for the terminal phase.
    pub fn next(self) -> Option<Self> {
        match self {
            Phase::Core => Some(Phase::Edge),
            Phase::Edge => Some(Phase::Security),
            Phase::Security => Some(Phase::Performance),
            Phase::Performance => Some(Phase::Simplicity),
            Phase::Simplicity => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Simplicity
    }

    /// One-line description of what this phase's tests must pin down.
    pub fn focus(self) -> &'static str {
        match self {
            Phase::Core => "the happy-path behavior the feature exists for",
            Phase::Edge => "boundary values, empty inputs, and unusual but valid cases",
            Phase::Security => "hostile input, injection, traversal, and authorization failures",
            Phase::Performance => "size and time bounds on realistic workloads",
            Phase::Simplicity => "removal of duplication and accidental complexity without losing behavior",
        }
    }
}

impl Substate {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "RED" => Some(Substate::Red),
            "GREEN" => Some(Substate::Green),
            "REFACTOR" => Some(Substate::Refactor),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Substate::Red => "RED",
            Substate::Green => "GREEN",
            Substate::Refactor => "REFACTOR",
        }
    }

    /// Next substate within the same phase. `REFACTOR` wraps to `RED`.
    pub fn next(self) -> Self {
        match self {
            Substate::Red => Substate::Green,
            Substate::Green => Substate::Refactor,
            Substate::Refactor => Substate::Red,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Substate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (phase, substate) position in the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub phase: Phase,
    pub substate: Substate,
}

impl Position {
    pub const START: Position = Position {
        phase: Phase::Core,
        substate: Substate::Red,
    };

    pub fn new(phase: Phase, substate: Substate) -> Self {
        Self { phase, substate }
    }

    /// Implementation (non-test) edits are only allowed outside `RED`.
    pub fn allows_implementation_edits(self) -> bool {
        self.substate != Substate::Red
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.phase, self.substate)
    }
}

/// True if moving from `from` to `to` is a legal step of the loop.
///
/// Legal moves:
/// - `RED -> GREEN` and `GREEN -> REFACTOR` within a phase.
/// - `REFACTOR -> REFACTOR` (another refactor pass) and `REFACTOR -> RED`
///   (new sub-cycle) within a phase.
/// - `REFACTOR` of phase `p` to `RED` of the phase after `p`.
pub fn is_legal_transition(from: Position, to: Position) -> bool {
    if from.phase == to.phase {
        return matches!(
            (from.substate, to.substate),
            (Substate::Red, Substate::Green)
                | (Substate::Green, Substate::Refactor)
                | (Substate::Refactor, Substate::Refactor)
                | (Substate::Refactor, Substate::Red)
        );
    }
    from.substate == Substate::Refactor
        && to.substate == Substate::Red
        && from.phase.next() == Some(to.phase)
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_ascii_uppercase()
}
