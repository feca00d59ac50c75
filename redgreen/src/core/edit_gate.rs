//! Pure decision for "may this file be written right now?".

use crate::core::classifier::{CustomPatterns, is_config_path, is_test_artifact};
use crate::core::guidance::red_denial_reason;
use crate::core::record::SessionRecord;
use crate::core::types::EditDecision;

/// Which rule decided an edit. Recorded in the advisory log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditRule {
    NoPath,
    NoSession,
    ConfigPath,
    TestArtifact,
    ImplementationUnlocked,
    ImplementationLockedInRed,
}

impl EditRule {
    pub fn as_str(self) -> &'static str {
        match self {
            EditRule::NoPath => "no_path",
            EditRule::NoSession => "no_session",
            EditRule::ConfigPath => "config_path",
            EditRule::TestArtifact => "test_artifact",
            EditRule::ImplementationUnlocked => "implementation_unlocked",
            EditRule::ImplementationLockedInRed => "implementation_locked_in_red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub rule: EditRule,
    pub decision: EditDecision,
}

/// Decide an edit of `path` against the current session, if any.
///
/// Rules apply in order: no path, no session, control-plane path, test
/// artifact, then the RED lock on implementation files.
pub fn decide_edit(path: Option<&str>, record: Option<&SessionRecord>) -> EditOutcome {
    let approve = |rule| EditOutcome {
        rule,
        decision: EditDecision::approve(),
    };

    let Some(path) = path else {
        return approve(EditRule::NoPath);
    };
    let Some(record) = record else {
        return approve(EditRule::NoSession);
    };
    if is_config_path(path) {
        return approve(EditRule::ConfigPath);
    }
    let custom = CustomPatterns::compile(&record.test_patterns);
    if is_test_artifact(path, &custom) {
        return approve(EditRule::TestArtifact);
    }
    if record.position().allows_implementation_edits() {
        return approve(EditRule::ImplementationUnlocked);
    }
    EditOutcome {
        rule: EditRule::ImplementationLockedInRed,
        decision: EditDecision::deny(red_denial_reason(record, path)),
    }
}
