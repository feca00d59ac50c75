//! End-to-end scenarios through the library API against a real project root.

use redgreen::core::phase::{Phase, Substate};
use redgreen::edit::run_edit_gate;
use redgreen::observe::run_observer;
use redgreen::stop::run_stop_gate;
use redgreen::test_support::{TestProject, active_record, command_payload, edit_payload, stop_payload};

const MARKER: &str = "<promise>TDD_COMPLETE</promise>";

#[test]
fn core_red_denies_implementation_and_approves_tests() {
    let project = TestProject::new();
    project.write_record(&active_record(Phase::Core, Substate::Red, 1, 0));
    let ctx = project.context();

    assert!(!run_edit_gate(&ctx, &edit_payload("src/app.ts")).is_approved());
    assert!(run_edit_gate(&ctx, &edit_payload("src/app.test.ts")).is_approved());
    assert!(run_edit_gate(&ctx, &edit_payload(".claude/tdd-loop.local.md")).is_approved());
    assert!(project.log_contents().contains("rule=implementation_locked_in_red"));
}

#[test]
fn failing_run_in_green_advises_more_implementation() {
    let project = TestProject::new();
    project.write_record(&active_record(Phase::Core, Substate::Green, 1, 0));
    let ctx = project.context();

    let feedback = run_observer(&ctx, &command_payload("npm test", 1));
    let message = feedback.system_message.expect("message");
    assert!(message.contains("[CORE/GREEN]"));
    assert!(message.contains("Keep implementing"));
}

#[test]
fn marker_in_simplicity_refactor_completes_the_loop() {
    let project = TestProject::new();
    project.write_record(&active_record(Phase::Simplicity, Substate::Refactor, 5, 10));
    let transcript = project.write_transcript("session.jsonl", &["refactoring", &format!("All done. {MARKER}")]);
    let ctx = project.context();

    let decision = run_stop_gate(&ctx, &stop_payload(&transcript));
    assert!(!decision.is_block());
    let record = project.read_record();
    assert!(!record.loop_active);
    assert_eq!(record.iteration, 5);
}

#[test]
fn marker_in_core_is_ignored() {
    let project = TestProject::new();
    project.write_record(&active_record(Phase::Core, Substate::Refactor, 5, 10));
    let transcript = project.write_transcript("session.jsonl", &[MARKER]);
    let ctx = project.context();

    let decision = run_stop_gate(&ctx, &stop_payload(&transcript));
    assert!(decision.is_block());
    let record = project.read_record();
    assert!(record.loop_active);
    assert_eq!(record.iteration, 6);
    assert!(project.log_contents().contains("marker=ignored_outside_simplicity"));
}

#[test]
fn marker_in_an_earlier_message_does_not_count() {
    let project = TestProject::new();
    project.write_record(&active_record(Phase::Simplicity, Substate::Refactor, 2, 0));
    let transcript = project.write_transcript("session.jsonl", &[MARKER, "one more refactor first"]);
    let ctx = project.context();

    assert!(run_stop_gate(&ctx, &stop_payload(&transcript)).is_block());
    assert_eq!(project.read_record().iteration, 3);
}

#[test]
fn alternate_phrase_completes_only_in_simplicity_refactor() {
    let project = TestProject::new();
    let transcript = project.write_transcript("session.jsonl", &["All five phases complete."]);

    project.write_record(&active_record(Phase::Simplicity, Substate::Green, 2, 0));
    assert!(run_stop_gate(&project.context(), &stop_payload(&transcript)).is_block());

    project.write_record(&active_record(Phase::Simplicity, Substate::Refactor, 2, 0));
    assert!(!run_stop_gate(&project.context(), &stop_payload(&transcript)).is_block());
    assert!(!project.read_record().loop_active);
}

#[test]
fn relative_transcript_resolves_against_root() {
    let project = TestProject::new();
    project.write_record(&active_record(Phase::Simplicity, Substate::Red, 4, 0));
    project.write_transcript("relative.jsonl", &[MARKER]);
    let ctx = project.context();

    let decision = run_stop_gate(&ctx, br#"{"transcriptPath":"relative.jsonl"}"#);
    assert!(!decision.is_block());
}

#[test]
fn no_session_approves_and_allows() {
    let project = TestProject::new();
    let ctx = project.context();
    for raw in [edit_payload("src/app.ts"), b"garbage".to_vec(), Vec::new()] {
        assert!(run_edit_gate(&ctx, &raw).is_approved());
        assert!(!run_stop_gate(&ctx, &raw).is_block());
        assert!(run_observer(&ctx, &raw).is_neutral());
    }
    assert!(!project.record_path().exists());
}

#[test]
fn custom_pattern_from_record_unlocks_paths() {
    let project = TestProject::new();
    project.write_record_raw(
        "---\nphase: CORE\nsubstate: RED\nloop_active: true\ntest_patterns: [\\.feature$, fixtures/, (unclosed]\n---\n",
    );
    let ctx = project.context();

    assert!(run_edit_gate(&ctx, &edit_payload("features/cart.feature")).is_approved());
    assert!(run_edit_gate(&ctx, &edit_payload("data/fixtures/cart.json")).is_approved());
    assert!(run_edit_gate(&ctx, &edit_payload("src/(unclosed]/x.ts")).is_approved());
    assert!(!run_edit_gate(&ctx, &edit_payload("src/cart.ts")).is_approved());
}

#[test]
fn disabled_log_writes_nothing() {
    let project = TestProject::new();
    std::fs::write(&project.paths().config_path, "log_enabled = false\n").expect("write config");
    project.write_record(&active_record(Phase::Core, Substate::Red, 1, 0));

    run_stop_gate(&project.context(), b"{}");
    assert!(project.log_contents().is_empty());
    assert_eq!(project.read_record().iteration, 2);
}
