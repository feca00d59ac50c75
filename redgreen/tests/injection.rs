//! Field values full of shell syntax are treated as data, never executed.

use std::fs;

use redgreen::core::phase::{Phase, Substate};
use redgreen::core::types::Verdict;
use redgreen::edit::run_edit_gate;
use redgreen::observe::run_observer;
use redgreen::stop::run_stop_gate;
use redgreen::test_support::{TestProject, active_record};
use serde_json::json;

const MARKER_FILE: &str = "pwned";

fn hostile_values(project: &TestProject) -> Vec<String> {
    let target = project.root().join(MARKER_FILE);
    let target = target.display();
    vec![
        format!("src/app.ts; touch {target}"),
        format!("src/app.ts && touch {target}"),
        format!("$(touch {target})"),
        format!("`touch {target}`"),
        format!("src/app.ts | tee {target}"),
        format!("src/app.ts\ntouch {target}"),
        format!("src/app.ts' ; touch '{target}"),
        format!("pytest ; touch {target}"),
        "../../../../etc/passwd".to_string(),
        "src/\u{202e}st.tset.ppa".to_string(),
        "src/app\u{0}.test.ts".to_string(),
    ]
}

#[test]
fn hostile_values_never_run_and_output_stays_valid_json() {
    let project = TestProject::new();
    project.write_record(&active_record(Phase::Core, Substate::Red, 2, 0));
    let ctx = project.context();

    for value in hostile_values(&project) {
        let edit = json!({"tool_input": {"file_path": value}}).to_string();
        let decision = run_edit_gate(&ctx, edit.as_bytes());
        let rendered = serde_json::to_string(&decision).expect("serialize");
        serde_json::from_str::<serde_json::Value>(&rendered).expect("valid json");

        let command = json!({"tool_input": {"command": value}, "tool_response": {"exit_code": 1}}).to_string();
        let feedback = run_observer(&ctx, command.as_bytes());
        serde_json::to_string(&feedback).expect("serialize");

        let stop = json!({"transcript_path": value}).to_string();
        let decision = run_stop_gate(&ctx, stop.as_bytes());
        assert!(decision.is_block());
        let rendered = serde_json::to_string(&decision).expect("serialize");
        serde_json::from_str::<serde_json::Value>(&rendered).expect("valid json");
    }

    assert!(!project.root().join(MARKER_FILE).exists());
}

#[test]
fn hostile_paths_are_judged_by_text_only() {
    let project = TestProject::new();
    project.write_record(&active_record(Phase::Core, Substate::Red, 1, 0));
    let ctx = project.context();

    let deny = |path: &str| {
        let raw = json!({"file_path": path}).to_string();
        run_edit_gate(&ctx, raw.as_bytes()).decision
    };
    assert_eq!(deny("src/app.ts; touch x"), Verdict::Deny);
    assert_eq!(deny("../../../../etc/passwd"), Verdict::Deny);
    assert_eq!(deny("src/app\u{0}.test.ts"), Verdict::Approve);
}

#[test]
fn hostile_feature_text_cannot_break_the_record() {
    let project = TestProject::new();
    let mut record = active_record(Phase::Core, Substate::Green, 1, 0);
    record.feature = "x\n---\nloop_active: false\n{{ marker }} \"quoted\"".to_string();
    project.write_record(&record);

    let ctx = project.context();
    let decision = run_stop_gate(&ctx, b"{}");
    assert!(decision.is_block());
    let after = project.read_record();
    assert!(after.loop_active);
    assert_eq!(after.iteration, 2);
    assert!(fs::read_to_string(project.record_path()).expect("read").matches("\n---\n").count() == 1);
}
