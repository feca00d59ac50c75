//! Human-readable guidance text handed back to the acting agent.
//!
//! Continuation instructions are rendered from an embedded minijinja
//! template. Record values (notably the free-text feature) are passed as
//! template data only, so template syntax inside them is printed literally.

use minijinja::{Environment, context};
use tracing::warn;

use crate::core::record::SessionRecord;

const CONTINUE_TEMPLATE: &str = include_str!("prompts/continue.md");

/// Longest slice of untrusted text quoted back in a message.
pub const SNIPPET_LIMIT: usize = 200;

/// Template engine wrapper around minijinja.
struct GuidanceEngine {
    env: Environment<'static>,
}

impl GuidanceEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("continue", CONTINUE_TEMPLATE)
            .expect("continue template should be valid");
        Self { env }
    }

    fn render_continue(&self, record: &SessionRecord, marker: &str) -> Result<String, minijinja::Error> {
        let template = self.env.get_template("continue")?;
        let feature = snippet(record.feature.trim(), SNIPPET_LIMIT);
        template.render(context! {
            iteration => record.iteration,
            max_iterations => (record.max_iterations > 0).then_some(record.max_iterations),
            feature => if feature.is_empty() { "(not recorded)".to_string() } else { feature },
            phase => record.phase.as_str(),
            phase_number => record.phase.number(),
            focus => record.phase.focus(),
            substate => record.substate.as_str(),
            next_phase => record.phase.next().map(|p| p.as_str()),
            marker => marker,
        })
    }
}

/// Instruction telling the agent what to do next instead of exiting.
pub fn continuation_instruction(record: &SessionRecord, marker: &str) -> String {
    match GuidanceEngine::new().render_continue(record, marker) {
        Ok(rendered) => rendered.trim().to_string(),
        Err(err) => {
            warn!(error = %err, "continuation template failed to render");
            format!(
                "Continue the TDD loop at {} (iteration {}). Do not stop until the loop is complete.",
                record.position(),
                record.iteration
            )
        }
    }
}

/// One-line status, e.g. `TDD loop 3/10 · CORE/RED`.
pub fn status_line(record: &SessionRecord) -> String {
    format!("TDD loop {} · {}", record.iteration_label(), record.position())
}

/// Reason attached to a denied implementation edit.
pub fn red_denial_reason(record: &SessionRecord, path: &str) -> String {
    format!(
        "{} is in RED: write a failing test before editing implementation code. \
         `{}` is not a test file. Edit a test (or add a custom test pattern), run it, \
         watch it fail, then move to GREEN.",
        record.phase,
        snippet(path, SNIPPET_LIMIT)
    )
}

/// Truncate untrusted text to `limit` chars and flatten control characters.
pub fn snippet(text: &str, limit: usize) -> String {
    let mut out: String = text
        .chars()
        .take(limit)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if text.chars().nth(limit).is_some() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::phase::{Phase, Substate};

    const MARKER: &str = "<promise>TDD_COMPLETE</promise>";

    fn record(phase: Phase, substate: Substate) -> SessionRecord {
        let mut record = SessionRecord::new("shopping cart totals", 10);
        record.phase = phase;
        record.substate = substate;
        record.iteration = 3;
        record
    }

    #[test]
    fn red_instruction_asks_for_a_failing_test() {
        let text = continuation_instruction(&record(Phase::Edge, Substate::Red), MARKER);
        assert!(text.starts_with("# TDD loop: iteration 3 of 10"));
        assert!(text.contains("Feature: shopping cart totals"));
        assert!(text.contains("Phase 2/5 EDGE"));
        assert!(text.contains("Write ONE new failing test"));
        assert!(!text.contains(MARKER));
    }

    #[test]
    fn green_instruction_asks_for_implementation() {
        let text = continuation_instruction(&record(Phase::Core, Substate::Green), MARKER);
        assert!(text.contains("minimum implementation"));
    }

    #[test]
    fn refactor_instruction_names_next_phase_or_marker() {
        let text = continuation_instruction(&record(Phase::Security, Substate::Refactor), MARKER);
        assert!(text.contains("advance to PERFORMANCE/RED"));
        assert!(!text.contains(MARKER));

        let text = continuation_instruction(&record(Phase::Simplicity, Substate::Refactor), MARKER);
        assert!(text.contains(MARKER));
    }

    #[test]
    fn unlimited_loop_omits_the_ceiling() {
        let mut rec = record(Phase::Core, Substate::Red);
        rec.max_iterations = 0;
        let text = continuation_instruction(&rec, MARKER);
        assert!(text.starts_with("# TDD loop: iteration 3\n"));
    }

    #[test]
    fn template_syntax_in_feature_is_literal() {
        let mut rec = record(Phase::Core, Substate::Red);
        rec.feature = "{{ marker }} {% if true %}x{% endif %} $(touch marker)".to_string();
        let text = continuation_instruction(&rec, MARKER);
        assert!(text.contains("Feature: {{ marker }} {% if true %}x{% endif %} $(touch marker)"));
    }

    #[test]
    fn status_line_shows_iteration_and_position() {
        assert_eq!(
            status_line(&record(Phase::Performance, Substate::Green)),
            "TDD loop 3/10 · PERFORMANCE/GREEN"
        );
    }

    #[test]
    fn denial_reason_quotes_a_flattened_snippet() {
        let reason = red_denial_reason(&record(Phase::Core, Substate::Red), "src/app.ts\nrm -rf /");
        assert!(reason.starts_with("CORE is in RED"));
        assert!(reason.contains("`src/app.ts rm -rf /`"));
        assert!(!reason.contains('\n'));
    }

    #[test]
    fn snippet_truncates_long_text() {
        let long = "a".repeat(500);
        let cut = snippet(&long, 10);
        assert_eq!(cut, format!("{}…", "a".repeat(10)));
        assert_eq!(snippet("short", 10), "short");
    }
}
