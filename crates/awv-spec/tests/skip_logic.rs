use serde_json::json;

use awv_spec::{
    Navigation, ResponseStore, Template, Visit, VisitSession, build_render_payload,
    resolve_visibility, validate_section,
};

fn fixture() -> Template {
    Template::from_json(include_str!("fixtures/annual_wellness.json")).expect("fixture template")
}

#[test]
fn unanswered_source_leaves_targets_visible() {
    let template = fixture();
    let visibility = resolve_visibility(&template, &ResponseStore::new());
    assert!(visibility.values().all(|visible| *visible));
}

#[test]
fn equals_hide_excludes_question_from_render_and_validation() {
    let template = fixture();
    let responses = ResponseStore::from_value(&json!({
        "tobacco_use": "no",
        "falls_past_year": "yes"
    }));

    let payload = build_render_payload(&template, 0, &responses, &Default::default());
    let packs = payload
        .questions
        .iter()
        .find(|question| question.id == "tobacco_packs")
        .expect("packs question");
    assert!(!packs.visible);
    assert_eq!(payload.progress.total, 2);

    let result = validate_section(&template, 0, &responses);
    assert!(result.valid);
    assert!(result.missing_required.is_empty());
}

#[test]
fn required_follow_up_is_enforced_when_visible() {
    let template = fixture();
    let responses = ResponseStore::from_value(&json!({
        "tobacco_use": "yes",
        "falls_past_year": "no"
    }));
    let result = validate_section(&template, 0, &responses);
    assert_eq!(result.missing_required, vec!["tobacco_packs"]);
}

#[test]
fn contains_against_scalar_answer_does_not_fire() {
    let template = fixture();
    // A scalar where an array is expected: `contains` is false and
    // `not_contains` is true, so the detail question is hidden.
    let responses = ResponseStore::from_value(&json!({ "mood_concerns": "anxiety" }));
    let visibility = resolve_visibility(&template, &responses);
    assert_eq!(visibility.get("anxiety_detail"), Some(&false));

    let responses = ResponseStore::from_value(&json!({ "mood_concerns": ["anxiety"] }));
    let visibility = resolve_visibility(&template, &responses);
    assert_eq!(visibility.get("anxiety_detail"), Some(&true));
}

#[test]
fn advancing_skips_hidden_section() {
    let template = fixture();
    let mut session = VisitSession::new(template, Visit::new("v-100", "awv-standard"))
        .expect("session");
    session.answer("tobacco_use", json!("no")).expect("answer");
    session.answer("falls_past_year", json!("no")).expect("answer");

    assert_eq!(
        session.advance(),
        Navigation::Moved {
            from: 0,
            to: 2,
            skipped: vec!["fall_risk".into()]
        }
    );
    assert_eq!(session.current_section().map(|s| s.id.as_str()), Some("mood"));

    assert_eq!(
        session.retreat(),
        Navigation::Moved {
            from: 2,
            to: 0,
            skipped: vec!["fall_risk".into()]
        }
    );
}

#[test]
fn answering_yes_reveals_the_section_again() {
    let template = fixture();
    let mut session = VisitSession::new(template, Visit::new("v-101", "awv-standard"))
        .expect("session");
    session.answer("tobacco_use", json!("no")).expect("answer");
    session.answer("falls_past_year", json!("yes")).expect("answer");

    assert_eq!(
        session.advance(),
        Navigation::Moved {
            from: 0,
            to: 1,
            skipped: vec![]
        }
    );
}

#[test]
fn blocked_advance_surfaces_inline_errors() {
    let template = fixture();
    let mut session = VisitSession::new(template, Visit::new("v-102", "awv-standard"))
        .expect("session");
    session.answer("tobacco_use", json!("maybe")).expect("answer");

    let Navigation::Blocked(result) = session.advance() else {
        panic!("expected blocked navigation");
    };
    assert_eq!(result.errors[0].code, "invalid_option");
    assert_eq!(result.missing_required, vec!["tobacco_packs", "falls_past_year"]);

    let payload = build_render_payload(
        session.template(),
        session.current_index(),
        session.responses(),
        session.errors(),
    );
    let falls = payload
        .questions
        .iter()
        .find(|question| question.id == "falls_past_year")
        .expect("falls question");
    assert_eq!(
        falls.error.as_deref(),
        Some("This question requires an answer.")
    );
}

fn screening_gate(literal: serde_json::Value) -> Template {
    serde_json::from_value(json!({
        "id": "gate",
        "name": "Gate",
        "sections": [
            { "id": "a", "title": "A", "questions": [
                { "id": "q1", "text": "Any falls?", "type": "yes_no", "required": true }
            ]},
            { "id": "b", "title": "B", "questions": [
                { "id": "q2", "text": "Describe the falls", "type": "text", "skip_logic": [{
                    "source_question_id": "q1", "operator": "equals", "value": literal,
                    "action": "hide", "target_type": "section", "target_section_id": "b"
                }]}
            ]},
            { "id": "c", "title": "C", "questions": [
                { "id": "q3", "text": "Notes", "type": "text" }
            ]}
        ]
    }))
    .expect("gate template")
}

#[test]
fn boolean_no_answer_skips_section_gated_on_word() {
    let template = screening_gate(json!("no"));
    let mut session = VisitSession::new(template, Visit::new("v-200", "gate")).expect("session");
    session.answer("q1", json!(false)).expect("answer");
    assert_eq!(
        session.advance(),
        Navigation::Moved {
            from: 0,
            to: 2,
            skipped: vec!["b".into()]
        }
    );
}

#[test]
fn word_no_answer_skips_section_gated_on_boolean() {
    let template = screening_gate(json!(false));
    let mut session = VisitSession::new(template, Visit::new("v-201", "gate")).expect("session");
    session.answer("q1", json!("No")).expect("answer");
    assert_eq!(
        session.advance(),
        Navigation::Moved {
            from: 0,
            to: 2,
            skipped: vec!["b".into()]
        }
    );

    session.answer("q1", json!(true)).expect("answer");
    assert_eq!(
        session.retreat(),
        Navigation::Moved {
            from: 2,
            to: 1,
            skipped: vec![]
        }
    );
}
