use serde_json::json;

use awv_spec::{
    Navigation, ReportRenderer, Template, Visit, VisitSession, VisitStatus, build_render_payload,
    lint_template, render_json_ui, render_text, resolve_visibility, responses_schema,
    template_schema,
};

fn fixture() -> Template {
    Template::from_json(include_str!("fixtures/annual_wellness.json")).expect("fixture template")
}

fn session_through_mood() -> VisitSession {
    let mut session = VisitSession::new(fixture(), Visit::new("v-200", "awv-standard"))
        .expect("session");
    session.answer("tobacco_use", json!("yes")).expect("answer");
    session.answer("tobacco_packs", json!(1)).expect("answer");
    session.answer("falls_past_year", json!("no")).expect("answer");
    session
        .answer("phq2", json!({ "items": { "interest": 2, "mood": 2 } }))
        .expect("answer");
    session
        .answer("mood_concerns", json!(["sleep", "grief"]))
        .expect("answer");
    session
}

#[test]
fn completion_reports_exact_missing_ids_in_final_section() {
    let mut session = session_through_mood();
    assert!(matches!(session.advance(), Navigation::Moved { to: 2, .. }));
    assert!(matches!(session.advance(), Navigation::Moved { to: 3, .. }));

    let result = session.complete().expect_err("completion must be blocked");
    assert!(!result.valid);
    assert_eq!(result.missing_required, vec!["vitals", "advance_directive"]);
    assert_ne!(session.visit().status, VisitStatus::Completed);
}

#[test]
fn completion_extracts_recommendations() {
    let mut session = session_through_mood();
    session
        .answer(
            "vitals",
            json!({ "systolic": 146, "diastolic": 88, "weight_lb": 170, "height_in": 68 }),
        )
        .expect("answer");
    session
        .answer("advance_directive", json!(false))
        .expect("answer");

    let visit = session.complete().expect("complete").clone();
    assert_eq!(visit.status, VisitStatus::Completed);
    assert!(visit.completed_at.is_some());

    let texts: Vec<_> = visit
        .recommendations
        .iter()
        .map(|recommendation| recommendation.text.as_str())
        .collect();
    assert_eq!(
        texts,
        vec![
            "Offer tobacco cessation counseling",
            "Administer PHQ-9 and discuss behavioral health referral",
            "Provide sleep hygiene education",
            "Share bereavement support resources",
            "Follow up on elevated blood pressure and recheck within 4 weeks",
        ]
    );
    assert_eq!(visit.recommendations[1].category, "Depression Screening");
    assert_eq!(
        visit.recommendations[1].source,
        "PHQ-2 score 4 (Positive screen)"
    );
}

#[test]
fn deselected_recommendations_are_left_out_of_the_report() {
    let mut session = session_through_mood();
    session
        .answer("vitals", json!({ "systolic": 118, "diastolic": 76 }))
        .expect("answer");
    session
        .answer("advance_directive", json!("yes"))
        .expect("answer");
    assert!(!session.toggle_recommendation(0).expect("toggle"));

    let visit = session.complete().expect("complete").clone();
    assert!(!visit.recommendations[0].selected);

    let report = ReportRenderer::new()
        .expect("renderer")
        .render(session.template(), &visit)
        .expect("report");
    assert!(!report.contains("Offer tobacco cessation counseling"));
    assert!(report.contains("Provide sleep hygiene education"));
    assert!(!report.contains("## Fall Risk"));
    assert!(report.contains("- **PHQ-2 score**: PHQ-2 total 4"));
}

#[test]
fn responses_survive_the_save_payload() {
    let mut session = session_through_mood();
    session
        .answer("vitals", json!({ "systolic": 121.5, "diastolic": 79 }))
        .expect("answer");
    session
        .answer("notes", json!("Patient walks daily."))
        .expect("answer");
    let saved = session.save_progress().clone();
    assert_eq!(saved.status, VisitStatus::InProgress);

    let payload = serde_json::to_string(&saved).expect("encode");
    let reloaded: Visit = serde_json::from_str(&payload).expect("decode");
    assert_eq!(reloaded.responses, saved.responses);
    for (question_id, value) in saved.responses.iter() {
        assert_eq!(reloaded.responses.get(question_id), Some(value));
    }

    let resumed = VisitSession::new(fixture(), reloaded).expect("resume");
    assert_eq!(resumed.current_index(), saved.current_section);
}

#[test]
fn cbor_snapshot_restores_visit() {
    let session = session_through_mood();
    let bytes = session.visit().to_cbor().expect("cbor");
    let restored = Visit::from_cbor(&bytes).expect("restore");
    assert_eq!(restored.responses, session.visit().responses);
    assert_eq!(restored.status, VisitStatus::InProgress);
}

#[test]
fn render_outputs_describe_the_current_section() {
    let session = session_through_mood();
    let payload = build_render_payload(
        session.template(),
        2,
        session.responses(),
        session.errors(),
    );
    let text = render_text(&payload);
    assert!(text.contains("Section 3/4: Depression Screening"));
    assert!(text.contains("mood_concerns (Which concerns would you like to discuss?) = Sleep, Grief or loss"));

    let ui = render_json_ui(&payload);
    assert_eq!(ui["section"]["id"], "mood");
    assert_eq!(ui["status"], "complete");
    let questions = ui["questions"].as_array().expect("questions");
    let detail = questions
        .iter()
        .find(|question| question["id"] == "anxiety_detail")
        .expect("detail");
    assert_eq!(detail["visible"], false);
}

#[test]
fn fixture_template_passes_lint() {
    assert!(lint_template(&fixture()).is_empty());
}

#[test]
fn schemas_describe_template_and_responses() {
    let schema = template_schema();
    assert!(schema.get("properties").is_some());

    let template = fixture();
    let responses = awv_spec::ResponseStore::from_value(&json!({ "falls_past_year": "no" }));
    let visibility = resolve_visibility(&template, &responses);
    let schema = responses_schema(&template, &visibility);
    let required: Vec<_> = schema["required"]
        .as_array()
        .expect("required")
        .iter()
        .filter_map(|value| value.as_str())
        .collect();
    assert!(required.contains(&"falls_past_year"));
    assert!(!required.contains(&"fall_count"));
    assert_eq!(schema["properties"]["mood_concerns"]["type"], "array");
}
