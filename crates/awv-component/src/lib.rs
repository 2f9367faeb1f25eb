use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use awv_spec::{
    Navigation, ResponseStore, SessionError, Template, TemplateError, ValidationResult, Visit,
    VisitSession, build_render_payload, render_json_ui as awv_render_json_ui,
    render_text as awv_render_text, resolve_visibility, responses_schema, section_hidden,
    template_schema, validate_section as awv_validate_section,
};

const DEFAULT_TEMPLATE: &str = include_str!("../../awv-spec/tests/fixtures/annual_wellness.json");
const DRAFT_VISIT_ID: &str = "draft";

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("template '{0}' is not available")]
    TemplateUnavailable(String),
    #[error("failed to parse visit: {0}")]
    VisitParse(#[source] serde_json::Error),
    #[error("failed to parse answer value: {0}")]
    ValueParse(#[source] serde_json::Error),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    template_json: Option<String>,
}

fn load_template(config_json: &str) -> Result<Template, ComponentError> {
    let config = if config_json.trim().is_empty() {
        ComponentConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)?
    };

    let template_json = config.template_json.as_deref().unwrap_or(DEFAULT_TEMPLATE);
    Ok(Template::from_json(template_json)?)
}

fn ensure_template(template_id: &str, config_json: &str) -> Result<Template, ComponentError> {
    let template = load_template(config_json)?;
    if template.id != template_id {
        Err(ComponentError::TemplateUnavailable(template_id.to_string()))
    } else {
        Ok(template)
    }
}

fn parse_responses(responses_json: &str) -> ResponseStore {
    serde_json::from_str::<Value>(responses_json)
        .map(|value| ResponseStore::from_value(&value))
        .unwrap_or_default()
}

/// A blank visit document starts a fresh draft visit.
fn parse_visit(template: &Template, visit_json: &str) -> Result<Visit, ComponentError> {
    if visit_json.trim().is_empty() {
        return Ok(Visit::new(DRAFT_VISIT_ID, template.id.clone()));
    }
    serde_json::from_str(visit_json).map_err(ComponentError::VisitParse)
}

fn open(
    template_id: &str,
    config_json: &str,
    visit_json: &str,
) -> Result<VisitSession, ComponentError> {
    let template = ensure_template(template_id, config_json)?;
    let visit = parse_visit(&template, visit_json)?;
    Ok(VisitSession::new(template, visit)?)
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, ComponentError> {
    serde_json::to_value(value).map_err(ComponentError::JsonEncode)
}

pub fn describe(template_id: &str, config_json: &str) -> String {
    respond(ensure_template(template_id, config_json).map(|template| {
        let sections = template
            .sections
            .iter()
            .map(|section| {
                json!({
                    "id": section.id,
                    "title": section.title,
                    "question_count": section.questions.len(),
                })
            })
            .collect::<Vec<_>>();
        json!({
            "id": template.id,
            "name": template.name,
            "description": template.description,
            "active": template.metadata.active,
            "section_count": template.section_count(),
            "question_count": template.question_count(),
            "sections": sections,
        })
    }))
}

pub fn get_template_schema() -> String {
    respond(Ok(template_schema()))
}

pub fn get_responses_schema(template_id: &str, config_json: &str, responses_json: &str) -> String {
    respond(ensure_template(template_id, config_json).map(|template| {
        let responses = parse_responses(responses_json);
        let visibility = resolve_visibility(&template, &responses);
        responses_schema(&template, &visibility)
    }))
}

pub fn get_visibility(template_id: &str, config_json: &str, responses_json: &str) -> String {
    respond(ensure_template(template_id, config_json).map(|template| {
        let responses = parse_responses(responses_json);
        let questions = resolve_visibility(&template, &responses)
            .into_iter()
            .map(|(id, visible)| (id, Value::Bool(visible)))
            .collect::<Map<_, _>>();
        let sections = template
            .sections
            .iter()
            .map(|section| {
                (
                    section.id.clone(),
                    Value::Bool(!section_hidden(section, &responses)),
                )
            })
            .collect::<Map<_, _>>();
        json!({ "questions": questions, "sections": sections })
    }))
}

pub fn validate_section(
    template_id: &str,
    config_json: &str,
    responses_json: &str,
    section_index: usize,
) -> String {
    respond(ensure_template(template_id, config_json).and_then(|template| {
        let responses = parse_responses(responses_json);
        encode(&awv_validate_section(&template, section_index, &responses))
    }))
}

fn section_ui(session: &VisitSession) -> Value {
    let payload = build_render_payload(
        session.template(),
        session.current_index(),
        session.responses(),
        session.errors(),
    );
    awv_render_json_ui(&payload)
}

fn session_response(
    session: &VisitSession,
    status: &str,
    validation: Option<&ValidationResult>,
) -> Result<Value, ComponentError> {
    let mut map = Map::new();
    map.insert("status".into(), Value::String(status.into()));
    map.insert("visit".into(), encode(session.visit())?);
    map.insert("section".into(), section_ui(session));
    if let Some(validation) = validation {
        map.insert("validation".into(), encode(validation)?);
    }
    Ok(Value::Object(map))
}

pub fn next(template_id: &str, config_json: &str, visit_json: &str) -> String {
    respond(
        open(template_id, config_json, visit_json).map(|session| {
            let ui = section_ui(&session);
            json!({
                "status": ui["status"],
                "section_index": session.current_index(),
                "is_last_section": session.is_last_section(),
                "progress": ui["progress"],
            })
        }),
    )
}

pub fn submit_patch(
    template_id: &str,
    config_json: &str,
    visit_json: &str,
    question_id: &str,
    value_json: &str,
) -> String {
    respond(open(template_id, config_json, visit_json).and_then(|mut session| {
        let value: Value = serde_json::from_str(value_json).map_err(ComponentError::ValueParse)?;
        session.answer(question_id, value)?;
        let question = session
            .template()
            .question(question_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.to_string()))?;
        let stored = session.responses().answer(question_id).cloned();
        match stored.and_then(|value| awv_spec::validate_answer(&question, &value)) {
            Some(error) => {
                let validation = ValidationResult {
                    valid: false,
                    errors: vec![error],
                    ..Default::default()
                };
                session_response(&session, "error", Some(&validation))
            }
            None => session_response(&session, "accepted", None),
        }
    }))
}

fn navigation_response(
    session: &VisitSession,
    navigation: Navigation,
) -> Result<Value, ComponentError> {
    match navigation {
        Navigation::Moved { skipped, .. } => {
            let mut value = session_response(session, "moved", None)?;
            value["skipped"] = json!(skipped);
            Ok(value)
        }
        Navigation::AtBoundary => session_response(session, "at_boundary", None),
        Navigation::Blocked(validation) => session_response(session, "blocked", Some(&validation)),
    }
}

pub fn advance(template_id: &str, config_json: &str, visit_json: &str) -> String {
    respond(open(template_id, config_json, visit_json).and_then(|mut session| {
        let navigation = session.advance();
        navigation_response(&session, navigation)
    }))
}

pub fn retreat(template_id: &str, config_json: &str, visit_json: &str) -> String {
    respond(open(template_id, config_json, visit_json).and_then(|mut session| {
        let navigation = session.retreat();
        navigation_response(&session, navigation)
    }))
}

pub fn save(template_id: &str, config_json: &str, visit_json: &str) -> String {
    respond(open(template_id, config_json, visit_json).and_then(|mut session| {
        session.save_progress();
        session_response(&session, "saved", None)
    }))
}

pub fn complete(template_id: &str, config_json: &str, visit_json: &str) -> String {
    respond(open(template_id, config_json, visit_json).and_then(|mut session| {
        match session.complete().map(|_| ()) {
            Ok(()) => session_response(&session, "completed", None),
            Err(validation) => session_response(&session, "error", Some(&validation)),
        }
    }))
}

pub fn recommendations(template_id: &str, config_json: &str, visit_json: &str) -> String {
    respond(
        open(template_id, config_json, visit_json)
            .and_then(|session| encode(&session.recommendations())),
    )
}

pub fn render_text(template_id: &str, config_json: &str, visit_json: &str) -> String {
    respond_string(open(template_id, config_json, visit_json).map(|session| {
        let payload = build_render_payload(
            session.template(),
            session.current_index(),
            session.responses(),
            session.errors(),
        );
        awv_render_text(&payload)
    }))
}

pub fn render_json_ui(template_id: &str, config_json: &str, visit_json: &str) -> String {
    respond(open(template_id, config_json, visit_json).map(|session| section_ui(&session)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEMPLATE_ID: &str = "awv-standard";

    fn parse(raw: &str) -> Value {
        serde_json::from_str(raw).expect("json")
    }

    fn visit_with(responses: Value, section: usize) -> String {
        json!({
            "id": "v-1",
            "template_id": TEMPLATE_ID,
            "status": "in_progress",
            "responses": responses,
            "current_section": section
        })
        .to_string()
    }

    #[test]
    fn describe_returns_counts() {
        let summary = parse(&describe(TEMPLATE_ID, ""));
        assert_eq!(summary["id"], TEMPLATE_ID);
        assert_eq!(summary["section_count"], 4);
        assert_eq!(summary["sections"][1]["id"], "fall_risk");
    }

    #[test]
    fn unknown_template_reports_error() {
        let response = parse(&describe("other", ""));
        assert_eq!(response["error"], "template 'other' is not available");
    }

    #[test]
    fn visibility_hides_fall_section() {
        let response = parse(&get_visibility(
            TEMPLATE_ID,
            "",
            r#"{"falls_past_year": "no"}"#,
        ));
        assert_eq!(response["sections"]["fall_risk"], false);
        assert_eq!(response["questions"]["fall_count"], false);
        assert_eq!(response["questions"]["tobacco_packs"], true);
    }

    #[test]
    fn validate_section_lists_missing() {
        let response = parse(&validate_section(TEMPLATE_ID, "", "{}", 0));
        assert_eq!(response["valid"], false);
        assert_eq!(
            response["missing_required"],
            json!(["tobacco_use", "tobacco_packs", "falls_past_year"])
        );
    }

    #[test]
    fn submit_patch_starts_draft_visit() {
        let response = parse(&submit_patch(TEMPLATE_ID, "", "", "tobacco_use", r#""no""#));
        assert_eq!(response["status"], "accepted");
        assert_eq!(response["visit"]["id"], "draft");
        assert_eq!(response["visit"]["status"], "in_progress");
        assert_eq!(response["visit"]["responses"]["tobacco_use"], "no");
        let questions = response["section"]["questions"].as_array().expect("questions");
        let packs = questions
            .iter()
            .find(|question| question["id"] == "tobacco_packs")
            .expect("packs");
        assert_eq!(packs["visible"], false);
    }

    #[test]
    fn submit_patch_flags_invalid_option() {
        let response = parse(&submit_patch(TEMPLATE_ID, "", "", "tobacco_use", r#""often""#));
        assert_eq!(response["status"], "error");
        assert_eq!(response["validation"]["errors"][0]["code"], "invalid_option");
    }

    #[test]
    fn submit_patch_rejects_unknown_question() {
        let response = parse(&submit_patch(TEMPLATE_ID, "", "", "nope", "1"));
        assert_eq!(
            response["error"],
            "question 'nope' is not part of the template"
        );
    }

    #[test]
    fn advance_skips_hidden_section() {
        let visit = visit_with(json!({ "tobacco_use": "no", "falls_past_year": "no" }), 0);
        let response = parse(&advance(TEMPLATE_ID, "", &visit));
        assert_eq!(response["status"], "moved");
        assert_eq!(response["skipped"], json!(["fall_risk"]));
        assert_eq!(response["visit"]["current_section"], 2);
        assert_eq!(response["section"]["section"]["id"], "mood");
    }

    #[test]
    fn advance_blocks_on_missing_answers() {
        let visit = visit_with(json!({}), 0);
        let response = parse(&advance(TEMPLATE_ID, "", &visit));
        assert_eq!(response["status"], "blocked");
        assert_eq!(response["visit"]["current_section"], 0);
        assert_eq!(
            response["validation"]["missing_required"][0],
            "tobacco_use"
        );
    }

    #[test]
    fn retreat_at_first_section_is_boundary() {
        let response = parse(&retreat(TEMPLATE_ID, "", &visit_with(json!({}), 0)));
        assert_eq!(response["status"], "at_boundary");
    }

    #[test]
    fn complete_reports_missing_final_section_answers() {
        let visit = visit_with(
            json!({
                "tobacco_use": "no",
                "falls_past_year": "no",
                "phq2": 1
            }),
            3,
        );
        let response = parse(&complete(TEMPLATE_ID, "", &visit));
        assert_eq!(response["status"], "error");
        assert_eq!(
            response["validation"]["missing_required"],
            json!(["vitals", "advance_directive"])
        );
    }

    #[test]
    fn complete_finalizes_visit() {
        let visit = visit_with(
            json!({
                "tobacco_use": "yes",
                "tobacco_packs": 0.5,
                "falls_past_year": "no",
                "phq2": 0,
                "vitals": { "systolic": 120, "diastolic": 70 },
                "advance_directive": true
            }),
            3,
        );
        let response = parse(&complete(TEMPLATE_ID, "", &visit));
        assert_eq!(response["status"], "completed");
        assert_eq!(response["visit"]["status"], "completed");
        assert_eq!(
            response["visit"]["recommendations"][0]["text"],
            "Offer tobacco cessation counseling"
        );
    }

    #[test]
    fn recommendations_follow_answers() {
        let visit = visit_with(json!({ "mood_concerns": ["grief"] }), 2);
        let response = parse(&recommendations(TEMPLATE_ID, "", &visit));
        assert_eq!(response[0]["text"], "Share bereavement support resources");
        assert_eq!(response[0]["selected"], true);
    }

    #[test]
    fn render_text_outputs_section_summary() {
        let output = render_text(TEMPLATE_ID, "", "");
        assert!(output.contains("Template: Annual Wellness Visit"));
        assert!(output.contains("Section 1/4: Health Risk Assessment"));
    }

    #[test]
    fn custom_template_from_config() {
        let template = json!({
            "id": "mini",
            "name": "Mini",
            "sections": [{ "id": "s", "title": "S", "questions": [
                { "id": "q", "text": "Q", "type": "text", "required": true }
            ]}]
        });
        let config = json!({ "template_json": template.to_string() }).to_string();
        let response = parse(&next("mini", &config, ""));
        assert_eq!(response["status"], "need_input");
        assert_eq!(response["is_last_section"], true);
    }

    #[test]
    fn unknown_question_type_is_rejected_at_load() {
        let template = json!({
            "id": "bad",
            "name": "Bad",
            "sections": [{ "id": "s", "title": "S", "questions": [
                { "id": "q", "text": "Q", "type": "signature" }
            ]}]
        });
        let config = json!({ "template_json": template.to_string() }).to_string();
        let response = parse(&describe("bad", &config));
        assert!(
            response["error"]
                .as_str()
                .unwrap_or_default()
                .starts_with("failed to parse template")
        );
    }
}
