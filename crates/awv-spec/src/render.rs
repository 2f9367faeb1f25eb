use serde_json::{Map, Value, json};

use crate::composite::{ScoreAnswer, VitalSigns};
use crate::responses::{ResponseStore, ValidationResult};
use crate::spec::{QuestionKind, Template};
use crate::visibility::{question_visible, section_hidden};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Required answers are still missing in the section.
    NeedInput,
    /// Every visible required question in the section is answered.
    Complete,
    /// The requested section does not exist.
    Error,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
            RenderStatus::Error => "error",
        }
    }
}

/// Progress counters over the visible questions of a section.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    pub answered: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct RenderOption {
    pub id: String,
    pub label: String,
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone)]
pub struct RenderQuestion {
    pub id: String,
    pub text: String,
    pub help_text: Option<String>,
    pub kind: QuestionKind,
    pub required: bool,
    pub visible: bool,
    pub current_value: Option<Value>,
    pub options: Vec<RenderOption>,
    pub error: Option<String>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub template_id: String,
    pub template_name: String,
    pub section_id: Option<String>,
    pub section_title: Option<String>,
    pub section_description: Option<String>,
    pub section_index: usize,
    pub section_count: usize,
    pub section_hidden: bool,
    pub status: RenderStatus,
    pub progress: RenderProgress,
    pub questions: Vec<RenderQuestion>,
}

/// Build the renderer payload for one section of the template.
pub fn build_render_payload(
    template: &Template,
    section_index: usize,
    responses: &ResponseStore,
    errors: &ValidationResult,
) -> RenderPayload {
    let Some(section) = template.sections.get(section_index) else {
        return RenderPayload {
            template_id: template.id.clone(),
            template_name: template.name.clone(),
            section_id: None,
            section_title: None,
            section_description: None,
            section_index,
            section_count: template.sections.len(),
            section_hidden: true,
            status: RenderStatus::Error,
            progress: RenderProgress {
                answered: 0,
                total: 0,
            },
            questions: Vec::new(),
        };
    };

    let questions = section
        .questions
        .iter()
        .map(|question| {
            let visible = question_visible(question, responses);
            RenderQuestion {
                id: question.id.clone(),
                text: question.text.clone(),
                help_text: question.help_text.clone(),
                kind: question.kind.clone(),
                required: question.required,
                visible,
                current_value: responses.answer(&question.id).cloned(),
                options: question
                    .kind
                    .options()
                    .iter()
                    .map(|option| RenderOption {
                        id: option.id.clone(),
                        label: option.label.clone(),
                    })
                    .collect(),
                error: if visible {
                    errors.message_for(&question.id)
                } else {
                    None
                },
            }
        })
        .collect::<Vec<_>>();

    let visible = questions.iter().filter(|question| question.visible);
    let total = visible.clone().count();
    let answered = visible
        .clone()
        .filter(|question| question.current_value.is_some())
        .count();
    let pending_required = visible
        .filter(|question| question.required && question.current_value.is_none())
        .count();

    let status = if pending_required > 0 {
        RenderStatus::NeedInput
    } else {
        RenderStatus::Complete
    };

    RenderPayload {
        template_id: template.id.clone(),
        template_name: template.name.clone(),
        section_id: Some(section.id.clone()),
        section_title: Some(section.title.clone()),
        section_description: section.description.clone(),
        section_index,
        section_count: template.sections.len(),
        section_hidden: section_hidden(section, responses),
        status,
        progress: RenderProgress { answered, total },
        questions,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let questions = payload
        .questions
        .iter()
        .map(|question| {
            let mut map = Map::new();
            map.insert("id".into(), Value::String(question.id.clone()));
            map.insert("text".into(), Value::String(question.text.clone()));
            map.insert(
                "help_text".into(),
                question
                    .help_text
                    .clone()
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            );
            map.insert(
                "type".into(),
                Value::String(question.kind.label().to_string()),
            );
            map.insert("required".into(), Value::Bool(question.required));
            if let Some(current_value) = &question.current_value {
                map.insert("current_value".into(), current_value.clone());
            }
            if !question.options.is_empty() {
                map.insert(
                    "options".into(),
                    Value::Array(
                        question
                            .options
                            .iter()
                            .map(|option| json!({ "id": option.id, "label": option.label }))
                            .collect(),
                    ),
                );
            }
            if let Some(error) = &question.error {
                map.insert("error".into(), Value::String(error.clone()));
            }
            map.insert("visible".into(), Value::Bool(question.visible));
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "template_id": payload.template_id,
        "template_name": payload.template_name,
        "section": {
            "id": payload.section_id,
            "title": payload.section_title,
            "description": payload.section_description,
            "index": payload.section_index,
            "count": payload.section_count,
            "hidden": payload.section_hidden,
        },
        "status": payload.status.as_str(),
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
        },
        "questions": questions,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Template: {} ({})",
        payload.template_name, payload.template_id
    ));
    match &payload.section_title {
        Some(title) => lines.push(format!(
            "Section {}/{}: {}",
            payload.section_index + 1,
            payload.section_count,
            title
        )),
        None => {
            lines.push(format!("Section {} does not exist.", payload.section_index + 1));
            return lines.join("\n");
        }
    }
    if let Some(description) = &payload.section_description {
        lines.push(description.clone());
    }
    lines.push(format!(
        "Status: {} ({}/{})",
        payload.status.as_str(),
        payload.progress.answered,
        payload.progress.total
    ));

    lines.push("Visible questions:".to_string());
    for question in payload.questions.iter().filter(|question| question.visible) {
        let mut entry = format!(" - {} ({})", question.id, question.text);
        if question.required {
            entry.push_str(" [required]");
        }
        if let Some(current_value) = &question.current_value {
            entry.push_str(&format!(
                " = {}",
                display_answer(&question.kind, current_value)
            ));
        }
        lines.push(entry);
        if let Some(error) = &question.error {
            lines.push(format!("   ! {}", error));
        }
    }

    lines.join("\n")
}

/// Human-readable rendering of an answer, resolving option labels.
pub fn display_answer(kind: &QuestionKind, value: &Value) -> String {
    let label_of = |option_id: &str| {
        kind.options()
            .iter()
            .find(|option| option.id == option_id)
            .map(|option| option.label.clone())
            .unwrap_or_else(|| option_id.to_string())
    };
    match (kind, value) {
        (QuestionKind::SingleChoice { .. }, Value::String(option_id)) => label_of(option_id),
        (QuestionKind::MultiChoice { .. }, Value::Array(items)) => items
            .iter()
            .map(|item| match item.as_str() {
                Some(option_id) => label_of(option_id),
                None => item.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        (QuestionKind::YesNo, Value::Bool(flag)) => if *flag { "Yes" } else { "No" }.to_string(),
        (QuestionKind::VitalSigns, _) => VitalSigns::from_value(value)
            .map(|vitals| vitals.summary())
            .unwrap_or_else(|| value.to_string()),
        (QuestionKind::ClinicalScore { instrument, .. }, _) => ScoreAnswer::from_value(value)
            .map(|score| format!("{} total {}", instrument, score.total()))
            .unwrap_or_else(|| value.to_string()),
        (_, Value::String(text)) => text.clone(),
        (_, Value::Bool(flag)) => flag.to_string(),
        (_, Value::Number(number)) => number.to_string(),
        (_, other) => other.to_string(),
    }
}
