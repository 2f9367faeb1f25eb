use serde_json::{Map, Value, json};

use crate::composite::VITAL_FIELDS;
use crate::spec::{QuestionKind, Template};
use crate::visibility::VisibilityMap;

/// JSON Schema describing the template document format.
pub fn template_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(Template)).unwrap_or(Value::Null)
}

/// JSON Schema for the response object of one template. Only visible
/// questions are listed as required.
pub fn responses_schema(template: &Template, visibility: &VisibilityMap) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for question in template.questions() {
        let mut schema = answer_schema(&question.kind);
        if let Value::Object(map) = &mut schema {
            map.insert("title".into(), Value::String(question.text.clone()));
            if let Some(help) = &question.help_text {
                map.insert("description".into(), Value::String(help.clone()));
            }
        }
        properties.insert(question.id.clone(), schema);

        if question.required && visibility.get(&question.id).copied().unwrap_or(true) {
            required.push(Value::String(question.id.clone()));
        }
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": format!("{} responses", template.name),
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": true,
    })
}

fn answer_schema(kind: &QuestionKind) -> Value {
    let option_ids = || {
        kind.options()
            .iter()
            .map(|option| Value::String(option.id.clone()))
            .collect::<Vec<_>>()
    };
    match kind {
        QuestionKind::Text => json!({ "type": "string" }),
        QuestionKind::YesNo => json!({
            "anyOf": [{ "type": "boolean" }, { "enum": ["yes", "no"] }]
        }),
        QuestionKind::SingleChoice { .. } => json!({ "type": "string", "enum": option_ids() }),
        QuestionKind::MultiChoice { .. } => json!({
            "type": "array",
            "items": { "type": "string", "enum": option_ids() },
            "uniqueItems": true
        }),
        QuestionKind::Numeric { .. } => json!({ "type": "number" }),
        QuestionKind::Date => json!({ "type": "string", "format": "date" }),
        QuestionKind::VitalSigns => {
            let properties = VITAL_FIELDS
                .iter()
                .map(|field| (field.to_string(), json!({ "type": "number" })))
                .collect::<Map<_, _>>();
            json!({ "type": "object", "properties": properties })
        }
        QuestionKind::ClinicalScore { max_score, .. } => json!({
            "anyOf": [
                { "type": "number", "minimum": 0, "maximum": max_score },
                {
                    "type": "object",
                    "properties": {
                        "items": { "type": "object", "additionalProperties": { "type": "number" } },
                        "total": { "type": "number", "minimum": 0, "maximum": max_score }
                    }
                }
            ]
        }),
    }
}
