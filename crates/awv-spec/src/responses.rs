use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Answers keyed by question id, persisted wholesale with the visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ResponseStore(BTreeMap<String, Value>);

impl ResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON object; any other shape yields an empty store.
    pub fn from_value(value: &Value) -> Self {
        value
            .as_object()
            .map(|map| {
                Self(
                    map.iter()
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect(),
                )
            })
            .unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Map<_, _>>(),
        )
    }

    pub fn get(&self, question_id: &str) -> Option<&Value> {
        self.0.get(question_id)
    }

    /// Stored answer, filtered down to values that count as answered.
    pub fn answer(&self, question_id: &str) -> Option<&Value> {
        self.get(question_id).filter(|value| is_answered(value))
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.answer(question_id).is_some()
    }

    /// Store an answer; `null` clears the entry.
    pub fn set(&mut self, question_id: impl Into<String>, value: Value) -> Option<Value> {
        let question_id = question_id.into();
        if value.is_null() {
            self.0.remove(&question_id)
        } else {
            self.0.insert(question_id, value)
        }
    }

    pub fn remove(&mut self, question_id: &str) -> Option<Value> {
        self.0.remove(question_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for ResponseStore {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut store = ResponseStore::new();
        for (key, value) in iter {
            store.set(key, value);
        }
        store
    }
}

/// `null`, blank strings and empty arrays do not count as answers.
pub fn is_answered(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Validation error entry surfaced next to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    pub question_id: String,
    pub message: String,
    pub code: String,
}

impl ValidationError {
    pub fn new(question_id: &str, message: impl Into<String>, code: &str) -> Self {
        Self {
            question_id: question_id.to_string(),
            message: message.into(),
            code: code.to_string(),
        }
    }
}

/// Result of validating a section or a whole visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<ValidationError>,
    #[serde(default)]
    pub missing_required: Vec<String>,
    #[serde(default)]
    pub unknown_fields: Vec<String>,
}

impl ValidationResult {
    /// Inline message for a question, missing answers first.
    pub fn message_for(&self, question_id: &str) -> Option<String> {
        if self.missing_required.iter().any(|id| id == question_id) {
            return Some("This question requires an answer.".into());
        }
        self.errors
            .iter()
            .find(|error| error.question_id == question_id)
            .map(|error| error.message.clone())
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.missing_required.extend(other.missing_required);
        for field in other.unknown_fields {
            if !self.unknown_fields.contains(&field) {
                self.unknown_fields.push(field);
            }
        }
        self.valid = self.errors.is_empty() && self.missing_required.is_empty();
    }
}
