use std::collections::BTreeSet;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::composite::{ScoreAnswer, VitalSigns};
use crate::responses::{ResponseStore, ValidationError, ValidationResult};
use crate::rule::as_number;
use crate::spec::{Constraint, Question, QuestionKind, Section, Template};
use crate::visibility::{question_visible, section_hidden};

/// Required-field and shape validation for one section.
///
/// Hidden questions are excluded, and a skipped section is always valid.
pub fn validate_section(
    template: &Template,
    index: usize,
    responses: &ResponseStore,
) -> ValidationResult {
    let mut result = ValidationResult {
        valid: true,
        ..Default::default()
    };
    if let Some(section) = template.sections.get(index)
        && !section_hidden(section, responses)
    {
        check_section(section, responses, &mut result);
    }
    result.valid = result.errors.is_empty() && result.missing_required.is_empty();
    result
}

/// Validate every section that is not skipped and report answers for
/// questions the template does not know about.
pub fn validate_visit(template: &Template, responses: &ResponseStore) -> ValidationResult {
    let mut result = ValidationResult::default();
    for section in &template.sections {
        if section_hidden(section, responses) {
            continue;
        }
        check_section(section, responses, &mut result);
    }

    let known: BTreeSet<&str> = template
        .questions()
        .map(|question| question.id.as_str())
        .collect();
    result.unknown_fields = responses
        .keys()
        .filter(|key| !known.contains(key.as_str()))
        .cloned()
        .collect();

    result.valid = result.errors.is_empty() && result.missing_required.is_empty();
    result
}

fn check_section(section: &Section, responses: &ResponseStore, result: &mut ValidationResult) {
    for question in &section.questions {
        if !question_visible(question, responses) {
            continue;
        }
        match responses.answer(&question.id) {
            None => {
                if question.required {
                    result.missing_required.push(question.id.clone());
                }
            }
            Some(value) => {
                if let Some(error) = validate_answer(question, value) {
                    result.errors.push(error);
                }
            }
        }
    }
}

/// Check a single answer against the question's type and constraints.
pub fn validate_answer(question: &Question, value: &Value) -> Option<ValidationError> {
    if let Some(error) = check_kind(question, value) {
        return Some(error);
    }
    question
        .constraint
        .as_ref()
        .and_then(|constraint| enforce_constraint(question, value, constraint))
}

fn check_kind(question: &Question, value: &Value) -> Option<ValidationError> {
    match &question.kind {
        QuestionKind::Text => (!value.is_string()).then(|| type_mismatch(question, "text")),
        QuestionKind::YesNo => {
            let ok = value.is_boolean()
                || value
                    .as_str()
                    .map(|text| matches!(text.to_lowercase().as_str(), "yes" | "no"))
                    .unwrap_or(false);
            (!ok).then(|| type_mismatch(question, "yes or no"))
        }
        QuestionKind::SingleChoice { .. } => match value.as_str() {
            None => Some(type_mismatch(question, "a single option")),
            Some(option_id) => check_option(question, option_id),
        },
        QuestionKind::MultiChoice { .. } => match value.as_array() {
            None => Some(type_mismatch(question, "a list of options")),
            Some(items) => items.iter().find_map(|item| match item.as_str() {
                None => Some(type_mismatch(question, "a list of options")),
                Some(option_id) => check_option(question, option_id),
            }),
        },
        QuestionKind::Numeric { .. } => {
            (!value.is_number()).then(|| type_mismatch(question, "a number"))
        }
        QuestionKind::Date => match value.as_str() {
            None => Some(type_mismatch(question, "a date")),
            Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                .err()
                .map(|_| {
                    ValidationError::new(
                        &question.id,
                        "date must use the YYYY-MM-DD format",
                        "invalid_date",
                    )
                }),
        },
        QuestionKind::VitalSigns => VitalSigns::from_value(value)
            .is_none()
            .then(|| type_mismatch(question, "vital sign measurements")),
        QuestionKind::ClinicalScore {
            instrument,
            max_score,
            ..
        } => match ScoreAnswer::from_value(value) {
            None => Some(type_mismatch(question, "a score")),
            Some(score) => {
                let total = score.total();
                (total < 0.0 || total > *max_score).then(|| {
                    ValidationError::new(
                        &question.id,
                        format!("{} score {} is outside 0-{}", instrument, total, max_score),
                        "score_out_of_range",
                    )
                })
            }
        },
    }
}

fn check_option(question: &Question, option_id: &str) -> Option<ValidationError> {
    question.option(option_id).is_none().then(|| {
        ValidationError::new(
            &question.id,
            format!("'{}' is not one of the available options", option_id),
            "invalid_option",
        )
    })
}

fn type_mismatch(question: &Question, expected: &str) -> ValidationError {
    ValidationError::new(
        &question.id,
        format!("expected {}", expected),
        "type_mismatch",
    )
}

fn enforce_constraint(
    question: &Question,
    value: &Value,
    constraint: &Constraint,
) -> Option<ValidationError> {
    if let Some(pattern) = &constraint.pattern
        && let Some(text) = value.as_str()
        && let Ok(regex) = Regex::new(pattern)
        && !regex.is_match(text)
    {
        return Some(ValidationError::new(
            &question.id,
            "value does not match pattern",
            "pattern_mismatch",
        ));
    }

    if let Some(min_len) = constraint.min_len
        && let Some(text) = value.as_str()
        && text.chars().count() < min_len
    {
        return Some(ValidationError::new(
            &question.id,
            "answer shorter than min length",
            "min_length",
        ));
    }

    if let Some(max_len) = constraint.max_len
        && let Some(text) = value.as_str()
        && text.chars().count() > max_len
    {
        return Some(ValidationError::new(
            &question.id,
            "answer longer than max length",
            "max_length",
        ));
    }

    if let Some(min) = constraint.min
        && let Some(number) = as_number(value)
        && number < min
    {
        return Some(ValidationError::new(&question.id, "value below minimum", "min"));
    }

    if let Some(max) = constraint.max
        && let Some(number) = as_number(value)
        && number > max
    {
        return Some(ValidationError::new(&question.id, "value above maximum", "max"));
    }

    None
}
