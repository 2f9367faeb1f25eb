use std::collections::BTreeMap;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rule::{Operator, RuleTarget};
use crate::spec::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Integrity problem found in an authored template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TemplateIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
}

impl TemplateIssue {
    fn error(code: &str, question_id: Option<&str>, message: String) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message,
            question_id: question_id.map(String::from),
        }
    }

    fn warning(code: &str, question_id: Option<&str>, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message,
            question_id: question_id.map(String::from),
        }
    }
}

/// Static checks over sections, questions and their skip rules.
pub fn lint_template(template: &Template) -> Vec<TemplateIssue> {
    let mut issues = Vec::new();

    let mut section_ids: BTreeMap<&str, usize> = BTreeMap::new();
    for section in &template.sections {
        *section_ids.entry(section.id.as_str()).or_default() += 1;
    }
    for (id, count) in &section_ids {
        if *count > 1 {
            issues.push(TemplateIssue::error(
                "duplicate_section",
                None,
                format!("section id '{}' is used {} times", id, count),
            ));
        }
    }

    // question id -> (section index, position in template order)
    let mut positions: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    let mut order = 0;
    for (section_index, section) in template.sections.iter().enumerate() {
        for question in &section.questions {
            if positions
                .insert(question.id.as_str(), (section_index, order))
                .is_some()
            {
                issues.push(TemplateIssue::error(
                    "duplicate_question",
                    Some(&question.id),
                    format!("question id '{}' is used more than once", question.id),
                ));
            }
            order += 1;
        }
    }

    let mut order = 0;
    for section in &template.sections {
        for question in &section.questions {
            let position = order;
            order += 1;

            if question.kind.is_choice() && question.kind.options().is_empty() {
                issues.push(TemplateIssue::error(
                    "missing_options",
                    Some(&question.id),
                    format!("choice question '{}' has no options", question.id),
                ));
            }

            if let Some(pattern) = question
                .constraint
                .as_ref()
                .and_then(|constraint| constraint.pattern.as_deref())
                && let Err(err) = Regex::new(pattern)
            {
                issues.push(TemplateIssue::error(
                    "invalid_pattern",
                    Some(&question.id),
                    format!(
                        "pattern on '{}' is not a valid regular expression: {}",
                        question.id, err
                    ),
                ));
            }

            for rule in &question.skip_logic {
                if rule.operator == Operator::Unknown {
                    issues.push(TemplateIssue::warning(
                        "unknown_operator",
                        Some(&question.id),
                        format!(
                            "rule on '{}' uses an unknown operator and will never fire",
                            question.id
                        ),
                    ));
                }

                match positions.get(rule.source_question_id.as_str()) {
                    None => issues.push(TemplateIssue::error(
                        "unknown_source",
                        Some(&question.id),
                        format!(
                            "rule on '{}' reads unknown question '{}'",
                            question.id, rule.source_question_id
                        ),
                    )),
                    Some((_, source_position)) if *source_position >= position => {
                        issues.push(TemplateIssue::warning(
                            "source_after_target",
                            Some(&question.id),
                            format!(
                                "rule on '{}' reads '{}', which is asked later",
                                question.id, rule.source_question_id
                            ),
                        ))
                    }
                    Some(_) => {}
                }

                if let Some(source) = template.question(&rule.source_question_id)
                    && source.kind.is_choice()
                    && let Some(option_id) = rule.value.as_str()
                    && source.option(option_id).is_none()
                {
                    issues.push(TemplateIssue::warning(
                        "unknown_option",
                        Some(&question.id),
                        format!(
                            "rule on '{}' compares '{}' with '{}', which is not one of its options",
                            question.id, rule.source_question_id, option_id
                        ),
                    ));
                }

                if rule.target_type == RuleTarget::Section {
                    match rule.target_section_id.as_deref() {
                        None => issues.push(TemplateIssue::error(
                            "missing_target_section",
                            Some(&question.id),
                            format!("section rule on '{}' has no target_section_id", question.id),
                        )),
                        Some(target) if !section_ids.contains_key(target) => {
                            issues.push(TemplateIssue::error(
                                "unknown_target_section",
                                Some(&question.id),
                                format!(
                                    "section rule on '{}' targets unknown section '{}'",
                                    question.id, target
                                ),
                            ))
                        }
                        Some(target) if target != section.id => {
                            issues.push(TemplateIssue::warning(
                                "foreign_target_section",
                                Some(&question.id),
                                format!(
                                    "section rule on '{}' targets '{}' but only rules inside that section are applied",
                                    question.id, target
                                ),
                            ))
                        }
                        Some(_) => {}
                    }
                }
            }
        }
    }

    issues
}

pub fn has_errors(issues: &[TemplateIssue]) -> bool {
    issues
        .iter()
        .any(|issue| issue.severity == Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_dangling_sources_and_targets() {
        let template: Template = serde_json::from_value(json!({
            "id": "lint",
            "name": "Lint",
            "sections": [{
                "id": "s1",
                "title": "S1",
                "questions": [
                    { "id": "q1", "text": "Q1", "type": "single_choice", "options": [] },
                    { "id": "q2", "text": "Q2", "type": "text", "skip_logic": [
                        { "source_question_id": "missing", "operator": "equals", "value": "x" },
                        { "source_question_id": "q1", "operator": "equals", "value": "x",
                          "action": "hide", "target_type": "section" }
                    ]}
                ]
            }]
        }))
        .expect("template");

        let codes: Vec<_> = lint_template(&template)
            .into_iter()
            .map(|issue| issue.code)
            .collect();
        assert!(codes.contains(&"missing_options".to_string()));
        assert!(codes.contains(&"unknown_source".to_string()));
        assert!(codes.contains(&"unknown_option".to_string()));
        assert!(codes.contains(&"missing_target_section".to_string()));
    }

    #[test]
    fn reports_unparsable_constraint_pattern() {
        let template: Template = serde_json::from_value(json!({
            "id": "lint",
            "name": "Lint",
            "sections": [{
                "id": "s1",
                "title": "S1",
                "questions": [
                    { "id": "mrn", "text": "MRN", "type": "text",
                      "constraint": { "pattern": "([" } },
                    { "id": "zip", "text": "ZIP", "type": "text",
                      "constraint": { "pattern": "^[0-9]{5}$" } }
                ]
            }]
        }))
        .expect("template");

        let issues = lint_template(&template);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "invalid_pattern");
        assert_eq!(issues[0].question_id.as_deref(), Some("mrn"));
        assert!(has_errors(&issues));
    }
}
