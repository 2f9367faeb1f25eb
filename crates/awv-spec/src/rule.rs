use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::responses::ResponseStore;

/// Comparison applied between the source answer and the rule literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    /// Any operator name this engine does not understand.
    #[serde(other)]
    Unknown,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::Unknown => "unknown",
        }
    }

    /// Whether `answer <op> literal` holds. Malformed input is never an error.
    pub fn holds(&self, answer: &Value, literal: &Value) -> bool {
        match self {
            Operator::Equals => values_equal(answer, literal),
            Operator::NotEquals => !values_equal(answer, literal),
            Operator::Contains => array_contains(answer, literal),
            Operator::NotContains => !array_contains(answer, literal),
            Operator::GreaterThan => match (as_number(answer), as_number(literal)) {
                (Some(left), Some(right)) => left > right,
                _ => false,
            },
            Operator::LessThan => match (as_number(answer), as_number(literal)) {
                (Some(left), Some(right)) => left < right,
                _ => false,
            },
            Operator::Unknown => {
                tracing::warn!("skip rule uses an unknown operator; treating as not met");
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    #[default]
    Show,
    Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum RuleTarget {
    #[default]
    Question,
    Section,
}

/// Skip-logic rule attached to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkipRule {
    pub source_question_id: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub action: RuleAction,
    #[serde(default)]
    pub target_type: RuleTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_section_id: Option<String>,
}

/// What a rule evaluation concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The source question has no answer yet.
    NotApplicable,
    ConditionFalse,
    Triggered(RuleAction),
}

impl RuleOutcome {
    pub fn action(&self) -> Option<RuleAction> {
        match self {
            RuleOutcome::Triggered(action) => Some(*action),
            _ => None,
        }
    }
}

impl SkipRule {
    pub fn evaluate(&self, responses: &ResponseStore) -> RuleOutcome {
        let Some(answer) = responses.answer(&self.source_question_id) else {
            return RuleOutcome::NotApplicable;
        };
        if self.operator.holds(answer, &self.value) {
            RuleOutcome::Triggered(self.action)
        } else {
            RuleOutcome::ConditionFalse
        }
    }

    pub fn targets_section(&self) -> bool {
        matches!(self.target_type, RuleTarget::Section)
    }

    /// True for section rules aimed at `section_id`.
    pub fn targets(&self, section_id: &str) -> bool {
        self.targets_section() && self.target_section_id.as_deref() == Some(section_id)
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        (Value::Bool(flag), Value::String(text)) | (Value::String(text), Value::Bool(flag)) => {
            yes_no_flag(text) == Some(*flag)
        }
        _ => left == right,
    }
}

/// yes_no answers are stored either as booleans or as "yes"/"no".
fn yes_no_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}

fn array_contains(answer: &Value, literal: &Value) -> bool {
    answer
        .as_array()
        .map(|items| items.iter().any(|item| values_equal(item, literal)))
        .unwrap_or(false)
}

/// Numeric coercion: numbers and numeric strings; anything else fails.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(operator: Operator, value: Value) -> SkipRule {
        SkipRule {
            source_question_id: "q1".into(),
            operator,
            value,
            action: RuleAction::Hide,
            target_type: RuleTarget::Question,
            target_section_id: None,
        }
    }

    fn store(answer: Value) -> ResponseStore {
        ResponseStore::from_value(&json!({ "q1": answer }))
    }

    #[test]
    fn unanswered_source_is_not_applicable() {
        let rule = rule(Operator::Equals, json!("no"));
        assert_eq!(rule.evaluate(&ResponseStore::new()), RuleOutcome::NotApplicable);
        assert_eq!(rule.evaluate(&store(json!(""))), RuleOutcome::NotApplicable);
        assert_eq!(rule.evaluate(&store(json!([]))), RuleOutcome::NotApplicable);
    }

    #[test]
    fn equals_matches_raw_value() {
        let rule = rule(Operator::Equals, json!("no"));
        assert_eq!(
            rule.evaluate(&store(json!("no"))),
            RuleOutcome::Triggered(RuleAction::Hide)
        );
        assert_eq!(rule.evaluate(&store(json!("No"))), RuleOutcome::ConditionFalse);
    }

    #[test]
    fn equals_compares_numbers_numerically() {
        let rule = rule(Operator::Equals, json!(2));
        assert_eq!(
            rule.evaluate(&store(json!(2.0))),
            RuleOutcome::Triggered(RuleAction::Hide)
        );
    }

    #[test]
    fn yes_no_booleans_match_word_literals() {
        let hide_on_no = rule(Operator::Equals, json!("no"));
        assert_eq!(
            hide_on_no.evaluate(&store(json!(false))),
            RuleOutcome::Triggered(RuleAction::Hide)
        );
        assert_eq!(hide_on_no.evaluate(&store(json!(true))), RuleOutcome::ConditionFalse);

        let hide_on_false = rule(Operator::Equals, json!(false));
        assert_eq!(
            hide_on_false.evaluate(&store(json!("no"))),
            RuleOutcome::Triggered(RuleAction::Hide)
        );
        assert_eq!(hide_on_false.evaluate(&store(json!("yes"))), RuleOutcome::ConditionFalse);

        let unless_yes = rule(Operator::NotEquals, json!("yes"));
        assert_eq!(unless_yes.evaluate(&store(json!(true))), RuleOutcome::ConditionFalse);
        assert_eq!(
            unless_yes.evaluate(&store(json!(false))),
            RuleOutcome::Triggered(RuleAction::Hide)
        );
        assert_eq!(
            rule(Operator::Equals, json!("maybe")).evaluate(&store(json!(false))),
            RuleOutcome::ConditionFalse
        );
    }

    #[test]
    fn not_equals_inverts() {
        let rule = rule(Operator::NotEquals, json!("no"));
        assert_eq!(
            rule.evaluate(&store(json!("yes"))),
            RuleOutcome::Triggered(RuleAction::Hide)
        );
    }

    #[test]
    fn contains_requires_array_answer() {
        let contains = rule(Operator::Contains, json!("anxiety"));
        assert_eq!(
            contains.evaluate(&store(json!(["sleep", "anxiety"]))),
            RuleOutcome::Triggered(RuleAction::Hide)
        );
        assert_eq!(
            contains.evaluate(&store(json!("anxiety"))),
            RuleOutcome::ConditionFalse
        );

        let not_contains = rule(Operator::NotContains, json!("anxiety"));
        assert_eq!(
            not_contains.evaluate(&store(json!("anxiety"))),
            RuleOutcome::Triggered(RuleAction::Hide)
        );
    }

    #[test]
    fn numeric_comparisons_coerce_strings() {
        let greater = rule(Operator::GreaterThan, json!("3"));
        assert_eq!(
            greater.evaluate(&store(json!(4))),
            RuleOutcome::Triggered(RuleAction::Hide)
        );
        let less = rule(Operator::LessThan, json!(3));
        assert_eq!(
            less.evaluate(&store(json!(" 2.5 "))),
            RuleOutcome::Triggered(RuleAction::Hide)
        );
    }

    #[test]
    fn numeric_coercion_failure_is_condition_false() {
        let greater = rule(Operator::GreaterThan, json!(3));
        assert_eq!(greater.evaluate(&store(json!("many"))), RuleOutcome::ConditionFalse);
        assert_eq!(greater.evaluate(&store(json!({ "a": 1 }))), RuleOutcome::ConditionFalse);
        let bad_literal = rule(Operator::LessThan, json!(null));
        assert_eq!(bad_literal.evaluate(&store(json!(1))), RuleOutcome::ConditionFalse);
    }

    #[test]
    fn unknown_operator_parses_and_never_fires() {
        let parsed: SkipRule = serde_json::from_value(json!({
            "source_question_id": "q1",
            "operator": "matches_regex",
            "value": ".*",
            "action": "hide"
        }))
        .expect("deserialize");
        assert_eq!(parsed.operator, Operator::Unknown);
        assert_eq!(parsed.evaluate(&store(json!("x"))), RuleOutcome::ConditionFalse);
    }
}
