use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rule::SkipRule;

/// A selectable answer for choice questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnswerOption {
    pub id: String,
    pub label: String,
    /// Recommendation texts attached to this option when it is selected.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

/// Interpretation band for a clinical score instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreBand {
    pub min: f64,
    pub max: f64,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

impl ScoreBand {
    pub fn contains(&self, total: f64) -> bool {
        total >= self.min && total <= self.max
    }
}

/// Answer shape expected by a question, keyed by the `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Text,
    YesNo,
    SingleChoice {
        #[serde(default)]
        options: Vec<AnswerOption>,
    },
    MultiChoice {
        #[serde(default)]
        options: Vec<AnswerOption>,
    },
    Numeric {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    Date,
    VitalSigns,
    ClinicalScore {
        instrument: String,
        max_score: f64,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        bands: Vec<ScoreBand>,
    },
}

impl QuestionKind {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::YesNo => "yes_no",
            QuestionKind::SingleChoice { .. } => "single_choice",
            QuestionKind::MultiChoice { .. } => "multi_choice",
            QuestionKind::Numeric { .. } => "numeric",
            QuestionKind::Date => "date",
            QuestionKind::VitalSigns => "vital_signs",
            QuestionKind::ClinicalScore { .. } => "clinical_score",
        }
    }

    /// Options for choice questions; empty for every other kind.
    pub fn options(&self) -> &[AnswerOption] {
        match self {
            QuestionKind::SingleChoice { options } | QuestionKind::MultiChoice { options } => {
                options
            }
            _ => &[],
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            QuestionKind::SingleChoice { .. } | QuestionKind::MultiChoice { .. }
        )
    }
}

/// Value constraints enforced during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct Constraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// A single prompt inside a template section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_logic: Vec<SkipRule>,
    /// Recommendations fired when the answer is affirmative.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&AnswerOption> {
        self.kind
            .options()
            .iter()
            .find(|option| option.id == option_id)
    }
}
