use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::composite::{ScoreAnswer, VitalSigns};
use crate::responses::ResponseStore;
use crate::spec::{Question, QuestionKind, Section, Template};
use crate::visibility::{question_visible, section_hidden};

pub const ELEVATED_SYSTOLIC: f64 = 140.0;
pub const ELEVATED_DIASTOLIC: f64 = 90.0;
pub const OBESE_BMI: f64 = 30.0;
pub const UNDERWEIGHT_BMI: f64 = 18.5;

/// A suggested care action for the visit plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recommendation {
    pub text: String,
    pub category: String,
    pub source: String,
    #[serde(default = "default_selected")]
    pub selected: bool,
}

fn default_selected() -> bool {
    true
}

impl Recommendation {
    fn new(text: &str, section: &Section, source: String) -> Self {
        Self {
            text: text.trim().to_string(),
            category: section.title.clone(),
            source,
            selected: true,
        }
    }
}

/// Walk visible answers and collect recommendations in template order.
pub fn extract_recommendations(
    template: &Template,
    responses: &ResponseStore,
) -> Vec<Recommendation> {
    let mut collected = Vec::new();
    for section in &template.sections {
        if section_hidden(section, responses) {
            continue;
        }
        for question in &section.questions {
            if !question_visible(question, responses) {
                continue;
            }
            if let Some(answer) = responses.answer(&question.id) {
                collect_for_question(section, question, answer, &mut collected);
            }
        }
    }
    dedupe(collected)
}

/// Re-apply earlier deselections to a freshly extracted list, matched by text.
pub fn carry_selection(
    previous: &[Recommendation],
    fresh: Vec<Recommendation>,
) -> Vec<Recommendation> {
    let deselected: BTreeSet<String> = previous
        .iter()
        .filter(|recommendation| !recommendation.selected)
        .map(|recommendation| recommendation.text.to_lowercase())
        .collect();
    fresh
        .into_iter()
        .map(|mut recommendation| {
            if deselected.contains(&recommendation.text.to_lowercase()) {
                recommendation.selected = false;
            }
            recommendation
        })
        .collect()
}

pub fn selected(recommendations: &[Recommendation]) -> impl Iterator<Item = &Recommendation> {
    recommendations
        .iter()
        .filter(|recommendation| recommendation.selected)
}

fn collect_for_question(
    section: &Section,
    question: &Question,
    answer: &Value,
    out: &mut Vec<Recommendation>,
) {
    match &question.kind {
        QuestionKind::SingleChoice { .. } | QuestionKind::MultiChoice { .. } => {
            let chosen: Vec<&str> = match answer {
                Value::String(option_id) => vec![option_id.as_str()],
                Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                _ => Vec::new(),
            };
            for option_id in chosen {
                if let Some(option) = question.option(option_id) {
                    for text in &option.recommendations {
                        out.push(Recommendation::new(
                            text,
                            section,
                            format!("{}: {}", question.text, option.label),
                        ));
                    }
                }
            }
        }
        QuestionKind::ClinicalScore {
            instrument, bands, ..
        } => {
            if let Some(score) = ScoreAnswer::from_value(answer) {
                let total = score.total();
                if let Some(band) = bands.iter().find(|band| band.contains(total)) {
                    for text in &band.recommendations {
                        out.push(Recommendation::new(
                            text,
                            section,
                            format!("{} score {} ({})", instrument, total, band.label),
                        ));
                    }
                }
            }
        }
        QuestionKind::VitalSigns => {
            if let Some(vitals) = VitalSigns::from_value(answer) {
                vital_sign_findings(section, question, &vitals, out);
            }
        }
        _ => {}
    }

    if !question.recommendations.is_empty() && is_affirmative(answer) {
        for text in &question.recommendations {
            out.push(Recommendation::new(
                text,
                section,
                format!("{}: yes", question.text),
            ));
        }
    }
}

fn vital_sign_findings(
    section: &Section,
    question: &Question,
    vitals: &VitalSigns,
    out: &mut Vec<Recommendation>,
) {
    if let Some((systolic, diastolic)) = vitals.blood_pressure()
        && (systolic >= ELEVATED_SYSTOLIC || diastolic >= ELEVATED_DIASTOLIC)
    {
        out.push(Recommendation::new(
            "Follow up on elevated blood pressure and recheck within 4 weeks",
            section,
            format!("{}: BP {}/{}", question.text, systolic, diastolic),
        ));
    }
    if let Some(bmi) = vitals.bmi() {
        let text = if bmi >= OBESE_BMI {
            Some("Discuss weight management and refer to nutrition counseling")
        } else if bmi < UNDERWEIGHT_BMI {
            Some("Review nutritional status and unintended weight loss")
        } else {
            None
        };
        if let Some(text) = text {
            out.push(Recommendation::new(
                text,
                section,
                format!("{}: BMI {}", question.text, bmi),
            ));
        }
    }
}

/// Affirmative answers: `true`, or yes-like strings.
pub fn is_affirmative(answer: &Value) -> bool {
    match answer {
        Value::Bool(flag) => *flag,
        Value::String(text) => matches!(
            text.trim().to_lowercase().as_str(),
            "yes" | "y" | "true"
        ),
        _ => false,
    }
}

fn dedupe(recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut seen = BTreeSet::new();
    recommendations
        .into_iter()
        .filter(|recommendation| {
            !recommendation.text.is_empty() && seen.insert(recommendation.text.to_lowercase())
        })
        .collect()
}
