//! Markdown visit summary rendered through handlebars.

use handlebars::Handlebars;
use serde_json::{Value, json};
use thiserror::Error;

use crate::recommend::{Recommendation, selected};
use crate::render::display_answer;
use crate::spec::Template;
use crate::visibility::{question_visible, section_hidden};
use crate::visit::Visit;

pub const DEFAULT_LAYOUT: &str = r#"# {{template_name}}

- Visit: {{visit_id}}
{{#if patient_id}}- Patient: {{patient_id}}
{{/if}}- Status: {{status}}
{{#if completed_at}}- Completed: {{completed_at}}
{{/if}}
{{#each sections}}
## {{title}}

{{#each answers}}
- **{{question}}**: {{answer}}
{{else}}
No answers recorded.
{{/each}}
{{/each}}

## Personalized prevention plan

{{#each recommendations}}
- {{text}} ({{category}})
{{else}}
No recommendations selected.
{{/each}}
"#;

const LAYOUT_NAME: &str = "visit_report";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid report layout: {0}")]
    Layout(#[from] Box<handlebars::TemplateError>),
    #[error("failed to render report: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Renders visit summaries; the layout may be replaced by the caller.
pub struct ReportRenderer {
    registry: Handlebars<'static>,
}

impl ReportRenderer {
    pub fn new() -> Result<Self, ReportError> {
        Self::with_layout(DEFAULT_LAYOUT)
    }

    pub fn with_layout(layout: &str) -> Result<Self, ReportError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(LAYOUT_NAME, layout)
            .map_err(Box::new)?;
        Ok(Self { registry })
    }

    pub fn render(&self, template: &Template, visit: &Visit) -> Result<String, ReportError> {
        let context = report_context(template, visit);
        Ok(self.registry.render(LAYOUT_NAME, &context)?)
    }
}

/// Data handed to the layout: answered visible questions grouped by section,
/// plus the selected recommendations.
pub fn report_context(template: &Template, visit: &Visit) -> Value {
    let responses = &visit.responses;
    let sections = template
        .sections
        .iter()
        .filter(|section| !section_hidden(section, responses))
        .map(|section| {
            let answers = section
                .questions
                .iter()
                .filter(|question| question_visible(question, responses))
                .filter_map(|question| {
                    responses.answer(&question.id).map(|value| {
                        json!({
                            "question_id": question.id,
                            "question": question.text,
                            "answer": display_answer(&question.kind, value),
                        })
                    })
                })
                .collect::<Vec<_>>();
            json!({
                "id": section.id,
                "title": section.title,
                "answers": answers,
            })
        })
        .collect::<Vec<_>>();

    let recommendations = selected(&visit.recommendations)
        .map(recommendation_entry)
        .collect::<Vec<_>>();

    json!({
        "template_id": template.id,
        "template_name": template.name,
        "visit_id": visit.id,
        "patient_id": visit.patient_id,
        "status": visit.status.as_str(),
        "completed_at": visit.completed_at.map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string()),
        "sections": sections,
        "recommendations": recommendations,
    })
}

fn recommendation_entry(recommendation: &Recommendation) -> Value {
    json!({
        "text": recommendation.text,
        "category": recommendation.category,
        "source": recommendation.source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::ResponseStore;

    fn template() -> Template {
        serde_json::from_value(json!({
            "id": "t",
            "name": "Annual Wellness Visit",
            "sections": [{
                "id": "s1",
                "title": "Lifestyle",
                "questions": [
                    { "id": "smoke", "text": "Do you smoke?", "type": "yes_no" },
                    { "id": "exercise", "text": "Exercise", "type": "single_choice",
                      "options": [{ "id": "daily", "label": "Daily" }] }
                ]
            }]
        }))
        .expect("template")
    }

    #[test]
    fn default_layout_lists_answers_and_plan() {
        let mut visit = Visit::new("v1", "t");
        visit.responses =
            ResponseStore::from_value(&json!({ "smoke": false, "exercise": "daily" }));
        visit.recommendations.push(Recommendation {
            text: "Keep up daily exercise".into(),
            category: "Lifestyle".into(),
            source: "Exercise: Daily".into(),
            selected: true,
        });
        visit.recommendations.push(Recommendation {
            text: "Dropped item".into(),
            category: "Lifestyle".into(),
            source: "manual".into(),
            selected: false,
        });

        let report = ReportRenderer::new()
            .expect("renderer")
            .render(&template(), &visit)
            .expect("render");
        assert!(report.starts_with("# Annual Wellness Visit"));
        assert!(report.contains("- **Do you smoke?**: No"));
        assert!(report.contains("- **Exercise**: Daily"));
        assert!(report.contains("- Keep up daily exercise (Lifestyle)"));
        assert!(!report.contains("Dropped item"));
    }

    #[test]
    fn custom_layout_errors_are_reported() {
        assert!(matches!(
            ReportRenderer::with_layout("{{#each sections}}"),
            Err(ReportError::Layout(_))
        ));
    }
}
