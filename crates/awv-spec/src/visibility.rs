use std::collections::BTreeMap;

use crate::responses::ResponseStore;
use crate::rule::RuleAction;
use crate::spec::{Question, Section, Template};

pub type VisibilityMap = BTreeMap<String, bool>;

/// Visibility of a question from its own question-level rules.
///
/// The first rule that triggers decides; with no triggered rule the question
/// is shown.
pub fn question_visible(question: &Question, responses: &ResponseStore) -> bool {
    question
        .skip_logic
        .iter()
        .filter(|rule| !rule.targets_section())
        .find_map(|rule| rule.evaluate(responses).action())
        .map(|action| action == RuleAction::Show)
        .unwrap_or(true)
}

/// Whether the section is bypassed by a section-level rule declared on one
/// of its own questions.
pub fn section_hidden(section: &Section, responses: &ResponseStore) -> bool {
    let decision = section
        .questions
        .iter()
        .flat_map(|question| question.skip_logic.iter())
        .filter(|rule| rule.targets(&section.id))
        .find_map(|rule| rule.evaluate(responses).action());

    match decision {
        Some(RuleAction::Hide) => {
            tracing::debug!(section = %section.id, "section hidden by skip logic");
            true
        }
        _ => false,
    }
}

/// Section lookup by index; out-of-range indices count as hidden.
pub fn section_hidden_at(template: &Template, index: usize, responses: &ResponseStore) -> bool {
    template
        .sections
        .get(index)
        .map(|section| section_hidden(section, responses))
        .unwrap_or(true)
}

/// Question visibility for every question in the template. Questions in a
/// skipped section are reported hidden.
pub fn resolve_visibility(template: &Template, responses: &ResponseStore) -> VisibilityMap {
    let mut map = VisibilityMap::new();
    for section in &template.sections {
        let skipped = section_hidden(section, responses);
        for question in &section.questions {
            map.insert(
                question.id.clone(),
                !skipped && question_visible(question, responses),
            );
        }
    }
    map
}

/// Questions of a section that should be rendered.
pub fn visible_questions<'a>(
    section: &'a Section,
    responses: &'a ResponseStore,
) -> impl Iterator<Item = &'a Question> + 'a {
    section
        .questions
        .iter()
        .filter(move |question| question_visible(question, responses))
}
