use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use crate::recommend::{Recommendation, carry_selection, extract_recommendations};
use crate::responses::{ResponseStore, ValidationResult};
use crate::spec::{Section, Template};
use crate::validate::{validate_section, validate_visit};
use crate::visibility::section_hidden_at;
use crate::visit::{Visit, VisitStatus};

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("visit '{visit}' uses template '{expected}', not '{actual}'")]
    TemplateMismatch {
        visit: String,
        expected: String,
        actual: String,
    },
    #[error("question '{0}' is not part of the template")]
    UnknownQuestion(String),
    #[error("visit '{0}' is already completed")]
    VisitCompleted(String),
    #[error("recommendation {0} does not exist")]
    UnknownRecommendation(usize),
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Moved {
        from: usize,
        to: usize,
        /// Section ids bypassed on the way.
        skipped: Vec<String>,
    },
    /// Already on the first or last section.
    AtBoundary,
    /// Forward move refused; current section has validation problems.
    Blocked(ValidationResult),
}

/// A visit being conducted against a read-only template.
///
/// The session owns the response store; all mutations go through it and every
/// visibility decision is recomputed from the current answers.
#[derive(Debug, Clone)]
pub struct VisitSession {
    template: Template,
    visit: Visit,
    errors: ValidationResult,
}

impl VisitSession {
    pub fn new(template: Template, mut visit: Visit) -> Result<Self, SessionError> {
        if visit.template_id != template.id {
            return Err(SessionError::TemplateMismatch {
                visit: visit.id.clone(),
                expected: visit.template_id.clone(),
                actual: template.id.clone(),
            });
        }
        let last = template.sections.len().saturating_sub(1);
        visit.current_section = visit.current_section.min(last);
        Ok(Self {
            template,
            visit,
            errors: ValidationResult {
                valid: true,
                ..Default::default()
            },
        })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn visit(&self) -> &Visit {
        &self.visit
    }

    pub fn into_visit(self) -> Visit {
        self.visit
    }

    pub fn responses(&self) -> &ResponseStore {
        &self.visit.responses
    }

    pub fn current_index(&self) -> usize {
        self.visit.current_section
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.template.sections.get(self.visit.current_section)
    }

    pub fn is_last_section(&self) -> bool {
        self.visit.current_section + 1 >= self.template.sections.len()
    }

    /// Errors from the most recent blocked navigation or completion attempt.
    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    /// Record an answer; `null` clears it.
    pub fn answer(&mut self, question_id: &str, value: Value) -> Result<(), SessionError> {
        if self.visit.is_completed() {
            return Err(SessionError::VisitCompleted(self.visit.id.clone()));
        }
        if self.template.question(question_id).is_none() {
            return Err(SessionError::UnknownQuestion(question_id.to_string()));
        }
        self.visit.responses.set(question_id, value);
        self.clear_error(question_id);
        if self.visit.status == VisitStatus::Scheduled {
            self.visit.status = VisitStatus::InProgress;
            self.visit.started_at = Some(Utc::now());
        }
        Ok(())
    }

    pub fn clear_answer(&mut self, question_id: &str) -> Result<(), SessionError> {
        self.answer(question_id, Value::Null)
    }

    fn clear_error(&mut self, question_id: &str) {
        self.errors
            .missing_required
            .retain(|id| id.as_str() != question_id);
        self.errors
            .errors
            .retain(|error| error.question_id != question_id);
        self.errors.valid =
            self.errors.errors.is_empty() && self.errors.missing_required.is_empty();
    }

    pub fn validate_current(&self) -> ValidationResult {
        validate_section(
            &self.template,
            self.visit.current_section,
            &self.visit.responses,
        )
    }

    /// Move forward past hidden sections after validating the current one.
    pub fn advance(&mut self) -> Navigation {
        let from = self.visit.current_section;
        if self.is_last_section() {
            return Navigation::AtBoundary;
        }

        let validation = self.validate_current();
        if !validation.valid {
            tracing::debug!(
                section = from,
                missing = ?validation.missing_required,
                "advance blocked by validation"
            );
            self.errors = validation.clone();
            return Navigation::Blocked(validation);
        }
        self.errors = validation;

        let last = self.template.sections.len() - 1;
        let mut to = from + 1;
        let mut skipped = Vec::new();
        while to < last && section_hidden_at(&self.template, to, &self.visit.responses) {
            skipped.push(self.template.sections[to].id.clone());
            to += 1;
        }
        self.move_to(from, to, skipped)
    }

    /// Move backward past hidden sections; never validates.
    pub fn retreat(&mut self) -> Navigation {
        let from = self.visit.current_section;
        if from == 0 {
            return Navigation::AtBoundary;
        }

        let mut to = from - 1;
        let mut skipped = Vec::new();
        while to > 0 && section_hidden_at(&self.template, to, &self.visit.responses) {
            skipped.push(self.template.sections[to].id.clone());
            to -= 1;
        }
        self.move_to(from, to, skipped)
    }

    fn move_to(&mut self, from: usize, to: usize, skipped: Vec<String>) -> Navigation {
        if !skipped.is_empty() {
            tracing::debug!(from, to, ?skipped, "skipped hidden sections");
        }
        self.visit.current_section = to;
        Navigation::Moved { from, to, skipped }
    }

    /// Snapshot for a progress save.
    pub fn save_progress(&mut self) -> &Visit {
        let now = Utc::now();
        if self.visit.status == VisitStatus::Scheduled {
            self.visit.status = VisitStatus::InProgress;
            self.visit.started_at = Some(now);
        }
        self.visit.updated_at = Some(now);
        tracing::info!(
            visit = %self.visit.id,
            section = self.visit.current_section,
            answered = self.visit.responses.len(),
            "visit progress saved"
        );
        &self.visit
    }

    /// Validate every reachable section and finalize the visit.
    pub fn complete(&mut self) -> Result<&Visit, ValidationResult> {
        if self.visit.is_completed() {
            return Ok(&self.visit);
        }
        let validation = validate_visit(&self.template, &self.visit.responses);
        if !validation.valid {
            self.errors = validation.clone();
            return Err(validation);
        }
        self.errors = validation;

        let fresh = extract_recommendations(&self.template, &self.visit.responses);
        self.visit.recommendations = carry_selection(&self.visit.recommendations, fresh);
        let now = Utc::now();
        self.visit.status = VisitStatus::Completed;
        if self.visit.started_at.is_none() {
            self.visit.started_at = Some(now);
        }
        self.visit.updated_at = Some(now);
        self.visit.completed_at = Some(now);
        tracing::info!(
            visit = %self.visit.id,
            recommendations = self.visit.recommendations.len(),
            "visit completed"
        );
        Ok(&self.visit)
    }

    /// Recommendations for the current answers, keeping prior deselections.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        if self.visit.is_completed() {
            return self.visit.recommendations.clone();
        }
        let fresh = extract_recommendations(&self.template, &self.visit.responses);
        carry_selection(&self.visit.recommendations, fresh)
    }

    /// Flip the selected flag of a stored recommendation.
    pub fn toggle_recommendation(&mut self, index: usize) -> Result<bool, SessionError> {
        if self.visit.recommendations.is_empty() {
            self.visit.recommendations = self.recommendations();
        }
        let recommendation = self
            .visit
            .recommendations
            .get_mut(index)
            .ok_or(SessionError::UnknownRecommendation(index))?;
        recommendation.selected = !recommendation.selected;
        Ok(recommendation.selected)
    }
}
