use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::question::Question;

/// Errors raised while loading a template document.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to parse template: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("template '{0}' has no sections")]
    Empty(String),
    #[error("template '{0}' is inactive")]
    Inactive(String),
}

/// Audit metadata carried alongside an authored template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TemplateMetadata {
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Default for TemplateMetadata {
    fn default() -> Self {
        Self {
            active: true,
            created_by: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// An ordered group of questions rendered together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Authored assessment template used to conduct a visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub metadata: TemplateMetadata,
}

impl Template {
    /// Parse a template and reject documents that cannot be conducted.
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        let template: Template = serde_json::from_str(json)?;
        template.ensure_conductable()?;
        Ok(template)
    }

    pub fn ensure_conductable(&self) -> Result<(), TemplateError> {
        if !self.metadata.active {
            return Err(TemplateError::Inactive(self.id.clone()));
        }
        if self.sections.is_empty() {
            return Err(TemplateError::Empty(self.id.clone()));
        }
        Ok(())
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn question_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.questions.len())
            .sum()
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections
            .iter()
            .flat_map(|section| section.questions.iter())
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions().find(|question| question.id == question_id)
    }

    /// Index of the section holding `question_id`.
    pub fn section_of(&self, question_id: &str) -> Option<usize> {
        self.sections.iter().position(|section| {
            section
                .questions
                .iter()
                .any(|question| question.id == question_id)
        })
    }

    pub fn section_index(&self, section_id: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|section| section.id == section_id)
    }
}
