use thiserror::Error;

use crate::navigation::{SessionError, VisitSession};
use crate::spec::{Template, TemplateError};
use crate::visit::Visit;

/// Failure to fetch or persist a template or visit.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{kind} '{id}' was not found")]
    NotFound { kind: &'static str, id: String },
    #[error("failed to read {kind} '{id}': {source}")]
    Io {
        kind: &'static str,
        id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {kind} '{id}': {source}")]
    Decode {
        kind: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl LoadError {
    /// Whether asking the user to retry could help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoadError::Io { .. })
    }
}

/// Backing store for templates and visits.
pub trait VisitRepository {
    fn load_template(&self, template_id: &str) -> Result<Template, LoadError>;
    fn load_visit(&self, visit_id: &str) -> Result<Visit, LoadError>;
    fn save_visit(&self, visit: &Visit) -> Result<(), LoadError>;
}

/// Fetch a visit and its template and open a conduct session.
pub fn open_session<R: VisitRepository + ?Sized>(
    repository: &R,
    visit_id: &str,
) -> Result<VisitSession, LoadError> {
    let visit = repository.load_visit(visit_id)?;
    let template = repository.load_template(&visit.template_id)?;
    template.ensure_conductable()?;
    tracing::debug!(visit = %visit.id, template = %template.id, "opened visit session");
    Ok(VisitSession::new(template, visit)?)
}
