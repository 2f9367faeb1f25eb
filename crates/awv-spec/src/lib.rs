#![allow(missing_docs)]

pub mod composite;
pub mod lint;
pub mod navigation;
pub mod recommend;
pub mod render;
pub mod report;
pub mod repository;
pub mod responses;
pub mod rule;
pub mod schema;
pub mod spec;
pub mod validate;
pub mod visibility;
pub mod visit;

pub use composite::{ScoreAnswer, VitalSigns};
pub use lint::{Severity, TemplateIssue, has_errors, lint_template};
pub use navigation::{Navigation, SessionError, VisitSession};
pub use recommend::{Recommendation, extract_recommendations};
pub use render::{
    RenderPayload, RenderProgress, RenderQuestion, RenderStatus, build_render_payload,
    render_json_ui, render_text,
};
pub use report::{ReportError, ReportRenderer};
pub use repository::{LoadError, VisitRepository, open_session};
pub use responses::{ResponseStore, ValidationError, ValidationResult};
pub use rule::{Operator, RuleAction, RuleOutcome, RuleTarget, SkipRule};
pub use schema::{responses_schema, template_schema};
pub use spec::{AnswerOption, Question, QuestionKind, Section, Template, TemplateError};
pub use validate::{validate_answer, validate_section, validate_visit};
pub use visibility::{VisibilityMap, question_visible, resolve_visibility, section_hidden};
pub use visit::{Visit, VisitStatus};
