pub mod question;
pub mod template;

pub use question::{AnswerOption, Constraint, Question, QuestionKind, ScoreBand};
pub use template::{Section, Template, TemplateError, TemplateMetadata};
