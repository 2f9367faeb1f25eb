use std::fmt::Write;

use awv_spec::render::display_answer;
use awv_spec::{QuestionKind, Recommendation, RenderPayload, RenderQuestion, RenderStatus, Visit};

/// Controls which bits of state the conduct shell prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: section headers and question prompts only.
    Clean,
    /// Verbose output: status, visible questions, help text.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints the visit conduct screens.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    show_visit_json: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity, show_visit_json: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            show_visit_json,
        }
    }

    pub fn show_header(&mut self, payload: &RenderPayload, visit: &Visit) {
        if self.header_printed {
            return;
        }
        println!("Visit: {} ({})", visit.id, payload.template_name);
        if let Some(patient) = &visit.patient_id {
            println!("Patient: {}", patient);
        }
        self.header_printed = true;
    }

    pub fn show_section(&self, payload: &RenderPayload) {
        println!();
        println!(
            "Section {}/{}: {}",
            payload.section_index + 1,
            payload.section_count,
            payload.section_title.as_deref().unwrap_or("<unknown>")
        );
        if let Some(description) = &payload.section_description {
            println!("{}", description);
        }
        if self.verbosity.is_verbose() {
            println!(
                "Status: {} ({}/{})",
                payload.status.as_str(),
                payload.progress.answered,
                payload.progress.total
            );
            self.print_visible_questions(payload);
        } else if payload.status == RenderStatus::NeedInput && payload.progress.total == 0 {
            println!("No visible questions are available; check the skip logic.");
        }
    }

    fn print_visible_questions(&self, payload: &RenderPayload) {
        println!("Visible questions:");
        for question in payload.questions.iter().filter(|question| question.visible) {
            let mut entry = format!(" - {} ({})", question.id, question.text);
            if question.required {
                entry.push_str(" [required]");
            }
            println!("{}", entry);
        }
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = format!("{}/{} {}", prompt.index, prompt.total, prompt.text);
        if prompt.required {
            line.push_str(" *");
        }
        if let Some(hint) = &prompt.hint {
            line.push(' ');
            line.push_str(hint);
        }
        println!("{}", line);
        if let Some(help) = &prompt.help_text {
            println!("{}", help);
        }
        if !prompt.choices.is_empty() {
            println!("Choices: {}", prompt.choices.join(", "));
        }
        if let Some(current) = &prompt.current {
            println!("Current answer: {} (press enter to keep)", current);
        }
        if let Some(error) = &prompt.error
            && self.verbosity.is_verbose()
        {
            println!("! {}", error);
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if let Some(debug) = &error.debug_message {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_skipped(&self, skipped: &[String]) {
        if !skipped.is_empty() {
            println!("Skipped sections: {}", skipped.join(", "));
        }
    }

    pub fn show_recommendations(&self, recommendations: &[Recommendation]) {
        if recommendations.is_empty() {
            println!("No recommendations.");
            return;
        }
        println!("Recommendations:");
        for (index, recommendation) in recommendations.iter().enumerate() {
            let mark = if recommendation.selected { "x" } else { " " };
            println!(
                "  {}. [{}] {} ({})",
                index + 1,
                mark,
                recommendation.text,
                recommendation.category
            );
            if self.verbosity.is_verbose() {
                println!("       from {}", recommendation.source);
            }
        }
    }

    pub fn show_completion(&self, visit: &Visit) {
        println!("Visit completed ✅");
        self.show_recommendations(&visit.recommendations);
        match visit.to_cbor() {
            Ok(bytes) => {
                println!("Visit (CBOR hex): {}", encode_hex(&bytes));
            }
            Err(err) => {
                eprintln!("Failed to serialize visit to CBOR: {}", err);
            }
        }
        if self.show_visit_json {
            match visit.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => {
                    eprintln!("Failed to serialize visit to JSON: {}", err);
                }
            }
        }
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub index: usize,
    pub total: usize,
    pub text: String,
    pub help_text: Option<String>,
    pub required: bool,
    pub hint: Option<String>,
    pub choices: Vec<String>,
    pub current: Option<String>,
    pub error: Option<String>,
}

impl PromptContext {
    pub fn new(question: &RenderQuestion, index: usize, total: usize) -> Self {
        Self {
            index: index.max(1),
            total,
            text: question.text.clone(),
            help_text: question.help_text.clone(),
            required: question.required,
            hint: hint(&question.kind),
            choices: question
                .options
                .iter()
                .map(|option| format!("{}={}", option.id, option.label))
                .collect(),
            current: question
                .current_value
                .as_ref()
                .map(|value| display_answer(&question.kind, value)),
            error: question.error.clone(),
        }
    }
}

fn hint(kind: &QuestionKind) -> Option<String> {
    match kind {
        QuestionKind::YesNo => Some("(yes/no)".to_string()),
        QuestionKind::SingleChoice { .. } => Some("(one choice)".to_string()),
        QuestionKind::MultiChoice { .. } => Some("(comma-separated choices)".to_string()),
        QuestionKind::Numeric { unit: Some(unit) } => Some(format!("(number, {})", unit)),
        QuestionKind::Numeric { unit: None } => Some("(number)".to_string()),
        QuestionKind::Date => Some("(YYYY-MM-DD)".to_string()),
        QuestionKind::VitalSigns => {
            Some("(systolic=.., diastolic=.., heart_rate=.., weight_lb=.., height_in=..)".into())
        }
        QuestionKind::ClinicalScore {
            instrument,
            max_score,
            ..
        } => Some(format!("({} total, 0-{})", instrument, max_score)),
        QuestionKind::Text => None,
    }
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

pub fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut encoded, "{:02x}", byte);
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use awv_spec::RenderProgress;
    use serde_json::json;

    #[test]
    fn hex_encoding_is_lowercase_pairs() {
        assert_eq!(encode_hex(&[0x00, 0xab, 0x10]), "00ab10");
    }

    #[test]
    fn prompt_context_shows_current_label() {
        let question = RenderQuestion {
            id: "tobacco_use".into(),
            text: "Do you currently use tobacco?".into(),
            help_text: None,
            kind: QuestionKind::YesNo,
            required: true,
            visible: true,
            current_value: Some(json!(true)),
            options: Vec::new(),
            error: None,
        };
        let progress = RenderProgress {
            answered: 0,
            total: 2,
        };
        let prompt = PromptContext::new(&question, progress.answered, progress.total);
        assert_eq!(prompt.index, 1);
        assert_eq!(prompt.current.as_deref(), Some("Yes"));
        assert_eq!(prompt.hint.as_deref(), Some("(yes/no)"));
    }
}
