mod store;
mod wizard;

use awv_component::{render_text as component_render_text, submit_patch};
use awv_spec::composite::VITAL_FIELDS;
use awv_spec::{
    LoadError, Navigation, QuestionKind, RenderPayload, RenderQuestion, ReportRenderer,
    ResponseStore, Severity, Template, ValidationResult, VisitRepository, VisitSession,
    build_render_payload, extract_recommendations, has_errors, lint_template, open_session,
    render_json_ui, resolve_visibility, responses_schema, template_schema, validate_visit,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Number, Value, json};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use store::FsRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wizard::{AnswerParseError, PromptContext, Verbosity, WizardPresenter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const LOG_ENV: &str = "AWV_LOG";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Annual Wellness Visit conduct CLI",
    long_about = "Conducts wellness visits section by section and checks templates, answers and reports"
)]
struct Cli {
    /// Directory holding templates/ and visits/ (defaults to AWV_DATA_DIR or the working directory).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Conduct a stored visit interactively, one section at a time.
    Conduct {
        /// Identifier of the visit under visits/.
        #[arg(long, value_name = "VISIT")]
        visit: String,
        /// Show verbose output (statuses, visible questions, recommendation sources).
        #[arg(long, alias = "debug")]
        verbose: bool,
        /// Also print the completed visit JSON.
        #[arg(long)]
        visit_json: bool,
        /// Also print each section as text or JSON UI.
        #[arg(long, value_enum)]
        format: Option<RenderMode>,
    },
    /// Validate answers against a template.
    Validate {
        /// Path to the template JSON.
        #[arg(long, value_name = "TEMPLATE")]
        template: PathBuf,
        /// Path to a JSON object of answers keyed by question id.
        #[arg(long, value_name = "RESPONSES")]
        responses: PathBuf,
    },
    /// Check a template for broken skip logic and duplicate ids.
    Lint {
        /// Path to the template JSON.
        #[arg(long, value_name = "TEMPLATE")]
        template: PathBuf,
    },
    /// Print the recommendations a set of answers would produce.
    Recommend {
        /// Path to the template JSON.
        #[arg(long, value_name = "TEMPLATE")]
        template: PathBuf,
        /// Path to a JSON object of answers keyed by question id.
        #[arg(long, value_name = "RESPONSES")]
        responses: PathBuf,
        /// Print the recommendations as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Render the Markdown summary report of a stored visit.
    Report {
        /// Identifier of the visit under visits/.
        #[arg(long, value_name = "VISIT")]
        visit: String,
        /// Optional handlebars layout replacing the built-in one.
        #[arg(long, value_name = "LAYOUT")]
        layout: Option<PathBuf>,
        /// Write the report to a file instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Print the template JSON schema, or the answer schema of a template.
    Schema {
        /// Template whose answer schema should be printed.
        #[arg(long, value_name = "TEMPLATE")]
        template: Option<PathBuf>,
        /// Answers used to decide which questions are currently required.
        #[arg(long, value_name = "RESPONSES", requires = "template")]
        responses: Option<PathBuf>,
    },
    /// Apply one answer to a visit document through the JSON facade.
    Patch {
        /// Path to the template JSON.
        #[arg(long, value_name = "TEMPLATE")]
        template: PathBuf,
        /// Path to the visit JSON.
        #[arg(long, value_name = "VISIT")]
        visit: PathBuf,
        /// Question to answer.
        #[arg(long, value_name = "QUESTION")]
        question: String,
        /// Answer as JSON; bare words are taken as strings.
        #[arg(long, value_name = "VALUE", allow_hyphen_values = true)]
        value: String,
        /// Write the updated visit back when the answer is accepted.
        #[arg(long)]
        write: bool,
        /// Output format for the patched visit.
        #[arg(long, value_enum, default_value_t = RenderMode::Json)]
        format: RenderMode,
    },
}

fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();
    let repository = FsRepository::resolve(cli.data_dir);
    match cli.command {
        Command::Conduct {
            visit,
            verbose,
            visit_json,
            format,
        } => run_conduct(&repository, &visit, verbose, visit_json, format),
        Command::Validate {
            template,
            responses,
        } => run_validate(&template, &responses),
        Command::Lint { template } => run_lint(&template),
        Command::Recommend {
            template,
            responses,
            json,
        } => run_recommend(&template, &responses, json),
        Command::Report { visit, layout, out } => {
            run_report(&repository, &visit, layout.as_deref(), out.as_deref())
        }
        Command::Schema {
            template,
            responses,
        } => run_schema(template.as_deref(), responses.as_deref()),
        Command::Patch {
            template,
            visit,
            question,
            value,
            write,
            format,
        } => run_patch(&template, &visit, &question, &value, write, format),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Runs a repository call, offering a manual retry when the failure is transient.
fn with_retry<T>(call: impl FnMut() -> Result<T, LoadError>) -> CliResult<T> {
    retry_with(call, || prompt_bool("Retry?", false))
}

fn retry_with<T>(
    mut call: impl FnMut() -> Result<T, LoadError>,
    mut confirm_retry: impl FnMut() -> CliResult<bool>,
) -> CliResult<T> {
    loop {
        match call() {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    retryable = err.is_retryable(),
                    "repository call failed"
                );
                eprintln!("{}", err);
                if !err.is_retryable() || !confirm_retry()? {
                    return Err(err.into());
                }
            }
        }
    }
}

fn run_conduct(
    repository: &FsRepository,
    visit_id: &str,
    verbose: bool,
    visit_json: bool,
    format: Option<RenderMode>,
) -> CliResult<()> {
    let mut session = with_retry(|| open_session(repository, visit_id))?;
    let mut presenter = WizardPresenter::new(Verbosity::from_verbose(verbose), visit_json);

    if session.visit().is_completed() {
        println!("Visit '{}' is already completed.", visit_id);
        presenter.show_completion(session.visit());
        return Ok(());
    }

    loop {
        let payload = current_payload(&session);
        presenter.show_header(&payload, session.visit());
        presenter.show_section(&payload);
        if let Some(mode) = format {
            print_render_output(mode, &payload)?;
        }

        if !answer_section(&mut session, &presenter)? {
            return pause_visit(repository, &mut session);
        }

        match prompt_action(session.is_last_section())? {
            Action::Next => match session.advance() {
                Navigation::Moved { skipped, .. } => presenter.show_skipped(&skipped),
                Navigation::AtBoundary => println!("This is the last section; choose complete."),
                Navigation::Blocked(result) => {
                    println!("This section is not finished.");
                    describe_validation(&result);
                }
            },
            Action::Back => match session.retreat() {
                Navigation::Moved { skipped, .. } => presenter.show_skipped(&skipped),
                _ => println!("Already at the first section."),
            },
            Action::Save => {
                with_retry(|| repository.save_visit(session.save_progress()))?;
                println!("Progress saved.");
            }
            Action::Recommendations => review_recommendations(&mut session, &presenter)?,
            Action::Complete => match session.complete() {
                Ok(visit) => {
                    let visit = visit.clone();
                    with_retry(|| repository.save_visit(&visit))?;
                    presenter.show_completion(&visit);
                    return Ok(());
                }
                Err(result) => {
                    println!("The visit cannot be completed yet.");
                    describe_validation(&result);
                }
            },
            Action::Exit => return pause_visit(repository, &mut session),
        }
    }
}

fn pause_visit(repository: &FsRepository, session: &mut VisitSession) -> CliResult<()> {
    with_retry(|| repository.save_visit(session.save_progress()))?;
    println!(
        "Progress saved; resume with `awv conduct --visit {}`.",
        session.visit().id
    );
    Ok(())
}

fn current_payload(session: &VisitSession) -> RenderPayload {
    build_render_payload(
        session.template(),
        session.current_index(),
        session.responses(),
        session.errors(),
    )
}

/// Prompts each visible question of the current section in order.
/// Visibility is rebuilt after every answer. Returns `false` once the user types `exit`.
fn answer_section(session: &mut VisitSession, presenter: &WizardPresenter) -> CliResult<bool> {
    let count = session
        .current_section()
        .map(|section| section.questions.len())
        .unwrap_or(0);
    for position in 0..count {
        let payload = current_payload(session);
        let Some(question) = payload.questions.get(position) else {
            break;
        };
        if !question.visible {
            continue;
        }
        let index = payload.questions[..position]
            .iter()
            .filter(|earlier| earlier.visible)
            .count()
            + 1;
        let prompt = PromptContext::new(question, index, payload.progress.total);
        match prompt_question(&prompt, question, presenter)? {
            PromptOutcome::Answer(value) => session.answer(&question.id, value)?,
            PromptOutcome::Clear => session.clear_answer(&question.id)?,
            PromptOutcome::Keep => {}
            PromptOutcome::Exit => return Ok(false),
        }
    }
    Ok(true)
}

fn review_recommendations(
    session: &mut VisitSession,
    presenter: &WizardPresenter,
) -> CliResult<()> {
    loop {
        presenter.show_recommendations(&session.recommendations());
        let Some(line) = prompt_line("Toggle recommendation number (blank to finish)", None)?
        else {
            return Ok(());
        };
        if line.is_empty() {
            return Ok(());
        }
        match line.parse::<usize>() {
            Ok(number) if number > 0 => {
                if let Err(err) = session.toggle_recommendation(number - 1) {
                    println!("{}", err);
                }
            }
            _ => println!("Enter the number shown next to a recommendation."),
        }
    }
}

enum PromptOutcome {
    Answer(Value),
    Clear,
    Keep,
    Exit,
}

fn prompt_question(
    prompt: &PromptContext,
    question: &RenderQuestion,
    presenter: &WizardPresenter,
) -> CliResult<PromptOutcome> {
    loop {
        presenter.show_prompt(prompt);
        print!("> ");
        io::stdout().flush()?;
        let Some(input) = read_line()? else {
            return Ok(PromptOutcome::Exit);
        };

        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("exit") {
            return Ok(PromptOutcome::Exit);
        }
        if trimmed == "-" {
            return Ok(PromptOutcome::Clear);
        }
        if trimmed.is_empty() && question.current_value.is_some() {
            return Ok(PromptOutcome::Keep);
        }

        match parse_answer(question, trimmed) {
            Ok(Value::Null) => return Ok(PromptOutcome::Keep),
            Ok(value) => return Ok(PromptOutcome::Answer(value)),
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}

fn parse_answer(question: &RenderQuestion, raw: &str) -> Result<Value, AnswerParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        if !question.required {
            return Ok(Value::Null);
        }
        return Err(AnswerParseError::new(
            "This question requires an answer.",
            None,
        ));
    }

    match &question.kind {
        QuestionKind::Text => Ok(Value::String(raw.to_string())),
        QuestionKind::YesNo => parse_yes_no(raw),
        QuestionKind::SingleChoice { .. } => parse_choice(question, raw).map(Value::String),
        QuestionKind::MultiChoice { .. } => raw
            .split(',')
            .map(|part| parse_choice(question, part.trim()).map(Value::String))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        QuestionKind::Numeric { .. } => parse_number(raw),
        QuestionKind::Date => parse_date(raw),
        QuestionKind::VitalSigns => parse_vitals(raw),
        QuestionKind::ClinicalScore { .. } => parse_score(raw),
    }
}

fn parse_yes_no(raw: &str) -> Result<Value, AnswerParseError> {
    match raw.to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(Value::Bool(true)),
        "false" | "f" | "no" | "n" | "0" => Ok(Value::Bool(false)),
        _ => Err(AnswerParseError::new(
            "Please enter yes or no.",
            Some("expected yes/no (y/n/true/false)".to_string()),
        )),
    }
}

/// Accepts an option id, its label, or its 1-based position.
fn parse_choice(question: &RenderQuestion, raw: &str) -> Result<String, AnswerParseError> {
    let by_position = raw
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| question.options.get(index));
    let matched = by_position.or_else(|| {
        question.options.iter().find(|option| {
            option.id.eq_ignore_ascii_case(raw) || option.label.eq_ignore_ascii_case(raw)
        })
    });
    match matched {
        Some(option) => Ok(option.id.clone()),
        None => {
            let allowed = question
                .options
                .iter()
                .map(|option| option.id.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Err(AnswerParseError::new(
                format!("Choose one of: {}.", allowed),
                Some(format!("allowed values: {}", allowed)),
            ))
        }
    }
}

fn parse_number(raw: &str) -> Result<Value, AnswerParseError> {
    raw.parse::<f64>()
        .map_err(|_| {
            AnswerParseError::new(
                "Please enter a number.",
                Some("expected number".to_string()),
            )
        })
        .and_then(|value| {
            Number::from_f64(value).map(Value::Number).ok_or_else(|| {
                AnswerParseError::new(
                    "Please enter a finite number.",
                    Some("number must be finite".to_string()),
                )
            })
        })
}

fn parse_date(raw: &str) -> Result<Value, AnswerParseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
        .map_err(|err| {
            AnswerParseError::new(
                "Please enter a date as YYYY-MM-DD.",
                Some(err.to_string()),
            )
        })
}

/// `systolic=128, diastolic=82` pairs, or a JSON object.
fn parse_vitals(raw: &str) -> Result<Value, AnswerParseError> {
    if raw.starts_with('{') {
        return serde_json::from_str::<Value>(raw)
            .ok()
            .filter(Value::is_object)
            .ok_or_else(|| {
                AnswerParseError::new(
                    "Vital signs must be a JSON object.",
                    Some(format!("fields: {}", VITAL_FIELDS.join(", "))),
                )
            });
    }

    let mut fields = Map::new();
    for pair in raw
        .split([',', ' '])
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
    {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(AnswerParseError::new(
                format!("'{}' is not a name=value pair.", pair),
                Some(format!("fields: {}", VITAL_FIELDS.join(", "))),
            ));
        };
        let key = key.trim();
        if !VITAL_FIELDS.contains(&key) {
            return Err(AnswerParseError::new(
                format!("Unknown vital sign '{}'.", key),
                Some(format!("fields: {}", VITAL_FIELDS.join(", "))),
            ));
        }
        fields.insert(key.to_string(), parse_number(value.trim())?);
    }
    Ok(Value::Object(fields))
}

/// A bare total, or a JSON object with per-item scores.
fn parse_score(raw: &str) -> Result<Value, AnswerParseError> {
    if raw.starts_with('{') {
        return serde_json::from_str::<Value>(raw)
            .ok()
            .filter(Value::is_object)
            .ok_or_else(|| {
                AnswerParseError::new(
                    "Item scores must be a JSON object.",
                    Some("e.g. {\"items\": {\"interest\": 1, \"mood\": 2}}".to_string()),
                )
            });
    }
    parse_number(raw)
}

enum Action {
    Next,
    Back,
    Save,
    Recommendations,
    Complete,
    Exit,
}

fn prompt_action(is_last_section: bool) -> CliResult<Action> {
    let default = if is_last_section { "complete" } else { "next" };
    loop {
        let Some(line) = prompt_line(
            "Action (next, back, save, recs, complete, exit)",
            Some(default),
        )?
        else {
            return Ok(Action::Exit);
        };
        match line.to_lowercase().as_str() {
            "n" | "next" => return Ok(Action::Next),
            "b" | "back" => return Ok(Action::Back),
            "s" | "save" => return Ok(Action::Save),
            "r" | "recs" => return Ok(Action::Recommendations),
            "c" | "complete" => return Ok(Action::Complete),
            "q" | "exit" => return Ok(Action::Exit),
            other => println!("Unknown action '{}'.", other),
        }
    }
}

/// `None` once stdin is exhausted.
fn read_line() -> CliResult<Option<String>> {
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn prompt_line(prompt: &str, default: Option<&str>) -> CliResult<Option<String>> {
    if let Some(default_value) = default {
        print!("{} [{}]: ", prompt, default_value);
    } else {
        print!("{}: ", prompt);
    }
    io::stdout().flush()?;
    let Some(line) = read_line()? else {
        return Ok(None);
    };
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Ok(Some(default.unwrap_or_default().to_string()))
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

fn prompt_bool(prompt: &str, default: bool) -> CliResult<bool> {
    let prompt_text = format!("{} (y/n)", prompt.trim());
    let default_hint = if default { "Y" } else { "N" };
    loop {
        let Some(line) = prompt_line(&prompt_text, Some(default_hint))? else {
            return Ok(default);
        };
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            other => {
                println!("Invalid answer '{}'. Expected yes or no.", other);
            }
        }
    }
}

fn read_template(path: &Path) -> CliResult<Template> {
    let raw = fs::read_to_string(path)?;
    Ok(Template::from_json(&raw)?)
}

fn read_responses(path: &Path) -> CliResult<ResponseStore> {
    let raw = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;
    if !value.is_object() {
        return Err("responses must be a JSON object keyed by question id".into());
    }
    Ok(ResponseStore::from_value(&value))
}

fn run_validate(template_path: &Path, responses_path: &Path) -> CliResult<()> {
    let template = read_template(template_path)?;
    let responses = read_responses(responses_path)?;

    let result = validate_visit(&template, &responses);
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!(
                "  {} - {} ({})",
                error.question_id, error.message, error.code
            );
        }
    }
    if !result.missing_required.is_empty() {
        println!(
            "Missing required answers: {}",
            result.missing_required.join(", ")
        );
    }
    if !result.unknown_fields.is_empty() {
        println!(
            "Unknown answer fields: {}",
            result.unknown_fields.join(", ")
        );
    }
}

fn run_lint(template_path: &Path) -> CliResult<()> {
    // Inactive templates are still worth checking, so skip the conduct checks.
    let raw = fs::read_to_string(template_path)?;
    let template: Template = serde_json::from_str(&raw)?;
    let issues = lint_template(&template);
    if issues.is_empty() {
        println!("No issues found.");
        return Ok(());
    }
    for issue in &issues {
        let severity = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &issue.question_id {
            Some(question_id) => println!(
                "{} [{}] {}: {}",
                severity, issue.code, question_id, issue.message
            ),
            None => println!("{} [{}] {}", severity, issue.code, issue.message),
        }
    }
    if has_errors(&issues) {
        Err("template has lint errors".into())
    } else {
        Ok(())
    }
}

fn run_recommend(template_path: &Path, responses_path: &Path, json: bool) -> CliResult<()> {
    let template = read_template(template_path)?;
    let responses = read_responses(responses_path)?;
    let recommendations = extract_recommendations(&template, &responses);
    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }
    if recommendations.is_empty() {
        println!("No recommendations.");
    }
    for recommendation in &recommendations {
        println!(
            "- {} ({}) <- {}",
            recommendation.text, recommendation.category, recommendation.source
        );
    }
    Ok(())
}

fn run_report(
    repository: &FsRepository,
    visit_id: &str,
    layout: Option<&Path>,
    out: Option<&Path>,
) -> CliResult<()> {
    let session = with_retry(|| open_session(repository, visit_id))?;
    if !session.visit().is_completed() {
        eprintln!(
            "Visit '{}' is not completed; the report has no recommendations yet.",
            visit_id
        );
    }
    let renderer = match layout {
        Some(path) => ReportRenderer::with_layout(&fs::read_to_string(path)?)?,
        None => ReportRenderer::new()?,
    };
    let report = renderer.render(session.template(), session.visit())?;
    match out {
        Some(path) => {
            fs::write(path, &report)?;
            println!("Report written to {}", path.display());
        }
        None => print!("{}", report),
    }
    Ok(())
}

fn run_schema(template_path: Option<&Path>, responses_path: Option<&Path>) -> CliResult<()> {
    let schema = match template_path {
        None => template_schema(),
        Some(path) => {
            let template = read_template(path)?;
            let responses = match responses_path {
                Some(path) => read_responses(path)?,
                None => ResponseStore::new(),
            };
            let visibility = resolve_visibility(&template, &responses);
            responses_schema(&template, &visibility)
        }
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn run_patch(
    template_path: &Path,
    visit_path: &Path,
    question_id: &str,
    raw_value: &str,
    write: bool,
    format: RenderMode,
) -> CliResult<()> {
    let template_json = fs::read_to_string(template_path)?;
    let template_id = serde_json::from_str::<Value>(&template_json)?
        .get("id")
        .and_then(Value::as_str)
        .ok_or("template is missing an id")?
        .to_string();
    let config_json = json!({ "template_json": template_json }).to_string();
    let visit_json = fs::read_to_string(visit_path)?;
    let value_json = match serde_json::from_str::<Value>(raw_value) {
        Ok(_) => raw_value.to_string(),
        Err(_) => Value::String(raw_value.to_string()).to_string(),
    };

    let response = parse_component_result(&submit_patch(
        &template_id,
        &config_json,
        &visit_json,
        question_id,
        &value_json,
    ))?;
    let patched_visit = serde_json::to_string_pretty(&response["visit"])?;

    if response["status"] == "error" {
        let validation: ValidationResult =
            serde_json::from_value(response["validation"].clone())?;
        eprintln!("Answer was stored with validation errors:");
        describe_validation(&validation);
    } else if write {
        fs::write(visit_path, &patched_visit)?;
        tracing::info!(path = %visit_path.display(), question = question_id, "visit patched");
    }

    match format {
        RenderMode::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        RenderMode::Text => println!(
            "{}",
            component_render_text(&template_id, &config_json, &patched_visit)
        ),
    }
    Ok(())
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        Err(error.into())
    } else {
        Ok(value)
    }
}

fn print_render_output(mode: RenderMode, payload: &RenderPayload) -> CliResult<()> {
    match mode {
        RenderMode::Text => println!("{}", awv_spec::render_text(payload)),
        RenderMode::Json => println!(
            "JSON UI:\n{}",
            serde_json::to_string_pretty(&render_json_ui(payload))?
        ),
    }
    Ok(())
}
