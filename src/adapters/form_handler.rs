//! HTML form pages
//!
//! Every user action is one request: the posted values are collected and
//! validated by the form engine, then the requested action (validate, save,
//! download, send) runs only when the form is valid. The page is re-rendered
//! with the entered values, the result and the history.

use axum::{
    extract::{Form, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tera::{Context, Tera};
use tracing::error;

use crate::adapters::remote::RemoteSubmitter;
use crate::domain::{
    FieldKind, FormEngine, FormOutcome, FormSchema, HistoryLog, HistoryPort, RawInput, Submission,
};

/// Prefix of inputs carrying field values; everything else is a control input.
pub const FIELD_PREFIX: &str = "field.";
pub const ACTION_INPUT: &str = "_action";
pub const URL_INPUT: &str = "_url";

pub const DOWNLOAD_FILENAME: &str = "resultado.json";

const FORM_TEMPLATE: &str = "form.html";

/// Shared state for page and API handlers
#[derive(Clone)]
pub struct FormState {
    pub title: String,
    pub schema: Arc<FormSchema>,
    pub history: Arc<dyn HistoryPort>,
    pub remote: RemoteSubmitter,
    pub pages: Arc<PageRenderer>,
}

pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(FORM_TEMPLATE, include_str!("../../templates/form.html"))?;
        Ok(Self { tera })
    }

    pub fn render(&self, page: &FormPage) -> Result<String, tera::Error> {
        let context = Context::from_serialize(page)?;
        self.tera.render(FORM_TEMPLATE, &context)
    }
}

// ============================================================================
// View Models
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FormPage {
    pub title: String,
    pub fields: Vec<FieldView>,
    pub warnings: Vec<String>,
    pub result: Option<ResultView>,
    pub notices: Vec<Notice>,
    pub url: String,
    pub history: Vec<HistoryEntryView>,
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub input_name: String,
    pub kind: String,
    pub placeholder: String,
    pub min: i64,
    pub max: i64,
    pub value: String,
    pub checked: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResultView {
    pub valid: bool,
    pub errors: Vec<FieldErrorView>,
    pub json: String,
}

#[derive(Debug, Serialize)]
pub struct FieldErrorView {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Notice {
    pub level: &'static str,
    pub text: String,
}

impl Notice {
    fn new(level: &'static str, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryEntryView {
    /// Position in the stored log, used for deletion
    pub index: usize,
    /// 1-based label shown to the user
    pub number: usize,
    pub json: String,
}

impl FormPage {
    fn new(title: &str, schema: &FormSchema, raw: &RawInput, outcome: Option<&FormOutcome>) -> Self {
        let fields = schema
            .fields()
            .filter(|field| !matches!(field.kind, FieldKind::Unknown(_)))
            .map(|field| {
                let (min, max) = field.bounds();
                let raw_value = raw.get(&field.name).cloned().unwrap_or_default();
                let collected = outcome.and_then(|o| o.submission.get(&field.name));
                let value = match (&field.kind, collected) {
                    (FieldKind::Number, Some(number)) => number.to_string(),
                    (FieldKind::Number, None) => min.to_string(),
                    _ => raw_value,
                };
                FieldView {
                    name: field.name.clone(),
                    label: field.label(),
                    input_name: format!("{}{}", FIELD_PREFIX, field.name),
                    kind: field.kind.as_str().to_string(),
                    placeholder: field.placeholder.clone().unwrap_or_default(),
                    min,
                    max,
                    value,
                    checked: collected.and_then(|v| v.as_bool()).unwrap_or(false),
                    error: outcome.and_then(|o| o.errors.get(&field.name).cloned()),
                }
            })
            .collect();

        let warnings = match outcome {
            Some(o) => o.warnings.clone(),
            None => schema
                .fields()
                .filter(|field| matches!(field.kind, FieldKind::Unknown(_)))
                .map(|field| format!("Unrecognized field type: {}", field.kind))
                .collect(),
        };

        let result = outcome.map(|o| ResultView {
            valid: o.is_valid(),
            errors: o
                .errors
                .iter()
                .map(|(field, message)| FieldErrorView {
                    field: field.clone(),
                    message: message.clone(),
                })
                .collect(),
            json: pretty_json(&o.submission),
        });

        Self {
            title: title.to_string(),
            fields,
            warnings,
            result,
            notices: Vec::new(),
            url: String::new(),
            history: Vec::new(),
        }
    }

    /// Newest entries first.
    fn with_history(mut self, log: &HistoryLog) -> Self {
        self.history = log
            .iter()
            .enumerate()
            .rev()
            .map(|(index, entry)| HistoryEntryView {
                index,
                number: index + 1,
                json: pretty_json(entry),
            })
            .collect();
        self
    }
}

fn pretty_json(submission: &Submission) -> String {
    serde_json::to_string_pretty(submission).unwrap_or_else(|_| "{}".to_string())
}

// ============================================================================
// Request Parsing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Validate,
    Save,
    Send,
    Download,
}

impl FormAction {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("save") => Self::Save,
            Some("send") => Self::Send,
            Some("download") => Self::Download,
            _ => Self::Validate,
        }
    }
}

/// Splits posted inputs into field values, the requested action and the target URL.
fn split_params(params: HashMap<String, String>) -> (RawInput, FormAction, String) {
    let action = FormAction::parse(params.get(ACTION_INPUT).map(String::as_str));
    let url = params.get(URL_INPUT).cloned().unwrap_or_default();
    let raw = params
        .into_iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(FIELD_PREFIX)
                .map(|name| (name.to_string(), value))
        })
        .collect();
    (raw, action, url)
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn show_form(State(state): State<FormState>) -> Response {
    let page = FormPage::new(&state.title, &state.schema, &RawInput::new(), None);
    render_with_history(&state, page).await
}

pub async fn submit_form(
    State(state): State<FormState>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let (raw, action, url) = split_params(params);
    let outcome = FormEngine::collect(&state.schema, &raw);

    let mut page = FormPage::new(&state.title, &state.schema, &raw, Some(&outcome));
    page.url = url.clone();

    if outcome.is_valid() {
        match action {
            FormAction::Validate => {}
            FormAction::Download => return download_response(&outcome.submission),
            FormAction::Save => match state.history.append(outcome.submission.clone()).await {
                Ok(()) => page.notices.push(Notice::new("success", "Saved to history.")),
                Err(e) => {
                    error!("Failed to save submission: {}", e);
                    page.notices
                        .push(Notice::new("error", format!("Failed to save history: {}", e)));
                }
            },
            FormAction::Send => {
                let sent = state.remote.submit(&url, &outcome.submission).await;
                page.notices.push(Notice::new(sent.level(), sent.message()));
            }
        }
    }

    render_with_history(&state, page).await
}

pub async fn delete_history_entry(
    State(state): State<FormState>,
    Path(index): Path<i64>,
) -> Response {
    // Negative indices can never be in range.
    if let Ok(index) = usize::try_from(index) {
        if let Err(e) = state.history.delete(index).await {
            error!("Failed to delete history entry {}: {}", index, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to delete history entry: {}", e),
            )
                .into_response();
        }
    }
    Redirect::to("/").into_response()
}

pub fn download_response(submission: &Submission) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
            ),
        ],
        pretty_json(submission),
    )
        .into_response()
}

async fn render_with_history(state: &FormState, mut page: FormPage) -> Response {
    let log = match state.history.list().await {
        Ok(log) => log,
        Err(e) => {
            error!("Failed to read history: {}", e);
            page.notices
                .push(Notice::new("error", format!("Failed to read history: {}", e)));
            Vec::new()
        }
    };
    let page = page.with_history(&log);

    match state.pages.render(&page) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render form page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}
