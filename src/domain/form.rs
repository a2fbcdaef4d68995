//! Form engine: turns raw posted values into a typed submission
//!
//! Collection never stops at the first problem. Every field in the schema is
//! visited, regex mismatches are recorded per field, and unknown kinds only
//! produce warnings.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use tracing::warn;

use super::schema::{FieldKind, FieldSpec, FormSchema};
use super::{ErrorSet, Submission};

/// Raw values keyed by field name, exactly as the client sent them.
pub type RawInput = HashMap<String, String>;

/// Result of collecting one form instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormOutcome {
    pub submission: Submission,
    pub errors: ErrorSet,
    pub warnings: Vec<String>,
}

impl FormOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct FormEngine;

impl FormEngine {
    pub fn collect(schema: &FormSchema, input: &RawInput) -> FormOutcome {
        let mut outcome = FormOutcome::default();

        for field in schema.fields() {
            let raw = input.get(&field.name).map(String::as_str);

            let value = match &field.kind {
                FieldKind::Text => {
                    let text = raw.unwrap_or_default();
                    if !text.is_empty() && !field.matches(text) {
                        outcome.errors.insert(
                            field.name.clone(),
                            format!("Invalid format for '{}'", field.name),
                        );
                    }
                    Value::String(text.to_string())
                }
                FieldKind::Number => Value::Number(Number::from(Self::number(field, raw))),
                FieldKind::Boolean => Value::Bool(Self::checked(raw)),
                FieldKind::List => Value::Array(
                    split_list(raw.unwrap_or_default())
                        .into_iter()
                        .map(Value::String)
                        .collect(),
                ),
                unknown @ FieldKind::Unknown(_) => {
                    warn!("Field '{}' has unrecognized type: {}", field.name, unknown);
                    outcome
                        .warnings
                        .push(format!("Unrecognized field type: {}", unknown));
                    continue;
                }
            };

            outcome.submission.insert(field.name.clone(), value);
        }

        outcome
    }

    /// Collects a JSON object. Array values of list fields are taken item by
    /// item, so items keep any commas they contain.
    pub fn collect_json(schema: &FormSchema, values: &Map<String, Value>) -> FormOutcome {
        let mut outcome = Self::collect(schema, &raw_input_from_json(values));

        for field in schema.fields().filter(|field| field.kind == FieldKind::List) {
            if let Some(Value::Array(items)) = values.get(&field.name) {
                let list = items
                    .iter()
                    .filter_map(|item| {
                        let text = match item {
                            Value::Null => return None,
                            Value::String(s) => s.trim().to_string(),
                            other => other.to_string(),
                        };
                        (!text.is_empty()).then_some(Value::String(text))
                    })
                    .collect();
                outcome.submission.insert(field.name.clone(), Value::Array(list));
            }
        }

        outcome
    }

    /// Integer-step number input clamped into the field's bounds. Missing or
    /// unparseable input falls back to the lower bound.
    fn number(field: &FieldSpec, raw: Option<&str>) -> i64 {
        let (min, max) = field.bounds();
        raw.and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .map(|n| (n.round() as i64).clamp(min, max))
            .unwrap_or(min)
    }

    fn checked(raw: Option<&str>) -> bool {
        raw.map(|s| s.trim().to_ascii_lowercase())
            .is_some_and(|s| matches!(s.as_str(), "on" | "true" | "1" | "yes"))
    }
}

/// Splits a comma separated string, trimming every segment and dropping
/// empty ones. Order and duplicates are kept.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalizes a JSON object into the raw strings an HTML form would have
/// posted for the same values. `null` counts as absent.
pub fn raw_input_from_json(values: &Map<String, Value>) -> RawInput {
    values
        .iter()
        .filter_map(|(name, value)| {
            let raw = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
                other => other.to_string(),
            };
            Some((name.clone(), raw))
        })
        .collect()
}
