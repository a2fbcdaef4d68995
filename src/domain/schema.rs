//! Schema loading for dynamically rendered forms
//!
//! A schema document is a JSON object whose keys are field names and whose
//! values describe each field:
//!
//! ```json
//! {
//!     "nombre": { "tipo": "texto", "placeholder": "Tu nombre", "regex": "[A-Za-z ]+" },
//!     "edad":   { "tipo": "numero", "min": 0, "max": 120 },
//!     "activo": { "tipo": "booleano" },
//!     "tags":   { "tipo": "lista", "placeholder": "a, b, c" }
//! }
//! ```
//!
//! Field order is the declaration order in the document.

use indexmap::IndexMap;
use fancy_regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Lower bound used by number fields that declare no `min`.
pub const DEFAULT_NUMBER_MIN: f64 = 0.0;
/// Upper bound used by number fields that declare no `max`.
pub const DEFAULT_NUMBER_MAX: f64 = 100.0;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Schema must be a JSON object mapping field names to definitions")]
    NotAnObject,

    #[error("Invalid definition for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Invalid regex for field '{field}': {source}")]
    InvalidRegex {
        field: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },

    #[error("Invalid bounds for field '{field}': no whole number lies between min {min} and max {max}")]
    InvalidBounds { field: String, min: f64, max: f64 },
}

/// Kind of input a field collects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    List,
    /// A `tipo` the form engine does not know; carries the declared name, if any.
    Unknown(Option<String>),
}

impl FieldKind {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("texto") | Some("text") => Self::Text,
            Some("numero") | Some("number") => Self::Number,
            Some("booleano") | Some("boolean") => Self::Boolean,
            Some("lista") | Some("list") => Self::List,
            other => Self::Unknown(other.map(str::to_string)),
        }
    }

    /// Stable name used by templates and the JSON API.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(Some(tag)) => write!(f, "{}", tag),
            Self::Unknown(None) => write!(f, "(none)"),
            known => write!(f, "{}", known.as_str()),
        }
    }
}

/// Wire shape of a single field definition.
#[derive(Debug, Deserialize)]
struct RawFieldSpec {
    #[serde(default, alias = "kind")]
    tipo: Option<String>,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default)]
    regex: Option<String>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

/// Declarative description of one form field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub placeholder: Option<String>,
    pub regex: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// `regex` compiled and anchored at both ends; only set for text fields.
    pattern: Option<Regex>,
}

impl FieldSpec {
    fn from_raw(name: &str, raw: RawFieldSpec) -> Result<Self, SchemaError> {
        let kind = FieldKind::from_tag(raw.tipo.as_deref());

        let pattern = match (&kind, &raw.regex) {
            (FieldKind::Text, Some(regex)) => Some(anchored(regex).map_err(|source| {
                SchemaError::InvalidRegex {
                    field: name.to_string(),
                    source: Box::new(source),
                }
            })?),
            _ => None,
        };

        let spec = Self {
            name: name.to_string(),
            kind,
            placeholder: raw.placeholder,
            regex: raw.regex,
            min: raw.min,
            max: raw.max,
            pattern,
        };

        if spec.kind == FieldKind::Number {
            let (min, max) = spec.bounds();
            if min > max {
                return Err(SchemaError::InvalidBounds {
                    min: spec.min.unwrap_or(DEFAULT_NUMBER_MIN),
                    max: spec.max.unwrap_or(DEFAULT_NUMBER_MAX),
                    field: spec.name,
                });
            }
        }

        Ok(spec)
    }

    /// Integer bounds of a number field, falling back to `[0, 100]`.
    ///
    /// Fractional bounds are narrowed inward so every value on the integer
    /// step stays within the declared range.
    pub fn bounds(&self) -> (i64, i64) {
        let min = self.min.unwrap_or(DEFAULT_NUMBER_MIN).ceil() as i64;
        let max = self.max.unwrap_or(DEFAULT_NUMBER_MAX).floor() as i64;
        (min, max)
    }

    /// Whether `value` fully matches this field's pattern. Fields without a
    /// pattern accept everything. A match that exceeds the backtracking limit
    /// counts as a mismatch.
    pub fn matches(&self, value: &str) -> bool {
        let Some(pattern) = &self.pattern else {
            return true;
        };
        pattern.is_match(value).unwrap_or_else(|e| {
            warn!("Regex for field '{}' could not be evaluated: {}", self.name, e);
            false
        })
    }

    /// Human-facing label: the field name with its first letter capitalized
    /// and the rest lowercased.
    pub fn label(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

fn anchored(pattern: &str) -> Result<Regex, fancy_regex::Error> {
    Regex::new(&format!(r"\A(?:{})\z", pattern))
}

/// Ordered collection of field definitions.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: IndexMap<String, FieldSpec>,
}

impl FormSchema {
    /// Read and parse a schema document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, SchemaError> {
        let document: Value = serde_json::from_str(content)?;
        let Value::Object(entries) = document else {
            return Err(SchemaError::NotAnObject);
        };

        let mut fields = IndexMap::with_capacity(entries.len());
        for (name, definition) in entries {
            if !definition.is_object() {
                return Err(SchemaError::InvalidField {
                    field: name,
                    reason: "definition must be a JSON object".to_string(),
                });
            }
            let raw: RawFieldSpec =
                serde_json::from_value(definition).map_err(|e| SchemaError::InvalidField {
                    field: name.clone(),
                    reason: e.to_string(),
                })?;
            let spec = FieldSpec::from_raw(&name, raw)?;
            fields.insert(name, spec);
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
