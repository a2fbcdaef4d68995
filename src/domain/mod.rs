use indexmap::IndexMap;
use serde_json::{Map, Value};

pub mod form;
pub mod history;
pub mod schema;

pub use form::{FormEngine, FormOutcome, RawInput};
pub use history::{HistoryError, HistoryPort};
pub use schema::{FieldKind, FieldSpec, FormSchema, SchemaError};

/// Collected values of one completed form, keyed by field name in schema order.
pub type Submission = Map<String, Value>;

/// Ordered collection of past submissions.
pub type HistoryLog = Vec<Submission>;

/// Per-field validation messages, in schema order.
pub type ErrorSet = IndexMap<String, String>;
