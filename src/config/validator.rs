use thiserror::Error;

use crate::config::{FormSettings, RemoteSettings, ServerSettings, Settings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Collects every problem instead of stopping at the first one.
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        errors.extend(Self::validate_server(&settings.server));
        errors.extend(Self::validate_form(&settings.form));
        errors.extend(Self::validate_remote(&settings.remote));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        errors
    }

    fn validate_form(form: &FormSettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if form.schema_path.as_os_str().is_empty() {
            errors.push(ValidationError::MissingField("form.schema_path".to_string()));
        }

        if form.history_path.as_os_str().is_empty() {
            errors.push(ValidationError::MissingField("form.history_path".to_string()));
        } else if form.history_path.file_name().is_none() {
            errors.push(ValidationError::InvalidValue {
                field: "form.history_path".to_string(),
                reason: "must name a file, not a directory".to_string(),
            });
        }

        if form.schema_path == form.history_path {
            errors.push(ValidationError::InvalidValue {
                field: "form.history_path".to_string(),
                reason: "must differ from form.schema_path".to_string(),
            });
        }

        errors
    }

    fn validate_remote(remote: &RemoteSettings) -> Vec<ValidationError> {
        match remote.timeout_seconds {
            Some(0) => vec![ValidationError::InvalidValue {
                field: "remote.timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            }],
            _ => Vec::new(),
        }
    }
}
