//! Forwarding of completed submissions to an external HTTP endpoint

use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::domain::Submission;

/// Result of a remote submission attempt. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RemoteOutcome {
    /// The endpoint answered 200.
    Delivered,
    /// The endpoint answered with any other status.
    Rejected { status: u16 },
    /// The request never produced a response.
    Failed { reason: String },
    /// No URL was supplied, so nothing was sent.
    MissingUrl,
}

impl RemoteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Severity used when presenting the outcome: `success`, `warning` or `error`.
    pub fn level(&self) -> &'static str {
        match self {
            Self::Delivered => "success",
            Self::Rejected { .. } | Self::MissingUrl => "warning",
            Self::Failed { .. } => "error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Delivered => "Data sent successfully.".to_string(),
            Self::Rejected { status } => format!("Error sending: status code {}", status),
            Self::Failed { reason } => format!("Failed to send: {}", reason),
            Self::MissingUrl => "You must enter a valid URL.".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoteSubmitter {
    client: reqwest::Client,
}

impl RemoteSubmitter {
    /// Without a timeout the client's default applies.
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// POSTs `submission` as JSON to `url`.
    pub async fn submit(&self, url: &str, submission: &Submission) -> RemoteOutcome {
        let url = url.trim();
        if url.is_empty() {
            return RemoteOutcome::MissingUrl;
        }

        match self.client.post(url).json(submission).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                info!("Submission delivered to {}", url);
                RemoteOutcome::Delivered
            }
            Ok(response) => {
                let status = response.status().as_u16();
                warn!("Submission to {} rejected with status {}", url, status);
                RemoteOutcome::Rejected { status }
            }
            Err(e) => {
                error!("Submission to {} failed: {}", url, e);
                RemoteOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
