//! # jsonform - Schema-driven web forms
//!
//! jsonform renders an HTML form from a JSON schema, validates what the user
//! enters, keeps a history of completed submissions in a local JSON file and
//! can forward a submission to an external HTTP endpoint.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jsonform::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let state = jsonform::build_state(&settings)?;
//!     let app = jsonform::create_app(state);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema loading, the form engine and the history port
//! - **Adapters**: HTML and JSON handlers, file-backed history, remote submission
//! - **Config**: layered settings (file, environment, CLI)

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::form_handler::{self, FormState, PageRenderer};
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::history_store::FileHistoryStore;
use crate::adapters::remote::RemoteSubmitter;
use crate::adapters::api_handler;
use crate::config::Settings;
use crate::domain::FormSchema;
use anyhow::Context;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

/// Wires schema, history store, remote client and templates from settings.
///
/// Fails when the schema cannot be loaded; there is no form to serve without it.
pub fn build_state(settings: &Settings) -> anyhow::Result<FormState> {
    let schema = FormSchema::load(&settings.form.schema_path).with_context(|| {
        format!(
            "Failed to load form schema from {}",
            settings.form.schema_path.display()
        )
    })?;
    tracing::info!(
        "Loaded schema with {} fields from {}",
        schema.len(),
        settings.form.schema_path.display()
    );

    Ok(FormState {
        title: settings.form.title.clone(),
        schema: Arc::new(schema),
        history: Arc::new(FileHistoryStore::new(&settings.form.history_path)),
        remote: RemoteSubmitter::new(settings.remote.timeout())?,
        pages: Arc::new(PageRenderer::new()?),
    })
}

/// Creates the Axum application router with all endpoints configured.
pub fn create_app(state: FormState) -> Router {
    let health_handler = Arc::new(HealthHandler::new(state.schema.clone()));

    let health_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }));

    let api_router = Router::new()
        .route("/schema", get(api_handler::get_schema))
        .route("/validate", post(api_handler::validate_form))
        .route("/history", get(api_handler::list_history).post(api_handler::create_history_entry))
        .route("/history/:index", delete(api_handler::delete_history_entry))
        .route("/submit", post(api_handler::submit_remote));

    let page_router = Router::new()
        .route("/", get(form_handler::show_form).post(form_handler::submit_form))
        .route("/history/:index/delete", post(form_handler::delete_history_entry));

    let router = page_router
        .nest("/api", api_router)
        .with_state(state)
        .merge(health_router);

    router.layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
