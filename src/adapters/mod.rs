pub mod api_handler;
pub mod form_handler;
pub mod health_handler;
pub mod history_store;
pub mod remote;
