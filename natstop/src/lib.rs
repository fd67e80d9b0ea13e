//! natstop: a top-like terminal dashboard for a NATS server's HTTP monitoring endpoints.

pub mod app;
pub mod config;
pub mod error;
pub mod fetch;
pub mod history;
pub mod logging;
pub mod poll;
pub mod profiles;
pub mod rates;
pub mod sort;
pub mod types;
pub mod ui;
