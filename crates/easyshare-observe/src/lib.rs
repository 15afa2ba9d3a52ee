//! Observability for easyshare: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;

pub use tracing_setup::{TracingOptions, bootstrap_subscriber, init_tracing, shutdown_tracing};
