//! Observability setup for Threadline: tracing subscriber and optional
//! OpenTelemetry export.

pub mod tracing_setup;
