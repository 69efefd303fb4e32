//! Telemetry: structured logging for the access layer and its service.
//!
//! Access decisions are emitted as `tracing` events with structured fields
//! (`entity`, `action`, `user`, `denied`); this module decides where they go.
//!
//! # Example
//!
//! ```rust,no_run
//! use portcullis_core::telemetry::{init_logging, LoggingConfig};
//!
//! init_logging(&LoggingConfig::default()).expect("Failed to initialize logging");
//! ```

pub mod logging;

pub use logging::{build_filter, init_logging, LogFormat, LoggingConfig, SpanEventConfig};
