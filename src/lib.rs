//! Pulse Score - On-device health score aggregation and trend engine
//!
//! Pulse Score turns a subject's health-log entries into a weekly score summary
//! through a deterministic pipeline: daily bucketing → normalization → daily
//! composite → current/previous window scoring → insight generation.
//!
//! ## Modules
//!
//! - **Engine**: normalizer, aggregator, window scorer and insight rules
//! - **Schema**: parsing of the log backend's record documents
//! - **Encoder / FFI**: report envelope and C bindings for the mobile host

pub mod aggregator;
pub mod bucket;
pub mod config;
pub mod encoder;
pub mod error;
pub mod insights;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod stats;
pub mod types;
pub mod window;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::ScoreConfig;
pub use error::ComputeError;
pub use pipeline::{compute_summary, summary_from_json, ScoreEngine};
pub use types::{Category, HealthLogEntry, Insight, LogValue, WindowSummary};
pub use window::MENTAL_AXIS_SCORE;

// Schema exports
pub use schema::{LogRecord, LogRecordAdapter, SCHEMA_VERSION};

/// Engine version embedded in all reports
pub const SCORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "pulse-score";
