//! pulse.health_log.v1 input schema
//!
//! This module defines the record shape returned by the log backend and the
//! adapter that turns those records into health log entries.

mod adapter;
mod log_record;

pub use adapter::*;
pub use log_record::*;
