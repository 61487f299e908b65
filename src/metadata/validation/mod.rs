//! Configuration and re-validation of debug records
//!
//! [`DebugInfoConfig`] selects which optional records are emitted and whether finished records
//! are checked again by [`RecordValidator`] before they are handed out.

mod config;
mod validator;

pub use config::DebugInfoConfig;
pub use validator::RecordValidator;
