//! Grant discovery and application workflows.
//!
//! The computational core lives in [`workflows::grants`]: amount parsing, fee quoting, and
//! the eligibility questionnaire. The application service and HTTP router build on it.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
