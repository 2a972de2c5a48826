//! Workflow orchestration.
//!
//! - [`workflow`] - the per-identifier state machine
//! - [`escalation`] - when to try the vendor endpoint or OCR, and whether
//!   to keep their answers

pub mod escalation;
pub mod workflow;

pub use escalation::{next_escalation, Escalation};
pub use workflow::{is_valid_isin, normalize_isin, WeightsWorkflow};
