//! Bypass-detection pipeline: dedup, aggregation, reporting, sequencing

pub mod aggregate;
pub mod dedup;
pub mod handler;
pub mod report;

pub use aggregate::{BypassFindings, ScopeFindings, ScopeKind};
pub use dedup::{DedupGate, DedupKey};
pub use handler::{BypassHandler, Outcome};
