// Compliance rules module
// - engine.rs: ComplianceRule trait and the scoring engine
// - rubric.rs: the standard weighted checks
// - summary.rs: score-band summary templates

pub mod engine;
pub mod rubric;
pub mod summary;

pub use engine::*;
pub use summary::ScoreBand;
