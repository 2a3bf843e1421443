// core/src/service/mod.rs

//! The order services. Each one is constructed with the store and mirror it
//! works against; none of them reach for global state.

pub mod backfill;
pub mod report;
pub mod write;

pub use backfill::{BackfillService, SyncReport};
pub use report::ReportQueryService;
pub use write::{CreateOutcome, DeleteOutcome, OrderWriteService};

/// Tracing target for every event where the mirror has drifted from the
/// system of record. Alerting can subscribe to this target alone.
pub const DRIFT_TARGET: &str = "ordermirror::drift";
