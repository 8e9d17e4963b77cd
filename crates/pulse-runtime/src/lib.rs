//! Runtime engine — owns ledger and log state, runs the lifecycle,
//! schedules persistence and builds cached reports.
//!
//! [`Engine`] is the single entry point for ingestion and queries.
//! [`PersistenceWorker`] drives periodic and debounced saves on tokio, and
//! [`FlushGuard`] writes a final snapshot on shutdown paths.

pub mod cache;
pub mod engine;
pub mod lifecycle;
pub mod persistence;
pub mod report;

pub use cache::{state_fingerprint, ReportCache};
pub use engine::{Engine, EngineStats};
pub use lifecycle::{run_cleanup, CleanupReport};
pub use persistence::{FlushGuard, PersistenceWorker, SaveDecision, SaveScheduler};
pub use report::{build_report, Report, ReportSummary};
