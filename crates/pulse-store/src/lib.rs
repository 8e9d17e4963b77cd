//! Pulse Store — lead ledger, bounded message log, snapshot persistence.

pub mod ledger;
pub mod message_log;
pub mod snapshot;
pub mod types;

pub use ledger::{classify_lead, estimate_lead_value, lead_key, score_delta, LeadLedger};
pub use message_log::MessageLog;
pub use snapshot::{JsonFileStore, MemorySnapshotStore, Snapshot, SnapshotStore, SNAPSHOT_VERSION};
pub use types::*;
