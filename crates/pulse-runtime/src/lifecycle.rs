//! Cleanup pass that keeps the ledger and log inside their bounds.

use pulse_core::EngineConfig;
use pulse_store::{LeadLedger, MessageLog};
use serde::Serialize;

/// What one cleanup pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub expired_messages: usize,
    pub overflow_messages: usize,
    pub expired_leads: usize,
    pub overflow_leads: usize,
}

impl CleanupReport {
    pub fn total(&self) -> usize {
        self.expired_messages + self.overflow_messages + self.expired_leads + self.overflow_leads
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Evict expired and excess entries. Log first, then ledger; each by age
/// before capacity.
pub fn run_cleanup(
    ledger: &mut LeadLedger,
    log: &mut MessageLog,
    config: &EngineConfig,
    now: i64,
) -> CleanupReport {
    let expired_messages = log.evict_expired(now, config.retention_ms);
    let overflow_messages = log.evict_overflow(config.max_messages);
    let expired_leads = ledger.evict_expired(now, config.retention_ms);
    let overflow_leads = ledger.evict_overflow(config.max_leads);

    CleanupReport {
        expired_messages,
        overflow_messages,
        expired_leads,
        overflow_leads,
    }
}
