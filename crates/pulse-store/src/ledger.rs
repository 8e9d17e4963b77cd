//! Lead ledger — per `(user, group)` score accumulation and eviction.
//!
//! Scores only grow. A lead leaves the ledger when it has been inactive
//! for longer than the retention window, or when the ledger is over
//! capacity and the lead is among the least recently active.

use std::collections::HashMap;

use pulse_ingest::LeadSignals;

use crate::types::{LeadRecord, LeadTier, MessageEvent};

/// Score added per message before any signal.
const BASE_DELTA: f64 = 1.0;
const TOKEN_MENTION_WEIGHT: f64 = 5.0;
const HYPE_EMOJI_WEIGHT: f64 = 3.0;
const BUY_INTENT_BONUS: f64 = 15.0;

const HOT_THRESHOLD: f64 = 120.0;
const WARM_THRESHOLD: f64 = 60.0;

const VALUE_PER_POINT: f64 = 6.0;
const MIN_LEAD_VALUE: f64 = 50.0;
const MAX_LEAD_VALUE: f64 = 1500.0;

/// Composite ledger key for a `(user, group)` pair.
pub fn lead_key(user_id: &str, group_id: &str) -> String {
    format!("{}::{}", user_id, group_id)
}

/// Score contribution of one message.
pub fn score_delta(signals: &LeadSignals) -> f64 {
    let bonus = if signals.buy_intent {
        BUY_INTENT_BONUS
    } else {
        0.0
    };
    BASE_DELTA
        + TOKEN_MENTION_WEIGHT * f64::from(signals.token_mentions)
        + HYPE_EMOJI_WEIGHT * f64::from(signals.hype_emojis)
        + bonus
}

/// Tier for a score. Lower bounds are inclusive.
pub fn classify_lead(score: f64) -> LeadTier {
    if score >= HOT_THRESHOLD {
        LeadTier::Hot
    } else if score >= WARM_THRESHOLD {
        LeadTier::Warm
    } else {
        LeadTier::Cold
    }
}

/// Estimated monetary potential: `clamp(round(score * 6), 50, 1500)`.
pub fn estimate_lead_value(score: f64) -> u32 {
    (score * VALUE_PER_POINT)
        .round()
        .clamp(MIN_LEAD_VALUE, MAX_LEAD_VALUE) as u32
}

/// All lead records, keyed by [`lead_key`].
#[derive(Debug, Clone, Default)]
pub struct LeadLedger {
    records: HashMap<String, LeadRecord>,
}

impl LeadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records. Keys are taken as stored.
    pub fn from_records(records: HashMap<String, LeadRecord>) -> Self {
        Self { records }
    }

    /// Apply one message's signals to its sender's record and return the
    /// updated record.
    pub fn record(
        &mut self,
        event: &MessageEvent,
        signals: &LeadSignals,
        activity_window_ms: i64,
    ) -> LeadRecord {
        let now = event.timestamp;
        let record = self
            .records
            .entry(lead_key(&event.user_id, &event.group_id))
            .or_insert_with(|| LeadRecord::new(&event.user_id, &event.group_id, now));

        if !event.display_name.is_empty() {
            record.display_name = event.display_name.clone();
        }
        if !event.group_name.is_empty() {
            record.group_name = event.group_name.clone();
        }

        record.score += score_delta(signals);
        record.messages += 1;
        record.token_mentions += u64::from(signals.token_mentions);
        record.hype_emojis += u64::from(signals.hype_emojis);
        if signals.interest {
            record.buy_intent_hits += 1;
        }
        if signals.speculation {
            record.speculation_hits += 1;
        }

        record.first_seen = record.first_seen.min(now);
        record.last_activity = record.last_activity.max(now);

        let since = now.saturating_sub(activity_window_ms);
        record.recent_message_timestamps.retain(|&ts| ts > since);
        record.recent_message_timestamps.push(now);
        record.recent_message_timestamps.sort_unstable();

        record.clone()
    }

    pub fn get(&self, user_id: &str, group_id: &str) -> Option<&LeadRecord> {
        self.records.get(&lead_key(user_id, group_id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &HashMap<String, LeadRecord> {
        &self.records
    }

    /// Remove records inactive for longer than `retention_ms`.
    pub fn evict_expired(&mut self, now: i64, retention_ms: i64) -> usize {
        let before = self.records.len();
        self.records
            .retain(|_, r| now.saturating_sub(r.last_activity) <= retention_ms);
        before - self.records.len()
    }

    /// Drop least recently active records until at most `max_records` remain.
    pub fn evict_overflow(&mut self, max_records: usize) -> usize {
        if self.records.len() <= max_records {
            return 0;
        }

        let mut by_activity: Vec<(String, i64)> = self
            .records
            .iter()
            .map(|(k, r)| (k.clone(), r.last_activity))
            .collect();
        by_activity.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let excess = self.records.len() - max_records;
        for (key, _) in by_activity.into_iter().take(excess) {
            self.records.remove(&key);
        }
        excess
    }

    /// Highest-scoring records, optionally restricted to one group.
    /// Ties go to the more recently active lead.
    pub fn top(&self, limit: usize, group_id: Option<&str>) -> Vec<LeadRecord> {
        let mut leads: Vec<&LeadRecord> = self
            .records
            .values()
            .filter(|r| group_id.map_or(true, |g| r.group_id == g))
            .collect();

        leads.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.last_activity.cmp(&a.last_activity))
                .then_with(|| a.user_id.cmp(&b.user_id))
                .then_with(|| a.group_id.cmp(&b.group_id))
        });

        leads.into_iter().take(limit).cloned().collect()
    }
}
