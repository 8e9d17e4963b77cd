//! Windowed mention store — per-token hourly buckets over a rolling day.
//!
//! Rebuilt from the message log for every report; nothing here is
//! persisted. Bucket 0 is the hour ending at `now`, bucket 1 the hour
//! before it, and so on up to bucket 23.

use std::collections::{HashMap, HashSet};

use pulse_core::HOUR_MS;
use pulse_store::MessageEvent;
use serde::{Deserialize, Serialize};

/// Number of hourly buckets in the window.
pub const WINDOW_HOURS: usize = 24;

/// Mention counts for one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStat {
    pub token: String,
    pub total_mentions: u32,
    pub hourly_mentions: [u32; WINDOW_HOURS],
}

impl TokenStat {
    fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            total_mentions: 0,
            hourly_mentions: [0; WINDOW_HOURS],
        }
    }

    pub fn last_hour_mentions(&self) -> u32 {
        self.hourly_mentions[0]
    }

    pub fn previous_hour_mentions(&self) -> u32 {
        self.hourly_mentions[1]
    }

    pub fn growth_rate(&self) -> f64 {
        crate::hype::growth_rate(self.last_hour_mentions(), self.previous_hour_mentions())
    }
}

/// Token statistics for the 24 hours ending at `now`.
#[derive(Debug, Clone)]
pub struct MentionWindow {
    now: i64,
    stats: HashMap<String, TokenStat>,
}

impl MentionWindow {
    pub fn new(now: i64) -> Self {
        Self {
            now,
            stats: HashMap::new(),
        }
    }

    /// Build from events, extracting candidates per message. Each message
    /// counts at most once per distinct candidate.
    pub fn from_events<'a, I, F>(events: I, now: i64, mut extract: F) -> Self
    where
        I: IntoIterator<Item = &'a MessageEvent>,
        F: FnMut(&str) -> Vec<String>,
    {
        let mut window = Self::new(now);
        for event in events {
            let mut seen = HashSet::new();
            for candidate in extract(&event.text) {
                if seen.insert(candidate.clone()) {
                    window.record(&candidate, event.timestamp);
                }
            }
        }
        window
    }

    /// Hour offset of `timestamp` relative to `now`, if inside the window.
    pub fn bucket_of(&self, timestamp: i64) -> Option<usize> {
        if timestamp > self.now {
            return None;
        }
        let offset = (self.now.saturating_sub(timestamp) / HOUR_MS) as usize;
        (offset < WINDOW_HOURS).then_some(offset)
    }

    /// Count one mention. Returns `false` if the timestamp is outside the window.
    pub fn record(&mut self, token: &str, timestamp: i64) -> bool {
        let Some(bucket) = self.bucket_of(timestamp) else {
            return false;
        };
        let stat = self
            .stats
            .entry(token.to_string())
            .or_insert_with(|| TokenStat::new(token));
        stat.hourly_mentions[bucket] += 1;
        stat.total_mentions += 1;
        true
    }

    pub fn now(&self) -> i64 {
        self.now
    }

    pub fn get(&self, token: &str) -> Option<&TokenStat> {
        self.stats.get(token)
    }

    pub fn stats(&self) -> impl Iterator<Item = &TokenStat> {
        self.stats.values()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
