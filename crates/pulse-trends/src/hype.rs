//! Hype detection over a [`MentionWindow`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mentions::{MentionWindow, TokenStat};

const STRONG_HYPE_GROWTH: f64 = 50.0;
const MODERATE_HYPE_GROWTH: f64 = 20.0;
const MIN_LEARNED_MENTIONS: u32 = 2;

/// Percent change of the last hour against the hour before it.
/// From a zero baseline any mentions count as 100% growth.
pub fn growth_rate(last_hour: u32, previous_hour: u32) -> f64 {
    if previous_hour == 0 {
        return if last_hour > 0 { 100.0 } else { 0.0 };
    }
    let last = f64::from(last_hour);
    let previous = f64::from(previous_hour);
    (last - previous) / previous * 100.0
}

pub fn engagement_score(total_mentions: u32, growth_rate: f64) -> f64 {
    f64::from(total_mentions) * 0.6 + growth_rate * 0.4
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypeTier {
    StrongHype,
    ModerateHype,
    Stable,
}

impl HypeTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongHype => "strong hype",
            Self::ModerateHype => "moderate hype",
            Self::Stable => "stable",
        }
    }
}

pub fn classify_hype(growth_rate: f64) -> HypeTier {
    if growth_rate >= STRONG_HYPE_GROWTH {
        HypeTier::StrongHype
    } else if growth_rate >= MODERATE_HYPE_GROWTH {
        HypeTier::ModerateHype
    } else {
        HypeTier::Stable
    }
}

/// One ranked token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypeEntry {
    pub token: String,
    pub total_mentions: u32,
    pub last_hour_mentions: u32,
    pub previous_hour_mentions: u32,
    pub growth_rate: f64,
    pub engagement_score: f64,
    pub tier: HypeTier,
}

impl From<&TokenStat> for HypeEntry {
    fn from(stat: &TokenStat) -> Self {
        let growth = stat.growth_rate();
        Self {
            token: stat.token.clone(),
            total_mentions: stat.total_mentions,
            last_hour_mentions: stat.last_hour_mentions(),
            previous_hour_mentions: stat.previous_hour_mentions(),
            growth_rate: growth,
            engagement_score: engagement_score(stat.total_mentions, growth),
            tier: classify_hype(growth),
        }
    }
}

/// Both views of a window: tokens gaining momentum, and tokens by volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypeRanking {
    /// Tokens with at least moderate growth, by engagement score.
    pub hype: Vec<HypeEntry>,
    /// All eligible tokens, by total mentions.
    pub top_topics: Vec<HypeEntry>,
}

/// Rank the eligible tokens of `window`. A token is eligible with at least
/// two mentions, or at any volume if it is in `known_tokens`. Each list is
/// cut to `limit` entries.
pub fn rank_tokens(
    window: &MentionWindow,
    known_tokens: &HashSet<String>,
    limit: usize,
) -> HypeRanking {
    let entries: Vec<HypeEntry> = window
        .stats()
        .filter(|s| s.total_mentions >= MIN_LEARNED_MENTIONS || known_tokens.contains(&s.token))
        .map(HypeEntry::from)
        .collect();

    let mut hype: Vec<HypeEntry> = entries
        .iter()
        .filter(|e| e.growth_rate >= MODERATE_HYPE_GROWTH)
        .cloned()
        .collect();
    hype.sort_by(|a, b| {
        b.engagement_score
            .total_cmp(&a.engagement_score)
            .then_with(|| b.total_mentions.cmp(&a.total_mentions))
            .then_with(|| a.token.cmp(&b.token))
    });
    debug!(
        "Ranked {} of {} tokens: {} gaining momentum",
        entries.len(),
        window.len(),
        hype.len()
    );
    hype.truncate(limit);

    let mut top_topics = entries;
    top_topics.sort_by(|a, b| {
        b.total_mentions
            .cmp(&a.total_mentions)
            .then_with(|| b.engagement_score.total_cmp(&a.engagement_score))
            .then_with(|| a.token.cmp(&b.token))
    });
    top_topics.truncate(limit);

    HypeRanking { hype, top_topics }
}
