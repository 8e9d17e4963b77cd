//! Data types for message events, lead records and their derived labels.

use serde::{Deserialize, Serialize};

/// One inbound text message after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub group_id: String,
    #[serde(default)]
    pub group_name: String,
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    pub text: String,
}

/// Sales-interest accumulator for one `(user, group)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub user_id: String,
    pub group_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub group_name: String,
    /// Accumulated score; never negative, never decays in place.
    pub score: f64,
    #[serde(default)]
    pub messages: u64,
    #[serde(default)]
    pub token_mentions: u64,
    #[serde(default)]
    pub hype_emojis: u64,
    #[serde(default)]
    pub buy_intent_hits: u64,
    #[serde(default)]
    pub speculation_hits: u64,
    pub first_seen: i64,
    pub last_activity: i64,
    /// Message timestamps inside the activity window, oldest first.
    #[serde(default)]
    pub recent_message_timestamps: Vec<i64>,
}

impl LeadRecord {
    pub fn new(user_id: &str, group_id: &str, now: i64) -> Self {
        Self {
            user_id: user_id.to_string(),
            group_id: group_id.to_string(),
            display_name: String::new(),
            group_name: String::new(),
            score: 0.0,
            messages: 0,
            token_mentions: 0,
            hype_emojis: 0,
            buy_intent_hits: 0,
            speculation_hits: 0,
            first_seen: now,
            last_activity: now,
            recent_message_timestamps: Vec::new(),
        }
    }

    pub fn tier(&self) -> LeadTier {
        crate::ledger::classify_lead(self.score)
    }

    pub fn estimated_value(&self) -> u32 {
        crate::ledger::estimate_lead_value(self.score)
    }

    /// What kind of interest this lead shows, strongest evidence first.
    pub fn interest_type(&self) -> InterestType {
        if self.buy_intent_hits > 0 {
            InterestType::WantsToBuy
        } else if self.speculation_hits > 0 {
            InterestType::Speculating
        } else if self.hype_emojis > 5 {
            InterestType::StrongBuyer
        } else {
            InterestType::Curious
        }
    }

    /// Activity over the `window_ms` preceding `now`.
    pub fn activity_level(&self, now: i64, window_ms: i64) -> ActivityLevel {
        let since = now.saturating_sub(window_ms);
        let recent = self
            .recent_message_timestamps
            .iter()
            .filter(|&&ts| ts > since && ts <= now)
            .count();
        ActivityLevel::from_recent_count(recent)
    }

    /// Decorate the record with its derived labels at `now`.
    pub fn view(&self, now: i64, activity_window_ms: i64) -> LeadView {
        let tier = self.tier();
        LeadView {
            record: self.clone(),
            tier,
            tier_emoji: tier.emoji().to_string(),
            interest: self.interest_type(),
            activity: self.activity_level(now, activity_window_ms),
            estimated_value: self.estimated_value(),
        }
    }
}

/// Coarse lead bucket by score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadTier {
    Hot,
    Warm,
    Cold,
}

impl LeadTier {
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Hot => "🔥",
            Self::Warm => "🟢",
            Self::Cold => "⚪",
        }
    }
}

impl std::fmt::Display for LeadTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hot => write!(f, "hot"),
            Self::Warm => write!(f, "warm"),
            Self::Cold => write!(f, "cold"),
        }
    }
}

/// Interest classification of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestType {
    WantsToBuy,
    Speculating,
    StrongBuyer,
    Curious,
}

impl InterestType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::WantsToBuy => "wants to buy",
            Self::Speculating => "speculating",
            Self::StrongBuyer => "strong buyer",
            Self::Curious => "curious",
        }
    }
}

/// Message rate over the activity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    VeryActive,
    Active,
    Normal,
    Idle,
}

impl ActivityLevel {
    pub fn from_recent_count(count: usize) -> Self {
        if count >= 20 {
            Self::VeryActive
        } else if count >= 10 {
            Self::Active
        } else if count >= 5 {
            Self::Normal
        } else {
            Self::Idle
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryActive => "very active",
            Self::Active => "active",
            Self::Normal => "normal",
            Self::Idle => "idle",
        }
    }
}

/// A lead record with its derived classification, as handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    #[serde(flatten)]
    pub record: LeadRecord,
    pub tier: LeadTier,
    pub tier_emoji: String,
    pub interest: InterestType,
    pub activity: ActivityLevel,
    pub estimated_value: u32,
}
