//! Group temperature, momentum trend and energy score.

use std::collections::HashSet;

use pulse_core::HOUR_MS;
use pulse_store::MessageEvent;
use serde::{Deserialize, Serialize};

const HOT_MESSAGES: usize = 400;
const WARM_MESSAGES: usize = 150;

const ACCELERATING_RATIO: f64 = 1.25;
const STABLE_RATIO: f64 = 0.85;

/// Message volume at which the volume signal saturates.
const VOLUME_CEILING: f64 = 400.0;
const GROWTH_FLOOR_PCT: f64 = -20.0;
const GROWTH_CEILING_PCT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupTemperature {
    Hot,
    Warm,
    Cold,
}

/// Temperature from the number of messages in the last 24 hours.
pub fn classify_temperature(total_messages: usize) -> GroupTemperature {
    if total_messages > HOT_MESSAGES {
        GroupTemperature::Hot
    } else if total_messages >= WARM_MESSAGES {
        GroupTemperature::Warm
    } else {
        GroupTemperature::Cold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Accelerating,
    Stable,
    LosingMomentum,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accelerating => "accelerating",
            Self::Stable => "stable",
            Self::LosingMomentum => "losing momentum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSignal {
    pub trend: Trend,
    /// Last hour against the hourly average of the day.
    pub ratio: f64,
    pub growth_pct: f64,
}

/// Compare the last hour with the 24h hourly average.
pub fn classify_trend(last_hour: usize, total_24h: usize) -> TrendSignal {
    let average = total_24h as f64 / 24.0;
    let ratio = if average > 0.0 {
        last_hour as f64 / average
    } else {
        0.0
    };

    let trend = if ratio > ACCELERATING_RATIO {
        Trend::Accelerating
    } else if ratio >= STABLE_RATIO {
        Trend::Stable
    } else {
        Trend::LosingMomentum
    };

    TrendSignal {
        trend,
        ratio,
        growth_pct: (ratio - 1.0) * 100.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLabel {
    Weak,
    Moderate,
    Strong,
    Explosive,
}

impl EnergyLabel {
    fn from_percent(percent: u32) -> Self {
        if percent < 30 {
            Self::Weak
        } else if percent < 60 {
            Self::Moderate
        } else if percent < 80 {
            Self::Strong
        } else {
            Self::Explosive
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyScore {
    pub percent: u32,
    pub label: EnergyLabel,
}

/// Blend of participation, volume and growth, as a percentage.
///
/// `participants` is the number of distinct users seen for the scope; the
/// active-user ratio is `active_users / participants`, capped at one.
pub fn energy_score(
    active_users: usize,
    participants: usize,
    total_messages: usize,
    growth_pct: f64,
) -> EnergyScore {
    let participation = if participants == 0 {
        0.0
    } else {
        (active_users as f64 / participants as f64).min(1.0)
    };
    let volume = (total_messages as f64 / VOLUME_CEILING).min(1.0);
    let growth = ((growth_pct - GROWTH_FLOOR_PCT) / (GROWTH_CEILING_PCT - GROWTH_FLOOR_PCT))
        .clamp(0.0, 1.0);

    let blended = 0.4 * participation + 0.4 * volume + 0.2 * growth;
    let percent = (blended * 100.0).round() as u32;
    EnergyScore {
        percent,
        label: EnergyLabel::from_percent(percent),
    }
}

/// Activity summary for one scope over the 24 hours ending at `generated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPulse {
    pub total_messages: usize,
    pub active_users: usize,
    pub last_hour_messages: usize,
    pub temperature: GroupTemperature,
    pub trend: TrendSignal,
    pub energy: EnergyScore,
}

impl GroupPulse {
    /// `day` must hold the scope's events of the last 24 hours; `participants`
    /// is the distinct-user count over the whole retained log for the scope.
    pub fn compute<'a, I>(day: I, now: i64, participants: usize) -> Self
    where
        I: IntoIterator<Item = &'a MessageEvent>,
    {
        let hour_start = now.saturating_sub(HOUR_MS);
        let mut users = HashSet::new();
        let mut total_messages = 0;
        let mut last_hour_messages = 0;
        for event in day {
            total_messages += 1;
            if event.timestamp > hour_start {
                last_hour_messages += 1;
            }
            users.insert(event.user_id.as_str());
        }

        let active_users = users.len();
        let trend = classify_trend(last_hour_messages, total_messages);
        Self {
            total_messages,
            active_users,
            last_hour_messages,
            temperature: classify_temperature(total_messages),
            trend,
            energy: energy_score(active_users, participants, total_messages, trend.growth_pct),
        }
    }
}
