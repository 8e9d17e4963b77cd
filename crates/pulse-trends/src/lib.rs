//! Pulse Trends — hourly mention windows, hype ranking, group temperature
//! and top-words over the message log.

pub mod hype;
pub mod mentions;
pub mod temperature;
pub mod words;

pub use hype::{
    classify_hype, engagement_score, growth_rate, rank_tokens, HypeEntry, HypeRanking, HypeTier,
};
pub use mentions::{MentionWindow, TokenStat, WINDOW_HOURS};
pub use temperature::{
    classify_temperature, classify_trend, energy_score, EnergyLabel, EnergyScore, GroupPulse,
    GroupTemperature, Trend, TrendSignal,
};
pub use words::{top_words, WordCount};
