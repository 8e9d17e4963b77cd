//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::{Error, Result, DAY_MS, HOUR_MS, MINUTE_MS};

/// Token labels whose mentions add to a lead's score.
pub const DEFAULT_MONITORED_TOKENS: &[&str] = &["NIX", "BTC", "ETH", "SOL", "USDT", "BNB"];

/// Seed symbols that stay eligible for topic ranking regardless of volume.
pub const DEFAULT_KNOWN_TOKENS: &[&str] = &[
    "NIX", "BTC", "ETH", "SOL", "USDT", "BNB", "XRP", "DOGE", "PEPE", "TRX",
];

/// Emoji counted as hype signals (raw substring occurrences).
pub const DEFAULT_HYPE_EMOJIS: &[&str] = &["🚀", "🔥", "💰", "💎", "🤑", "📈", "🌕", "💸"];

/// Paths to all pulse data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Engine snapshot (`data/cie-state.json`).
    pub snapshot_file: PathBuf,
    /// Token alias table (`data/aliases.json`).
    pub aliases_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates the root if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            snapshot_file: root.join("cie-state.json"),
            aliases_file: root.join("aliases.json"),
            root,
        })
    }
}

/// Tunables of the intelligence engine. All durations are milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Records and log entries inactive for longer than this are purged.
    pub retention_ms: i64,
    /// Hard cap on the message log (oldest evicted first).
    pub max_messages: usize,
    /// Hard cap on the lead ledger (least recently active evicted first).
    pub max_leads: usize,
    /// Sliding window used for a lead's activity level.
    pub activity_window_ms: i64,
    /// Window covered by the hype / temperature views.
    pub trend_window_ms: i64,
    /// How long a built report is served from cache.
    pub report_cache_ttl_ms: i64,
    /// Number of leads listed in a report.
    pub report_lead_limit: usize,
    /// Number of hype entries and top topics listed in a report.
    pub report_topic_limit: usize,
    /// Periodic snapshot interval.
    pub save_interval_ms: i64,
    /// Quiet period before a deferred save fires.
    pub save_debounce_ms: i64,
    /// If the last save is older than this, an ingestion saves immediately.
    pub save_immediate_after_ms: i64,
    /// Token labels matched (word boundary, case-insensitive) for lead scoring.
    pub monitored_tokens: Vec<String>,
    /// Seed symbols always eligible for the topic views.
    pub known_tokens: Vec<String>,
    /// Emoji counted as hype signals.
    pub hype_emojis: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retention_ms: 7 * DAY_MS,
            max_messages: 20_000,
            max_leads: 5_000,
            activity_window_ms: 3 * MINUTE_MS,
            trend_window_ms: 24 * HOUR_MS,
            report_cache_ttl_ms: 20_000,
            report_lead_limit: 10,
            report_topic_limit: 10,
            save_interval_ms: 60_000,
            save_debounce_ms: 5_000,
            save_immediate_after_ms: 30_000,
            monitored_tokens: to_strings(DEFAULT_MONITORED_TOKENS),
            known_tokens: to_strings(DEFAULT_KNOWN_TOKENS),
            hype_emojis: to_strings(DEFAULT_HYPE_EMOJIS),
        }
    }
}

impl EngineConfig {
    /// Apply `PULSE_*` environment overrides on top of the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(n) = env_parse::<usize>("PULSE_MAX_LEADS") {
            config.max_leads = n;
        }
        if let Some(n) = env_parse::<usize>("PULSE_MAX_MESSAGES") {
            config.max_messages = n;
        }
        if let Ok(raw) = std::env::var("PULSE_MONITORED_TOKENS") {
            let tokens: Vec<String> = raw
                .split(',')
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect();
            if !tokens.is_empty() {
                config.monitored_tokens = tokens;
            }
        }

        config
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("retentionMs", self.retention_ms),
            ("activityWindowMs", self.activity_window_ms),
            ("trendWindowMs", self.trend_window_ms),
            ("saveIntervalMs", self.save_interval_ms),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, ms)| *ms <= 0) {
            return Err(Error::Config(format!("{} must be positive", name)));
        }
        if self.save_debounce_ms < 0 || self.report_cache_ttl_ms < 0 {
            return Err(Error::Config(
                "saveDebounceMs and reportCacheTtlMs must not be negative".into(),
            ));
        }
        if self.max_leads == 0 || self.max_messages == 0 {
            return Err(Error::Config(
                "maxLeads and maxMessages must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Top-level pulse configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Engine tunables.
    pub engine: EngineConfig,
}

impl PulseConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let port = env_parse("PORT").unwrap_or(3010);
        let data_paths = DataPaths::new(data_dir)?;
        let engine = EngineConfig::from_env();
        engine.validate()?;

        Ok(Self {
            port,
            data_paths,
            engine,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
