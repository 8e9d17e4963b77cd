//! Report builder — combines lead ranking, hype detection and group
//! temperature into one immutable value for external renderers.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use pulse_core::{EngineConfig, MINUTE_MS};
use pulse_ingest::vocabulary::STOPWORDS;
use pulse_ingest::{extract_candidates, AliasRegistry, TokenAlias};
use pulse_store::{LeadLedger, LeadView, MessageLog};
use pulse_trends::{rank_tokens, GroupPulse, HypeEntry, MentionWindow};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Headline numbers of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_messages: usize,
    pub active_users: usize,
    pub growth_pct: f64,
    pub messages_per_minute: f64,
}

/// Snapshot of community activity for one scope. Never mutated after it
/// is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Group id, or `None` for all groups.
    pub scope: Option<String>,
    pub generated_at: i64,
    pub summary: ReportSummary,
    pub leads: Vec<LeadView>,
    pub hype: Vec<HypeEntry>,
    pub top_topics: Vec<HypeEntry>,
    pub pulse: GroupPulse,
}

impl Report {
    /// Report over no data.
    pub fn empty(scope: Option<String>, generated_at: i64) -> Self {
        let pulse = GroupPulse::compute(std::iter::empty(), generated_at, 0);
        Self {
            scope,
            generated_at,
            summary: ReportSummary {
                total_messages: 0,
                active_users: 0,
                growth_pct: pulse.trend.growth_pct,
                messages_per_minute: 0.0,
            },
            leads: Vec::new(),
            hype: Vec::new(),
            top_topics: Vec::new(),
            pulse,
        }
    }
}

/// Alias registry wrapper that stops consulting the inner registry after
/// its first failure, so one report sees either the aliases or none.
struct DegradingAliases<'a> {
    inner: &'a dyn AliasRegistry,
    failed: AtomicBool,
}

impl<'a> DegradingAliases<'a> {
    fn new(inner: &'a dyn AliasRegistry) -> Self {
        Self {
            inner,
            failed: AtomicBool::new(false),
        }
    }
}

impl AliasRegistry for DegradingAliases<'_> {
    fn lookup(&self, word: &str) -> pulse_core::Result<Option<TokenAlias>> {
        if self.failed.load(Ordering::Relaxed) {
            return Ok(None);
        }
        match self.inner.lookup(word) {
            Ok(found) => Ok(found),
            Err(e) => {
                warn!("Alias lookup failed, building report without aliases: {}", e);
                self.failed.store(true, Ordering::Relaxed);
                Ok(None)
            }
        }
    }
}

/// Build a report from the current ledger and log.
pub fn build_report(
    ledger: &LeadLedger,
    log: &MessageLog,
    config: &EngineConfig,
    aliases: &dyn AliasRegistry,
    known_tokens: &HashSet<String>,
    scope: Option<&str>,
    now: i64,
) -> Report {
    let since = now.saturating_sub(config.trend_window_ms);

    let participants: HashSet<&str> = log
        .iter()
        .filter(|e| scope.map_or(true, |g| e.group_id == g))
        .map(|e| e.user_id.as_str())
        .collect();

    let pulse = GroupPulse::compute(log.window(since, now, scope), now, participants.len());

    let aliases = DegradingAliases::new(aliases);
    let window = MentionWindow::from_events(log.window(since, now, scope), now, |text| {
        extract_candidates(text, &STOPWORDS, &aliases)
    });
    let ranking = rank_tokens(&window, known_tokens, config.report_topic_limit);

    let leads: Vec<LeadView> = ledger
        .top(usize::MAX, scope)
        .into_iter()
        .filter(|r| now.saturating_sub(r.last_activity) <= config.retention_ms)
        .take(config.report_lead_limit)
        .map(|r| r.view(now, config.activity_window_ms))
        .collect();

    let window_minutes = (config.trend_window_ms / MINUTE_MS).max(1) as f64;
    let summary = ReportSummary {
        total_messages: pulse.total_messages,
        active_users: pulse.active_users,
        growth_pct: pulse.trend.growth_pct,
        messages_per_minute: pulse.total_messages as f64 / window_minutes,
    };

    debug!(
        "Built report for {}: {} messages, {} leads, {} hype tokens",
        scope.unwrap_or("all groups"),
        summary.total_messages,
        leads.len(),
        ranking.hype.len()
    );

    Report {
        scope: scope.map(str::to_string),
        generated_at: now,
        summary,
        leads,
        hype: ranking.hype,
        top_topics: ranking.top_topics,
        pulse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{Error, HOUR_MS};
    use pulse_ingest::{SignalDetector, StaticAliases};
    use pulse_store::MessageEvent;

    const NOW: i64 = 1_700_000_040_000;

    struct BrokenAliases;

    impl AliasRegistry for BrokenAliases {
        fn lookup(&self, _word: &str) -> pulse_core::Result<Option<TokenAlias>> {
            Err(Error::Alias("registry offline".into()))
        }
    }

    fn event(user: &str, group: &str, ts: i64, text: &str) -> MessageEvent {
        MessageEvent {
            timestamp: ts,
            group_id: group.into(),
            group_name: "Grupo".into(),
            user_id: user.into(),
            display_name: user.into(),
            text: text.into(),
        }
    }

    fn fixture(events: &[MessageEvent]) -> (LeadLedger, MessageLog) {
        let config = EngineConfig::default();
        let detector = SignalDetector::new(&config.monitored_tokens, &config.hype_emojis);
        let mut ledger = LeadLedger::new();
        let mut log = MessageLog::new();
        for e in events {
            ledger.record(e, &detector.detect(&e.text), config.activity_window_ms);
            log.push(e.clone());
        }
        (ledger, log)
    }

    fn known() -> HashSet<String> {
        EngineConfig::default().known_tokens.into_iter().collect()
    }

    #[test]
    fn test_report_sections() {
        let events = vec![
            event("u1", "g1", NOW - 2 * HOUR_MS, "NIX vai subir"),
            event("u2", "g1", NOW - 30 * 60_000, "quero comprar NIX 🚀🚀"),
            event("u1", "g1", NOW - 60_000, "NIX NIX"),
            event("u3", "g2", NOW - 60_000, "BTC caiu"),
        ];
        let (ledger, log) = fixture(&events);
        let report = build_report(
            &ledger,
            &log,
            &EngineConfig::default(),
            &StaticAliases::default(),
            &known(),
            Some("g1"),
            NOW,
        );

        assert_eq!(report.scope.as_deref(), Some("g1"));
        assert_eq!(report.summary.total_messages, 3);
        assert_eq!(report.summary.active_users, 2);
        assert_eq!(report.pulse.last_hour_messages, 2);
        assert_eq!(report.leads.len(), 2);
        assert!(report.leads.iter().all(|l| l.record.group_id == "g1"));
        assert_eq!(report.leads[0].record.user_id, "u2");

        let nix = report.top_topics.iter().find(|e| e.token == "NIX").unwrap();
        assert_eq!(nix.total_mentions, 3);
        assert_eq!(nix.last_hour_mentions, 2);
        assert!(report.hype.iter().any(|e| e.token == "NIX"));
        assert!(!report.top_topics.iter().any(|e| e.token == "BTC"));
    }

    #[test]
    fn test_global_scope_includes_all_groups() {
        let events = vec![
            event("u1", "g1", NOW - 60_000, "oi"),
            event("u2", "g2", NOW - 60_000, "BTC"),
        ];
        let (ledger, log) = fixture(&events);
        let report = build_report(
            &ledger,
            &log,
            &EngineConfig::default(),
            &StaticAliases::default(),
            &known(),
            None,
            NOW,
        );
        assert_eq!(report.summary.total_messages, 2);
        assert_eq!(report.leads.len(), 2);
        // BTC is a seed symbol, so a single mention is enough
        assert!(report.top_topics.iter().any(|e| e.token == "BTC"));
    }

    #[test]
    fn test_aliases_resolve_and_degrade() {
        let events = vec![
            event("u1", "g1", NOW - 60_000, "a nixcoin ta voando"),
            event("u2", "g1", NOW - 30_000, "nixcoin demais"),
        ];
        let (ledger, log) = fixture(&events);
        let config = EngineConfig::default();

        let aliases = StaticAliases::new([("nixcoin", "NIX")]);
        let report = build_report(&ledger, &log, &config, &aliases, &known(), None, NOW);
        assert_eq!(report.top_topics.iter().find(|e| e.token == "NIX").unwrap().total_mentions, 2);

        let report = build_report(&ledger, &log, &config, &BrokenAliases, &known(), None, NOW);
        assert!(!report.top_topics.iter().any(|e| e.token == "NIX"));
        assert_eq!(report.summary.total_messages, 2);
    }

    #[test]
    fn test_empty_report() {
        let report = build_report(
            &LeadLedger::new(),
            &MessageLog::new(),
            &EngineConfig::default(),
            &StaticAliases::default(),
            &known(),
            None,
            NOW,
        );
        assert_eq!(report, Report::empty(None, NOW));
    }

    #[test]
    fn test_field_names() {
        let json = serde_json::to_value(Report::empty(Some("g1".into()), NOW)).unwrap();
        assert_eq!(json["generatedAt"], NOW);
        assert!(json["summary"]["messagesPerMinute"].is_number());
        assert!(json["topTopics"].is_array());
        assert_eq!(json["pulse"]["temperature"], "cold");
    }
}
