//! Engine — the single owner of the lead ledger and message log.
//!
//! Every mutation goes through [`Engine::ingest`], which applies one message
//! and its cleanup pass under the state write lock. Reads take the read
//! lock. Snapshots are copied under the read lock and written outside it.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use pulse_core::EngineConfig;
use pulse_ingest::{AliasRegistry, MessageEnvelope, SignalDetector};
use pulse_store::{
    LeadLedger, LeadRecord, LeadView, MessageEvent, MessageLog, Snapshot, SnapshotStore,
};
use pulse_trends::{top_words, WordCount};
use serde::Serialize;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::cache::{state_fingerprint, ReportCache};
use crate::lifecycle::run_cleanup;
use crate::persistence::{SaveDecision, SaveScheduler};
use crate::report::{self, Report};

/// Longest a shutdown flush waits for a lock before giving up.
const FLUSH_LOCK_WAIT: Duration = Duration::from_millis(500);

/// Report scopes kept in cache at once.
const REPORT_CACHE_SCOPES: usize = 64;

struct EngineState {
    ledger: LeadLedger,
    log: MessageLog,
    /// Messages ingested since the engine was opened.
    ingested: u64,
    last_event_at: Option<i64>,
}

impl EngineState {
    fn snapshot(&self, now: i64) -> Snapshot {
        Snapshot::new(now, self.ledger.records().clone(), self.log.to_vec())
    }
}

/// Host-facing counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub leads: usize,
    pub messages: usize,
    pub ingested: u64,
    pub last_event_at: Option<i64>,
    pub last_saved_at: Option<i64>,
    pub save_pending: bool,
    /// Milliseconds until the pending save is due; zero or less if overdue.
    pub save_due_in_ms: Option<i64>,
    pub cached_reports: usize,
}

/// Community intelligence engine.
pub struct Engine {
    config: EngineConfig,
    detector: SignalDetector,
    known_tokens: HashSet<String>,
    /// Monitored token labels, lowercase, counted by the top-words view.
    token_terms: HashSet<String>,
    aliases: Arc<dyn AliasRegistry>,
    store: Arc<dyn SnapshotStore>,
    state: RwLock<EngineState>,
    scheduler: Mutex<SaveScheduler>,
    save_lock: Mutex<()>,
    reports: ReportCache,
    save_wake: Notify,
}

impl Engine {
    /// Load the latest snapshot from `store` and purge whatever expired
    /// while the process was down. An unreadable snapshot starts the engine
    /// empty.
    pub fn open(
        config: EngineConfig,
        store: Arc<dyn SnapshotStore>,
        aliases: Arc<dyn AliasRegistry>,
        now: i64,
    ) -> Self {
        let (ledger, log) = match store.load() {
            Ok(Some(snapshot)) => (
                LeadLedger::from_records(snapshot.leads),
                MessageLog::from_events(snapshot.messages),
            ),
            Ok(None) => {
                info!("No snapshot found, starting empty");
                (LeadLedger::new(), MessageLog::new())
            }
            Err(e) => {
                warn!("Discarding unreadable snapshot, starting empty: {}", e);
                (LeadLedger::new(), MessageLog::new())
            }
        };

        let mut state = EngineState {
            last_event_at: log.last_timestamp(),
            ledger,
            log,
            ingested: 0,
        };
        let cleanup = run_cleanup(&mut state.ledger, &mut state.log, &config, now);

        info!(
            "Engine ready: {} leads, {} messages (startup cleanup removed {} messages, {} leads)",
            state.ledger.len(),
            state.log.len(),
            cleanup.expired_messages + cleanup.overflow_messages,
            cleanup.expired_leads + cleanup.overflow_leads
        );

        Self {
            detector: SignalDetector::new(&config.monitored_tokens, &config.hype_emojis),
            known_tokens: config.known_tokens.iter().map(|t| t.to_uppercase()).collect(),
            token_terms: config
                .monitored_tokens
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            scheduler: Mutex::new(SaveScheduler::new(
                config.save_debounce_ms,
                config.save_immediate_after_ms,
            )),
            reports: ReportCache::new(REPORT_CACHE_SCOPES, config.report_cache_ttl_ms),
            config,
            aliases,
            store,
            state: RwLock::new(state),
            save_lock: Mutex::new(()),
            save_wake: Notify::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply one inbound message. Returns the sender's updated lead record,
    /// or `None` when the envelope carries no usable text or identity, or
    /// was sent by the connected account.
    pub fn ingest(
        &self,
        envelope: &MessageEnvelope,
        group_id: &str,
        group_name: &str,
        now: i64,
    ) -> Option<LeadRecord> {
        let group_id = group_id.trim();
        if group_id.is_empty() {
            return None;
        }
        let message = envelope.normalize()?;
        let signals = self.detector.detect(&message.text);

        let event = MessageEvent {
            timestamp: now,
            group_id: group_id.to_string(),
            group_name: group_name.trim().to_string(),
            user_id: message.user_id,
            display_name: message.display_name,
            text: message.text,
        };

        let record = {
            let mut state = self.state.write();
            let record = state
                .ledger
                .record(&event, &signals, self.config.activity_window_ms);
            state.log.push(event);
            state.ingested += 1;
            state.last_event_at = Some(state.last_event_at.map_or(now, |t| t.max(now)));

            let state = &mut *state;
            let cleanup = run_cleanup(&mut state.ledger, &mut state.log, &self.config, now);
            if !cleanup.is_empty() {
                debug!("Cleanup after ingest: {:?}", cleanup);
            }
            record
        };

        debug!(
            "Ingested message from {} in {}: score={} signals={:?}",
            record.user_id, record.group_id, record.score, signals
        );

        self.request_save(now);
        Some(record)
    }

    /// Schedule a snapshot save for a state change at `now`.
    pub fn request_save(&self, now: i64) {
        let decision = self.scheduler.lock().request(now);
        match decision {
            SaveDecision::Coalesced => {}
            SaveDecision::Immediate | SaveDecision::Deferred { .. } => {
                debug!("Save requested: {:?}", decision);
                self.save_wake.notify_one();
            }
        }
    }

    /// Resolves when an ingestion scheduled a save.
    pub async fn save_requested(&self) {
        self.save_wake.notified().await
    }

    /// Time at which a requested save becomes due, if one is pending.
    pub fn next_save_due(&self) -> Option<i64> {
        self.scheduler.lock().due_at()
    }

    /// Highest-scoring leads across all groups, skipping records already
    /// past retention.
    pub fn get_top_leads(&self, limit: usize, now: i64) -> Vec<LeadRecord> {
        self.top_leads(limit, None, now)
    }

    /// Like [`Self::get_top_leads`], optionally for one group, decorated
    /// with tier, interest and activity at `now`.
    pub fn top_lead_views(&self, limit: usize, group_id: Option<&str>, now: i64) -> Vec<LeadView> {
        self.top_leads(limit, group_id, now)
            .iter()
            .map(|r| r.view(now, self.config.activity_window_ms))
            .collect()
    }

    fn top_leads(&self, limit: usize, group_id: Option<&str>, now: i64) -> Vec<LeadRecord> {
        let retention = self.config.retention_ms;
        self.state
            .read()
            .ledger
            .top(usize::MAX, group_id)
            .into_iter()
            .filter(|r| now.saturating_sub(r.last_activity) <= retention)
            .take(limit)
            .collect()
    }

    /// Most frequent relevant words over the trend window ending at `now`.
    pub fn get_top_words(&self, group_id: Option<&str>, now: i64, limit: usize) -> Vec<WordCount> {
        let since = now.saturating_sub(self.config.trend_window_ms);
        let state = self.state.read();
        top_words(state.log.window(since, now, group_id), &self.token_terms, limit)
    }

    /// Report for `group_id` (all groups if `None`). Repeated calls with no
    /// new messages inside the cache TTL return the same report.
    pub fn build_report(&self, group_id: Option<&str>, now: i64) -> Arc<Report> {
        let (ledger, log, fingerprint) = {
            let state = self.state.read();
            let fingerprint = state_fingerprint(state.ingested, state.last_event_at);
            if let Some(cached) = self.reports.get(group_id, &fingerprint, now) {
                debug!("Report cache hit for {}", group_id.unwrap_or("all groups"));
                return cached;
            }

            let in_scope = |g: &str| group_id.map_or(true, |scope| scope == g);
            let leads = state
                .ledger
                .records()
                .iter()
                .filter(|(_, r)| in_scope(&r.group_id))
                .map(|(k, r)| (k.clone(), r.clone()))
                .collect();
            let events = state
                .log
                .iter()
                .filter(|e| in_scope(&e.group_id))
                .cloned()
                .collect();
            (
                LeadLedger::from_records(leads),
                MessageLog::from_events(events),
                fingerprint,
            )
        };

        let built = Arc::new(report::build_report(
            &ledger,
            &log,
            &self.config,
            self.aliases.as_ref(),
            &self.known_tokens,
            group_id,
            now,
        ));
        self.reports
            .put(group_id, fingerprint, Arc::clone(&built), now);
        built
    }

    /// Copy of the current state.
    pub fn snapshot(&self, now: i64) -> Snapshot {
        self.state.read().snapshot(now)
    }

    /// Periodic cleanup pass.
    pub fn sweep(&self, now: i64) {
        let cleanup = {
            let mut state = self.state.write();
            let state = &mut *state;
            run_cleanup(&mut state.ledger, &mut state.log, &self.config, now)
        };
        if !cleanup.is_empty() {
            info!(
                "Sweep complete: messages expired={}, overflow={}; leads expired={}, overflow={}",
                cleanup.expired_messages,
                cleanup.overflow_messages,
                cleanup.expired_leads,
                cleanup.overflow_leads
            );
        }
    }

    /// Save a pending deferred save once it is due.
    pub fn save_if_due(&self, now: i64) -> bool {
        if !self.scheduler.lock().is_due(now) {
            return false;
        }
        self.save_now(now)
    }

    /// Write a snapshot now. Store errors are logged and reported as `false`.
    pub fn save_now(&self, now: i64) -> bool {
        let _guard = self.save_lock.lock();
        let sequence = self.scheduler.lock().sequence();
        let snapshot = self.snapshot(now);
        self.write_snapshot(&snapshot, sequence, now)
    }

    fn write_snapshot(&self, snapshot: &Snapshot, sequence: u64, now: i64) -> bool {
        let saved = match self.store.save(snapshot) {
            Ok(()) => {
                debug!(
                    "Snapshot saved: {} leads, {} messages",
                    snapshot.leads.len(),
                    snapshot.messages.len()
                );
                true
            }
            Err(e) => {
                warn!("Snapshot save failed, skipping this cycle: {}", e);
                false
            }
        };
        self.scheduler.lock().finish(now, sequence, saved);
        saved
    }

    /// Best-effort final save for shutdown paths. Waits a bounded time for
    /// the locks, never panics.
    pub fn flush(&self, now: i64) -> bool {
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let Some(_guard) = self.save_lock.try_lock_for(FLUSH_LOCK_WAIT) else {
                warn!("Flush skipped: a save is still in progress");
                return false;
            };
            let sequence = match self.scheduler.try_lock_for(FLUSH_LOCK_WAIT) {
                Some(scheduler) => scheduler.sequence(),
                None => {
                    warn!("Flush skipped: scheduler busy");
                    return false;
                }
            };
            let snapshot = match self.state.try_read_for(FLUSH_LOCK_WAIT) {
                Some(state) => state.snapshot(now),
                None => {
                    warn!("Flush skipped: state busy");
                    return false;
                }
            };
            let saved = self.write_snapshot(&snapshot, sequence, now);
            if saved {
                info!(
                    "Flushed snapshot: {} leads, {} messages",
                    snapshot.leads.len(),
                    snapshot.messages.len()
                );
            }
            saved
        }));

        result.unwrap_or_else(|_| {
            warn!("Flush aborted by a panic");
            false
        })
    }

    pub fn stats(&self, now: i64) -> EngineStats {
        let (leads, messages, ingested, last_event_at) = {
            let state = self.state.read();
            (
                state.ledger.len(),
                state.log.len(),
                state.ingested,
                state.last_event_at,
            )
        };
        let scheduler = self.scheduler.lock();
        EngineStats {
            leads,
            messages,
            ingested,
            last_event_at,
            last_saved_at: scheduler.last_saved_at(),
            save_pending: scheduler.due_at().is_some(),
            save_due_in_ms: scheduler.due_at().map(|due| due.saturating_sub(now)),
            cached_reports: self.reports.scopes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{Error, DAY_MS, HOUR_MS};
    use pulse_ingest::{MediaMessage, MessageBody, MessageKey, StaticAliases};
    use pulse_store::{JsonFileStore, MemorySnapshotStore};

    const T0: i64 = 1_700_000_040_000;

    fn engine_with(store: Arc<dyn SnapshotStore>, now: i64) -> Engine {
        Engine::open(
            EngineConfig::default(),
            store,
            Arc::new(StaticAliases::default()),
            now,
        )
    }

    fn engine() -> Engine {
        engine_with(Arc::new(MemorySnapshotStore::new()), T0)
    }

    fn text(user: &str, body: &str) -> MessageEnvelope {
        MessageEnvelope::text(user, &user.to_uppercase(), body)
    }

    struct FailingStore;

    impl SnapshotStore for FailingStore {
        fn load(&self) -> pulse_core::Result<Option<Snapshot>> {
            Err(Error::Storage("disk gone".into()))
        }

        fn save(&self, _snapshot: &Snapshot) -> pulse_core::Result<()> {
            Err(Error::Storage("disk gone".into()))
        }
    }

    #[test]
    fn test_blank_text_is_dropped() {
        let engine = engine();
        for body in ["", "   ", "\n\t"] {
            assert!(engine.ingest(&text("u1", body), "g1", "Grupo", T0).is_none());
        }
        let no_content = MessageEnvelope {
            key: MessageKey {
                remote_jid: None,
                participant: Some("u1".into()),
                from_me: false,
            },
            push_name: None,
            message: None,
        };
        assert!(engine.ingest(&no_content, "g1", "Grupo", T0).is_none());
        let mut own = text("u1", "NIX");
        own.key.from_me = true;
        assert!(engine.ingest(&own, "g1", "Grupo", T0).is_none());
        assert!(engine.ingest(&text("u1", "oi"), "  ", "Grupo", T0).is_none());

        let stats = engine.stats(T0);
        assert_eq!(stats.leads, 0);
        assert_eq!(stats.messages, 0);
        assert!(!stats.save_pending);
    }

    #[test]
    fn test_scenario_buy_intent_message() {
        let engine = engine();
        let first = engine
            .ingest(&text("u1", "NIX subindo"), "g1", "Grupo", T0)
            .unwrap();
        assert_eq!(first.score, 6.0);

        let plain = engine
            .ingest(&text("u2", "alguém viu o NIX?"), "g1", "Grupo", T0 + 60_000)
            .unwrap();
        assert_eq!(plain.score, 6.0);
        assert_eq!(plain.buy_intent_hits, 0);

        // 1 + 5*1 + 3*2 + 15 on top of the earlier message
        let record = engine
            .ingest(&text("u2", "quero comprar NIX 🚀🚀"), "g1", "Grupo", T0 + 120_000)
            .unwrap();
        assert_eq!(record.score - plain.score, 27.0);
        assert_eq!(record.score, 33.0);
        assert_eq!(record.messages, 2);
        assert_eq!(record.token_mentions, 2);
        assert_eq!(record.buy_intent_hits, 1);
        assert_eq!(record.hype_emojis, 2);
        assert_eq!(record.display_name, "U2");
        assert_eq!(record.group_name, "Grupo");

        let stats = engine.stats(T0 + 120_000);
        assert_eq!(stats.leads, 2);
        assert_eq!(stats.messages, 3);
        assert_eq!(engine.get_top_leads(1, T0 + 120_000)[0].user_id, "u2");
    }

    #[test]
    fn test_score_never_decreases() {
        let engine = engine();
        let mut last = 0.0;
        for (i, body) in ["oi", "NIX", "blz", "🚀", "ok"].iter().enumerate() {
            let record = engine
                .ingest(&text("u1", body), "g1", "Grupo", T0 + i as i64 * 1_000)
                .unwrap();
            assert!(record.score >= last);
            last = record.score;
        }
    }

    #[test]
    fn test_wrapped_envelope_is_ingested() {
        let engine = engine();
        let json = r#"{
            "key": { "remoteJid": "g1@g.us", "participant": "u9" },
            "pushName": "Bia",
            "message": { "ephemeralMessage": { "message": { "extendedTextMessage": { "text": "NIX" } } } }
        }"#;
        let envelope: MessageEnvelope = serde_json::from_str(json).unwrap();
        let record = engine.ingest(&envelope, "g1", "", T0).unwrap();
        assert_eq!(record.user_id, "u9");
        assert_eq!(record.display_name, "Bia");
        assert_eq!(record.token_mentions, 1);

        let image = MessageEnvelope {
            message: Some(MessageBody {
                image_message: Some(MediaMessage {
                    caption: Some("olha o grafico".into()),
                }),
                ..MessageBody::default()
            }),
            ..envelope
        };
        assert!(engine.ingest(&image, "g1", "", T0 + 1).is_some());
    }

    #[test]
    fn test_top_leads_sorted_and_limited() {
        let engine = engine();
        engine.ingest(&text("u1", "oi"), "g1", "Grupo", T0);
        engine.ingest(&text("u2", "NIX NIX"), "g1", "Grupo", T0);
        engine.ingest(&text("u3", "NIX"), "g2", "Outro", T0);

        let top = engine.get_top_leads(2, T0);
        let users: Vec<&str> = top.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(users, vec!["u2", "u3"]);

        let g2 = engine.top_lead_views(10, Some("g2"), T0);
        assert_eq!(g2.len(), 1);
        assert_eq!(g2[0].record.user_id, "u3");
        assert_eq!(g2[0].estimated_value, 50);

        // past retention but not yet swept
        assert!(engine.get_top_leads(10, T0 + 8 * DAY_MS).is_empty());
    }

    #[test]
    fn test_top_words_scoped() {
        let engine = engine();
        engine.ingest(&text("u1", "NIX na dex"), "g1", "Grupo", T0);
        engine.ingest(&text("u2", "nix nix"), "g1", "Grupo", T0 + 1);
        engine.ingest(&text("u3", "liquidez"), "g2", "Outro", T0 + 2);

        let g1 = engine.get_top_words(Some("g1"), T0 + 10, 10);
        assert_eq!(g1[0], WordCount { word: "nix".into(), count: 3 });
        assert!(!g1.iter().any(|w| w.word == "liquidez"));

        let all = engine.get_top_words(None, T0 + 10, 10);
        assert!(all.iter().any(|w| w.word == "liquidez"));

        assert!(engine.get_top_words(None, T0 + 2 * DAY_MS, 10).is_empty());
    }

    #[test]
    fn test_report_cache_serves_identical_report() {
        let engine = engine();
        engine.ingest(&text("u1", "NIX 🚀"), "g1", "Grupo", T0);
        engine.ingest(&text("u2", "quero comprar NIX"), "g1", "Grupo", T0 + 1_000);

        let first = engine.build_report(Some("g1"), T0 + 2_000);
        let second = engine.build_report(Some("g1"), T0 + 6_000);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            serde_json::to_vec(first.as_ref()).unwrap(),
            serde_json::to_vec(second.as_ref()).unwrap()
        );

        engine.ingest(&text("u3", "oi"), "g1", "Grupo", T0 + 7_000);
        let third = engine.build_report(Some("g1"), T0 + 8_000);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.summary.total_messages, 3);
        assert_eq!(third.generated_at, T0 + 8_000);
    }

    #[test]
    fn test_report_cache_holds_across_minute_boundary() {
        let engine = engine();
        engine.ingest(&text("u1", "NIX 🚀"), "g1", "Grupo", T0);

        let first = engine.build_report(Some("g1"), T0 + 58_000);
        let second = engine.build_report(Some("g1"), T0 + 61_000);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            serde_json::to_vec(first.as_ref()).unwrap(),
            serde_json::to_vec(second.as_ref()).unwrap()
        );
    }

    #[test]
    fn test_extreme_timestamps_do_not_panic() {
        let engine = engine();
        assert!(engine
            .ingest(&text("u1", "NIX"), "g1", "Grupo", i64::MIN + 1)
            .is_some());
        assert!(engine
            .ingest(&text("u2", "NIX"), "g1", "Grupo", i64::MAX)
            .is_some());

        engine.build_report(None, i64::MIN + 1);
        engine.get_top_words(None, i64::MIN + 1, 10);
        engine.get_top_leads(10, i64::MIN + 1);
        engine.sweep(i64::MAX);
        assert_eq!(engine.stats(i64::MAX).leads, 1);
    }

    #[test]
    fn test_report_cache_expires() {
        let engine = engine();
        engine.ingest(&text("u1", "NIX"), "g1", "Grupo", T0);
        let first = engine.build_report(None, T0 + 1_000);
        let later = engine.build_report(None, T0 + 25_000);
        assert!(!Arc::ptr_eq(&first, &later));
    }

    #[test]
    fn test_persistence_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cie-state.json");

        let engine = engine_with(Arc::new(JsonFileStore::new(&path)), T0);
        engine.ingest(&text("u1", "quero comprar NIX 🚀🚀"), "g1", "Grupo", T0);
        engine.ingest(&text("u2", "NIX"), "g2", "Outro", T0 + 1_000);
        assert!(engine.save_now(T0 + 2_000));
        let before = engine.get_top_leads(10, T0 + 2_000);

        let reopened = engine_with(Arc::new(JsonFileStore::new(&path)), T0 + HOUR_MS);
        let after = reopened.get_top_leads(10, T0 + HOUR_MS);
        assert_eq!(before, after);
        assert_eq!(reopened.stats(T0 + HOUR_MS).messages, 2);
        assert_eq!(reopened.stats(T0 + HOUR_MS).last_event_at, Some(T0 + 1_000));
    }

    #[test]
    fn test_startup_cleanup_purges_stale_state() {
        let store = Arc::new(MemorySnapshotStore::new());
        let engine = engine_with(store.clone(), T0);
        engine.ingest(&text("old", "oi"), "g1", "Grupo", T0);
        engine.ingest(&text("recent", "oi"), "g1", "Grupo", T0 + 2 * DAY_MS);
        assert!(engine.save_now(T0 + 2 * DAY_MS));

        let reopened = engine_with(store, T0 + 8 * DAY_MS);
        let leads = reopened.get_top_leads(10, T0 + 8 * DAY_MS);
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].user_id, "recent");
        assert_eq!(reopened.stats(T0 + 8 * DAY_MS).messages, 1);
    }

    #[test]
    fn test_corrupt_snapshot_starts_empty() {
        let store = Arc::new(MemorySnapshotStore::with_raw("{ not json"));
        let engine = engine_with(store, T0);
        assert_eq!(engine.stats(T0).leads, 0);
        assert!(engine.ingest(&text("u1", "oi"), "g1", "Grupo", T0).is_some());
    }

    #[test]
    fn test_store_failures_never_reach_ingest() {
        let engine = engine_with(Arc::new(FailingStore), T0);
        assert!(engine.ingest(&text("u1", "oi"), "g1", "Grupo", T0).is_some());
        assert!(!engine.save_now(T0));
        assert!(!engine.flush(T0));
        assert!(engine.ingest(&text("u1", "oi"), "g1", "Grupo", T0 + 1).is_some());
        assert_eq!(engine.stats(T0 + 1).last_saved_at, None);
    }

    #[test]
    fn test_capacity_bounds_hold_under_ingestion() {
        let config = EngineConfig {
            max_leads: 3,
            max_messages: 5,
            ..EngineConfig::default()
        };
        let engine = Engine::open(
            config,
            Arc::new(MemorySnapshotStore::new()),
            Arc::new(StaticAliases::default()),
            T0,
        );
        for i in 0..20 {
            let user = format!("u{}", i);
            engine.ingest(&text(&user, "oi"), "g1", "Grupo", T0 + i);
        }
        let stats = engine.stats(T0 + 20);
        assert_eq!(stats.leads, 3);
        assert_eq!(stats.messages, 5);
        assert_eq!(stats.ingested, 20);

        let users: Vec<String> = engine
            .get_top_leads(10, T0 + 20)
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        assert_eq!(users, vec!["u19", "u18", "u17"]);
    }

    #[test]
    fn test_save_scheduling_on_ingest() {
        let engine = engine();
        engine.ingest(&text("u1", "oi"), "g1", "Grupo", T0);
        assert_eq!(engine.next_save_due(), Some(T0));
        assert!(engine.save_if_due(T0));
        assert_eq!(engine.next_save_due(), None);

        engine.ingest(&text("u1", "oi"), "g1", "Grupo", T0 + 1_000);
        assert_eq!(engine.next_save_due(), Some(T0 + 6_000));
        assert_eq!(engine.stats(T0 + 2_000).save_due_in_ms, Some(4_000));
        assert!(!engine.save_if_due(T0 + 5_999));
        assert!(engine.save_if_due(T0 + 6_000));
        assert_eq!(engine.stats(T0 + 6_000).last_saved_at, Some(T0 + 6_000));
    }
}
