//! Snapshot persistence: debounce decisions, the background worker that
//! performs periodic and deferred saves, and the flush-on-drop guard.

use std::sync::Arc;
use std::time::Duration;

use pulse_core::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::engine::Engine;

/// Outcome of a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    /// The last save is stale; save as soon as possible.
    Immediate,
    /// Save after the quiet period, at `due_at`.
    Deferred { due_at: i64 },
    /// A save is already scheduled and will cover this request.
    Coalesced,
}

/// Debounce state for snapshot saves. Pure bookkeeping; the caller performs
/// the write and reports back.
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    debounce_ms: i64,
    immediate_after_ms: i64,
    last_attempt_at: Option<i64>,
    last_saved_at: Option<i64>,
    due_at: Option<i64>,
    requests: u64,
}

impl SaveScheduler {
    pub fn new(debounce_ms: i64, immediate_after_ms: i64) -> Self {
        Self {
            debounce_ms,
            immediate_after_ms,
            last_attempt_at: None,
            last_saved_at: None,
            due_at: None,
            requests: 0,
        }
    }

    /// Register that state changed at `now`.
    pub fn request(&mut self, now: i64) -> SaveDecision {
        self.requests += 1;

        let stale = self
            .last_attempt_at
            .map_or(true, |t| now.saturating_sub(t) > self.immediate_after_ms);
        if stale {
            let already_due = self.due_at.map_or(false, |d| d <= now);
            self.due_at = Some(now);
            return if already_due {
                SaveDecision::Coalesced
            } else {
                SaveDecision::Immediate
            };
        }

        if self.due_at.is_some() {
            return SaveDecision::Coalesced;
        }

        let due_at = now.saturating_add(self.debounce_ms);
        self.due_at = Some(due_at);
        SaveDecision::Deferred { due_at }
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.due_at.map_or(false, |d| d <= now)
    }

    pub fn due_at(&self) -> Option<i64> {
        self.due_at
    }

    pub fn last_saved_at(&self) -> Option<i64> {
        self.last_saved_at
    }

    /// Request sequence number. Pass it back to [`Self::finish`] so requests
    /// arriving during a write keep their pending save.
    pub fn sequence(&self) -> u64 {
        self.requests
    }

    /// Record the end of a save attempt that started at `sequence`. A failed
    /// attempt still ends the cycle; the next change schedules a new one.
    pub fn finish(&mut self, now: i64, sequence: u64, saved: bool) {
        self.last_attempt_at = Some(now);
        if saved {
            self.last_saved_at = Some(now);
        }
        if self.requests == sequence {
            self.due_at = None;
        }
    }
}

/// Handle to the background persistence task.
pub struct PersistenceWorker {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PersistenceWorker {
    /// Spawn the worker on the current tokio runtime. It saves every
    /// `save_interval_ms`, and whenever a requested save becomes due.
    pub fn spawn(engine: Arc<Engine>, clock: Arc<dyn Clock>) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run(engine, clock, shutdown_rx));
        Self { shutdown, task }
    }

    /// Stop the worker and wait for an in-flight save to finish. The caller
    /// is expected to flush afterwards.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("Persistence worker ended abnormally: {}", e);
        }
    }
}

async fn run(engine: Arc<Engine>, clock: Arc<dyn Clock>, mut shutdown_rx: watch::Receiver<bool>) {
    let interval_ms = engine.config().save_interval_ms.max(1) as u64;
    let period = Duration::from_millis(interval_ms);
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Persistence worker started (interval {}ms, debounce {}ms)",
        interval_ms,
        engine.config().save_debounce_ms
    );

    loop {
        let due_in = engine
            .next_save_due()
            .map(|due| Duration::from_millis(due.saturating_sub(clock.now_ms()).max(0) as u64));

        tokio::select! {
            _ = shutdown_rx.changed() => break,
            _ = ticker.tick() => {
                let engine = Arc::clone(&engine);
                let now = clock.now_ms();
                let result = tokio::task::spawn_blocking(move || {
                    engine.sweep(now);
                    engine.save_now(now)
                })
                .await;
                match result {
                    Ok(saved) => debug!("Periodic save at {}: saved={}", now, saved),
                    Err(e) => warn!("Periodic save task failed: {}", e),
                }
            }
            _ = sleep_until_due(due_in) => {
                let engine = Arc::clone(&engine);
                let now = clock.now_ms();
                if let Err(e) = tokio::task::spawn_blocking(move || engine.save_if_due(now)).await {
                    warn!("Deferred save task failed: {}", e);
                }
            }
            _ = engine.save_requested() => {}
        }
    }

    info!("Persistence worker stopped");
}

async fn sleep_until_due(due_in: Option<Duration>) {
    match due_in {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

/// Flushes the engine when dropped. Keep one alive for the lifetime of the
/// host so an early return or unwinding still writes a final snapshot.
pub struct FlushGuard {
    engine: Arc<Engine>,
    clock: Arc<dyn Clock>,
}

impl FlushGuard {
    pub fn new(engine: Arc<Engine>, clock: Arc<dyn Clock>) -> Self {
        Self { engine, clock }
    }
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        self.engine.flush(self.clock.now_ms());
    }
}
