//! Bounded, time-ordered log of recent message events.

use std::collections::VecDeque;

use crate::types::MessageEvent;

/// Message events ordered by timestamp, oldest first.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: VecDeque<MessageEvent>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted events, restoring timestamp order.
    pub fn from_events(mut events: Vec<MessageEvent>) -> Self {
        events.sort_by_key(|e| e.timestamp);
        Self {
            entries: events.into(),
        }
    }

    /// Append an event. Late arrivals are inserted at their time position.
    pub fn push(&mut self, event: MessageEvent) {
        match self.entries.back() {
            Some(last) if last.timestamp > event.timestamp => {
                let pos = self
                    .entries
                    .partition_point(|e| e.timestamp <= event.timestamp);
                self.entries.insert(pos, event);
            }
            _ => self.entries.push_back(event),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.entries.back().map(|e| e.timestamp)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageEvent> {
        self.entries.iter()
    }

    /// Events with `since < timestamp <= until`, optionally for one group.
    pub fn window<'a>(
        &'a self,
        since: i64,
        until: i64,
        group_id: Option<&'a str>,
    ) -> impl Iterator<Item = &'a MessageEvent> + 'a {
        let start = self.entries.partition_point(|e| e.timestamp <= since);
        self.entries
            .range(start..)
            .take_while(move |e| e.timestamp <= until)
            .filter(move |e| group_id.map_or(true, |g| e.group_id == g))
    }

    /// Drop events older than `retention_ms`.
    pub fn evict_expired(&mut self, now: i64, retention_ms: i64) -> usize {
        let mut removed = 0;
        while let Some(front) = self.entries.front() {
            if now.saturating_sub(front.timestamp) <= retention_ms {
                break;
            }
            self.entries.pop_front();
            removed += 1;
        }
        removed
    }

    /// Drop oldest events until at most `max_entries` remain.
    pub fn evict_overflow(&mut self, max_entries: usize) -> usize {
        let excess = self.entries.len().saturating_sub(max_entries);
        self.entries.drain(..excess);
        excess
    }

    /// Copy of all events, oldest first.
    pub fn to_vec(&self) -> Vec<MessageEvent> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(group: &str, ts: i64) -> MessageEvent {
        MessageEvent {
            timestamp: ts,
            group_id: group.into(),
            group_name: String::new(),
            user_id: "u1".into(),
            display_name: String::new(),
            text: format!("msg {}", ts),
        }
    }

    #[test]
    fn test_push_keeps_time_order() {
        let mut log = MessageLog::new();
        log.push(event("g1", 10));
        log.push(event("g1", 30));
        log.push(event("g1", 20));
        let ts: Vec<i64> = log.iter().map(|e| e.timestamp).collect();
        assert_eq!(ts, vec![10, 20, 30]);
        assert_eq!(log.last_timestamp(), Some(30));
    }

    #[test]
    fn test_window_bounds_and_scope() {
        let log = MessageLog::from_events(vec![
            event("g1", 10),
            event("g2", 20),
            event("g1", 30),
            event("g1", 40),
        ]);
        let all: Vec<i64> = log.window(10, 30, None).map(|e| e.timestamp).collect();
        assert_eq!(all, vec![20, 30]);
        let g1: Vec<i64> = log.window(0, 100, Some("g1")).map(|e| e.timestamp).collect();
        assert_eq!(g1, vec![10, 30, 40]);
    }

    #[test]
    fn test_evict_expired() {
        let mut log = MessageLog::from_events(vec![event("g1", 0), event("g1", 50), event("g1", 100)]);
        assert_eq!(log.evict_expired(150, 100), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.evict_expired(150, 100), 0);
    }

    #[test]
    fn test_evict_overflow_drops_oldest() {
        let mut log = MessageLog::from_events((0..5).map(|i| event("g1", i)).collect());
        assert_eq!(log.evict_overflow(3), 2);
        assert_eq!(log.iter().next().unwrap().timestamp, 2);
        assert_eq!(log.evict_overflow(3), 0);
    }
}
