//! Append-only, sequence-numbered event log for one game session. Attaches
//! to an `EventBus` as a wildcard subscriber so every emitted event is
//! durably recorded in arrival order, independent of any other subscriber.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EventType, GameEvent};

/// A recorded event, stamped with its position and arrival time in the
/// session's log. Flattened (rather than nesting the raw `GameEvent`) to
/// match the wire contract external clients read from `GetHistory` and the
/// event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedEvent {
    pub event: EventType,
    pub data: HashMap<String, serde_json::Value>,
    pub player_id: Option<usize>,
    pub turn_number: u64,
    pub timestamp: DateTime<Utc>,
    pub sequence: u64,
}

impl EnrichedEvent {
    fn new(sequence: u64, event: GameEvent) -> Self {
        Self {
            event: event.event_type,
            data: event.data,
            player_id: event.player_id,
            turn_number: event.turn_number,
            timestamp: Utc::now(),
            sequence,
        }
    }
}

#[derive(Default)]
struct HistoryState {
    next_sequence: u64,
    events: Vec<EnrichedEvent>,
}

/// Thread-safe append-only log. Reads copy out rather than lending
/// references, so callers never hold the lock across a `.await`.
pub struct History {
    state: Mutex<HistoryState>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self { state: Mutex::new(HistoryState::default()) }
    }

    pub fn record(&self, event: GameEvent) -> u64 {
        let mut state = self.state.lock().expect("history mutex poisoned");
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.events.push(EnrichedEvent::new(sequence, event));
        sequence
    }

    /// All events from `since_sequence` onward (inclusive), oldest first.
    pub fn since(&self, since_sequence: u64) -> Vec<EnrichedEvent> {
        let state = self.state.lock().expect("history mutex poisoned");
        state
            .events
            .iter()
            .filter(|e| e.sequence >= since_sequence)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<EnrichedEvent> {
        self.since(0)
    }

    /// Paginated, optionally type-filtered read used by `GetHistory`.
    /// Returns `(events, total_events, has_more)`, where `total_events`
    /// counts every event ever recorded (not just the ones matching
    /// `types`) and `has_more` is true when the page was truncated by
    /// `limit`.
    pub fn query(
        &self,
        since_sequence: u64,
        limit: Option<usize>,
        types: Option<&[EventType]>,
    ) -> (Vec<EnrichedEvent>, u64, bool) {
        let state = self.state.lock().expect("history mutex poisoned");
        let total_events = state.events.len() as u64;
        let matching: Vec<&EnrichedEvent> = state
            .events
            .iter()
            .filter(|e| e.sequence >= since_sequence)
            .filter(|e| types.is_none_or(|ts| ts.contains(&e.event)))
            .collect();
        let has_more = limit.is_some_and(|limit| matching.len() > limit);
        let page = match limit {
            Some(limit) => matching.into_iter().take(limit).cloned().collect(),
            None => matching.into_iter().cloned().collect(),
        };
        (page, total_events, has_more)
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("history mutex poisoned").events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl crate::event_bus::EventSubscriber for History {
    async fn on_event(&self, event: &GameEvent) {
        self.record(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use crate::types::EventType;

    fn sample(turn_number: u64) -> GameEvent {
        GameEvent { event_type: EventType::TurnStarted, player_id: Some(0), data: HashMap::new(), turn_number }
    }

    #[test]
    fn sequence_numbers_increase_monotonically() {
        let history = History::new();
        let first = history.record(sample(1));
        let second = history.record(sample(2));
        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn since_returns_only_events_at_or_after_the_cursor() {
        let history = History::new();
        for turn in 0..5 {
            history.record(sample(turn));
        }
        let tail = history.since(3);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].sequence, 3);
    }

    #[test]
    fn query_paginates_and_reports_whether_more_remain() {
        let history = History::new();
        for turn in 0..5 {
            history.record(sample(turn));
        }
        let (page, total, has_more) = history.query(0, Some(2), None);
        assert_eq!(page.len(), 2);
        assert_eq!(total, 5);
        assert!(has_more);

        let (page, total, has_more) = history.query(0, None, None);
        assert_eq!(page.len(), 5);
        assert_eq!(total, 5);
        assert!(!has_more);
    }

    #[test]
    fn query_filters_by_event_type() {
        let history = History::new();
        history.record(sample(0));
        history.record(GameEvent {
            event_type: EventType::GameOver,
            player_id: None,
            data: HashMap::new(),
            turn_number: 1,
        });
        let (page, _, _) = history.query(0, None, Some(&[EventType::GameOver]));
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].event, EventType::GameOver);
    }

    #[tokio::test]
    async fn acts_as_a_wildcard_event_bus_subscriber() {
        use crate::event_bus::{EventBus, EventSubscriber};
        use std::sync::Arc;

        let bus = EventBus::new();
        let history = Arc::new(History::new());
        bus.subscribe(None, history.clone() as Arc<dyn EventSubscriber>).await;
        bus.emit(sample(1)).await;
        bus.emit(sample(2)).await;
        assert_eq!(history.len(), 2);
    }
}
