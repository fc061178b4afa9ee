//! Fan-out of game events to interested subscribers. Grounded on
//! `original_source/backend/src/monopoly/orchestrator/event_bus.py`'s
//! snapshot-then-fan-out design: subscribers are copied out from under the
//! lock before any handler runs, so a slow or failing handler never blocks
//! `subscribe`/`unsubscribe` nor takes down its siblings.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::types::{EventType, GameEvent};

/// Anything that wants to observe events. `async-trait` mirrors the
/// `AgentInterface` contract elsewhere in this crate.
#[async_trait::async_trait]
pub trait EventSubscriber: Send + Sync {
    async fn on_event(&self, event: &GameEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// `None` means a wildcard subscription receiving every event type.
    filter: Option<EventType>,
    subscriber: Arc<dyn EventSubscriber>,
}

/// Process-local pub/sub hub for one game session's events.
pub struct EventBus {
    subscriptions: Mutex<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self { subscriptions: Mutex::new(Vec::new()), next_id: AtomicU64::new(1) }
    }

    pub async fn subscribe(&self, filter: Option<EventType>, subscriber: Arc<dyn EventSubscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.lock().await.push(Subscription { id, filter, subscriber });
        id
    }

    /// No-op if `id` is unknown or already removed.
    pub async fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.lock().await.retain(|s| s.id != id);
    }

    /// Snapshots matching subscribers under the lock, then dispatches to
    /// each concurrently once the lock is released. A panicking or
    /// long-running handler is isolated in its own task so it cannot stall
    /// emission for the others.
    pub async fn emit(&self, event: GameEvent) {
        let matching: Vec<Arc<dyn EventSubscriber>> = {
            let subs = self.subscriptions.lock().await;
            subs.iter()
                .filter(|s| s.filter.is_none_or(|f| f == event.event_type))
                .map(|s| s.subscriber.clone())
                .collect()
        };
        let event = Arc::new(event);
        let handles: Vec<_> = matching
            .into_iter()
            .map(|subscriber| {
                let event = event.clone();
                tokio::spawn(async move {
                    subscriber.on_event(&event).await;
                })
            })
            .collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscriptions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::collections::HashMap;

    struct CountingSubscriber(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl EventSubscriber for CountingSubscriber {
        async fn on_event(&self, _event: &GameEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct PanickingSubscriber;

    #[async_trait::async_trait]
    impl EventSubscriber for PanickingSubscriber {
        async fn on_event(&self, _event: &GameEvent) {
            panic!("boom");
        }
    }

    fn sample_event() -> GameEvent {
        GameEvent { event_type: EventType::DiceRolled, player_id: Some(0), data: HashMap::new(), turn_number: 1 }
    }

    #[tokio::test]
    async fn wildcard_subscriber_receives_every_event_type() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe(None, Arc::new(CountingSubscriber(count.clone()))).await;
        bus.emit(sample_event()).await;
        bus.emit(GameEvent { event_type: EventType::GameOver, ..sample_event() }).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn typed_subscriber_ignores_other_event_types() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe(Some(EventType::GameOver), Arc::new(CountingSubscriber(count.clone()))).await;
        bus.emit(sample_event()).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        bus.emit(GameEvent { event_type: EventType::GameOver, ..sample_event() }).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent_and_stops_delivery() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let id = bus.subscribe(None, Arc::new(CountingSubscriber(count.clone()))).await;
        bus.unsubscribe(id).await;
        bus.unsubscribe(id).await;
        bus.emit(sample_event()).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn a_panicking_subscriber_does_not_stop_others() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe(None, Arc::new(PanickingSubscriber)).await;
        bus.subscribe(None, Arc::new(CountingSubscriber(count.clone()))).await;
        bus.emit(sample_event()).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
