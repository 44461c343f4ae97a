//! Event bus implementation
//!
//! Publish/subscribe abstraction used to announce tenancy changes after
//! they are committed. Subscribers observe; they cannot veto.

use crate::types::Event;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

/// Event bus error types.
#[derive(Debug, Error)]
pub enum EventBusError {
    /// Failed to publish event
    #[error("Failed to publish event: {0}")]
    PublishError(String),

    /// Failed to subscribe
    #[error("Failed to subscribe: {0}")]
    SubscribeError(String),

    /// Unknown subscription
    #[error("Unknown subscription: {0}")]
    UnknownSubscription(String),

    /// Channel closed
    #[error("Channel closed")]
    ChannelClosed,
}

/// Result type for event bus operations.
pub type EventBusResult<T> = Result<T, EventBusError>;

/// Subscription handle for receiving events.
pub struct Subscription {
    /// Subscription ID
    pub id: String,
    /// Topic pattern
    pub topic: String,
    /// Event receiver
    pub receiver: broadcast::Receiver<Event>,
}

impl Subscription {
    /// Receive the next event.
    pub async fn recv(&mut self) -> EventBusResult<Event> {
        self.receiver
            .recv()
            .await
            .map_err(|_| EventBusError::ChannelClosed)
    }
}

/// Event handler trait for processing events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle an event.
    async fn handle(&self, event: Event) -> EventBusResult<()>;

    /// Get the topic patterns this handler is interested in.
    fn topics(&self) -> Vec<String>;
}

/// Event bus trait for publish/subscribe operations.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish an event.
    async fn publish(&self, event: Event) -> EventBusResult<()>;

    /// Subscribe to a topic pattern.
    ///
    /// Topic patterns support wildcards:
    /// - `*` matches any single segment
    /// - `#` matches zero or more segments
    ///
    /// Examples:
    /// - `platform.organization.*` matches `platform.organization.created`
    /// - `#.created` matches any creation event
    async fn subscribe(&self, topic: &str) -> EventBusResult<Subscription>;

    /// Register an event handler.
    async fn register_handler(&self, handler: Arc<dyn EventHandler>) -> EventBusResult<()>;

    /// Unsubscribe a subscription by ID.
    async fn unsubscribe(&self, subscription_id: &str) -> EventBusResult<()>;

    /// Get event bus stats.
    async fn stats(&self) -> EventBusStats;
}

/// Event bus statistics.
#[derive(Debug, Clone, Default)]
pub struct EventBusStats {
    /// Total events published
    pub events_published: u64,
    /// Total deliveries to subscribers and handlers
    pub events_delivered: u64,
    /// Active subscriptions
    pub active_subscriptions: usize,
    /// Registered handlers
    pub registered_handlers: usize,
}

/// In-memory event bus implementation.
///
/// Suitable for single-process services and tests. Handlers run on spawned
/// tasks, so publishing never waits on them.
pub struct MemoryEventBus {
    /// Broadcast sender per topic pattern
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<Event>>>>,
    /// Subscription ID to topic pattern
    subscriptions: Arc<RwLock<HashMap<String, String>>>,
    /// Registered handlers
    handlers: Arc<RwLock<Vec<Arc<dyn EventHandler>>>>,
    /// Statistics
    stats: Arc<RwLock<EventBusStats>>,
    /// Channel capacity for new topic patterns
    channel_capacity: usize,
}

impl std::fmt::Debug for MemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventBus")
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

impl MemoryEventBus {
    /// Create a new in-memory event bus.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create with custom channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            handlers: Arc::new(RwLock::new(Vec::new())),
            stats: Arc::new(RwLock::new(EventBusStats::default())),
            channel_capacity: capacity.max(1),
        }
    }

    /// Check if a topic matches a pattern.
    pub fn topic_matches(pattern: &str, topic: &str) -> bool {
        let pattern: Vec<&str> = pattern.split('.').collect();
        let topic: Vec<&str> = topic.split('.').collect();
        Self::segments_match(&pattern, &topic)
    }

    fn segments_match(pattern: &[&str], topic: &[&str]) -> bool {
        match (pattern.split_first(), topic.split_first()) {
            (None, None) => true,
            (Some((&"#", rest)), _) => {
                // `#` absorbs zero or more topic segments
                (0..=topic.len()).any(|skip| Self::segments_match(rest, &topic[skip..]))
            }
            (Some((&"*", rest)), Some((_, topic_rest))) => Self::segments_match(rest, topic_rest),
            (Some((segment, rest)), Some((head, topic_rest))) => {
                segment == head && Self::segments_match(rest, topic_rest)
            }
            _ => false,
        }
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn publish(&self, event: Event) -> EventBusResult<()> {
        let topic = event.topic();
        let mut delivered = 0u64;

        {
            let channels = self.channels.read().await;
            for (pattern, sender) in channels.iter() {
                if Self::topic_matches(pattern, &topic) {
                    // No live receivers is not an error
                    if let Ok(count) = sender.send(event.clone()) {
                        delivered += count as u64;
                    }
                }
            }
        }

        {
            let handlers = self.handlers.read().await;
            for handler in handlers.iter() {
                if handler
                    .topics()
                    .iter()
                    .any(|pattern| Self::topic_matches(pattern, &topic))
                {
                    let handler = handler.clone();
                    let event = event.clone();
                    delivered += 1;
                    tokio::spawn(async move {
                        if let Err(e) = handler.handle(event).await {
                            tracing::error!(error = %e, "Event handler failed");
                        }
                    });
                }
            }
        }

        let mut stats = self.stats.write().await;
        stats.events_published += 1;
        stats.events_delivered += delivered;

        tracing::debug!(topic = %topic, event_id = %event.id, delivered, "Event published");

        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> EventBusResult<Subscription> {
        if topic.is_empty() {
            return Err(EventBusError::SubscribeError(
                "topic pattern must not be empty".to_string(),
            ));
        }

        let id = uuid::Uuid::now_v7().to_string();

        // Lock order: channels, then subscriptions
        let receiver = {
            let mut channels = self.channels.write().await;
            let receiver = match channels.get(topic) {
                Some(sender) => sender.subscribe(),
                None => {
                    let (sender, receiver) = broadcast::channel(self.channel_capacity);
                    channels.insert(topic.to_string(), sender);
                    receiver
                }
            };
            self.subscriptions
                .write()
                .await
                .insert(id.clone(), topic.to_string());
            receiver
        };
        self.stats.write().await.active_subscriptions += 1;

        Ok(Subscription {
            id,
            topic: topic.to_string(),
            receiver,
        })
    }

    async fn register_handler(&self, handler: Arc<dyn EventHandler>) -> EventBusResult<()> {
        self.handlers.write().await.push(handler);
        self.stats.write().await.registered_handlers += 1;
        Ok(())
    }

    async fn unsubscribe(&self, subscription_id: &str) -> EventBusResult<()> {
        {
            let mut channels = self.channels.write().await;
            let mut subscriptions = self.subscriptions.write().await;
            let pattern = subscriptions
                .remove(subscription_id)
                .ok_or_else(|| EventBusError::UnknownSubscription(subscription_id.to_string()))?;

            if !subscriptions.values().any(|p| *p == pattern) {
                channels.remove(&pattern);
            }
        }

        let mut stats = self.stats.write().await;
        stats.active_subscriptions = stats.active_subscriptions.saturating_sub(1);

        Ok(())
    }

    async fn stats(&self) -> EventBusStats {
        self.stats.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrganizationEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use uuid::Uuid;

    fn created_event() -> Event {
        OrganizationEvent::Created {
            organization_id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            name: "Acme".to_string(),
            is_personal: false,
        }
        .to_event()
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = MemoryEventBus::new();
        let mut sub = bus.subscribe("platform.organization.*").await.unwrap();

        let event = created_event();
        bus.publish(event.clone()).await.unwrap();

        let received = tokio::time::timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timed out")
            .unwrap();
        assert_eq!(received.id, event.id);
    }

    #[test]
    fn test_topic_matching() {
        let topic = "platform.organization.created";

        assert!(MemoryEventBus::topic_matches(topic, topic));
        assert!(MemoryEventBus::topic_matches("platform.organization.*", topic));
        assert!(MemoryEventBus::topic_matches("*.organization.created", topic));
        assert!(MemoryEventBus::topic_matches("platform.#", topic));
        assert!(MemoryEventBus::topic_matches("#", topic));
        assert!(MemoryEventBus::topic_matches("#.created", topic));
        assert!(MemoryEventBus::topic_matches("platform.#.organization.created", topic));

        assert!(!MemoryEventBus::topic_matches("platform.organization.switched", topic));
        assert!(!MemoryEventBus::topic_matches("platform.*", topic));
        assert!(!MemoryEventBus::topic_matches("platform.organization.created.x", topic));
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let bus = MemoryEventBus::new();
        let sub = bus.subscribe("platform.#").await.unwrap();
        assert_eq!(bus.stats().await.active_subscriptions, 1);

        bus.unsubscribe(&sub.id).await.unwrap();
        assert_eq!(bus.stats().await.active_subscriptions, 0);

        assert!(matches!(
            bus.unsubscribe(&sub.id).await,
            Err(EventBusError::UnknownSubscription(_))
        ));
    }

    #[tokio::test]
    async fn test_unsubscribe_keeps_shared_channel() {
        let bus = MemoryEventBus::new();
        let first = bus.subscribe("platform.organization.*").await.unwrap();
        let mut second = bus.subscribe("platform.organization.*").await.unwrap();

        bus.unsubscribe(&first.id).await.unwrap();
        bus.publish(created_event()).await.unwrap();
        assert!(tokio::time::timeout(Duration::from_millis(100), second.recv())
            .await
            .expect("timed out")
            .is_ok());

        // Last subscriber gone, then a fresh one gets a live channel
        bus.unsubscribe(&second.id).await.unwrap();
        let mut third = bus.subscribe("platform.organization.*").await.unwrap();
        let event = created_event();
        bus.publish(event.clone()).await.unwrap();
        let received = tokio::time::timeout(Duration::from_millis(100), third.recv())
            .await
            .expect("timed out")
            .unwrap();
        assert_eq!(received.id, event.id);
    }

    #[tokio::test]
    async fn test_concurrent_subscribe_and_unsubscribe() {
        let bus = Arc::new(MemoryEventBus::new());
        let old = bus.subscribe("platform.#").await.unwrap();

        let unsubscribing = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.unsubscribe(&old.id).await })
        };
        let subscribing = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.subscribe("platform.#").await })
        };
        unsubscribing.await.unwrap().unwrap();
        let mut fresh = subscribing.await.unwrap().unwrap();

        bus.publish(created_event()).await.unwrap();
        assert!(tokio::time::timeout(Duration::from_millis(100), fresh.recv())
            .await
            .expect("timed out")
            .is_ok());
        assert_eq!(bus.stats().await.active_subscriptions, 1);
    }

    struct CountingHandler {
        seen: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _event: Event) -> EventBusResult<()> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn topics(&self) -> Vec<String> {
            vec!["platform.organization.created".to_string()]
        }
    }

    #[tokio::test]
    async fn test_handler_receives_matching_events() {
        let bus = MemoryEventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        bus.register_handler(Arc::new(CountingHandler { seen: seen.clone() }))
            .await
            .unwrap();

        bus.publish(created_event()).await.unwrap();
        bus.publish(
            OrganizationEvent::Switched {
                principal_id: Uuid::now_v7(),
                organization_id: Uuid::now_v7(),
            }
            .to_event(),
        )
        .await
        .unwrap();

        for _ in 0..50 {
            if seen.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        let stats = bus.stats().await;
        assert_eq!(stats.events_published, 2);
        assert_eq!(stats.registered_handlers, 1);
    }
}
