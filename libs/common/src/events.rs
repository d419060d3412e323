//! Topic exchange for asynchronous fan-out between services.
//!
//! Producers publish to `(exchange, routing_key)`; consumers declare queue
//! bindings with AMQP-style topic patterns (`*` = one word, `#` = zero or more).
//! Delivery rides on Redis pub/sub: one channel per `exchange/routing_key`,
//! consumers pattern-subscribe per exchange and filter by binding.
//!
//! Publishing is fire-and-forget. There is no ordering, retry or dead-lettering.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

pub const JOB_EXCHANGE: &str = "job-exchange";
pub const JOB_POSTED_KEY: &str = "job.posted";
pub const APPLICATION_EXCHANGE: &str = "application-exchange";
pub const APPLICATION_SUBMITTED_KEY: &str = "application.submitted";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPostedEvent {
    pub job_id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmittedEvent {
    pub application_id: i64,
    pub job_id: i64,
    pub applicant_id: i64,
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Subscription stream closed")]
    Closed,
}

/// A message as seen by a consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub exchange: String,
    pub routing_key: String,
    pub payload: Vec<u8>,
}

impl Delivery {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, EventError> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// Queue-to-exchange binding declared by a consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub queue: String,
    pub exchange: String,
    pub pattern: String,
}

impl Binding {
    pub fn new(queue: &str, exchange: &str, pattern: &str) -> Self {
        Binding {
            queue: queue.to_string(),
            exchange: exchange.to_string(),
            pattern: pattern.to_string(),
        }
    }

    pub fn accepts(&self, delivery: &Delivery) -> bool {
        self.exchange == delivery.exchange && topic_matches(&self.pattern, &delivery.routing_key)
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: Vec<u8>,
    ) -> Result<(), EventError>;
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, queue: &str, delivery: &Delivery) -> anyhow::Result<()>;
}

/// Serializes and publishes an event. Failures are logged and swallowed.
pub async fn publish_event<T: Serialize + Sync>(
    publisher: &dyn EventPublisher,
    exchange: &str,
    routing_key: &str,
    event: &T,
) {
    let payload = match serde_json::to_vec(event) {
        Ok(p) => p,
        Err(e) => {
            error!(exchange, routing_key, error = %e, "Failed to serialize event");
            return;
        }
    };

    match publisher.publish(exchange, routing_key, payload).await {
        Ok(()) => info!(exchange, routing_key, "Event published"),
        Err(e) => error!(exchange, routing_key, error = %e, "Failed to publish event"),
    }
}

/// AMQP topic matching over `.`-separated words.
pub fn topic_matches(pattern: &str, routing_key: &str) -> bool {
    let pattern: Vec<&str> = pattern.split('.').collect();
    let key: Vec<&str> = routing_key.split('.').collect();
    match_words(&pattern, &key)
}

fn match_words(pattern: &[&str], key: &[&str]) -> bool {
    match pattern.split_first() {
        None => key.is_empty(),
        Some((&"#", rest)) => (0..=key.len()).any(|skip| match_words(rest, &key[skip..])),
        Some((&word, rest)) => match key.split_first() {
            Some((&k, key_rest)) if word == "*" || word == k => match_words(rest, key_rest),
            _ => false,
        },
    }
}

pub fn channel_name(exchange: &str, routing_key: &str) -> String {
    format!("{exchange}/{routing_key}")
}

pub fn split_channel(channel: &str) -> Option<(&str, &str)> {
    channel
        .split_once('/')
        .filter(|(exchange, key)| !exchange.is_empty() && !key.is_empty())
}

/// Hands a delivery to every matching binding. Returns how many queues received it.
pub async fn dispatch(bindings: &[Binding], handler: &dyn EventHandler, delivery: &Delivery) -> usize {
    let mut delivered = 0;
    for binding in bindings.iter().filter(|b| b.accepts(delivery)) {
        delivered += 1;
        if let Err(e) = handler.handle(&binding.queue, delivery).await {
            error!(
                queue = %binding.queue,
                routing_key = %delivery.routing_key,
                error = %e,
                "Event handler failed; message dropped"
            );
        }
    }
    if delivered == 0 {
        debug!(exchange = %delivery.exchange, routing_key = %delivery.routing_key, "No binding matched");
    }
    delivered
}

// ────────────────────────────────────────────────────────────────────────────
// Redis transport
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RedisEventBus {
    client: redis::Client,
}

impl RedisEventBus {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    /// Runs until the subscription stream ends.
    pub async fn consume(
        &self,
        bindings: Vec<Binding>,
        handler: Arc<dyn EventHandler>,
    ) -> Result<(), EventError> {
        let mut pubsub = self.client.get_async_pubsub().await?;

        let exchanges: BTreeSet<&str> = bindings.iter().map(|b| b.exchange.as_str()).collect();
        for exchange in &exchanges {
            pubsub.psubscribe(format!("{exchange}/*")).await?;
            info!(exchange, "Subscribed to exchange");
        }

        let mut stream = pubsub.on_message();
        while let Some(msg) = stream.next().await {
            let channel = msg.get_channel_name().to_string();
            let Some((exchange, routing_key)) = split_channel(&channel) else {
                warn!(channel = %channel, "Ignoring message on malformed channel");
                continue;
            };
            let delivery = Delivery {
                exchange: exchange.to_string(),
                routing_key: routing_key.to_string(),
                payload: msg.get_payload_bytes().to_vec(),
            };
            dispatch(&bindings, handler.as_ref(), &delivery).await;
        }

        Err(EventError::Closed)
    }

    /// Keeps a consumer alive across Redis disconnects.
    pub async fn consume_with_retry(
        &self,
        bindings: Vec<Binding>,
        handler: Arc<dyn EventHandler>,
        retry_delay: Duration,
    ) {
        loop {
            if let Err(e) = self.consume(bindings.clone(), handler.clone()).await {
                error!(error = %e, "Event consumer stopped, reconnecting");
            }
            tokio::time::sleep(retry_delay).await;
        }
    }
}

#[async_trait]
impl EventPublisher for RedisEventBus {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: Vec<u8>,
    ) -> Result<(), EventError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let receivers: i64 = conn.publish(channel_name(exchange, routing_key), payload).await?;
        debug!(exchange, routing_key, receivers, "Published to channel");
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-process transport
// ────────────────────────────────────────────────────────────────────────────

/// Broadcast-backed bus for tests and single-process deployments.
#[derive(Clone)]
pub struct InMemoryEventBus {
    sender: broadcast::Sender<Delivery>,
}

impl InMemoryEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.sender.subscribe()
    }

    pub async fn consume(&self, bindings: Vec<Binding>, handler: Arc<dyn EventHandler>) {
        let mut rx = self.subscribe();
        loop {
            match rx.recv().await {
                Ok(delivery) => {
                    dispatch(&bindings, handler.as_ref(), &delivery).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "In-memory consumer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: Vec<u8>,
    ) -> Result<(), EventError> {
        // No receivers is not an error for fire-and-forget fan-out.
        let _ = self.sender.send(Delivery {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            payload,
        });
        Ok(())
    }
}
