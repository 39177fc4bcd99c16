//! Clock-in message processing
//!
//! A JetStream pull consumer decodes clock-in messages and invokes the
//! assignment generator. Processing itself is a transport-agnostic function
//! returning a tri-state [`ProcessOutcome`]; the surrounding loop maps the
//! outcome to JetStream acknowledgement kinds:
//!
//! - `Success` -> ack (exactly once, after the generator returns)
//! - `Poison` -> term (no redelivery; undecodable or non-retryable)
//! - `Retryable` -> nak with delay, termed after `max_deliveries` deliveries
//!
//! `Conflict` from the generator is a benign duplicate under at-least-once
//! delivery and counts as `Success`.

use async_nats::jetstream::{self, consumer::PullConsumer, stream::Stream, AckKind};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::generator::AssignmentGenerator;
use crate::types::{Result, RosterError};

/// JetStream stream holding clock-in events
pub const STREAM_NAME: &str = "CLOCK_INS";
/// Subject prefix for clock-in events
pub const SUBJECT_PREFIX: &str = "clockins";
/// Durable consumer name
pub const CONSUMER_NAME: &str = "rosterd_assignments";

/// A clock-in event: an employee began a shift
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClockInMessage {
    /// Shift the employee clocked in for
    pub shift_id: Uuid,
    /// When the clock-in happened
    pub clock_in_time: DateTime<Utc>,
    /// Role whose duty catalog applies; opaque string, only ever compared
    /// for equality
    pub role_id: String,
}

/// Tri-state result of processing one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Assignments generated (or already present); acknowledge
    Success,
    /// Transient failure (store/transport error, timeout); redeliver later
    Retryable,
    /// Unprocessable message; drop without requeue
    Poison,
}

/// Consumer tuning
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Maximum messages fetched per batch
    pub batch: usize,
    /// Upper bound on a single generator invocation
    pub generate_timeout: Duration,
    /// Deliveries after which a retryable message is dropped as poison
    pub max_deliveries: i64,
    /// Redelivery delay for retryable failures
    pub retry_delay: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            batch: 10,
            generate_timeout: Duration::from_secs(30),
            max_deliveries: 5,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Transport-agnostic clock-in processor
#[derive(Clone)]
pub struct ClockInProcessor {
    generator: AssignmentGenerator,
    generate_timeout: Duration,
}

impl ClockInProcessor {
    pub fn new(generator: AssignmentGenerator, generate_timeout: Duration) -> Self {
        Self {
            generator,
            generate_timeout,
        }
    }

    fn decode(payload: &[u8]) -> Result<ClockInMessage> {
        serde_json::from_slice(payload).map_err(|e| RosterError::Decode(e.to_string()))
    }

    /// Decode one payload and run the generator, classifying the result
    pub async fn process(&self, payload: &[u8]) -> ProcessOutcome {
        let message = match Self::decode(payload) {
            Ok(m) => m,
            Err(e) => {
                error!("dropping clock-in message: {}", e);
                return ProcessOutcome::Poison;
            }
        };

        debug!(
            "clock-in for shift {} (role {}) at {}",
            message.shift_id, message.role_id, message.clock_in_time
        );

        let shift_id = message.shift_id.to_string();
        let generated = timeout(
            self.generate_timeout,
            self.generator.generate(&shift_id, &message.role_id),
        )
        .await;

        match generated {
            Err(_elapsed) => {
                warn!(
                    "generation for shift {} timed out after {:?}",
                    shift_id, self.generate_timeout
                );
                ProcessOutcome::Retryable
            }
            Ok(Ok(batch)) => {
                info!(
                    "clock-in for shift {} produced {} assignments",
                    shift_id,
                    batch.len()
                );
                ProcessOutcome::Success
            }
            // At-least-once delivery: the batch (or part of it) was already
            // written by an earlier delivery
            Ok(Err(RosterError::Conflict(msg))) => {
                warn!("duplicate clock-in for shift {}: {}", shift_id, msg);
                ProcessOutcome::Success
            }
            Ok(Err(e @ (RosterError::Store(_) | RosterError::Nats(_) | RosterError::Io(_)))) => {
                warn!("transient failure for shift {}: {}", shift_id, e);
                ProcessOutcome::Retryable
            }
            Ok(Err(e)) => {
                error!("unprocessable clock-in for shift {}: {}", shift_id, e);
                ProcessOutcome::Poison
            }
        }
    }
}

/// Background consumer pulling clock-in messages from JetStream
pub struct ClockInConsumer {
    jetstream: jetstream::Context,
    processor: ClockInProcessor,
    config: ConsumerConfig,
    running: Arc<RwLock<bool>>,
}

impl ClockInConsumer {
    pub fn new(
        client: async_nats::Client,
        generator: AssignmentGenerator,
        config: ConsumerConfig,
    ) -> Self {
        let processor = ClockInProcessor::new(generator, config.generate_timeout);
        Self {
            jetstream: jetstream::new(client),
            processor,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Run the processing loop until `stop` is called
    pub async fn run(&self) -> Result<()> {
        *self.running.write().await = true;

        let stream = self.ensure_stream().await?;
        let consumer = self.ensure_consumer(&stream).await?;

        info!("clock-in consumer starting on stream {}", STREAM_NAME);

        while *self.running.read().await {
            match self.process_batch(&consumer).await {
                Ok(count) => {
                    if count > 0 {
                        debug!("processed {} clock-in messages", count);
                    }
                }
                Err(e) => {
                    error!("error processing clock-in batch: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        info!("clock-in consumer stopped");
        Ok(())
    }

    /// Stop the consumer loop
    pub async fn stop(&self) {
        *self.running.write().await = false;
    }

    /// Ensure the clock-in stream exists
    async fn ensure_stream(&self) -> Result<Stream> {
        let stream = self
            .jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: STREAM_NAME.to_string(),
                subjects: vec![format!("{}.>", SUBJECT_PREFIX)],
                ..Default::default()
            })
            .await
            .map_err(|e| RosterError::Nats(format!("Failed to create stream: {}", e)))?;
        Ok(stream)
    }

    /// Ensure the durable consumer exists
    async fn ensure_consumer(&self, stream: &Stream) -> Result<PullConsumer> {
        let consumer = stream
            .get_or_create_consumer(
                CONSUMER_NAME,
                jetstream::consumer::pull::Config {
                    durable_name: Some(CONSUMER_NAME.to_string()),
                    ack_policy: jetstream::consumer::AckPolicy::Explicit,
                    filter_subject: format!("{}.>", SUBJECT_PREFIX),
                    max_deliver: self.config.max_deliveries,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| RosterError::Nats(format!("Failed to create consumer: {}", e)))?;
        Ok(consumer)
    }

    /// Fetch and process one batch of messages, sequentially in delivery
    /// order
    async fn process_batch(&self, consumer: &PullConsumer) -> Result<usize> {
        let mut messages = consumer
            .fetch()
            .max_messages(self.config.batch)
            .expires(Duration::from_secs(5))
            .messages()
            .await
            .map_err(|e| RosterError::Nats(format!("Failed to fetch messages: {}", e)))?;

        let mut count = 0;
        while let Some(message) = messages.next().await {
            match message {
                Ok(msg) => {
                    count += 1;
                    self.process_message(msg).await;
                }
                Err(e) => {
                    warn!("error receiving clock-in message: {}", e);
                }
            }
        }
        Ok(count)
    }

    /// Process a single message and acknowledge it per the outcome
    async fn process_message(&self, msg: jetstream::Message) {
        let outcome = self.processor.process(&msg.payload).await;

        let delivered = msg.info().map(|i| i.delivered).unwrap_or(1);
        let ack = match outcome {
            ProcessOutcome::Success => msg.ack().await,
            ProcessOutcome::Poison => msg.ack_with(AckKind::Term).await,
            ProcessOutcome::Retryable => {
                if delivered >= self.config.max_deliveries {
                    warn!(
                        "dropping clock-in message after {} deliveries",
                        delivered
                    );
                    msg.ack_with(AckKind::Term).await
                } else {
                    msg.ack_with(AckKind::Nak(Some(self.config.retry_delay))).await
                }
            }
        };

        if let Err(e) = ack {
            warn!("failed to acknowledge clock-in message: {}", e);
        }
    }
}
