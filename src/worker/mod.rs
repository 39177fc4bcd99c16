//! Clock-in consumer
//!
//! Long-lived background subscriber bridging the clock-in queue to the duty
//! assignment generator.

pub mod processor;

pub use processor::{
    ClockInConsumer, ClockInMessage, ClockInProcessor, ConsumerConfig, ProcessOutcome,
    CONSUMER_NAME, STREAM_NAME, SUBJECT_PREFIX,
};
