//! NATS connection layer

pub mod client;

pub use client::NatsClient;
