//! Configuration for rosterd
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Rosterd - scheduling REST services
#[derive(Parser, Debug, Clone)]
#[command(name = "rosterd")]
#[command(about = "REST services for availabilities, duties, duty assignments and events")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory store, external services optional)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// NATS configuration
    #[command(flatten)]
    pub nats: NatsArgs,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "rosterd")]
    pub mongodb_db: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Timeout for a single duty-assignment generation, in milliseconds.
    /// A stuck store call fails the clock-in message instead of hanging
    /// the consumer worker.
    #[arg(long, env = "GENERATE_TIMEOUT_MS", default_value = "30000")]
    pub generate_timeout_ms: u64,

    /// Maximum JetStream deliveries before a retryable clock-in message
    /// is dropped as poison
    #[arg(long, env = "MAX_DELIVERIES", default_value = "5")]
    pub max_deliveries: i64,

    /// Delay before a retryable clock-in message is redelivered, in milliseconds
    #[arg(long, env = "RETRY_DELAY_MS", default_value = "5000")]
    pub retry_delay_ms: u64,

    /// Maximum clock-in messages fetched per consumer batch
    #[arg(long, env = "CONSUMER_BATCH", default_value = "10")]
    pub consumer_batch: usize,
}

/// NATS connection configuration
#[derive(Parser, Debug, Clone)]
pub struct NatsArgs {
    /// NATS server URL
    #[arg(long, env = "NATS_URL", default_value = "nats://127.0.0.1:4222")]
    pub nats_url: String,

    /// NATS username (optional)
    #[arg(long, env = "NATS_USER")]
    pub nats_user: Option<String>,

    /// NATS password (optional)
    #[arg(long, env = "NATS_PASSWORD")]
    pub nats_password: Option<String>,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.generate_timeout_ms == 0 {
            return Err("GENERATE_TIMEOUT_MS must be greater than zero".to_string());
        }
        if self.max_deliveries < 1 {
            return Err("MAX_DELIVERIES must be at least 1".to_string());
        }
        if self.consumer_batch == 0 {
            return Err("CONSUMER_BATCH must be greater than zero".to_string());
        }
        Ok(())
    }
}
