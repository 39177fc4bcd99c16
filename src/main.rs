//! Rosterd - shift scheduling services

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rosterd::{
    config::Args,
    db::MongoClient,
    generator::AssignmentGenerator,
    nats::NatsClient,
    server,
    store::{MemoryTableStore, MongoTableStore, TableStore},
    worker::{ClockInConsumer, ConsumerConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rosterd={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  Rosterd - shift scheduling services");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!(
        "Mode: {}",
        if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" }
    );
    info!("NATS: {}", args.nats.nats_url);
    info!("MongoDB: {}", args.mongodb_uri);
    info!("======================================");

    // Connect to MongoDB (optional in dev mode, which falls back to the
    // in-memory store)
    let (store, store_backend): (Arc<dyn TableStore>, &'static str) =
        match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => {
                info!("MongoDB connected successfully");
                let store = MongoTableStore::new(&client).await?;
                (Arc::new(store), "mongodb")
            }
            Err(e) => {
                if args.dev_mode {
                    warn!(
                        "MongoDB connection failed (dev mode, using in-memory store): {}",
                        e
                    );
                    (Arc::new(MemoryTableStore::new()), "memory")
                } else {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        };

    // Connect to NATS (optional in dev mode)
    let nats = match NatsClient::new(&args.nats, &format!("rosterd-{}", args.node_id)).await {
        Ok(client) => {
            info!("NATS connected successfully");
            Some(client)
        }
        Err(e) => {
            if args.dev_mode {
                warn!("NATS connection failed (dev mode, continuing without): {}", e);
                None
            } else {
                error!("NATS connection failed: {}", e);
                std::process::exit(1);
            }
        }
    };

    // Start the clock-in consumer when the queue is available
    if let Some(ref nats) = nats {
        let generator = AssignmentGenerator::new(Arc::clone(&store));
        let config = ConsumerConfig {
            batch: args.consumer_batch,
            generate_timeout: Duration::from_millis(args.generate_timeout_ms),
            max_deliveries: args.max_deliveries,
            retry_delay: Duration::from_millis(args.retry_delay_ms),
        };
        let consumer = ClockInConsumer::new(nats.inner().clone(), generator, config);
        tokio::spawn(async move {
            if let Err(e) = consumer.run().await {
                error!("clock-in consumer exited: {}", e);
            }
        });
    } else {
        warn!("clock-in consumer disabled (no queue connection)");
    }

    // Build shared state and serve
    let state = Arc::new(server::AppState::new(args, store, store_backend, nats));
    server::run(state).await?;

    Ok(())
}
