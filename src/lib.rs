//! Rosterd - shift scheduling services
//!
//! REST services for employee availability windows, the duty catalog,
//! per-shift duty assignments and events, backed by a partitioned row
//! store over MongoDB. A NATS JetStream consumer turns clock-in messages
//! into generated duty assignments.
//!
//! ## Services
//!
//! - **Availabilities**: employee availability windows with range queries
//! - **Duties**: the per-role duty catalog
//! - **Assignments**: per-shift duty checklists, generated on clock-in
//! - **Events**: events with their shift links kept in a relationship index

pub mod config;
pub mod db;
pub mod generator;
pub mod links;
pub mod nats;
pub mod routes;
pub mod server;
pub mod services;
pub mod store;
pub mod types;
pub mod validate;
pub mod worker;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, RosterError};
