//! Database layer: MongoDB connection and entity schemas

pub mod mongo;
pub mod schemas;

pub use mongo::MongoClient;
