//! Storage layer for Quotebook

mod connection;
mod kv_repository;
mod migrations;

pub use connection::Database;
pub use kv_repository::{keys, KeyValueStore, MemoryStore};

#[cfg(test)]
pub use kv_repository::FlakyStore;
