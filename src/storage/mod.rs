// ABOUTME: Persistence adapter module for the trailhead wizard
// ABOUTME: Stores one opaque JSON blob per key in a durable synchronous key-value store

pub mod error;
pub mod store;

pub use error::{Result, StorageError};
pub use store::{FileStore, MemoryStore, StateStore};
