//! Poll persistence.
//!
//! Each poll lives in two co-expiring records addressed by its id: the
//! serialized poll metadata and a counter per option index. Both records
//! are written together by [`PollStore::put`] and are never refreshed
//! afterwards. An expired record reads exactly like one that never existed.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::time::Duration;
use shared::{Counters, Poll};
use crate::context::Context;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("poll not found")]
    NotFound,
    #[error("persistence failure: {0}")]
    Persistence(#[source] BoxError),
    #[error("operation cancelled")]
    Cancelled,
}

impl StoreError {
    pub fn persistence(err: impl Into<BoxError>) -> Self {
        StoreError::Persistence(err.into())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Persistence(Box::new(err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Persistence(Box::new(err))
    }
}

/// Atomic, TTL-bounded storage for polls and their vote counters.
///
/// Every mutation is a single indivisible batch on the substrate; callers
/// never read-modify-write counters themselves.
#[rocket::async_trait]
pub trait PollStore: Send + Sync {
    /// Writes the metadata and a zeroed counter for every option as one
    /// unit, both expiring after `ttl`.
    async fn put(&self, ctx: &Context, poll: &Poll, ttl: Duration) -> Result<(), StoreError>;

    async fn get(&self, ctx: &Context, id: &str) -> Result<Poll, StoreError>;

    /// Adds one to each named counter in a single batch. Indices are not
    /// validated against the poll; a counter that does not exist fails the
    /// whole batch.
    async fn increment_counters(&self, ctx: &Context, id: &str, indices: &[usize]) -> Result<(), StoreError>;

    /// Reads all counters at once. A missing counter record yields an empty
    /// map rather than an error.
    async fn read_counters(&self, ctx: &Context, id: &str) -> Result<Counters, StoreError>;

    /// Physically removes expired records, returning how many went away.
    async fn purge_expired(&self, ctx: &Context) -> Result<u64, StoreError>;

    async fn close(&self) -> Result<(), StoreError>;
}
