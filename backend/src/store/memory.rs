use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use time::OffsetDateTime;
use shared::{expires_after, Counters, Poll};
use crate::clock::Clock;
use crate::context::Context;
use super::{PollStore, StoreError};

fn info_key(id: &str) -> String {
    format!("poll:{id}:info")
}

fn votes_key(id: &str) -> String {
    format!("poll:{id}:votes")
}

#[derive(Debug)]
enum Value {
    Info(String),
    Votes(Counters),
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: OffsetDateTime,
}

type Keyspace = HashMap<String, Entry>;

/// In-process key/value substrate with lazy expiry.
///
/// One lock guards the whole keyspace, so every operation is a single
/// atomic batch. Expiry is judged against the injected clock.
pub struct MemoryStore {
    keys: Mutex<Keyspace>,
    clock: Arc<dyn Clock>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
            clock,
            closed: AtomicBool::new(false),
        }
    }

    /// Number of records physically held, expired or not.
    pub fn key_count(&self) -> usize {
        self.keys.lock().map(|keys| keys.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Keyspace>, StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::persistence("store is closed"));
        }
        self.keys
            .lock()
            .map_err(|_| StoreError::persistence("failed to acquire keyspace lock"))
    }

    /// Looks up a live entry, dropping it first if it has expired.
    fn live<'a>(keys: &'a mut Keyspace, key: &str, now: OffsetDateTime) -> Option<&'a mut Entry> {
        if keys.get(key).is_some_and(|entry| entry.expires_at <= now) {
            keys.remove(key);
        }
        keys.get_mut(key)
    }
}

#[rocket::async_trait]
impl PollStore for MemoryStore {
    async fn put(&self, ctx: &Context, poll: &Poll, ttl: Duration) -> Result<(), StoreError> {
        ctx.check()?;
        let info = serde_json::to_string(poll)?;
        let counters: Counters = (0..poll.options.len()).map(|i| (i, 0)).collect();

        let mut keys = self.lock()?;
        let expires_at = expires_after(self.clock.now(), ttl)
            .ok_or_else(|| StoreError::persistence(format!("ttl of {}s is out of range", ttl.as_secs())))?;
        keys.insert(info_key(&poll.id), Entry { value: Value::Info(info), expires_at });
        keys.insert(votes_key(&poll.id), Entry { value: Value::Votes(counters), expires_at });
        Ok(())
    }

    async fn get(&self, ctx: &Context, id: &str) -> Result<Poll, StoreError> {
        ctx.check()?;
        let info = {
            let mut keys = self.lock()?;
            match Self::live(&mut keys, &info_key(id), self.clock.now()) {
                Some(Entry { value: Value::Info(info), .. }) => info.clone(),
                Some(_) => return Err(StoreError::persistence(format!("wrong record type at poll {id}"))),
                None => return Err(StoreError::NotFound),
            }
        };
        Ok(serde_json::from_str(&info)?)
    }

    async fn increment_counters(&self, ctx: &Context, id: &str, indices: &[usize]) -> Result<(), StoreError> {
        ctx.check()?;
        let mut keys = self.lock()?;
        let counters = match Self::live(&mut keys, &votes_key(id), self.clock.now()) {
            Some(Entry { value: Value::Votes(counters), .. }) => counters,
            Some(_) => return Err(StoreError::persistence(format!("wrong record type at poll {id}"))),
            None => return Err(StoreError::persistence(format!("counters for poll {id} are gone"))),
        };

        if let Some(missing) = indices.iter().find(|i| !counters.contains_key(*i)) {
            return Err(StoreError::persistence(format!("poll {id} has no counter {missing}")));
        }
        for index in indices {
            if let Some(count) = counters.get_mut(index) {
                *count += 1;
            }
        }
        Ok(())
    }

    async fn read_counters(&self, ctx: &Context, id: &str) -> Result<Counters, StoreError> {
        ctx.check()?;
        let mut keys = self.lock()?;
        match Self::live(&mut keys, &votes_key(id), self.clock.now()) {
            Some(Entry { value: Value::Votes(counters), .. }) => Ok(counters.clone()),
            Some(_) => Err(StoreError::persistence(format!("wrong record type at poll {id}"))),
            None => Ok(Counters::new()),
        }
    }

    async fn purge_expired(&self, ctx: &Context) -> Result<u64, StoreError> {
        ctx.check()?;
        let now = self.clock.now();
        let mut keys = self.lock()?;
        let before = keys.len();
        keys.retain(|_, entry| entry.expires_at > now);
        Ok((before - keys.len()) as u64)
    }

    async fn close(&self) -> Result<(), StoreError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            if let Ok(mut keys) = self.keys.lock() {
                keys.clear();
            }
        }
        Ok(())
    }
}
