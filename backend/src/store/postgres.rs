use std::time::Duration;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use shared::{Counters, Poll};
use crate::context::Context;
use super::{PollStore, StoreError};

/// PostgreSQL substrate.
///
/// Expiry instants come from the database clock (`now() + ttl`) and every
/// read filters on them, so a poll vanishes the moment its TTL elapses even
/// before the reaper deletes the rows.
/// Expired rows the reaper has not removed yet must not take votes.
const INCREMENT_LIVE_COUNTERS: &str = "UPDATE poll_votes SET votes = votes + 1
     WHERE poll_id = $1 AND option_index = ANY($2) AND expires_at > now()";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StoreError::persistence)
    }
}

fn ttl_seconds(ttl: Duration) -> f64 {
    ttl.as_secs_f64()
}

fn encode_indices(indices: &[usize]) -> Result<Vec<i32>, StoreError> {
    indices
        .iter()
        .map(|&i| i32::try_from(i).map_err(StoreError::persistence))
        .collect()
}

fn decode_counter(index: i32, votes: i64) -> Result<(usize, u64), StoreError> {
    let index = usize::try_from(index).map_err(StoreError::persistence)?;
    let votes = u64::try_from(votes).map_err(StoreError::persistence)?;
    Ok((index, votes))
}

#[rocket::async_trait]
impl PollStore for PgStore {
    async fn put(&self, ctx: &Context, poll: &Poll, ttl: Duration) -> Result<(), StoreError> {
        let option_count = i32::try_from(poll.options.len()).map_err(StoreError::persistence)?;
        let ttl = ttl_seconds(ttl);

        ctx.run(async {
            let mut tx = self.pool.begin().await?;

            sqlx::query(
                "INSERT INTO polls (id, info, expires_at)
                 VALUES ($1, $2, now() + make_interval(secs => $3))
                 ON CONFLICT (id) DO UPDATE SET info = EXCLUDED.info, expires_at = EXCLUDED.expires_at",
            )
            .bind(&poll.id)
            .bind(Json(poll))
            .bind(ttl)
            .execute(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM poll_votes WHERE poll_id = $1")
                .bind(&poll.id)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                "INSERT INTO poll_votes (poll_id, option_index, votes, expires_at)
                 SELECT $1, idx, 0, now() + make_interval(secs => $3)
                 FROM generate_series(0, $2::INTEGER - 1) AS idx",
            )
            .bind(&poll.id)
            .bind(option_count)
            .bind(ttl)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn get(&self, ctx: &Context, id: &str) -> Result<Poll, StoreError> {
        let row: Option<(Json<Poll>,)> = ctx
            .run(async {
                Ok::<_, StoreError>(sqlx::query_as("SELECT info FROM polls WHERE id = $1 AND expires_at > now()")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?)
            })
            .await?;

        row.map(|(Json(poll),)| poll).ok_or(StoreError::NotFound)
    }

    async fn increment_counters(&self, ctx: &Context, id: &str, indices: &[usize]) -> Result<(), StoreError> {
        let encoded = encode_indices(indices)?;

        ctx.run(async {
            let mut tx = self.pool.begin().await?;

            let updated = sqlx::query(INCREMENT_LIVE_COUNTERS)
            .bind(id)
            .bind(&encoded)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if updated != encoded.len() as u64 {
                tx.rollback().await?;
                return Err(StoreError::persistence(format!(
                    "expected {} counters for poll {id}, found {updated}",
                    encoded.len()
                )));
            }

            tx.commit().await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn read_counters(&self, ctx: &Context, id: &str) -> Result<Counters, StoreError> {
        let rows: Vec<(i32, i64)> = ctx
            .run(async {
                Ok::<_, StoreError>(sqlx::query_as(
                    "SELECT option_index, votes FROM poll_votes
                     WHERE poll_id = $1 AND expires_at > now()",
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await?)
            })
            .await?;

        rows.into_iter()
            .map(|(index, votes)| decode_counter(index, votes))
            .collect()
    }

    async fn purge_expired(&self, ctx: &Context) -> Result<u64, StoreError> {
        ctx.run(async {
            let mut tx = self.pool.begin().await?;
            let polls = sqlx::query("DELETE FROM polls WHERE expires_at <= now()")
                .execute(&mut *tx)
                .await?
                .rows_affected();
            let counters = sqlx::query("DELETE FROM poll_votes WHERE expires_at <= now()")
                .execute(&mut *tx)
                .await?
                .rows_affected();
            tx.commit().await?;
            debug!(polls, counters, "purged expired poll rows");
            Ok::<_, StoreError>(polls + counters)
        })
        .await
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}
