use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use shared::{CreatePollResponse, Poll, PollResults, MIN_OPTIONS};
use crate::clock::Clock;
use crate::context::Context;
use crate::error::PollError;
use crate::processor::VoteProcessor;
use crate::store::{PollStore, StoreError};
use crate::utils::{generate_poll_id, results_url, vote_url};

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub base_url: String,
    pub default_ttl: Duration,
    pub max_ttl: Duration,
}

/// Creates polls, records votes and reads results on top of a shared store.
///
/// The service itself holds no mutable state; everything mutable lives in
/// the store.
pub struct PollService {
    store: Arc<dyn PollStore>,
    clock: Arc<dyn Clock>,
    settings: PollSettings,
}

impl PollService {
    pub fn new(store: Arc<dyn PollStore>, clock: Arc<dyn Clock>, settings: PollSettings) -> Self {
        Self { store, clock, settings }
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// `ttl` falls back to the configured default and may not exceed the
    /// configured maximum.
    pub async fn create_poll(
        &self,
        ctx: &Context,
        title: String,
        options: Vec<String>,
        ttl: Option<Duration>,
    ) -> Result<CreatePollResponse, PollError> {
        let ttl = ttl.unwrap_or(self.settings.default_ttl);
        if options.len() < MIN_OPTIONS {
            warn!(options_count = options.len(), "poll rejected: too few options");
            return Err(PollError::InvalidPoll(format!("a poll needs at least {} options", MIN_OPTIONS)));
        }
        if ttl.is_zero() || ttl > self.settings.max_ttl {
            warn!(ttl_secs = ttl.as_secs(), "poll rejected: ttl out of range");
            return Err(PollError::InvalidPoll(format!(
                "ttl must be between 1 and {} seconds",
                self.settings.max_ttl.as_secs()
            )));
        }

        let poll_id = generate_poll_id().map_err(|_| {
            error!("random source unavailable while generating poll id");
            PollError::Persistence("random source unavailable".into())
        })?;

        let poll = Poll::new(poll_id, title, options, self.clock.now(), ttl).ok_or_else(|| {
            warn!(ttl_secs = ttl.as_secs(), "poll rejected: expiry out of range");
            PollError::InvalidPoll("poll expiry is out of range".into())
        })?;

        if let Err(err) = self.store.put(ctx, &poll, ttl).await {
            error!(poll_id = %poll.id, error = %err, "failed to create poll");
            return Err(err.into());
        }

        info!(
            poll_id = %poll.id,
            title = %poll.title,
            options_count = poll.option_count(),
            ttl_secs = ttl.as_secs(),
            "poll created"
        );

        let base_url = &self.settings.base_url;
        Ok(CreatePollResponse {
            vote_url: vote_url(base_url, &poll.id),
            results_url: results_url(base_url, &poll.id),
            poll_id: poll.id,
        })
    }

    pub async fn vote(&self, ctx: &Context, poll_id: &str, option_indices: &[i64]) -> Result<(), PollError> {
        match VoteProcessor::cast_vote(self.store.as_ref(), ctx, poll_id, option_indices).await {
            Ok(()) => {
                info!(poll_id, ?option_indices, votes_count = option_indices.len(), "votes registered");
                Ok(())
            }
            Err(err) => {
                match &err {
                    PollError::NotFound => warn!(poll_id, "vote for non-existent poll"),
                    PollError::InvalidOption(index) => {
                        warn!(poll_id, index, ?option_indices, "invalid option index")
                    }
                    PollError::DuplicateOption(index) => {
                        warn!(poll_id, index, ?option_indices, "duplicate option index")
                    }
                    PollError::Cancelled => warn!(poll_id, "vote cancelled"),
                    PollError::InvalidPoll(reason) => warn!(poll_id, %reason, "vote rejected"),
                    PollError::Persistence(cause) => {
                        error!(poll_id, error = %cause, "failed to register votes")
                    }
                }
                Err(err)
            }
        }
    }

    pub async fn get_results(&self, ctx: &Context, poll_id: &str) -> Result<PollResults, PollError> {
        VoteProcessor::get_results(self.store.as_ref(), ctx, poll_id)
            .await
            .map_err(|err| {
                match &err {
                    PollError::NotFound => warn!(poll_id, "results requested for non-existent poll"),
                    PollError::Cancelled => warn!(poll_id, "results request cancelled"),
                    other => error!(poll_id, error = %other, "failed to get results"),
                }
                err
            })
    }

    pub async fn close(&self) -> Result<(), PollError> {
        self.store.close().await.map_err(|err: StoreError| {
            error!(error = %err, "failed to close store");
            PollError::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;

    const HOUR: Duration = Duration::from_secs(3600);

    fn service() -> (PollService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH));
        let store = Arc::new(MemoryStore::new(clock.clone()));
        let settings = PollSettings {
            base_url: "http://localhost:8000".into(),
            default_ttl: HOUR,
            max_ttl: 24 * HOUR,
        };
        (PollService::new(store, clock.clone(), settings), clock)
    }

    fn options(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[tokio::test]
    async fn create_poll_returns_id_and_locators() {
        let (svc, _) = service();
        let ctx = Context::background();
        let created = svc
            .create_poll(&ctx, "Best color?".into(), options(&["Red", "Blue"]), None)
            .await
            .unwrap();

        assert_eq!(created.poll_id.len(), 7);
        assert_eq!(
            created.vote_url,
            format!("http://localhost:8000/api/v1/polls/{}/vote", created.poll_id)
        );
        assert_eq!(
            created.results_url,
            format!("http://localhost:8000/api/v1/polls/{}/results", created.poll_id)
        );
    }

    #[tokio::test]
    async fn new_poll_has_default_ttl_and_zero_counts() {
        let (svc, _) = service();
        let ctx = Context::background();
        let created = svc
            .create_poll(&ctx, "Best color?".into(), options(&["Red", "Blue", "Green"]), None)
            .await
            .unwrap();

        let results = svc.get_results(&ctx, &created.poll_id).await.unwrap();
        assert_eq!(results.poll.created_at, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(results.poll.expires_at, OffsetDateTime::UNIX_EPOCH + HOUR);
        assert_eq!(results.votes.iter().map(|(_, c)| c).collect::<Vec<_>>(), vec![0, 0, 0]);
        assert_eq!(results.total, 0);
    }

    #[tokio::test]
    async fn explicit_ttl_overrides_default() {
        let (svc, clock) = service();
        let ctx = Context::background();
        let created = svc
            .create_poll(&ctx, "Quick one".into(), options(&["Y", "N"]), Some(Duration::from_secs(60)))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(61));
        assert!(matches!(svc.get_results(&ctx, &created.poll_id).await, Err(PollError::NotFound)));
    }

    #[tokio::test]
    async fn closing_the_store_fails_later_calls() {
        let (svc, _) = service();
        let ctx = Context::background();
        svc.close().await.unwrap();
        svc.close().await.unwrap();
        let result = svc.create_poll(&ctx, "Too late".into(), options(&["A", "B"]), None).await;
        assert!(matches!(result, Err(PollError::Persistence(_))));
    }

    #[tokio::test]
    async fn polls_need_at_least_two_options() {
        let (svc, _) = service();
        let ctx = Context::background();
        for labels in [&[][..], &["A"][..]] {
            let result = svc.create_poll(&ctx, "One".into(), options(labels), None).await;
            assert!(matches!(result, Err(PollError::InvalidPoll(_))), "{:?}", labels);
        }
    }

    #[tokio::test]
    async fn ttl_outside_configured_range_is_rejected() {
        let (svc, _) = service();
        let ctx = Context::background();
        for ttl in [Duration::ZERO, 24 * HOUR + Duration::from_secs(1)] {
            let result = svc.create_poll(&ctx, "Bad ttl".into(), options(&["A", "B"]), Some(ttl)).await;
            assert!(matches!(result, Err(PollError::InvalidPoll(_))), "{:?}", ttl);
        }
        let at_limit = svc.create_poll(&ctx, "Max ttl".into(), options(&["A", "B"]), Some(24 * HOUR)).await;
        assert!(at_limit.is_ok());
    }

    #[tokio::test]
    async fn unrepresentable_expiry_is_rejected_without_panicking() {
        let clock = Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH));
        let huge = Duration::from_secs(400_000_000_000);
        let settings = PollSettings {
            base_url: "http://localhost:8000".into(),
            default_ttl: huge,
            max_ttl: huge,
        };
        let svc = PollService::new(Arc::new(MemoryStore::new(clock.clone())), clock, settings);

        let result = svc
            .create_poll(&Context::background(), "Forever".into(), options(&["A", "B"]), None)
            .await;
        assert!(matches!(result, Err(PollError::InvalidPoll(_))));
    }
}
