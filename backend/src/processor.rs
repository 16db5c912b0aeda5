use std::collections::HashSet;
use shared::{Poll, PollResults};
use crate::context::Context;
use crate::error::PollError;
use crate::store::PollStore;

pub struct VoteProcessor;

impl VoteProcessor {
    /// Checks every index against the poll before anything is written.
    ///
    /// Range violations are reported before duplicates, each for the first
    /// offending index in request order.
    pub fn validate_indices(poll: &Poll, option_indices: &[i64]) -> Result<Vec<usize>, PollError> {
        let option_count = poll.option_count();
        let indices = option_indices
            .iter()
            .map(|&raw| {
                usize::try_from(raw)
                    .ok()
                    .filter(|&index| index < option_count)
                    .ok_or(PollError::InvalidOption(raw))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::with_capacity(indices.len());
        for (&raw, &index) in option_indices.iter().zip(&indices) {
            if !seen.insert(index) {
                return Err(PollError::DuplicateOption(raw));
            }
        }
        Ok(indices)
    }

    pub async fn cast_vote(
        store: &dyn PollStore,
        ctx: &Context,
        poll_id: &str,
        option_indices: &[i64],
    ) -> Result<(), PollError> {
        let poll = store.get(ctx, poll_id).await?;
        let indices = Self::validate_indices(&poll, option_indices)?;
        if indices.is_empty() {
            return Ok(());
        }
        store.increment_counters(ctx, poll_id, &indices).await?;
        Ok(())
    }

    pub async fn get_results(store: &dyn PollStore, ctx: &Context, poll_id: &str) -> Result<PollResults, PollError> {
        let poll = store.get(ctx, poll_id).await?;
        let counters = store.read_counters(ctx, poll_id).await?;
        Ok(shared::tally(poll, &counters))
    }
}
