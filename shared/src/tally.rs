use std::collections::BTreeMap;
use crate::models::{LabelCounts, Poll, PollResults};

/// Vote counters of one poll, option index to count.
pub type Counters = BTreeMap<usize, u64>;

/// Projects a poll and its counters into label-keyed results.
///
/// Options are walked in order and a missing counter reads as zero. Two
/// options sharing a label end up under one key holding the later count,
/// while `total` still includes both.
pub fn tally(poll: Poll, counters: &Counters) -> PollResults {
    let mut votes = LabelCounts::with_capacity(poll.options.len());
    let mut total = 0u64;

    for (index, label) in poll.options.iter().enumerate() {
        let count = counters.get(&index).copied().unwrap_or(0);
        votes.set(label, count);
        total += count;
    }

    PollResults { poll, votes, total }
}
