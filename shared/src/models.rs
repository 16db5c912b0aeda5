use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use time::OffsetDateTime;

/// `None` when `start + ttl` falls outside the representable date range.
pub fn expires_after(start: OffsetDateTime, ttl: std::time::Duration) -> Option<OffsetDateTime> {
    time::Duration::try_from(ttl).ok().and_then(|ttl| start.checked_add(ttl))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Poll {
    pub id: String,
    pub title: String,
    pub options: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Poll {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        options: Vec<String>,
        created_at: OffsetDateTime,
        ttl: std::time::Duration,
    ) -> Option<Self> {
        Some(Self {
            id: id.into(),
            title: title.into(),
            options,
            created_at,
            expires_at: expires_after(created_at, ttl)?,
        })
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePollRequest {
    pub title: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePollResponse {
    pub poll_id: String,
    pub vote_url: String,
    pub results_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub option_indices: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollResults {
    pub poll: Poll,
    pub votes: LabelCounts,
    pub total: u64,
}

/// Vote counts keyed by option label, kept in option order.
///
/// Serializes as a JSON object. Setting a label that is already present
/// replaces its count but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCounts(Vec<(String, u64)>);

impl LabelCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn set(&mut self, label: &str, count: u64) {
        match self.0.iter_mut().find(|(l, _)| l == label) {
            Some(entry) => entry.1 = count,
            None => self.0.push((label.to_string(), count)),
        }
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }
}

impl Serialize for LabelCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LabelCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabelCountsVisitor;

        impl<'de> Visitor<'de> for LabelCountsVisitor {
            type Value = LabelCounts;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of option labels to vote counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<LabelCounts, A::Error> {
                let mut counts = LabelCounts::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, count)) = access.next_entry::<String, u64>()? {
                    counts.set(&label, count);
                }
                Ok(counts)
            }
        }

        deserializer.deserialize_map(LabelCountsVisitor)
    }
}
