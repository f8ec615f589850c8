use derive_new::new;
use rand::distr::{Alphanumeric, SampleString};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bodies shorter than this (in characters, after trimming) never reach the store.
pub const MIN_BODY_CHARS: usize = 100;

/// Floor applied to both sides of every synthesized vote pair.
pub const MIN_VOTES: u32 = 10;

const LOCAL_ID_LEN: usize = 20;

/// Opaque identifier of a stored story. Callers must not depend on its format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, new)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    /// A fixed-length alphanumeric token for sinks that do not assign their own ids.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(Alphanumeric.sample_string(rng, LOCAL_ID_LEN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record that passed validation and is waiting for its votes.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Candidate {
    pub title: String,
    pub body: String,
    pub popularity: u64,
    pub top_comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Votes {
    pub yes: u32,
    pub no: u32,
}

impl Votes {
    pub fn total(self) -> u64 {
        u64::from(self.yes) + u64::from(self.no)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Story {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StoryId>,
    pub title: String,
    pub body: String,
    pub yes_votes: u32,
    pub no_votes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_comment: Option<String>,
}

impl Story {
    pub fn from_candidate(candidate: Candidate, votes: Votes) -> Self {
        Self {
            id: None,
            title: candidate.title,
            body: candidate.body,
            yes_votes: votes.yes,
            no_votes: votes.no,
            top_comment: candidate.top_comment,
        }
    }

    pub fn votes(&self) -> Votes {
        Votes::new(self.yes_votes, self.no_votes)
    }

    pub fn judgments(&self) -> u64 {
        self.votes().total()
    }
}
