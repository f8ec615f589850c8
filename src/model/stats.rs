use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Story, Timestamp};

pub const ACTIVE_USERS_RANGE: RangeInclusive<u32> = 50..=200;
pub const STORIES_JUDGED_RANGE: RangeInclusive<u32> = 500..=2000;

/// The singleton summary record the app reads for its landing screen.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AggregateStats {
    pub total_judgments: u64,
    pub active_users_today: u32,
    pub stories_judged_today: u32,
    pub last_reset: Timestamp,
}

impl AggregateStats {
    /// Derive the stats for exactly the stories written in this run.
    pub fn seed<R: Rng + ?Sized>(stories: &[Story], rng: &mut R, last_reset: Timestamp) -> Self {
        Self {
            total_judgments: stories.iter().map(Story::judgments).sum(),
            active_users_today: rng.random_range(ACTIVE_USERS_RANGE),
            stories_judged_today: rng.random_range(STORIES_JUDGED_RANGE),
            last_reset,
        }
    }
}
