use snafu::OptionExt;

use super::*;

const REASON: &str = "no sink is attached to a dry run";

/// Stand-in for a dry run, where no store is configured. Every operation is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

fn refuse<T>() -> Result<T> {
    None.context(RefusedSnafu { reason: REASON })
}

impl Sink for Detached {
    fn assigns_ids(&self) -> bool {
        false
    }

    async fn fetch_ids(&self, _limit: usize) -> Result<Vec<StoryId>> {
        refuse()
    }

    async fn delete(&self, _ids: &[StoryId]) -> Result<usize> {
        refuse()
    }

    async fn create(&self, _batch: &[Story]) -> Result<Vec<StoryId>> {
        refuse()
    }

    async fn put_stats(&self, _stats: &AggregateStats) -> Result<()> {
        refuse()
    }

    async fn finish(&self) -> Result<()> {
        refuse()
    }
}
