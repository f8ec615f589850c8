//! Destinations for seeded stories.
//!
//! A sink commits each batch atomically. Sinks that buffer (the local file)
//! only make their writes visible on [Sink::finish].

use std::future::Future;

use crate::model::{AggregateStats, Story, StoryId};

pub use detached::Detached;
pub use error::*;
pub use file::FileSink;
pub use surreal::SurrealSink;

mod detached;
mod error;
mod file;
#[cfg(test)]
pub(crate) mod memory;
mod surreal;

pub trait Sink {
    /// Whether the sink assigns record ids itself at write time.
    fn assigns_ids(&self) -> bool;

    /// Ids of up to `limit` stored stories, in no particular order.
    fn fetch_ids(&self, limit: usize) -> impl Future<Output = Result<Vec<StoryId>>> + Send;

    /// Delete the given stories as one atomic operation and return how many were removed.
    fn delete(&self, ids: &[StoryId]) -> impl Future<Output = Result<usize>> + Send;

    /// Create the given stories as one atomic operation and return their ids, in order.
    ///
    /// Stories must carry an id exactly when [Sink::assigns_ids] is false.
    fn create(&self, batch: &[Story]) -> impl Future<Output = Result<Vec<StoryId>>> + Send;

    /// Overwrite the stats singleton.
    fn put_stats(&self, stats: &AggregateStats) -> impl Future<Output = Result<()>> + Send;

    /// Make buffered writes durable.
    fn finish(&self) -> impl Future<Output = Result<()>> + Send;
}
