//! Clearing, batching and committing seeded stories, then deriving the stats singleton.

use std::time::{Duration, Instant};

use derive_new::new;
use rand::Rng;
use serde::Serialize;
use snafu::{ResultExt, Snafu};

use crate::model::{now, AggregateStats, Story, StoryId};
use crate::sink::{Sink, SinkError};

/// Largest number of writes the document store accepts in one atomic batch.
pub const BATCH_SIZE: usize = 500;

/// Number of stories shown by a dry run.
pub const PREVIEW_LEN: usize = 3;

const PREVIEW_TITLE_CHARS: usize = 80;
const PREVIEW_BODY_CHARS: usize = 150;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LoadError {
    /// Nothing was uploaded, some stories may already be gone.
    #[snafu(display("failed to clear existing stories after deleting {deleted}: {source}"))]
    Clear { deleted: usize, source: SinkError },

    /// Batches committed before the failure stay in place.
    #[snafu(display(
        "sink unavailable after committing {committed} stories in {batches_committed} batches: {source}"
    ))]
    SinkUnavailable {
        committed: usize,
        batches_committed: usize,
        source: SinkError,
    },

    #[snafu(display("{uploaded} stories were committed but the stats could not be written: {source}"))]
    Stats { uploaded: usize, source: SinkError },

    #[snafu(display("failed to flush {uploaded} stories to the sink: {source}"))]
    Finish { uploaded: usize, source: SinkError },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, new)]
pub struct UploadOptions {
    pub dry_run: bool,
    pub clear_first: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    pub title: String,
    pub body: String,
    pub yes_votes: u32,
    pub no_votes: u32,
}

/// What a dry run would have written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub total: usize,
    pub sample: Vec<PreviewEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub uploaded: usize,
    pub batches_committed: usize,
    pub cleared: Option<usize>,
    pub stats: Option<AggregateStats>,
    pub preview: Option<Preview>,
    /// Committed stories with their assigned ids.
    pub stories: Vec<Story>,
    pub elapsed: Duration,
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn preview(stories: &[Story]) -> Preview {
    let sample = stories
        .iter()
        .take(PREVIEW_LEN)
        .map(|story| PreviewEntry {
            title: truncate(&story.title, PREVIEW_TITLE_CHARS),
            body: truncate(&story.body, PREVIEW_BODY_CHARS),
            yes_votes: story.yes_votes,
            no_votes: story.no_votes,
        })
        .collect();

    Preview {
        total: stories.len(),
        sample,
    }
}

/// Number of batches needed for `total` stories.
pub fn batch_count(total: usize) -> usize {
    total.div_ceil(BATCH_SIZE)
}

/// Delete every stored story, [BATCH_SIZE] per commit. Returns how many were deleted.
pub async fn clear<S: Sink>(sink: &S) -> Result<usize, LoadError> {
    let mut deleted = 0;

    loop {
        let ids = sink
            .fetch_ids(BATCH_SIZE)
            .await
            .context(ClearSnafu { deleted })?;
        if ids.is_empty() {
            break;
        }

        let removed = sink.delete(&ids).await.context(ClearSnafu { deleted })?;
        deleted += removed;
        tracing::debug!(deleted, "deleted batch of stories");

        if removed == 0 {
            tracing::warn!(pending = ids.len(), "sink reported stories it could not delete");
            break;
        }
    }

    tracing::info!(deleted, "cleared existing stories");
    Ok(deleted)
}

/// Commit `stories` to `sink` in batches of [BATCH_SIZE], then overwrite the stats singleton.
///
/// A dry run only previews and never touches the sink. An empty input is a no-op.
pub async fn upload<S: Sink, R: Rng + ?Sized>(
    mut stories: Vec<Story>,
    sink: &S,
    options: UploadOptions,
    rng: &mut R,
) -> Result<UploadReport, LoadError> {
    let started = Instant::now();

    if options.dry_run {
        let preview = preview(&stories);
        tracing::info!(total = preview.total, "dry run, nothing will be written");
        return Ok(UploadReport {
            preview: Some(preview),
            elapsed: started.elapsed(),
            ..UploadReport::default()
        });
    }

    if stories.is_empty() {
        tracing::warn!("no stories to upload, leaving the sink untouched");
        return Ok(UploadReport::default());
    }

    let cleared = if options.clear_first {
        Some(clear(sink).await?)
    } else {
        None
    };

    let assign_locally = !sink.assigns_ids();
    for story in &mut stories {
        story.id = assign_locally.then(|| StoryId::random(rng));
    }

    let batches = batch_count(stories.len());
    let mut committed = 0;

    for (index, batch) in stories.chunks_mut(BATCH_SIZE).enumerate() {
        let ids = sink
            .create(batch)
            .await
            .context(SinkUnavailableSnafu {
                committed,
                batches_committed: index,
            })?;

        for (story, id) in batch.iter_mut().zip(ids) {
            story.id = Some(id);
        }
        committed += batch.len();

        tracing::info!(
            batch = index + 1,
            batches,
            size = batch.len(),
            committed,
            "uploaded batch"
        );
    }

    let stats = AggregateStats::seed(&stories, rng, now());
    sink.put_stats(&stats).await.context(StatsSnafu { uploaded: committed })?;
    sink.finish().await.context(FinishSnafu { uploaded: committed })?;

    tracing::info!(
        uploaded = committed,
        total_judgments = stats.total_judgments,
        active_users_today = stats.active_users_today,
        stories_judged_today = stats.stories_judged_today,
        "initialized app stats"
    );

    Ok(UploadReport {
        uploaded: committed,
        batches_committed: batches,
        cleared,
        stats: Some(stats),
        preview: None,
        stories,
        elapsed: started.elapsed(),
    })
}
