use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};
use tracing::instrument;

use super::*;

/// The on-disk layout of an exported collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Document {
    pub stories: Vec<Story>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_stats: Option<AggregateStats>,
}

/// A single JSON document on the local filesystem.
///
/// Every operation works on an in-memory copy, [Sink::finish] replaces the file in one write.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    document: Mutex<Document>,
}

impl FileSink {
    /// Open `path`, starting from its current content if the file already exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let mut document: Document =
                    serde_json::from_slice(&bytes).context(DecodeSnafu { path: path.clone() })?;
                let mut rng = rand::rng();
                for story in document.stories.iter_mut().filter(|s| s.id.is_none()) {
                    story.id = Some(StoryId::random(&mut rng));
                }
                document
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Document::default(),
            Err(source) => return Err(SinkError::Io { path, source }),
        };

        tracing::debug!(path = %path.display(), existing = document.stories.len(), "opened story file");

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    fn document(&self) -> std::sync::MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Sink for FileSink {
    fn assigns_ids(&self) -> bool {
        false
    }

    async fn fetch_ids(&self, limit: usize) -> Result<Vec<StoryId>> {
        let document = self.document();
        Ok(document
            .stories
            .iter()
            .filter_map(|story| story.id.clone())
            .take(limit)
            .collect())
    }

    async fn delete(&self, ids: &[StoryId]) -> Result<usize> {
        let mut document = self.document();
        let before = document.stories.len();
        document
            .stories
            .retain(|story| !story.id.as_ref().is_some_and(|id| ids.contains(id)));
        Ok(before - document.stories.len())
    }

    async fn create(&self, batch: &[Story]) -> Result<Vec<StoryId>> {
        let ids = batch
            .iter()
            .map(|story| story.id.clone())
            .collect::<Option<Vec<_>>>()
            .context(RefusedSnafu {
                reason: "stories written to a file need a local id",
            })?;

        self.document().stories.extend_from_slice(batch);
        Ok(ids)
    }

    async fn put_stats(&self, stats: &AggregateStats) -> Result<()> {
        self.document().app_stats = Some(stats.clone());
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn finish(&self) -> Result<()> {
        let bytes = serde_json::to_vec(&*self.document()).context(EncodeSnafu)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .context(IoSnafu { path: parent })?;
        }

        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, &bytes)
            .await
            .context(IoSnafu { path: &staging })?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .context(IoSnafu { path: &self.path })?;

        tracing::info!(bytes = bytes.len(), "wrote story file");
        Ok(())
    }
}
