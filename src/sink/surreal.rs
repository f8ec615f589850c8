use serde::Deserialize;
use snafu::ResultExt;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth;
use surrealdb::sql::Thing;
use surrealdb::Surreal;
use tracing::instrument;

use super::*;
use crate::config::{Credentials, Layout};

/// Remote document store backed by SurrealDB. Record ids are assigned by the database.
#[derive(Debug, Clone)]
pub struct SurrealSink {
    database: Surreal<Any>,
    collection: String,
    stats: Thing,
}

#[derive(Debug, Deserialize)]
struct Stored {
    id: Thing,
}

impl SurrealSink {
    pub fn new(database: Surreal<Any>, layout: &Layout) -> Self {
        let stats = Thing::from((layout.stats_table.clone(), layout.stats_id.clone()));

        Self {
            database,
            collection: layout.collection.clone(),
            stats,
        }
    }

    pub async fn connect(credentials: &Credentials, layout: &Layout) -> Result<Self> {
        let endpoint = credentials.endpoint.to_string();
        tracing::info!(%endpoint, namespace = %credentials.namespace, "connecting to document store");

        let database = surrealdb::engine::any::connect(endpoint.as_str())
            .await
            .context(ConnectSnafu {
                endpoint: endpoint.clone(),
            })?;

        database
            .signin(auth::Database {
                namespace: &credentials.namespace,
                database: &credentials.database,
                username: &credentials.username,
                password: &credentials.password,
            })
            .await
            .context(ConnectSnafu {
                endpoint: endpoint.clone(),
            })?;

        database
            .use_ns(&credentials.namespace)
            .use_db(&credentials.database)
            .await
            .context(ConnectSnafu { endpoint })?;

        Ok(Self::new(database, layout))
    }

    fn thing(&self, id: &StoryId) -> Thing {
        Thing::from((self.collection.clone(), id.as_str().to_owned()))
    }
}

fn story_id(thing: &Thing) -> StoryId {
    StoryId::new(thing.id.to_raw())
}

impl Sink for SurrealSink {
    fn assigns_ids(&self) -> bool {
        true
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn fetch_ids(&self, limit: usize) -> Result<Vec<StoryId>> {
        let mut response = self
            .database
            .query("SELECT VALUE id FROM type::table($table) LIMIT $limit")
            .bind(("table", self.collection.as_str()))
            .bind(("limit", limit))
            .await
            .context(UnavailableSnafu)?;

        let ids: Vec<Thing> = response.take(0).context(UnavailableSnafu)?;
        Ok(ids.iter().map(story_id).collect())
    }

    #[instrument(skip_all, fields(collection = %self.collection, count = ids.len()))]
    async fn delete(&self, ids: &[StoryId]) -> Result<usize> {
        let things: Vec<Thing> = ids.iter().map(|id| self.thing(id)).collect();

        let mut response = self
            .database
            .query("DELETE type::table($table) WHERE id INSIDE $ids RETURN BEFORE")
            .bind(("table", self.collection.as_str()))
            .bind(("ids", things))
            .await
            .context(UnavailableSnafu)?;

        let deleted: Vec<Stored> = response.take(0).context(UnavailableSnafu)?;
        Ok(deleted.len())
    }

    #[instrument(skip_all, fields(collection = %self.collection, count = batch.len()))]
    async fn create(&self, batch: &[Story]) -> Result<Vec<StoryId>> {
        if batch.iter().any(|story| story.id.is_some()) {
            return RefusedSnafu {
                reason: "the document store assigns its own story ids",
            }
            .fail();
        }

        let created: Vec<Stored> = self
            .database
            .insert(self.collection.as_str())
            .content(batch)
            .await
            .context(UnavailableSnafu)?;

        tracing::debug!(created = created.len(), "committed batch");
        Ok(created.iter().map(|stored| story_id(&stored.id)).collect())
    }

    #[instrument(skip_all, fields(record = %self.stats))]
    async fn put_stats(&self, stats: &AggregateStats) -> Result<()> {
        let _: Option<Stored> = self
            .database
            .update(self.stats.clone())
            .content(stats)
            .await
            .context(UnavailableSnafu)?;

        Ok(())
    }

    async fn finish(&self) -> Result<()> {
        Ok(())
    }
}
