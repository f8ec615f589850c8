use std::sync::Mutex;

use super::*;

/// Something the load manager asked the sink to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Fetch,
    Delete(usize),
    /// A create batch of the given size, with the number of stories stored right before it.
    Create { size: usize, stored_before: usize },
    PutStats(u64),
    Finish,
}

#[derive(Debug, Default)]
struct State {
    stories: Vec<Story>,
    stats: Option<AggregateStats>,
    ops: Vec<Op>,
    creates: usize,
    next_id: usize,
}

/// An in-memory sink that records every operation.
#[derive(Debug, Default)]
pub struct MemorySink {
    assigns_ids: bool,
    /// Refuse the n-th create call (zero based).
    fail_create: Option<usize>,
    state: Mutex<State>,
}

impl MemorySink {
    pub fn local() -> Self {
        Self::default()
    }

    pub fn remote() -> Self {
        Self {
            assigns_ids: true,
            ..Self::default()
        }
    }

    pub fn failing_on_create(mut self, call: usize) -> Self {
        self.fail_create = Some(call);
        self
    }

    pub fn with_stories(self, count: usize) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for i in 0..count {
                state.stories.push(Story {
                    id: Some(StoryId::new(format!("old-{i}"))),
                    title: format!("old {i}"),
                    body: "old".into(),
                    yes_votes: 10,
                    no_votes: 10,
                    top_comment: None,
                });
            }
        }
        self
    }

    pub fn ops(&self) -> Vec<Op> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn stories(&self) -> Vec<Story> {
        self.state.lock().unwrap().stories.clone()
    }

    pub fn stats(&self) -> Option<AggregateStats> {
        self.state.lock().unwrap().stats.clone()
    }

    /// Every operation that changed stored state.
    pub fn mutations(&self) -> Vec<Op> {
        self.ops()
            .into_iter()
            .filter(|op| !matches!(op, Op::Fetch))
            .collect()
    }
}

impl Sink for MemorySink {
    fn assigns_ids(&self) -> bool {
        self.assigns_ids
    }

    async fn fetch_ids(&self, limit: usize) -> Result<Vec<StoryId>> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(Op::Fetch);
        Ok(state
            .stories
            .iter()
            .filter_map(|story| story.id.clone())
            .take(limit)
            .collect())
    }

    async fn delete(&self, ids: &[StoryId]) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.stories.len();
        state
            .stories
            .retain(|story| !story.id.as_ref().is_some_and(|id| ids.contains(id)));
        let deleted = before - state.stories.len();
        state.ops.push(Op::Delete(deleted));
        Ok(deleted)
    }

    async fn create(&self, batch: &[Story]) -> Result<Vec<StoryId>> {
        let mut state = self.state.lock().unwrap();

        let call = state.creates;
        state.creates += 1;
        if self.fail_create == Some(call) {
            return RefusedSnafu {
                reason: format!("create call {call} failed"),
            }
            .fail();
        }

        let stored_before = state.stories.len();
        let mut ids = Vec::with_capacity(batch.len());
        for story in batch {
            let id = match (&story.id, self.assigns_ids) {
                (None, true) => {
                    state.next_id += 1;
                    StoryId::new(format!("mem-{}", state.next_id))
                }
                (Some(id), false) => id.clone(),
                _ => {
                    return RefusedSnafu {
                        reason: "id assignment does not match the sink",
                    }
                    .fail()
                }
            };
            ids.push(id);
        }

        for (story, id) in batch.iter().zip(&ids) {
            state.stories.push(Story {
                id: Some(id.clone()),
                ..story.clone()
            });
        }
        state.ops.push(Op::Create {
            size: batch.len(),
            stored_before,
        });

        Ok(ids)
    }

    async fn put_stats(&self, stats: &AggregateStats) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.stats = Some(stats.clone());
        state.ops.push(Op::PutStats(stats.total_judgments));
        Ok(())
    }

    async fn finish(&self) -> Result<()> {
        self.state.lock().unwrap().ops.push(Op::Finish);
        Ok(())
    }
}
