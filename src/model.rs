use derive_new::new;
use serde::{Deserialize, Serialize};

pub use stats::*;
pub use story::*;
pub use timestamp::*;

mod stats;
mod story;
mod timestamp;

/// A row as it comes out of the corpus export. Every field is optional, the selector decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct RawRecord {
    #[serde(rename = "submission_title", default)]
    pub title: Option<String>,
    #[serde(rename = "submission_text", default)]
    pub body: Option<String>,
    #[serde(rename = "submission_score", default)]
    pub score: Option<i64>,
    #[serde(rename = "top_comment_1", default)]
    pub top_comment: Option<String>,
}

impl RawRecord {
    /// Popularity score with absent and negative values coerced to zero.
    pub fn popularity(&self) -> u64 {
        self.score.unwrap_or(0).max(0) as u64
    }
}
