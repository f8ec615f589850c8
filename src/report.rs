use serde::Serialize;

use crate::model::Story;

/// How the synthesized votes split across all stories. Console output only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub clear_yes: usize,
    pub clear_no: usize,
    pub split: usize,
}

impl Distribution {
    pub fn of(stories: &[Story]) -> Self {
        stories.iter().fold(Self::default(), |mut acc, story| {
            let (yes, no) = (u64::from(story.yes_votes), u64::from(story.no_votes));
            if yes > no * 2 {
                acc.clear_yes += 1;
            } else if no > yes * 2 {
                acc.clear_no += 1;
            } else {
                acc.split += 1;
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.clear_yes + self.clear_no + self.split
    }

    fn percent(&self, count: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => count as f64 * 100.0 / total as f64,
        }
    }

    pub fn log(&self) {
        tracing::info!(
            clear_yes = self.clear_yes,
            clear_no = self.clear_no,
            split = self.split,
            "vote distribution: {:.1}% clear yes, {:.1}% clear no, {:.1}% split",
            self.percent(self.clear_yes),
            self.percent(self.clear_no),
            self.percent(self.split),
        );
    }
}
