use std::path::PathBuf;

use clap::Parser;

use crate::load::UploadOptions;
use crate::select::{Policy, Selector};

pub const DEFAULT_TOP: usize = 3500;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Parser)]
#[command(name = "story-seeder", about = "Seed the story store with corpus stories and synthesized votes")]
pub struct Cli {
    /// JSON-lines export of the corpus
    #[arg(long, env = "SEED_SOURCE")]
    pub source: PathBuf,

    /// Number of stories to upload
    #[arg(long, default_value_t = DEFAULT_TOP)]
    pub top: usize,

    /// Skip stories below this popularity score
    #[arg(long)]
    pub min_score: Option<u64>,

    /// Pick a seeded random sample instead of the most popular stories
    #[arg(long)]
    pub sample: bool,

    /// Seed for sampling, vote synthesis and shuffling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Preview without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Delete existing stories before uploading
    #[arg(long)]
    pub clear: bool,

    /// Write a JSON file instead of uploading to the document store
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Keep ranked order instead of shuffling before upload
    #[arg(long)]
    pub no_shuffle: bool,
}

impl Cli {
    pub fn selector(&self) -> Selector {
        let policy = if self.sample {
            Policy::Sample {
                seed: self.seed.unwrap_or(DEFAULT_SEED),
            }
        } else {
            Policy::Rank
        };

        Selector {
            min_score: self.min_score,
            ..Selector::new(policy, self.top)
        }
    }

    pub fn upload_options(&self) -> UploadOptions {
        UploadOptions::new(self.dry_run, self.clear)
    }

    /// Ranked selections reveal the ranking unless shuffled.
    pub fn shuffle(&self) -> bool {
        !self.sample && !self.no_shuffle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_ranked_top_stories() {
        let cli = Cli::parse_from(["story-seeder", "--source", "corpus.jsonl"]);

        assert_eq!(cli.selector(), Selector::new(Policy::Rank, DEFAULT_TOP));
        assert_eq!(cli.upload_options(), UploadOptions::default());
        assert!(cli.shuffle());
        assert_eq!(cli.output, None);
    }

    #[test]
    fn sample_flags() {
        let cli = Cli::parse_from([
            "story-seeder",
            "--source",
            "corpus.jsonl",
            "--sample",
            "--seed",
            "7",
            "--min-score",
            "100",
            "--top",
            "10",
            "--dry-run",
            "--clear",
        ]);

        let selector = cli.selector();
        assert_eq!(selector.policy, Policy::Sample { seed: 7 });
        assert_eq!(selector.target, 10);
        assert_eq!(selector.min_score, Some(100));
        assert_eq!(cli.upload_options(), UploadOptions::new(true, true));
        assert!(!cli.shuffle());
    }
}
