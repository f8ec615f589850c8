use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use snafu::ResultExt;

mod cli;
mod config;
mod error;
mod load;
mod logger;
mod model;
mod report;
mod select;
mod sink;
mod source;
mod votes;

use cli::Cli;
use config::{Config, Credentials};
use error::{ApplicationError, ConfigurationSnafu, LoadSnafu, OpenSinkSnafu, ReadSourceSnafu};
use load::{UploadOptions, UploadReport};
use model::Story;
use sink::{Detached, FileSink, Sink, SurrealSink};

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let cli = Cli::parse();
    let config = config::load()?;

    let _guard = logger::init(&config)?;

    run(cli, config)
        .await
        .inspect_err(|error| tracing::error!(%error, "seeding aborted"))
}

async fn run(cli: Cli, config: Config) -> Result<(), ApplicationError> {
    tracing::info!(source = %cli.source.display(), top = cli.top, sample = cli.sample, "seeding stories");

    let corpus = source::read(&cli.source).await.context(ReadSourceSnafu)?;
    let selection = cli.selector().select(corpus.records);

    if selection.is_empty() {
        tracing::warn!(seen = selection.summary.seen, "no valid stories found, nothing to seed");
        return Ok(());
    }
    if let Some((min, max)) = selection.summary.score_range {
        tracing::info!(min, max, "selected score range");
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut stories = votes::synthesize_all(selection.candidates, &mut rng);
    if cli.shuffle() {
        stories.shuffle(&mut rng);
    }
    report::Distribution::of(&stories).log();

    let options = cli.upload_options();
    let report = if options.dry_run {
        seed(stories, &Detached, options, &mut rng).await?
    } else if let Some(path) = &cli.output {
        let sink = FileSink::open(path).await.context(OpenSinkSnafu)?;
        seed(stories, &sink, options, &mut rng).await?
    } else {
        let credentials = Credentials::load(&config.credentials).context(ConfigurationSnafu)?;
        let sink = SurrealSink::connect(&credentials, &config.layout)
            .await
            .context(OpenSinkSnafu)?;
        seed(stories, &sink, options, &mut rng).await?
    };

    log_report(&report);
    Ok(())
}

fn log_report(report: &UploadReport) {
    if let Some(preview) = &report.preview {
        for (index, entry) in preview.sample.iter().enumerate() {
            tracing::info!(
                story = index + 1,
                title = %entry.title,
                body = %entry.body,
                yes_votes = entry.yes_votes,
                no_votes = entry.no_votes,
                "preview"
            );
        }
        tracing::info!(total = preview.total, "dry run finished, nothing was written");
        return;
    }

    for story in report.stories.iter().take(load::PREVIEW_LEN) {
        if let Some(id) = &story.id {
            tracing::info!(
                %id,
                title = %story.title,
                yes_votes = story.yes_votes,
                no_votes = story.no_votes,
                "seeded story"
            );
        }
    }

    tracing::info!(
        uploaded = report.uploaded,
        batches = report.batches_committed,
        cleared = ?report.cleared,
        total_judgments = ?report.stats.as_ref().map(|stats| stats.total_judgments),
        elapsed = %humantime::format_duration(Duration::from_millis(report.elapsed.as_millis() as u64)),
        "seeding finished"
    );
}

async fn seed<S: Sink>(
    stories: Vec<Story>,
    sink: &S,
    options: UploadOptions,
    rng: &mut StdRng,
) -> Result<UploadReport, ApplicationError> {
    load::upload(stories, sink, options, rng)
        .await
        .context(LoadSnafu)
}
