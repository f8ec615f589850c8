//! Reader for JSON-lines exports of the story corpus.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};

use crate::model::RawRecord;

#[derive(Debug, Snafu)]
pub enum SourceError {
    #[snafu(display("could not open corpus `{}`: {source}", path.display()))]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("could not read corpus `{}`: {source}", path.display()))]
    ReadLine {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("corpus reader stopped unexpectedly: {source}"))]
    Join { source: tokio::task::JoinError },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    pub records: Vec<RawRecord>,
    /// Lines that were not a JSON object with the expected fields.
    pub malformed: usize,
}

/// Parse every non-blank line of `reader`. Malformed lines, including ones that are
/// not UTF-8, are counted and skipped. Only I/O failures are errors.
pub fn parse<R: BufRead>(reader: R) -> Result<Corpus, std::io::Error> {
    let mut corpus = Corpus::default();

    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        if line.trim_ascii().is_empty() {
            continue;
        }

        match serde_json::from_slice::<RawRecord>(&line) {
            Ok(record) => corpus.records.push(record),
            Err(error) => {
                tracing::warn!(line = index + 1, %error, "skipping malformed corpus row");
                corpus.malformed += 1;
            }
        }
    }

    Ok(corpus)
}

/// Read the corpus at `path` on the blocking pool.
pub async fn read(path: &Path) -> Result<Corpus, SourceError> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<Corpus, SourceError> {
        let file = std::fs::File::open(&path).context(OpenSnafu { path: &path })?;
        let corpus =
            parse(std::io::BufReader::new(file)).context(ReadLineSnafu { path: &path })?;

        tracing::info!(
            path = %path.display(),
            rows = corpus.records.len(),
            malformed = corpus.malformed,
            "loaded corpus"
        );
        Ok(corpus)
    })
    .await
    .context(JoinSnafu)?
}
