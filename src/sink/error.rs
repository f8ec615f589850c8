use std::path::PathBuf;

use snafu::Snafu;

pub type Result<T, E = SinkError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SinkError {
    #[snafu(display("cannot connect to the document store `{endpoint}`: {source}"))]
    Connect {
        endpoint: String,
        source: surrealdb::Error,
    },
    #[snafu(display("document store unavailable: {source}"))]
    Unavailable { source: surrealdb::Error },
    #[snafu(display("the sink refused the write: {reason}"))]
    Refused { reason: String },

    #[snafu(display("failed to access `{}`: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("`{}` is not a valid story document: {source}", path.display()))]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("failed to encode the story document: {source}"))]
    Encode { source: serde_json::Error },
}
