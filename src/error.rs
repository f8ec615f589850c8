use snafu::{Location, Snafu};

use crate::config::CredentialsError;
use crate::load::LoadError;
use crate::sink::SinkError;
use crate::source::SourceError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApplicationError {
    /// could not parse the environment configuration
    ConfigLoad {
        source: envy::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// The document store cannot be used without valid credentials
    Configuration {
        source: CredentialsError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not initialize the logger
    InitializeLogger {
        source: tracing::subscriber::SetGlobalDefaultError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not read the story corpus
    ReadSource {
        source: SourceError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not open the sink
    OpenSink {
        source: SinkError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Seeding stopped before completion
    Load {
        source: LoadError,
        #[snafu(implicit)]
        location: Location,
    },
}
