use std::path::{Path, PathBuf};

use serde::Deserialize;
use snafu::{ResultExt, Snafu};
use url::Url;

use crate::error::{ApplicationError, ConfigLoadSnafu};

/// Environment configuration, every variable is prefixed with `SEED_`.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_credentials")]
    pub credentials: PathBuf,
    #[serde(flatten)]
    pub layout: Layout,
}

pub fn load() -> Result<Config, ApplicationError> {
    envy::prefixed("SEED_").from_env().context(ConfigLoadSnafu)
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_credentials() -> PathBuf {
    PathBuf::from("credentials.json")
}

/// Where stories and the stats singleton live in the document store.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Layout {
    pub collection: String,
    pub stats_table: String,
    pub stats_id: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            collection: "stories".to_string(),
            stats_table: "app_stats".to_string(),
            stats_id: "global".to_string(),
        }
    }
}

/// The credential file for the remote document store.
#[derive(Deserialize, Clone)]
pub struct Credentials {
    pub endpoint: Url,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Snafu)]
pub enum CredentialsError {
    #[snafu(display("credential file not found at `{}`", path.display()))]
    Missing { path: PathBuf },
    #[snafu(display("could not read credential file `{}`: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("credential file `{}` is malformed: {source}", path.display()))]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Credentials {
    /// Read the credential file. Must succeed before anything talks to the network.
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        if !path.exists() {
            return MissingSnafu { path }.fail();
        }

        let content = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        serde_json::from_str(&content).context(MalformedSnafu { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let result = Credentials::load(&path);
        assert!(matches!(result, Err(CredentialsError::Missing { .. })));
    }

    #[test]
    fn credentials_are_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(
            &path,
            serde_json::json!({
                "endpoint": "http://localhost:8000",
                "namespace": "judge",
                "database": "prod",
                "username": "seeder",
                "password": "hunter2",
            })
            .to_string(),
        )
        .unwrap();

        let credentials = Credentials::load(&path).unwrap();
        assert_eq!(credentials.endpoint.as_str(), "http://localhost:8000/");
        assert_eq!(credentials.namespace, "judge");
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }

    #[test]
    fn incomplete_credentials_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{ "endpoint": "http://localhost:8000" }"#).unwrap();

        let result = Credentials::load(&path);
        assert!(matches!(result, Err(CredentialsError::Malformed { .. })));
    }

    #[test]
    fn layout_defaults() {
        let layout: Layout = serde_json::from_str("{}").unwrap();
        assert_eq!(layout, Layout::default());
        assert_eq!(layout.collection, "stories");
    }
}
