use chrono::{DateTime, SecondsFormat, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// A UTC instant, stored as an RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize, new)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

pub fn now() -> Timestamp {
    Timestamp(Utc::now())
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}
