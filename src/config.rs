use std::ffi::OsString;
use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

/// Field names match the environment variables once envy lower-cases them.
#[derive(Debug, Clone, Deserialize)]
struct RawSettings {
    #[serde(default = "default_bucket")]
    source_bucket: String,
    #[serde(default = "default_bucket")]
    dest_bucket: String,
    job_id: Option<String>,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_simulated_work_ms")]
    simulated_work_ms: u64,
    http_port: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub source_bucket: String,
    pub dest_bucket: String,
    pub job_id: String,
    pub log_level: String,
    pub simulated_work: Duration,
    pub http_port: Option<u16>,
}

impl Settings {
    pub fn from_env() -> Result<Self, envy::Error> {
        Self::from_vars(lossy_vars(std::env::vars_os()))
    }

    /// Same as [`Settings::from_env`] but over an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: RawSettings = envy::from_iter(vars)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawSettings) -> Self {
        let job_id = raw
            .job_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("job-{}", Uuid::new_v4()))
            .to_lowercase();

        // Bucket names are passed through untouched, empty strings included.
        Self {
            source_bucket: raw.source_bucket,
            dest_bucket: raw.dest_bucket,
            job_id,
            log_level: raw.log_level.to_ascii_lowercase(),
            simulated_work: Duration::from_millis(raw.simulated_work_ms),
            http_port: raw.http_port,
        }
    }
}

/// `std::env::vars` panics on non-UTF-8 entries; invalid bytes become U+FFFD instead.
fn lossy_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter().map(|(key, value)| {
        (
            key.to_string_lossy().into_owned(),
            value.to_string_lossy().into_owned(),
        )
    })
}

fn default_bucket() -> String {
    "unknown".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_simulated_work_ms() -> u64 {
    5_000
}
