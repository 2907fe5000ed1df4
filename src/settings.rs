use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use ::config::{Config, Environment};
use serde::Deserialize;

/// Runtime settings. Defaults live here; any key can be overridden with a
/// `GHIBLI_`-prefixed environment variable (e.g. `GHIBLI_PAGE_DELAY_MS=1200`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub page_delay_ms: u64,
    pub max_breadth: usize,
    pub max_characters: usize,
    pub data_dir: PathBuf,
    pub output: PathBuf,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Config::builder()
            .set_default("base_url", "https://ghibli.fandom.com")?
            .set_default("request_timeout_secs", 12_i64)?
            .set_default("page_delay_ms", 800_i64)?
            .set_default("max_breadth", 30_i64)?
            .set_default("max_characters", 20_i64)?
            .set_default("data_dir", "data")?
            .set_default("output", "ghibli-dataset.ttl")?
            .add_source(Environment::with_prefix("GHIBLI").try_parsing(true))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn films_path(&self) -> PathBuf {
        self.data_dir.join("films.json")
    }

    pub fn series_path(&self) -> PathBuf {
        self.data_dir.join("series.json")
    }

    pub fn shorts_path(&self) -> PathBuf {
        self.data_dir.join("shorts.json")
    }
}
