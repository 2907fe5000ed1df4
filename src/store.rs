use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

/// Load one interchange file. A missing file is an empty catalog; a file
/// that exists but does not match the schema aborts the caller.
pub fn load<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        warn!("{} not found, treating as empty", path.display());
        return Ok(T::default());
    }
    info!("Loading {}", path.display());
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Malformed catalog {}", path.display()))
}

pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Saved {}", path.display());
    Ok(())
}
