//! Site settings persistence.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{now_iso, read_json, write_json};
use crate::errors::AppError;
use crate::models::SiteSettings;

/// Stamped on every write; never accepted from a request.
const UPDATED_AT: &str = "updatedAt";

/// Single-object JSON file holding [`SiteSettings`].
pub struct SiteStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SiteStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("site.json"),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored settings over defaults. A missing file yields the defaults.
    pub async fn get(&self) -> Result<SiteSettings, AppError> {
        Ok(read_json(&self.path).await?.unwrap_or_default())
    }

    /// Merge the known keys of `patch` as strings; unknown keys are ignored.
    pub async fn update(&self, patch: &Map<String, Value>) -> Result<SiteSettings, AppError> {
        let _guard = self.write_lock.lock().await;

        let current = self.get().await?;
        let mut merged = to_object(&current)?;
        for key in allowed_keys()? {
            if let Some(value) = patch.get(&key) {
                merged.insert(key, Value::String(coerce_string(value)));
            }
        }
        merged.insert(UPDATED_AT.to_string(), Value::String(now_iso()));

        let updated: SiteSettings = serde_json::from_value(Value::Object(merged))
            .map_err(|e| AppError::Internal(format!("Invalid site settings: {}", e)))?;
        write_json(&self.path, &updated).await?;

        tracing::info!("Updated site settings");
        Ok(updated)
    }
}

/// Every settings key except `updatedAt`.
fn allowed_keys() -> Result<Vec<String>, AppError> {
    Ok(to_object(&SiteSettings::default())?
        .into_iter()
        .map(|(key, _)| key)
        .filter(|key| key != UPDATED_AT)
        .collect())
}

fn to_object(settings: &SiteSettings) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(settings) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Internal("Site settings must be an object".to_string())),
        Err(e) => Err(AppError::Internal(format!("Invalid site settings: {}", e))),
    }
}

/// Render a submitted value as text: strings verbatim, everything else as JSON.
fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
