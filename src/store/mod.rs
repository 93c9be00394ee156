//! Flat-file JSON persistence.
//!
//! Each content type lives in one JSON array file under the data directory and
//! site settings in one JSON object file. Writes go to a temp file first and
//! are renamed into place.

mod collection;
mod site;

pub use collection::*;
pub use site::*;

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;

use crate::errors::AppError;

/// Length of the random part of a record id.
const ID_SUFFIX_LEN: usize = 11;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A typed record stored in a [`Collection`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Request body for creating a record.
    type New: Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Request body for a partial update.
    type Patch: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Collection name: the API path segment and the data file stem.
    const COLLECTION: &'static str;
    /// Human-readable type name used in error messages.
    const KIND: &'static str;
    /// Whether the API serves `GET /api/{collection}/{id}` for this type.
    const FETCH_BY_ID: bool = false;

    fn id(&self) -> &str;

    fn validate_new(_new: &Self::New) -> Result<(), String> {
        Ok(())
    }

    fn validate_patch(_patch: &Self::Patch) -> Result<(), String> {
        Ok(())
    }

    /// Build a record from a create request, filling absent fields with zero values.
    fn build(id: String, now: &str, new: Self::New) -> Self;

    /// Merge the fields present in `patch` and stamp `updatedAt`.
    fn apply(&mut self, patch: Self::Patch, now: &str);

    fn file_name() -> String {
        format!("{}.json", Self::COLLECTION)
    }
}

/// Read and parse a JSON file. A missing file yields `None`.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AppError::storage("read", path, e)),
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| AppError::storage("parse", path, e))
}

/// Serialize `value` as pretty JSON and replace `path` with it.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::storage("create directory for", path, e))?;
    }

    let text =
        serde_json::to_string_pretty(value).map_err(|e| AppError::storage("encode", path, e))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, text)
        .await
        .map_err(|e| AppError::storage("write", path, e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| AppError::storage("replace", path, e))?;

    Ok(())
}

/// Current time as an ISO-8601 UTC timestamp with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// New record id: base-36 millisecond timestamp followed by a random base-36 suffix.
///
/// Collisions are improbable but not checked for.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!("{}{}", to_base36(millis), random_base36(ID_SUFFIX_LEN))
}

pub(crate) fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

pub(crate) fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..36)] as char)
        .collect()
}
