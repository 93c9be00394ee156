//! Generic CRUD over a JSON array file.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use super::{generate_id, now_iso, read_json, write_json, Record};
use crate::errors::AppError;

/// An ordered list of records persisted as one JSON array file.
///
/// Mutations hold a per-file lock across read-modify-write so concurrent
/// requests against the same collection cannot lose each other's updates.
pub struct Collection<R> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Collection<R> {
    /// Open the collection file for `R` inside `data_dir`. The file need not exist.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(R::file_name()),
            write_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in file order. A missing file is an empty collection.
    pub async fn list(&self) -> Result<Vec<R>, AppError> {
        Ok(read_json(&self.path).await?.unwrap_or_default())
    }

    pub async fn get(&self, id: &str) -> Result<R, AppError> {
        self.list()
            .await?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(not_found::<R>)
    }

    pub async fn create(&self, new: R::New) -> Result<R, AppError> {
        R::validate_new(&new).map_err(AppError::Validation)?;

        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;

        let now = now_iso();
        let record = R::build(generate_id(), &now, new);
        records.push(record.clone());
        write_json(&self.path, &records).await?;

        tracing::info!("Created {} {}", R::KIND, record.id());
        Ok(record)
    }

    /// Merge `patch` into the record with `id`; fields absent from the patch are kept.
    pub async fn update(&self, id: &str, patch: R::Patch) -> Result<R, AppError> {
        R::validate_patch(&patch).map_err(AppError::Validation)?;

        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;

        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(not_found::<R>)?;
        record.apply(patch, &now_iso());
        let updated = record.clone();
        write_json(&self.path, &records).await?;

        tracing::info!("Updated {} {}", R::KIND, id);
        Ok(updated)
    }

    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;

        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(not_found::<R>());
        }
        write_json(&self.path, &records).await?;

        tracing::info!("Deleted {} {}", R::KIND, id);
        Ok(())
    }
}

fn not_found<R: Record>() -> AppError {
    AppError::NotFound(format!("{} not found", R::KIND))
}
