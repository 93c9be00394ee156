//! CRUD endpoints shared by projects, events and announcements.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{ApiJson, ApiResult};
use crate::errors::AppError;
use crate::store::{Collection, Record};

/// GET /api/{collection} - List all records in stored order.
pub async fn list_records<R: Record>(
    State(records): State<Arc<Collection<R>>>,
) -> ApiResult<Vec<R>> {
    Ok(Json(records.list().await?))
}

/// GET /api/{collection}/{id} - Get a single record.
pub async fn get_record<R: Record>(
    State(records): State<Arc<Collection<R>>>,
    Path(id): Path<String>,
) -> ApiResult<R> {
    Ok(Json(records.get(&id).await?))
}

/// POST /api/{collection} - Create a record.
pub async fn create_record<R: Record>(
    State(records): State<Arc<Collection<R>>>,
    ApiJson(request): ApiJson<R::New>,
) -> Result<(StatusCode, Json<R>), AppError> {
    let record = records.create(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/{collection}/{id} - Partially update a record.
pub async fn update_record<R: Record>(
    State(records): State<Arc<Collection<R>>>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<R::Patch>,
) -> ApiResult<R> {
    Ok(Json(records.update(&id, request).await?))
}

/// DELETE /api/{collection}/{id} - Delete a record.
pub async fn delete_record<R: Record>(
    State(records): State<Arc<Collection<R>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    records.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
