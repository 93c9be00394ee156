//! Media upload endpoint.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::errors::AppError;
use crate::uploads::UploadStore;

/// Multipart form field carrying the file.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /api/upload - Store one image or video and return its URL.
pub async fn upload_file(
    State(uploads): State<Arc<UploadStore>>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&uploads, e))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let mut pending = uploads
            .begin(file_name.as_deref(), content_type.as_deref())
            .await?;

        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => pending.write(&chunk).await?,
                Ok(None) => break,
                Err(e) => return Err(multipart_error(&uploads, e)),
            }
        }

        let url = pending.finish().await?;
        return Ok(Json(UploadResponse { url }));
    }

    Err(AppError::UploadRejected("No file uploaded".to_string()))
}

fn multipart_error(uploads: &UploadStore, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!("Rejected upload over the body limit");
        uploads.too_large()
    } else {
        AppError::BadRequest(err.body_text())
    }
}
