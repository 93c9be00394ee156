//! REST API module.
//!
//! Handlers return bare JSON bodies; failures render as `{ "error", "code" }`.

mod auth;
mod content;
mod site;
mod upload;

pub use auth::*;
pub use content::*;
pub use site::*;
pub use upload::*;

use axum::{extract::FromRequest, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Response type for JSON handlers.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// JSON request body whose rejections render as `{ "error", "code" }`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `{ "ok": true }`
#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

pub fn ok() -> Json<OkResponse> {
    Json(OkResponse { ok: true })
}

/// GET /api/health
pub async fn health() -> Json<OkResponse> {
    ok()
}
