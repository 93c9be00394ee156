//! Login and logout endpoints.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{ok, ApiResult, OkResponse};
use crate::auth::AuthService;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/auth/login - Exchange the admin password for a bearer token.
///
/// A body that is not a JSON object carries no password and fails as a wrong one.
pub async fn login(
    State(auth): State<Arc<AuthService>>,
    body: Bytes,
) -> ApiResult<LoginResponse> {
    let request: LoginRequest = serde_json::from_slice(&body).unwrap_or_default();
    let token = auth.login(&request.password).await?;
    Ok(Json(LoginResponse { token }))
}

/// POST /api/auth/logout - Invalidate the admin token.
pub async fn logout(State(auth): State<Arc<AuthService>>) -> Json<OkResponse> {
    auth.logout().await;
    ok()
}
