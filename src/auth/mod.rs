//! Admin authentication.
//!
//! One configured password; a successful login issues a random bearer token that
//! replaces any earlier one. Token comparisons are constant-time.

mod session;
mod token_file;

pub use session::*;
pub use token_file::*;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Number of random bytes in an admin token (hex-encoded to 64 characters).
pub const TOKEN_BYTES: usize = 32;

/// Issues, verifies and revokes the admin token.
pub struct AuthService {
    password: String,
    sessions: Arc<dyn SessionStore>,
}

impl AuthService {
    pub fn new(password: impl Into<String>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            password: password.into(),
            sessions,
        }
    }

    /// Exchange the admin password for a fresh token.
    pub async fn login(&self, password: &str) -> Result<String, AppError> {
        if !constant_time_compare(password, &self.password) {
            tracing::warn!("Rejected admin login: invalid password");
            return Err(AppError::Unauthorized("Invalid password".to_string()));
        }

        let token = generate_token();
        self.sessions.replace(Session::new(token.clone())).await;
        tracing::info!("Admin logged in");

        Ok(token)
    }

    pub async fn logout(&self) {
        self.sessions.revoke().await;
        tracing::info!("Admin logged out");
    }

    pub async fn verify(&self, token: &str) -> bool {
        self.sessions.is_valid(token).await
    }

    pub async fn current_token(&self) -> Option<String> {
        self.sessions.current().await.map(|s| s.token)
    }
}

/// Generate a random hex token from the OS-seeded thread RNG.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    value.strip_prefix("Bearer ")
}

/// Middleware guarding admin routes.
pub async fn require_admin(
    State(auth): State<Arc<AuthService>>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(|s| s.to_string());

    match presented {
        Some(token) if auth.verify(&token).await => next.run(request).await,
        _ => AppError::Unauthorized("Unauthorized".to_string()).into_response(),
    }
}

/// Perform constant-time string comparison.
pub(crate) fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    a_bytes.ct_eq(b_bytes).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn service(dir: &TempDir) -> AuthService {
        let store = FileSessionStore::new(TokenFile::new(dir.path().join(".admin-token")));
        AuthService::new("admin123", Arc::new(store))
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_generated_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[tokio::test]
    async fn test_login_then_verify() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);

        let token = auth.login("admin123").await.unwrap();
        assert!(auth.verify(&token).await);
        assert!(!auth.verify("not-the-token").await);
        assert!(!auth.verify(&token[..63]).await);
    }

    #[tokio::test]
    async fn test_wrong_password_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);
        let token = auth.login("admin123").await.unwrap();

        let err = auth.login("wrong").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(auth.verify(&token).await);
        assert_eq!(auth.current_token().await, Some(token));
    }

    #[tokio::test]
    async fn test_new_login_replaces_old_token() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);

        let first = auth.login("admin123").await.unwrap();
        let second = auth.login("admin123").await.unwrap();

        assert!(!auth.verify(&first).await);
        assert!(auth.verify(&second).await);
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);
        let token = auth.login("admin123").await.unwrap();

        auth.logout().await;
        auth.logout().await;

        assert!(!auth.verify(&token).await);
        assert_eq!(auth.current_token().await, None);
    }

    #[tokio::test]
    async fn test_restart_keeps_token_valid() {
        let dir = TempDir::new().unwrap();
        let token = service(&dir).login("admin123").await.unwrap();

        let store = FileSessionStore::load(TokenFile::new(dir.path().join(".admin-token"))).await;
        let restarted = AuthService::new("admin123", Arc::new(store));
        assert!(restarted.verify(&token).await);
    }

    #[tokio::test]
    async fn test_require_admin_middleware() {
        let dir = TempDir::new().unwrap();
        let auth = Arc::new(service(&dir));
        let token = auth.login("admin123").await.unwrap();

        let app = Router::new()
            .route("/guarded", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(auth.clone(), require_admin));

        let missing = app
            .clone()
            .oneshot(axum::http::Request::get("/guarded").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let wrong = app
            .clone()
            .oneshot(
                axum::http::Request::get("/guarded")
                    .header(header::AUTHORIZATION, "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

        let ok = app
            .oneshot(
                axum::http::Request::get("/guarded")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
    }
}
