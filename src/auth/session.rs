//! Admin session storage.
//!
//! Sessions sit behind the [`SessionStore`] trait so the single-admin policy
//! lives in one implementation rather than in the handlers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::token_file::TokenFile;

/// An issued admin token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String) -> Self {
        Self {
            token,
            issued_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Make `session` the only valid session.
    async fn replace(&self, session: Session);

    /// Whether `token` belongs to a live session.
    async fn is_valid(&self, token: &str) -> bool;

    /// Drop every session. Idempotent.
    async fn revoke(&self);

    async fn current(&self) -> Option<Session>;
}

/// Holds at most one session and mirrors it to a token file so it survives restarts.
pub struct FileSessionStore {
    session: RwLock<Option<Session>>,
    file: TokenFile,
}

impl FileSessionStore {
    /// Create an empty store without reading the file.
    pub fn new(file: TokenFile) -> Self {
        Self {
            session: RwLock::new(None),
            file,
        }
    }

    /// Create a store seeded from the token file. A read failure leaves the store empty.
    pub async fn load(file: TokenFile) -> Self {
        let session = match file.load().await {
            Ok(Some(token)) => {
                let issued_at = tokio::fs::metadata(file.path())
                    .await
                    .and_then(|m| m.modified())
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now());
                tracing::info!(
                    "Restored admin session issued at {} from {}",
                    issued_at.to_rfc3339(),
                    file.path().display()
                );
                Some(Session { token, issued_at })
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    "Failed to read admin token from {}: {}",
                    file.path().display(),
                    e
                );
                None
            }
        };

        Self {
            session: RwLock::new(session),
            file,
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn replace(&self, session: Session) {
        let token = session.token.clone();
        *self.session.write().await = Some(session);

        if let Err(e) = self.file.save(&token).await {
            tracing::warn!(
                "Failed to persist admin token to {}: {}",
                self.file.path().display(),
                e
            );
        }
    }

    async fn is_valid(&self, token: &str) -> bool {
        match self.session.read().await.as_ref() {
            Some(session) => super::constant_time_compare(token, &session.token),
            None => false,
        }
    }

    async fn revoke(&self) {
        *self.session.write().await = None;

        if let Err(e) = self.file.clear().await {
            tracing::warn!(
                "Failed to delete admin token file {}: {}",
                self.file.path().display(),
                e
            );
        }
    }

    async fn current(&self) -> Option<Session> {
        self.session.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn token_file(dir: &TempDir) -> TokenFile {
        TokenFile::new(dir.path().join(".admin-token"))
    }

    #[tokio::test]
    async fn test_replace_invalidates_previous() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(token_file(&dir));

        store.replace(Session::new("first".into())).await;
        store.replace(Session::new("second".into())).await;

        assert!(!store.is_valid("first").await);
        assert!(store.is_valid("second").await);
    }

    #[tokio::test]
    async fn test_session_survives_reload() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(token_file(&dir));
        store.replace(Session::new("persisted".into())).await;
        drop(store);

        let reloaded = FileSessionStore::load(token_file(&dir)).await;
        assert!(reloaded.is_valid("persisted").await);
        let session = reloaded.current().await.unwrap();
        assert_eq!(session.token, "persisted");
        assert!(session.issued_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_revoke_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(token_file(&dir));
        store.replace(Session::new("gone".into())).await;

        store.revoke().await;
        store.revoke().await;

        assert!(!store.is_valid("gone").await);
        assert!(!dir.path().join(".admin-token").exists());
        let reloaded = FileSessionStore::load(token_file(&dir)).await;
        assert!(reloaded.current().await.is_none());
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_session() {
        let dir = TempDir::new().unwrap();
        // Parent of the token path is a regular file, so saving fails.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = FileSessionStore::new(TokenFile::new(blocker.join(".admin-token")));

        store.replace(Session::new("memory-only".into())).await;
        assert!(store.is_valid("memory-only").await);
    }

    #[tokio::test]
    async fn test_empty_store_rejects_everything() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::load(token_file(&dir)).await;
        assert!(!store.is_valid("").await);
        assert!(!store.is_valid("anything").await);
    }
}
