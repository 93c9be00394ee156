//! Client for the site API.
//!
//! A live client talks to a running server with the stored admin token. A
//! static client serves reads from pre-generated JSON snapshots and refuses
//! every mutation, so the same calling code works for a server-less deployment.

mod error;

pub use error::*;

use std::path::PathBuf;
use std::time::Duration;

use reqwest::{multipart, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::api::{LoginRequest, LoginResponse, UploadResponse, UPLOAD_FIELD};
use crate::auth::TokenFile;
use crate::models::SiteSettings;
use crate::store::Record;

pub const STATIC_MODE_MESSAGE: &str =
    "Static deployment: admin panel is read-only. Edit the snapshot JSON files and redeploy.";

pub const STATIC_UPLOAD_MESSAGE: &str =
    "Uploads are not available in a static deployment. Add media to the uploads folder and reference it in the snapshot JSON.";

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(90);

enum Backend {
    Live { base_url: String, token: TokenFile },
    Static { snapshot_dir: PathBuf },
}

/// One file in a batch upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

pub struct SiteClient {
    http: reqwest::Client,
    backend: Backend,
}

impl SiteClient {
    /// Client for a running server. The admin token is kept in `token`.
    pub fn live(base_url: impl Into<String>, token: TokenFile) -> Self {
        Self {
            http: reqwest::Client::new(),
            backend: Backend::Live {
                base_url: base_url.into().trim_end_matches('/').to_string(),
                token,
            },
        }
    }

    /// Read-only client over `<dir>/projects.json`, `<dir>/site.json`, etc.
    pub fn static_snapshots(snapshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            http: reqwest::Client::new(),
            backend: Backend::Static {
                snapshot_dir: snapshot_dir.into(),
            },
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self.backend, Backend::Static { .. })
    }

    pub async fn is_authenticated(&self) -> bool {
        match &self.backend {
            Backend::Live { token, .. } => matches!(token.load().await, Ok(Some(_))),
            Backend::Static { .. } => false,
        }
    }

    // ==================== AUTH ====================

    /// Log in and keep the returned token for later requests.
    pub async fn login(&self, password: &str) -> Result<String, ClientError> {
        let (base_url, token) = self.live_backend()?;

        let response = self
            .http
            .post(format!("{}/api/auth/login", base_url))
            .json(&LoginRequest {
                password: password.to_string(),
            })
            .send()
            .await?;

        // A wrong password is not an expired session.
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(error_from_response(response).await);
        }

        let body: LoginResponse = expect_body(self.read_response(response).await?)?;
        token.save(&body.token).await?;
        Ok(body.token)
    }

    /// Log out on the server and forget the local token.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let Backend::Live { token, .. } = &self.backend else {
            return Ok(());
        };

        let result = self
            .request::<Value>(Method::POST, "/api/auth/logout", None)
            .await;
        token.clear().await?;

        match result {
            Ok(_) | Err(ClientError::SessionExpired) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // ==================== CONTENT ====================

    pub async fn list<R: Record>(&self) -> Result<Vec<R>, ClientError> {
        let path = format!("/api/{}", R::COLLECTION);
        expect_body(self.request(Method::GET, &path, None).await?)
    }

    /// Fetch one record. Types without a by-id endpoint, and static snapshots,
    /// are served by scanning the list.
    pub async fn get<R: Record>(&self, id: &str) -> Result<R, ClientError> {
        if self.is_static() || !R::FETCH_BY_ID {
            return self
                .list::<R>()
                .await?
                .into_iter()
                .find(|r| r.id() == id)
                .ok_or(ClientError::NotFound(R::KIND));
        }

        let path = format!("/api/{}/{}", R::COLLECTION, id);
        expect_body(self.request(Method::GET, &path, None).await?)
    }

    pub async fn create<R: Record>(&self, new: &R::New) -> Result<R, ClientError> {
        R::validate_new(new).map_err(ClientError::Validation)?;

        let path = format!("/api/{}", R::COLLECTION);
        let body = serde_json::to_value(new)?;
        expect_body(self.request(Method::POST, &path, Some(body)).await?)
    }

    pub async fn update<R: Record>(&self, id: &str, patch: &R::Patch) -> Result<R, ClientError> {
        R::validate_patch(patch).map_err(ClientError::Validation)?;

        let path = format!("/api/{}/{}", R::COLLECTION, id);
        let body = serde_json::to_value(patch)?;
        expect_body(self.request(Method::PUT, &path, Some(body)).await?)
    }

    pub async fn delete<R: Record>(&self, id: &str) -> Result<(), ClientError> {
        let path = format!("/api/{}/{}", R::COLLECTION, id);
        self.request::<Value>(Method::DELETE, &path, None).await?;
        Ok(())
    }

    // ==================== SITE ====================

    pub async fn site(&self) -> Result<SiteSettings, ClientError> {
        expect_body(self.request(Method::GET, "/api/site", None).await?)
    }

    pub async fn update_site(
        &self,
        patch: &Map<String, Value>,
    ) -> Result<SiteSettings, ClientError> {
        let body = Value::Object(patch.clone());
        expect_body(self.request(Method::PUT, "/api/site", Some(body)).await?)
    }

    // ==================== UPLOADS ====================

    /// Upload one file and return its URL.
    pub async fn upload(&self, file: UploadFile) -> Result<String, ClientError> {
        let Backend::Live { base_url, token } = &self.backend else {
            return Err(ClientError::StaticMode(STATIC_UPLOAD_MESSAGE));
        };

        let part = multipart::Part::bytes(file.data)
            .file_name(file.file_name)
            .mime_str(&file.mime_type)?;
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        let mut builder = self
            .http
            .post(format!("{}/api/upload", base_url))
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT);
        if let Some(t) = token.load().await? {
            builder = builder.bearer_auth(t);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::Http(e)
            }
        })?;

        let body: UploadResponse = expect_body(self.read_response(response).await?)?;
        Ok(body.url)
    }

    /// Upload files in order. The first failure aborts the rest and fails the batch.
    pub async fn upload_all(&self, files: Vec<UploadFile>) -> Result<Vec<String>, ClientError> {
        let mut urls = Vec::with_capacity(files.len());
        for file in files {
            urls.push(self.upload(file).await?);
        }
        Ok(urls)
    }

    // ==================== TRANSPORT ====================

    fn live_backend(&self) -> Result<(&str, &TokenFile), ClientError> {
        match &self.backend {
            Backend::Live { base_url, token } => Ok((base_url, token)),
            Backend::Static { .. } => Err(ClientError::StaticMode(STATIC_MODE_MESSAGE)),
        }
    }

    /// Send a JSON request. `Ok(None)` means the server answered 204.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<T>, ClientError> {
        if let Backend::Static { snapshot_dir } = &self.backend {
            if method != Method::GET {
                return Err(ClientError::StaticMode(STATIC_MODE_MESSAGE));
            }
            let name = path.trim_start_matches("/api/");
            let raw = tokio::fs::read_to_string(snapshot_dir.join(format!("{}.json", name))).await?;
            return Ok(Some(serde_json::from_str(&raw)?));
        }

        let (base_url, token) = self.live_backend()?;
        let mut builder = self.http.request(method, format!("{}{}", base_url, path));
        if let Some(t) = token.load().await? {
            builder = builder.bearer_auth(t);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        self.read_response(response).await
    }

    async fn read_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<T>, ClientError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            if let Backend::Live { token, .. } = &self.backend {
                if let Err(e) = token.clear().await {
                    tracing::warn!("Failed to discard stored token: {}", e);
                }
            }
            return Err(ClientError::SessionExpired);
        }
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        Ok(Some(response.json().await?))
    }
}

/// Build an `Api` error from the server's `{ "error": ... }` body, falling back to
/// the raw text and then the status reason.
async fn error_from_response(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| body.get("error")?.as_str().map(str::to_string))
        .or_else(|| (!text.trim().is_empty()).then(|| text.clone()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

fn expect_body<T>(body: Option<T>) -> Result<T, ClientError> {
    body.ok_or_else(|| ClientError::Api {
        status: 204,
        message: "Empty response".to_string(),
    })
}
