//! Masjid Site Backend
//!
//! REST backend for the masjid website: public content reads, a password-protected
//! admin surface, JSON-file persistence and media uploads.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod store;
pub mod uploads;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use auth::{AuthService, FileSessionStore, TokenFile};
use config::Config;
use models::{Announcement, Event, Project};
use store::{Collection, SiteStore};
use uploads::{UploadStore, UPLOADS_URL_PREFIX};

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across all handlers.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    pub projects: Arc<Collection<Project>>,
    pub events: Arc<Collection<Event>>,
    pub announcements: Arc<Collection<Announcement>>,
    pub site: Arc<SiteStore>,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    /// Build the stores for `config`, restoring any persisted admin session.
    pub async fn new(config: Config) -> Self {
        let sessions = FileSessionStore::load(TokenFile::new(config.token_path())).await;
        let auth = AuthService::new(config.admin_password.clone(), Arc::new(sessions));

        Self {
            auth: Arc::new(auth),
            projects: Arc::new(Collection::new(&config.data_dir)),
            events: Arc::new(Collection::new(&config.data_dir)),
            announcements: Arc::new(Collection::new(&config.data_dir)),
            site: Arc::new(SiteStore::new(&config.data_dir)),
            uploads: Arc::new(UploadStore::new(
                config.uploads_dir.clone(),
                config.max_upload_bytes,
            )),
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/health", get(api::health))
        .route("/auth/login", post(api::login))
        .route("/projects", get(api::list_records::<Project>))
        .route("/projects/{id}", get(api::get_record::<Project>))
        .route("/events", get(api::list_records::<Event>))
        .route("/announcements", get(api::list_records::<Announcement>))
        .route("/site", get(api::get_site));

    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    let admin_routes = Router::new()
        .route("/auth/logout", post(api::logout))
        // Projects
        .route("/projects", post(api::create_record::<Project>))
        .route(
            "/projects/{id}",
            put(api::update_record::<Project>).delete(api::delete_record::<Project>),
        )
        // Events
        .route("/events", post(api::create_record::<Event>))
        .route(
            "/events/{id}",
            put(api::update_record::<Event>).delete(api::delete_record::<Event>),
        )
        // Announcements
        .route("/announcements", post(api::create_record::<Announcement>))
        .route(
            "/announcements/{id}",
            put(api::update_record::<Announcement>).delete(api::delete_record::<Announcement>),
        )
        // Site settings and media
        .route("/site", put(api::update_site))
        .route(
            "/upload",
            post(api::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth::require_admin,
        ));

    Router::new()
        .route("/", get(api::root_info))
        .nest("/api", public_routes.merge(admin_routes))
        .nest_service(
            UPLOADS_URL_PREFIX,
            ServeDir::new(state.config.uploads_dir.clone()),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
