//! Site settings endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Map, Value};

use super::{ApiJson, ApiResult};
use crate::models::SiteSettings;
use crate::store::SiteStore;

/// GET /api/site - Current settings merged over defaults.
pub async fn get_site(State(site): State<Arc<SiteStore>>) -> ApiResult<SiteSettings> {
    Ok(Json(site.get().await?))
}

/// PUT /api/site - Merge allow-listed keys into the settings.
pub async fn update_site(
    State(site): State<Arc<SiteStore>>,
    ApiJson(request): ApiJson<Map<String, Value>>,
) -> ApiResult<SiteSettings> {
    Ok(Json(site.update(&request).await?))
}

/// GET / - Short description of the API for anyone opening the server root.
pub async fn root_info(State(site): State<Arc<SiteStore>>) -> Json<Value> {
    let name = match site.get().await {
        Ok(settings) => settings.site_name,
        Err(_) => SiteSettings::default().site_name,
    };

    Json(json!({
        "name": format!("{} API", name),
        "message": "Use the web frontend to browse the site",
        "api": "/api/projects, /api/events, /api/announcements, /api/site, /api/auth, /api/upload",
    }))
}
