//! Masjid Site Backend server binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use masjid_site_backend::{config::Config, create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Masjid Site Backend");
    tracing::info!("Data directory: {:?}", config.data_dir);
    tracing::info!("Uploads directory: {:?}", config.uploads_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.uses_default_password() {
        tracing::warn!(
            "SITE_ADMIN_PASSWORD is not set. The default admin password is in use!"
        );
    }

    let bind_addr = config.bind_addr;
    let state = AppState::new(config).await;
    if state.auth.current_token().await.is_some() {
        tracing::info!("Restored persisted admin session");
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
