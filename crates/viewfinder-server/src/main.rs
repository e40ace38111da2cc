use std::sync::{Arc, Mutex};

use tracing::info;
use tracing_subscriber::EnvFilter;

use viewfinder_server::config::ServerConfig;
use viewfinder_server::media::MediaStore;
use viewfinder_server::routes::{build_router, AppState};
use viewfinder_server::session;
use viewfinder_store::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,viewfinder_server=debug")),
        )
        .init();

    info!("Starting Viewfinder v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(
        addr = %config.http_addr,
        media = %config.media_path.display(),
        admin_enabled = config.login.is_some(),
        "Loaded configuration"
    );

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Database (runs migrations on open)
    let db = match &config.database_path {
        Some(path) => Database::open_at(path)?,
        None => Database::new()?,
    };

    // Media store (creates the directory if missing)
    let media = MediaStore::new(config.media_path.clone(), config.max_upload_size).await?;

    // Cookie signing key
    let key = session::signing_key(&config);

    let state = AppState {
        db: Arc::new(Mutex::new(db)),
        media: Arc::new(media),
        config: Arc::new(config.clone()),
        key,
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP server (blocks until shutdown)
    // -----------------------------------------------------------------------
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;

    info!(addr = %config.http_addr, "Listening");

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
