//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development. The admin area stays disabled until
//! `LOGIN` is set.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Explicit SQLite database file. When unset the platform data
    /// directory is used.
    /// Env: `DATABASE_PATH`
    pub database_path: Option<PathBuf>,

    /// Filesystem path where uploaded photos are stored.
    /// Env: `MEDIA_PATH`
    /// Default: `./media`
    pub media_path: PathBuf,

    /// Filesystem path of the css/asset directory served under `/static`.
    /// Env: `STATIC_PATH`
    /// Default: `./static`
    pub static_path: PathBuf,

    /// The single admin password. Required to log in; when unset every
    /// login attempt fails.
    /// Env: `LOGIN`
    /// Default: empty (admin area disabled).
    pub login: Option<String>,

    /// Secret used to sign session and flash cookies, at least 64 bytes.
    /// Env: `SESSION_SECRET`
    /// Default: empty (a fresh key is generated at startup, so sessions do
    /// not survive restarts).
    pub session_secret: Option<String>,

    /// Site name rendered in page titles.
    /// Env: `SITE_NAME`
    /// Default: `"Viewfinder"`
    pub site_name: String,

    /// Whether image URLs point at externally produced resized renditions
    /// (`/media/img{size}/...`) instead of the originals.
    /// Env: `RESIZED_MEDIA` (true/false)
    /// Default: `false`
    pub resized_media: bool,

    /// Maximum upload size in bytes (50 MiB).
    /// Env: `MAX_UPLOAD_SIZE`
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            database_path: None,
            media_path: PathBuf::from("./media"),
            static_path: PathBuf::from("./static"),
            login: None,
            session_secret: None,
            site_name: "Viewfinder".to_string(),
            resized_media: false,
            max_upload_size: 50 * 1024 * 1024, // 50 MiB
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(
                    value = %addr,
                    "Invalid HTTP_ADDR, using default"
                );
            }
        }

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("MEDIA_PATH") {
            config.media_path = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("STATIC_PATH") {
            config.static_path = PathBuf::from(path);
        }

        if let Ok(login) = std::env::var("LOGIN") {
            if !login.is_empty() {
                config.login = Some(login);
            }
        }

        if let Ok(secret) = std::env::var("SESSION_SECRET") {
            if !secret.is_empty() {
                config.session_secret = Some(secret);
            }
        }

        if let Ok(name) = std::env::var("SITE_NAME") {
            config.site_name = name;
        }

        if let Ok(val) = std::env::var("RESIZED_MEDIA") {
            match parse_bool(&val) {
                Some(flag) => config.resized_media = flag,
                None => {
                    tracing::warn!(value = %val, "Invalid RESIZED_MEDIA, using default");
                }
            }
        }

        if let Ok(val) = std::env::var("MAX_UPLOAD_SIZE") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_upload_size = n;
            } else {
                tracing::warn!(value = %val, "Invalid MAX_UPLOAD_SIZE, using default");
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

/// Parse a boolean environment value, case-insensitively. Returns `None`
/// for anything unrecognized so the caller can warn and keep its default.
fn parse_bool(val: &str) -> Option<bool> {
    match val.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
