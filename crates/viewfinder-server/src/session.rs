//! Signed-cookie session and flash messages.
//!
//! A single shared admin identity means the session cookie only has to carry
//! an "is the admin" marker; the signature keeps it unforgeable. Flash
//! messages ride a second signed cookie as a JSON list and are consumed on
//! the next rendered page.

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;

const SESSION_COOKIE: &str = "session";
const FLASH_COOKIE: &str = "flash";

/// Value stored in the session cookie while logged in.
const ADMIN_MARKER: &str = "admin";

/// Flash message category, mirrored by the css class in the base layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
    Info,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
            Level::Info => "info",
        }
    }
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }
}

/// Build the cookie signing key from configuration.
///
/// Falls back to a freshly generated key (sessions then expire on restart)
/// when no usable secret is configured. `Key` requires at least 64 bytes of
/// secret material.
pub fn signing_key(config: &ServerConfig) -> Key {
    match &config.session_secret {
        Some(secret) => match Key::try_from(secret.as_bytes()) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "SESSION_SECRET unusable, generating a transient key"
                );
                Key::generate()
            }
        },
        None => {
            tracing::warn!("No SESSION_SECRET configured, sessions will not survive restarts");
            Key::generate()
        }
    }
}

pub fn is_authenticated(jar: &SignedCookieJar) -> bool {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value() == ADMIN_MARKER)
        .unwrap_or(false)
}

/// Mark the session as logged in.
pub fn log_in(jar: SignedCookieJar) -> SignedCookieJar {
    jar.add(base_cookie(SESSION_COOKIE, ADMIN_MARKER.to_string()))
}

/// Drop the session cookie.
pub fn log_out(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(base_cookie(SESSION_COOKIE, String::new()))
}

/// Queue a flash message for the next rendered page.
pub fn push_flash(jar: SignedCookieJar, flash: Flash) -> SignedCookieJar {
    let mut flashes = peek_flashes(&jar);
    flashes.push(flash);

    // Serializing a Vec<Flash> cannot fail; fall back to dropping the queue
    // rather than panicking if it somehow does.
    match serde_json::to_string(&flashes) {
        Ok(json) => jar.add(base_cookie(FLASH_COOKIE, json)),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize flash messages");
            jar
        }
    }
}

/// Consume all queued flash messages.
pub fn take_flashes(jar: SignedCookieJar) -> (SignedCookieJar, Vec<Flash>) {
    let flashes = peek_flashes(&jar);
    if flashes.is_empty() {
        return (jar, flashes);
    }
    (jar.remove(base_cookie(FLASH_COOKIE, String::new())), flashes)
}

fn peek_flashes(jar: &SignedCookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| serde_json::from_str(c.value()).ok())
        .unwrap_or_default()
}

fn base_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
