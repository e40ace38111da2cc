//! Domain model structs persisted in the local SQLite database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single gallery photo.
///
/// The stored `filename` refers to a file in the server's media directory;
/// the record itself never holds image bytes. Listing and prev/next
/// navigation order photos strictly by `timestamp` descending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Photo {
    /// SQLite rowid.
    pub id: i64,
    /// File name inside the media directory (generated on upload).
    pub filename: String,
    /// Optional display title.
    pub title: Option<String>,
    /// Optional markdown description.
    pub description: Option<String>,
    /// When the photo was uploaded. Defaults to the creation time.
    pub timestamp: DateTime<Utc>,
}

/// A photo about to be inserted; the database assigns the id.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub filename: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Insertion time; callers normally pass `Utc::now()`.
    pub timestamp: DateTime<Utc>,
}

impl NewPhoto {
    /// Convenience constructor that stamps the photo with the current time
    /// and maps empty title/description strings to `None`.
    pub fn now(filename: String, title: String, description: String) -> Self {
        Self {
            filename,
            title: if title.is_empty() { None } else { Some(title) },
            description: if description.is_empty() {
                None
            } else {
                Some(description)
            },
            timestamp: Utc::now(),
        }
    }
}
