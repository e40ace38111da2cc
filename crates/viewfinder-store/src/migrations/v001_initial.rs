//! v001 -- Initial schema creation.
//!
//! Creates the `photos` table and the timestamp index used by listing and
//! prev/next navigation.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS photos (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    filename    TEXT NOT NULL,                -- file name in the media directory
    title       TEXT,
    description TEXT,                         -- markdown source
    timestamp   TEXT NOT NULL                 -- ISO-8601 / RFC-3339
);

CREATE INDEX IF NOT EXISTS idx_photos_timestamp ON photos(timestamp DESC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
