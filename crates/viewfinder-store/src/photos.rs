//! CRUD helpers for the `photos` table.
//!
//! All listing queries order by `timestamp DESC` (newest first); prev/next
//! navigation walks the same total order by adjacent timestamp, not by id.

use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{NewPhoto, Photo};

/// Neighbors of a photo in the timestamp-descending listing.
///
/// `prev` is the next-older photo (appears after it in the listing), `next`
/// the next-newer one. Either side is `None` at the ends of the gallery.
#[derive(Debug, Clone, Default)]
pub struct Neighbors {
    pub prev: Option<Photo>,
    pub next: Option<Photo>,
}

impl Database {
    /// Insert a new photo and return it with its assigned id.
    pub fn insert_photo(&self, photo: &NewPhoto) -> Result<Photo> {
        self.conn().execute(
            "INSERT INTO photos (filename, title, description, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                photo.filename,
                photo.title,
                photo.description,
                photo.timestamp.to_rfc3339(),
            ],
        )?;

        let id = self.conn().last_insert_rowid();
        Ok(Photo {
            id,
            filename: photo.filename.clone(),
            title: photo.title.clone(),
            description: photo.description.clone(),
            timestamp: photo.timestamp,
        })
    }

    pub fn get_photo(&self, id: i64) -> Result<Photo> {
        self.conn()
            .query_row(
                "SELECT id, filename, title, description, timestamp
                 FROM photos WHERE id = ?1",
                params![id],
                row_to_photo,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// All photos, newest first. Used by the admin listing.
    pub fn list_photos(&self) -> Result<Vec<Photo>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, filename, title, description, timestamp
             FROM photos
             ORDER BY timestamp DESC",
        )?;

        let rows = stmt.query_map([], row_to_photo)?;

        let mut photos = Vec::new();
        for row in rows {
            photos.push(row?);
        }
        Ok(photos)
    }

    /// One page of the public gallery. `page` is 1-based; out-of-range pages
    /// return an empty vec.
    pub fn list_photos_page(&self, page: u32, per_page: u32) -> Result<Vec<Photo>> {
        let page = page.max(1);
        // Widen before multiplying; the page number comes straight from a
        // public URL and must not be able to overflow the offset. Two u32
        // factors always fit in u64.
        let offset = ((page as u64 - 1) * per_page as u64).min(i64::MAX as u64) as i64;

        let mut stmt = self.conn().prepare(
            "SELECT id, filename, title, description, timestamp
             FROM photos
             ORDER BY timestamp DESC
             LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt.query_map(params![per_page, offset], row_to_photo)?;

        let mut photos = Vec::new();
        for row in rows {
            photos.push(row?);
        }
        Ok(photos)
    }

    pub fn count_photos(&self) -> Result<u32> {
        let count: u32 =
            self.conn()
                .query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Immediate neighbors of `photo` by timestamp.
    ///
    /// Strict comparison: photos sharing the exact timestamp are not each
    /// other's neighbors.
    pub fn neighbors(&self, photo: &Photo) -> Result<Neighbors> {
        let ts = photo.timestamp.to_rfc3339();

        let prev = self
            .conn()
            .query_row(
                "SELECT id, filename, title, description, timestamp
                 FROM photos
                 WHERE timestamp < ?1
                 ORDER BY timestamp DESC
                 LIMIT 1",
                params![ts],
                row_to_photo,
            )
            .map(Some)
            .or_else(none_on_no_rows)?;

        let next = self
            .conn()
            .query_row(
                "SELECT id, filename, title, description, timestamp
                 FROM photos
                 WHERE timestamp > ?1
                 ORDER BY timestamp ASC
                 LIMIT 1",
                params![ts],
                row_to_photo,
            )
            .map(Some)
            .or_else(none_on_no_rows)?;

        Ok(Neighbors { prev, next })
    }

    /// Persist edits to an existing photo. The timestamp is never rewritten;
    /// the listing position of a photo is fixed at upload time.
    pub fn update_photo(&self, photo: &Photo) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE photos SET filename = ?1, title = ?2, description = ?3
             WHERE id = ?4",
            params![photo.filename, photo.title, photo.description, photo.id],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    pub fn delete_photo(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM photos WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

fn none_on_no_rows(e: rusqlite::Error) -> Result<Option<Photo>> {
    match e {
        rusqlite::Error::QueryReturnedNoRows => Ok(None),
        other => Err(StoreError::Sqlite(other)),
    }
}

fn row_to_photo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Photo> {
    let id: i64 = row.get(0)?;
    let filename: String = row.get(1)?;
    let title: Option<String> = row.get(2)?;
    let description: Option<String> = row.get(3)?;
    let ts_str: String = row.get(4)?;

    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Photo {
        id,
        filename,
        title,
        description,
        timestamp,
    })
}
