//! Askama templates and the view models they render.
//!
//! Handlers build these structs; no template reaches into the store or the
//! request. Image URLs are computed here so the `RESIZED_MEDIA` switch stays
//! in one place.

use askama::Template;
use axum::response::Html;
use pulldown_cmark::{html, Parser};

use viewfinder_store::Photo;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::session::Flash;

/// Rendition size (longest edge, px) used by gallery thumbnails.
pub const THUMB_SIZE: u32 = 640;
/// Rendition size used by the photo detail page.
pub const DETAIL_SIZE: u32 = 1600;

/// Render a template into an HTML response.
pub fn render<T: Template>(template: T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

/// Convert a markdown description into HTML.
pub fn markdown_to_html(source: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(source));
    out
}

/// URL for a stored photo file.
///
/// With `RESIZED_MEDIA` enabled the URL points at the externally produced
/// rendition directory for the requested size; otherwise the original file
/// is served directly.
pub fn photo_url(config: &ServerConfig, filename: &str, size: u32) -> String {
    if config.resized_media {
        format!("/media/img{size}/{filename}")
    } else {
        format!("/media/{filename}")
    }
}

/// Context shared by every page: site chrome and pending flash messages.
#[derive(Debug, Clone)]
pub struct PageCtx {
    pub site_name: String,
    pub logged_in: bool,
    pub flashes: Vec<Flash>,
}

impl PageCtx {
    pub fn new(config: &ServerConfig, logged_in: bool, flashes: Vec<Flash>) -> Self {
        Self {
            site_name: config.site_name.clone(),
            logged_in,
            flashes,
        }
    }
}

// ---------------------------------------------------------------------------
// Public pages
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub ctx: PageCtx,
}

#[derive(Template)]
#[template(path = "me.html")]
pub struct MePage {
    pub ctx: PageCtx,
}

/// One thumbnail card in the gallery grid.
pub struct GalleryPhoto {
    pub id: i64,
    pub title: Option<String>,
    pub thumb_url: String,
}

impl GalleryPhoto {
    pub fn from_photo(config: &ServerConfig, photo: &Photo) -> Self {
        Self {
            id: photo.id,
            title: photo.title.clone(),
            thumb_url: photo_url(config, &photo.filename, THUMB_SIZE),
        }
    }
}

#[derive(Template)]
#[template(path = "photography.html")]
pub struct GalleryPage {
    pub ctx: PageCtx,
    pub photos: Vec<GalleryPhoto>,
    pub page: u32,
    pub page_count: u32,
}

/// Everything the detail page shows for one photo.
pub struct PhotoView {
    pub id: i64,
    pub title: Option<String>,
    pub description_html: Option<String>,
    pub url: String,
    pub taken: String,
    pub prev_id: Option<i64>,
    pub next_id: Option<i64>,
}

impl PhotoView {
    pub fn new(
        config: &ServerConfig,
        photo: &Photo,
        prev: Option<&Photo>,
        next: Option<&Photo>,
    ) -> Self {
        Self {
            id: photo.id,
            title: photo.title.clone(),
            description_html: photo.description.as_deref().map(markdown_to_html),
            url: photo_url(config, &photo.filename, DETAIL_SIZE),
            taken: photo.timestamp.format("%e %B %Y").to_string(),
            prev_id: prev.map(|p| p.id),
            next_id: next.map(|p| p.id),
        }
    }
}

#[derive(Template)]
#[template(path = "view_photo.html")]
pub struct PhotoPage {
    pub ctx: PageCtx,
    pub photo: PhotoView,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub ctx: PageCtx,
    pub next: Option<String>,
}

// ---------------------------------------------------------------------------
// Admin pages
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "admin/admin.html")]
pub struct AdminDashboardPage {
    pub ctx: PageCtx,
    pub photo_count: u32,
}

/// One row in the admin photo table.
pub struct AdminPhotoRow {
    pub id: i64,
    pub filename: String,
    pub title: Option<String>,
    pub taken: String,
}

impl AdminPhotoRow {
    pub fn from_photo(photo: &Photo) -> Self {
        Self {
            id: photo.id,
            filename: photo.filename.clone(),
            title: photo.title.clone(),
            taken: photo.timestamp.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "admin/photos.html")]
pub struct AdminPhotosPage {
    pub ctx: PageCtx,
    pub photos: Vec<AdminPhotoRow>,
}

#[derive(Template)]
#[template(path = "admin/new_photo.html")]
pub struct NewPhotoPage {
    pub ctx: PageCtx,
    pub title: String,
    pub description: String,
}

#[derive(Template)]
#[template(path = "admin/photo.html")]
pub struct EditPhotoPage {
    pub ctx: PageCtx,
    pub photo_id: i64,
    pub preview_url: String,
    pub title: String,
    pub description: String,
}

#[derive(Template)]
#[template(path = "admin/remove_photo.html")]
pub struct RemovePhotoPage {
    pub ctx: PageCtx,
    pub photo_id: i64,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Error pages (standalone; rendered without application state)
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "error/404.html")]
pub struct NotFoundPage;

#[derive(Template)]
#[template(path = "error/500.html")]
pub struct ServerErrorPage;
