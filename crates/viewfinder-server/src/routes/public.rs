//! Public pages: front page, gallery listing, photo detail, about.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum_extra::extract::cookie::SignedCookieJar;

use crate::error::AppError;
use crate::templates::{
    render, GalleryPage, GalleryPhoto, IndexPage, MePage, PhotoPage, PhotoView,
};

use super::{page_ctx, AppState};

/// Photos per gallery page.
pub const PER_PAGE: u32 = 9;

pub async fn index(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse, AppError> {
    let (jar, ctx) = page_ctx(&state, jar);
    Ok((jar, render(IndexPage { ctx })?))
}

pub async fn me(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse, AppError> {
    let (jar, ctx) = page_ctx(&state, jar);
    Ok((jar, render(MePage { ctx })?))
}

pub async fn gallery_first(
    state: State<AppState>,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse, AppError> {
    gallery(state, jar, 1).await
}

pub async fn gallery_page(
    state: State<AppState>,
    jar: SignedCookieJar,
    Path(page): Path<u32>,
) -> Result<impl IntoResponse, AppError> {
    gallery(state, jar, page).await
}

async fn gallery(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    page: u32,
) -> Result<impl IntoResponse, AppError> {
    let page = page.max(1);

    let (photos, count) = {
        let db = state.db()?;
        (db.list_photos_page(page, PER_PAGE)?, db.count_photos()?)
    };

    let photos = photos
        .iter()
        .map(|p| GalleryPhoto::from_photo(&state.config, p))
        .collect();
    let page_count = count.div_ceil(PER_PAGE).max(1);

    let (jar, ctx) = page_ctx(&state, jar);
    Ok((
        jar,
        render(GalleryPage {
            ctx,
            photos,
            page,
            page_count,
        })?,
    ))
}

pub async fn view_photo(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(photo_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let (photo, neighbors) = {
        let db = state.db()?;
        let photo = db.get_photo(photo_id)?;
        let neighbors = db.neighbors(&photo)?;
        (photo, neighbors)
    };

    let view = PhotoView::new(
        &state.config,
        &photo,
        neighbors.prev.as_ref(),
        neighbors.next.as_ref(),
    );

    let (jar, ctx) = page_ctx(&state, jar);
    Ok((jar, render(PhotoPage { ctx, photo: view })?))
}
