//! Admin area: dashboard, listing, and the photo CRUD forms.
//!
//! Successful form submissions follow post-redirect-get with a success
//! flash; validation failures re-render the form with the submitted values
//! and one error flash per failing field.

use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::info;

use viewfinder_store::NewPhoto;

use crate::error::AppError;
use crate::forms::PhotoForm;
use crate::session::{self, Flash};
use crate::templates::{
    photo_url, render, AdminDashboardPage, AdminPhotoRow, AdminPhotosPage, EditPhotoPage,
    NewPhotoPage, RemovePhotoPage, DETAIL_SIZE,
};

use super::{page_ctx, page_ctx_with, AppState};

pub async fn dashboard(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse, AppError> {
    let photo_count = state.db()?.count_photos()?;
    let (jar, ctx) = page_ctx(&state, jar);
    Ok((jar, render(AdminDashboardPage { ctx, photo_count })?))
}

pub async fn photos(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse, AppError> {
    let photos = state
        .db()?
        .list_photos()?
        .iter()
        .map(AdminPhotoRow::from_photo)
        .collect();

    let (jar, ctx) = page_ctx(&state, jar);
    Ok((jar, render(AdminPhotosPage { ctx, photos })?))
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

pub async fn new_photo_form(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse, AppError> {
    let (jar, ctx) = page_ctx(&state, jar);
    Ok((
        jar,
        render(NewPhotoPage {
            ctx,
            title: String::new(),
            description: String::new(),
        })?,
    ))
}

pub async fn new_photo_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = PhotoForm::from_multipart(multipart).await?;
    let errors = form.validate(true);

    if errors.is_empty() {
        // validate(true) guarantees the file is present
        let file = form
            .file
            .as_ref()
            .ok_or_else(|| AppError::Internal("validated form lost its file".to_string()))?;

        let filename = state.media.save(&file.original_name, &file.data).await?;
        let photo = state
            .db()?
            .insert_photo(&NewPhoto::now(filename, form.title, form.description))?;

        info!(id = photo.id, file = %photo.filename, "photo uploaded");

        let jar = session::push_flash(jar, Flash::success("Photo uploaded successfully!"));
        return Ok((jar, Redirect::to(&format!("/admin/photos/{}", photo.id))).into_response());
    }

    let (jar, ctx) = page_ctx_with(
        &state,
        jar,
        errors.iter().map(|e| Flash::error(e.to_message())),
    );
    Ok((
        jar,
        render(NewPhotoPage {
            ctx,
            title: form.title,
            description: form.description,
        })?,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

pub async fn edit_photo_form(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(photo_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let photo = state.db()?.get_photo(photo_id)?;

    let (jar, ctx) = page_ctx(&state, jar);
    Ok((
        jar,
        render(EditPhotoPage {
            ctx,
            photo_id,
            preview_url: photo_url(&state.config, &photo.filename, DETAIL_SIZE),
            title: photo.title.unwrap_or_default(),
            description: photo.description.unwrap_or_default(),
        })?,
    ))
}

pub async fn edit_photo_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(photo_id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut photo = state.db()?.get_photo(photo_id)?;
    let form = PhotoForm::from_multipart(multipart).await?;
    let errors = form.validate(false);

    if errors.is_empty() {
        let old_filename = photo.filename.clone();

        let replaced = if let Some(file) = &form.file {
            photo.filename = state.media.save(&file.original_name, &file.data).await?;
            true
        } else {
            false
        };

        photo.title = none_if_empty(form.title);
        photo.description = none_if_empty(form.description);
        state.db()?.update_photo(&photo)?;

        if replaced {
            // The record already points at the new file; a leftover on disk
            // is only worth a warning.
            if let Err(e) = state.media.remove(&old_filename).await {
                tracing::warn!(error = %e, file = %old_filename, "failed to remove replaced media file");
            }
        }

        info!(id = photo.id, replaced, "photo updated");

        let jar = session::push_flash(jar, Flash::success("Photo updated!"));
        return Ok((jar, Redirect::to(&format!("/admin/photos/{photo_id}"))).into_response());
    }

    let (jar, ctx) = page_ctx_with(
        &state,
        jar,
        errors.iter().map(|e| Flash::error(e.to_message())),
    );
    Ok((
        jar,
        render(EditPhotoPage {
            ctx,
            photo_id,
            preview_url: photo_url(&state.config, &photo.filename, DETAIL_SIZE),
            title: form.title,
            description: form.description,
        })?,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Remove
// ---------------------------------------------------------------------------

pub async fn remove_photo_form(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(photo_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let photo = state.db()?.get_photo(photo_id)?;

    let (jar, ctx) = page_ctx(&state, jar);
    Ok((
        jar,
        render(RemovePhotoPage {
            ctx,
            photo_id,
            label: photo.title.unwrap_or(photo.filename),
        })?,
    ))
}

pub async fn remove_photo_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(photo_id): Path<i64>,
) -> Result<Response, AppError> {
    let photo = state.db()?.get_photo(photo_id)?;

    state.db()?.delete_photo(photo_id)?;
    if let Err(e) = state.media.remove(&photo.filename).await {
        tracing::warn!(error = %e, file = %photo.filename, "failed to remove media file");
    }

    info!(id = photo_id, file = %photo.filename, "photo removed");

    let jar = session::push_flash(jar, Flash::success("Photo removed."));
    Ok((jar, Redirect::to("/admin/photos/")).into_response())
}

fn none_if_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
