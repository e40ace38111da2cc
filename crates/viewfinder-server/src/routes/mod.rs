//! Router assembly and the pieces shared by every handler.

pub mod admin;
pub mod auth;
pub mod public;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{DefaultBodyLimit, FromRef, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use viewfinder_store::Database;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::media::MediaStore;
use crate::session::{self, Flash};
use crate::templates::PageCtx;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub media: Arc<MediaStore>,
    pub config: Arc<ServerConfig>,
    pub key: Key,
}

impl AppState {
    /// Lock the database for one handler's queries.
    pub fn db(&self) -> Result<MutexGuard<'_, Database>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal("database lock poisoned".to_string()))
    }
}

// Lets SignedCookieJar extract itself from our state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/admin/", get(admin::dashboard))
        .route("/admin/photos/", get(admin::photos))
        .route(
            "/admin/photos/new",
            get(admin::new_photo_form).post(admin::new_photo_submit),
        )
        .route(
            "/admin/photos/:photo_id",
            get(admin::edit_photo_form).post(admin::edit_photo_submit),
        )
        .route(
            "/admin/photos/remove/:photo_id",
            get(admin::remove_photo_form).post(admin::remove_photo_submit),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_login));

    Router::new()
        .route("/", get(public::index))
        .route("/photo/", get(public::gallery_first))
        .route("/photo/page/:page", get(public::gallery_page))
        .route("/photo/:photo_id", get(public::view_photo))
        .route("/me", get(public::me))
        .route("/login", get(auth::login_form).post(auth::login_submit))
        .route("/logout", get(auth::logout))
        .merge(admin_routes)
        .nest_service("/media", ServeDir::new(state.config.media_path.clone()))
        .nest_service("/static", ServeDir::new(state.config.static_path.clone()))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Guard for the admin area: unauthenticated requests are bounced to the
/// login form, remembering where they wanted to go.
async fn require_login(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let jar = SignedCookieJar::from_headers(req.headers(), state.key.clone());

    if session::is_authenticated(&jar) {
        return next.run(req).await;
    }

    tracing::debug!(path = %req.uri().path(), "redirecting unauthenticated request to login");

    let target = format!("/login?next={}", req.uri().path());
    let jar = session::push_flash(jar, Flash::info("Please log in to access this page."));
    (jar, Redirect::to(&target)).into_response()
}

async fn not_found() -> AppError {
    AppError::NotFound
}

/// Drain pending flash messages and build the shared page context.
pub(crate) fn page_ctx(state: &AppState, jar: SignedCookieJar) -> (SignedCookieJar, PageCtx) {
    let logged_in = session::is_authenticated(&jar);
    let (jar, flashes) = session::take_flashes(jar);
    (jar, PageCtx::new(&state.config, logged_in, flashes))
}

/// Page context for a form re-render: pending flashes plus immediate ones
/// that must show on this very response rather than the next page load.
pub(crate) fn page_ctx_with(
    state: &AppState,
    jar: SignedCookieJar,
    immediate: impl IntoIterator<Item = Flash>,
) -> (SignedCookieJar, PageCtx) {
    let (jar, mut ctx) = page_ctx(state, jar);
    ctx.flashes.extend(immediate);
    (jar, ctx)
}
