//! Login and logout for the single shared admin identity.

use axum::extract::{Host, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::forms::LoginForm;
use crate::session::{self, Flash};
use crate::templates::{render, LoginPage};

use super::{page_ctx, page_ctx_with, AppState};

#[derive(Debug, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

pub async fn login_form(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(query): Query<NextParam>,
) -> Result<Response, AppError> {
    if session::is_authenticated(&jar) {
        return Ok(Redirect::to("/admin/").into_response());
    }

    let (jar, ctx) = page_ctx(&state, jar);
    Ok((
        jar,
        render(LoginPage {
            ctx,
            next: query.next,
        })?,
    )
        .into_response())
}

pub async fn login_submit(
    State(state): State<AppState>,
    Host(host): Host,
    jar: SignedCookieJar,
    Query(query): Query<NextParam>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if session::is_authenticated(&jar) {
        return Ok(Redirect::to("/admin/").into_response());
    }

    if password_matches(&state.config.login, &form.password) {
        let next = query.next.as_deref().filter(|n| !n.is_empty());

        if let Some(target) = next {
            if !is_safe_redirect(target, &host) {
                tracing::warn!(target, "rejecting unsafe post-login redirect");
                return Err(AppError::BadRequest("Unsafe redirect target".to_string()));
            }
        }

        let jar = session::log_in(jar);
        let jar = session::push_flash(jar, Flash::success("Login successful!"));
        return Ok((jar, Redirect::to(next.unwrap_or("/admin/"))).into_response());
    }

    let (jar, ctx) = page_ctx_with(&state, jar, [Flash::error("Wrong password.")]);
    Ok((
        jar,
        render(LoginPage {
            ctx,
            next: query.next,
        })?,
    )
        .into_response())
}

pub async fn logout(jar: SignedCookieJar) -> impl IntoResponse {
    if session::is_authenticated(&jar) {
        let jar = session::log_out(jar);
        (jar, Redirect::to("/"))
    } else {
        let jar = session::push_flash(
            jar,
            Flash::error("You have to be logged in to log out! ಠ_ಠ"),
        );
        (jar, Redirect::to("/"))
    }
}

/// Constant-time password check. An unset `LOGIN` rejects everything.
fn password_matches(expected: &Option<String>, given: &str) -> bool {
    let Some(expected) = expected else {
        tracing::warn!("login attempt while LOGIN is not configured");
        return false;
    };

    let expected = expected.as_bytes();
    let given = given.as_bytes();
    expected.len() == given.len() && expected.ct_eq(given).unwrap_u8() == 1
}

/// Whether a post-login redirect target stays on this origin.
///
/// Relative paths are always fine; absolute http(s) URLs must carry exactly
/// the authority of the incoming request. Anything else (other schemes,
/// backslash tricks, foreign hosts) is rejected.
pub fn is_safe_redirect(target: &str, host: &str) -> bool {
    // Browsers normalize backslashes to slashes, so a `\` can smuggle in a
    // foreign authority.
    if target.contains('\\') {
        return false;
    }

    // Protocol-relative: same check as an absolute URL.
    if let Some(rest) = target.strip_prefix("//") {
        return authority(rest).eq_ignore_ascii_case(host);
    }

    if target.starts_with('/') {
        return true;
    }

    if let Some(rest) = target
        .strip_prefix("http://")
        .or_else(|| target.strip_prefix("https://"))
    {
        return authority(rest).eq_ignore_ascii_case(host);
    }

    // A colon before the first slash means some other scheme (javascript:,
    // data:, ...).
    let first_segment = target.split('/').next().unwrap_or(target);
    if first_segment.contains(':') {
        return false;
    }

    // Bare relative path, resolves against the current origin.
    true
}

fn authority(rest: &str) -> &str {
    rest.split(['/', '?', '#']).next().unwrap_or("")
}
