//! # viewfinder-server
//!
//! The web half of Viewfinder, a small personal photo site:
//! - **Public pages**: front page, paginated gallery (9 per page, newest
//!   first), photo detail with prev/next navigation, about page
//! - **Single-admin auth**: one configured password, signed-cookie session,
//!   same-origin `next` redirect after login
//! - **Admin CRUD**: upload, edit, and remove photos via multipart forms
//! - **Media store**: uploads on disk under generated names; resized
//!   renditions are produced externally and only linked here

pub mod config;
pub mod error;
pub mod forms;
pub mod media;
pub mod routes;
pub mod session;
pub mod templates;
