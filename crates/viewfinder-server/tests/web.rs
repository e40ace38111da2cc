//! End-to-end tests driving the router with in-process requests.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use viewfinder_server::config::ServerConfig;
use viewfinder_server::media::MediaStore;
use viewfinder_server::routes::{build_router, AppState};
use viewfinder_server::session;
use viewfinder_store::{Database, NewPhoto};

const PASSWORD: &str = "hunter2";
const HOST: &str = "example.com";
const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

struct TestApp {
    app: Router,
    state: AppState,
    _dir: tempfile::TempDir,
}

async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();

    let config = ServerConfig {
        media_path: dir.path().join("media"),
        static_path: dir.path().join("static"),
        login: Some(PASSWORD.to_string()),
        session_secret: Some("integration-test-secret-".repeat(4)),
        ..ServerConfig::default()
    };

    std::fs::create_dir_all(config.static_path.join("css")).unwrap();
    std::fs::write(config.static_path.join("css/style.css"), "body {}").unwrap();

    let db = Database::open_at(&dir.path().join("test.db")).unwrap();
    let media = MediaStore::new(config.media_path.clone(), config.max_upload_size)
        .await
        .unwrap();
    let key = session::signing_key(&config);

    let state = AppState {
        db: Arc::new(Mutex::new(db)),
        media: Arc::new(media),
        config: Arc::new(config),
        key,
    };

    TestApp {
        app: build_router(state.clone()),
        state,
        _dir: dir,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("host", HOST)
        .body(Body::empty())
        .unwrap()
}

fn get_with_cookies(uri: &str, cookies: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("host", HOST)
        .header(COOKIE, cookies)
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, body: &str, cookies: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("host", HOST)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookies) = cookies {
        builder = builder.header(COOKIE, cookies);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Parts are `(field name, optional file name, bytes)`.
fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post_multipart(uri: &str, parts: &[(&str, Option<&str>, &[u8])], cookies: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("host", HOST)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(COOKIE, cookies)
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Collapse all Set-Cookie headers into a Cookie header value.
fn cookies_of(res: &Response<Body>) -> String {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

fn location_of(res: &Response<Body>) -> &str {
    res.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

async fn body_string(res: Response<Body>) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Log in and return the session cookies.
async fn log_in(app: &Router) -> String {
    let res = app
        .clone()
        .oneshot(post_form("/login", &format!("password={PASSWORD}"), None))
        .await
        .unwrap();
    assert!(res.status().is_redirection(), "login should redirect");
    assert_eq!(location_of(&res), "/admin/");
    cookies_of(&res)
}

fn seed_photos(state: &AppState, n: usize) -> Vec<i64> {
    let db = state.db.lock().unwrap();
    (0..n)
        .map(|i| {
            // Distinct timestamps keep the listing order deterministic.
            let mut photo = NewPhoto::now(format!("seed-{i}.jpg"), format!("Seed {i}"), String::new());
            photo.timestamp = photo.timestamp + chrono::Duration::seconds(i as i64);
            db.insert_photo(&photo).unwrap().id
        })
        .collect()
}

#[tokio::test]
async fn public_pages_render() {
    let t = test_app().await;

    for uri in ["/", "/me", "/photo/", "/photo/page/2", "/login"] {
        let res = t.app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "GET {uri}");
    }
}

#[tokio::test]
async fn static_assets_serve_from_configured_path() {
    let t = test_app().await;

    let res = t
        .app
        .clone()
        .oneshot(get("/static/css/style.css"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "body {}");
}

#[tokio::test]
async fn unknown_paths_and_photos_are_404() {
    let t = test_app().await;

    let res = t.app.clone().oneshot(get("/photo/999")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = t.app.clone().oneshot(get("/no/such/page")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(body_string(res).await.contains("404"));
}

#[tokio::test]
async fn gallery_paginates_nine_per_page() {
    let t = test_app().await;
    seed_photos(&t.state, 12);

    let page1 = body_string(t.app.clone().oneshot(get("/photo/")).await.unwrap()).await;
    assert_eq!(page1.matches("gallery-item").count(), 9);

    let page2 = body_string(t.app.clone().oneshot(get("/photo/page/2")).await.unwrap()).await;
    assert_eq!(page2.matches("gallery-item").count(), 3);

    let page3 = body_string(t.app.clone().oneshot(get("/photo/page/3")).await.unwrap()).await;
    assert_eq!(page3.matches("gallery-item").count(), 0);

    // Absurd page numbers render empty too instead of wrapping around.
    let res = t
        .app
        .clone()
        .oneshot(get("/photo/page/4294967295"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_string(res).await;
    assert_eq!(body.matches("gallery-item").count(), 0);
}

#[tokio::test]
async fn photo_detail_links_neighbors() {
    let t = test_app().await;
    let ids = seed_photos(&t.state, 3);

    // Middle photo links both ways.
    let body = body_string(
        t.app
            .clone()
            .oneshot(get(&format!("/photo/{}", ids[1])))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains(&format!("/photo/{}", ids[0])));
    assert!(body.contains(&format!("/photo/{}", ids[2])));

    // Newest photo has no newer neighbor.
    let body = body_string(
        t.app
            .clone()
            .oneshot(get(&format!("/photo/{}", ids[2])))
            .await
            .unwrap(),
    )
    .await;
    assert!(!body.contains("class=\"newer\""));
    assert!(body.contains(&format!("/photo/{}", ids[1])));
}

#[tokio::test]
async fn admin_routes_redirect_to_login() {
    let t = test_app().await;

    for uri in [
        "/admin/",
        "/admin/photos/",
        "/admin/photos/new",
        "/admin/photos/1",
        "/admin/photos/remove/1",
    ] {
        let res = t.app.clone().oneshot(get(uri)).await.unwrap();
        assert!(res.status().is_redirection(), "GET {uri}");
        assert!(
            location_of(&res).starts_with("/login?next="),
            "GET {uri} redirected to {}",
            location_of(&res)
        );
    }
}

#[tokio::test]
async fn login_grants_access_to_admin() {
    let t = test_app().await;
    let cookies = log_in(&t.app).await;

    let res = t
        .app
        .clone()
        .oneshot(get_with_cookies("/admin/", &cookies))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("Admin"));

    // An authenticated visit to the login form bounces to the admin area.
    let res = t
        .app
        .clone()
        .oneshot(get_with_cookies("/login", &cookies))
        .await
        .unwrap();
    assert!(res.status().is_redirection());
    assert_eq!(location_of(&res), "/admin/");
}

#[tokio::test]
async fn wrong_password_rerenders_without_session() {
    let t = test_app().await;

    let res = t
        .app
        .clone()
        .oneshot(post_form("/login", "password=nope", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(!cookies_of(&res).contains("session="));
    assert!(body_string(res).await.contains("Wrong password."));
}

#[tokio::test]
async fn safe_next_targets_are_honored() {
    let t = test_app().await;

    let res = t
        .app
        .clone()
        .oneshot(post_form(
            "/login?next=/admin/photos/",
            &format!("password={PASSWORD}"),
            None,
        ))
        .await
        .unwrap();
    assert!(res.status().is_redirection());
    assert_eq!(location_of(&res), "/admin/photos/");

    // Absolute URL on the same origin is fine too.
    let res = t
        .app
        .clone()
        .oneshot(post_form(
            "/login?next=http://example.com/admin/photos/new",
            &format!("password={PASSWORD}"),
            None,
        ))
        .await
        .unwrap();
    assert!(res.status().is_redirection());
    assert_eq!(location_of(&res), "http://example.com/admin/photos/new");
}

#[tokio::test]
async fn foreign_next_targets_are_rejected() {
    let t = test_app().await;

    for next in ["http://evil.example/", "//evil.example/x", "javascript:alert(1)"] {
        let res = t
            .app
            .clone()
            .oneshot(post_form(
                &format!("/login?next={next}"),
                &format!("password={PASSWORD}"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "next={next}");
    }
}

#[tokio::test]
async fn logout_clears_the_session() {
    let t = test_app().await;
    let cookies = log_in(&t.app).await;

    let res = t
        .app
        .clone()
        .oneshot(get_with_cookies("/logout", &cookies))
        .await
        .unwrap();
    assert!(res.status().is_redirection());
    assert_eq!(location_of(&res), "/");

    // The logout response rewrote the session cookie; using it again must
    // not grant admin access.
    let after = cookies_of(&res);
    let res = t
        .app
        .clone()
        .oneshot(get_with_cookies("/admin/", &after))
        .await
        .unwrap();
    assert!(res.status().is_redirection());
}

#[tokio::test]
async fn upload_edit_remove_round_trip() {
    let t = test_app().await;
    let cookies = log_in(&t.app).await;

    // Upload.
    let res = t
        .app
        .clone()
        .oneshot(post_multipart(
            "/admin/photos/new",
            &[
                ("photo", Some("orig.png"), b"png-bytes"),
                ("title", None, b"First light"),
                ("description", None, b"Shot at *dawn*."),
            ],
            &cookies,
        ))
        .await
        .unwrap();
    assert!(res.status().is_redirection());
    let location = location_of(&res).to_string();
    let id: i64 = location.rsplit('/').next().unwrap().parse().unwrap();

    let stored = t.state.db.lock().unwrap().get_photo(id).unwrap();
    assert_eq!(stored.title.as_deref(), Some("First light"));
    assert!(stored.filename.ends_with(".png"));
    assert!(t.state.media.base_path().join(&stored.filename).exists());

    // The public detail page renders the markdown description.
    let body = body_string(t.app.clone().oneshot(get(&format!("/photo/{id}"))).await.unwrap()).await;
    assert!(body.contains("<em>dawn</em>"));

    // Edit without a new file keeps the stored filename.
    let res = t
        .app
        .clone()
        .oneshot(post_multipart(
            &format!("/admin/photos/{id}"),
            &[("title", None, b"Renamed"), ("description", None, b"")],
            &cookies,
        ))
        .await
        .unwrap();
    assert!(res.status().is_redirection());

    let edited = t.state.db.lock().unwrap().get_photo(id).unwrap();
    assert_eq!(edited.title.as_deref(), Some("Renamed"));
    assert_eq!(edited.description, None);
    assert_eq!(edited.filename, stored.filename);

    // Edit with a new file replaces it on disk.
    let res = t
        .app
        .clone()
        .oneshot(post_multipart(
            &format!("/admin/photos/{id}"),
            &[
                ("photo", Some("new.jpg"), b"jpeg-bytes"),
                ("title", None, b"Renamed"),
                ("description", None, b""),
            ],
            &cookies,
        ))
        .await
        .unwrap();
    assert!(res.status().is_redirection());

    let replaced = t.state.db.lock().unwrap().get_photo(id).unwrap();
    assert!(replaced.filename.ends_with(".jpg"));
    assert!(!t.state.media.base_path().join(&stored.filename).exists());

    // Remove.
    let res = t
        .app
        .clone()
        .oneshot(post_multipart(
            &format!("/admin/photos/remove/{id}"),
            &[],
            &cookies,
        ))
        .await
        .unwrap();
    assert!(res.status().is_redirection());
    assert_eq!(location_of(&res), "/admin/photos/");
    assert!(t.state.db.lock().unwrap().get_photo(id).is_err());
    assert!(!t.state.media.base_path().join(&replaced.filename).exists());
}

#[tokio::test]
async fn upload_without_file_flashes_required() {
    let t = test_app().await;
    let cookies = log_in(&t.app).await;

    let res = t
        .app
        .clone()
        .oneshot(post_multipart(
            "/admin/photos/new",
            &[("title", None, b"No file here")],
            &cookies,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_string(res).await;
    assert!(body.contains("Error in Photo field: This field is required."));
    // Submitted values survive the re-render.
    assert!(body.contains("No file here"));
}

#[tokio::test]
async fn upload_rejects_non_image_files() {
    let t = test_app().await;
    let cookies = log_in(&t.app).await;

    let res = t
        .app
        .clone()
        .oneshot(post_multipart(
            "/admin/photos/new",
            &[("photo", Some("nasty.exe"), b"MZ")],
            &cookies,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res)
        .await
        .contains("Error in Photo field: Images only!"));
}

#[tokio::test]
async fn editing_unknown_photo_is_404() {
    let t = test_app().await;
    let cookies = log_in(&t.app).await;

    for uri in ["/admin/photos/999", "/admin/photos/remove/999"] {
        let res = t
            .app
            .clone()
            .oneshot(get_with_cookies(uri, &cookies))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "GET {uri}");
    }
}
