//! Router-level tests: every request goes through the full middleware stack
//! against an in-memory store.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use axum::{
  body::Body,
  extract::ConnectInfo,
  http::{Request, StatusCode, header},
  response::Response,
};
use folio_core::{
  category::Category,
  content::ContentDraft,
  password::hash_password,
  store::SiteStore,
};
use folio_store_sqlite::SqliteStore;
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{
  AppState, ServerConfig,
  analytics::geo::GeoResolver,
  auth::{INVALID_CREDENTIALS, PASSWORD_INCORRECT, PASSWORD_MISMATCH, PASSWORD_UPDATED},
  handlers::{publish::IMAGE_REQUIRED, users::CREATE_FAILED},
  router,
};


const BROWSER: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/126.0 Safari/537.36";
const BOUNDARY: &str = "folio-test-boundary";
const FORM: &str = "application/x-www-form-urlencoded";

struct TestApp {
  state:      AppState<SqliteStore>,
  upload_dir: PathBuf,
}

impl TestApp {
  async fn new() -> Self {
    let upload_dir = std::env::temp_dir().join(format!("folio-web-{}", Uuid::new_v4()));
    let config = ServerConfig {
      upload_dir: upload_dir.clone(),
      ..ServerConfig::with_secret("test-secret")
    };
    let store = SqliteStore::open_in_memory().await.unwrap();
    Self {
      state: AppState::new(store, config, GeoResolver::disabled()),
      upload_dir,
    }
  }

  fn store(&self) -> &SqliteStore { &self.state.store }

  async fn send(&self, req: Request<Body>) -> Response {
    router(self.state.clone(), self.state.store.session_store())
      .oneshot(req)
      .await
      .unwrap()
  }

  async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(uri).header(header::USER_AGENT, BROWSER);
    if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
    }
    self.send(builder.body(Body::empty()).unwrap()).await
  }

  /// A GET that arrives from a public address, as a real visitor would.
  async fn visit(&self, uri: &str, user_agent: Option<&str>, ip: [u8; 4]) -> Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(ua) = user_agent {
      builder = builder.header(header::USER_AGENT, ua);
    }
    let mut req = builder.body(Body::empty()).unwrap();
    req.extensions_mut().insert(ConnectInfo(SocketAddr::from((ip, 40000))));
    self.send(req).await
  }

  async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, FORM);
    if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
    }
    self.send(builder.body(Body::from(body.to_string())).unwrap()).await
  }

  async fn post_multipart(
    &self,
    uri: &str,
    fields: &[(&str, &str)],
    image: Option<(&str, &[u8])>,
    cookie: &str,
  ) -> Response {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
      .header(header::COOKIE, cookie)
      .body(multipart_body(fields, image))
      .unwrap();
    self.send(req).await
  }

  /// Create an admin account and log in as it, returning the session
  /// cookie.
  async fn login(&self) -> String {
    let hash = hash_password("secret").unwrap();
    self.store().create_user("admin".into(), hash).await.unwrap();

    let resp = self
      .post_form("/auth/login", "username=admin&password=secret", None)
      .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin");
    session_cookie(&resp)
  }

  async fn wait_for_views(&self, expected: i64) -> i64 {
    for _ in 0..200 {
      let n = self.store().count_views().await.unwrap();
      if n >= expected {
        return n;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    self.store().count_views().await.unwrap()
  }
}

impl Drop for TestApp {
  fn drop(&mut self) { let _ = std::fs::remove_dir_all(&self.upload_dir); }
}

fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Body {
  let mut body = Vec::new();
  for (name, value) in fields {
    body.extend_from_slice(
      format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
    );
  }
  if let Some((file_name, data)) = image {
    body.extend_from_slice(
      format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
      )
      .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
  }
  body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
  Body::from(body)
}

fn location(resp: &Response) -> &str {
  resp
    .headers()
    .get(header::LOCATION)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
}

fn session_cookie(resp: &Response) -> String {
  let set_cookie = resp
    .headers()
    .get(header::SET_COOKIE)
    .expect("session cookie")
    .to_str()
    .unwrap();
  set_cookie.split(';').next().unwrap().to_string()
}

async fn body_text(resp: Response) -> String {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  String::from_utf8(bytes.to_vec()).unwrap()
}

fn draft(title: &str, content: &str, image: Option<&str>) -> ContentDraft {
  ContentDraft {
    title:     title.into(),
    content:   content.into(),
    image_url: image.map(Into::into),
  }
}

// ── Analytics ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn qualifying_get_records_exactly_one_page_view() {
  let app = TestApp::new().await;

  let resp = app.visit("/esai", Some(BROWSER), [203, 0, 113, 9]).await;
  assert_eq!(resp.status(), StatusCode::OK);

  assert_eq!(app.wait_for_views(1).await, 1);
  tokio::time::sleep(Duration::from_millis(50)).await;
  assert_eq!(app.store().count_views().await.unwrap(), 1);

  let recent = app.store().recent_views(10).await.unwrap();
  assert_eq!(recent[0].path, "/esai");
  assert_eq!(recent[0].city, "Unknown");
}

#[tokio::test]
async fn filtered_requests_record_nothing() {
  let app = TestApp::new().await;

  app.visit("/esai", Some("Googlebot/2.1"), [203, 0, 113, 9]).await;
  app.visit("/esai", None, [203, 0, 113, 9]).await;
  app.visit("/wp-login", Some(BROWSER), [203, 0, 113, 9]).await;
  app.visit("/esai", Some(BROWSER), [127, 0, 0, 1]).await;
  app.visit("/esai", Some(BROWSER), [192, 168, 1, 7]).await;
  app.visit("/auth/login", Some(BROWSER), [203, 0, 113, 9]).await;

  // Filtered requests never spawn an insert, so once the sentinel lands the
  // count is final.
  app.visit("/puisi", Some(BROWSER), [203, 0, 113, 10]).await;
  assert_eq!(app.wait_for_views(1).await, 1);
  let recent = app.store().recent_views(10).await.unwrap();
  assert_eq!(recent.len(), 1);
  assert_eq!(recent[0].path, "/puisi");
}

#[tokio::test]
async fn ticker_shows_online_visitors() {
  let app = TestApp::new().await;
  app.visit("/", Some(BROWSER), [203, 0, 113, 1]).await;
  let resp = app.visit("/", Some(BROWSER), [203, 0, 113, 2]).await;
  let html = body_text(resp).await;
  assert!(html.contains("2 online"), "{html}");
}

#[tokio::test]
async fn unmatched_and_static_paths_count_as_online() {
  let app = TestApp::new().await;

  let resp = app.visit("/a/b/c", Some(BROWSER), [203, 0, 113, 20]).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  app.visit("/static/css/site.css", Some(BROWSER), [203, 0, 113, 21]).await;

  assert_eq!(app.state.online.active_count(), 2);
}

// ── Public pages ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_sections_render_not_found() {
  let app = TestApp::new().await;
  for uri in ["/poetry", "/biography", "/esai/abc", "/esai/999", "/gallery/1", "/a/b/c"] {
    let resp = app.get(uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
  }
}

#[tokio::test]
async fn category_match_is_case_insensitive() {
  let app = TestApp::new().await;
  app.store().create_content(Category::Puisi, draft("Hujan", "<p>x</p>", None)).await.unwrap();

  let resp = app.get("/PUISI", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let html = body_text(resp).await;
  assert!(html.contains("Hujan"));
  assert!(html.contains("Arsip dan kumpulan Puisi karya Hudan Hidayat."));
}

#[tokio::test]
async fn item_is_only_found_in_its_own_category() {
  let app = TestApp::new().await;
  let item = app.store().create_content(Category::Novel, draft("Roman", "<p>x</p>", None)).await.unwrap();

  assert_eq!(app.get(&format!("/novel/{}", item.id), None).await.status(), StatusCode::OK);
  assert_eq!(app.get(&format!("/esai/{}", item.id), None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn meta_description_is_stripped_and_truncated() {
  let app = TestApp::new().await;
  let long = format!("<p>{}</p><p>tail</p>", "a".repeat(300));
  let item = app.store().create_content(Category::Esai, draft("Panjang", &long, None)).await.unwrap();

  let html = body_text(app.get(&format!("/esai/{}", item.id), None).await).await;
  let expected = format!("<meta name=\"description\" content=\"{}\">", "a".repeat(160));
  assert!(html.contains(&expected), "{html}");
  assert!(html.contains("/images/tentang.jpeg"));
}

#[tokio::test]
async fn home_page_renders_sections() {
  let app = TestApp::new().await;
  app.store().create_content(Category::Biography, draft("Tentang Saya", "<p>bio</p>", None)).await.unwrap();
  app.store().create_content(Category::Cerpen, draft("Cerita", "<p>c</p>", None)).await.unwrap();
  app.store().add_slide("/images/slide-1.jpg".into()).await.unwrap();

  let resp = app.get("/", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let html = body_text(resp).await;
  assert!(html.contains("Tentang Saya"));
  assert!(html.contains("Cerita"));
  assert!(html.contains("/images/slide-1.jpg"));
}

// ── Auth ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_routes_redirect_to_login() {
  let app = TestApp::new().await;
  for uri in ["/admin", "/admin/esai", "/admin/esai/create", "/admin/users", "/admin/settings"] {
    let resp = app.get(uri, None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
    assert_eq!(location(&resp), "/auth/login");
  }
}

#[tokio::test]
async fn failed_logins_are_indistinguishable() {
  let app = TestApp::new().await;
  let hash = hash_password("secret").unwrap();
  app.store().create_user("admin".into(), hash).await.unwrap();

  let wrong_password = app.post_form("/auth/login", "username=admin&password=nope", None).await;
  let unknown_user = app.post_form("/auth/login", "username=ghost&password=secret", None).await;
  let wrong_case = app.post_form("/auth/login", "username=Admin&password=secret", None).await;

  assert_eq!(wrong_password.status(), StatusCode::OK);
  let a = body_text(wrong_password).await;
  let b = body_text(unknown_user).await;
  let c = body_text(wrong_case).await;
  assert!(a.contains(INVALID_CREDENTIALS));
  assert_eq!(a, b);
  assert_eq!(a, c);
}

#[tokio::test]
async fn login_grants_dashboard_and_logout_revokes_it() {
  let app = TestApp::new().await;
  let cookie = app.login().await;

  let resp = app.get("/admin", Some(&cookie)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(body_text(resp).await.contains("Dashboard"));

  let resp = app.get("/auth/logout", Some(&cookie)).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&resp), "/");

  let resp = app.get("/admin", Some(&cookie)).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn password_change_reports_each_outcome() {
  let app = TestApp::new().await;
  let cookie = app.login().await;

  let mismatch = app
    .post_form("/admin/password", "current_password=secret&new_password=a&confirm_password=b", Some(&cookie))
    .await;
  assert!(body_text(mismatch).await.contains(PASSWORD_MISMATCH));

  let incorrect = app
    .post_form("/admin/password", "current_password=wrong&new_password=n&confirm_password=n", Some(&cookie))
    .await;
  assert!(body_text(incorrect).await.contains(PASSWORD_INCORRECT));

  let updated = app
    .post_form("/admin/password", "current_password=secret&new_password=n3w&confirm_password=n3w", Some(&cookie))
    .await;
  assert!(body_text(updated).await.contains(PASSWORD_UPDATED));

  let resp = app.post_form("/auth/login", "username=admin&password=n3w", None).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  let resp = app.post_form("/auth/login", "username=admin&password=secret", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

// ── Publishing ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_item_is_listed_and_published() {
  let app = TestApp::new().await;
  let cookie = app.login().await;

  let resp = app
    .post_multipart("/admin/esai/create", &[("title", "T"), ("content", "<p>C</p>")], None, &cookie)
    .await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&resp), "/admin/esai");

  let list = body_text(app.get("/admin/esai", Some(&cookie)).await).await;
  assert!(list.contains("<td>T</td>"), "{list}");

  let items = app.store().list_content(Category::Esai).await.unwrap();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0].image_url, None);

  let page = body_text(app.get(&format!("/esai/{}", items[0].id), None).await).await;
  assert!(page.contains("<p>C</p>"));
  assert!(page.contains("<meta name=\"description\" content=\"C\">"), "{page}");
}

#[tokio::test]
async fn edit_keeps_image_unless_a_new_one_is_uploaded() {
  let app = TestApp::new().await;
  let cookie = app.login().await;
  let item = app
    .store()
    .create_content(Category::Cerpen, draft("Old", "<p>x</p>", Some("/uploads/old.jpg")))
    .await
    .unwrap();
  let uri = format!("/admin/cerpen/edit/{}", item.id);

  let resp = app
    .post_multipart(&uri, &[("title", "New"), ("content", "<p>y</p>")], None, &cookie)
    .await;
  assert_eq!(location(&resp), "/admin/cerpen");
  let kept = app.store().get_content(Category::Cerpen, item.id).await.unwrap().unwrap();
  assert_eq!(kept.title, "New");
  assert_eq!(kept.image_url.as_deref(), Some("/uploads/old.jpg"));

  app
    .post_multipart(&uri, &[("title", "New"), ("content", "<p>y</p>")], Some(("cover.png", b"\x89PNG")), &cookie)
    .await;
  let replaced = app.store().get_content(Category::Cerpen, item.id).await.unwrap().unwrap();
  let url = replaced.image_url.unwrap();
  assert_ne!(url, "/uploads/old.jpg");
  assert!(url.starts_with("/uploads/") && url.ends_with(".png"));
  assert!(app.upload_dir.join(url.trim_start_matches("/uploads/")).exists());
}

#[tokio::test]
async fn edit_of_missing_item_redirects_to_list() {
  let app = TestApp::new().await;
  let cookie = app.login().await;
  let resp = app.get("/admin/esai/edit/42", Some(&cookie)).await;
  assert_eq!(resp.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&resp), "/admin/esai");
}

#[tokio::test]
async fn deleting_missing_id_changes_nothing() {
  let app = TestApp::new().await;
  let cookie = app.login().await;
  let item = app.store().create_content(Category::Esai, draft("Keep", "", None)).await.unwrap();

  let missing = app.get("/admin/esai/delete/999", Some(&cookie)).await;
  assert_eq!(missing.status(), StatusCode::SEE_OTHER);
  assert_eq!(location(&missing), "/admin/esai");
  assert_eq!(app.store().count_content(Category::Esai).await.unwrap(), 1);

  let present = app.get(&format!("/admin/esai/delete/{}", item.id), Some(&cookie)).await;
  assert_eq!(location(&present), "/admin/esai");
  assert_eq!(app.store().count_content(Category::Esai).await.unwrap(), 0);
}

#[tokio::test]
async fn biography_is_inserted_once_then_updated() {
  let app = TestApp::new().await;
  let cookie = app.login().await;

  let form = body_text(app.get("/admin/biography", Some(&cookie)).await).await;
  assert!(form.contains("value=\"Tentang\""), "{form}");

  for title in ["First", "Second"] {
    let resp = app
      .post_multipart("/admin/biography", &[("title", title), ("content", "<p>bio</p>")], None, &cookie)
      .await;
    assert_eq!(location(&resp), "/admin/biography");
  }

  let rows = app.store().list_content(Category::Biography).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].title, "Second");

  let resp = app.get("/admin/biography/create", Some(&cookie)).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_biography_submits_leave_one_row() {
  let app = TestApp::new().await;
  let cookie = app.login().await;

  let (a, b) = tokio::join!(
    app.post_multipart("/admin/biography", &[("title", "A"), ("content", "<p>a</p>")], None, &cookie),
    app.post_multipart("/admin/biography", &[("title", "B"), ("content", "<p>b</p>")], None, &cookie),
  );
  assert_eq!(location(&a), "/admin/biography");
  assert_eq!(location(&b), "/admin/biography");
  assert_eq!(app.store().count_content(Category::Biography).await.unwrap(), 1);
}

#[tokio::test]
async fn books_alias_reaches_book_section() {
  let app = TestApp::new().await;
  let cookie = app.login().await;
  let resp = app.get("/admin/books", Some(&cookie)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(body_text(resp).await.contains("Manage Book"));
}

#[tokio::test]
async fn gallery_create_requires_an_image() {
  let app = TestApp::new().await;
  let cookie = app.login().await;

  let resp = app
    .post_multipart("/admin/gallery/create", &[("title", "Senja")], None, &cookie)
    .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(body_text(resp).await.contains(IMAGE_REQUIRED));
  assert_eq!(app.store().count_gallery().await.unwrap(), 0);

  let resp = app
    .post_multipart("/admin/gallery/create", &[("title", "")], Some(("p.jpg", b"jpeg")), &cookie)
    .await;
  assert_eq!(location(&resp), "/admin/gallery");

  let list = body_text(app.get("/admin/gallery", Some(&cookie)).await).await;
  assert!(list.contains("No Caption"));
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
  let app = TestApp::new().await;
  let cookie = app.login().await;

  let resp = app
    .post_multipart(
      "/admin/esai/create",
      &[("title", "T"), ("content", "<p>C</p>")],
      Some(("page.html", b"<script>alert(1)</script>")),
      &cookie,
    )
    .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(app.store().count_content(Category::Esai).await.unwrap(), 0);
  assert!(!app.upload_dir.exists());
}

// ── Users & settings ──────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_username_is_reported() {
  let app = TestApp::new().await;
  let cookie = app.login().await;

  let resp = app
    .post_form("/admin/users/create", "username=editor&password=pw", Some(&cookie))
    .await;
  assert_eq!(location(&resp), "/admin/users");

  let resp = app
    .post_form("/admin/users/create", "username=editor&password=other", Some(&cookie))
    .await;
  assert!(body_text(resp).await.contains(CREATE_FAILED));
  assert_eq!(app.store().list_users().await.unwrap().len(), 2);
}

#[tokio::test]
async fn settings_are_saved_and_confirmed() {
  let app = TestApp::new().await;
  let cookie = app.login().await;

  let resp = app
    .post_form("/admin/settings", "site_title=Rumah+Kata&site_author=Jane", Some(&cookie))
    .await;
  assert_eq!(location(&resp), "/admin/settings?success=1");

  let page = body_text(app.get("/admin/settings?success=1", Some(&cookie)).await).await;
  assert!(page.contains("Settings saved."));
  assert!(page.contains("value=\"Rumah Kata\""));

  let settings = app.store().load_settings().await.unwrap();
  assert_eq!(settings.author(), "Jane");

  let listing = body_text(app.get("/esai", None).await).await;
  assert!(listing.contains("karya Jane."));
}
