use crate::auth::create_session;
use crate::config::AppConfig;
use crate::db::users::get_or_create_user;
use crate::db::{init_db, Database};
use crate::handlers::now_unix;
use crate::router::App;
use astra::{Body, Response};
use http::{Method, Request};
use std::io::Read;
use tempfile::TempDir;

/// A fresh app over its own database file. Keep the `TempDir` alive for the
/// whole test.
pub fn test_app() -> (TempDir, App) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite3");
    let db = Database::new(path.to_string_lossy().to_string());

    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    let app = App {
        db,
        config: AppConfig::default(),
    };
    (dir, app)
}

/// Creates a user and returns (user id, session token).
pub fn sign_in(app: &App, email: &str) -> (i64, String) {
    let now = now_unix();
    app.db
        .with_conn(|conn| {
            let id = get_or_create_user(conn, email, Some("Test Agent"), now)?;
            let token = create_session(conn, id, now)?;
            Ok((id, token))
        })
        .expect("sign in")
}

pub fn request(method: Method, uri: &str, session: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = session {
        builder = builder.header("Cookie", format!("session={token}"));
    }
    builder.body(body).unwrap()
}

pub fn json_request(
    method: Method,
    uri: &str,
    session: &str,
    json: &serde_json::Value,
) -> Request<Body> {
    let mut req = request(method, uri, Some(session), Body::from(json.to_string()));
    req.headers_mut()
        .insert("Content-Type", "application/json".parse().unwrap());
    req
}

pub const BOUNDARY: &str = "----buyerleadsboundary";

/// A browser-style multipart upload carrying one `file` part.
pub fn upload_request(
    uri: &str,
    session: Option<&str>,
    file_name: &str,
    content_type: &str,
    contents: &str,
) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\
         \r\n\
         {contents}\r\n\
         --{BOUNDARY}--\r\n"
    );
    let mut req = request(Method::POST, uri, session, Body::from(body));
    req.headers_mut().insert(
        "Content-Type",
        format!("multipart/form-data; boundary={BOUNDARY}")
            .parse()
            .unwrap(),
    );
    req
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp)).unwrap()
}
