use crate::config::AppConfig;
use crate::db::Database;
use crate::errors::{ResultResp, ServerError};
use crate::handlers::export::ExportFormat;
use crate::handlers::{buyers, export, import, pages};
use crate::responses::error_to_response;
use astra::{Request, Response};
use tracing::debug;

/// Everything a handler needs: the database handle and the loaded settings.
#[derive(Clone, Debug)]
pub struct App {
    pub db: Database,
    pub config: AppConfig,
}

pub fn handle(req: Request, app: &App) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    debug!(%method, %path, "request");

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => pages::home(&req, app),
        ("GET", ["import"]) => import::form_page(&req, app),
        ("POST", ["import"]) => import::form_upload(req, app),

        ("GET", ["api", "import", "template"]) => import::template(),
        ("POST", ["api", "import"]) => import::api_import(req, app),

        ("GET", ["api", "buyers"]) => buyers::list(&req, app),
        ("POST", ["api", "buyers"]) => buyers::create(req, app),
        ("GET", ["api", "buyers", id]) => buyers::show(&req, app, id),
        ("PUT", ["api", "buyers", id]) => buyers::update(req, app, id),
        ("DELETE", ["api", "buyers", id]) => buyers::delete(&req, app, id),
        ("GET", ["api", "buyers", id, "history"]) => buyers::history(&req, app, id),

        ("GET", ["api", "export"]) => export::export(&req, app, ExportFormat::Csv),
        ("GET", ["api", "export.xlsx"]) => export::export(&req, app, ExportFormat::Xlsx),

        _ => Err(ServerError::NotFound),
    }
}

/// Runs `handle` and renders any error, as JSON under `/api/` and as an HTML
/// page elsewhere.
pub fn respond(req: Request, app: &App) -> Response {
    let api = req.uri().path().starts_with("/api/");
    match handle(req, app) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err, api),
    }
}
