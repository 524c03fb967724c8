// src/handlers/import.rs

use crate::auth::SessionUser;
use crate::db::SqliteStorage;
use crate::errors::{ResultResp, ServerError};
use crate::handlers::{header, optional_user, read_body, require_user};
use crate::import::multipart::{boundary, file_field, parse_multipart};
use crate::import::parse::check_file_type;
use crate::import::template::{template_csv, TEMPLATE_FILE_NAME};
use crate::import::orchestrator::failed_validation_message;
use crate::import::{import_csv, FileError, ImportError, ImportReport};
use crate::responses::{csv_response, html_response, json_response};
use crate::router::App;
use crate::templates::pages::{import_errors_page, import_page, import_result_page};
use astra::Request;
use serde_json::json;
use tracing::{info, warn};

const FILE_FIELD: &str = "file";

/// Pulls the `file` part out of a multipart upload and runs the import.
/// The outer error is a server failure; the inner one is a rejected file.
fn run_upload(
    req: Request,
    app: &App,
    user: &SessionUser,
) -> Result<Result<ImportReport, ImportError>, ServerError> {
    let Some(boundary) = header(&req, "content-type").and_then(|ct| boundary(ct).ok()) else {
        return Ok(Err(FileError::Missing.into()));
    };

    let body = read_body(req, app.config.max_upload_bytes)?;
    let Some(file) = parse_multipart(&body, &boundary)
        .ok()
        .and_then(|parts| file_field(parts, FILE_FIELD))
    else {
        return Ok(Err(FileError::Missing.into()));
    };

    let file_name = file.file_name.as_deref().unwrap_or("");
    if let Err(e) = check_file_type(file.content_type.as_deref(), file_name) {
        warn!(file_name, content_type = ?file.content_type, "upload rejected");
        return Ok(Err(e.into()));
    }

    info!(file_name, bytes = file.data.len(), user = user.id, "import upload received");
    let text = String::from_utf8_lossy(&file.data);

    app.db.with_conn(|conn| {
        let mut storage = SqliteStorage::new(conn);
        Ok(import_csv(&mut storage, &text, user.id, &app.config.import))
    })
}

pub fn api_import(req: Request, app: &App) -> ResultResp {
    let user = require_user(&req, app)?;

    match run_upload(req, app, &user)? {
        Ok(report) => json_response(200, &report),
        Err(ImportError::File(e)) => json_response(400, &json!({ "error": e.to_string() })),
        Err(ImportError::Validation(errors)) => json_response(
            400,
            &json!({ "message": failed_validation_message(errors.len()), "errors": errors }),
        ),
    }
}

pub fn template() -> ResultResp {
    let bytes = template_csv().map_err(|_| ServerError::InternalError)?;
    csv_response(bytes, TEMPLATE_FILE_NAME)
}

pub fn form_page(req: &Request, app: &App) -> ResultResp {
    let user = optional_user(req, app)?;
    html_response(import_page(user.as_ref().map(|u| u.email.as_str())))
}

pub fn form_upload(req: Request, app: &App) -> ResultResp {
    let user = require_user(&req, app)?;
    let email = Some(user.email.as_str());

    match run_upload(req, app, &user)? {
        Ok(report) => html_response(import_result_page(email, &report)),
        Err(ImportError::File(e)) => html_response(import_errors_page(email, &e.to_string(), &[])),
        Err(ImportError::Validation(rows)) => {
            let message = failed_validation_message(rows.len());
            html_response(import_errors_page(email, &message, &rows))
        }
    }
}
