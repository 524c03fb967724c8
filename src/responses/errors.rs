use crate::errors::ServerError;
use crate::templates::components::error_page;
use astra::{Body, Response, ResponseBuilder};
use serde_json::json;
use tracing::error;

/// Convert a ServerError into a response. API routes get `{error}` JSON,
/// everything else gets the HTML error page. Server-side details are logged,
/// never sent.
pub fn error_to_response(err: ServerError, api: bool) -> Response {
    let status = err.status();
    if status >= 500 {
        error!(error = %err, "request failed");
    }

    let message = err.public_message();
    let built = if api {
        let body = json!({ "error": message }).to_string();
        ResponseBuilder::new()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
    } else {
        ResponseBuilder::new()
            .status(status)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(Body::from(error_page(status, &message).into_string()))
    };

    built.unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
