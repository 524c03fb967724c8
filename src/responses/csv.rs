// responses/csv.rs
use crate::errors::{ResultResp, ServerError};
use astra::{Body, ResponseBuilder};

/// Return CSV bytes as a file download
pub fn csv_response(buffer: Vec<u8>, filename: &str) -> ResultResp {
    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", "text/csv; charset=utf-8")
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(buffer))
        .map_err(|_| ServerError::InternalError)
}
