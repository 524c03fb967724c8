use astra::Response;
use thiserror::Error;

/// Errors originating from either the server logic
/// (routing, missing resources, etc.) or downstream layers (DB).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Database Error: {0}")]
    DbError(String),
    #[error("Spreadsheet Error: {0}")]
    XlsxError(String),
    #[error("Internal Server Error")]
    InternalError,
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        ServerError::DbError(e.to_string())
    }
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Unauthorized(_) => 401,
            ServerError::DbError(_) | ServerError::XlsxError(_) | ServerError::InternalError => 500,
        }
    }

    /// Message safe to show a client. Storage details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::NotFound => "Not found".to_string(),
            ServerError::BadRequest(msg) => msg.clone(),
            ServerError::Unauthorized(_) => "Unauthorized".to_string(),
            ServerError::DbError(_) | ServerError::XlsxError(_) | ServerError::InternalError => {
                "Internal server error".to_string()
            }
        }
    }
}
