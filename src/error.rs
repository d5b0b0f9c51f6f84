use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::availability::MissingMemberError;
use crate::parser::ParseError;
use crate::store::StoreError;

/// Request-boundary error. Every kind is recoverable: it becomes a JSON
/// error body (and a log line), never a crash.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Validation(#[from] MissingMemberError),
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl ResponseError for BoardError {
    fn status_code(&self) -> StatusCode {
        match self {
            BoardError::Parse(_) | BoardError::Validation(_) => StatusCode::BAD_REQUEST,
            BoardError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let BoardError::Store(err) = self {
            log::error!("store failure: {}", err);
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }))
    }
}
