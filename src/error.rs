use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Sheets auth error: {0}")]
    SheetsAuth(#[from] jsonwebtoken::errors::Error),

    #[error("Sheets request error: {0}")]
    SheetsRequest(#[from] reqwest::Error),

    #[error("Email address error: {0}")]
    EmailAddress(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    EmailBuild(#[from] lettre::error::Error),

    #[error("Email transport error: {0}")]
    EmailTransport(#[from] lettre::transport::smtp::Error),
}

// Side-effect errors are contained at their call sites, so anything that
// reaches axum here is either an unparsable body or an escaped bug. The
// frontend fires and forgets, it only ever sees this generic envelope.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("API error: {self}");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": "Internal Server Error" })),
        )
            .into_response()
    }
}
