//! Gateway error type and its HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Headline sent in every failed `/api/analyze` response.
pub const FAILURE_HEADLINE: &str = "Failed to analyze parking signs";

/// Everything that can go wrong between receiving an image batch and
/// handing back a verdict.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The request body was not `{ "images": [string, ...] }`.
    #[error("invalid request body: {}", .0.body_text())]
    BadRequest(#[from] JsonRejection),

    /// The HTTP exchange with the upstream model failed.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream model answered with a non-success status.
    #[error("upstream model responded with {status}")]
    UpstreamStatus { status: u16, body: String },

    /// The completion carried no message text.
    #[error("upstream reply contained no message content")]
    EmptyReply,

    /// No brace-delimited object could be located in the reply.
    #[error("Could not parse JSON from response")]
    NoJsonObject,

    /// The located object was not valid JSON.
    #[error("invalid JSON in model reply: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Body of a 500 response from `/api/analyze`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        if let AnalyzeError::UpstreamStatus { status, body } = &self {
            error!(status, body = %body, "Upstream model rejected the request");
        }
        error!(error = %self, "{}", FAILURE_HEADLINE);

        // Malformed or oversized bodies keep the rejection's 4xx status.
        let status = match &self {
            AnalyzeError::BadRequest(rejection) => rejection.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: FAILURE_HEADLINE.to_string(),
            details: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
