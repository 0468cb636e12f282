//! Turns completed HTTP exchanges into results.
//!
//! Every exchange in the workspace passes through [`couple`], so this is the
//! only place where a status code or transport failure is given meaning.

use crate::error::{ApiError, Error, ErrorReason, Result};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::warn;

/// Provider error envelope: `{"errors": [{"field": …, "reason": …}]}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    errors: Vec<ErrorReason>,
}

/// Inspect the outcome of an exchange.
///
/// Transport failures are returned as [`Error::Transport`] without looking at
/// any body. 2xx responses pass through untouched. Everything else is read and
/// converted with [`error_for_status`].
///
/// # Errors
///
/// Returns the coupled error for transport failures and non-2xx statuses.
pub async fn couple(outcome: std::result::Result<Response, reqwest::Error>) -> Result<Response> {
    let response = match outcome {
        Ok(response) => response,
        Err(err) => {
            let error = Error::from(err);
            warn!(code = error.error_code(), error = %error, "Linode request failed");
            return Err(error);
        }
    };

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            let error = Error::from(err);
            warn!(
                status = status.as_u16(),
                code = error.error_code(),
                error = %error,
                "Failed to read Linode error body"
            );
            return Err(error);
        }
    };
    let error = error_for_status(status, &body);
    warn!(
        status = status.as_u16(),
        code = error.error_code(),
        url = %url,
        "Linode API returned an error"
    );
    Err(error)
}

/// Build the error for a non-2xx status and its raw body.
///
/// A decodable provider body becomes [`Error::Api`]; anything else falls back
/// to [`Error::Http`] carrying the raw text. A 404 is always
/// [`Error::NotFound`].
#[must_use]
pub fn error_for_status(status: StatusCode, body: &str) -> Error {
    let decoded = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .filter(|envelope| !envelope.errors.is_empty())
        .map(|envelope| ApiError::from_reasons(status.as_u16(), envelope.errors));

    match (status, decoded) {
        (StatusCode::NOT_FOUND, Some(api)) => Error::NotFound(api),
        (StatusCode::NOT_FOUND, None) => Error::NotFound(ApiError {
            status: status.as_u16(),
            message: fallback_message(status, body),
            reasons: Vec::new(),
        }),
        (_, Some(api)) => Error::Api(api),
        (_, None) => Error::Http {
            status: status.as_u16(),
            body: body.to_string(),
        },
    }
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}
