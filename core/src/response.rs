//! Response wrapper and status classification.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ureq::http::StatusCode;

use crate::error::{Error, Result};
use crate::http::HttpResponse;

/// Message used when a 404 arrives without a parseable error body.
pub const NOT_FOUND_MESSAGE: &str = "resource not found";

/// A response from the accounts API, wrapping the raw transport response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    raw: HttpResponse,
}

impl Response {
    pub fn new(raw: HttpResponse) -> Self {
        Self { raw }
    }

    pub fn status_code(&self) -> u16 {
        self.raw.status
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.raw.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.raw.header(name)
    }

    pub fn body(&self) -> &str {
        &self.raw.body
    }

    pub fn raw(&self) -> &HttpResponse {
        &self.raw
    }

    pub fn into_raw(self) -> HttpResponse {
        self.raw
    }
}

/// Error body reported by the server on non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_message: String,
}

/// Classify a response: `Ok` for 2xx, `Error::Api` otherwise.
///
/// The message comes from the `{error_message}` body. A 404 whose body is
/// not an `ErrorResponse` gets [`NOT_FOUND_MESSAGE`]; any other unparseable
/// body is surfaced verbatim, or as the status reason phrase when empty.
pub fn check_response(response: Response) -> Result<Response> {
    if response.is_success() {
        return Ok(response);
    }
    let status = response.status_code();
    let message = match serde_json::from_str::<ErrorResponse>(response.body()) {
        Ok(body) => body.error_message,
        Err(_) if status == 404 => NOT_FOUND_MESSAGE.to_string(),
        Err(_) if response.body().trim().is_empty() => reason_phrase(status),
        Err(_) => response.body().trim().to_string(),
    };
    Err(Error::Api {
        status,
        message,
        response,
    })
}

fn reason_phrase(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(|| format!("HTTP status {status}"), str::to_string)
}

/// Decode a successful response body into `T`.
pub(crate) fn decode<T: DeserializeOwned>(response: Response) -> Result<(T, Response)> {
    match serde_json::from_str(response.body()) {
        Ok(value) => Ok((value, response)),
        Err(source) => Err(Error::Decode { source, response }),
    }
}
