//! Wire types for the line-delimited JSON server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::responses::ErrorBody;

/// Mutant detected.
pub const OK: u16 = 200;

/// Request rejected (malformed JSON or grid).
pub const BAD_REQUEST: u16 = 400;

/// Human detected.
pub const FORBIDDEN: u16 = 403;

/// Unknown method.
pub const NOT_FOUND: u16 = 404;

/// Store or hashing failure.
pub const INTERNAL_ERROR: u16 = 500;

/// A request line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRequest {
    /// Echoed back verbatim (number or string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// `mutant`, `stats` or `health`.
    pub method: String,

    /// Grid rows for `mutant`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dna: Option<Vec<Option<String>>>,
}

impl ServerRequest {
    /// Creates a request without an ID.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            id: None,
            method: method.into(),
            dna: None,
        }
    }

    /// Attaches grid rows.
    pub fn with_dna<S: Into<String>>(mut self, rows: impl IntoIterator<Item = S>) -> Self {
        self.dna = Some(rows.into_iter().map(|r| Some(r.into())).collect());
        self
    }
}

/// A response line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// HTTP-style status code.
    pub status: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    #[serde(flatten)]
    pub error: Option<ErrorBody>,
}

impl ServerResponse {
    /// Status-only response.
    pub fn status(id: Option<Value>, status: u16) -> Self {
        Self {
            id,
            status,
            body: None,
            error: None,
        }
    }

    /// 200 with a body.
    pub fn ok(id: Option<Value>, body: Value) -> Self {
        Self {
            id,
            status: OK,
            body: Some(body),
            error: None,
        }
    }

    /// Error response.
    pub fn error(id: Option<Value>, status: u16, error: &str, message: impl Into<String>) -> Self {
        Self {
            id,
            status,
            body: None,
            error: Some(ErrorBody::new(error, message)),
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(id: Option<Value>, message: impl Into<String>) -> Self {
        Self::error(id, BAD_REQUEST, "Bad Request", message)
    }

    /// 500 with a generic message; details belong in the log.
    pub fn internal_error(id: Option<Value>) -> Self {
        Self::error(
            id,
            INTERNAL_ERROR,
            "Internal Server Error",
            "Fatal error while processing the DNA sequence. See logs for details.",
        )
    }

    /// Whether the status is an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
