//! Request and Response message types.
//!
//! Defines the outbound call frame and the inbound response frame,
//! together with the helpers that encode a call and decode its result.

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::CallId;

// ============================================================================
// Request
// ============================================================================

/// A call from the local end to the remote end.
///
/// # Format
///
/// ```json
/// {
///   "id": 1,
///   "method": "Domain.method",
///   "params": { ... }
/// }
/// ```
///
/// `params` is serialized as-is. Calls without arguments pass `()` or
/// `None`, which encode as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct Request<'a, P: ?Sized> {
    /// Unique identifier for request/response correlation.
    pub id: CallId,

    /// Method name in `Domain.method` format.
    pub method: &'a str,

    /// Opaque parameters.
    pub params: &'a P,
}

impl<'a, P: Serialize + ?Sized> Request<'a, P> {
    /// Creates a new request.
    #[inline]
    #[must_use]
    pub const fn new(id: CallId, method: &'a str, params: &'a P) -> Self {
        Self { id, method, params }
    }

    /// Serializes the request into one wire frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if `params` cannot be serialized.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Serializes a call into one wire frame.
///
/// # Errors
///
/// Returns [`Error::Json`] if `params` cannot be serialized.
pub fn encode_request<P: Serialize + ?Sized>(id: CallId, method: &str, params: &P) -> Result<String> {
    Request::new(id, method, params).encode()
}

// ============================================================================
// Response
// ============================================================================

/// A response from the remote end to a previously issued call.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 1, "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": 1, "error": "message or object" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: CallId,

    /// Result payload. Absent or `null` results are [`Value::Null`].
    #[serde(default)]
    pub result: Value,

    /// Error payload, if the call failed. `null` counts as absent.
    #[serde(default)]
    pub error: Option<Value>,
}

impl Response {
    /// Returns `true` if the response carries an error.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result payload, or the remote error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] if the response carried an `error` field.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(error) => Err(Error::remote(error)),
            None => Ok(self.result),
        }
    }
}

/// Decodes a raw result payload into the caller's type.
///
/// A decode failure concerns only the one call it belongs to.
///
/// # Errors
///
/// Returns [`Error::Json`] if `result` does not match `R`.
pub fn decode_result<R: DeserializeOwned>(result: Value) -> Result<R> {
    Ok(serde_json::from_value(result)?)
}

// ============================================================================
// Tests
// ============================================================================
