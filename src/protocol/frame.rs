//! Inbound frame classification.
//!
//! Every inbound WebSocket message carries exactly one JSON object, which
//! is either a [`Response`] or a [`Notification`]. The object's shape
//! decides which:
//!
//! | Shape | Frame |
//! |-------|-------|
//! | non-empty `method` | [`Frame::Notification`] |
//! | otherwise, has `id` | [`Frame::Response`] |
//! | neither | malformed |
//!
//! A malformed frame leaves nothing to correlate against, so callers must
//! treat a decode error as fatal for the connection.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::CallId;

use super::{Notification, Response};

// ============================================================================
// Frame
// ============================================================================

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Answer to a pending call.
    Response(Response),
    /// Unsolicited event.
    Notification(Notification),
}

/// Superset of both inbound shapes, used only for classification.
#[derive(Deserialize)]
struct RawFrame {
    #[serde(default)]
    id: Option<CallId>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<Value>,
}

impl Frame {
    /// Returns the method name if this is a notification.
    #[inline]
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Notification(n) => Some(&n.method),
            Self::Response(_) => None,
        }
    }

    /// Returns the call identifier if this is a response.
    #[inline]
    #[must_use]
    pub fn call_id(&self) -> Option<CallId> {
        match self {
            Self::Response(r) => Some(r.id),
            Self::Notification(_) => None,
        }
    }
}

/// Decodes one inbound message into a [`Frame`].
///
/// # Errors
///
/// - [`Error::Json`] if the bytes are not exactly one JSON object
/// - [`Error::Protocol`] if the object is neither a response nor a notification
pub fn decode_frame(bytes: &[u8]) -> Result<Frame> {
    let raw: RawFrame = serde_json::from_slice(bytes)?;

    if let Some(method) = raw.method.filter(|m| !m.is_empty()) {
        return Ok(Frame::Notification(Notification {
            method,
            params: raw.params,
        }));
    }

    let id = raw
        .id
        .ok_or_else(|| Error::protocol("frame has neither a method nor an id"))?;

    Ok(Frame::Response(Response {
        id,
        result: raw.result,
        error: raw.error,
    }))
}

// ============================================================================
// Tests
// ============================================================================
