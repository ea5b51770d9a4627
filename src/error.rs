//! Error types for the DevTools RPC client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use devtools_rpc::{Client, Result};
//!
//! async fn example(client: &Client) -> Result<()> {
//!     client.execute("Page.enable", ()).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants | Scope |
//! |----------|----------|-------|
//! | Configuration | [`Error::Config`] | builder |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`] | connection-fatal |
//! | Protocol | [`Error::Remote`], [`Error::Protocol`] | one call, or fatal for bad frames |
//! | Execution | [`Error::RequestTimeout`] | one call |
//! | External | [`Error::Json`], [`Error::WebSocket`], [`Error::ChannelClosed`] | varies |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::CallId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a client URL or option is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection could not be established.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// The connection is closed.
    ///
    /// Every call still pending when the read loop stops receives this
    /// error, as does every call issued afterwards.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// The remote end answered a call with an `error` field.
    ///
    /// Local to the one call; the connection stays usable.
    #[error("Remote error: {message}")]
    Remote {
        /// Human-readable error text.
        message: String,
        /// The raw `error` value as received.
        data: Value,
    },

    /// Protocol violation or local protocol limit.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// A call did not receive its response within the requested timeout.
    #[error("Call {call_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The call that timed out.
        call_id: CallId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a remote error from the raw `error` value of a response.
    ///
    /// A string value is used verbatim. An object with a string `message`
    /// member uses that member. Anything else is rendered as JSON text.
    pub fn remote(data: Value) -> Self {
        let message = match &data {
            Value::String(s) => s.clone(),
            Value::Object(map) => match map.get("message").and_then(Value::as_str) {
                Some(m) => m.to_string(),
                None => data.to_string(),
            },
            other => other.to_string(),
        };
        Self::Remote { message, data }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(call_id: CallId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            call_id,
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestTimeout { .. })
    }

    /// Returns `true` if this error means the connection is unusable.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }

    /// Returns `true` if the remote end reported this error.
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
