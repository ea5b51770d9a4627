//! Client configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use devtools_rpc::ClientOptions;
//!
//! let options = ClientOptions::new()
//!     .with_max_pending_calls(256)
//!     .with_request_timeout(Duration::from_secs(30));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// ClientOptions
// ============================================================================

/// Tunables for a [`Client`](crate::Client).
///
/// The defaults impose no limits: unbounded pending calls, the WebSocket
/// library's default message size, and calls that wait for as long as
/// their response takes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Maximum number of calls awaiting a response at once.
    pub max_pending_calls: Option<usize>,

    /// Maximum inbound message size in bytes, applied when dialing.
    pub max_message_size: Option<usize>,

    /// Default bound on how long a call waits for its response.
    pub request_timeout: Option<Duration>,
}

// ============================================================================
// Constructors
// ============================================================================

impl ClientOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_pending_calls: None,
            max_message_size: None,
            request_timeout: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientOptions {
    /// Caps the number of concurrently pending calls.
    #[inline]
    #[must_use]
    pub const fn with_max_pending_calls(mut self, max: usize) -> Self {
        self.max_pending_calls = Some(max);
        self
    }

    /// Caps the size of inbound messages.
    #[inline]
    #[must_use]
    pub const fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = Some(bytes);
        self
    }

    /// Bounds how long [`Client::call`](crate::Client::call) waits.
    #[inline]
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_impose_no_limits() {
        let options = ClientOptions::new();
        assert_eq!(options, ClientOptions::default());
        assert!(options.max_pending_calls.is_none());
        assert!(options.max_message_size.is_none());
        assert!(options.request_timeout.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let options = ClientOptions::new()
            .with_max_pending_calls(8)
            .with_max_message_size(1 << 20)
            .with_request_timeout(Duration::from_secs(5));

        assert_eq!(options.max_pending_calls, Some(8));
        assert_eq!(options.max_message_size, Some(1 << 20));
        assert_eq!(options.request_timeout, Some(Duration::from_secs(5)));
    }
}
