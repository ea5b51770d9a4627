//! Notification message type.
//!
//! Notifications are pushed by the remote end at any time. They carry no
//! identifier and nobody is waiting for them; they are routed to the
//! listeners registered for their method name.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// Notification
// ============================================================================

/// A one-way notification from remote end to local end.
///
/// # Format
///
/// ```json
/// {
///   "method": "Domain.eventName",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notification {
    /// Event name in `Domain.eventName` format.
    pub method: String,

    /// Event-specific data, left undecoded.
    #[serde(default)]
    pub params: Value,
}

impl Notification {
    /// Returns the domain name from the method.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let n = Notification { method: "Page.loadEventFired".into(), .. };
    /// assert_eq!(n.domain(), "Page");
    /// ```
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }

    /// Returns the event name from the method.
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.method.split('.').nth(1).unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
