//! Wire frame types and codec.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Local → Remote | Method call |
//! | `Response` | Remote → Local | Call result or error |
//! | `Notification` | Remote → Local | Unsolicited event |
//!
//! Each WebSocket message carries exactly one JSON document.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | [`Command`] and [`Event`] traits for typed bindings |
//! | `event` | Notification type |
//! | `frame` | Inbound frame classification |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Typed command and event traits.
pub mod command;

/// Notification message type.
pub mod event;

/// Inbound frame classification.
pub mod frame;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, Empty, Event};
pub use event::Notification;
pub use frame::{Frame, decode_frame};
pub use request::{Request, Response, decode_result, encode_request};
