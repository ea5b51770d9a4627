//! WebSocket transport layer.
//!
//! This module owns the socket and multiplexes calls and notifications
//! over it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐                        ┌─────────────────┐
//! │  Connection (Rust)   │                        │  Remote end     │
//! │                      │  Request  ──────────►  │  (debug target) │
//! │  writer task         │                        │                 │
//! │  read loop task      │  ◄──────  Response     │                 │
//! │   ├ PendingCalls     │  ◄──────  Notification │                 │
//! │   └ ListenerRegistry │                        │                 │
//! └──────────────────────┘                        └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Connection handle, read loop and writer |
//! | `listeners` | Notification listener registry |
//! | `pending` | Pending-call correlation table |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and dispatch loop.
pub mod connection;

/// Notification listener registry.
pub mod listeners;

/// Pending-call correlation table.
pub(crate) mod pending;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
pub use listeners::Listener;
