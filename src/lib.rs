//! DevTools RPC - multiplexed client for DevTools-style debugging protocols.
//!
//! This library speaks a JSON remote-debugging protocol (Chrome DevTools
//! Protocol style) over a single persistent WebSocket.
//!
//! # Architecture
//!
//! One connection carries two unrelated kinds of traffic:
//!
//! - **Calls**: request/response pairs correlated by a numeric id
//! - **Notifications**: one-way events pushed by the remote end at any
//!   time, identified only by method name
//!
//! Key design principles:
//!
//! - Each [`Connection`] owns its socket, a pending-call table and a
//!   listener registry
//! - A single read loop routes every inbound frame; a single writer
//!   serializes every outbound frame
//! - Payloads are opaque JSON; typed decoding happens at the edges via
//!   [`Command`] and [`Event`]
//!
//! # Quick Start
//!
//! ```no_run
//! use devtools_rpc::{Client, Result};
//! use serde_json::{Value, json};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::connect("ws://127.0.0.1:9222/devtools/page/ABC").await?;
//!
//!     client.add_listener("Page.frameNavigated", |params: &Value| {
//!         println!("navigated: {}", params["frame"]["url"]);
//!     });
//!
//!     client.execute("Page.enable", ()).await?;
//!     let _: Value = client
//!         .call("Page.navigate", json!({"url": "https://example.com"}))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`] façade, builder and options |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Wire frame types and codec |
//! | [`transport`] | Connection, read loop and writer |

// ============================================================================
// Modules
// ============================================================================

/// Client façade, builder and configuration.
///
/// Use [`Client::builder()`] to configure a client.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Wire frame types and codec.
pub mod protocol;

/// WebSocket transport layer.
///
/// Handles request/response correlation and notification routing.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{Client, ClientBuilder, ClientOptions};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::CallId;

// Protocol types
pub use protocol::{Command, Empty, Event, Frame, Notification, Response};

// Transport types
pub use transport::{Connection, Listener};
