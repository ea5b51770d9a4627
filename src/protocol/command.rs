//! Typed seams for per-domain protocol bindings.
//!
//! Domain bindings (hand-written or generated) describe each command and
//! event once, as a type, and go through [`Client::command`] and
//! [`Client::on`] instead of passing method strings around.
//!
//! ```ignore
//! #[derive(Serialize)]
//! struct Navigate { url: String }
//!
//! #[derive(Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct NavigateResult { frame_id: String }
//!
//! impl Command for Navigate {
//!     const METHOD: &'static str = "Page.navigate";
//!     type Response = NavigateResult;
//! }
//! ```
//!
//! [`Client::command`]: crate::Client::command
//! [`Client::on`]: crate::Client::on

// ============================================================================
// Imports
// ============================================================================

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Command
// ============================================================================

/// A protocol command: its parameters, method name and result type.
pub trait Command: Serialize {
    /// Method name in `Domain.method` format.
    const METHOD: &'static str;

    /// Type the result payload decodes into.
    ///
    /// Use [`Empty`] for commands that return nothing; the remote end
    /// still answers them with `{}`, which `()` cannot decode.
    type Response: DeserializeOwned;
}

// ============================================================================
// Event
// ============================================================================

/// A protocol notification payload.
pub trait Event: DeserializeOwned {
    /// Method name in `Domain.eventName` format.
    const METHOD: &'static str;
}

// ============================================================================
// Empty
// ============================================================================

/// Result of a command that returns nothing.
///
/// Decodes from any payload and discards it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Empty;

impl<'de> Deserialize<'de> for Empty {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        IgnoredAny::deserialize(deserializer).map(|_| Self)
    }
}

// ============================================================================
// Tests
// ============================================================================
