//! Client façade, builder and configuration.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | Fluent [`ClientBuilder`] |
//! | `core` | The [`Client`] itself |
//! | `options` | [`ClientOptions`] tunables |

// ============================================================================
// Submodules
// ============================================================================

/// Builder pattern for client configuration.
pub mod builder;

/// Client façade over a multiplexed connection.
pub mod core;

/// Client configuration.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use self::core::Client;
pub use options::ClientOptions;
