//! Type-safe identifiers.
//!
//! Newtype wrappers keep call identifiers from being confused with other
//! integers flowing through the crate.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// CallId
// ============================================================================

/// Sequence identifier correlating a request with its response.
///
/// Serialized as a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(u64);

impl CallId {
    /// Wraps a raw identifier.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CallId {
    #[inline]
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ============================================================================
// CallIdAllocator
// ============================================================================

/// Monotonic source of [`CallId`]s for one connection.
///
/// Identifiers start at 1 and are never handed out twice.
#[derive(Debug)]
pub struct CallIdAllocator {
    next: AtomicU64,
}

impl CallIdAllocator {
    /// Creates an allocator whose first identifier is 1.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocates the next identifier.
    #[inline]
    pub fn next_id(&self) -> CallId {
        CallId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for CallIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
