//! `Identity` — Opaque per-node tokens for deduplication during traversal
//!
//! Every routing node carries an [`Identity`]. The walker uses it to
//! recognise a node it has already visited. The zero token,
//! [`Identity::NONE`], opts a node out of deduplication entirely.
//!
//! Identities come from an [`IdentityAllocator`], which is plain shared state
//! owned by whoever builds nodes (usually a [`RouteGraph`](crate::RouteGraph)).
//! There is no process-wide counter: tests get a fresh allocator each.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identity token of a routing node.
///
/// # INV: zero is never deduplicated
///
/// [`Identity::NONE`] is a valid identity. Nodes carrying it are never marked
/// as visited and are therefore entered every time they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identity(u64);

impl Identity {
    /// The "no identity" token.
    pub const NONE: Self = Self(0);

    /// Wrap a raw token.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw token value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns `true` for [`Identity::NONE`].
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("#-")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Thread-safe, monotonically increasing identity source.
///
/// Yields `1, 2, 3, …`; never yields [`Identity::NONE`].
#[derive(Debug, Default)]
pub struct IdentityAllocator {
    last: AtomicU64,
}

impl IdentityAllocator {
    /// Create an allocator whose first identity is `1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next identity.
    pub fn allocate(&self) -> Identity {
        Identity(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// The most recently allocated identity ([`Identity::NONE`] if none yet).
    #[must_use]
    pub fn last(&self) -> Identity {
        Identity(self.last.load(Ordering::Relaxed))
    }
}
