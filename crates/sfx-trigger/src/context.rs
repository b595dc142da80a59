//! Trigger Context
//!
//! Who triggered a sound, where, and the caller-held token that stops the
//! remaining plays of its sequence.

use sfx_core::Position3D;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::host::HostObjectId;

// ═══════════════════════════════════════════════════════════════════════════════
// CANCELLATION TOKEN
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared cancel flag
///
/// Clones observe the same flag. Cancelling stops a sequence's remaining
/// plays; emitters that already started keep playing.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check if cancelled
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Get cancel flag for sharing
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRIGGER CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Context a sound is triggered from
#[derive(Debug, Clone, Default)]
pub struct TriggerContext {
    /// Scene object the emitters attach to; also the scope of
    /// owner-wide cancellation
    pub owner: Option<HostObjectId>,
    /// Position override (wins over the descriptor's own position)
    pub position: Option<Position3D>,
    /// Caller-held cancellation
    pub token: CancellationToken,
}

impl TriggerContext {
    /// Global context: no owner, no override, fresh token
    pub fn new() -> Self {
        Self::default()
    }

    /// Context owned by a scene object
    pub fn owned_by(owner: HostObjectId) -> Self {
        Self {
            owner: Some(owner),
            ..Default::default()
        }
    }

    /// Context at a world position
    pub fn at(position: Position3D) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn with_owner(mut self, owner: HostObjectId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_position(mut self, position: Position3D) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
