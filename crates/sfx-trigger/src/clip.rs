//! Clip references
//!
//! A clip is opaque to the scheduler except for its duration, which drives
//! sequencing waits and auto-release timing.

use serde::{Deserialize, Serialize};

/// Host asset identifier for an audio clip
pub type ClipId = u32;

/// Missing clip (unassigned slot in an authored pool)
pub const INVALID_CLIP: ClipId = 0;

/// Reference to a host-owned audio clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRef {
    /// Host asset ID
    pub id: ClipId,
    /// Clip name (diagnostics)
    #[serde(default)]
    pub name: String,
    /// Clip length in seconds
    pub duration_secs: f32,
}

impl ClipRef {
    pub fn new(id: ClipId, name: impl Into<String>, duration_secs: f32) -> Self {
        Self {
            id,
            name: name.into(),
            duration_secs,
        }
    }

    /// Unassigned slot
    pub fn missing() -> Self {
        Self {
            id: INVALID_CLIP,
            name: String::new(),
            duration_secs: 0.0,
        }
    }

    /// Whether the host can play this clip
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.id != INVALID_CLIP && self.duration_secs.is_finite() && self.duration_secs >= 0.0
    }
}
