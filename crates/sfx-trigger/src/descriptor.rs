//! Sound Descriptor Definition
//!
//! A descriptor is the authored, immutable description of a sound: which
//! clips it may play, the ranges its volume and pitch are drawn from, and
//! the timing policy applied when it is triggered.

use serde::{Deserialize, Serialize};
use sfx_core::{SfxError, SfxResult, SpatialParams, ValueRange};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::clip::ClipRef;

// ═══════════════════════════════════════════════════════════════════════════════
// DESCRIPTOR ID GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Stable descriptor identity. Playback state is keyed by this, never by value.
pub type DescriptorId = u32;

/// Global descriptor ID counter
static NEXT_DESCRIPTOR_ID: AtomicU32 = AtomicU32::new(1);

/// Generate unique descriptor ID
pub fn generate_descriptor_id() -> DescriptorId {
    NEXT_DESCRIPTOR_ID.fetch_add(1, Ordering::Relaxed)
}

/// Keep generated IDs above an ID that came from outside the counter
pub fn reserve_descriptor_id(id: DescriptorId) {
    NEXT_DESCRIPTOR_ID.fetch_max(id.saturating_add(1), Ordering::Relaxed);
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOUND DESCRIPTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Authored sound definition
///
/// A single-clip sound is a pool of length one. An empty pool is valid and
/// makes every trigger a no-op.
///
/// ## Example
///
/// ```rust
/// use sfx_trigger::{ClipRef, SoundDescriptor};
/// use sfx_core::ValueRange;
///
/// let footstep = SoundDescriptor::new(
///     "Footstep",
///     vec![
///         ClipRef::new(10, "Step_01", 0.35),
///         ClipRef::new(11, "Step_02", 0.32),
///     ],
/// )
/// .with_volume(ValueRange::new(0.8, 1.0).unwrap())
/// .with_pitch(ValueRange::new(0.95, 1.05).unwrap())
/// .with_min_replay_interval(0.1);
///
/// assert!(footstep.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundDescriptor {
    /// Unique descriptor ID
    #[serde(default = "generate_descriptor_id")]
    pub id: DescriptorId,
    /// Descriptor name (for lookup by name)
    pub name: String,
    /// Clips one is picked from per play
    pub clips: Vec<ClipRef>,
    /// Volume range (1.0 = unity)
    pub volume: ValueRange,
    /// Pitch range (1.0 = original)
    pub pitch: ValueRange,
    /// Loop playback; forces a single play and disables auto-release
    pub looping: bool,
    /// Sequential plays per trigger
    pub play_count: u32,
    /// Delay before each play's audio starts (seconds)
    pub delay_secs: f32,
    /// Minimum gap between admitted triggers (seconds, 0 = no gate)
    pub min_replay_interval_secs: f32,
    /// Position, attenuation and routing, passed through to the host
    pub spatial: SpatialParams,
}

impl Default for SoundDescriptor {
    fn default() -> Self {
        Self {
            id: generate_descriptor_id(),
            name: String::new(),
            clips: Vec::new(),
            volume: ValueRange::unity(),
            pitch: ValueRange::unity(),
            looping: false,
            play_count: 1,
            delay_secs: 0.0,
            min_replay_interval_secs: 0.0,
            spatial: SpatialParams::default(),
        }
    }
}

impl SoundDescriptor {
    /// Create a descriptor with auto-generated ID
    pub fn new(name: impl Into<String>, clips: Vec<ClipRef>) -> Self {
        Self {
            name: name.into(),
            clips,
            ..Default::default()
        }
    }

    /// Create a single-clip descriptor
    pub fn single(name: impl Into<String>, clip: ClipRef) -> Self {
        Self::new(name, vec![clip])
    }

    // === Builder methods ===

    pub fn with_id(mut self, id: DescriptorId) -> Self {
        self.id = id;
        self
    }

    pub fn with_volume(mut self, volume: ValueRange) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_pitch(mut self, pitch: ValueRange) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_play_count(mut self, count: u32) -> Self {
        self.play_count = count;
        self
    }

    pub fn with_delay(mut self, delay_secs: f32) -> Self {
        self.delay_secs = delay_secs;
        self
    }

    pub fn with_min_replay_interval(mut self, secs: f32) -> Self {
        self.min_replay_interval_secs = secs;
        self
    }

    pub fn with_spatial(mut self, spatial: SpatialParams) -> Self {
        self.spatial = spatial;
        self
    }

    // === Query methods ===

    /// Check if the clip pool is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Number of plays a trigger produces (1 when looping)
    #[inline]
    pub fn effective_play_count(&self) -> u32 {
        if self.looping { 1 } else { self.play_count.max(1) }
    }

    /// Non-negative start delay
    #[inline]
    pub fn effective_delay(&self) -> f32 {
        self.delay_secs.max(0.0)
    }

    /// Check authored values
    ///
    /// Missing clips are tolerated here; they fail at play time like an
    /// empty pool.
    pub fn validate(&self) -> SfxResult<()> {
        let fail = |reason: String| Err(SfxError::invalid_descriptor(&self.name, reason));

        if let Err(e) = self.volume.validate() {
            return fail(format!("volume: {e}"));
        }
        if let Err(e) = self.pitch.validate() {
            return fail(format!("pitch: {e}"));
        }
        if self.play_count == 0 {
            return fail("play_count must be at least 1".into());
        }
        if !self.delay_secs.is_finite() || self.delay_secs < 0.0 {
            return fail(format!("delay must be >= 0, got {}", self.delay_secs));
        }
        if !self.min_replay_interval_secs.is_finite() || self.min_replay_interval_secs < 0.0 {
            return fail(format!(
                "min replay interval must be >= 0, got {}",
                self.min_replay_interval_secs
            ));
        }
        if let Some(clip) = self
            .clips
            .iter()
            .find(|c| !c.duration_secs.is_finite() || c.duration_secs < 0.0)
        {
            return fail(format!(
                "clip '{}' has invalid duration {}",
                clip.name, clip.duration_secs
            ));
        }
        if let Some(d) = self.spatial.max_distance {
            if !d.is_finite() {
                return fail("max distance must be finite".into());
            }
        }
        if let Some(p) = self.spatial.position {
            if !p.is_finite() {
                return fail("position must be finite".into());
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
