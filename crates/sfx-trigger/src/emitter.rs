//! Emitter Lifecycle
//!
//! Creates a host playback object for one resolved play, applies the set
//! parameters in a fixed order, starts it, and schedules its release.
//!
//! Parameter assembly is a plain [`EmitRequest`] value; there is no
//! builder and no required call order.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sfx_core::{Position3D, SpatialParams};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::clip::ClipRef;
use crate::context::TriggerContext;
use crate::descriptor::SoundDescriptor;
use crate::host::{AudioHost, EmitterId, HostObjectId};
use crate::resolve::{ResolvedPlay, resolve_play};

// ═══════════════════════════════════════════════════════════════════════════════
// EMITTER NAMING
// ═══════════════════════════════════════════════════════════════════════════════

/// Default emitter name prefix
pub const DEFAULT_EMITTER_PREFIX: &str = "Sound";

/// Global emitter serial counter (diagnostic names only)
static NEXT_EMITTER_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Next emitter serial
#[inline]
pub fn next_emitter_serial() -> u64 {
    NEXT_EMITTER_SERIAL.fetch_add(1, Ordering::Relaxed)
}

/// Diagnostic name for a new emitter, e.g. `Sound17`
pub fn emitter_name(prefix: &str) -> String {
    format!("{}{}", prefix, next_emitter_serial())
}

// ═══════════════════════════════════════════════════════════════════════════════
// RELEASE TIMING
// ═══════════════════════════════════════════════════════════════════════════════

/// When the auto-release countdown of a delayed, non-looping play begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReleaseTiming {
    /// Release `duration` seconds after playback actually starts
    /// (`delay + duration` after the trigger)
    #[default]
    AfterStart,
    /// Release `duration` seconds after the trigger, concurrently with the
    /// start delay. A delay close to the clip length can cut the sound.
    FromTrigger,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EMIT REQUEST
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything needed to create and start one emitter
#[derive(Debug, Clone, PartialEq)]
pub struct EmitRequest {
    /// Resolved clip, volume and pitch
    pub play: ResolvedPlay,
    /// Position, attenuation and routing
    pub spatial: SpatialParams,
    /// Loop playback (disables auto-release)
    pub looping: bool,
    /// Start delay in seconds (<= 0 starts immediately)
    pub delay_secs: f32,
    /// Start playback once configured
    pub autoplay: bool,
    /// Schedule destruction once the clip has played
    pub auto_release: bool,
    /// Auto-release countdown origin
    pub release_timing: ReleaseTiming,
    /// Existing scene object to put the emitter on
    pub parent: Option<HostObjectId>,
    /// Emitter name (generated when `None`)
    pub name: Option<String>,
}

impl EmitRequest {
    /// Autoplaying, auto-releasing, non-positional request
    pub fn new(play: ResolvedPlay) -> Self {
        Self {
            play,
            spatial: SpatialParams::default(),
            looping: false,
            delay_secs: 0.0,
            autoplay: true,
            auto_release: true,
            release_timing: ReleaseTiming::default(),
            parent: None,
            name: None,
        }
    }

    /// Request carrying a descriptor's spatial, loop and delay settings
    pub fn from_descriptor(descriptor: &SoundDescriptor, play: ResolvedPlay) -> Self {
        Self {
            spatial: descriptor.spatial,
            looping: descriptor.looping,
            delay_secs: descriptor.effective_delay(),
            ..Self::new(play)
        }
    }

    /// Attach to the context's owner and apply its position override
    pub fn with_context(mut self, context: &TriggerContext) -> Self {
        if context.owner.is_some() {
            self.parent = context.owner;
        }
        if context.position.is_some() {
            self.spatial.position = context.position;
        }
        self
    }

    pub fn with_release_timing(mut self, timing: ReleaseTiming) -> Self {
        self.release_timing = timing;
        self
    }

    /// Seconds until the emitter is destroyed, if it is auto-released
    pub fn release_after_secs(&self) -> Option<f32> {
        if self.looping || !self.auto_release {
            return None;
        }

        let duration = self.play.duration_secs();
        let start_delay = if self.autoplay && self.release_timing == ReleaseTiming::AfterStart {
            self.delay_secs.max(0.0)
        } else {
            0.0
        };
        Some(duration + start_delay)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EMITTER HANDLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Record of a started emitter
///
/// The host owns the emitter; this is what the scheduler knew when it
/// created it.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterHandle {
    pub id: EmitterId,
    pub name: String,
    pub clip: ClipRef,
    pub volume: f32,
    pub pitch: f32,
    pub position: Option<Position3D>,
    pub looping: bool,
    /// Scheduled destruction delay; `None` for caller-managed emitters
    pub release_after_secs: Option<f32>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EMIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Apply the request's parameters to an existing emitter
///
/// Order: output bus, max distance (> 0 only), pitch, position, rolloff,
/// volume, loop. Unset fields are not touched.
pub fn apply_parameters<H: AudioHost + ?Sized>(
    host: &mut H,
    emitter: EmitterId,
    request: &EmitRequest,
) {
    let spatial = &request.spatial;

    if let Some(bus) = spatial.output_bus {
        host.set_output_bus(emitter, bus);
    }
    if let Some(distance) = spatial.effective_max_distance() {
        host.set_max_distance(emitter, distance);
    }
    host.set_pitch(emitter, request.play.pitch);
    if let Some(position) = spatial.position {
        host.set_position(emitter, position);
    }
    if let Some(rolloff) = spatial.rolloff {
        host.set_rolloff(emitter, rolloff);
    }
    host.set_volume(emitter, request.play.volume);
    host.set_loop(emitter, request.looping);
}

/// Create, configure, start and schedule release of one emitter
///
/// Returns `None` without touching the host when the clip is invalid, and
/// `None` when the host refuses to create the object.
pub fn emit<H: AudioHost + ?Sized>(host: &mut H, request: &EmitRequest) -> Option<EmitterHandle> {
    let clip = &request.play.clip;
    if !clip.is_valid() {
        log::debug!("Skipping emit: invalid clip '{}' (id {})", clip.name, clip.id);
        return None;
    }

    let name = request
        .name
        .clone()
        .unwrap_or_else(|| emitter_name(DEFAULT_EMITTER_PREFIX));

    let Some(id) = host.create_emitter(clip, &name, request.parent) else {
        log::warn!("Host refused to create emitter '{}' for clip '{}'", name, clip.name);
        return None;
    };

    apply_parameters(host, id, request);

    if request.autoplay {
        if request.delay_secs > 0.0 {
            host.start_delayed(id, request.delay_secs);
        } else {
            host.start(id);
        }
    }

    let release_after_secs = request.release_after_secs();
    if let Some(after) = release_after_secs {
        host.destroy_emitter(id, after);
    }

    log::debug!(
        "Emitter {} '{}' started: clip '{}', volume {:.3}, pitch {:.3}, delay {:.3}s, loop {}",
        id,
        name,
        clip.name,
        request.play.volume,
        request.play.pitch,
        request.delay_secs,
        request.looping
    );

    Some(EmitterHandle {
        id,
        name,
        clip: clip.clone(),
        volume: request.play.volume,
        pitch: request.play.pitch,
        position: request.spatial.position,
        looping: request.looping,
        release_after_secs,
    })
}

/// Play a descriptor once: resolve, emit, auto-release
///
/// Stateless: no replay gate, no sequencing, `play_count` is ignored.
/// The context's position overrides the descriptor's own position.
pub fn play_one_shot<H: AudioHost + ?Sized, R: Rng>(
    host: &mut H,
    rng: &mut R,
    descriptor: &SoundDescriptor,
    context: &TriggerContext,
) -> Option<EmitterHandle> {
    let play = resolve_play(descriptor, rng)?;
    let request = EmitRequest::from_descriptor(descriptor, play).with_context(context);
    emit(host, &request)
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
