//! Host audio boundary
//!
//! The scheduler drives the engine's audio subsystem only through
//! [`AudioHost`]. Each setter is independent so the emitter lifecycle can
//! skip whatever the descriptor leaves unset.

use sfx_core::{BusId, Position3D, RolloffMode};
use std::collections::HashMap;

use crate::clip::{ClipId, ClipRef};

/// Host playback object handle
pub type EmitterId = u64;

/// Host scene object (owner / parent) identifier
pub type HostObjectId = u64;

/// In-process audio API of the host engine
pub trait AudioHost {
    /// Create a playback object for `clip`, optionally on an existing scene
    /// object. `None` when the host cannot create one (e.g. scene unloading).
    fn create_emitter(
        &mut self,
        clip: &ClipRef,
        name: &str,
        parent: Option<HostObjectId>,
    ) -> Option<EmitterId>;

    /// Destroy the emitter's owning object after `after_secs`
    fn destroy_emitter(&mut self, emitter: EmitterId, after_secs: f32);

    fn set_output_bus(&mut self, emitter: EmitterId, bus: BusId);
    fn set_max_distance(&mut self, emitter: EmitterId, distance: f32);
    fn set_pitch(&mut self, emitter: EmitterId, pitch: f32);
    fn set_position(&mut self, emitter: EmitterId, position: Position3D);
    fn set_rolloff(&mut self, emitter: EmitterId, rolloff: RolloffMode);
    fn set_volume(&mut self, emitter: EmitterId, volume: f32);
    fn set_loop(&mut self, emitter: EmitterId, looping: bool);

    /// Start playback now
    fn start(&mut self, emitter: EmitterId);

    /// Start playback after `delay_secs`, without blocking the caller
    fn start_delayed(&mut self, emitter: EmitterId, delay_secs: f32);
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDING HOST
// ═══════════════════════════════════════════════════════════════════════════════

/// One call made against a [`RecordingHost`]
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Create {
        emitter: EmitterId,
        clip: ClipId,
        name: String,
        parent: Option<HostObjectId>,
    },
    Destroy {
        emitter: EmitterId,
        after_secs: f32,
    },
    SetOutputBus(EmitterId, BusId),
    SetMaxDistance(EmitterId, f32),
    SetPitch(EmitterId, f32),
    SetPosition(EmitterId, Position3D),
    SetRolloff(EmitterId, RolloffMode),
    SetVolume(EmitterId, f32),
    SetLoop(EmitterId, bool),
    Start(EmitterId),
    StartDelayed(EmitterId, f32),
}

impl HostCall {
    /// Emitter the call targets
    pub fn emitter(&self) -> EmitterId {
        match self {
            HostCall::Create { emitter, .. } | HostCall::Destroy { emitter, .. } => *emitter,
            HostCall::SetOutputBus(e, _)
            | HostCall::SetMaxDistance(e, _)
            | HostCall::SetPitch(e, _)
            | HostCall::SetPosition(e, _)
            | HostCall::SetRolloff(e, _)
            | HostCall::SetVolume(e, _)
            | HostCall::SetLoop(e, _)
            | HostCall::StartDelayed(e, _) => *e,
            HostCall::Start(e) => *e,
        }
    }
}

/// Host-side state of one emitter, as last configured
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEmitter {
    pub clip: ClipRef,
    pub name: String,
    pub parent: Option<HostObjectId>,
    pub output_bus: Option<BusId>,
    pub max_distance: Option<f32>,
    pub pitch: f32,
    pub position: Option<Position3D>,
    pub rolloff: Option<RolloffMode>,
    pub volume: f32,
    pub looping: bool,
    /// Delay the emitter was started with (`Some(0.0)` for immediate)
    pub started: Option<f32>,
    /// Scheduled destruction delay
    pub destroy_after: Option<f32>,
}

impl RecordedEmitter {
    fn new(clip: &ClipRef, name: &str, parent: Option<HostObjectId>) -> Self {
        Self {
            clip: clip.clone(),
            name: name.to_string(),
            parent,
            output_bus: None,
            max_distance: None,
            pitch: 1.0,
            position: None,
            rolloff: None,
            volume: 1.0,
            looping: false,
            started: None,
            destroy_after: None,
        }
    }
}

/// Headless host that records every call
///
/// Useful for tools and tests that need to observe exactly what the
/// scheduler asked of the engine.
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
    emitters: HashMap<EmitterId, RecordedEmitter>,
    next_emitter: EmitterId,
    refuse_creation: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_emitter` fail, as a host does while its scene unloads
    pub fn set_refuse_creation(&mut self, refuse: bool) {
        self.refuse_creation = refuse;
    }

    /// Every call, in order
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Calls targeting one emitter, in order
    pub fn calls_for(&self, emitter: EmitterId) -> Vec<&HostCall> {
        self.calls.iter().filter(|c| c.emitter() == emitter).collect()
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&RecordedEmitter> {
        self.emitters.get(&id)
    }

    /// Number of emitters created so far
    pub fn created_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::Create { .. }))
            .count()
    }

    /// Emitter IDs in creation order
    pub fn created_emitters(&self) -> Vec<EmitterId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Create { emitter, .. } => Some(*emitter),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, call: HostCall) {
        self.calls.push(call);
    }

    fn with_emitter(&mut self, id: EmitterId, f: impl FnOnce(&mut RecordedEmitter)) {
        if let Some(e) = self.emitters.get_mut(&id) {
            f(e);
        }
    }
}

impl AudioHost for RecordingHost {
    fn create_emitter(
        &mut self,
        clip: &ClipRef,
        name: &str,
        parent: Option<HostObjectId>,
    ) -> Option<EmitterId> {
        if self.refuse_creation {
            return None;
        }

        self.next_emitter += 1;
        let id = self.next_emitter;
        self.emitters
            .insert(id, RecordedEmitter::new(clip, name, parent));
        self.record(HostCall::Create {
            emitter: id,
            clip: clip.id,
            name: name.to_string(),
            parent,
        });
        Some(id)
    }

    fn destroy_emitter(&mut self, emitter: EmitterId, after_secs: f32) {
        self.with_emitter(emitter, |e| e.destroy_after = Some(after_secs));
        self.record(HostCall::Destroy {
            emitter,
            after_secs,
        });
    }

    fn set_output_bus(&mut self, emitter: EmitterId, bus: BusId) {
        self.with_emitter(emitter, |e| e.output_bus = Some(bus));
        self.record(HostCall::SetOutputBus(emitter, bus));
    }

    fn set_max_distance(&mut self, emitter: EmitterId, distance: f32) {
        self.with_emitter(emitter, |e| e.max_distance = Some(distance));
        self.record(HostCall::SetMaxDistance(emitter, distance));
    }

    fn set_pitch(&mut self, emitter: EmitterId, pitch: f32) {
        self.with_emitter(emitter, |e| e.pitch = pitch);
        self.record(HostCall::SetPitch(emitter, pitch));
    }

    fn set_position(&mut self, emitter: EmitterId, position: Position3D) {
        self.with_emitter(emitter, |e| e.position = Some(position));
        self.record(HostCall::SetPosition(emitter, position));
    }

    fn set_rolloff(&mut self, emitter: EmitterId, rolloff: RolloffMode) {
        self.with_emitter(emitter, |e| e.rolloff = Some(rolloff));
        self.record(HostCall::SetRolloff(emitter, rolloff));
    }

    fn set_volume(&mut self, emitter: EmitterId, volume: f32) {
        self.with_emitter(emitter, |e| e.volume = volume);
        self.record(HostCall::SetVolume(emitter, volume));
    }

    fn set_loop(&mut self, emitter: EmitterId, looping: bool) {
        self.with_emitter(emitter, |e| e.looping = looping);
        self.record(HostCall::SetLoop(emitter, looping));
    }

    fn start(&mut self, emitter: EmitterId) {
        self.with_emitter(emitter, |e| e.started = Some(0.0));
        self.record(HostCall::Start(emitter));
    }

    fn start_delayed(&mut self, emitter: EmitterId, delay_secs: f32) {
        self.with_emitter(emitter, |e| e.started = Some(delay_secs));
        self.record(HostCall::StartDelayed(emitter, delay_secs));
    }
}
