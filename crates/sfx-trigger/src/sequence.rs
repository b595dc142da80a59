//! Play Sequences
//!
//! An admitted trigger becomes a [`PlaySequence`]: `play_count` plays of the
//! same descriptor, each waiting for the previous clip to finish. The
//! processor polls sequences every frame; a sequence never blocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::TriggerContext;
use crate::descriptor::{DescriptorId, SoundDescriptor};
use crate::host::{EmitterId, HostObjectId};

// ═══════════════════════════════════════════════════════════════════════════════
// SEQUENCE ID GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Unique identifier for one triggered sequence
pub type SequenceId = u64;

/// Global sequence ID counter
static NEXT_SEQUENCE_ID: AtomicU64 = AtomicU64::new(1);

/// Generate unique sequence ID
#[inline]
pub fn generate_sequence_id() -> SequenceId {
    NEXT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEQUENCE STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// State of a play sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SequenceState {
    /// Waiting for its next play to come due
    #[default]
    Waiting = 0,
    /// Every play was emitted
    Finished = 1,
    /// Stopped by its token or a cancel command
    Cancelled = 2,
    /// Stopped because an emitter could not be created
    Aborted = 3,
}

impl SequenceState {
    #[inline]
    pub fn is_active(&self) -> bool {
        *self == SequenceState::Waiting
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLAY SEQUENCE
// ═══════════════════════════════════════════════════════════════════════════════

/// One admitted trigger being played out
#[derive(Debug)]
pub struct PlaySequence {
    pub id: SequenceId,
    pub descriptor: Arc<SoundDescriptor>,
    pub context: TriggerContext,
    /// Clock time of admission
    pub started_at: f64,
    /// Clock time the next play comes due
    pub next_play_at: f64,
    /// Plays this sequence will make
    pub total_plays: u32,
    /// Plays emitted so far
    pub plays_done: u32,
    /// Emitters created by this sequence, in order
    pub emitters: Vec<EmitterId>,
    pub state: SequenceState,
}

impl PlaySequence {
    /// Sequence whose first play is due immediately
    pub fn new(
        id: SequenceId,
        descriptor: Arc<SoundDescriptor>,
        context: TriggerContext,
        now: f64,
    ) -> Self {
        let total_plays = descriptor.effective_play_count();
        Self {
            id,
            descriptor,
            context,
            started_at: now,
            next_play_at: now,
            total_plays,
            plays_done: 0,
            emitters: Vec::with_capacity(total_plays as usize),
            state: SequenceState::Waiting,
        }
    }

    #[inline]
    pub fn descriptor_id(&self) -> DescriptorId {
        self.descriptor.id
    }

    #[inline]
    pub fn owner(&self) -> Option<HostObjectId> {
        self.context.owner
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Check if the next play should happen at `now`
    #[inline]
    pub fn is_due(&self, now: f64) -> bool {
        self.is_active() && now >= self.next_play_at
    }

    /// Plays still to come
    #[inline]
    pub fn remaining_plays(&self) -> u32 {
        self.total_plays.saturating_sub(self.plays_done)
    }

    /// Record an emitted play started at `now`
    ///
    /// The next play comes due once this clip's duration has elapsed.
    pub fn record_play(&mut self, emitter: EmitterId, now: f64, clip_duration_secs: f32) {
        self.plays_done += 1;
        self.emitters.push(emitter);

        if self.remaining_plays() == 0 {
            self.state = SequenceState::Finished;
        } else {
            self.next_play_at = now + f64::from(clip_duration_secs.max(0.0));
        }
    }

    /// Stop remaining plays; no effect once the sequence has ended
    pub fn cancel(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = SequenceState::Cancelled;
        true
    }

    /// Stop after a failed emit
    pub fn abort(&mut self) {
        if self.is_active() {
            self.state = SequenceState::Aborted;
        }
    }

    /// Seconds since admission
    #[inline]
    pub fn elapsed_secs(&self, now: f64) -> f64 {
        (now - self.started_at).max(0.0)
    }
}
