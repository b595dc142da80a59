//! Trigger Scheduler
//!
//! Drives the playback policy. Handles:
//! - Descriptor registration and lookup
//! - Command queue (game thread → frame update)
//! - Admission against the playback state store
//! - Play sequence lifecycle and cancellation
//!
//! ## Thread Safety Design
//!
//! The trigger system is split into two parts:
//! - `TriggerHandle`: Thread-safe handle for game code (Clone + Sync)
//! - `TriggerProcessor`: Frame-update-only driver that owns the host and
//!   the random source (not Sync)

use parking_lot::{Mutex, RwLock};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rtrb::{Consumer, Producer, RingBuffer};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sfx_core::{SfxError, SfxResult};

use crate::bank::SoundBank;
use crate::config::TriggerConfig;
use crate::context::TriggerContext;
use crate::descriptor::{DescriptorId, SoundDescriptor, reserve_descriptor_id};
use crate::emitter::{EmitRequest, EmitterHandle, emit, emitter_name};
use crate::host::{AudioHost, EmitterId, HostObjectId};
use crate::resolve::{ResolvedPlay, resolve_play};
use crate::sequence::{PlaySequence, SequenceId, SequenceState, generate_sequence_id};
use crate::state::{Admission, PlaybackStateStore};

// ═══════════════════════════════════════════════════════════════════════════════
// COMMAND TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Commands sent from game code to the processor
#[derive(Debug, Clone)]
pub enum TriggerCommand {
    /// Trigger a registered descriptor
    RequestPlay {
        descriptor_id: DescriptorId,
        sequence_id: SequenceId,
        context: TriggerContext,
    },
    /// Trigger a descriptor by name
    RequestPlayByName {
        name: String,
        sequence_id: SequenceId,
        context: TriggerContext,
    },
    /// Stop the remaining plays of one sequence
    CancelSequence { sequence_id: SequenceId },
    /// Stop every sequence triggered from an owner object
    CancelOwner { owner: HostObjectId },
    /// Stop every sequence
    CancelAll,
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPORTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Why a trigger produced no sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropReason {
    UnknownDescriptor,
    EmptyClipPool,
    /// Inside the replay interval
    Debounced { remaining_secs: f64 },
    /// `max_active_sequences` reached
    CapacityReached,
    /// Token was cancelled before admission
    Cancelled,
}

/// Outcome reported by `process()`
///
/// Triggering never returns errors; this is how callers observe it.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerReport {
    /// Trigger admitted; a sequence of `plays` plays begins
    Admitted {
        sequence_id: SequenceId,
        descriptor_id: DescriptorId,
        plays: u32,
    },
    /// One play started
    Emitted {
        sequence_id: SequenceId,
        descriptor_id: DescriptorId,
        play_index: u32,
        emitter: EmitterHandle,
    },
    /// Trigger rejected before any host call
    Dropped {
        sequence_id: SequenceId,
        descriptor_id: Option<DescriptorId>,
        reason: DropReason,
    },
    /// Emitter could not be created; the sequence stops
    EmitFailed {
        sequence_id: SequenceId,
        descriptor_id: DescriptorId,
        play_index: u32,
    },
    SequenceFinished {
        sequence_id: SequenceId,
        descriptor_id: DescriptorId,
        plays: u32,
    },
    SequenceCancelled {
        sequence_id: SequenceId,
        descriptor_id: DescriptorId,
        plays: u32,
    },
}

impl TriggerReport {
    /// Sequence the report belongs to
    pub fn sequence_id(&self) -> SequenceId {
        match self {
            TriggerReport::Admitted { sequence_id, .. }
            | TriggerReport::Emitted { sequence_id, .. }
            | TriggerReport::Dropped { sequence_id, .. }
            | TriggerReport::EmitFailed { sequence_id, .. }
            | TriggerReport::SequenceFinished { sequence_id, .. }
            | TriggerReport::SequenceCancelled { sequence_id, .. } => *sequence_id,
        }
    }

    /// Emitter started by this report, if any
    pub fn emitter(&self) -> Option<&EmitterHandle> {
        match self {
            TriggerReport::Emitted { emitter, .. } => Some(emitter),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED STATE (Thread-safe)
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared state between Handle and Processor (thread-safe)
pub struct TriggerShared {
    /// Descriptor definitions by ID
    descriptors: RwLock<HashMap<DescriptorId, Arc<SoundDescriptor>>>,
    /// Descriptor name → ID lookup
    descriptor_names: RwLock<HashMap<String, DescriptorId>>,
    /// Replay-gate timestamps
    playback_state: PlaybackStateStore,
    /// Command producer (protected by Mutex for thread-safe access)
    command_tx: Mutex<Producer<TriggerCommand>>,
    /// Active sequence count (for game-side queries)
    active_count: AtomicUsize,
}

impl TriggerShared {
    fn descriptor(&self, id: DescriptorId) -> Option<Arc<SoundDescriptor>> {
        self.descriptors.read().get(&id).cloned()
    }

    fn descriptor_id(&self, name: &str) -> Option<DescriptorId> {
        self.descriptor_names.read().get(name).copied()
    }
}

fn check_available(
    descriptors: &HashMap<DescriptorId, Arc<SoundDescriptor>>,
    names: &HashMap<String, DescriptorId>,
    descriptor: &SoundDescriptor,
) -> SfxResult<()> {
    if descriptors.contains_key(&descriptor.id) {
        return Err(SfxError::DuplicateDescriptor(format!(
            "id {} ('{}')",
            descriptor.id, descriptor.name
        )));
    }
    if !descriptor.name.is_empty() && names.contains_key(&descriptor.name) {
        return Err(SfxError::DuplicateDescriptor(descriptor.name.clone()));
    }
    Ok(())
}

fn insert_descriptor(
    descriptors: &mut HashMap<DescriptorId, Arc<SoundDescriptor>>,
    names: &mut HashMap<String, DescriptorId>,
    descriptor: SoundDescriptor,
) -> DescriptorId {
    let id = descriptor.id;
    reserve_descriptor_id(id);
    if !descriptor.name.is_empty() {
        names.insert(descriptor.name.clone(), id);
    }

    log::debug!(
        "Registered descriptor {} '{}' ({} clips)",
        id,
        descriptor.name,
        descriptor.clips.len()
    );
    descriptors.insert(id, Arc::new(descriptor));
    id
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRIGGER HANDLE (Thread-safe, for game code)
// ═══════════════════════════════════════════════════════════════════════════════

/// Thread-safe handle for registering descriptors and triggering sounds
#[derive(Clone)]
pub struct TriggerHandle {
    shared: Arc<TriggerShared>,
}

impl TriggerHandle {
    // ═══════════════════════════════════════════════════════════════════════════
    // DESCRIPTOR REGISTRATION (called from any thread)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Validate and register a descriptor
    ///
    /// Fails on invalid values, a reused ID, or a name already in use.
    pub fn register_descriptor(&self, descriptor: SoundDescriptor) -> SfxResult<DescriptorId> {
        descriptor.validate()?;

        let mut descriptors = self.shared.descriptors.write();
        let mut names = self.shared.descriptor_names.write();
        check_available(&descriptors, &names, &descriptor)?;
        Ok(insert_descriptor(&mut descriptors, &mut names, descriptor))
    }

    /// Remove a descriptor and forget its playback state
    ///
    /// Sequences already running keep their own reference and finish.
    pub fn unregister_descriptor(&self, id: DescriptorId) -> Option<Arc<SoundDescriptor>> {
        let removed = self.shared.descriptors.write().remove(&id)?;
        self.shared.descriptor_names.write().remove(&removed.name);
        self.shared.playback_state.forget(id);
        Some(removed)
    }

    /// Register every descriptor of a bank
    ///
    /// All or nothing: the bank is validated and checked against the
    /// registry under one lock, so a bad entry registers nothing.
    pub fn load_bank(&self, bank: &SoundBank) -> SfxResult<Vec<DescriptorId>> {
        bank.validate()?;

        let mut descriptors = self.shared.descriptors.write();
        let mut names = self.shared.descriptor_names.write();
        for descriptor in &bank.descriptors {
            check_available(&descriptors, &names, descriptor)?;
        }

        let ids: Vec<_> = bank
            .descriptors
            .iter()
            .map(|d| insert_descriptor(&mut descriptors, &mut names, d.clone()))
            .collect();

        log::debug!("Loaded bank '{}' ({} descriptors)", bank.name, ids.len());
        Ok(ids)
    }

    /// Get descriptor by ID
    pub fn descriptor(&self, id: DescriptorId) -> Option<Arc<SoundDescriptor>> {
        self.shared.descriptor(id)
    }

    /// Get descriptor ID by name
    pub fn descriptor_id(&self, name: &str) -> Option<DescriptorId> {
        self.shared.descriptor_id(name)
    }

    /// Get all descriptor IDs
    pub fn descriptor_ids(&self) -> Vec<DescriptorId> {
        self.shared.descriptors.read().keys().copied().collect()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // COMMAND POSTING (called from game thread)
    // ═══════════════════════════════════════════════════════════════════════════

    fn push_command(&self, cmd: TriggerCommand) -> SfxResult<()> {
        let mut tx = self.shared.command_tx.lock();
        tx.push(cmd).map_err(|_| SfxError::QueueFull)
    }

    fn post(&self, cmd: TriggerCommand) {
        if self.push_command(cmd).is_err() {
            log::warn!("Trigger command queue full, command dropped");
        }
    }

    /// Trigger a descriptor; fire-and-forget
    ///
    /// The returned ID identifies the sequence in reports and cancel calls.
    /// A full queue drops the request (logged).
    pub fn request_play(&self, descriptor_id: DescriptorId, context: TriggerContext) -> SequenceId {
        let sequence_id = generate_sequence_id();
        self.post(TriggerCommand::RequestPlay {
            descriptor_id,
            sequence_id,
            context,
        });
        sequence_id
    }

    /// Like [`request_play`](Self::request_play) but reports a full queue
    pub fn try_request_play(
        &self,
        descriptor_id: DescriptorId,
        context: TriggerContext,
    ) -> SfxResult<SequenceId> {
        let sequence_id = generate_sequence_id();
        self.push_command(TriggerCommand::RequestPlay {
            descriptor_id,
            sequence_id,
            context,
        })?;
        Ok(sequence_id)
    }

    /// Trigger a descriptor by name
    pub fn request_play_by_name(&self, name: &str, context: TriggerContext) -> SequenceId {
        let sequence_id = generate_sequence_id();
        self.post(TriggerCommand::RequestPlayByName {
            name: name.to_string(),
            sequence_id,
            context,
        });
        sequence_id
    }

    /// Stop the remaining plays of a sequence
    pub fn cancel_sequence(&self, sequence_id: SequenceId) {
        self.post(TriggerCommand::CancelSequence { sequence_id });
    }

    /// Stop every sequence triggered from `owner` (e.g. it was destroyed)
    pub fn cancel_owner(&self, owner: HostObjectId) {
        self.post(TriggerCommand::CancelOwner { owner });
    }

    /// Stop every sequence
    pub fn cancel_all(&self) {
        self.post(TriggerCommand::CancelAll);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLAYBACK STATE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Forget every replay-gate timestamp
    pub fn reset_playback_state(&self) {
        self.shared.playback_state.clear();
    }

    /// Shared replay-gate store
    pub fn playback_state(&self) -> &PlaybackStateStore {
        &self.shared.playback_state
    }

    /// Get active sequence count (approximate, updated by processor)
    pub fn active_sequence_count(&self) -> usize {
        self.shared.active_count.load(Ordering::Relaxed)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRIGGER PROCESSOR (frame update only - NOT Sync)
// ═══════════════════════════════════════════════════════════════════════════════

/// Frame-driven driver for play sequences
///
/// Owns the consumer end of the command queue, the host and the random
/// source. Call [`process`](Self::process) once per frame.
pub struct TriggerProcessor<H: AudioHost> {
    /// Reference to shared state
    shared: Arc<TriggerShared>,
    /// Command consumer
    command_rx: Consumer<TriggerCommand>,
    host: H,
    rng: ChaCha8Rng,
    config: TriggerConfig,
    /// In-flight sequences
    sequences: Vec<PlaySequence>,
    /// Reports not yet returned
    reports: Vec<TriggerReport>,
    /// Seconds since creation, advanced by `process`
    clock: f64,
}

impl<H: AudioHost> TriggerProcessor<H> {
    /// Process one frame
    ///
    /// Advances the clock by `delta_secs`, applies queued commands, then
    /// makes at most one play per due sequence.
    pub fn process(&mut self, delta_secs: f64) -> Vec<TriggerReport> {
        // 1. Advance clock
        if delta_secs.is_finite() && delta_secs > 0.0 {
            self.clock += delta_secs;
        }

        // 2. Process pending commands
        self.process_commands();

        // 3. Play due sequences
        self.run_due_sequences();

        // 4. Cleanup ended sequences
        self.cleanup_sequences();

        std::mem::take(&mut self.reports)
    }

    fn process_commands(&mut self) {
        while let Ok(cmd) = self.command_rx.pop() {
            match cmd {
                TriggerCommand::RequestPlay {
                    descriptor_id,
                    sequence_id,
                    context,
                } => {
                    self.start_sequence(Some(descriptor_id), sequence_id, context);
                }
                TriggerCommand::RequestPlayByName {
                    name,
                    sequence_id,
                    context,
                } => {
                    let descriptor_id = self.shared.descriptor_id(&name);
                    if descriptor_id.is_none() {
                        log::warn!("Trigger for unknown descriptor '{}'", name);
                    }
                    self.start_sequence(descriptor_id, sequence_id, context);
                }
                TriggerCommand::CancelSequence { sequence_id } => {
                    self.cancel_where(|s| s.id == sequence_id);
                }
                TriggerCommand::CancelOwner { owner } => {
                    self.cancel_where(|s| s.owner() == Some(owner));
                }
                TriggerCommand::CancelAll => {
                    self.cancel_where(|_| true);
                }
            }
        }
    }

    /// Pool check, capacity, then admission. Returns the new sequence index.
    fn start_sequence(
        &mut self,
        descriptor_id: Option<DescriptorId>,
        sequence_id: SequenceId,
        context: TriggerContext,
    ) -> Option<usize> {
        let Some(descriptor) = descriptor_id.and_then(|id| self.shared.descriptor(id)) else {
            if let Some(id) = descriptor_id {
                log::warn!("Trigger for unknown descriptor {}", id);
            }
            self.drop_request(sequence_id, descriptor_id, DropReason::UnknownDescriptor);
            return None;
        };
        let id = descriptor.id;

        if descriptor.is_empty() {
            log::debug!("'{}' has no clips, trigger ignored", descriptor.name);
            self.drop_request(sequence_id, Some(id), DropReason::EmptyClipPool);
            return None;
        }

        if context.is_cancelled() {
            self.drop_request(sequence_id, Some(id), DropReason::Cancelled);
            return None;
        }

        let active = self.sequences.iter().filter(|s| s.is_active()).count();
        if active >= self.config.max_active_sequences {
            log::warn!(
                "Sequence limit ({}) reached, '{}' dropped",
                self.config.max_active_sequences,
                descriptor.name
            );
            self.drop_request(sequence_id, Some(id), DropReason::CapacityReached);
            return None;
        }

        let admission = self.shared.playback_state.try_admit(
            id,
            descriptor.min_replay_interval_secs,
            self.clock,
        );
        if let Admission::Rejected { remaining_secs } = admission {
            log::trace!(
                "'{}' debounced ({:.3}s until replay)",
                descriptor.name,
                remaining_secs
            );
            self.drop_request(
                sequence_id,
                Some(id),
                DropReason::Debounced { remaining_secs },
            );
            return None;
        }

        let sequence = PlaySequence::new(sequence_id, descriptor, context, self.clock);
        log::debug!(
            "Admitted '{}' as sequence {} ({} plays)",
            sequence.descriptor.name,
            sequence_id,
            sequence.total_plays
        );
        self.reports.push(TriggerReport::Admitted {
            sequence_id,
            descriptor_id: id,
            plays: sequence.total_plays,
        });
        self.sequences.push(sequence);
        Some(self.sequences.len() - 1)
    }

    fn drop_request(
        &mut self,
        sequence_id: SequenceId,
        descriptor_id: Option<DescriptorId>,
        reason: DropReason,
    ) {
        self.reports.push(TriggerReport::Dropped {
            sequence_id,
            descriptor_id,
            reason,
        });
    }

    fn run_due_sequences(&mut self) {
        for index in 0..self.sequences.len() {
            if self.sequences[index].is_due(self.clock) {
                self.advance_sequence(index);
            }
        }
    }

    /// Make the next play of one sequence
    fn advance_sequence(&mut self, index: usize) {
        let now = self.clock;
        let Some(seq) = self.sequences.get_mut(index) else {
            return;
        };

        if seq.context.is_cancelled() {
            if seq.cancel() {
                log::debug!("Sequence {} cancelled by its token", seq.id);
                self.reports.push(TriggerReport::SequenceCancelled {
                    sequence_id: seq.id,
                    descriptor_id: seq.descriptor_id(),
                    plays: seq.plays_done,
                });
            }
            return;
        }

        let play_index = seq.plays_done;
        let emitted = resolve_play(&seq.descriptor, &mut self.rng)
            .map(|play| build_request(&self.config, &seq.descriptor, play, &seq.context))
            .and_then(|request| emit(&mut self.host, &request));

        let Some(emitter) = emitted else {
            seq.abort();
            log::warn!(
                "Sequence {} ('{}') stopped: no emitter for play {}",
                seq.id,
                seq.descriptor.name,
                play_index + 1
            );
            self.reports.push(TriggerReport::EmitFailed {
                sequence_id: seq.id,
                descriptor_id: seq.descriptor_id(),
                play_index,
            });
            return;
        };

        seq.record_play(emitter.id, now, emitter.clip.duration_secs);
        self.reports.push(TriggerReport::Emitted {
            sequence_id: seq.id,
            descriptor_id: seq.descriptor_id(),
            play_index,
            emitter,
        });

        if seq.state == SequenceState::Finished {
            log::debug!(
                "Sequence {} ('{}') finished after {:.3}s",
                seq.id,
                seq.descriptor.name,
                seq.elapsed_secs(now)
            );
            self.reports.push(TriggerReport::SequenceFinished {
                sequence_id: seq.id,
                descriptor_id: seq.descriptor_id(),
                plays: seq.plays_done,
            });
        }
    }

    fn cancel_where(&mut self, predicate: impl Fn(&PlaySequence) -> bool) -> usize {
        let mut cancelled = 0;
        for seq in self.sequences.iter_mut().filter(|s| predicate(&**s)) {
            if seq.cancel() {
                log::debug!("Sequence {} ('{}') cancelled", seq.id, seq.descriptor.name);
                self.reports.push(TriggerReport::SequenceCancelled {
                    sequence_id: seq.id,
                    descriptor_id: seq.descriptor_id(),
                    plays: seq.plays_done,
                });
                cancelled += 1;
            }
        }
        cancelled
    }

    fn cleanup_sequences(&mut self) {
        self.sequences.retain(|s| s.is_active());
        self.shared
            .active_count
            .store(self.sequences.len(), Ordering::Relaxed);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DIRECT API (frame update thread)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Trigger a descriptor right now, bypassing the queue
    ///
    /// The first play happens before this returns. `None` when the trigger
    /// was dropped; see [`take_reports`](Self::take_reports) for why.
    pub fn request_play(
        &mut self,
        descriptor_id: DescriptorId,
        context: TriggerContext,
    ) -> Option<SequenceId> {
        let sequence_id = generate_sequence_id();
        let index = self.start_sequence(Some(descriptor_id), sequence_id, context)?;
        self.advance_sequence(index);
        Some(sequence_id)
    }

    /// Trigger by name, bypassing the queue
    pub fn request_play_by_name(
        &mut self,
        name: &str,
        context: TriggerContext,
    ) -> Option<SequenceId> {
        match self.shared.descriptor_id(name) {
            Some(id) => self.request_play(id, context),
            None => {
                log::warn!("Trigger for unknown descriptor '{}'", name);
                self.drop_request(generate_sequence_id(), None, DropReason::UnknownDescriptor);
                None
            }
        }
    }

    /// Stop the remaining plays of one sequence
    pub fn cancel_sequence(&mut self, sequence_id: SequenceId) -> bool {
        self.cancel_where(|s| s.id == sequence_id) > 0
    }

    /// Stop every sequence of an owner; returns how many were stopped
    pub fn cancel_owner(&mut self, owner: HostObjectId) -> usize {
        self.cancel_where(|s| s.owner() == Some(owner))
    }

    /// Stop every sequence; returns how many were stopped
    pub fn cancel_all(&mut self) -> usize {
        self.cancel_where(|_| true)
    }

    /// Play a registered descriptor once
    ///
    /// No admission, no sequencing, nothing recorded.
    pub fn play_one_shot(
        &mut self,
        descriptor_id: DescriptorId,
        context: &TriggerContext,
    ) -> Option<EmitterHandle> {
        let descriptor = self.shared.descriptor(descriptor_id)?;
        let play = resolve_play(&descriptor, &mut self.rng)?;
        let request = build_request(&self.config, &descriptor, play, context);
        emit(&mut self.host, &request)
    }

    /// Destroy a caller-managed (looping) emitter now
    pub fn release_emitter(&mut self, emitter: EmitterId) {
        log::debug!("Releasing emitter {}", emitter);
        self.host.destroy_emitter(emitter, 0.0);
    }

    /// Cancel everything and clear the playback state
    pub fn shutdown(&mut self) {
        self.cancel_all();
        self.cleanup_sequences();
        self.shared.playback_state.clear();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERY METHODS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Reports produced outside `process` (direct API calls)
    pub fn take_reports(&mut self) -> Vec<TriggerReport> {
        std::mem::take(&mut self.reports)
    }

    /// Current clock time in seconds
    pub fn now(&self) -> f64 {
        self.clock
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn playback_state(&self) -> &PlaybackStateStore {
        &self.shared.playback_state
    }

    /// In-flight sequences
    pub fn active_sequences(&self) -> &[PlaySequence] {
        &self.sequences
    }

    pub fn active_sequence_count(&self) -> usize {
        self.sequences.iter().filter(|s| s.is_active()).count()
    }

    /// Check if a sequence still has plays to make
    pub fn is_sequence_active(&self, sequence_id: SequenceId) -> bool {
        self.sequences
            .iter()
            .any(|s| s.id == sequence_id && s.is_active())
    }
}

/// Emit request for one play of a descriptor under the processor's config
fn build_request(
    config: &TriggerConfig,
    descriptor: &SoundDescriptor,
    play: ResolvedPlay,
    context: &TriggerContext,
) -> EmitRequest {
    let mut request = EmitRequest::from_descriptor(descriptor, play)
        .with_context(context)
        .with_release_timing(config.release_timing);
    request.name = Some(emitter_name(&config.emitter_name_prefix));
    request
}

// ═══════════════════════════════════════════════════════════════════════════════
// FACTORY FUNCTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Create a trigger system (handle + processor pair)
///
/// The handle can be cloned and shared across threads. The processor stays
/// on the thread that runs the frame update.
pub fn create_trigger_system<H: AudioHost>(
    config: TriggerConfig,
    host: H,
) -> SfxResult<(TriggerHandle, TriggerProcessor<H>)> {
    config.validate()?;

    let (command_tx, command_rx) = RingBuffer::new(config.command_queue_capacity);

    let shared = Arc::new(TriggerShared {
        descriptors: RwLock::new(HashMap::new()),
        descriptor_names: RwLock::new(HashMap::new()),
        playback_state: PlaybackStateStore::new(),
        command_tx: Mutex::new(command_tx),
        active_count: AtomicUsize::new(0),
    });

    let handle = TriggerHandle {
        shared: Arc::clone(&shared),
    };

    let rng = match config.rng_seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };

    let processor = TriggerProcessor {
        shared,
        command_rx,
        host,
        rng,
        sequences: Vec::with_capacity(config.max_active_sequences.min(64)),
        reports: Vec::new(),
        clock: 0.0,
        config,
    };

    Ok((handle, processor))
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
