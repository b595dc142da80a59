//! Sound Trigger Scheduler
//!
//! Plays one-shot and looping sound effects from declarative descriptors:
//! - Clip pools with randomized volume and pitch
//! - Per-descriptor minimum replay interval (debounce)
//! - Multi-shot sequences that wait for each clip to finish
//! - Automatic release of transient emitters
//! - Lock-free command queue from game code to the frame update
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   TRIGGER SYSTEM ARCHITECTURE                    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │   Game Code                           Frame Update               │
//! │   ┌─────────────────┐                ┌─────────────────┐        │
//! │   │ request_play()  │                │ TriggerProcessor│        │
//! │   │ cancel_owner()  │───Command──────▶│ .process(dt)   │        │
//! │   │ load_bank()     │   Queue        │                 │        │
//! │   └─────────────────┘  (lock-free)   │ admit → resolve │        │
//! │                                      │ → emit → wait   │        │
//! │                                      └────────┬────────┘        │
//! │                                               │ AudioHost       │
//! │   ┌─────────────────────────────────────────┐ ▼                 │
//! │   │ Descriptor: "Footstep"                   │ create_emitter   │
//! │   │ ├── clips: [Step_01, Step_02, Step_03]   │ set_pitch/volume │
//! │   │ ├── volume: [0.8, 1.0] pitch: [0.95,1.05]│ start(_delayed)  │
//! │   │ └── min replay interval: 0.1s            │ destroy_emitter  │
//! │   └─────────────────────────────────────────┘                   │
//! │                                                                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use sfx_trigger::{
//!     ClipRef, RecordingHost, SoundDescriptor, TriggerConfig, TriggerContext,
//!     create_trigger_system,
//! };
//!
//! let (handle, mut processor) =
//!     create_trigger_system(TriggerConfig::seeded(7), RecordingHost::new()).unwrap();
//!
//! let coin = SoundDescriptor::single("Coin", ClipRef::new(1, "Coin_01", 0.5))
//!     .with_play_count(3);
//! let id = handle.register_descriptor(coin).unwrap();
//!
//! handle.request_play(id, TriggerContext::new());
//!
//! // Once per frame
//! processor.process(1.0 / 60.0);
//! assert_eq!(processor.host().created_count(), 1);
//! ```

pub mod bank;
pub mod clip;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod emitter;
pub mod host;
pub mod resolve;
pub mod scheduler;
pub mod sequence;
pub mod state;

// Re-exports
pub use bank::SoundBank;
pub use clip::{ClipId, ClipRef, INVALID_CLIP};
pub use config::TriggerConfig;
pub use context::{CancellationToken, TriggerContext};
pub use descriptor::{DescriptorId, SoundDescriptor, generate_descriptor_id};
pub use emitter::{
    EmitRequest, EmitterHandle, ReleaseTiming, apply_parameters, emit, play_one_shot,
};
pub use host::{AudioHost, EmitterId, HostCall, HostObjectId, RecordedEmitter, RecordingHost};
pub use resolve::{ResolvedPlay, resolve_play};
pub use scheduler::{
    DropReason, TriggerCommand, TriggerHandle, TriggerProcessor, TriggerReport,
    create_trigger_system,
};
pub use sequence::{PlaySequence, SequenceId, SequenceState};
pub use state::{Admission, PlaybackRecord, PlaybackStateStore};
