//! End-to-end trigger scenarios against the recording host

use approx::assert_relative_eq;
use sfx_core::{SfxError, ValueRange};
use sfx_trigger::{
    CancellationToken, ClipRef, DropReason, HostCall, RecordingHost, ReleaseTiming, SoundBank,
    SoundDescriptor, TriggerConfig, TriggerContext, TriggerHandle, TriggerProcessor,
    TriggerReport, create_trigger_system,
};

const FRAME: f64 = 1.0 / 60.0;

fn system() -> (TriggerHandle, TriggerProcessor<RecordingHost>) {
    create_trigger_system(TriggerConfig::seeded(42), RecordingHost::new()).unwrap()
}

/// Run frames until `secs` have passed, collecting (time, report) pairs
fn run_for(
    processor: &mut TriggerProcessor<RecordingHost>,
    secs: f64,
) -> Vec<(f64, TriggerReport)> {
    let mut out = Vec::new();
    let frames = (secs / FRAME).ceil() as usize;
    for _ in 0..frames {
        let reports = processor.process(FRAME);
        let now = processor.now();
        out.extend(reports.into_iter().map(|r| (now, r)));
    }
    out
}

fn emit_times(reports: &[(f64, TriggerReport)]) -> Vec<f64> {
    reports
        .iter()
        .filter(|(_, r)| r.emitter().is_some())
        .map(|(t, _)| *t)
        .collect()
}

#[test]
fn test_three_plays_two_seconds_apart() {
    let (handle, mut processor) = system();
    let id = handle
        .register_descriptor(
            SoundDescriptor::single("A", ClipRef::new(1, "A", 2.0))
                .with_volume(ValueRange::fixed(1.0))
                .with_pitch(ValueRange::fixed(1.0))
                .with_play_count(3),
        )
        .unwrap();

    handle.request_play(id, TriggerContext::new());
    let reports = run_for(&mut processor, 8.0);

    let times = emit_times(&reports);
    assert_eq!(times.len(), 3);
    for pair in times.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= 2.0 - 1e-9, "play started early: {gap}");
        assert!(gap <= 2.0 + FRAME + 1e-9, "play started late: {gap}");
    }

    // Last clip ends roughly six seconds after the first play
    let host = processor.host();
    let last = *host.created_emitters().last().unwrap();
    let tail = host.emitter(last).unwrap().destroy_after.unwrap();
    let total = times[2] - times[0] + f64::from(tail);
    assert_relative_eq!(total, 6.0, epsilon = 3.0 * FRAME);

    for id in host.created_emitters() {
        let e = host.emitter(id).unwrap();
        assert_eq!(e.clip.id, 1);
        assert_eq!(e.volume, 1.0);
        assert_eq!(e.pitch, 1.0);
        assert_eq!(e.started, Some(0.0));
    }

    assert_eq!(
        reports
            .iter()
            .filter(|(_, r)| matches!(r, TriggerReport::SequenceFinished { plays: 3, .. }))
            .count(),
        1
    );
    assert_eq!(handle.active_sequence_count(), 0);
}

#[test]
fn test_empty_pool_is_complete_no_op() {
    let (handle, mut processor) = system();
    let id = handle
        .register_descriptor(
            SoundDescriptor::new("Nothing", vec![])
                .with_play_count(4)
                .with_min_replay_interval(1.0)
                .with_delay(0.5),
        )
        .unwrap();

    let seq = handle.request_play(id, TriggerContext::new());
    let reports = run_for(&mut processor, 1.0);

    assert!(processor.host().calls().is_empty());
    assert!(handle.playback_state().is_empty());
    assert_eq!(
        reports.iter().map(|(_, r)| r.clone()).collect::<Vec<_>>(),
        vec![TriggerReport::Dropped {
            sequence_id: seq,
            descriptor_id: Some(id),
            reason: DropReason::EmptyClipPool,
        }]
    );
}

#[test]
fn test_requests_inside_interval_play_once() {
    let (handle, mut processor) = system();
    let id = handle
        .register_descriptor(
            SoundDescriptor::single("Hit", ClipRef::new(1, "Hit", 0.3))
                .with_min_replay_interval(1.0),
        )
        .unwrap();

    handle.request_play(id, TriggerContext::new());
    processor.process(0.1);
    handle.request_play(id, TriggerContext::new());
    let reports = processor.process(0.1);

    assert_eq!(processor.host().created_count(), 1);
    assert!(reports.iter().any(|r| matches!(
        r,
        TriggerReport::Dropped {
            reason: DropReason::Debounced { .. },
            ..
        }
    )));
}

#[test]
fn test_requests_at_interval_both_play() {
    let (handle, mut processor) = system();
    let id = handle
        .register_descriptor(
            SoundDescriptor::single("Hit", ClipRef::new(1, "Hit", 0.3))
                .with_min_replay_interval(0.5),
        )
        .unwrap();

    processor.request_play(id, TriggerContext::new()).unwrap();
    processor.process(0.5);
    processor.request_play(id, TriggerContext::new()).unwrap();

    assert_eq!(processor.host().created_count(), 2);
    assert_eq!(handle.playback_state().last_admitted_at(id), Some(0.5));
}

#[test]
fn test_tenth_of_a_second_interval_boundary() {
    let (handle, mut processor) = system();
    let id = handle
        .register_descriptor(
            SoundDescriptor::single("Tick", ClipRef::new(1, "Tick", 0.05))
                .with_min_replay_interval(0.1),
        )
        .unwrap();

    processor.request_play(id, TriggerContext::new()).unwrap();
    let reports = processor.process(0.1);
    assert!(processor.request_play(id, TriggerContext::new()).is_some());
    assert!(!reports.iter().any(|r| matches!(r, TriggerReport::Dropped { .. })));

    // Same boundary reached one frame at a time
    let id = handle
        .register_descriptor(
            SoundDescriptor::single("Step", ClipRef::new(2, "Step", 0.05))
                .with_min_replay_interval(0.25),
        )
        .unwrap();
    processor.request_play(id, TriggerContext::new()).unwrap();
    for _ in 0..15 {
        processor.process(FRAME);
    }
    assert!(processor.request_play(id, TriggerContext::new()).is_some());
    assert_eq!(processor.host().created_count(), 4);
}

#[test]
fn test_loop_plays_once_without_release() {
    let (handle, mut processor) = system();
    let id = handle
        .register_descriptor(
            SoundDescriptor::single("Engine", ClipRef::new(3, "Engine", 1.5))
                .with_loop(true)
                .with_play_count(5),
        )
        .unwrap();

    handle.request_play(id, TriggerContext::new());
    run_for(&mut processor, 10.0);

    let host = processor.host();
    assert_eq!(host.created_count(), 1);
    assert!(!host.calls().iter().any(|c| matches!(c, HostCall::Destroy { .. })));

    let emitter = host.created_emitters()[0];
    assert!(host.emitter(emitter).unwrap().looping);

    processor.release_emitter(emitter);
    assert_eq!(processor.host().emitter(emitter).unwrap().destroy_after, Some(0.0));
}

#[test]
fn test_each_play_waits_for_previous_clip() {
    let (handle, mut processor) = system();
    let clips = vec![
        ClipRef::new(1, "Short", 0.25),
        ClipRef::new(2, "Medium", 0.8),
        ClipRef::new(3, "Long", 1.4),
    ];
    let id = handle
        .register_descriptor(SoundDescriptor::new("Mixed", clips).with_play_count(6))
        .unwrap();

    handle.request_play(id, TriggerContext::new());
    let reports = run_for(&mut processor, 12.0);

    let plays: Vec<(f64, f32)> = reports
        .iter()
        .filter_map(|(t, r)| r.emitter().map(|e| (*t, e.clip.duration_secs)))
        .collect();
    assert_eq!(plays.len(), 6);

    for pair in plays.windows(2) {
        let (start, duration) = pair[0];
        let (next, _) = pair[1];
        assert!(next - start >= f64::from(duration) - 1e-9);
        assert!(next - start <= f64::from(duration) + FRAME + 1e-9);
    }
}

#[test]
fn test_token_cancels_remaining_plays() {
    let (handle, mut processor) = system();
    let id = handle
        .register_descriptor(
            SoundDescriptor::single("Alarm", ClipRef::new(1, "Alarm", 1.0)).with_play_count(5),
        )
        .unwrap();

    let token = CancellationToken::new();
    let seq = handle.request_play(id, TriggerContext::new().with_token(token.clone()));
    run_for(&mut processor, 1.5);
    assert_eq!(processor.host().created_count(), 2);

    token.cancel();
    let reports = run_for(&mut processor, 5.0);

    assert_eq!(processor.host().created_count(), 2);
    assert!(reports.iter().any(|(_, r)| *r
        == TriggerReport::SequenceCancelled {
            sequence_id: seq,
            descriptor_id: id,
            plays: 2,
        }));

    // Started emitters keep their scheduled release
    let host = processor.host();
    for emitter in host.created_emitters() {
        assert_eq!(host.emitter(emitter).unwrap().destroy_after, Some(1.0));
    }
}

#[test]
fn test_cancelled_token_before_admission() {
    let (handle, mut processor) = system();
    let id = handle
        .register_descriptor(
            SoundDescriptor::single("Gate", ClipRef::new(1, "Gate", 1.0))
                .with_min_replay_interval(2.0),
        )
        .unwrap();

    let token = CancellationToken::new();
    token.cancel();
    assert!(
        processor
            .request_play(id, TriggerContext::new().with_token(token))
            .is_none()
    );
    assert!(processor.host().calls().is_empty());
    // Nothing recorded, so the next trigger is admitted
    assert!(processor.request_play(id, TriggerContext::new()).is_some());
}

#[test]
fn test_cancel_sequence_and_all() {
    let (handle, mut processor) = system();
    let id = handle
        .register_descriptor(
            SoundDescriptor::single("Drum", ClipRef::new(1, "Drum", 0.5)).with_play_count(10),
        )
        .unwrap();

    let first = handle.request_play(id, TriggerContext::new());
    handle.request_play(id, TriggerContext::new());
    handle.request_play(id, TriggerContext::new());
    processor.process(FRAME);
    assert_eq!(processor.active_sequence_count(), 3);

    handle.cancel_sequence(first);
    processor.process(FRAME);
    assert!(!processor.is_sequence_active(first));
    assert_eq!(processor.active_sequence_count(), 2);

    handle.cancel_all();
    processor.process(FRAME);
    assert_eq!(processor.active_sequence_count(), 0);
    assert_eq!(processor.host().created_count(), 3);
}

#[test]
fn test_host_refusal_aborts_sequence() {
    let (handle, mut processor) = system();
    let id = handle
        .register_descriptor(
            SoundDescriptor::single("Rain", ClipRef::new(1, "Rain", 0.5)).with_play_count(4),
        )
        .unwrap();

    let seq = processor.request_play(id, TriggerContext::new()).unwrap();
    processor.host_mut().set_refuse_creation(true);

    let reports = run_for(&mut processor, 3.0);
    assert!(reports.iter().any(|(_, r)| *r
        == TriggerReport::EmitFailed {
            sequence_id: seq,
            descriptor_id: id,
            play_index: 1,
        }));

    processor.host_mut().set_refuse_creation(false);
    run_for(&mut processor, 3.0);
    assert_eq!(processor.host().created_count(), 1);
    assert!(!processor.is_sequence_active(seq));
}

#[test]
fn test_invalid_clip_makes_no_host_calls() {
    let (handle, mut processor) = system();
    let id = handle
        .register_descriptor(SoundDescriptor::single("Unassigned", ClipRef::missing()))
        .unwrap();

    handle.request_play(id, TriggerContext::new());
    let reports = processor.process(FRAME);

    assert!(processor.host().calls().is_empty());
    assert!(
        reports
            .iter()
            .any(|r| matches!(r, TriggerReport::EmitFailed { play_index: 0, .. }))
    );
}

#[test]
fn test_delayed_start_release_timing() {
    let desc = || {
        SoundDescriptor::single("Thunder", ClipRef::new(1, "Thunder", 2.0)).with_delay(0.75)
    };

    let (handle, mut processor) = system();
    let id = handle.register_descriptor(desc()).unwrap();
    processor.request_play(id, TriggerContext::new()).unwrap();

    let emitter = processor.host().created_emitters()[0];
    let state = processor.host().emitter(emitter).unwrap();
    assert_eq!(state.started, Some(0.75));
    assert_eq!(state.destroy_after, Some(2.75));

    let config = TriggerConfig::seeded(1).with_release_timing(ReleaseTiming::FromTrigger);
    let (handle, mut processor) = create_trigger_system(config, RecordingHost::new()).unwrap();
    let id = handle.register_descriptor(desc()).unwrap();
    processor.request_play(id, TriggerContext::new()).unwrap();

    let emitter = processor.host().created_emitters()[0];
    assert_eq!(processor.host().emitter(emitter).unwrap().destroy_after, Some(2.0));
}

#[test]
fn test_bank_loading_and_play_by_name() {
    let bank = SoundBank::from_json(
        r#"{
            "name": "Level1",
            "descriptors": [
                { "name": "Door", "clips": [{ "id": 5, "duration_secs": 0.6 }] },
                { "name": "Chime", "clips": [{ "id": 6, "duration_secs": 0.2 }], "play_count": 2 }
            ]
        }"#,
    )
    .unwrap();

    let (handle, mut processor) = system();
    let ids = handle.load_bank(&bank).unwrap();
    assert_eq!(ids.len(), 2);
    assert!(matches!(
        handle.load_bank(&bank),
        Err(SfxError::DuplicateDescriptor(_))
    ));

    handle.request_play_by_name("Chime", TriggerContext::new());
    run_for(&mut processor, 1.0);
    assert_eq!(processor.host().created_count(), 2);
}

#[test]
fn test_failed_bank_load_registers_nothing() {
    let (handle, _processor) = system();

    let shared_id = SoundBank::from_json(
        r#"{
            "name": "Clash",
            "descriptors": [
                { "id": 900001, "name": "A" },
                { "id": 900001, "name": "B" }
            ]
        }"#,
    )
    .unwrap();
    assert!(matches!(
        handle.load_bank(&shared_id),
        Err(SfxError::DuplicateDescriptor(_))
    ));
    assert!(handle.descriptor_ids().is_empty());

    // Second entry collides with a descriptor already registered
    let existing = handle
        .register_descriptor(SoundDescriptor::new("Existing", vec![]))
        .unwrap();
    let bank = SoundBank::new("Partial")
        .with_descriptor(SoundDescriptor::new("Fresh", vec![]))
        .with_descriptor(SoundDescriptor::new("Other", vec![]).with_id(existing));
    assert!(handle.load_bank(&bank).is_err());
    assert_eq!(handle.descriptor_ids(), vec![existing]);
    assert_eq!(handle.descriptor_id("Fresh"), None);

    // Unnamed entries register like unnamed descriptors do
    let anon = SoundBank::new("Anon")
        .with_descriptor(SoundDescriptor::new("", vec![]))
        .with_descriptor(SoundDescriptor::new("", vec![]));
    assert_eq!(handle.load_bank(&anon).unwrap().len(), 2);
    assert_eq!(handle.descriptor_ids().len(), 3);
}

#[test]
fn test_queue_full() {
    let config = TriggerConfig::seeded(1).with_command_queue_capacity(2);
    let (handle, mut processor) = create_trigger_system(config, RecordingHost::new()).unwrap();
    let id = handle
        .register_descriptor(SoundDescriptor::single("Pop", ClipRef::new(1, "Pop", 0.1)))
        .unwrap();

    assert!(handle.try_request_play(id, TriggerContext::new()).is_ok());
    assert!(handle.try_request_play(id, TriggerContext::new()).is_ok());
    assert!(matches!(
        handle.try_request_play(id, TriggerContext::new()),
        Err(SfxError::QueueFull)
    ));

    processor.process(FRAME);
    assert_eq!(processor.host().created_count(), 2);
    assert!(handle.try_request_play(id, TriggerContext::new()).is_ok());
}

#[test]
fn test_concurrent_handles_respect_gate() {
    let (handle, mut processor) = system();
    let id = handle
        .register_descriptor(
            SoundDescriptor::single("Shot", ClipRef::new(1, "Shot", 0.2))
                .with_min_replay_interval(5.0),
        )
        .unwrap();

    let threads: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            std::thread::spawn(move || {
                for _ in 0..10 {
                    handle.request_play(id, TriggerContext::new());
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    let reports = processor.process(FRAME);
    assert_eq!(processor.host().created_count(), 1);
    assert_eq!(
        reports
            .iter()
            .filter(|r| matches!(
                r,
                TriggerReport::Dropped {
                    reason: DropReason::Debounced { .. },
                    ..
                }
            ))
            .count(),
        39
    );
}
