use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use super::*;
use crate::config::SchedulerConfig;

/// Listener that records every callback it receives.
struct RecordingListener {
    beats: Mutex<Vec<BeatEvent>>,
    phases: Mutex<Vec<PhaseSample>>,
}

impl RecordingListener {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            beats: Mutex::new(Vec::new()),
            phases: Mutex::new(Vec::new()),
        })
    }
}

impl MetronomeListener for RecordingListener {
    fn on_beat(&self, event: BeatEvent) {
        self.beats.lock().unwrap().push(event);
    }

    fn on_phase(&self, sample: PhaseSample) {
        self.phases.lock().unwrap().push(sample);
    }
}

#[test]
fn test_next_beat_wraps_at_measure_end() {
    assert_eq!(next_beat(0, 4), 1, "fresh run starts at beat 1");
    assert_eq!(next_beat(1, 4), 2);
    assert_eq!(next_beat(3, 4), 4);
    assert_eq!(next_beat(4, 4), 1, "measure end wraps to the accent");
    assert_eq!(next_beat(0, 1), 1);
    assert_eq!(next_beat(1, 1), 1, "1-beat measures accent every tick");
}

#[test]
fn test_default_state_is_stopped() {
    let scheduler = BeatScheduler::new();
    assert!(!scheduler.is_running());
    assert_eq!(scheduler.current_beat(), 0);
    assert_eq!(scheduler.bpm(), 120);
    assert_eq!(scheduler.beats_per_measure(), 4);
}

#[test]
fn test_with_config_clamps_defaults() {
    let config = SchedulerConfig {
        default_bpm: 500,
        default_beats_per_measure: 99,
        animation_interval_ms: 16,
    };
    let scheduler = BeatScheduler::with_config(&config);
    assert_eq!(scheduler.bpm(), tempo::MAX_BPM);
    assert_eq!(scheduler.beats_per_measure(), tempo::MAX_BEATS_PER_MEASURE);
}

#[test]
fn test_set_tempo_clamps_not_rejects() {
    let scheduler = BeatScheduler::new();

    scheduler.set_tempo(10);
    assert_eq!(scheduler.bpm(), tempo::MIN_BPM);

    scheduler.set_tempo(300);
    assert_eq!(scheduler.bpm(), tempo::MAX_BPM);

    scheduler.set_tempo(90);
    assert_eq!(scheduler.bpm(), 90);
}

#[test]
fn test_set_time_signature_clamps() {
    let scheduler = BeatScheduler::new();

    scheduler.set_time_signature(0);
    assert_eq!(scheduler.beats_per_measure(), 1);

    scheduler.set_time_signature(32);
    assert_eq!(scheduler.beats_per_measure(), 16);

    scheduler.set_time_signature(7);
    assert_eq!(scheduler.beats_per_measure(), 7);
}

#[test]
fn test_signature_shrink_resets_beat_counter() {
    let scheduler = BeatScheduler::new();
    scheduler.set_time_signature(8);

    // Mid-measure at beat 6, then the measure shrinks below it.
    scheduler.shared.current_beat.store(6, Ordering::SeqCst);
    scheduler.set_time_signature(4);
    assert_eq!(
        scheduler.shared.current_beat.load(Ordering::SeqCst),
        0,
        "next tick should open a fresh measure at beat 1"
    );
}

#[test]
fn test_signature_grow_keeps_beat_counter() {
    let scheduler = BeatScheduler::new();
    scheduler.shared.current_beat.store(3, Ordering::SeqCst);
    scheduler.set_time_signature(8);
    assert_eq!(scheduler.shared.current_beat.load(Ordering::SeqCst), 3);
}

#[test]
fn test_stop_when_not_running_is_noop() {
    let scheduler = BeatScheduler::new();
    scheduler.stop();
    scheduler.stop();
    assert!(!scheduler.is_running());
}

#[test]
fn test_start_stop_lifecycle_flags() {
    let scheduler = BeatScheduler::new();

    scheduler.start();
    assert!(scheduler.is_running());

    // Idempotent: a second start must not reset or fork the loops.
    scheduler.start();
    assert!(scheduler.is_running());

    scheduler.stop();
    assert!(!scheduler.is_running());
    assert_eq!(scheduler.current_beat(), 0);
}

#[test]
fn test_start_bumps_generation() {
    let scheduler = BeatScheduler::new();
    let before = scheduler.shared.generation.load(Ordering::SeqCst);

    scheduler.start();
    let first = scheduler.shared.generation.load(Ordering::SeqCst);
    assert_eq!(first, before + 1);

    // Restart invalidates loops from the previous run.
    scheduler.stop();
    scheduler.start();
    assert_eq!(scheduler.shared.generation.load(Ordering::SeqCst), first + 1);
    scheduler.stop();
}

#[test]
fn test_destroy_clears_listener() {
    let scheduler = BeatScheduler::new();
    let listener = RecordingListener::new();
    scheduler.set_listener(listener.clone());

    assert!(scheduler.shared.current_listener().is_some());
    scheduler.destroy();
    assert!(!scheduler.is_running());
    assert!(scheduler.shared.current_listener().is_none());
}

#[test]
fn test_emit_is_noop_when_stopped() {
    let scheduler = BeatScheduler::new();
    let listener = RecordingListener::new();
    scheduler.set_listener(listener.clone());

    let generation = scheduler.shared.generation.load(Ordering::SeqCst);
    scheduler.shared.emit_beat(
        generation,
        BeatEvent {
            beat_number: 1,
            is_accent: true,
        },
    );
    scheduler.shared.emit_phase(generation, PhaseSample { phase: 0.0 });

    assert!(listener.beats.lock().unwrap().is_empty());
    assert!(listener.phases.lock().unwrap().is_empty());
}

#[test]
fn test_replacing_listener_detaches_previous() {
    let scheduler = BeatScheduler::new();
    let first = RecordingListener::new();
    let second = RecordingListener::new();

    scheduler.set_listener(first.clone());
    scheduler.set_listener(second.clone());

    let active = scheduler
        .shared
        .current_listener()
        .expect("listener should be set");
    active.on_beat(BeatEvent {
        beat_number: 1,
        is_accent: true,
    });

    assert!(first.beats.lock().unwrap().is_empty());
    assert_eq!(second.beats.lock().unwrap().len(), 1);
}
