//! BeatScheduler: drift-corrected beat and pendulum scheduling.
//!
//! The scheduler owns all timing state and drives two recurring loops on a
//! single cooperative scheduling domain (one dedicated thread running a
//! current-thread Tokio runtime):
//! - the tick loop, which advances the beat counter against an absolute
//!   deadline so that dispatch jitter never compounds into drift, and
//! - the pendulum loop, which recomputes animation phase from wall-clock
//!   modulo arithmetic at a fixed cadence and is therefore stateless.
//!
//! Configuration entry points mutate shared atomics and are safe to call from
//! any thread; listener callbacks run synchronously on the scheduling domain.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::Notify;
use tokio::time;

use crate::api::{BeatEvent, MetronomeListener, PhaseSample};
use crate::config::SchedulerConfig;
use crate::tempo;

/// Advance the beat counter by one, wrapping at the end of the measure.
///
/// A counter of 0 (fresh run, or measure reset after a signature shrink)
/// advances to beat 1.
#[inline]
pub(crate) fn next_beat(current: u32, beats_per_measure: u32) -> u32 {
    current % beats_per_measure.max(1) + 1
}

/// Timing state shared between the public handle and the scheduling loops.
struct SchedulerShared {
    running: AtomicBool,
    /// Run generation; bumped on every `start()` so loops from a previous run
    /// terminate even if the scheduler was restarted before they observed
    /// `running == false`.
    generation: AtomicU64,
    bpm: AtomicU32,
    beats_per_measure: AtomicU32,
    current_beat: AtomicU32,
    animation_interval: time::Duration,
    listener: Mutex<Option<Arc<dyn MetronomeListener>>>,
    shutdown: Notify,
}

impl SchedulerShared {
    /// True while the run identified by `generation` should keep ticking.
    fn active(&self, generation: u64) -> bool {
        self.running.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }

    fn current_listener(&self) -> Option<Arc<dyn MetronomeListener>> {
        match self.listener.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => None,
        }
    }

    fn emit_beat(&self, generation: u64, event: BeatEvent) {
        // Re-check cancellation immediately before emitting: a callback queued
        // before stop() must become a no-op.
        if !self.active(generation) {
            return;
        }
        if let Some(listener) = self.current_listener() {
            listener.on_beat(event);
        }
    }

    fn emit_phase(&self, generation: u64, sample: PhaseSample) {
        if !self.active(generation) {
            return;
        }
        if let Some(listener) = self.current_listener() {
            listener.on_phase(sample);
        }
    }
}

/// Real-time beat scheduler.
///
/// Produces a precisely timed sequence of [`BeatEvent`]s plus a continuous
/// [`PhaseSample`] signal, delivered to a single replaceable
/// [`MetronomeListener`]. All inputs are sanitized by clamping; there are no
/// invalid-input error paths.
pub struct BeatScheduler {
    shared: Arc<SchedulerShared>,
}

impl BeatScheduler {
    /// Create a stopped scheduler with default tempo and signature.
    pub fn new() -> Self {
        Self::with_config(&SchedulerConfig::default())
    }

    /// Create a stopped scheduler configured from `config`.
    ///
    /// Configured values are clamped the same way the setters clamp.
    pub fn with_config(config: &SchedulerConfig) -> Self {
        Self {
            shared: Arc::new(SchedulerShared {
                running: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                bpm: AtomicU32::new(tempo::clamp_bpm(config.default_bpm)),
                beats_per_measure: AtomicU32::new(tempo::clamp_beats(
                    config.default_beats_per_measure,
                )),
                current_beat: AtomicU32::new(0),
                animation_interval: time::Duration::from_millis(config.animation_interval_ms.max(1)),
                listener: Mutex::new(None),
                shutdown: Notify::new(),
            }),
        }
    }

    /// Register the observer that receives beat and phase callbacks.
    ///
    /// Replace-only: setting a new listener (allowed while running) detaches
    /// the previous one from the next callback onward.
    pub fn set_listener(&self, listener: Arc<dyn MetronomeListener>) {
        if let Ok(mut guard) = self.shared.listener.lock() {
            *guard = Some(listener);
        }
    }

    /// Set the tempo, clamped to [[`tempo::MIN_BPM`], [`tempo::MAX_BPM`]].
    ///
    /// Takes effect when the next tick interval is computed; a tick already
    /// due still fires on its old deadline, and `current_beat` is untouched.
    pub fn set_tempo(&self, bpm: u32) {
        let bpm = tempo::clamp_bpm(bpm);
        self.shared.bpm.store(bpm, Ordering::SeqCst);
        tracing::debug!("[BeatScheduler] Tempo set to {} bpm", bpm);
    }

    /// Set beats per measure, clamped to
    /// [[`tempo::MIN_BEATS_PER_MEASURE`], [`tempo::MAX_BEATS_PER_MEASURE`]].
    ///
    /// If the measure shrank below the beat in progress, the counter resets
    /// so the next tick opens a fresh measure at beat 1 instead of emitting an
    /// out-of-range beat number.
    pub fn set_time_signature(&self, beats: u32) {
        let beats = tempo::clamp_beats(beats);
        self.shared.beats_per_measure.store(beats, Ordering::SeqCst);
        if self.shared.current_beat.load(Ordering::SeqCst) > beats {
            self.shared.current_beat.store(0, Ordering::SeqCst);
        }
        tracing::debug!("[BeatScheduler] Time signature set to {} beats", beats);
    }

    /// Current tempo in beats per minute.
    pub fn bpm(&self) -> u32 {
        self.shared.bpm.load(Ordering::SeqCst)
    }

    /// Current beats per measure.
    pub fn beats_per_measure(&self) -> u32 {
        self.shared.beats_per_measure.load(Ordering::SeqCst)
    }

    /// Beat most recently emitted this run (1-indexed), or 0 when stopped.
    pub fn current_beat(&self) -> u32 {
        if self.is_running() {
            self.shared.current_beat.load(Ordering::SeqCst)
        } else {
            0
        }
    }

    /// Whether the scheduling loops are running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Start the scheduling loops. No-op if already running.
    ///
    /// The first beat (1, accented) fires essentially immediately: the
    /// initial tick deadline is the start instant itself.
    pub fn start(&self) {
        if self
            .shared
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        self.shared.current_beat.store(0, Ordering::SeqCst);
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            "[BeatScheduler] Starting: {} bpm, {} beats per measure",
            self.shared.bpm.load(Ordering::SeqCst),
            self.shared.beats_per_measure.load(Ordering::SeqCst)
        );

        let shared = Arc::clone(&self.shared);
        // Dedicated thread with its own current-thread Tokio runtime: both
        // loops interleave cooperatively on one scheduling domain, so no
        // locking is needed around the tick state.
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .expect("Failed to create Tokio runtime for scheduler loops");

            rt.block_on(async move {
                let epoch = Instant::now();
                tokio::join!(
                    run_tick_loop(Arc::clone(&shared), generation, epoch),
                    run_phase_loop(Arc::clone(&shared), generation, epoch),
                );
            });
        });
    }

    /// Stop the scheduling loops. No-op if not running.
    ///
    /// Cancellation is cooperative: the flag flips here and every queued
    /// callback re-checks it before emitting, so no events are delivered once
    /// this returns.
    pub fn stop(&self) {
        if self
            .shared
            .running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        self.shared.current_beat.store(0, Ordering::SeqCst);
        self.shared.shutdown.notify_waiters();
        tracing::info!("[BeatScheduler] Stopped");
    }

    /// Stop and clear the listener. The scheduler is not reusable afterwards;
    /// callers should discard the instance.
    pub fn destroy(&self) {
        self.stop();
        if let Ok(mut guard) = self.shared.listener.lock() {
            *guard = None;
        }
    }
}

impl Default for BeatScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BeatScheduler {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Drift-corrected tick loop.
///
/// Deadlines are absolute: each fire re-anchors `next_deadline` to the actual
/// fire time plus the current interval, so lateness costs at most one
/// scheduling jitter per beat instead of accumulating. An early wake (stale
/// or coalesced timer) sleeps out the remainder without advancing the beat.
async fn run_tick_loop(shared: Arc<SchedulerShared>, generation: u64, epoch: Instant) {
    let mut next_deadline = epoch;
    loop {
        if !shared.active(generation) {
            break;
        }

        let now = Instant::now();
        if now >= next_deadline {
            let beats = shared.beats_per_measure.load(Ordering::SeqCst);
            let beat = next_beat(shared.current_beat.load(Ordering::SeqCst), beats);
            shared.current_beat.store(beat, Ordering::SeqCst);
            shared.emit_beat(
                generation,
                BeatEvent {
                    beat_number: beat,
                    is_accent: beat == 1,
                },
            );
            // Interval reads the tempo at fire time, so a set_tempo() call
            // re-times the very next tick.
            let interval = tempo::beat_interval(shared.bpm.load(Ordering::SeqCst));
            next_deadline = now + interval;
        }

        tokio::select! {
            _ = time::sleep_until(time::Instant::from_std(next_deadline)) => {}
            _ = shared.shutdown.notified() => break,
        }
    }
}

/// Fixed-cadence pendulum loop.
///
/// Phase is recomputed from wall-clock time modulo the swing cycle on every
/// sample and carries no persistent state, so it cannot drift and reflects a
/// tempo change on the next sample. Elapsed time is anchored to the run's
/// start instant, which puts beat boundaries at phase 0 or 0.5 by parity.
async fn run_phase_loop(shared: Arc<SchedulerShared>, generation: u64, epoch: Instant) {
    loop {
        if !shared.active(generation) {
            break;
        }

        let elapsed_ms = epoch.elapsed().as_millis() as u64;
        let phase = tempo::pendulum_phase(elapsed_ms, shared.bpm.load(Ordering::SeqCst));
        shared.emit_phase(generation, PhaseSample { phase });

        tokio::select! {
            _ = time::sleep(shared.animation_interval) => {}
            _ = shared.shutdown.notified() => break,
        }
    }
}

#[cfg(test)]
mod tests;
