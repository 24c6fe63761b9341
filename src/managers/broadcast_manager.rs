// BroadcastChannelManager: Centralized tokio broadcast channel management
// Single Responsibility: Broadcast channel lifecycle and subscription

use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::api::{BeatEvent, MetronomeListener, PhaseSample};

/// Manages the tokio broadcast channels that fan scheduler callbacks out to
/// multiple consumers (CLI output, tests, future UI surfaces).
///
/// # Channel Types
/// - Beats: one message per emitted beat
/// - Phase: pendulum samples at the animation cadence
pub struct BroadcastChannelManager {
    beats: Arc<Mutex<Option<broadcast::Sender<BeatEvent>>>>,
    phase: Arc<Mutex<Option<broadcast::Sender<PhaseSample>>>>,
}

impl BroadcastChannelManager {
    /// Create a new manager with all channels uninitialized.
    ///
    /// Channels must be explicitly initialized via init_* methods before use.
    pub fn new() -> Self {
        Self {
            beats: Arc::new(Mutex::new(None)),
            phase: Arc::new(Mutex::new(None)),
        }
    }

    /// Initialize the beat broadcast channel.
    ///
    /// Buffer size 64: over a minute of beats at the slowest tempo, so lagged
    /// subscribers only drop messages under sustained stalls.
    pub fn init_beats(&self) -> broadcast::Sender<BeatEvent> {
        let (tx, _) = broadcast::channel(64);
        *self.beats.lock().unwrap() = Some(tx.clone());
        tx
    }

    /// Subscribe to beat events, or None if init_beats() was never called.
    pub fn subscribe_beats(&self) -> Option<broadcast::Receiver<BeatEvent>> {
        self.beats.lock().unwrap().as_ref().map(|tx| tx.subscribe())
    }

    /// Initialize the phase broadcast channel.
    ///
    /// Buffer size 256: about four seconds of samples at the 16ms cadence.
    pub fn init_phase(&self) -> broadcast::Sender<PhaseSample> {
        let (tx, _) = broadcast::channel(256);
        *self.phase.lock().unwrap() = Some(tx.clone());
        tx
    }

    /// Subscribe to phase samples, or None if init_phase() was never called.
    pub fn subscribe_phase(&self) -> Option<broadcast::Receiver<PhaseSample>> {
        self.phase.lock().unwrap().as_ref().map(|tx| tx.subscribe())
    }

    /// Build a listener that forwards scheduler callbacks into the channels,
    /// initializing any channel not yet created.
    pub fn channel_listener(&self) -> Arc<ChannelListener> {
        let existing_beats = self.beats.lock().unwrap().as_ref().cloned();
        let beats = match existing_beats {
            Some(tx) => tx,
            None => self.init_beats(),
        };
        let existing_phase = self.phase.lock().unwrap().as_ref().cloned();
        let phase = match existing_phase {
            Some(tx) => tx,
            None => self.init_phase(),
        };
        Arc::new(ChannelListener { beats, phase })
    }
}

impl Default for BroadcastChannelManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener that bridges synchronous scheduler callbacks onto broadcast
/// channels. Send failures (no subscribers) are ignored.
pub struct ChannelListener {
    beats: broadcast::Sender<BeatEvent>,
    phase: broadcast::Sender<PhaseSample>,
}

impl MetronomeListener for ChannelListener {
    fn on_beat(&self, event: BeatEvent) {
        let _ = self.beats.send(event);
    }

    fn on_phase(&self, sample: PhaseSample) {
        let _ = self.phase.send(sample);
    }
}
