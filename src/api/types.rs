use serde::{Deserialize, Serialize};

/// One emitted metronome beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatEvent {
    /// 1-indexed position within the current measure.
    pub beat_number: u32,
    /// True exactly for the first beat of each measure.
    pub is_accent: bool,
}

/// One pendulum animation sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseSample {
    /// Position within a two-beat swing cycle, in `[0, 1)`.
    pub phase: f32,
}

/// Observer contract consumed by the UI/audio layer.
///
/// Exactly one listener is registered at a time; replacing it is allowed at
/// any point, including mid-run, and only the most recently set listener
/// receives callbacks. Both methods are invoked synchronously from the
/// scheduling domain, so implementations that do blocking work must hand off
/// to their own thread to avoid stalling subsequent ticks.
pub trait MetronomeListener: Send + Sync {
    /// Called once per beat with its number and accent status.
    fn on_beat(&self, event: BeatEvent);

    /// Called at the animation cadence (~60 Hz) while running.
    fn on_phase(&self, sample: PhaseSample);
}
