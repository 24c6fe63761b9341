//! Tempo math - pure beat timing helpers
//!
//! Everything in this module is a pure function over integer BPM values:
//! clamping, beat interval computation, pendulum phase, and the mapping from
//! BPM to a named tempo marking. Zero allocations, safe to call from the
//! scheduling loops every tick.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Minimum supported tempo in beats per minute.
pub const MIN_BPM: u32 = 40;

/// Maximum supported tempo in beats per minute.
pub const MAX_BPM: u32 = 208;

/// Minimum beats per measure.
pub const MIN_BEATS_PER_MEASURE: u32 = 1;

/// Maximum beats per measure.
pub const MAX_BEATS_PER_MEASURE: u32 = 16;

/// Clamp a BPM value into the supported [`MIN_BPM`, `MAX_BPM`] range.
///
/// Out-of-range tempos are sanitized here rather than rejected; there is no
/// invalid-tempo error path anywhere in the engine.
#[inline]
pub fn clamp_bpm(bpm: u32) -> u32 {
    bpm.clamp(MIN_BPM, MAX_BPM)
}

/// Clamp a beats-per-measure value into [`MIN_BEATS_PER_MEASURE`,
/// `MAX_BEATS_PER_MEASURE`].
#[inline]
pub fn clamp_beats(beats: u32) -> u32 {
    beats.clamp(MIN_BEATS_PER_MEASURE, MAX_BEATS_PER_MEASURE)
}

/// Interval between consecutive beats at the given tempo.
///
/// Computed as `60000 / bpm` integer milliseconds, truncated, matching the
/// tick loop's deadline arithmetic exactly.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use metronome_engine::tempo::beat_interval;
///
/// assert_eq!(beat_interval(120), Duration::from_millis(500));
/// assert_eq!(beat_interval(90), Duration::from_millis(666));
/// ```
#[inline]
pub fn beat_interval(bpm: u32) -> Duration {
    Duration::from_millis(60_000 / u64::from(bpm.max(1)))
}

/// Length of one full pendulum swing cycle: two beats.
#[inline]
pub fn swing_cycle(bpm: u32) -> Duration {
    2 * beat_interval(bpm)
}

/// Pendulum phase for a given elapsed time since the run started.
///
/// Derived purely from wall-clock modulo arithmetic, so repeated calls carry
/// no state and cannot accumulate drift. The result is in `[0, 1)`: 0 at one
/// end of the swing, 0.5 at the other.
///
/// # Examples
/// ```
/// use metronome_engine::tempo::pendulum_phase;
///
/// // At 120 BPM the swing cycle is 1000ms.
/// assert_eq!(pendulum_phase(0, 120), 0.0);
/// assert_eq!(pendulum_phase(500, 120), 0.5);
/// assert_eq!(pendulum_phase(1250, 120), 0.25);
/// ```
#[inline]
pub fn pendulum_phase(elapsed_ms: u64, bpm: u32) -> f32 {
    let cycle_ms = swing_cycle(bpm).as_millis() as u64;
    (elapsed_ms % cycle_ms) as f32 / cycle_ms as f32
}

/// Classical tempo markings, coarsest to fastest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempoTerm {
    Grave,
    Largo,
    Lento,
    Adagio,
    Andante,
    Moderato,
    Allegretto,
    Allegro,
    Vivace,
    Presto,
}

impl TempoTerm {
    /// Map a BPM value to its tempo marking.
    ///
    /// Total over all `u32` inputs; the breakpoints are inclusive and follow
    /// the conventional metronome ranges (44 is still Grave, 45 is Largo).
    pub fn from_bpm(bpm: u32) -> Self {
        match bpm {
            0..=44 => TempoTerm::Grave,
            45..=54 => TempoTerm::Largo,
            55..=64 => TempoTerm::Lento,
            65..=76 => TempoTerm::Adagio,
            77..=108 => TempoTerm::Andante,
            109..=120 => TempoTerm::Moderato,
            121..=140 => TempoTerm::Allegretto,
            141..=168 => TempoTerm::Allegro,
            169..=200 => TempoTerm::Vivace,
            _ => TempoTerm::Presto,
        }
    }

    /// The marking spelled out, as shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            TempoTerm::Grave => "Grave",
            TempoTerm::Largo => "Largo",
            TempoTerm::Lento => "Lento",
            TempoTerm::Adagio => "Adagio",
            TempoTerm::Andante => "Andante",
            TempoTerm::Moderato => "Moderato",
            TempoTerm::Allegretto => "Allegretto",
            TempoTerm::Allegro => "Allegro",
            TempoTerm::Vivace => "Vivace",
            TempoTerm::Presto => "Presto",
        }
    }
}

impl std::fmt::Display for TempoTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
