// Metronome Engine Core - drift-corrected beat scheduling
// Emits beat events and pendulum phase samples to a registered listener;
// UI rendering, audio playback, and wake locks belong to the caller.

// Module declarations
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod managers;
pub mod preset;
pub mod tempo;

// Re-exports for convenience
pub use api::{BeatEvent, MetronomeListener, PhaseSample};
pub use engine::BeatScheduler;
pub use tempo::TempoTerm;
