//! Public event and listener types exposed to the surrounding application.

mod types;

pub use types::{BeatEvent, MetronomeListener, PhaseSample};
