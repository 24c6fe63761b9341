//! Scheduling core: the drift-corrected [`BeatScheduler`].

mod scheduler;

pub use scheduler::BeatScheduler;
