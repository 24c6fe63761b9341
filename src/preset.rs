//! Preset persistence for the surrounding application
//!
//! Presets are an ordered collection of named tempo/signature pairs stored as
//! a JSON array. The scheduling core never reads or writes this module; when
//! a preset is applied its values reach the scheduler only through the
//! ordinary `set_tempo`/`set_time_signature` entry points, which clamp them
//! like any other input.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::BeatScheduler;
use crate::error::PresetError;

/// One saved tempo configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub bpm: u32,
    pub beats: u32,
}

/// Ordered preset collection bound to a JSON file.
pub struct PresetLibrary {
    presets: Vec<Preset>,
    path: PathBuf,
}

impl PresetLibrary {
    /// Load the library from `path`.
    ///
    /// A missing or unparsable file degrades to an empty library with a
    /// logged warning; loading never aborts the program.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let presets = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(presets) => {
                    log::info!("[Presets] Loaded presets from {:?}", path.as_ref());
                    presets
                }
                Err(err) => {
                    log::warn!(
                        "[Presets] Failed to parse {:?}: {}. Starting with an empty library.",
                        path.as_ref(),
                        err
                    );
                    Vec::new()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Presets] Failed to read {:?}: {}. Starting with an empty library.",
                    path.as_ref(),
                    err
                );
                Vec::new()
            }
        };

        Self {
            presets,
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Write the library back to its file as a pretty-printed JSON array.
    pub fn save(&self) -> Result<(), PresetError> {
        let json = serde_json::to_string_pretty(&self.presets)?;
        fs::write(&self.path, json)?;
        log::info!(
            "[Presets] Saved {} presets to {:?}",
            self.presets.len(),
            self.path
        );
        Ok(())
    }

    /// Append a preset to the end of the collection.
    pub fn add(&mut self, preset: Preset) {
        self.presets.push(preset);
    }

    /// Remove and return the preset at `index`, preserving the order of the
    /// remaining entries.
    pub fn remove(&mut self, index: usize) -> Result<Preset, PresetError> {
        if index >= self.presets.len() {
            return Err(PresetError::IndexOutOfRange {
                index,
                len: self.presets.len(),
            });
        }
        Ok(self.presets.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Push the preset at `index` into the scheduler.
    ///
    /// Values go through the ordinary setters, so out-of-range bpm/beats in a
    /// hand-edited file are clamped rather than rejected.
    pub fn apply(&self, index: usize, scheduler: &BeatScheduler) -> Result<&Preset, PresetError> {
        let preset = self
            .get(index)
            .ok_or(PresetError::IndexOutOfRange {
                index,
                len: self.presets.len(),
            })?;
        scheduler.set_tempo(preset.bpm);
        scheduler.set_time_signature(preset.beats);
        Ok(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("metronome_presets_{}_{}.json", tag, nanos))
    }

    fn sample() -> Preset {
        Preset {
            name: "Practice".to_string(),
            bpm: 90,
            beats: 3,
        }
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let library = PresetLibrary::load(temp_path("missing"));
        assert!(library.is_empty());
    }

    #[test]
    fn test_save_and_reload_preserves_order() {
        let path = temp_path("roundtrip");
        let mut library = PresetLibrary::load(&path);
        library.add(sample());
        library.add(Preset {
            name: "Fast".to_string(),
            bpm: 160,
            beats: 4,
        });
        library.save().unwrap();

        let reloaded = PresetLibrary::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get(0).unwrap().name, "Practice");
        assert_eq!(reloaded.get(1).unwrap().bpm, 160);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = temp_path("corrupt");
        fs::write(&path, "not json").unwrap();

        let library = PresetLibrary::load(&path);
        assert!(library.is_empty());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut library = PresetLibrary::load(temp_path("remove"));
        for (name, bpm) in [("a", 60), ("b", 90), ("c", 120)] {
            library.add(Preset {
                name: name.to_string(),
                bpm,
                beats: 4,
            });
        }

        let removed = library.remove(1).unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(library.get(0).unwrap().name, "a");
        assert_eq!(library.get(1).unwrap().name, "c");
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut library = PresetLibrary::load(temp_path("range"));
        let err = library.remove(0).unwrap_err();
        assert_eq!(err, PresetError::IndexOutOfRange { index: 0, len: 0 });
    }

    #[test]
    fn test_apply_clamps_through_setters() {
        let mut library = PresetLibrary::load(temp_path("apply"));
        library.add(Preset {
            name: "Out of range".to_string(),
            bpm: 500,
            beats: 99,
        });

        let scheduler = BeatScheduler::new();
        library.apply(0, &scheduler).unwrap();
        assert_eq!(scheduler.bpm(), 208);
        assert_eq!(scheduler.beats_per_measure(), 16);

        assert!(library.apply(5, &scheduler).is_err());
    }
}
