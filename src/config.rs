//! Tunables for a navigation session, loadable from a RON file.
//!
//! The proximity thresholds were tuned by walking, not derived, so they live
//! here rather than as constants. A config file only needs the fields it
//! changes:
//!
//! ```text
//! (waypoint_radius_m: 20.0, cues: (warning: (asset: "buzz", volume: 4.0)))
//! ```

use crate::error::FileError;
use crate::geometry::Meters;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Which sound a cue kind plays and how loud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueSpec {
    pub asset: String,
    pub volume: f32,
}

impl CueSpec {
    fn new(asset: &str, volume: f32) -> Self {
        Self {
            asset: asset.to_owned(),
            volume,
        }
    }
}

/// One [CueSpec] per cue kind the director manages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueSet {
    pub beacon: CueSpec,
    pub progress: CueSpec,
    pub arrival: CueSpec,
    pub warning: CueSpec,
}

impl Default for CueSet {
    fn default() -> Self {
        Self {
            beacon: CueSpec::new("drumloop", 5.0),
            progress: CueSpec::new("bell", 3.0),
            arrival: CueSpec::new("arrival", 3.0),
            warning: CueSpec::new("warning", 5.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// How close counts as reaching a waypoint or the destination.
    pub waypoint_radius_m: Meters,
    /// Gap to the reference beyond which the reference is held back.
    pub pause_threshold_m: Meters,
    /// Gap to the reference beyond which the warning cue plays.
    pub warn_threshold_m: Meters,
    pub cues: CueSet,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            waypoint_radius_m: 15.0,
            pause_threshold_m: 30.0,
            warn_threshold_m: 50.0,
            cues: CueSet::default(),
        }
    }
}

impl NavConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self, FileError> {
        let config: NavConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FileError> {
        let thresholds = [
            ("waypoint_radius_m", self.waypoint_radius_m),
            ("pause_threshold_m", self.pause_threshold_m),
            ("warn_threshold_m", self.warn_threshold_m),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value <= 0.0 {
                return Err(FileError::Invalid(format!(
                    "{} must be a positive distance, got {}",
                    name, value
                )));
            }
        }

        let cues = [
            ("beacon", &self.cues.beacon),
            ("progress", &self.cues.progress),
            ("arrival", &self.cues.arrival),
            ("warning", &self.cues.warning),
        ];
        for (name, cue) in cues {
            if cue.asset.trim().is_empty() {
                return Err(FileError::Invalid(format!("{} cue has no asset", name)));
            }
            if !cue.volume.is_finite() || cue.volume < 0.0 {
                return Err(FileError::Invalid(format!(
                    "{} cue volume must be non-negative, got {}",
                    name, cue.volume
                )));
            }
        }
        Ok(())
    }

    /// Every asset name the session may ask the engine for.
    pub fn assets(&self) -> Vec<&str> {
        vec![
            self.cues.beacon.asset.as_str(),
            self.cues.progress.asset.as_str(),
            self.cues.arrival.asset.as_str(),
            self.cues.warning.asset.as_str(),
        ]
    }
}
