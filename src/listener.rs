//! Holds the user's latest position and orientation.

use crate::geometry::{normalize_heading, Coordinate, Degrees};

/// Seconds since the unix epoch, as delivered with each fix.
pub type Timestamp = f64;

/// Where the listener is and which way they face, in the audio engine's
/// conventions: latitude and longitude are the two planar axes, altitude is
/// always zero, and yaw is already offset by [normalize_heading].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListenerPose {
    pub position: Coordinate,
    pub yaw_degrees: Degrees,
}

/// Tracks the listener pose from two independent sensor streams.
///
/// The position is absent until the first fix arrives, the yaw until the
/// first heading arrives. A pose is only reported once a position is known;
/// until a heading shows up the listener faces the engine's forward axis.
#[derive(Debug, Clone, Default)]
pub struct PoseTracker {
    position: Option<Coordinate>,
    yaw: Option<Degrees>,
    last_fix_at: Option<Timestamp>,
}

impl PoseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_fix(&mut self, coordinate: Coordinate, timestamp: Timestamp) {
        self.position = Some(coordinate);
        self.last_fix_at = Some(timestamp);
    }

    /// Takes a compass true heading and stores it as engine yaw.
    pub fn on_heading(&mut self, true_heading: Degrees) {
        self.yaw = Some(normalize_heading(true_heading));
    }

    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }

    pub fn yaw(&self) -> Option<Degrees> {
        self.yaw
    }

    pub fn last_fix_at(&self) -> Option<Timestamp> {
        self.last_fix_at
    }

    pub fn current_pose(&self) -> Option<ListenerPose> {
        self.position.map(|position| ListenerPose {
            position,
            yaw_degrees: self.yaw.unwrap_or(0.0),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
