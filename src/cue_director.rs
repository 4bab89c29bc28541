//! Decides which cues exist, where they sit and whether they play.
//!
//! The director keeps at most one live cue per [CueKind] and looks a kind up
//! before creating it, so a repeated event never doubles a cue. A cue whose
//! asset fails to load is skipped: the error goes back to the caller and
//! everything else carries on without it.

use crate::audio_engine::{AudioEngine, CueId, LoopMode};
use crate::config::{CueSet, CueSpec};
use crate::error::NavError;
use crate::geometry::{bearing, distance, Coordinate};
use crate::listener::ListenerPose;

use log::{debug, info, warn};
use std::collections::HashMap;

/// The cues the director knows how to manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueKind {
    /// Looping sound parked on the next unreached waypoint.
    Beacon,
    /// Short chime played where the listener reached a waypoint.
    Progress,
    /// Looping chime once the destination is reached.
    Arrival,
    /// Plays while the listener is too far from the reference.
    Warning,
}

impl CueKind {
    pub fn loop_mode(self) -> LoopMode {
        match self {
            CueKind::Beacon | CueKind::Arrival => LoopMode::Loop,
            CueKind::Progress => LoopMode::InterruptOnLoopBoundary,
            CueKind::Warning => LoopMode::InterruptImmediately,
        }
    }
}

/// A cue the director has asked the engine to create.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCue {
    pub id: CueId,
    pub asset_name: String,
    pub position: Coordinate,
    pub volume: f32,
    pub loop_mode: LoopMode,
    pub playing: bool,
}

#[derive(Debug, Clone)]
pub struct CueDirector {
    cues: CueSet,
    live: HashMap<CueKind, AudioCue>,
}

impl CueDirector {
    pub fn new(cues: CueSet) -> Self {
        Self {
            cues,
            live: HashMap::new(),
        }
    }

    pub fn live(&self, kind: CueKind) -> Option<&AudioCue> {
        self.live.get(&kind)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    fn spec(&self, kind: CueKind) -> &CueSpec {
        match kind {
            CueKind::Beacon => &self.cues.beacon,
            CueKind::Progress => &self.cues.progress,
            CueKind::Arrival => &self.cues.arrival,
            CueKind::Warning => &self.cues.warning,
        }
    }

    /// Creates the cue unless one of this kind is already live, then makes
    /// sure it is playing at `position`.
    fn ensure_playing<E: AudioEngine>(
        &mut self,
        engine: &mut E,
        kind: CueKind,
        position: Coordinate,
    ) -> Result<(), NavError> {
        if let Some(cue) = self.live.get_mut(&kind) {
            if cue.position != position {
                engine.set_position(cue.id, position);
                cue.position = position;
            }
            if !cue.playing {
                engine.play(cue.id);
                cue.playing = true;
            }
            return Ok(());
        }

        let spec = self.spec(kind).clone();
        let loop_mode = kind.loop_mode();
        let id = engine
            .create_cue(&spec.asset, position, spec.volume, loop_mode)
            .map_err(|e| {
                warn!("{:?} cue skipped: {}", kind, e);
                e
            })?;
        engine.play(id);
        debug!("{:?} cue #{} playing {} at {}", kind, id, spec.asset, position);

        self.live.insert(
            kind,
            AudioCue {
                id,
                asset_name: spec.asset,
                position,
                volume: spec.volume,
                loop_mode,
                playing: true,
            },
        );
        Ok(())
    }

    fn release<E: AudioEngine>(&mut self, engine: &mut E, kind: CueKind) {
        if let Some(cue) = self.live.remove(&kind) {
            engine.stop(cue.id);
            debug!("{:?} cue #{} stopped", kind, cue.id);
        }
    }

    /// Starts the route beacon on the first target waypoint.
    pub fn start<E: AudioEngine>(
        &mut self,
        engine: &mut E,
        target: Coordinate,
    ) -> Result<(), NavError> {
        info!("beacon on {}", target);
        self.ensure_playing(engine, CueKind::Beacon, target)
    }

    /// Mirrors the listener into the engine and parks the beacon, if any, on
    /// the current target.
    pub fn on_pose<E: AudioEngine>(
        &mut self,
        engine: &mut E,
        pose: &ListenerPose,
        target: Option<Coordinate>,
    ) {
        engine.set_listener_pose(pose.position, pose.yaw_degrees);

        if let (Some(beacon), Some(target)) = (self.live.get_mut(&CueKind::Beacon), target) {
            debug!(
                "beacon {:.0} m away, bearing {:.0}",
                distance(&pose.position, &target),
                bearing(&pose.position, &target)
            );
            engine.set_position(beacon.id, target);
            beacon.position = target;
        }
    }

    /// Chimes where the listener stands. The beacon keeps going.
    pub fn on_waypoint_reached<E: AudioEngine>(
        &mut self,
        engine: &mut E,
        index: usize,
        listener: Coordinate,
    ) -> Result<(), NavError> {
        info!("waypoint {} reached", index);
        // a chime that already finished is replayed, not recreated
        if let Some(chime) = self.live.get_mut(&CueKind::Progress) {
            chime.playing = false;
        }
        self.ensure_playing(engine, CueKind::Progress, listener)
    }

    /// Drops the beacon and loops the arrival chime.
    pub fn on_destination_reached<E: AudioEngine>(
        &mut self,
        engine: &mut E,
        listener: Coordinate,
    ) -> Result<(), NavError> {
        if self.live.contains_key(&CueKind::Arrival) {
            debug!("arrival cue already live");
            return Ok(());
        }
        info!("destination reached, arrival cue at {}", listener);
        self.release(engine, CueKind::Beacon);
        self.ensure_playing(engine, CueKind::Arrival, listener)
    }

    pub fn on_warning<E: AudioEngine>(
        &mut self,
        engine: &mut E,
        on: bool,
        listener: Coordinate,
    ) -> Result<(), NavError> {
        if on {
            self.ensure_playing(engine, CueKind::Warning, listener)
        } else {
            self.release(engine, CueKind::Warning);
            Ok(())
        }
    }

    /// Stops and releases every live cue.
    pub fn teardown<E: AudioEngine>(&mut self, engine: &mut E) {
        let kinds: Vec<CueKind> = self.live.keys().copied().collect();
        for kind in kinds {
            self.release(engine, kind);
        }
    }
}
