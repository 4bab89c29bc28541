//! The boundary with the external audio engine.
//!
//! The navigation core never renders audio. It talks to an [AudioEngine],
//! whose commands are fire-and-forget: the only thing the core waits for is
//! whether an asset could be loaded. [DispatchEngine] is the production
//! implementation, forwarding [EngineCommand]s over a channel to whatever
//! drives the real renderer on its own thread. [SceneMirror] is a
//! [Component] that plays that role for the command line tool, keeping a
//! table of live cues and describing each command it applies.

use crate::component::{Component, ComponentError};
use crate::error::NavError;
use crate::geometry::{Coordinate, Degrees};

use hound::WavReader;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

/// Handle to one cue inside the engine.
pub type CueId = u64;

/// How a cue is scheduled relative to what is already playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Play through once.
    Once,
    /// Repeat until stopped.
    Loop,
    /// Play once, cutting in at the next loop boundary of lower-priority cues.
    InterruptOnLoopBoundary,
    /// Play once, cutting in right away.
    InterruptImmediately,
}

/// A point in engine space. Latitude maps to x, longitude to z and the
/// listener plane sits at y = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnginePoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Coordinate> for EnginePoint {
    fn from(c: Coordinate) -> Self {
        EnginePoint {
            x: c.lat as f32,
            y: 0.0,
            z: c.lon as f32,
        }
    }
}

impl fmt::Display for EnginePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.1}, {:.6})", self.x, self.y, self.z)
    }
}

/// The commands the core can issue.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Create {
        id: CueId,
        asset: String,
        position: EnginePoint,
        volume: f32,
        loop_mode: LoopMode,
    },
    SetPosition {
        id: CueId,
        position: EnginePoint,
    },
    Play(CueId),
    Stop(CueId),
    SetListenerPose {
        position: EnginePoint,
        yaw_degrees: f32,
    },
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use EngineCommand as EC;
        match self {
            EC::Create {
                id,
                asset,
                position,
                volume,
                loop_mode,
            } => write!(
                f,
                "create #{} {} at {} vol {:.1} {:?}",
                id, asset, position, volume, loop_mode
            ),
            EC::SetPosition { id, position } => write!(f, "move #{} to {}", id, position),
            EC::Play(id) => write!(f, "play #{}", id),
            EC::Stop(id) => write!(f, "stop #{}", id),
            EC::SetListenerPose {
                position,
                yaw_degrees,
            } => write!(f, "listener at {} yaw {:.1}", position, yaw_degrees),
        }
    }
}

/// What the navigation core needs from an audio engine.
pub trait AudioEngine {
    /// Loads `asset` and attaches a new cue. Fails only when the asset
    /// cannot be loaded.
    fn create_cue(
        &mut self,
        asset: &str,
        position: Coordinate,
        volume: f32,
        loop_mode: LoopMode,
    ) -> Result<CueId, NavError>;

    fn set_position(&mut self, id: CueId, position: Coordinate);

    fn play(&mut self, id: CueId);

    /// Stops and detaches the cue.
    fn stop(&mut self, id: CueId);

    fn set_listener_pose(&mut self, position: Coordinate, yaw_degrees: Degrees);
}

/// Facts about a sound file that loaded successfully.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f32,
}

/// Resolves asset names to `<root>/<name>.wav` and validates them by reading
/// their WAV header.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    root: PathBuf,
    loaded: HashMap<String, AssetInfo>,
}

impl AssetCatalog {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            loaded: HashMap::new(),
        }
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.wav", name))
    }

    /// Opens the asset once; later lookups hit the cache. Failures are not
    /// cached, so an asset dropped into place later is picked up.
    pub fn load(&mut self, name: &str) -> Result<AssetInfo, NavError> {
        if let Some(info) = self.loaded.get(name) {
            return Ok(*info);
        }

        let path = self.path_of(name);
        let reader = WavReader::open(&path).map_err(|e| {
            warn!("could not load {}: {}", path.display(), e);
            NavError::CueAssetUnavailable(name.to_owned())
        })?;

        let spec = reader.spec();
        let info = AssetInfo {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            duration_secs: reader.duration() as f32 / spec.sample_rate as f32,
        };
        debug!("loaded {} ({:.2} s)", path.display(), info.duration_secs);
        self.loaded.insert(name.to_owned(), info);
        Ok(info)
    }
}

/// Sends every command down a channel without waiting on the receiver.
///
/// Cue ids are handed out here, so creation never has to round-trip to the
/// rendering thread. With no catalog every asset is assumed loadable.
pub struct DispatchEngine {
    tx: Sender<EngineCommand>,
    next_id: CueId,
    catalog: Option<AssetCatalog>,
}

impl DispatchEngine {
    pub fn new(tx: Sender<EngineCommand>, catalog: Option<AssetCatalog>) -> Self {
        Self {
            tx,
            next_id: 1,
            catalog,
        }
    }

    fn dispatch(&self, command: EngineCommand) {
        debug!("engine <- {}", command);
        if let Err(e) = self.tx.send(command) {
            warn!("audio engine is gone, dropped {}", e.0);
        }
    }
}

impl AudioEngine for DispatchEngine {
    fn create_cue(
        &mut self,
        asset: &str,
        position: Coordinate,
        volume: f32,
        loop_mode: LoopMode,
    ) -> Result<CueId, NavError> {
        if let Some(catalog) = self.catalog.as_mut() {
            catalog.load(asset)?;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.dispatch(EngineCommand::Create {
            id,
            asset: asset.to_owned(),
            position: position.into(),
            volume,
            loop_mode,
        });
        Ok(id)
    }

    fn set_position(&mut self, id: CueId, position: Coordinate) {
        self.dispatch(EngineCommand::SetPosition {
            id,
            position: position.into(),
        });
    }

    fn play(&mut self, id: CueId) {
        self.dispatch(EngineCommand::Play(id));
    }

    fn stop(&mut self, id: CueId) {
        self.dispatch(EngineCommand::Stop(id));
    }

    fn set_listener_pose(&mut self, position: Coordinate, yaw_degrees: Degrees) {
        self.dispatch(EngineCommand::SetListenerPose {
            position: position.into(),
            yaw_degrees: yaw_degrees as f32,
        });
    }
}

#[derive(Debug, Clone)]
struct MirroredCue {
    asset: String,
    position: EnginePoint,
    playing: bool,
}

/// Stands in for the renderer: applies commands to a cue table and reports
/// each one as a line of text. Commands for unknown cues are logged and
/// skipped, since the engine only knows cues it was asked to create.
#[derive(Debug, Default)]
pub struct SceneMirror {
    cues: HashMap<CueId, MirroredCue>,
    listener: Option<(EnginePoint, f32)>,
}

impl SceneMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cues currently attached.
    pub fn live_cues(&self) -> usize {
        self.cues.len()
    }

    /// Number of attached cues that are playing.
    pub fn playing_cues(&self) -> usize {
        self.cues.values().filter(|c| c.playing).count()
    }

    fn apply(&mut self, command: &EngineCommand) -> bool {
        use EngineCommand as EC;
        match command {
            EC::Create {
                id,
                asset,
                position,
                ..
            } => {
                let fresh = MirroredCue {
                    asset: asset.clone(),
                    position: *position,
                    playing: false,
                };
                self.cues.insert(*id, fresh).is_none()
            }
            EC::SetPosition { id, position } => match self.cues.get_mut(id) {
                Some(cue) => {
                    cue.position = *position;
                    true
                }
                None => false,
            },
            EC::Play(id) => match self.cues.get_mut(id) {
                Some(cue) => {
                    cue.playing = true;
                    true
                }
                None => false,
            },
            EC::Stop(id) => self.cues.remove(id).is_some(),
            EC::SetListenerPose {
                position,
                yaw_degrees,
            } => {
                self.listener = Some((*position, *yaw_degrees));
                true
            }
        }
    }
}

impl Component for SceneMirror {
    type InData = EngineCommand;
    type OutData = String;

    fn convert(&mut self, input: EngineCommand) -> String {
        if !self.apply(&input) {
            warn!("{} : ignored {}", self, input);
            return format!("ignored: {}", input);
        }
        input.to_string()
    }

    fn finalize(&mut self) -> Result<(), ComponentError> {
        if let Some((position, yaw)) = self.listener.take() {
            debug!("listener last at {} yaw {:.1}", position, yaw);
        }
        info!(
            "{} : {} cues still attached, {} playing",
            self,
            self.live_cues(),
            self.playing_cues()
        );
        for (id, cue) in self.cues.drain() {
            debug!("detaching #{} {} at {}", id, cue.asset, cue.position);
        }
        Ok(())
    }
}

impl fmt::Display for SceneMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SceneMirror")
    }
}

/// Records every command in order. Assets named in `missing` fail to load.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MockEngine {
    pub commands: Vec<EngineCommand>,
    pub missing: std::collections::HashSet<String>,
    next_id: CueId,
}

#[cfg(test)]
impl MockEngine {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn without(assets: &[&str]) -> Self {
        Self {
            missing: assets.iter().map(|a| a.to_string()).collect(),
            ..Self::new()
        }
    }

    /// Commands other than listener pose mirroring.
    pub fn cue_commands(&self) -> Vec<&EngineCommand> {
        self.commands
            .iter()
            .filter(|c| !matches!(c, EngineCommand::SetListenerPose { .. }))
            .collect()
    }

    pub fn created_assets(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                EngineCommand::Create { asset, .. } => Some(asset.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl AudioEngine for MockEngine {
    fn create_cue(
        &mut self,
        asset: &str,
        position: Coordinate,
        volume: f32,
        loop_mode: LoopMode,
    ) -> Result<CueId, NavError> {
        if self.missing.contains(asset) {
            return Err(NavError::CueAssetUnavailable(asset.to_owned()));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.commands.push(EngineCommand::Create {
            id,
            asset: asset.to_owned(),
            position: position.into(),
            volume,
            loop_mode,
        });
        Ok(id)
    }

    fn set_position(&mut self, id: CueId, position: Coordinate) {
        self.commands.push(EngineCommand::SetPosition {
            id,
            position: position.into(),
        });
    }

    fn play(&mut self, id: CueId) {
        self.commands.push(EngineCommand::Play(id));
    }

    fn stop(&mut self, id: CueId) {
        self.commands.push(EngineCommand::Stop(id));
    }

    fn set_listener_pose(&mut self, position: Coordinate, yaw_degrees: Degrees) {
        self.commands.push(EngineCommand::SetListenerPose {
            position: position.into(),
            yaw_degrees: yaw_degrees as f32,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::run_component;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use std::sync::mpsc::channel;

    const HERE: Coordinate = Coordinate::new(1.5, 2.5);

    fn write_tone(dir: &Path, name: &str, frames: u32) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(dir.join(format!("{}.wav", name)), spec).unwrap();
        for i in 0..frames {
            writer.write_sample(((i % 64) as i16 - 32) * 100).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn coordinate_maps_lat_to_x_lon_to_z() {
        let p: EnginePoint = HERE.into();
        assert_eq!(p, EnginePoint { x: 1.5, y: 0.0, z: 2.5 });
    }

    #[test]
    fn catalog_reads_wav_headers() {
        let dir = tempfile::tempdir().unwrap();
        write_tone(dir.path(), "bell", 4000);

        let mut catalog = AssetCatalog::new(dir.path());
        let info = catalog.load("bell").unwrap();
        assert_eq!(info.sample_rate, 8000);
        assert_eq!(info.channels, 1);
        assert!((info.duration_secs - 0.5).abs() < 1e-6);
    }

    #[test]
    fn catalog_reports_missing_asset() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = AssetCatalog::new(dir.path());
        assert_eq!(
            catalog.load("drumloop"),
            Err(NavError::CueAssetUnavailable("drumloop".to_owned()))
        );

        // shows up later, gets picked up
        write_tone(dir.path(), "drumloop", 100);
        assert!(catalog.load("drumloop").is_ok());
    }

    #[test]
    fn catalog_rejects_non_wav() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bell.wav"), b"definitely not RIFF").unwrap();
        let mut catalog = AssetCatalog::new(dir.path());
        assert!(catalog.load("bell").is_err());
    }

    /// Ids are allocated locally and commands arrive in send order
    #[test]
    fn dispatcher_forwards_in_order() {
        let (tx, rx) = channel();
        let mut engine = DispatchEngine::new(tx, None);

        let a = engine.create_cue("drumloop", HERE, 5.0, LoopMode::Loop).unwrap();
        let b = engine.create_cue("bell", HERE, 3.0, LoopMode::Once).unwrap();
        engine.play(a);
        engine.stop(a);
        assert_ne!(a, b);

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(got.len(), 4);
        assert_eq!(got[2], EngineCommand::Play(a));
        assert_eq!(got[3], EngineCommand::Stop(a));
    }

    #[test]
    fn dispatcher_refuses_missing_asset_without_sending() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = channel();
        let mut engine = DispatchEngine::new(tx, Some(AssetCatalog::new(dir.path())));

        let res = engine.create_cue("warning", HERE, 5.0, LoopMode::InterruptImmediately);
        assert_eq!(res, Err(NavError::CueAssetUnavailable("warning".to_owned())));
        assert!(rx.try_recv().is_err());
    }

    /// A closed receiver never blocks or panics the sender
    #[test]
    fn dispatcher_survives_dead_engine() {
        let (tx, rx) = channel();
        drop(rx);
        let mut engine = DispatchEngine::new(tx, None);
        let id = engine.create_cue("bell", HERE, 1.0, LoopMode::Once).unwrap();
        engine.play(id);
    }

    #[test]
    fn mirror_tracks_cue_lifecycle() {
        let mut mirror = SceneMirror::new();
        mirror.convert(EngineCommand::Create {
            id: 7,
            asset: "drumloop".to_owned(),
            position: HERE.into(),
            volume: 5.0,
            loop_mode: LoopMode::Loop,
        });
        assert_eq!(mirror.live_cues(), 1);
        assert_eq!(mirror.playing_cues(), 0);

        mirror.convert(EngineCommand::Play(7));
        assert_eq!(mirror.playing_cues(), 1);

        let line = mirror.convert(EngineCommand::Stop(7));
        assert_eq!(line, "stop #7");
        assert_eq!(mirror.live_cues(), 0);
    }

    /// Finalizing detaches whatever the session left behind
    #[test]
    fn mirror_finalize_detaches_everything() {
        let mut mirror = SceneMirror::new();
        mirror.convert(EngineCommand::Create {
            id: 1,
            asset: "warning".to_owned(),
            position: HERE.into(),
            volume: 5.0,
            loop_mode: LoopMode::InterruptImmediately,
        });
        mirror.convert(EngineCommand::Play(1));
        mirror.convert(EngineCommand::SetListenerPose {
            position: HERE.into(),
            yaw_degrees: 90.0,
        });

        assert!(mirror.finalize().is_ok());
        assert_eq!(mirror.live_cues(), 0);
        assert_eq!(mirror.playing_cues(), 0);
        assert!(mirror.listener.is_none());
    }

    #[test]
    fn mirror_ignores_unknown_cues() {
        let mut mirror = SceneMirror::new();
        let line = mirror.convert(EngineCommand::Play(3));
        assert_eq!(line, "ignored: play #3");
    }

    /// Dispatcher and mirror wired together the way the command line does it
    #[test]
    fn dispatcher_feeds_mirror_thread() {
        let (cmd_tx, cmd_rx) = channel();
        let (line_tx, line_rx) = channel();
        let handle = run_component(Box::new(SceneMirror::new()), cmd_rx, line_tx);

        let mut engine = DispatchEngine::new(cmd_tx, None);
        let id = engine.create_cue("drumloop", HERE, 5.0, LoopMode::Loop).unwrap();
        engine.play(id);
        engine.set_listener_pose(HERE, -170.0);
        drop(engine);
        handle.join().unwrap();

        let lines: Vec<String> = line_rx.iter().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("create #1 drumloop"));
        assert_eq!(lines[1], "play #1");
        assert!(lines[2].ends_with("yaw -170.0"));
    }
}
