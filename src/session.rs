//! The navigation session: one owner for pose, progress, deviation, live
//! cues and recording state.
//!
//! Every entry point takes `&mut self`, and [NavigationSession] implements
//! [Component], so running it through
//! [run_component](crate::component::run_component) gives a single thread
//! that applies fixes, headings, reference positions and control commands
//! strictly in arrival order. Audio commands go out through the
//! [AudioEngine], which never makes the session wait on rendering.

use crate::audio_engine::AudioEngine;
use crate::companion::ReferenceControl;
use crate::component::{Component, ComponentError};
use crate::config::NavConfig;
use crate::cue_director::CueDirector;
use crate::deviation::{DeviationEvent, DeviationWatchdog};
use crate::error::NavError;
use crate::geometry::{Coordinate, Degrees};
use crate::listener::{PoseTracker, Timestamp};
use crate::route_progress::{ProgressEvent, ProgressState, RouteTracker};
use crate::sample_aggregator::{SampleRow, SampleSink, SpeedAggregator};

use log::{debug, info, warn};
use std::fmt;

/// A single position reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub coordinate: Coordinate,
    /// Meters per second; negative when the sensor could not tell.
    pub speed: f64,
    pub timestamp: Timestamp,
}

/// Everything a session can be told, in the order it should happen.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    Start {
        waypoints: Vec<Coordinate>,
        reference: Option<Coordinate>,
    },
    Fix(Fix),
    /// Compass true heading in degrees.
    Heading(Degrees),
    /// New position of the reference the watchdog compares against.
    Reference(Coordinate),
    End,
}

/// A discrete event raised while handling one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Progress(ProgressEvent),
    Deviation(DeviationEvent),
}

/// What one input did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Update {
    /// Discrete events, in the order they were handled.
    pub events: Vec<SessionEvent>,
    /// Non-fatal problems: cues that could not be loaded, rows the sink
    /// refused.
    pub degraded: Vec<NavError>,
    /// Mean speed after this input, when there is one.
    pub average_speed: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Navigating,
    Ended,
}

pub struct NavigationSession<E: AudioEngine> {
    config: NavConfig,
    engine: E,
    sink: Box<dyn SampleSink + Send>,
    reference_control: Option<Box<dyn ReferenceControl + Send>>,
    pose: PoseTracker,
    progress: RouteTracker,
    watchdog: DeviationWatchdog,
    director: CueDirector,
    speeds: SpeedAggregator,
    recording: bool,
    lifecycle: Lifecycle,
}

impl<E: AudioEngine> NavigationSession<E> {
    pub fn new(config: NavConfig, engine: E, sink: Box<dyn SampleSink + Send>) -> Self {
        Self {
            pose: PoseTracker::new(),
            progress: RouteTracker::new(config.waypoint_radius_m),
            watchdog: DeviationWatchdog::new(config.pause_threshold_m, config.warn_threshold_m),
            director: CueDirector::new(config.cues.clone()),
            speeds: SpeedAggregator::new(),
            recording: false,
            lifecycle: Lifecycle::Idle,
            config,
            engine,
            sink,
            reference_control: None,
        }
    }

    /// Hooks up whatever moves the reference, so the watchdog can pause it.
    pub fn set_reference_control(&mut self, control: Box<dyn ReferenceControl + Send>) {
        self.reference_control = Some(control);
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn pose(&self) -> &PoseTracker {
        &self.pose
    }

    pub fn progress(&self) -> ProgressState {
        self.progress.state()
    }

    pub fn watchdog(&self) -> &DeviationWatchdog {
        &self.watchdog
    }

    pub fn director(&self) -> &CueDirector {
        &self.director
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_ended(&self) -> bool {
        self.lifecycle == Lifecycle::Ended
    }

    pub fn average_speed(&self) -> Result<f64, NavError> {
        self.speeds.average()
    }

    fn ensure_live(&self) -> Result<(), NavError> {
        if self.lifecycle == Lifecycle::Ended {
            return Err(NavError::StaleSession);
        }
        Ok(())
    }

    /// Assigns the route, starts the beacon and starts recording. A route
    /// with fewer than two waypoints is refused before anything is sent to
    /// the engine.
    pub fn start(
        &mut self,
        waypoints: Vec<Coordinate>,
        reference: Option<Coordinate>,
    ) -> Result<Update, NavError> {
        self.ensure_live()?;
        if self.lifecycle == Lifecycle::Navigating {
            return Err(NavError::AlreadyStarted);
        }
        self.progress.start(waypoints)?;
        self.lifecycle = Lifecycle::Navigating;

        let mut update = Update::default();
        if let Some(reference) = reference {
            self.watchdog.set_reference(reference);
        }
        if let Some(target) = self.progress.target() {
            if let Err(e) = self.director.start(&mut self.engine, target) {
                update.degraded.push(e);
            }
        }

        self.speeds.reset();
        self.recording = true;
        info!(
            "navigation started{}",
            if self.watchdog.is_inert() { "" } else { " with reference" }
        );
        Ok(update)
    }

    /// Folds one fix into pose, speed, progress and deviation, then issues
    /// the resulting cue commands.
    pub fn on_fix(&mut self, fix: Fix) -> Result<Update, NavError> {
        self.ensure_live()?;
        if !fix.coordinate.is_valid() {
            warn!("dropping fix at invalid coordinate {}", fix.coordinate);
            return Ok(Update::default());
        }
        let mut update = Update::default();

        if let Some(previous) = self.pose.last_fix_at() {
            debug!("fix {:.1} s after the previous one", fix.timestamp - previous);
        }
        self.pose.on_fix(fix.coordinate, fix.timestamp);
        let avg_speed = self.speeds.record_speed(fix.speed);
        update.average_speed = Some(avg_speed);

        if self.recording {
            let row = SampleRow {
                timestamp: fix.timestamp,
                longitude: fix.coordinate.lon,
                latitude: fix.coordinate.lat,
                speed: self.speeds.latest().unwrap_or(0.0),
                avg_speed,
            };
            if let Err(e) = self.sink.append_sample(&row) {
                warn!("{}", e);
                update.degraded.push(e);
            }
        }

        let position = fix.coordinate;
        if let Some(event) = self.progress.on_fix(&position) {
            update.events.push(SessionEvent::Progress(event));
        }
        for event in self.watchdog.evaluate(&position) {
            update.events.push(SessionEvent::Deviation(event));
        }

        for event in update.events.clone() {
            if let Err(e) = self.apply(event, position) {
                update.degraded.push(e);
            }
        }
        self.sync_pose();

        Ok(update)
    }

    pub fn on_heading(&mut self, true_heading: Degrees) -> Result<Update, NavError> {
        self.ensure_live()?;
        if !true_heading.is_finite() {
            warn!("dropping non-finite heading");
            return Ok(Update::default());
        }
        self.pose.on_heading(true_heading);
        self.sync_pose();
        Ok(Update::default())
    }

    /// Moves the reference. The watchdog looks at it on the next fix.
    pub fn on_reference(&mut self, reference: Coordinate) -> Result<Update, NavError> {
        self.ensure_live()?;
        if !reference.is_valid() {
            warn!("dropping reference at invalid coordinate {}", reference);
            return Ok(Update::default());
        }
        self.watchdog.set_reference(reference);
        Ok(Update::default())
    }

    /// Stops every live cue, stops recording and releases route state. Any
    /// later call gets [NavError::StaleSession].
    pub fn end(&mut self) -> Result<Update, NavError> {
        self.ensure_live()?;
        self.director.teardown(&mut self.engine);
        self.recording = false;
        self.watchdog.clear();
        self.pose.reset();
        self.progress = RouteTracker::new(self.config.waypoint_radius_m);
        self.lifecycle = Lifecycle::Ended;
        info!("navigation session ended");
        Ok(Update::default())
    }

    pub fn handle(&mut self, input: SessionInput) -> Result<Update, NavError> {
        match input {
            SessionInput::Start {
                waypoints,
                reference,
            } => self.start(waypoints, reference),
            SessionInput::Fix(fix) => self.on_fix(fix),
            SessionInput::Heading(deg) => self.on_heading(deg),
            SessionInput::Reference(c) => self.on_reference(c),
            SessionInput::End => self.end(),
        }
    }

    fn apply(&mut self, event: SessionEvent, listener: Coordinate) -> Result<(), NavError> {
        match event {
            SessionEvent::Progress(ProgressEvent::WaypointReached(i)) => {
                self.director
                    .on_waypoint_reached(&mut self.engine, i, listener)
            }
            SessionEvent::Progress(ProgressEvent::DestinationReached) => {
                self.recording = false;
                self.director
                    .on_destination_reached(&mut self.engine, listener)
            }
            SessionEvent::Deviation(DeviationEvent::PauseReference) => {
                if let Some(control) = self.reference_control.as_mut() {
                    control.pause();
                }
                Ok(())
            }
            SessionEvent::Deviation(DeviationEvent::ResumeReference) => {
                if let Some(control) = self.reference_control.as_mut() {
                    control.resume();
                }
                Ok(())
            }
            SessionEvent::Deviation(DeviationEvent::WarningOn) => {
                self.director.on_warning(&mut self.engine, true, listener)
            }
            SessionEvent::Deviation(DeviationEvent::WarningOff) => {
                self.director.on_warning(&mut self.engine, false, listener)
            }
        }
    }

    fn sync_pose(&mut self) {
        if let Some(pose) = self.pose.current_pose() {
            let target = self.progress.target();
            self.director.on_pose(&mut self.engine, &pose, target);
        }
    }
}

impl<E: AudioEngine> Component for NavigationSession<E> {
    type InData = SessionInput;
    type OutData = Result<Update, NavError>;

    fn convert(&mut self, input: SessionInput) -> Result<Update, NavError> {
        self.handle(input)
    }

    fn finalize(&mut self) -> Result<(), ComponentError> {
        if self.is_ended() {
            return Ok(());
        }
        self.end().map(|_| ()).map_err(ComponentError::Session)
    }
}

impl<E: AudioEngine> fmt::Display for NavigationSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NavigationSession")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_engine::{EngineCommand, MockEngine};
    use crate::component::run_component;
    use crate::cue_director::CueKind;
    use std::sync::mpsc::channel;
    use std::sync::{Arc, Mutex};

    const ORIGIN: Coordinate = Coordinate::new(59.3293, 18.0686);

    fn route() -> Vec<Coordinate> {
        vec![ORIGIN, ORIGIN.offset(200.0, 0.0), ORIGIN.offset(400.0, 0.0)]
    }

    fn fix_at(coordinate: Coordinate, t: f64) -> Fix {
        Fix {
            coordinate,
            speed: 1.2,
            timestamp: t,
        }
    }

    fn session_with(engine: MockEngine) -> NavigationSession<MockEngine> {
        NavigationSession::new(NavConfig::default(), engine, Box::new(Vec::<SampleRow>::new()))
    }

    fn session() -> NavigationSession<MockEngine> {
        session_with(MockEngine::new())
    }

    fn progress_events(update: &Update) -> Vec<ProgressEvent> {
        update
            .events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Shared sink so tests can look at rows after handing the box away
    #[derive(Clone, Default)]
    struct SharedRows(Arc<Mutex<Vec<SampleRow>>>);

    impl SampleSink for SharedRows {
        fn append_sample(&mut self, row: &SampleRow) -> Result<(), NavError> {
            self.0.lock().unwrap().push(row.clone());
            Ok(())
        }
    }

    struct RefusingSink;

    impl SampleSink for RefusingSink {
        fn append_sample(&mut self, _row: &SampleRow) -> Result<(), NavError> {
            Err(NavError::Sink("disk full".to_owned()))
        }
    }

    /// Counts pause/resume calls
    #[derive(Clone, Default)]
    struct Toggles(Arc<Mutex<Vec<&'static str>>>);

    impl ReferenceControl for Toggles {
        fn pause(&mut self) {
            self.0.lock().unwrap().push("pause");
        }
        fn resume(&mut self) {
            self.0.lock().unwrap().push("resume");
        }
    }

    #[test]
    fn single_waypoint_route_is_refused_silently() {
        let mut s = session();
        let res = s.start(vec![ORIGIN], None);
        assert!(matches!(res, Err(NavError::InvalidRoute(_))));
        assert!(s.engine().commands.is_empty());
        assert!(!s.is_recording());
        assert_eq!(s.progress(), ProgressState::NotStarted);
    }

    #[test]
    fn start_plays_beacon_on_first_waypoint() {
        let mut s = session();
        let update = s.start(route(), None).unwrap();
        assert!(update.degraded.is_empty());
        assert!(s.is_recording());

        let beacon = s.director().live(CueKind::Beacon).unwrap();
        assert_eq!(beacon.position, ORIGIN);
        assert_eq!(s.engine().created_assets(), vec!["drumloop"]);
    }

    #[test]
    fn start_twice_is_refused() {
        let mut s = session();
        s.start(route(), None).unwrap();
        assert_eq!(s.start(route(), None), Err(NavError::AlreadyStarted));
    }

    /// Walking the whole route yields the three events in order, and the
    /// beacon gives way to the arrival chime
    #[test]
    fn walks_route_to_arrival() {
        let wps = route();
        let mut s = session();
        s.start(wps.clone(), None).unwrap();

        let mut seen = Vec::new();
        let path = [
            wps[0].offset(2.0, 0.0),
            wps[0].offset(100.0, 0.0),
            wps[1],
            wps[1].offset(100.0, 0.0),
            wps[2].offset(-5.0, 0.0),
            wps[2],
        ];
        for (t, p) in path.iter().enumerate() {
            let update = s.on_fix(fix_at(*p, t as f64)).unwrap();
            seen.extend(progress_events(&update));
        }

        assert_eq!(
            seen,
            vec![
                ProgressEvent::WaypointReached(0),
                ProgressEvent::WaypointReached(1),
                ProgressEvent::DestinationReached,
            ]
        );
        assert_eq!(s.progress(), ProgressState::Arrived);
        assert!(s.director().live(CueKind::Beacon).is_none());
        assert!(s.director().live(CueKind::Arrival).is_some());
        assert!(!s.is_recording());
        assert_eq!(
            s.engine().created_assets(),
            vec!["drumloop", "bell", "arrival"]
        );
    }

    /// After each waypoint the beacon sits on the next one
    #[test]
    fn beacon_tracks_next_waypoint() {
        let wps = route();
        let mut s = session();
        s.start(wps.clone(), None).unwrap();

        s.on_fix(fix_at(wps[0], 0.0)).unwrap();
        assert_eq!(s.director().live(CueKind::Beacon).unwrap().position, wps[1]);

        s.on_fix(fix_at(wps[1], 1.0)).unwrap();
        assert_eq!(s.director().live(CueKind::Beacon).unwrap().position, wps[2]);
    }

    #[test]
    fn destination_only_fires_once() {
        let wps = route();
        let mut s = session();
        s.start(wps.clone(), None).unwrap();

        let mut arrivals = 0;
        for t in 0..5 {
            let update = s.on_fix(fix_at(wps[2], t as f64)).unwrap();
            arrivals += progress_events(&update)
                .iter()
                .filter(|e| **e == ProgressEvent::DestinationReached)
                .count();
        }
        assert_eq!(arrivals, 1);
        assert_eq!(s.engine().created_assets(), vec!["drumloop", "arrival"]);
    }

    /// Rows are written from start until arrival, with clamped speeds
    #[test]
    fn records_between_start_and_arrival() {
        let rows = SharedRows::default();
        let mut s = NavigationSession::new(
            NavConfig::default(),
            MockEngine::new(),
            Box::new(rows.clone()),
        );
        let wps = route();

        s.on_fix(fix_at(ORIGIN.offset(0.0, 100.0), 0.0)).unwrap();
        s.start(wps.clone(), None).unwrap();
        for (t, speed) in [-5.0, 10.0, 20.0].iter().enumerate() {
            let update = s
                .on_fix(Fix {
                    coordinate: ORIGIN.offset(0.0, 100.0),
                    speed: *speed,
                    timestamp: t as f64 + 1.0,
                })
                .unwrap();
            assert!(update.average_speed.is_some());
        }
        assert_eq!(s.average_speed(), Ok(10.0));

        s.on_fix(fix_at(wps[2], 10.0)).unwrap();
        s.on_fix(fix_at(wps[2], 11.0)).unwrap();

        let rows = rows.0.lock().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].speed, 0.0);
        assert_eq!(rows[2].avg_speed, 10.0);
        assert_eq!(rows[3].timestamp, 10.0);
    }

    #[test]
    fn no_average_before_any_fix() {
        let s = session();
        assert_eq!(s.average_speed(), Err(NavError::NoSamples));
    }

    #[test]
    fn sink_failure_is_reported_not_fatal() {
        let mut s = NavigationSession::new(NavConfig::default(), MockEngine::new(), Box::new(RefusingSink));
        let wps = route();
        s.start(wps.clone(), None).unwrap();
        let update = s.on_fix(fix_at(wps[0], 0.0)).unwrap();
        assert_eq!(update.degraded, vec![NavError::Sink("disk full".to_owned())]);
        assert_eq!(
            progress_events(&update),
            vec![ProgressEvent::WaypointReached(0)]
        );
    }

    /// Missing chime: reported, and navigation carries on
    #[test]
    fn missing_asset_is_degraded() {
        let wps = route();
        let mut s = session_with(MockEngine::without(&["bell"]));
        s.start(wps.clone(), None).unwrap();

        let update = s.on_fix(fix_at(wps[0], 0.0)).unwrap();
        assert_eq!(
            update.degraded,
            vec![NavError::CueAssetUnavailable("bell".to_owned())]
        );
        assert_eq!(s.progress(), ProgressState::InProgress(1));
    }

    #[test]
    fn missing_beacon_still_starts() {
        let mut s = session_with(MockEngine::without(&["drumloop"]));
        let update = s.start(route(), None).unwrap();
        assert_eq!(
            update.degraded,
            vec![NavError::CueAssetUnavailable("drumloop".to_owned())]
        );
        assert_eq!(s.progress(), ProgressState::InProgress(0));
    }

    /// Warning cue and reference pausing follow the watchdog's flips only
    #[test]
    fn deviation_drives_warning_and_reference() {
        let toggles = Toggles::default();
        let mut s = session();
        s.set_reference_control(Box::new(toggles.clone()));
        let here = ORIGIN.offset(0.0, 300.0);
        s.start(route(), Some(here)).unwrap();

        s.on_fix(fix_at(here.offset(35.0, 0.0), 0.0)).unwrap();
        s.on_fix(fix_at(here.offset(55.0, 0.0), 1.0)).unwrap();
        s.on_fix(fix_at(here.offset(56.0, 0.0), 2.0)).unwrap();
        assert!(s.director().live(CueKind::Warning).is_some());

        s.on_fix(fix_at(here.offset(10.0, 0.0), 3.0)).unwrap();
        assert!(s.director().live(CueKind::Warning).is_none());

        assert_eq!(*toggles.0.lock().unwrap(), vec!["pause", "resume"]);
        assert_eq!(
            s.engine()
                .created_assets()
                .iter()
                .filter(|a| **a == "warning")
                .count(),
            1
        );
    }

    /// The reference can move between fixes
    #[test]
    fn reference_updates_are_used_on_next_fix() {
        let mut s = session();
        s.start(route(), None).unwrap();
        let user = ORIGIN.offset(0.0, 300.0);

        let update = s.on_fix(fix_at(user, 0.0)).unwrap();
        assert!(update.events.is_empty());

        s.on_reference(user.offset(60.0, 0.0)).unwrap();
        let update = s.on_fix(fix_at(user, 1.0)).unwrap();
        assert_eq!(
            update.events,
            vec![
                SessionEvent::Deviation(DeviationEvent::PauseReference),
                SessionEvent::Deviation(DeviationEvent::WarningOn),
            ]
        );
    }

    #[test]
    fn heading_is_mirrored_once_position_is_known() {
        let mut s = session();
        s.on_heading(100.0).unwrap();
        assert!(s.engine().commands.is_empty());

        s.on_fix(fix_at(ORIGIN, 0.0)).unwrap();
        s.on_heading(45.0).unwrap();
        assert_eq!(
            s.engine().commands.last(),
            Some(&EngineCommand::SetListenerPose {
                position: ORIGIN.into(),
                yaw_degrees: 135.0,
            })
        );
    }

    /// A NaN fix from a track file leaves pose, cues, rows and the watchdog
    /// untouched
    #[test]
    fn non_finite_fix_is_dropped() {
        let rows = SharedRows::default();
        let mut s = NavigationSession::new(
            NavConfig::default(),
            MockEngine::new(),
            Box::new(rows.clone()),
        );
        let reference = ORIGIN.offset(0.0, 300.0);
        s.start(route(), Some(reference)).unwrap();

        let near = reference.offset(5.0, 0.0);
        let update = s.on_fix(fix_at(near, 0.0)).unwrap();
        assert!(update.events.is_empty());
        let sent = s.engine().commands.len();

        let bad = match crate::replay::parse_track("FIX,nan,18.0,1.0,5").unwrap()[0] {
            crate::replay::TrackEntry::Fix(fix) => fix,
            other => panic!("expected a fix, got {:?}", other),
        };
        let update = s.on_fix(bad).unwrap();

        assert_eq!(update, Update::default());
        assert!(s.director().live(CueKind::Warning).is_none());
        assert!(!s.watchdog().state().paused);
        assert_eq!(s.engine().commands.len(), sent);
        assert_eq!(s.pose().position(), Some(near));
        assert_eq!(rows.0.lock().unwrap().len(), 1);
        assert_eq!(s.average_speed(), Ok(1.2));
    }

    #[test]
    fn out_of_range_reference_is_ignored() {
        let mut s = session();
        s.start(route(), None).unwrap();
        s.on_reference(Coordinate::new(f64::INFINITY, 0.0)).unwrap();
        assert!(s.watchdog().is_inert());
    }

    /// After end, nothing gets through and nothing changes
    #[test]
    fn ended_session_is_stale() {
        let mut s = session();
        s.start(route(), Some(ORIGIN.offset(0.0, 300.0))).unwrap();
        s.on_fix(fix_at(ORIGIN.offset(-100.0, 0.0), 0.0)).unwrap();
        assert!(s.director().live(CueKind::Warning).is_some());
        s.end().unwrap();

        assert_eq!(s.director().live_count(), 0);
        assert!(!s.is_recording());
        let sent = s.engine().commands.len();

        assert_eq!(s.on_fix(fix_at(ORIGIN, 0.0)), Err(NavError::StaleSession));
        assert_eq!(s.on_heading(10.0), Err(NavError::StaleSession));
        assert_eq!(s.on_reference(ORIGIN), Err(NavError::StaleSession));
        assert_eq!(s.start(route(), None), Err(NavError::StaleSession));
        assert_eq!(s.end(), Err(NavError::StaleSession));
        assert_eq!(s.engine().commands.len(), sent);
        assert_eq!(s.pose().current_pose(), None);
    }

    #[test]
    fn end_before_start_is_fine() {
        let mut s = session();
        assert!(s.end().is_ok());
        assert!(s.is_ended());
    }

    /// Fixes and headings from two producers are handled in arrival order
    /// on the session thread, and finalize tears down a live session
    #[test]
    fn runs_as_component() {
        let (in_tx, in_rx) = channel();
        let heading_tx = in_tx.clone();
        let (out_tx, out_rx) = channel();
        let wps = route();

        let handle = run_component(Box::new(session()), in_rx, out_tx);

        in_tx
            .send(SessionInput::Start {
                waypoints: wps.clone(),
                reference: None,
            })
            .unwrap();
        heading_tx.send(SessionInput::Heading(90.0)).unwrap();
        in_tx.send(SessionInput::Fix(fix_at(wps[0], 0.0))).unwrap();
        in_tx.send(SessionInput::Fix(fix_at(wps[2], 1.0))).unwrap();
        drop(in_tx);
        drop(heading_tx);
        handle.join().unwrap();

        let outs: Vec<_> = out_rx.iter().collect();
        assert_eq!(outs.len(), 4);
        let events: Vec<ProgressEvent> = outs
            .iter()
            .filter_map(|o| o.as_ref().ok())
            .flat_map(progress_events)
            .collect();
        assert_eq!(
            events,
            vec![
                ProgressEvent::WaypointReached(0),
                ProgressEvent::DestinationReached
            ]
        );
    }
}
