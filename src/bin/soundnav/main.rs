//! Command line front end: replays a recorded walk through a navigation
//! session and prints every audio engine command it produces.

use clap::Parser;
use soundnav::{
    args::{NavArgs, NavCommand, ReplayCommand},
    audio_engine::{AssetCatalog, DispatchEngine, EngineCommand, SceneMirror},
    companion::{CompanionSettings, SimulatedCompanion},
    component::run_component,
    config::NavConfig,
    error::NavError,
    replay::parse_track,
    sample_aggregator::{DiscardSink, SampleSink},
    session::{NavigationSession, SessionInput, Update},
    track_log::{load_route, write_route, RonTrackLog},
};

use log::{info, warn};
use std::{
    error::Error,
    fs::{self, File},
    sync::mpsc::{channel, Receiver},
    thread::{self, JoinHandle},
    time::Duration,
};

// Example:
// cargo run --bin soundnav --
//                          --config  nav.ron
//                          --assets  sounds/ replay
//                          --route   walk.ron
//                          --track   walk.track
//                          --samples walk.samples
//                          --companion
//                          --companion-jitter 2
//                          --pace    4

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = NavArgs::parse();

    let config = match &args.config {
        Some(path) => NavConfig::from_path(path)?,
        None => NavConfig::default(),
    };
    let catalog = args.assets.as_ref().map(AssetCatalog::new);

    match args.command {
        NavCommand::CheckAssets => check_assets(&config, catalog),
        NavCommand::Replay(replay) => run_replay(config, catalog, replay),
    }
}

///
/// Loads every asset the configuration names and prints what was found.
/// Fails if any of them cannot be used.
///
fn check_assets(config: &NavConfig, catalog: Option<AssetCatalog>) -> Result<(), Box<dyn Error>> {
    let Some(mut catalog) = catalog else {
        return Err("check-assets needs --assets".into());
    };

    let mut missing = 0;
    for asset in config.assets() {
        match catalog.load(asset) {
            Ok(info) => println!(
                "{:<12} ok      {} Hz, {} ch, {:.2} s",
                asset, info.sample_rate, info.channels, info.duration_secs
            ),
            Err(e) => {
                println!("{:<12} MISSING {}", asset, e);
                missing += 1;
            }
        }
    }

    if missing > 0 {
        return Err(format!("{} cue asset(s) unavailable", missing).into());
    }
    Ok(())
}

fn run_replay(
    config: NavConfig,
    catalog: Option<AssetCatalog>,
    replay: ReplayCommand,
) -> Result<(), Box<dyn Error>> {
    let waypoints = load_route(&replay.route)?;
    let track = parse_track(&fs::read_to_string(&replay.track)?)?;
    info!(
        "replaying {} readings over {} waypoints",
        track.len(),
        waypoints.len()
    );

    if let Some(path) = &replay.route_out {
        write_route(&mut File::create(path)?, &waypoints)?;
    }

    let sink: Box<dyn SampleSink + Send> = match &replay.samples {
        Some(path) => Box::new(RonTrackLog::create(path)?),
        None => Box::new(DiscardSink),
    };

    // engine commands -> mirror -> stdout
    let (engine_tx, engine_rx) = channel::<EngineCommand>();
    let (mirror_tx, mirror_rx) = channel::<String>();
    let mirror_thread = run_component(Box::new(SceneMirror::new()), engine_rx, mirror_tx);
    let printer_thread = thread::spawn(move || {
        for line in mirror_rx {
            println!("engine: {}", line);
        }
    });

    let mut session = NavigationSession::new(config, DispatchEngine::new(engine_tx, catalog), sink);

    let (input_tx, input_rx) = channel::<SessionInput>();
    let mut companion = None;
    if replay.companion {
        let settings = CompanionSettings {
            speed: replay.companion_speed,
            jitter: replay.companion_jitter,
            ..CompanionSettings::default()
        };
        let walker = SimulatedCompanion::spawn(waypoints.clone(), settings, input_tx.clone());
        session.set_reference_control(Box::new(walker.control()));
        companion = Some(walker);
    }
    let reference = companion.as_ref().and(waypoints.first().copied());

    let (update_tx, update_rx) = channel();
    let session_thread = run_component(Box::new(session), input_rx, update_tx);
    let report_thread = spawn_reporter(update_rx);

    if input_tx
        .send(SessionInput::Start {
            waypoints,
            reference,
        })
        .is_err()
    {
        return Err("navigation session stopped before start".into());
    }

    let mut last_timestamp = None;
    for entry in track {
        if let Some(ts) = entry.timestamp() {
            if let Some(prev) = last_timestamp {
                pace(ts - prev, replay.pace);
            }
            last_timestamp = Some(ts);
        }
        if input_tx.send(entry.into()).is_err() {
            warn!("navigation session stopped early");
            break;
        }
    }

    // the companion holds a sender too, so it must go before the session can
    // finish draining
    if let Some(mut walker) = companion.take() {
        walker.stop();
    }
    let _ = input_tx.send(SessionInput::End);
    drop(input_tx);

    join("session", session_thread)?;
    join("reporter", report_thread)?;
    join("mirror", mirror_thread)?;
    join("printer", printer_thread)?;
    Ok(())
}

/// Sleeps for a recorded gap, scaled by the replay pace.
fn pace(gap_secs: f64, pace: f64) {
    if let Some(wait) = pace_delay(gap_secs, pace) {
        spin_sleep::sleep(wait);
    }
}

/// How long to wait for a recorded gap at the given pace. None when there is
/// nothing to wait for or the scaled gap does not fit in a Duration.
fn pace_delay(gap_secs: f64, pace: f64) -> Option<Duration> {
    if pace <= 0.0 || !gap_secs.is_finite() || gap_secs <= 0.0 {
        return None;
    }
    match Duration::try_from_secs_f64(gap_secs / pace) {
        Ok(wait) => Some(wait),
        Err(e) => {
            warn!("not pacing a {:.3} s gap: {}", gap_secs, e);
            None
        }
    }
}

///
/// Prints session events as they come back and the mean speed once the
/// session is done.
///
fn spawn_reporter(
    updates: Receiver<Result<Update, NavError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut average = None;
        for update in updates {
            match update {
                Ok(update) => {
                    for event in &update.events {
                        println!("event:  {:?}", event);
                    }
                    for problem in &update.degraded {
                        warn!("{}", problem);
                    }
                    if update.average_speed.is_some() {
                        average = update.average_speed;
                    }
                }
                Err(e) => warn!("session refused input: {}", e),
            }
        }
        match average {
            Some(avg) => println!("average speed: {:.2} m/s", avg),
            None => println!("average speed: no samples"),
        }
    })
}

fn join(name: &str, handle: JoinHandle<()>) -> Result<(), Box<dyn Error>> {
    handle
        .join()
        .map_err(|_| format!("{} thread panicked", name).into())
}
