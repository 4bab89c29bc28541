//! A simulated companion that walks the planned route on its own thread and
//! publishes where it is. The session uses it as the reference position for
//! the deviation watchdog, and pauses it when the real listener falls
//! behind.

use crate::geometry::{distance, Coordinate, Meters};
use crate::session::SessionInput;

use log::{debug, info, warn};
use rand::prelude::*;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

/// Something that can hold the reference position in place and let it go
/// again.
pub trait ReferenceControl {
    fn pause(&mut self);
    fn resume(&mut self);
}

enum Signal {
    Pause,
    Resume,
    Stop,
}

/// Where a walker is along a route.
#[derive(Debug, Clone)]
pub struct RouteWalker {
    waypoints: Vec<Coordinate>,
    leg: usize,
    along_leg: Meters,
}

impl RouteWalker {
    pub fn new(waypoints: Vec<Coordinate>) -> Self {
        Self {
            waypoints,
            leg: 0,
            along_leg: 0.0,
        }
    }

    /// Current position, or `None` for an empty route.
    pub fn position(&self) -> Option<Coordinate> {
        let from = self.waypoints.get(self.leg)?;
        match self.waypoints.get(self.leg + 1) {
            Some(to) => {
                let leg_len = distance(from, to);
                if leg_len <= f64::EPSILON {
                    return Some(*from);
                }
                Some(from.lerp(to, self.along_leg / leg_len))
            }
            None => Some(*from),
        }
    }

    pub fn finished(&self) -> bool {
        self.leg + 1 >= self.waypoints.len()
    }

    /// Moves `step` meters forward, carrying over into following legs.
    pub fn advance(&mut self, mut step: Meters) {
        while step > 0.0 && !self.finished() {
            let leg_len = distance(&self.waypoints[self.leg], &self.waypoints[self.leg + 1]);
            let left = leg_len - self.along_leg;
            if step < left {
                self.along_leg += step;
                return;
            }
            step -= left;
            self.leg += 1;
            self.along_leg = 0.0;
        }
    }
}

/// Moves `position` by up to `jitter` meters north and east, independently.
fn jittered(position: Coordinate, jitter: Meters, rng: &mut impl Rng) -> Coordinate {
    if jitter.is_nan() || jitter <= 0.0 {
        return position;
    }
    let north = rng.gen_range(-jitter..jitter);
    let east = rng.gen_range(-jitter..jitter);
    position.offset(north, east)
}

/// Cloneable handle that forwards pause/resume to the companion thread.
#[derive(Clone)]
pub struct CompanionControl {
    tx: Sender<Signal>,
}

impl ReferenceControl for CompanionControl {
    fn pause(&mut self) {
        if self.tx.send(Signal::Pause).is_err() {
            warn!("companion already stopped, pause dropped");
        }
    }

    fn resume(&mut self) {
        if self.tx.send(Signal::Resume).is_err() {
            warn!("companion already stopped, resume dropped");
        }
    }
}

/// Settings for a [SimulatedCompanion].
#[derive(Debug, Clone, Copy)]
pub struct CompanionSettings {
    /// Walking speed in meters per second.
    pub speed: f64,
    /// Time between published positions.
    pub tick: Duration,
    /// Largest random offset, in meters, added to each published position.
    pub jitter: Meters,
}

impl Default for CompanionSettings {
    fn default() -> Self {
        Self {
            speed: 1.4,
            tick: Duration::from_millis(500),
            jitter: 0.0,
        }
    }
}

pub struct SimulatedCompanion {
    handle: Option<thread::JoinHandle<()>>,
    tx: Sender<Signal>,
}

impl SimulatedCompanion {
    /// Starts walking `waypoints` right away, sending each position to
    /// `out` as [SessionInput::Reference]. The thread stops on its own once
    /// `out` is closed.
    pub fn spawn(
        waypoints: Vec<Coordinate>,
        settings: CompanionSettings,
        out: Sender<SessionInput>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<Signal>();

        let handle = thread::spawn(move || {
            let mut walker = RouteWalker::new(waypoints);
            let mut rng = thread_rng();
            let mut paused = false;
            let mut running = true;

            while running {
                while let Ok(received) = rx.try_recv() {
                    match received {
                        Signal::Pause => paused = true,
                        Signal::Resume => paused = false,
                        Signal::Stop => running = false,
                    }
                }
                if !running {
                    break;
                }

                if !paused {
                    walker.advance(settings.speed * settings.tick.as_secs_f64());
                }
                let Some(position) = walker.position() else {
                    break;
                };
                let position = jittered(position, settings.jitter, &mut rng);

                debug!("companion at {} (paused={})", position, paused);
                if out.send(SessionInput::Reference(position)).is_err() {
                    break;
                }
                thread::sleep(settings.tick);
            }
            info!("companion stopped");
        });

        SimulatedCompanion {
            handle: Some(handle),
            tx,
        }
    }

    pub fn control(&self) -> CompanionControl {
        CompanionControl {
            tx: self.tx.clone(),
        }
    }

    /// Stops the thread and waits for it.
    pub fn stop(&mut self) {
        let _ = self.tx.send(Signal::Stop);
        if let Some(thread) = self.handle.take() {
            if thread.join().is_err() {
                warn!("companion thread panicked");
            }
        }
    }
}

impl Drop for SimulatedCompanion {
    fn drop(&mut self) {
        self.stop();
    }
}
