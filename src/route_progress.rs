//! Owns the active route and paces progress along it.
//!
//! The tracker is a small state machine: `NotStarted` until a route is
//! assigned, `InProgress(i)` while the user heads for waypoint `i`, and
//! `Arrived` once they come within the waypoint radius of the destination.
//! Each fix can move it at most one step, and every step emits exactly one
//! [ProgressEvent].

use crate::error::NavError;
use crate::geometry::{distance, Coordinate, Meters};
use log::{debug, info};

/// An ordered list of waypoints, origin first and destination last.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    waypoints: Vec<Coordinate>,
}

impl Route {
    /// Builds a route, refusing anything shorter than origin + destination
    /// or containing coordinates outside the WGS84 ranges.
    pub fn new(waypoints: Vec<Coordinate>) -> Result<Self, NavError> {
        if waypoints.len() < 2 {
            return Err(NavError::InvalidRoute(format!(
                "need at least 2 waypoints, got {}",
                waypoints.len()
            )));
        }
        if let Some(i) = waypoints.iter().position(|c| !c.is_valid()) {
            return Err(NavError::InvalidRoute(format!(
                "waypoint {} is not a valid coordinate",
                i
            )));
        }
        Ok(Self { waypoints })
    }

    pub fn waypoints(&self) -> &[Coordinate] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false; kept alongside `len` for clippy.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Coordinate> {
        self.waypoints.get(index).copied()
    }

    pub fn destination(&self) -> Coordinate {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// Sum of the great-circle legs.
    pub fn length(&self) -> Meters {
        self.waypoints
            .windows(2)
            .map(|w| distance(&w[0], &w[1]))
            .sum()
    }
}

/// Where a session stands along its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    NotStarted,
    InProgress(usize),
    Arrived,
}

/// A discrete, exactly-once progress transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The user came within radius of this waypoint index.
    WaypointReached(usize),
    /// The user came within radius of the final waypoint.
    DestinationReached,
}

/// Drives [ProgressState] from incoming fixes.
#[derive(Debug, Clone)]
pub struct RouteTracker {
    route: Option<Route>,
    state: ProgressState,
    waypoint_radius: Meters,
}

impl RouteTracker {
    pub fn new(waypoint_radius: Meters) -> Self {
        Self {
            route: None,
            state: ProgressState::NotStarted,
            waypoint_radius,
        }
    }

    /// Assigns the route and moves to `InProgress(0)`. A tracker only ever
    /// navigates one route; start a new one for the next trip.
    pub fn start(&mut self, waypoints: Vec<Coordinate>) -> Result<(), NavError> {
        if self.state != ProgressState::NotStarted {
            return Err(NavError::AlreadyStarted);
        }
        let route = Route::new(waypoints)?;
        info!(
            "route assigned: {} waypoints, {:.0} m",
            route.len(),
            route.length()
        );
        self.route = Some(route);
        self.state = ProgressState::InProgress(0);
        Ok(())
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            ProgressState::InProgress(i) => Some(i),
            _ => None,
        }
    }

    /// The waypoint the user is currently heading for, if still navigating.
    pub fn target(&self) -> Option<Coordinate> {
        let index = self.current_index()?;
        self.route.as_ref()?.get(index)
    }

    pub fn is_arrived(&self) -> bool {
        self.state == ProgressState::Arrived
    }

    /// Evaluates one fix. Destination proximity is checked first and wins
    /// over waypoint advancement, so a fix yields at most one event.
    pub fn on_fix(&mut self, position: &Coordinate) -> Option<ProgressEvent> {
        let ProgressState::InProgress(index) = self.state else {
            return None;
        };
        let route = self.route.as_ref()?;

        let to_destination = distance(position, &route.destination());
        if to_destination <= self.waypoint_radius {
            info!("destination reached ({:.1} m away)", to_destination);
            self.state = ProgressState::Arrived;
            return Some(ProgressEvent::DestinationReached);
        }

        let to_target = distance(position, &route.get(index)?);
        if to_target <= self.waypoint_radius && index + 1 < route.len() {
            debug!("waypoint {} reached ({:.1} m away)", index, to_target);
            self.state = ProgressState::InProgress(index + 1);
            return Some(ProgressEvent::WaypointReached(index));
        }

        None
    }
}
