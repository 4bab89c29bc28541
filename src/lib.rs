//! SoundNav guides a walker along a route with spatialized sound. A looping
//! beacon sits on the next waypoint, a chime plays as each waypoint is
//! reached, and an arrival cue replaces the beacon at the destination. When a
//! reference position is supplied, usually a companion walking the same
//! route, a watchdog holds the reference back and sounds a warning whenever
//! the walker strays too far from it.
//!
//! The navigation core never renders audio itself. It drives an
//! [AudioEngine](audio_engine::AudioEngine) and records motion samples into
//! a [SampleSink](sample_aggregator::SampleSink), and everything that can
//! change session state goes through one
//! [NavigationSession](session::NavigationSession).

pub mod args;
pub mod audio_engine;
pub mod companion;
pub mod component;
pub mod config;
pub mod cue_director;
pub mod deviation;
pub mod error;
pub mod geometry;
pub mod listener;
pub mod replay;
pub mod route_progress;
pub mod sample_aggregator;
pub mod session;
pub mod track_log;
