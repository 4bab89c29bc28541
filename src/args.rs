// Commandline argument parser using clap for SoundNav

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct NavArgs {
    #[command(subcommand, long_about)]
    /// Which task to perform, replaying a recorded walk or checking assets
    pub command: NavCommand,

    /// RON file with thresholds and cue assets. Defaults are used when absent
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the cue WAV files. Without it, assets are not checked
    #[arg(short = 'a', long = "assets", global = true)]
    pub assets: Option<PathBuf>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum NavCommand {
    /// Feed a recorded track through a navigation session
    #[command(about)]
    Replay(ReplayCommand),

    /// Load every configured cue asset and report what is missing
    #[command(about)]
    CheckAssets,
}

#[derive(Debug, Args, Clone)]
#[command(about)]
pub struct ReplayCommand {
    /// Route file, a RON list of (lat, lon) waypoints
    #[arg(short = 'r', long = "route")]
    pub route: PathBuf,

    /// Track file with FIX and HDG lines
    #[arg(short = 't', long = "track")]
    pub track: PathBuf,

    /// Where recorded samples are written, one RON row per line
    #[arg(short = 's', long = "samples")]
    pub samples: Option<PathBuf>,

    /// Where the indexed route is written
    #[arg(long = "route-out")]
    pub route_out: Option<PathBuf>,

    /// Walk a simulated companion along the route as the reference
    #[arg(long)]
    pub companion: bool,

    /// Companion walking speed, in meters per second
    #[arg(long = "companion-speed", default_value_t = 1.4)]
    pub companion_speed: f64,

    /// Largest random offset, in meters, added to each companion position
    #[arg(long = "companion-jitter", default_value_t = 0.0)]
    pub companion_jitter: f64,

    /// Replay speed relative to the recorded timestamps. 0 replays as fast
    /// as possible
    #[arg(short = 'p', long = "pace", default_value_t = 0.0)]
    pub pace: f64,
}
