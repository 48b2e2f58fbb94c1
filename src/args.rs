// Commandline argument parser using clap for EchoSpray

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct SprayArgs {
    #[command(subcommand, long_about)]
    /// Where position fixes come from, a simulated walk or a recorded trace
    pub feed: FeedCommand,

    /// Path of the pin field file, in ron format
    #[arg(short = 'p', long = "pins", default_value = "pins.ron")]
    pub pin_file: String,

    /// Radius within which pins are tracked at all, in meters
    #[arg(long = "tracking", default_value_t = 200.0)]
    pub tracking_radius_m: f64,

    /// Radius within which the closest tracked pin locks, in meters
    #[arg(long = "lock", default_value_t = 12.0)]
    pub lock_radius_m: f64,

    /// Render alert cues into this WAV file instead of logging them
    #[arg(short = 'o', long = "out")]
    pub outfile: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum FeedCommand {
    /// Feed the engine from a simulated walk
    #[command(about)]
    Simulate(SimulateCommand),

    /// Feed the engine from a recorded trace of $FIX sentences
    #[command(about)]
    Replay(ReplayCommand),
}

#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct SimulateCommand {
    /// Starting latitude of the walk, in degrees
    #[arg(long = "lat", default_value_t = 37.7749, allow_hyphen_values = true)]
    pub latitude: f64,

    /// Starting longitude of the walk, in degrees
    #[arg(long = "lon", default_value_t = -122.4194, allow_hyphen_values = true)]
    pub longitude: f64,

    /// Walking speed, in meters per second
    #[arg(short = 's', long = "speed", default_value_t = 1.4)]
    pub speed_mps: f64,

    /// Compass heading of the walk, in degrees
    #[arg(long = "heading", default_value_t = 0.0)]
    pub heading_deg: f64,

    /// Position jitter applied to each fix, in meters
    #[arg(short = 'j', long = "jitter", default_value_t = 0.0)]
    pub jitter_m: f64,

    /// How long to walk before exiting, in seconds
    #[arg(short = 'd', long = "duration", default_value_t = 60.0)]
    pub duration_s: f64,
}

#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct ReplayCommand {
    /// File of $FIX sentences, one per line; "-" reads stdin
    #[arg(short = 'f', long = "file", default_value = "-")]
    pub fix_file: String,

    /// Seconds to dwell on each replayed fix
    #[arg(long = "tick", default_value_t = 1.0)]
    pub tick_s: f64,
}
