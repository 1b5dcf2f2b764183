use clap::Parser;
use route_replay_lib::{DEFAULT_DELAY_SECS, DEFAULT_SPEED_KMH};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Route Replay - Emit mock locations along a planned route as JSON lines
pub struct Settings {
    /// Route to replay, as Directions-style JSON (legs -> steps -> geometry)
    #[clap(short, long, value_name = "FILE")]
    pub route: PathBuf,

    /// Travel speed in km/h (also fixes the distance between samples)
    #[clap(short, long, default_value_t = DEFAULT_SPEED_KMH)]
    pub speed: u32,

    /// Seconds between two reported locations (also fixes the distance between samples)
    #[clap(short, long, default_value_t = DEFAULT_DELAY_SECS)]
    pub delay: u32,

    /// Timestamp of the first location in milliseconds since the Unix epoch (default: now)
    #[clap(long, value_name = "MILLIS")]
    pub start_time: Option<i64>,

    /// Wait `delay` seconds of wall time between emitted locations
    #[clap(long, default_value = "false")]
    pub realtime: bool,

    /// Stop after replaying this many route steps
    #[clap(long, value_name = "N")]
    pub max_steps: Option<usize>,
}

impl Settings {
    /// Parse settings from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }
}
