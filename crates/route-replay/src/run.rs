use crate::settings::Settings;
use route_replay_lib::{ReplayConverter, ReplayError, Route};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Cannot read route file {path}: {source}")]
    RouteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid route JSON: {0}")]
    RouteJson(#[from] serde_json::Error),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("Cannot write locations: {0}")]
    Output(#[from] std::io::Error),
}

/// Set up logging on stderr, filtered by `RUST_LOG` (default: info)
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_route(path: &Path) -> Result<Route, RunError> {
    let json = std::fs::read_to_string(path).map_err(|source| RunError::RouteFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_route(&json)
}

pub fn parse_route(json: &str) -> Result<Route, RunError> {
    let route: Route = serde_json::from_str(json)?;
    route.validate()?;
    Ok(route)
}

/// Replay the route from the settings, writing one JSON location per line to stdout
pub async fn native_main(settings: Settings) -> Result<(), RunError> {
    let route = load_route(&settings.route)?;
    tracing::info!("Loaded route from {}", settings.route.display());

    let mut converter = ReplayConverter::new(route, settings.speed, settings.delay)?;
    match settings.start_time {
        Some(start) => converter.reset_clock(start),
        None => converter.reset_clock_to_now(),
    }

    let mut out = std::io::stdout();
    let emitted = replay(&mut converter, &settings, &mut out).await?;
    tracing::info!("Replay finished after {emitted} locations");
    Ok(())
}

/// Drive `converter` one step per tick until the route ends or `max_steps` is reached
///
/// Returns the number of locations written.
pub async fn replay<W: Write>(
    converter: &mut ReplayConverter,
    settings: &Settings,
    out: &mut W,
) -> Result<usize, RunError> {
    let mut steps = 0;
    let mut emitted = 0;

    while settings.max_steps.is_none_or(|max| steps < max) {
        let Some(records) = converter.produce_next()? else {
            break;
        };
        let route_ended = converter.is_exhausted();
        for (i, record) in records.iter().enumerate() {
            serde_json::to_writer(&mut *out, record)?;
            writeln!(out)?;
            out.flush()?;
            emitted += 1;

            let last_of_route = route_ended && i + 1 == records.len();
            if settings.realtime && !last_of_route {
                let delay = converter.config().delay_secs();
                tokio::time::sleep(Duration::from_secs(u64::from(delay))).await;
            }
        }
        steps += 1;
        profiling::finish_frame!();
    }

    if converter.is_exhausted() {
        tracing::debug!("Route end reached");
    } else {
        tracing::info!(
            "Stopped with {} steps left to replay",
            converter.remaining_steps()
        );
    }
    Ok(emitted)
}
