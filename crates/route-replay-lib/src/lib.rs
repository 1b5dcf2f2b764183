//! Route Replay Library - Mock Location Synthesis Along Planned Routes
//!
//! This library turns a planned route (legs made of steps, each step carrying an
//! encoded path geometry) into a time-ordered stream of simulated positioning
//! reports. It lets code that consumes live location updates be exercised
//! deterministically without a physical sensor.
//!
//! # Architecture
//!
//! - **[`Route`]**: Immutable leg/step hierarchy with encoded step geometries
//! - **[`GeometryEngine`]**: Length, interpolation and bearing primitives ([`HaversineGeometry`],
//!   or [`PlanarGeometry`] for deterministic tests)
//! - **[`PathDecoder`]**: Encoded geometry to coordinate path ([`PolylineDecoder`])
//! - **[`ReplayConfig`]**: Frozen sampling spacing plus live speed and delay
//! - **[`RouteCursor`]**: Traversal position through the route hierarchy
//! - **[`RouteSlicer`]**: Evenly spaced samples along one step's path
//! - **[`LocationSynthesizer`]**: Stamps samples with heading, speed, accuracy and time
//! - **[`ReplayConverter`]**: Orchestrator producing one step's records per call
//!
//! # Example
//!
//! ```no_run
//! use route_replay_lib::{Leg, ReplayConverter, Route, Step};
//!
//! let route = Route::new(vec![Leg::new(vec![Step::new("_p~iF~ps|U_ulLnnqC", 5)])])?;
//! let mut converter = ReplayConverter::new(route, 35, 1)?;
//! converter.reset_clock_to_now();
//! while let Some(records) = converter.produce_next()? {
//!     for record in records {
//!         println!("{} {}", record.latitude, record.longitude);
//!     }
//! }
//! # Ok::<(), route_replay_lib::ReplayError>(())
//! ```

mod config;
mod converter;
mod cursor;
mod decoder;
pub mod geometry;
mod route;
mod slicer;
mod synthesizer;

// Public API exports
pub use config::{ReplayConfig, sampling_spacing};
pub use converter::ReplayConverter;
pub use cursor::RouteCursor;
pub use decoder::{MAX_PRECISION, PathDecoder, PolylineDecoder};
pub use geometry::{GeometryEngine, HaversineGeometry, PlanarGeometry};
pub use route::{DEFAULT_PRECISION, Leg, Route, Step};
pub use slicer::RouteSlicer;
pub use synthesizer::{
    LOCATION_ACCURACY_METERS, LocationSynthesizer, PositionRecord, REPLAY_PROVIDER,
};

/// Default replay speed in km/h
pub const DEFAULT_SPEED_KMH: u32 = 30;

/// Default delay between two reported locations, in seconds
pub const DEFAULT_DELAY_SECS: u32 = 1;

/// Error types for route replay
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Invalid route: {reason}")]
    InvalidRoute { reason: String },

    #[error("Failed to decode geometry of leg {leg}, step {step}: {message}")]
    Decode {
        leg: usize,
        step: usize,
        message: String,
    },

    #[error(
        "Invalid configuration: speed {speed_kmh} km/h with delay {delay_secs} s gives no sampling distance"
    )]
    InvalidConfiguration { speed_kmh: u32, delay_secs: u32 },
}

pub type Result<T> = std::result::Result<T, ReplayError>;
