//! Synthesis of stamped position records from sampled coordinates
//!
//! Every sample becomes one [`PositionRecord`]. Records carry the reported speed, a
//! fixed accuracy, a timestamp taken from the synthesizer's clock and, except for the
//! last record of a batch, the heading towards the next sample.

use crate::{GeometryEngine, ReplayConfig};
use geo::Point;
#[cfg(feature = "serde")]
use serde::Serialize;

/// Horizontal accuracy reported by every replayed location, in meters
pub const LOCATION_ACCURACY_METERS: f32 = 3.0;

/// Provider tag identifying replayed locations
pub const REPLAY_PROVIDER: &str = "route-replay";

/// A simulated positioning report
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PositionRecord {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Direction of travel in degrees within [0, 360), unset on the last record of a batch
    pub heading: Option<f32>,
    /// Speed in meters per second
    pub speed_mps: f32,
    /// Horizontal accuracy in meters
    pub accuracy_meters: f32,
    /// Milliseconds since the Unix epoch
    pub timestamp_millis: i64,
    pub provider: &'static str,
}

impl PositionRecord {
    /// Position as a geo point (x = longitude, y = latitude)
    #[inline]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Narrow a bearing to the record's heading, keeping it within [0, 360)
///
/// Bearings just below 360 round up to exactly 360.0 in `f32`.
fn heading_degrees(bearing: f64) -> f32 {
    let heading = bearing as f32;
    if heading >= 360.0 { 0.0 } else { heading }
}

/// Turns coordinate sequences into position records, owning the replay clock
///
/// The clock only moves forward as records are produced, unless explicitly reset.
#[derive(Debug, Clone, Default)]
pub struct LocationSynthesizer {
    clock_millis: i64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl LocationSynthesizer {
    /// Create a synthesizer whose clock starts at `clock_millis`
    pub fn new(clock_millis: i64) -> Self {
        Self { clock_millis }
    }

    /// Timestamp the next record will carry
    #[inline]
    pub fn clock(&self) -> i64 {
        self.clock_millis
    }

    pub fn reset(&mut self, clock_millis: i64) {
        self.clock_millis = clock_millis;
    }

    /// Stamp `points` in order, advancing the clock by the configured delay per record
    pub fn synthesize<G: GeometryEngine>(
        &mut self,
        points: &[Point<f64>],
        config: &ReplayConfig,
        geometry: &G,
    ) -> Vec<PositionRecord> {
        let speed_mps = config.speed_mps();
        let delay_millis = config.delay_millis();

        points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let heading = points
                    .get(i + 1)
                    .map(|next| heading_degrees(geometry.bearing(*point, *next)));
                let record = PositionRecord {
                    latitude: point.y(),
                    longitude: point.x(),
                    heading,
                    speed_mps,
                    accuracy_meters: LOCATION_ACCURACY_METERS,
                    timestamp_millis: self.clock_millis,
                    provider: REPLAY_PROVIDER,
                };
                self.clock_millis = self.clock_millis.saturating_add(delay_millis);
                record
            })
            .collect()
    }
}
