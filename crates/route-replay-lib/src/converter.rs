//! ReplayConverter - Step-by-step conversion of a route into mock locations
//!
//! This module provides the high-level API: it owns the route, the replay
//! configuration, the traversal cursor and the clock, and produces the position
//! records of exactly one route step per call.

use crate::{
    GeometryEngine, HaversineGeometry, LocationSynthesizer, PathDecoder, PolylineDecoder,
    PositionRecord, ReplayConfig, ReplayError, Result, Route, RouteCursor, RouteSlicer,
};
use std::time::{SystemTime, UNIX_EPOCH};

/// Converts a route into simulated positioning reports, one step at a time
///
/// The converter is meant to be driven by a single external caller (a timer, a
/// scheduler task, a test) that invokes [`ReplayConverter::produce_next`] once per
/// tick. Sharing it between threads requires external synchronization.
#[derive(Debug, Clone)]
pub struct ReplayConverter<G: GeometryEngine = HaversineGeometry, D: PathDecoder = PolylineDecoder>
{
    /// Route being replayed
    route: Route,
    /// Frozen spacing plus live speed and delay
    config: ReplayConfig,
    /// Next step to replay
    cursor: RouteCursor,
    /// Owner of the replay clock
    synthesizer: LocationSynthesizer,
    geometry: G,
    decoder: D,
}

impl ReplayConverter {
    /// Create a converter using great-circle geometry and polyline decoding
    ///
    /// # Arguments
    /// * `route` - Route to replay, must have at least one leg and no empty leg
    /// * `speed_kmh` - Initial speed, also freezes the sampling spacing
    /// * `delay_secs` - Initial delay between records, also freezes the sampling spacing
    pub fn new(route: Route, speed_kmh: u32, delay_secs: u32) -> Result<Self> {
        Self::with_engines(route, speed_kmh, delay_secs, HaversineGeometry, PolylineDecoder)
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<G: GeometryEngine, D: PathDecoder> ReplayConverter<G, D> {
    /// Create a converter with custom geometry and decoding collaborators
    ///
    /// Fails with [`ReplayError::InvalidRoute`] for an empty route or leg, and with
    /// [`ReplayError::InvalidConfiguration`] when speed or delay is zero.
    pub fn with_engines(
        route: Route,
        speed_kmh: u32,
        delay_secs: u32,
        geometry: G,
        decoder: D,
    ) -> Result<Self> {
        #[cfg(feature = "profiling")]
        profiling::scope!("converter::new");

        route.validate()?;
        let config = ReplayConfig::new(speed_kmh, delay_secs)?;
        tracing::info!(
            "Replaying route with {} legs and {} steps at {} km/h every {} s ({:.2} m between samples)",
            route.leg_count(),
            route.total_steps(),
            speed_kmh,
            delay_secs,
            config.sampling_spacing()
        );

        Ok(Self {
            route,
            config,
            cursor: RouteCursor::new(),
            synthesizer: LocationSynthesizer::default(),
            geometry,
            decoder,
        })
    }

    /// Change the reported speed of subsequent records
    ///
    /// The sampling spacing stays the one computed at construction.
    pub fn update_speed(&mut self, speed_kmh: u32) {
        self.config.set_speed_kmh(speed_kmh);
    }

    /// Change the clock increment of subsequent records
    ///
    /// The sampling spacing stays the one computed at construction.
    pub fn update_delay(&mut self, delay_secs: u32) {
        self.config.set_delay_secs(delay_secs);
    }

    /// Set the timestamp of the next record, in milliseconds since the Unix epoch
    pub fn reset_clock(&mut self, timestamp_millis: i64) {
        tracing::info!("Replay clock reset to {timestamp_millis} ms");
        self.synthesizer.reset(timestamp_millis);
    }

    /// Set the clock to the current wall time
    pub fn reset_clock_to_now(&mut self) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX));
        self.reset_clock(now);
    }

    /// Produce the records of the step under the cursor, then move to the next step
    ///
    /// # Returns
    /// * `Ok(Some(records))` - records of one step, possibly empty for a zero-length step
    /// * `Ok(None)` - every step has already been replayed
    /// * `Err(ReplayError::Decode)` - the step geometry is malformed; neither the cursor
    ///   nor the clock moved, so the call can be retried or the replay aborted
    pub fn produce_next(&mut self) -> Result<Option<Vec<PositionRecord>>> {
        let Some((leg, step_index)) = self.cursor.position() else {
            tracing::debug!("Route fully replayed, no more locations");
            return Ok(None);
        };
        let step = self
            .route
            .step(leg, step_index)
            .ok_or_else(|| ReplayError::InvalidRoute {
                reason: format!("no step {step_index} in leg {leg}"),
            })?;

        let path = self.decoder.decode(step, leg, step_index)?;
        let points = RouteSlicer::new(&self.geometry, &self.config).slice(&path);
        if points.is_empty() {
            tracing::warn!("Leg {leg}, step {step_index} has no length, skipping it");
        }

        let records = self
            .synthesizer
            .synthesize(&points, &self.config, &self.geometry);
        self.cursor.advance(&self.route);

        tracing::debug!(
            "Produced {} locations for leg {leg}, step {step_index}",
            records.len()
        );
        Ok(Some(records))
    }

    /// True iff the route has more than one leg
    #[inline]
    pub fn is_multi_leg_route(&self) -> bool {
        RouteCursor::is_multi_leg(&self.route)
    }

    /// True once every step has been replayed
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted()
    }

    /// Number of steps not replayed yet
    pub fn remaining_steps(&self) -> usize {
        match self.cursor.position() {
            Some((leg, step)) => {
                let consumed: usize = self.route.legs()[..leg]
                    .iter()
                    .map(|l| l.steps.len())
                    .sum::<usize>()
                    + step;
                self.route.total_steps() - consumed
            }
            None => 0,
        }
    }

    /// Timestamp the next record will carry
    #[inline]
    pub fn clock(&self) -> i64 {
        self.synthesizer.clock()
    }

    #[inline]
    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    #[inline]
    pub fn cursor(&self) -> RouteCursor {
        self.cursor
    }

    #[inline]
    pub fn route(&self) -> &Route {
        &self.route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Leg, PlanarGeometry, Step};
    use geo::{LineString, line_string};
    use std::cell::Cell;
    use std::collections::HashMap;

    /// Looks geometries up by name, failing for unknown ones
    #[derive(Default)]
    struct MapDecoder {
        paths: HashMap<String, LineString<f64>>,
        failures_left: Cell<usize>,
    }

    impl MapDecoder {
        fn with(mut self, name: &str, path: LineString<f64>) -> Self {
            self.paths.insert(name.to_string(), path);
            self
        }
    }

    impl PathDecoder for MapDecoder {
        fn decode(&self, step: &Step, leg: usize, step_index: usize) -> Result<LineString<f64>> {
            let failures = self.failures_left.get();
            if failures > 0 {
                self.failures_left.set(failures - 1);
            } else if let Some(path) = self.paths.get(&step.geometry) {
                return Ok(path.clone());
            }
            Err(ReplayError::Decode {
                leg,
                step: step_index,
                message: format!("unknown geometry {}", step.geometry),
            })
        }
    }

    fn step(name: &str) -> Step {
        Step::new(name, 6)
    }

    /// Paths of 30 m, 20 m, 0 m and 50 m
    fn test_decoder() -> MapDecoder {
        MapDecoder::default()
            .with("east30", line_string![(x: 0.0, y: 0.0), (x: 30.0, y: 0.0)])
            .with("north20", line_string![(x: 30.0, y: 0.0), (x: 30.0, y: 20.0)])
            .with("still", line_string![(x: 30.0, y: 20.0), (x: 30.0, y: 20.0)])
            .with("west50", line_string![(x: 30.0, y: 20.0), (x: -20.0, y: 20.0)])
    }

    fn test_route() -> Route {
        Route::new(vec![
            Leg::new(vec![step("east30"), step("north20")]),
            Leg::new(vec![step("still"), step("west50")]),
        ])
        .unwrap()
    }

    // 36 km/h with a 1 s delay gives 10 m between samples
    fn test_converter() -> ReplayConverter<PlanarGeometry, MapDecoder> {
        ReplayConverter::with_engines(test_route(), 36, 1, PlanarGeometry, test_decoder()).unwrap()
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_invalid_route_rejected() {
        // Deserialized routes skip the checks of Route::new
        let no_legs: Route = serde_json::from_str(r#"{"legs":[]}"#).unwrap();
        let result = ReplayConverter::new(no_legs, 30, 1);
        assert!(matches!(result, Err(ReplayError::InvalidRoute { .. })));

        let empty_leg: Route =
            serde_json::from_str(r#"{"legs":[{"steps":[{"geometry":"??"}]},{"steps":[]}]}"#)
                .unwrap();
        let result = ReplayConverter::new(empty_leg, 30, 1);
        assert!(matches!(result, Err(ReplayError::InvalidRoute { .. })));
    }

    #[test]
    fn test_zero_spacing_rejected() {
        let result = ReplayConverter::new(test_route(), 0, 1);
        assert!(matches!(
            result,
            Err(ReplayError::InvalidConfiguration { .. })
        ));
        let result = ReplayConverter::new(test_route(), 30, 0);
        assert!(matches!(
            result,
            Err(ReplayError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_multi_leg_route() {
        assert!(test_converter().is_multi_leg_route());

        let single = Route::new(vec![Leg::new(vec![step("east30"), step("north20")])]).unwrap();
        let converter =
            ReplayConverter::with_engines(single, 36, 1, PlanarGeometry, test_decoder()).unwrap();
        assert!(!converter.is_multi_leg_route());
    }

    #[test]
    fn test_visits_each_step_once_then_ends() {
        let mut converter = test_converter();
        assert_eq!(converter.remaining_steps(), 4);

        let mut counts = Vec::new();
        while let Some(records) = converter.produce_next().unwrap() {
            counts.push(records.len());
        }

        // 30 m -> 3 samples, 20 m -> 2, 0 m -> none, 50 m -> 5
        assert_eq!(counts, vec![3, 2, 0, 5]);
        assert!(converter.is_exhausted());
        assert_eq!(converter.remaining_steps(), 0);
        assert!(converter.produce_next().unwrap().is_none());
    }

    #[test]
    fn test_records_follow_step_geometry() {
        let mut converter = test_converter();
        let first = converter.produce_next().unwrap().unwrap();
        assert_eq!(first.len(), 3);
        for (record, x) in first.iter().zip([0.0, 10.0, 20.0]) {
            assert!((record.longitude - x).abs() < 1e-9);
            assert_eq!(record.latitude, 0.0);
        }
        assert_eq!(first[0].heading, Some(90.0));
        assert_eq!(first[1].heading, Some(90.0));
        assert_eq!(first[2].heading, None);

        let second = converter.produce_next().unwrap().unwrap();
        assert_eq!(second[0].point(), geo::Point::new(30.0, 0.0));
        assert_eq!(second[0].heading, Some(0.0));
    }

    #[test]
    fn test_zero_length_step_advances_cursor() {
        let mut converter = test_converter();
        converter.produce_next().unwrap();
        converter.produce_next().unwrap();
        assert_eq!(converter.cursor().position(), Some((1, 0)));

        let clock = converter.clock();
        let still = converter.produce_next().unwrap().unwrap();
        assert!(still.is_empty());
        assert_eq!(converter.clock(), clock);
        assert_eq!(converter.cursor().position(), Some((1, 1)));
    }

    #[test]
    fn test_timestamps_continue_across_steps() {
        let mut converter = test_converter();
        converter.reset_clock(10_000);

        let mut timestamps = Vec::new();
        while let Some(records) = converter.produce_next().unwrap() {
            timestamps.extend(records.iter().map(|r| r.timestamp_millis));
        }

        let expected: Vec<i64> = (0..10).map(|i| 10_000 + i * 1000).collect();
        assert_eq!(timestamps, expected);
        assert_eq!(converter.clock(), 20_000);
    }

    #[test]
    fn test_decode_failure_keeps_state() {
        let decoder = test_decoder();
        decoder.failures_left.set(1);
        let mut converter =
            ReplayConverter::with_engines(test_route(), 36, 1, PlanarGeometry, decoder).unwrap();
        converter.reset_clock(5_000);

        match converter.produce_next() {
            Err(ReplayError::Decode { leg, step, .. }) => assert_eq!((leg, step), (0, 0)),
            other => panic!("expected decode error, got {other:?}"),
        }
        assert_eq!(converter.cursor().position(), Some((0, 0)));
        assert_eq!(converter.clock(), 5_000);

        // Retrying the same step succeeds
        let records = converter.produce_next().unwrap().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].timestamp_millis, 5_000);
        assert_eq!(converter.cursor().position(), Some((0, 1)));
    }

    #[test]
    fn test_out_of_range_precision_is_recoverable() {
        let route = Route::new(vec![Leg::new(vec![
            Step::new("_p~iF~ps|U_ulLnnqC", 10),
            Step::new("_p~iF~ps|U_ulLnnqC", 5),
        ])])
        .unwrap();
        let mut converter = ReplayConverter::new(route, 120, 60).unwrap();

        assert!(matches!(
            converter.produce_next(),
            Err(ReplayError::Decode { leg: 0, step: 0, .. })
        ));
        assert_eq!(converter.cursor().position(), Some((0, 0)));
        assert_eq!(converter.clock(), 0);
    }

    #[test]
    fn test_update_speed_keeps_spacing() {
        let mut converter = test_converter();
        converter.update_speed(72);

        let records = converter.produce_next().unwrap().unwrap();
        // Still 10 m between samples even though 72 km/h would give 20 m
        assert_eq!(records.len(), 3);
        assert!((converter.config().sampling_spacing() - 10.0).abs() < 1e-9);
        assert!(records.iter().all(|r| (r.speed_mps - 20.0).abs() < 1e-6));
    }

    #[test]
    fn test_update_delay_changes_timestamps_only() {
        let mut converter = test_converter();
        converter.update_delay(5);

        let records = converter.produce_next().unwrap().unwrap();
        assert_eq!(records.len(), 3);
        let timestamps: Vec<_> = records.iter().map(|r| r.timestamp_millis).collect();
        assert_eq!(timestamps, vec![0, 5_000, 10_000]);
    }

    #[test]
    fn test_reset_clock_to_now() {
        let mut converter = test_converter();
        converter.reset_clock_to_now();
        // Any wall clock after 2020-01-01
        assert!(converter.clock() > 1_577_836_800_000);
    }

    #[test]
    fn test_polyline_route_end_to_end() {
        // Three points in the western US, roughly 250 km and 600 km apart
        let route = Route::new(vec![Leg::new(vec![Step::new(
            "_p~iF~ps|U_ulLnnqC_mqNvxq`@",
            5,
        )])])
        .unwrap();
        // 120 km/h every minute: 2 km between samples
        let mut converter = ReplayConverter::new(route, 120, 60).unwrap();
        assert!((converter.config().sampling_spacing() - 2000.0).abs() < 1e-9);

        let path = PolylineDecoder
            .decode(converter.route().step(0, 0).unwrap(), 0, 0)
            .unwrap();
        let length = HaversineGeometry.path_length(&path);

        let records = converter.produce_next().unwrap().unwrap();
        assert_eq!(records.len(), (length / 2000.0).ceil() as usize);
        assert!((records[0].latitude - 38.5).abs() < 1e-9);
        assert!((records[0].longitude + 120.2).abs() < 1e-9);
        assert!(records[..records.len() - 1].iter().all(|r| r.heading.is_some()));
        assert!(records.last().is_some_and(|r| r.heading.is_none()));
        assert!(converter.produce_next().unwrap().is_none());
    }
}
