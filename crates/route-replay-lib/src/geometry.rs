//! Geometry primitives used to sample and orient replayed locations
//!
//! The replay core only needs three operations on paths: total length, a point at a
//! given distance along the path, and the bearing between two points. They are
//! grouped in the [`GeometryEngine`] trait so a deterministic engine can stand in
//! for the spherical one in tests.

use geo::{Bearing, Distance, Euclidean, Haversine, InterpolatePoint, LineString, Point};

/// Length, interpolation and bearing on coordinate paths
///
/// Points use `x` for longitude and `y` for latitude, in degrees.
pub trait GeometryEngine {
    /// Total length of the path in meters
    fn path_length(&self, path: &LineString<f64>) -> f64;

    /// Point at `distance` meters from the start of the path
    ///
    /// Distances below zero clamp to the first point and distances past the end
    /// clamp to the last one. Returns `None` for an empty path.
    fn interpolate_at(&self, path: &LineString<f64>, distance: f64) -> Option<Point<f64>>;

    /// Compass direction from `from` to `to` in degrees, within [0, 360)
    fn bearing(&self, from: Point<f64>, to: Point<f64>) -> f64;
}

/// Great-circle geometry on a spherical Earth
#[derive(Clone, Copy, Debug, Default)]
pub struct HaversineGeometry;

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl GeometryEngine for HaversineGeometry {
    fn path_length(&self, path: &LineString<f64>) -> f64 {
        path.lines()
            .map(|line| Haversine.distance(line.start_point(), line.end_point()))
            .sum()
    }

    fn interpolate_at(&self, path: &LineString<f64>, distance: f64) -> Option<Point<f64>> {
        walk_along(
            path,
            distance,
            |start, end| Haversine.distance(start, end),
            |start, end, offset| Haversine.point_at_distance_between(start, end, offset),
        )
    }

    #[inline]
    fn bearing(&self, from: Point<f64>, to: Point<f64>) -> f64 {
        wrap_degrees(Haversine.bearing(from, to))
    }
}

/// Flat geometry where coordinates are plain meters
///
/// Lengths and interpolations are exact, which makes sample counts and headings
/// predictable. Bearings follow the compass convention: 0 along +y, 90 along +x.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlanarGeometry;

impl GeometryEngine for PlanarGeometry {
    fn path_length(&self, path: &LineString<f64>) -> f64 {
        path.lines()
            .map(|line| Euclidean.distance(line.start_point(), line.end_point()))
            .sum()
    }

    fn interpolate_at(&self, path: &LineString<f64>, distance: f64) -> Option<Point<f64>> {
        walk_along(
            path,
            distance,
            |start, end| Euclidean.distance(start, end),
            |start, end, offset| {
                let length = Euclidean.distance(start, end);
                if length <= 0.0 {
                    return start;
                }
                start + (end - start) * (offset / length)
            },
        )
    }

    fn bearing(&self, from: Point<f64>, to: Point<f64>) -> f64 {
        let delta = to - from;
        wrap_degrees(delta.x().atan2(delta.y()).to_degrees())
    }
}

/// Bring an angle in degrees into [0, 360)
///
/// `rem_euclid` alone yields exactly 360.0 for tiny negative inputs.
pub(crate) fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Walk `path` segment by segment until `distance` is reached
fn walk_along(
    path: &LineString<f64>,
    distance: f64,
    segment_length: impl Fn(Point<f64>, Point<f64>) -> f64,
    point_between: impl Fn(Point<f64>, Point<f64>, f64) -> Point<f64>,
) -> Option<Point<f64>> {
    let first = path.points().next()?;
    if distance <= 0.0 {
        return Some(first);
    }

    let mut travelled = 0.0;
    for line in path.lines() {
        let (start, end) = (line.start_point(), line.end_point());
        let segment = segment_length(start, end);
        if travelled + segment >= distance {
            return Some(point_between(start, end, distance - travelled));
        }
        travelled += segment;
    }

    path.points().last()
}
