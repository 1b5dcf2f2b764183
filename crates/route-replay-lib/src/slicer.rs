//! Even sampling of a step's path

use crate::{GeometryEngine, ReplayConfig};
use geo::{LineString, Point};

/// Cuts a path into points spaced by the frozen sampling distance
#[derive(Debug, Clone, Copy)]
pub struct RouteSlicer<'a, G: GeometryEngine> {
    geometry: &'a G,
    /// Always strictly positive, guaranteed by [`ReplayConfig::new`]
    spacing: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<'a, G: GeometryEngine> RouteSlicer<'a, G> {
    pub fn new(geometry: &'a G, config: &ReplayConfig) -> Self {
        Self {
            geometry,
            spacing: config.sampling_spacing(),
        }
    }

    #[inline]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Points at distances `0, s, 2s, ...` strictly below the path length
    ///
    /// The trailing partial interval is dropped, so the path end is only included when
    /// it falls on a multiple of the spacing. Zero-length paths give no points.
    pub fn slice(&self, path: &LineString<f64>) -> Vec<Point<f64>> {
        let length = self.geometry.path_length(path);
        if !(length > 0.0 && length.is_finite()) {
            return Vec::new();
        }

        let mut points = Vec::with_capacity((length / self.spacing).ceil() as usize);
        // Multiplying instead of accumulating keeps sample offsets free of drift
        let mut index = 0u32;
        loop {
            let distance = f64::from(index) * self.spacing;
            if distance >= length {
                break;
            }
            match self.geometry.interpolate_at(path, distance) {
                Some(point) => points.push(point),
                None => break,
            }
            index += 1;
        }
        points
    }
}
