//! Decoding of encoded step geometries into coordinate paths

use crate::{ReplayError, Result, Step};
use geo::LineString;

/// Highest precision whose scale factor (10^precision) the polyline codec can represent
pub const MAX_PRECISION: u32 = 9;

/// Turns a step's encoded geometry into an ordered coordinate path
pub trait PathDecoder {
    /// Decode the geometry of `step`
    ///
    /// `leg` and `step_index` only serve to locate the failure in the returned error.
    fn decode(&self, step: &Step, leg: usize, step_index: usize) -> Result<LineString<f64>>;
}

/// Decoder for Google encoded polylines, honoring each step's precision
#[derive(Clone, Copy, Debug, Default)]
pub struct PolylineDecoder;

impl PathDecoder for PolylineDecoder {
    fn decode(&self, step: &Step, leg: usize, step_index: usize) -> Result<LineString<f64>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("decoder::decode");
        if step.precision > MAX_PRECISION {
            return Err(ReplayError::Decode {
                leg,
                step: step_index,
                message: format!(
                    "precision {} exceeds the maximum of {MAX_PRECISION}",
                    step.precision
                ),
            });
        }
        polyline::decode_polyline(&step.geometry, step.precision).map_err(|e| {
            ReplayError::Decode {
                leg,
                step: step_index,
                message: e.to_string(),
            }
        })
    }
}
