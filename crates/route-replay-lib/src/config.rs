//! Replay configuration: sampling spacing, reported speed and reporting delay

use crate::{ReplayError, Result};

const ONE_KM_IN_METERS: f64 = 1000.0;
const ONE_HOUR_IN_SECONDS: f64 = 3600.0;
const ONE_SECOND_IN_MILLISECONDS: i64 = 1000;

/// Distance in meters travelled at `speed_kmh` during `delay_secs`
///
/// This is the fixed spatial interval between two consecutive samples. Zero speed or
/// zero delay yields zero spacing.
#[inline]
pub fn sampling_spacing(speed_kmh: u32, delay_secs: u32) -> f64 {
    f64::from(speed_kmh) * ONE_KM_IN_METERS / ONE_HOUR_IN_SECONDS * f64::from(delay_secs)
}

/// Configuration of a replay
///
/// The sampling spacing is computed once from the *initial* speed and delay and never
/// changes afterwards. Updating the speed or the delay only affects what the produced
/// records report (speed, timestamp increments), not how densely a path is sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayConfig {
    /// Frozen distance between samples, in meters
    sampling_spacing_m: f64,
    /// Reported speed in km/h
    speed_kmh: u32,
    /// Reported delay between records, in seconds
    delay_secs: u32,
}

impl ReplayConfig {
    /// Create a configuration and freeze its sampling spacing
    ///
    /// Fails with [`ReplayError::InvalidConfiguration`] when speed or delay is zero,
    /// since a path could never be walked with a zero spacing.
    pub fn new(speed_kmh: u32, delay_secs: u32) -> Result<Self> {
        let sampling_spacing_m = sampling_spacing(speed_kmh, delay_secs);
        if sampling_spacing_m <= 0.0 {
            return Err(ReplayError::InvalidConfiguration {
                speed_kmh,
                delay_secs,
            });
        }
        Ok(Self {
            sampling_spacing_m,
            speed_kmh,
            delay_secs,
        })
    }

    /// Distance between samples in meters, fixed at construction
    #[inline]
    pub fn sampling_spacing(&self) -> f64 {
        self.sampling_spacing_m
    }

    #[inline]
    pub fn speed_kmh(&self) -> u32 {
        self.speed_kmh
    }

    #[inline]
    pub fn delay_secs(&self) -> u32 {
        self.delay_secs
    }

    /// Reported speed in meters per second
    #[inline]
    pub fn speed_mps(&self) -> f32 {
        (f64::from(self.speed_kmh) * ONE_KM_IN_METERS / ONE_HOUR_IN_SECONDS) as f32
    }

    /// Clock increment between two records, in milliseconds
    #[inline]
    pub fn delay_millis(&self) -> i64 {
        i64::from(self.delay_secs) * ONE_SECOND_IN_MILLISECONDS
    }

    /// Replace the reported speed; the sampling spacing is left untouched
    pub fn set_speed_kmh(&mut self, speed_kmh: u32) {
        self.speed_kmh = speed_kmh;
    }

    /// Replace the reported delay; the sampling spacing is left untouched
    pub fn set_delay_secs(&mut self, delay_secs: u32) {
        self.delay_secs = delay_secs;
    }
}
