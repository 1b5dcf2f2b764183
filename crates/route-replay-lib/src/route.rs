//! Route model module
//!
//! This module provides the immutable `Route` hierarchy: ordered legs, each made of
//! ordered steps, each step holding its own encoded path geometry.

use crate::{ReplayError, Result};

/// Default coordinate precision of encoded step geometries (polyline6)
pub const DEFAULT_PRECISION: u32 = 6;

#[cfg(feature = "serde")]
fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

/// A sub-segment of a leg with its own contiguous path geometry
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    /// Encoded polyline of this step
    pub geometry: String,
    /// Number of decimal digits the geometry was encoded with
    #[cfg_attr(feature = "serde", serde(default = "default_precision"))]
    pub precision: u32,
}

impl Step {
    pub fn new(geometry: impl Into<String>, precision: u32) -> Self {
        Self {
            geometry: geometry.into(),
            precision,
        }
    }
}

/// A top-level segment of a route, made of ordered steps
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    pub steps: Vec<Step>,
}

impl Leg {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }
}

/// Ordered legs in travel order
///
/// A route is read-only once built; traversal state lives in [`crate::RouteCursor`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    legs: Vec<Leg>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Route {
    /// Create a new Route from its legs
    ///
    /// # Returns
    /// The route on success, or [`ReplayError::InvalidRoute`] if there are no legs
    /// or a leg has no steps
    pub fn new(legs: Vec<Leg>) -> Result<Self> {
        let route = Route { legs };
        route.validate()?;
        Ok(route)
    }

    /// Check that there is at least one leg and that every leg has at least one step
    ///
    /// Deserialized routes bypass [`Route::new`], so consumers call this before traversal.
    pub fn validate(&self) -> Result<()> {
        if self.legs.is_empty() {
            return Err(ReplayError::InvalidRoute {
                reason: "route has no legs".to_string(),
            });
        }
        if let Some(index) = self.legs.iter().position(|leg| leg.steps.is_empty()) {
            return Err(ReplayError::InvalidRoute {
                reason: format!("leg {index} has no steps"),
            });
        }
        Ok(())
    }

    /// Get all legs in travel order
    #[inline]
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    #[inline]
    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// Get a specific step by leg and step indices
    #[inline]
    pub fn step(&self, leg_index: usize, step_index: usize) -> Option<&Step> {
        self.legs.get(leg_index)?.steps.get(step_index)
    }

    /// Total number of steps across all legs
    pub fn total_steps(&self) -> usize {
        self.legs.iter().map(|leg| leg.steps.len()).sum()
    }

    /// True iff the route has more than one leg
    #[inline]
    pub fn is_multi_leg(&self) -> bool {
        self.legs.len() > 1
    }
}
