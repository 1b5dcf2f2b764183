//! Traversal position through a route's leg/step hierarchy

use crate::{Route, Step};

/// Pointer to the next step to replay
///
/// The cursor only moves forward, one step at a time, and ends in an absorbing
/// `Exhausted` state once the last step of the last leg has been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCursor {
    Active { leg: usize, step: usize },
    Exhausted,
}

impl Default for RouteCursor {
    fn default() -> Self {
        RouteCursor::Active { leg: 0, step: 0 }
    }
}

impl RouteCursor {
    /// Create a cursor at the first step of the first leg
    pub fn new() -> Self {
        Self::default()
    }

    /// Current (leg, step) indices, or `None` once exhausted
    #[inline]
    pub fn position(&self) -> Option<(usize, usize)> {
        match *self {
            RouteCursor::Active { leg, step } => Some((leg, step)),
            RouteCursor::Exhausted => None,
        }
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RouteCursor::Exhausted)
    }

    /// Step under the cursor in `route`
    pub fn current<'a>(&self, route: &'a Route) -> Option<&'a Step> {
        let (leg, step) = self.position()?;
        route.step(leg, step)
    }

    /// Move to the next step, rolling over to the next leg when the current one ends
    ///
    /// Advancing past the final step exhausts the cursor; further calls are no-ops.
    pub fn advance(&mut self, route: &Route) {
        let RouteCursor::Active { leg, step } = *self else {
            return;
        };
        let legs = route.legs();
        let step_count = legs.get(leg).map_or(0, |l| l.steps.len());

        *self = if step + 1 < step_count {
            RouteCursor::Active { leg, step: step + 1 }
        } else if leg + 1 < legs.len() {
            RouteCursor::Active {
                leg: leg + 1,
                step: 0,
            }
        } else {
            RouteCursor::Exhausted
        };
        tracing::trace!("Route cursor advanced to {:?}", self);
    }

    /// True iff the route has more than one leg
    #[inline]
    pub fn is_multi_leg(route: &Route) -> bool {
        route.is_multi_leg()
    }
}
