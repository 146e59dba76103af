//! Storage elements: one scalar state integrated explicitly per tick.

use gf_net::Domain;

use crate::error::{SimError, SimResult};

/// A storage element: bounds and step policy for one integrated state.
///
/// The state value itself and the accumulated net flow live in the
/// orchestrator's port arrays; capacity is recomputed by the caller
/// every tick (air volume changes with screen closure) and passed to
/// `advance`, never cached here.
#[derive(Clone, Debug)]
pub struct Storage {
    /// Name for diagnostics.
    pub name: String,
    pub domain: Domain,
    /// State clamped into this range after every update.
    valid_min: f64,
    valid_max: f64,
    /// Per-tick change ceiling (stiffness guard). Several flux laws are
    /// strongly nonlinear (T⁴, |ΔT|^0.33); bounding the explicit step
    /// keeps a transient boundary jump from overshooting.
    max_delta: Option<f64>,
}

impl Storage {
    /// Create a storage element with the domain's default validity range.
    pub fn new(name: impl Into<String>, domain: Domain) -> Self {
        let (valid_min, valid_max) = domain.valid_range();
        Self {
            name: name.into(),
            domain,
            valid_min,
            valid_max,
            max_delta: None,
        }
    }

    /// Override the validity range.
    pub fn with_bounds(mut self, valid_min: f64, valid_max: f64) -> SimResult<Self> {
        if !(valid_min < valid_max) {
            return Err(SimError::InvalidArg {
                what: "valid_min must be less than valid_max",
            });
        }
        self.valid_min = valid_min;
        self.valid_max = valid_max;
        Ok(self)
    }

    /// Bound the per-tick state change.
    pub fn with_max_delta(mut self, max_delta: f64) -> SimResult<Self> {
        if !(max_delta > 0.0) {
            return Err(SimError::InvalidArg {
                what: "max_delta must be positive",
            });
        }
        self.max_delta = Some(max_delta);
        Ok(self)
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.valid_min, self.valid_max)
    }

    /// Advance the state by one explicit step.
    ///
    /// `derivative = net_flow / capacity`; the resulting change is
    /// bounded by `max_delta` when configured and the new state is
    /// clamped into the validity range. The caller zeroes the net flow
    /// for the next tick.
    pub fn advance(&self, value: f64, net_flow: f64, capacity: f64, dt: f64) -> SimResult<f64> {
        if !(capacity > 0.0) {
            return Err(SimError::InvalidArg {
                what: "capacity must be positive",
            });
        }
        let mut delta = net_flow / capacity * dt;
        if let Some(max) = self.max_delta {
            delta = delta.clamp(-max, max);
        }
        Ok((value + delta).clamp(self.valid_min, self.valid_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_flow_integrates_linearly() {
        // capacity 1000 J/K, net flow 500 W, dt 60 s:
        // ten ticks raise the state by 10*60*500/1000 = 300 K.
        // Bounds widened so clamping stays idle over the whole ramp.
        let storage = Storage::new("tank", Domain::Heat)
            .with_bounds(0.0, 1000.0)
            .unwrap();
        let mut value = 250.0;
        for _ in 0..10 {
            value = storage.advance(value, 500.0, 1000.0, 60.0).unwrap();
        }
        assert!((value - 550.0).abs() < 1e-9);
    }

    #[test]
    fn clamps_into_validity_range() {
        let storage = Storage::new("co2", Domain::Co2);
        // Large negative flow must not push concentration below zero
        let value = storage.advance(10.0, -1.0e6, 100.0, 60.0).unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn max_delta_bounds_the_step() {
        let storage = Storage::new("air", Domain::Heat)
            .with_max_delta(2.0)
            .unwrap();
        let value = storage.advance(293.15, 1.0e9, 1000.0, 60.0).unwrap();
        assert!((value - 295.15).abs() < 1e-9);
        let value = storage.advance(293.15, -1.0e9, 1000.0, 60.0).unwrap();
        assert!((value - 291.15).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_capacity() {
        let storage = Storage::new("air", Domain::Heat);
        assert!(storage.advance(293.15, 0.0, 0.0, 60.0).is_err());
        assert!(storage.advance(293.15, 0.0, -5.0, 60.0).is_err());
    }

    #[test]
    fn rejects_bad_bounds() {
        assert!(
            Storage::new("x", Domain::Heat)
                .with_bounds(400.0, 300.0)
                .is_err()
        );
        assert!(Storage::new("x", Domain::Heat).with_max_delta(0.0).is_err());
    }
}
