//! Physical exchange domains.

use gf_core::constants;

/// The physical quantity a port carries.
///
/// Every port belongs to exactly one domain; a flow element may only
/// join two ports of the same domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Potential: temperature (K). Flow: heat rate (W).
    Heat,
    /// Potential: vapor pressure (Pa). Flow: vapor mass rate (kg/s).
    Vapour,
    /// Potential: concentration (mg/m³). Flow: mass rate (mg/s).
    Co2,
}

impl Domain {
    /// Default validity range `(min, max)` for a state in this domain.
    ///
    /// Storage updates are clamped into this range as a stability
    /// safeguard (non-negative concentrations, temperature far from
    /// absolute zero).
    pub fn valid_range(self) -> (f64, f64) {
        match self {
            Domain::Heat => (constants::T_VALID_MIN_K, constants::T_VALID_MAX_K),
            Domain::Vapour => (constants::VP_VALID_MIN_PA, constants::VP_VALID_MAX_PA),
            Domain::Co2 => (
                constants::CO2_VALID_MIN_MG_PER_M3,
                constants::CO2_VALID_MAX_MG_PER_M3,
            ),
        }
    }

    /// Short lowercase label for diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Domain::Heat => "heat",
            Domain::Vapour => "vapour",
            Domain::Co2 => "co2",
        }
    }
}

/// Whether a port participates in the internal balance or is forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortRole {
    /// Owned by a storage element; its accumulated flow drives the
    /// element's state derivative.
    Interior,
    /// Potential prescribed externally each tick; accumulated flow is
    /// discarded. One-sided forcing of the model happens only here.
    Boundary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ranges_are_ordered() {
        for d in [Domain::Heat, Domain::Vapour, Domain::Co2] {
            let (lo, hi) = d.valid_range();
            assert!(lo < hi);
        }
    }

    #[test]
    fn co2_range_is_non_negative() {
        let (lo, _) = Domain::Co2.valid_range();
        assert_eq!(lo, 0.0);
    }
}
