//! The flux-law capability interface.

use crate::context::FluxContext;

/// A stateless physical exchange law.
///
/// Implementations are deterministic functions of the two port
/// potentials and the shared context: given the same inputs they return
/// the same flux, with no hidden state. This is what lets the
/// orchestrator recompute every flow element in any order within a tick.
///
/// Sign convention: positive flux transfers the quantity from side A to
/// side B. The orchestrator subtracts the flux at port A and adds it at
/// port B, so the pair always sums to zero by construction.
pub trait FluxLaw: Send + Sync {
    /// Law name for diagnostics.
    fn name(&self) -> &'static str;

    /// Compute the flux between two potentials.
    ///
    /// Total function: implementations must not panic and should return
    /// whatever the formula yields; non-finite results are the
    /// orchestrator's fault-recovery concern, not the law's.
    fn flux(&self, potential_a: f64, potential_b: f64, ctx: &FluxContext) -> f64;
}
