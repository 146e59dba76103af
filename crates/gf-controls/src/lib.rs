//! gf-controls: closed-loop controllers for the greenhouse engine.
//!
//! Provides:
//! - **ISA PID**: scaled-unit PID with back-calculation anti-windup,
//!   setpoint weighting and filtered derivative
//! - **Screen FSM**: finite-state thermal-screen controller (Moore
//!   machine with dwell timers)
//! - **Sampled execution**: sample clocks and zero-order holds for
//!   digital controller cadence
//!
//! Controllers follow the same discipline as the physical elements:
//! immutable configuration validated at construction, explicit state
//! structs, and a functional `update(&state, ...) -> (new_state, out)`
//! so a tick can be replayed or inspected without hidden mutation.

pub mod error;
pub mod pid;
pub mod sampled;
pub mod screen;

// Re-exports for ergonomics
pub use error::{ControlError, ControlResult};
pub use pid::{IsaPid, IsaPidParams, IsaPidState};
pub use sampled::{SampleClock, ZeroOrderHold};
pub use screen::{ScreenController, ScreenInputs, ScreenMode, ScreenParams, ScreenState};
