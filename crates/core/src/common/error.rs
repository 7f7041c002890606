//! Misuse error definitions.
//!
//! The simulator distinguishes three error classes:
//! 1. **Misuse:** programming errors surfaced immediately to the caller
//!    (this module).
//! 2. **Transient:** expected conditions (hazards, full ports, bank
//!    conflicts) that update counters and never fail.
//! 3. **Silent-soft:** defined results for degenerate inputs (division by
//!    zero, register `x0`, out-of-range addresses).
//!
//! Only the misuse class is represented as a Rust error type; the other two
//! classes are part of normal operation.

use thiserror::Error;

use super::Cycle;

/// Misuse errors surfaced by scheduling and lifecycle operations.
///
/// These indicate a logic error in the caller, not a recoverable runtime
/// condition; the failing operation has no effect on simulator state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// An event was scheduled behind the current simulation time.
    ///
    /// Scheduling at exactly the current time is permitted; scheduling
    /// strictly earlier is rejected so no event can execute in the past.
    #[error("event scheduled at cycle {requested} behind current time {now}")]
    ScheduleInPast {
        /// The requested event time.
        requested: Cycle,
        /// The scheduler's current time when the request was made.
        now: Cycle,
    },

    /// A ready/valid connection was started without both signal ports bound.
    #[error("ready/valid connection `{connection}` has no bound {signal} port")]
    UnboundSignal {
        /// Name of the offending connection.
        connection: String,
        /// Which signal is missing (`"ready"` or `"valid"`).
        signal: &'static str,
    },

    /// A configuration value makes the machine unconstructible.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
