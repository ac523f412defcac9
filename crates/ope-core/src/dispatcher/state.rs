use std::time::Instant;

use strum::Display;

/// Lifecycle of the handler process.
///
/// `Idle → Dispatching → Draining → Terminated`. An event that arrives while
/// draining goes back through `Dispatching` but keeps the original deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum DispatchState {
    /// Waiting for the first event.
    #[default]
    Idle,
    /// Blocked on the companion.
    Dispatching,
    /// Termination scheduled at `deadline`.
    Draining { deadline: Instant },
    /// Done; the caller should exit.
    Terminated,
}

impl DispatchState {
    /// Scheduled termination time, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self {
            Self::Draining { deadline } => Some(*deadline),
            _ => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}
