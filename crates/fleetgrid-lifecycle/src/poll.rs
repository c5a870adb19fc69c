//! Polling state machines.
//!
//! A watch consumes one state observation per iteration and says whether
//! to keep polling. It holds no I/O and no clock, so the manager decides
//! when to query and how long to sleep.

use fleetgrid_client::{SubState, UnitState};
use tracing::{debug, warn};

use crate::policy::PollPolicy;

/// Outcome of a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    /// Not terminal yet; sleep and observe again.
    Continue,
    /// The awaited condition holds.
    Succeeded,
    /// The failure threshold was reached.
    Aborted,
}

/// Waits for a unit to report `running` or `exited`.
///
/// The scheduler sometimes reports `failed` for containers that come up
/// fine moments later, so `failed` only aborts once it has been seen
/// `failure_threshold` times. The count is cumulative and never reset.
#[derive(Debug)]
pub struct StartWatch {
    policy: PollPolicy,
    iterations: u32,
    failures: u32,
}

impl StartWatch {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            iterations: 0,
            failures: 0,
        }
    }

    /// Record the state list returned for the unit. Only a single entry
    /// is conclusive; zero or several entries keep polling.
    pub fn observe(&mut self, states: &[UnitState]) -> PollStep {
        self.iterations += 1;

        let [state] = states else {
            debug!(iteration = self.iterations, entries = states.len(), "no single unit state yet");
            return PollStep::Continue;
        };

        match state.sub_state() {
            SubState::Running | SubState::Exited => PollStep::Succeeded,
            SubState::Failed => {
                self.failures += 1;
                match self.policy.failure_threshold {
                    Some(threshold) if self.failures >= threshold => {
                        warn!(
                            failures = self.failures,
                            threshold,
                            "unit keeps reporting failed"
                        );
                        PollStep::Aborted
                    }
                    _ => {
                        debug!(failures = self.failures, "unit reported failed");
                        PollStep::Continue
                    }
                }
            }
            SubState::Other(sub_state) => {
                debug!(iteration = self.iterations, %sub_state, "unit not up yet");
                PollStep::Continue
            }
        }
    }

    /// Whether the iteration budget is used up.
    pub fn exhausted(&self) -> bool {
        self.iterations >= self.policy.max_iterations
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

/// Waits for a unit to vanish from the state list.
#[derive(Debug)]
pub struct DestroyWatch {
    policy: PollPolicy,
    iterations: u32,
}

impl DestroyWatch {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            iterations: 0,
        }
    }

    pub fn observe(&mut self, states: &[UnitState]) -> PollStep {
        self.iterations += 1;
        if states.is_empty() {
            PollStep::Succeeded
        } else {
            debug!(iteration = self.iterations, entries = states.len(), "unit still present");
            PollStep::Continue
        }
    }

    pub fn exhausted(&self) -> bool {
        self.iterations >= self.policy.max_iterations
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}
