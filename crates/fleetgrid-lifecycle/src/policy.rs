//! Retry and polling budgets.

use std::time::Duration;

use anyhow::Context;
use fleetgrid_core::config::LifecycleConfig;
use fleetgrid_core::parse_duration;

/// Budget for one polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between non-terminal observations.
    pub interval: Duration,
    /// Observations before giving up.
    pub max_iterations: u32,
    /// `failed` observations tolerated before aborting. `None` never aborts.
    pub failure_threshold: Option<u32>,
}

impl PollPolicy {
    /// 1200 polls at 1s, matching the 20 minute `TimeoutStartSec` of the
    /// unit templates; abort after 10 `failed` observations.
    pub const fn start() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_iterations: 1200,
            failure_threshold: Some(10),
        }
    }

    /// 30 polls at 1s waiting for the unit to disappear.
    pub const fn destroy() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_iterations: 30,
            failure_threshold: None,
        }
    }
}

/// All budgets used by [`LifecycleManager`](crate::LifecycleManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Attempts per submit/delete call, including the first.
    pub submit_attempts: u32,
    pub start: PollPolicy,
    pub destroy: PollPolicy,
    /// Pause after a run unit is up, giving service discovery time to
    /// notice the new container before the run id is handed out.
    pub run_settle_delay: Duration,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            submit_attempts: 3,
            start: PollPolicy::start(),
            destroy: PollPolicy::destroy(),
            run_settle_delay: Duration::from_secs(10),
        }
    }
}

impl LifecyclePolicy {
    /// Apply the `[lifecycle]` overrides from `fleetgrid.toml`.
    pub fn from_config(config: &LifecycleConfig) -> anyhow::Result<Self> {
        let mut policy = Self::default();

        if let Some(attempts) = config.submit_attempts {
            policy.submit_attempts = attempts.max(1);
        }
        if let Some(interval) = &config.start_interval {
            policy.start.interval = duration("start_interval", interval)?;
        }
        if let Some(max) = config.start_max_iterations {
            policy.start.max_iterations = max;
        }
        if let Some(threshold) = config.start_failure_threshold {
            policy.start.failure_threshold = Some(threshold.max(1));
        }
        if let Some(interval) = &config.destroy_interval {
            policy.destroy.interval = duration("destroy_interval", interval)?;
        }
        if let Some(max) = config.destroy_max_iterations {
            policy.destroy.max_iterations = max;
        }
        if let Some(delay) = &config.run_settle_delay {
            policy.run_settle_delay = duration("run_settle_delay", delay)?;
        }

        Ok(policy)
    }
}

fn duration(field: &str, value: &str) -> anyhow::Result<Duration> {
    parse_duration(value).with_context(|| format!("invalid duration for lifecycle.{field}: {value:?}"))
}
