//! Lifecycle manager — create, start, run, and destroy scheduler units.
//!
//! Submission and deletion are retried without delay up to
//! `submit_attempts`. Start and destroy poll the scheduler's state until a
//! terminal condition or the iteration budget runs out.

use std::collections::BTreeMap;

use fleetgrid_client::{Machine, SchedulerClient, Transport, UnitState, UnitSubmission};
use fleetgrid_core::{
    RenderParameters, ResourceLimits, UnitDefinition, UnitTemplate, WorkloadName,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{LifecycleError, LifecycleResult};
use crate::policy::LifecyclePolicy;
use crate::poll::{DestroyWatch, PollStep, StartWatch};

/// Caller-supplied settings for [`LifecycleManager::create`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Memory/CPU limits keyed by component type.
    pub resources: ResourceLimits,
    /// Machine metadata the unit must be placed on.
    pub tags: BTreeMap<String, String>,
    pub entrypoint: Option<String>,
}

/// Orchestrates unit lifecycles over one scheduler connection.
///
/// Every operation takes `&mut self`; run concurrent lifecycles through
/// separate managers, each with its own transport.
pub struct LifecycleManager<T> {
    client: SchedulerClient<T>,
    policy: LifecyclePolicy,
}

impl<T: Transport> LifecycleManager<T> {
    pub fn new(client: SchedulerClient<T>, policy: LifecyclePolicy) -> Self {
        Self { client, policy }
    }

    pub fn client(&self) -> &SchedulerClient<T> {
        &self.client
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Render and submit a unit for `name`. Success means the scheduler
    /// accepted the definition, not that the container runs.
    pub async fn create(
        &mut self,
        name: &str,
        image: &str,
        command: &str,
        template: Option<&UnitTemplate>,
        options: &CreateOptions,
    ) -> LifecycleResult<()> {
        let workload = WorkloadName::parse(name)?;

        let mut params = RenderParameters::new(name, &workload, image, command)
            .with_resources(&options.resources)
            .with_tags(options.tags.clone());
        if let Some(entrypoint) = &options.entrypoint {
            params = params.with_entrypoint(entrypoint);
        }

        let unit = match template {
            Some(template) => render(name, template, &params)?,
            None => render(name, &UnitTemplate::container(), &params)?,
        };

        self.submit(name, unit).await?;
        info!(unit = %name, %image, "unit created");
        Ok(())
    }

    /// Wait for the unit to reach `running` or `exited`.
    pub async fn start(&mut self, name: &str) -> LifecycleResult<()> {
        self.wait_for_start(name).await?;
        info!(unit = %name, "unit started");
        Ok(())
    }

    /// Units have no stop action distinct from destroy.
    pub async fn stop(&mut self, _name: &str) -> LifecycleResult<()> {
        Err(LifecycleError::NotSupported { operation: "stop" })
    }

    /// Delete the unit and wait until the scheduler no longer reports it.
    ///
    /// Delete failures of any kind are logged and ignored: the unit may
    /// already be on its way out, and the poll decides the outcome.
    pub async fn destroy(&mut self, name: &str) -> LifecycleResult<()> {
        if let Err(e) = self.delete(name).await {
            warn!(unit = %name, error = %e, "delete failed, waiting for removal anyway");
        }

        self.wait_for_destroy(name).await?;
        info!(unit = %name, "unit destroyed");
        Ok(())
    }

    /// Delete the unit with retries, surfacing the last failure.
    pub async fn delete(&mut self, name: &str) -> LifecycleResult<()> {
        let attempts = self.policy.submit_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.client.delete_unit(name).await {
                Ok(()) => {
                    debug!(unit = %name, attempt, "unit deleted");
                    return Ok(());
                }
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(unit = %name, attempt, error = %e, "unit delete failed, retrying");
                    attempt += 1;
                }
                Err(source) => {
                    return Err(LifecycleError::DeleteFailed {
                        unit: name.to_string(),
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }

    /// Run a one-off command in a fresh container and return its run id.
    ///
    /// Returns only after the unit is up and `run_settle_delay` has passed.
    pub async fn run(
        &mut self,
        name: &str,
        image: &str,
        entrypoint: &str,
        command: &str,
    ) -> LifecycleResult<String> {
        let workload = WorkloadName::parse(name)?;
        let run_id = Uuid::new_v4().to_string();

        let params = RenderParameters::new(name, &workload, image, command)
            .with_entrypoint(entrypoint)
            .with_run_id(&run_id);
        let unit = render(name, &UnitTemplate::run(), &params)?;

        self.submit(name, unit).await?;
        self.wait_for_start(name).await?;

        // The router learns about the container asynchronously.
        debug!(unit = %name, delay = ?self.policy.run_settle_delay, "waiting for run container to be announced");
        tokio::time::sleep(self.policy.run_settle_delay).await;

        info!(unit = %name, %run_id, "run started");
        Ok(run_id)
    }

    /// Attaching to a unit's stdio has no scheduler API.
    pub async fn attach(&mut self, _name: &str) -> LifecycleResult<()> {
        Err(LifecycleError::NotSupported { operation: "attach" })
    }

    /// Current scheduler state, for one unit or all units.
    pub async fn state(&mut self, name: Option<&str>) -> LifecycleResult<Vec<UnitState>> {
        Ok(self.client.query_state(name).await?)
    }

    pub async fn machines(&mut self) -> LifecycleResult<Vec<Machine>> {
        Ok(self.client.query_machines().await?)
    }

    async fn submit(&mut self, name: &str, unit: UnitDefinition) -> LifecycleResult<()> {
        let submission = UnitSubmission::launched(unit);
        let attempts = self.policy.submit_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.client.submit_unit(name, &submission).await {
                Ok(()) => {
                    debug!(unit = %name, attempt, "unit submitted");
                    return Ok(());
                }
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(unit = %name, attempt, error = %e, "unit submission failed, retrying");
                    attempt += 1;
                }
                Err(source) => {
                    return Err(LifecycleError::SubmitFailed {
                        unit: name.to_string(),
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }

    async fn wait_for_start(&mut self, name: &str) -> LifecycleResult<()> {
        let policy = self.policy.start;
        let mut watch = StartWatch::new(policy);

        while !watch.exhausted() {
            let states = self.client.query_state(Some(name)).await?;
            match watch.observe(&states) {
                PollStep::Succeeded => return Ok(()),
                PollStep::Aborted => {
                    return Err(LifecycleError::StartAborted {
                        unit: name.to_string(),
                        failures: watch.failures(),
                    });
                }
                PollStep::Continue => tokio::time::sleep(policy.interval).await,
            }
        }

        Err(LifecycleError::StartTimeout {
            unit: name.to_string(),
            iterations: watch.iterations(),
        })
    }

    async fn wait_for_destroy(&mut self, name: &str) -> LifecycleResult<()> {
        let policy = self.policy.destroy;
        let mut watch = DestroyWatch::new(policy);

        while !watch.exhausted() {
            let states = self.client.query_state(Some(name)).await?;
            match watch.observe(&states) {
                PollStep::Succeeded => return Ok(()),
                PollStep::Aborted | PollStep::Continue => {
                    tokio::time::sleep(policy.interval).await
                }
            }
        }

        Err(LifecycleError::DestroyTimeout {
            unit: name.to_string(),
            iterations: watch.iterations(),
        })
    }
}

fn render(
    name: &str,
    template: &UnitTemplate,
    params: &RenderParameters,
) -> LifecycleResult<UnitDefinition> {
    template
        .render(params)
        .map_err(|source| LifecycleError::Render {
            unit: name.to_string(),
            source,
        })
}
