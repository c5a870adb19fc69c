//! Wire types for the scheduler's `v1-alpha` API.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use fleetgrid_core::UnitDefinition;

/// Target state requested for a submitted unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    Inactive,
    Loaded,
    Launched,
}

/// Body of `PUT /v1-alpha/units/{name}.service`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSubmission {
    pub desired_state: DesiredState,
    pub options: UnitDefinition,
}

impl UnitSubmission {
    pub fn launched(options: UnitDefinition) -> Self {
        Self {
            desired_state: DesiredState::Launched,
            options,
        }
    }
}

/// One entry of the `states` array: a unit as observed on a machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitState {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default, rename = "machineID")]
    pub machine_id: String,
    #[serde(default)]
    pub systemd_load_state: String,
    #[serde(default)]
    pub systemd_active_state: String,
    #[serde(default)]
    pub systemd_sub_state: String,
}

impl UnitState {
    pub fn sub_state(&self) -> SubState {
        SubState::from(self.systemd_sub_state.as_str())
    }
}

/// systemd sub-state as reported by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubState {
    Running,
    Exited,
    Failed,
    Other(String),
}

impl From<&str> for SubState {
    fn from(s: &str) -> Self {
        match s {
            "running" => SubState::Running,
            "exited" => SubState::Exited,
            "failed" => SubState::Failed,
            other => SubState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubState::Running => f.write_str("running"),
            SubState::Exited => f.write_str("exited"),
            SubState::Failed => f.write_str("failed"),
            SubState::Other(s) => f.write_str(s),
        }
    }
}

/// A cluster machine from `GET /v1-alpha/machines`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    #[serde(default, rename = "primaryIP")]
    pub primary_ip: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// `GET /v1-alpha/state` response. The scheduler answers `{}` when no
/// unit matches.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatePage {
    #[serde(default)]
    pub states: Vec<UnitState>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MachinePage {
    #[serde(default)]
    pub machines: Vec<Machine>,
}
