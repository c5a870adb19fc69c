//! Scheduler unit definitions and the built-in unit templates.
//!
//! A unit is an ordered list of `[Section] Name=Value` directives. Order
//! matters: the scheduler runs `ExecStartPre`/`ExecStop` entries in the
//! order they are submitted.

use serde::{Deserialize, Serialize};

/// A single `[section] name=value` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDirective {
    pub section: String,
    pub name: String,
    pub value: String,
}

impl UnitDirective {
    pub fn new(section: &str, name: &str, value: &str) -> Self {
        Self {
            section: section.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// A fully rendered unit, ready for submission.
pub type UnitDefinition = Vec<UnitDirective>;

/// Scheduler section that carries placement metadata.
pub const METADATA_SECTION: &str = "X-Fleet";

/// Directive name for machine metadata constraints.
pub const METADATA_NAME: &str = "MachineMetadata";

const CONTAINER_DIRECTIVES: &[(&str, &str, &str)] = &[
    ("Unit", "Description", "{name}"),
    (
        "Service",
        "ExecStartPre",
        r#"/bin/sh -c "IMAGE=$(etcdctl get /deis/registry/host 2>&1):$(etcdctl get /deis/registry/port 2>&1)/{image}; docker pull $IMAGE""#,
    ),
    (
        "Service",
        "ExecStartPre",
        r#"/bin/sh -c "docker inspect {name} >/dev/null 2>&1 && docker rm -f {name} || true""#,
    ),
    (
        "Service",
        "ExecStart",
        r#"/bin/sh -c "IMAGE=$(etcdctl get /deis/registry/host 2>&1):$(etcdctl get /deis/registry/port 2>&1)/{image}; port=$(docker inspect -f '{{{{range $k, $v := .ContainerConfig.ExposedPorts }}}}{{{{$k}}}}{{{{end}}}}' $IMAGE | cut -d/ -f1) ; docker run --name {name} {memory} {cpu} -P -e PORT=$port $IMAGE {command}""#,
    ),
    ("Service", "ExecStop", "/usr/bin/docker rm -f {name}"),
    ("Service", "TimeoutStartSec", "20m"),
    ("Service", "RestartSec", "5"),
    ("Service", "Restart", "on-failure"),
];

const RUN_DIRECTIVES: &[(&str, &str, &str)] = &[
    ("Unit", "Description", "{name} admin command"),
    (
        "Service",
        "ExecStartPre",
        r#"/bin/sh -c "PTY_IMAGE=`/run/deis/bin/get_image /deis/pty`; docker pull $PTY_IMAGE; IMAGE=$(etcdctl get /deis/registry/host 2>&1):$(etcdctl get /deis/registry/port 2>&1)/{image}; docker pull $IMAGE""#,
    ),
    (
        "Service",
        "ExecStartPre",
        r#"/bin/sh -c "docker inspect pty_{run_id}_{name} >/dev/null 2>&1 && docker rm -f pty_{run_id}_{name} || true && docker inspect {name} >/dev/null 2>&1 && docker rm -f {name} || true""#,
    ),
    (
        "Service",
        "ExecStart",
        r#"/bin/sh -c "PTY_IMAGE=`/run/deis/bin/get_image /deis/pty`; IMAGE=$(etcdctl get /deis/registry/host 2>&1):$(etcdctl get /deis/registry/port 2>&1)/{image}; docker run --name pty_{run_id}_{name} -v /usr/bin/docker:/bin/docker -v /var/run/docker.sock:/tmp/docker.sock -e DOCKER_HOST=unix:///tmp/docker.sock -P -e COMMAND=\"docker run --name {name} --entrypoint={entrypoint} -i -t $IMAGE {command}\" $PTY_IMAGE""#,
    ),
    ("Service", "ExecStop", "/usr/bin/docker rm -f pty_{run_id}_{name}"),
    ("Service", "ExecStop", "/usr/bin/fleetctl destroy {name}"),
    ("Service", "TimeoutStartSec", "20m"),
];

/// An immutable unit description whose values contain `{placeholder}`
/// markers. `{{` and `}}` stand for literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTemplate {
    directives: Vec<UnitDirective>,
}

impl UnitTemplate {
    pub fn new(directives: Vec<UnitDirective>) -> Self {
        Self { directives }
    }

    /// Template for long-running application containers.
    pub fn container() -> Self {
        Self::from_table(CONTAINER_DIRECTIVES)
    }

    /// Template for one-off admin commands wrapped in a pty container.
    /// Requires `entrypoint` and `run_id` parameters.
    pub fn run() -> Self {
        Self::from_table(RUN_DIRECTIVES)
    }

    fn from_table(table: &[(&str, &str, &str)]) -> Self {
        Self::new(
            table
                .iter()
                .map(|(section, name, value)| UnitDirective::new(section, name, value))
                .collect(),
        )
    }

    pub fn directives(&self) -> &[UnitDirective] {
        &self.directives
    }
}
