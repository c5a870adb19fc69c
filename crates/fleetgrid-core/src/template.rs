//! Unit template rendering.
//!
//! Rendering borrows the template and returns a new [`UnitDefinition`];
//! templates are never modified, so the built-ins can be rendered any
//! number of times.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::name::WorkloadName;
use crate::unit::{METADATA_NAME, METADATA_SECTION, UnitDefinition, UnitDirective, UnitTemplate};

/// Per-component-type resource limits, e.g. `memory.web = "512M"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    #[serde(default)]
    pub memory: HashMap<String, String>,
    #[serde(default)]
    pub cpu: HashMap<String, String>,
}

impl ResourceLimits {
    /// `-m <limit>` for the component type, lower-cased, or empty.
    pub fn memory_flag(&self, component_type: Option<&str>) -> String {
        lookup(&self.memory, component_type)
            .map(|mem| format!("-m {}", mem.to_lowercase()))
            .unwrap_or_default()
    }

    /// `-c <shares>` for the component type, or empty.
    pub fn cpu_flag(&self, component_type: Option<&str>) -> String {
        lookup(&self.cpu, component_type)
            .map(|cpu| format!("-c {cpu}"))
            .unwrap_or_default()
    }
}

fn lookup<'a>(map: &'a HashMap<String, String>, key: Option<&str>) -> Option<&'a str> {
    key.and_then(|k| map.get(k))
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Values substituted into a [`UnitTemplate`], plus optional machine tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderParameters {
    values: BTreeMap<String, String>,
    tags: BTreeMap<String, String>,
}

impl RenderParameters {
    /// Bind the parameters every template can rely on. `memory` and `cpu`
    /// start empty until [`with_resources`](Self::with_resources).
    pub fn new(name: &str, workload: &WorkloadName, image: &str, command: &str) -> Self {
        let mut params = Self::default()
            .set("name", name)
            .set("image", image)
            .set("command", command)
            .set("app", workload.app())
            .set("c_num", &workload.component_number().to_string())
            .set("memory", "")
            .set("cpu", "");
        if let Some(version) = workload.version() {
            params = params.set("version", version);
        }
        if let Some(c_type) = workload.component_type() {
            params = params.set("c_type", c_type);
        }
        params
    }

    pub fn with_resources(self, limits: &ResourceLimits) -> Self {
        let c_type = self.get("c_type").map(str::to_string);
        let memory = limits.memory_flag(c_type.as_deref());
        let cpu = limits.cpu_flag(c_type.as_deref());
        self.set("memory", &memory).set("cpu", &cpu)
    }

    pub fn with_entrypoint(self, entrypoint: &str) -> Self {
        if entrypoint.is_empty() {
            return self;
        }
        self.set("entrypoint", entrypoint)
    }

    pub fn with_run_id(self, run_id: &str) -> Self {
        if run_id.is_empty() {
            return self;
        }
        self.set("run_id", run_id)
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// Bind an arbitrary placeholder, replacing any previous value.
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Space-joined `"key=value"` pairs in key order, or `None` without tags.
    fn machine_metadata(&self) -> Option<String> {
        if self.tags.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .tags
            .iter()
            .map(|(k, v)| format!("\"{k}={v}\""))
            .collect();
        Some(pairs.join(" "))
    }
}

impl UnitTemplate {
    /// Substitute every placeholder and append the machine metadata
    /// directive when tags are present.
    pub fn render(&self, params: &RenderParameters) -> Result<UnitDefinition, RenderError> {
        let mut unit = self
            .directives()
            .iter()
            .map(|directive| {
                let value = substitute(&directive.value, params).map_err(|e| match e {
                    Substitution::Missing(key) => RenderError::MissingParameter {
                        key,
                        section: directive.section.clone(),
                        name: directive.name.clone(),
                    },
                    Substitution::Malformed(reason) => RenderError::Malformed {
                        section: directive.section.clone(),
                        name: directive.name.clone(),
                        reason: reason.to_string(),
                    },
                })?;
                Ok(UnitDirective {
                    section: directive.section.clone(),
                    name: directive.name.clone(),
                    value,
                })
            })
            .collect::<Result<UnitDefinition, RenderError>>()?;

        if let Some(metadata) = params.machine_metadata() {
            unit.push(UnitDirective::new(METADATA_SECTION, METADATA_NAME, &metadata));
        }
        Ok(unit)
    }
}

enum Substitution {
    Missing(String),
    Malformed(&'static str),
}

fn substitute(template: &str, params: &RenderParameters) -> Result<String, Substitution> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => key.push(ch),
                        None => return Err(Substitution::Malformed("unclosed placeholder")),
                    }
                }
                if key.is_empty() {
                    return Err(Substitution::Malformed("empty placeholder"));
                }
                let value = params.get(&key).ok_or(Substitution::Missing(key))?;
                out.push_str(value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(Substitution::Malformed("unmatched '}'")),
            _ => out.push(c),
        }
    }

    Ok(out)
}
