//! Structured workload names.
//!
//! Every unit submitted to the scheduler is named after the workload it
//! runs: `app[_vN][.type].num`, for example `billing_v12.web.3`. The
//! components feed the unit template (`{app}`, `{version}`, `{c_type}`,
//! `{c_num}`) and select per-type resource limits.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::NameError;

/// The application prefix is lazy so that a trailing `-vN` is read as the
/// version rather than swallowed into the application name.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<app>[a-z0-9-]+?)(?:[_-](?P<version>v[0-9]+))?(?:\.(?P<c_type>[a-z0-9_-]+))?\.(?P<c_num>[0-9]+)$",
    )
    .expect("workload name pattern is valid")
});

/// A parsed workload name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkloadName {
    app: String,
    version: Option<String>,
    component_type: Option<String>,
    component_number: u32,
}

impl WorkloadName {
    /// Parse `app[_vN][.type].num`.
    pub fn parse(name: &str) -> Result<Self, NameError> {
        let invalid = || NameError::InvalidFormat(name.to_string());

        let caps = NAME_PATTERN.captures(name).ok_or_else(invalid)?;
        let component_number = caps["c_num"].parse::<u32>().map_err(|_| invalid())?;

        Ok(Self {
            app: caps["app"].to_string(),
            version: caps.name("version").map(|m| m.as_str().to_string()),
            component_type: caps.name("c_type").map(|m| m.as_str().to_string()),
            component_number,
        })
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    /// Release version including its `v` prefix, e.g. `v2`.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Process type, e.g. `web` or `worker`.
    pub fn component_type(&self) -> Option<&str> {
        self.component_type.as_deref()
    }

    pub fn component_number(&self) -> u32 {
        self.component_number
    }
}

impl FromStr for WorkloadName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WorkloadName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.app)?;
        if let Some(version) = &self.version {
            write!(f, "_{version}")?;
        }
        if let Some(c_type) = &self.component_type {
            write!(f, ".{c_type}")?;
        }
        write!(f, ".{}", self.component_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(name: &str) -> (String, Option<String>, Option<String>, u32) {
        let parsed = WorkloadName::parse(name).unwrap();
        (
            parsed.app().to_string(),
            parsed.version().map(str::to_string),
            parsed.component_type().map(str::to_string),
            parsed.component_number(),
        )
    }

    #[test]
    fn parses_full_name() {
        assert_eq!(
            parts("billing_v12.web.3"),
            ("billing".into(), Some("v12".into()), Some("web".into()), 3)
        );
    }

    #[test]
    fn parses_without_version() {
        assert_eq!(
            parts("my-app.worker.1"),
            ("my-app".into(), None, Some("worker".into()), 1)
        );
    }

    #[test]
    fn parses_without_type() {
        assert_eq!(parts("my-app_v3.7"), ("my-app".into(), Some("v3".into()), None, 7));
        assert_eq!(parts("my-app.7"), ("my-app".into(), None, None, 7));
    }

    #[test]
    fn hyphenated_version_is_split_from_app() {
        assert_eq!(
            parts("web-v2.web.1"),
            ("web".into(), Some("v2".into()), Some("web".into()), 1)
        );
    }

    #[test]
    fn type_allows_underscores_and_digits() {
        assert_eq!(
            parts("app_v1.run_once2.10"),
            ("app".into(), Some("v1".into()), Some("run_once2".into()), 10)
        );
    }

    #[test]
    fn rejects_malformed_names() {
        for name in [
            "",
            "app",
            "app.web",
            "App.web.1",
            "app.web.1x",
            "app..1",
            ".web.1",
            "app_web.1",
            "app_v.web.1",
            "app.web.-1",
            "app.web.99999999999",
        ] {
            assert_eq!(
                WorkloadName::parse(name),
                Err(NameError::InvalidFormat(name.to_string())),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn display_keeps_numeric_suffix() {
        for name in ["billing_v12.web.3", "my-app.worker.1", "my-app.7", "app_v1.9"] {
            let parsed = WorkloadName::parse(name).unwrap();
            assert_eq!(parsed.to_string(), name);
            assert_eq!(WorkloadName::parse(&parsed.to_string()).unwrap(), parsed);
        }
    }

    #[test]
    fn display_canonicalises_hyphen_version() {
        let parsed: WorkloadName = "web-v2.web.1".parse().unwrap();
        assert_eq!(parsed.to_string(), "web_v2.web.1");
    }
}
