use serde::Serialize;
use std::time::Duration;

/// A parsed job description: the containment tree the bridge walks once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSpec {
    pub task_groups: Vec<TaskGroup>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskGroup {
    pub name: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Task {
    pub name: String,
    pub services: Vec<ServiceDecl>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceDecl {
    pub name: String,
    pub tags: Vec<String>,
    pub port_label: String,
    pub checks: Vec<CheckDecl>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckDecl {
    pub id: String,
    pub name: String,
    pub check_type: String,
    pub port_label: String,
    pub path: String,
    pub interval: Duration,
    pub method: String,
}

/// Check types the bridge knows how to turn into a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckKind {
    Http,
    Unsupported(String),
}

impl CheckKind {
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("http") {
            CheckKind::Http
        } else {
            CheckKind::Unsupported(tag.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckProbe {
    Http { url: String, method: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRegistration {
    pub id: String,
    pub name: String,
    pub interval: String,
    pub probe: Option<CheckProbe>,
}

impl CheckRegistration {
    pub fn is_executable(&self) -> bool {
        self.probe.is_some()
    }

    pub fn http_url(&self) -> Option<&str> {
        match &self.probe {
            Some(CheckProbe::Http { url, .. }) => Some(url.as_str()),
            None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRegistration {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub port: u16,
    pub address: String,
    pub checks: Vec<CheckRegistration>,
}

/// Wire shape of a Consul agent service registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentServiceRegistration<'a> {
    #[serde(rename = "ID")]
    pub id: &'a str,
    pub name: &'a str,
    pub tags: &'a [String],
    pub port: u16,
    pub address: &'a str,
    pub checks: Vec<AgentServiceCheck<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentServiceCheck<'a> {
    #[serde(rename = "CheckID", skip_serializing_if = "Option::is_none")]
    pub check_id: Option<&'a str>,
    pub name: &'a str,
    #[serde(rename = "HTTP", skip_serializing_if = "Option::is_none")]
    pub http: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<&'a str>,
    pub interval: &'a str,
}

impl<'a> From<&'a ServiceRegistration> for AgentServiceRegistration<'a> {
    fn from(reg: &'a ServiceRegistration) -> Self {
        Self {
            id: &reg.id,
            name: &reg.name,
            tags: &reg.tags,
            port: reg.port,
            address: &reg.address,
            checks: reg.checks.iter().map(AgentServiceCheck::from).collect(),
        }
    }
}

impl<'a> From<&'a CheckRegistration> for AgentServiceCheck<'a> {
    fn from(check: &'a CheckRegistration) -> Self {
        let (http, method) = match &check.probe {
            Some(CheckProbe::Http { url, method }) => (Some(url.as_str()), method.as_deref()),
            None => (None, None),
        };
        Self {
            check_id: Some(check.id.as_str()).filter(|id| !id.is_empty()),
            name: &check.name,
            http,
            method,
            interval: &check.interval,
        }
    }
}

/// A recorded intent to deregister one registration at shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownAction {
    pub service_id: String,
}

/// Append-only during registration, drained once at shutdown.
#[derive(Debug, Default)]
pub struct TeardownList {
    actions: Vec<TeardownAction>,
}

impl TeardownList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, service_id: impl Into<String>) {
        self.actions.push(TeardownAction {
            service_id: service_id.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Consumes the list, yielding the last recorded action first.
    pub fn drain_reversed(self) -> impl Iterator<Item = TeardownAction> {
        self.actions.into_iter().rev()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    pub services_seen: usize,
    pub skipped: usize,
    pub registered: usize,
    pub failed: usize,
}
