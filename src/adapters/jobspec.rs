use crate::adapters::nomad_hcl::parse_hcl_job;
use crate::core::JobSource;
use crate::domain::model::{CheckDecl, JobSpec, ServiceDecl, Task, TaskGroup};
use crate::utils::duration::parse_interval;
use crate::utils::error::{BridgeError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFormat {
    Toml,
    NomadJson,
    NomadHcl,
}

impl JobFormat {
    /// `.json`, `.toml`, `.hcl` and `.nomad` decide by extension; anything
    /// else (the default `.tmpl` included) is sniffed from its content.
    pub fn detect(path: &Path, content: &str) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => JobFormat::NomadJson,
            Some(ext) if ext.eq_ignore_ascii_case("toml") => JobFormat::Toml,
            Some(ext) if ext.eq_ignore_ascii_case("hcl") || ext.eq_ignore_ascii_case("nomad") => {
                JobFormat::NomadHcl
            }
            _ if content.trim_start().starts_with('{') => JobFormat::NomadJson,
            _ if starts_with_job_block(content) => JobFormat::NomadHcl,
            _ => JobFormat::Toml,
        }
    }
}

/// True when the first line that is not blank or a comment opens `job "..."`.
fn starts_with_job_block(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("//"))
        .and_then(|l| l.strip_prefix("job"))
        .is_some_and(|rest| rest.trim_start().starts_with('"'))
}

/// Job description read from a file on disk.
#[derive(Debug, Clone)]
pub struct JobSpecFile {
    path: PathBuf,
}

impl JobSpecFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl JobSource for JobSpecFile {
    fn load(&self) -> Result<JobSpec> {
        let content = std::fs::read_to_string(&self.path)?;
        let format = JobFormat::detect(&self.path, &content);
        tracing::debug!(path = %self.path.display(), ?format, "parsing job description");
        parse_job_spec(&content, format).map_err(|e| match e {
            BridgeError::JobSpecError { message, .. } => BridgeError::JobSpecError {
                path: self.path.display().to_string(),
                message,
            },
            other => other,
        })
    }
}

pub fn parse_job_spec(content: &str, format: JobFormat) -> Result<JobSpec> {
    let content = substitute_env_vars(content)?;
    match format {
        JobFormat::Toml => {
            let doc: TomlDocument = toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
            doc.into_job_spec()
        }
        JobFormat::NomadJson => {
            let doc: NomadDocument =
                serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
            Ok(doc.into_job_spec())
        }
        JobFormat::NomadHcl => parse_hcl_job(&content),
    }
}

pub(crate) fn parse_error(message: String) -> BridgeError {
    BridgeError::JobSpecError {
        path: "<inline>".to_string(),
        message,
    }
}

/// Replaces `${VAR}` with the variable's value; unknown variables stay as written.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| parse_error(e.to_string()))?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}

/// Ports may be written as `"8080"`, `8080` or a symbolic label like `"http"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortLabel {
    Text(String),
    Number(i64),
}

impl PortLabel {
    fn into_label(self) -> String {
        match self {
            PortLabel::Text(s) => s,
            PortLabel::Number(n) => n.to_string(),
        }
    }
}

// TOML layout: [[group]] / [[group.task]] / [[group.task.service]] / [[group.task.service.check]]

#[derive(Debug, Deserialize)]
struct TomlDocument {
    job: Option<TomlJob>,
    #[serde(default)]
    group: Vec<TomlGroup>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlJob {
    #[serde(default)]
    group: Vec<TomlGroup>,
}

#[derive(Debug, Deserialize)]
struct TomlGroup {
    #[serde(default)]
    name: String,
    #[serde(default)]
    task: Vec<TomlTask>,
}

#[derive(Debug, Deserialize)]
struct TomlTask {
    #[serde(default)]
    name: String,
    #[serde(default)]
    service: Vec<TomlService>,
}

#[derive(Debug, Deserialize)]
struct TomlService {
    #[serde(default)]
    name: String,
    #[serde(default)]
    tags: Vec<String>,
    port: Option<PortLabel>,
    #[serde(default)]
    check: Vec<TomlCheck>,
}

#[derive(Debug, Deserialize)]
struct TomlCheck {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    check_type: String,
    port: Option<PortLabel>,
    #[serde(default)]
    path: String,
    interval: Option<String>,
    #[serde(default)]
    method: String,
}

impl TomlDocument {
    fn into_job_spec(self) -> Result<JobSpec> {
        let mut groups = self.group;
        if let Some(job) = self.job {
            groups.extend(job.group);
        }

        let task_groups = groups
            .into_iter()
            .map(|g| -> Result<TaskGroup> {
                let tasks = g
                    .task
                    .into_iter()
                    .map(|t| -> Result<Task> {
                        let services = t
                            .service
                            .into_iter()
                            .map(TomlService::into_decl)
                            .collect::<Result<Vec<_>>>()?;
                        Ok(Task {
                            name: t.name,
                            services,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(TaskGroup {
                    name: g.name,
                    tasks,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(JobSpec { task_groups })
    }
}

impl TomlService {
    fn into_decl(self) -> Result<ServiceDecl> {
        let port_label = self.port.map(PortLabel::into_label).unwrap_or_default();
        let checks = self
            .check
            .into_iter()
            .map(|c| -> Result<CheckDecl> {
                let interval = match c.interval.as_deref() {
                    Some(raw) => parse_interval(raw).map_err(|e| {
                        parse_error(format!("check {:?} interval {:?}: {}", c.name, raw, e))
                    })?,
                    None => Duration::ZERO,
                };
                Ok(CheckDecl {
                    id: c.id,
                    name: c.name,
                    check_type: c.check_type,
                    port_label: c
                        .port
                        .map(PortLabel::into_label)
                        .unwrap_or_else(|| port_label.clone()),
                    path: c.path,
                    interval,
                    method: c.method,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ServiceDecl {
            name: self.name,
            tags: self.tags,
            port_label,
            checks,
        })
    }
}

// Nomad API JSON, as produced by `nomad job run -output`.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NomadDocument {
    job: Option<NomadJob>,
    task_groups: Option<Vec<NomadTaskGroup>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NomadJob {
    task_groups: Option<Vec<NomadTaskGroup>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NomadTaskGroup {
    name: Option<String>,
    tasks: Option<Vec<NomadTask>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NomadTask {
    name: Option<String>,
    services: Option<Vec<NomadService>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NomadService {
    name: Option<String>,
    tags: Option<Vec<String>>,
    port_label: Option<String>,
    checks: Option<Vec<NomadCheck>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NomadCheck {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "Type")]
    check_type: Option<String>,
    port_label: Option<String>,
    path: Option<String>,
    /// Nanoseconds.
    interval: Option<u64>,
    method: Option<String>,
}

impl NomadDocument {
    fn into_job_spec(self) -> JobSpec {
        let groups = self
            .job
            .and_then(|j| j.task_groups)
            .or(self.task_groups)
            .unwrap_or_default();

        JobSpec {
            task_groups: groups
                .into_iter()
                .map(|g| TaskGroup {
                    name: g.name.unwrap_or_default(),
                    tasks: g
                        .tasks
                        .unwrap_or_default()
                        .into_iter()
                        .map(|t| Task {
                            name: t.name.unwrap_or_default(),
                            services: t
                                .services
                                .unwrap_or_default()
                                .into_iter()
                                .map(NomadService::into_decl)
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl NomadService {
    fn into_decl(self) -> ServiceDecl {
        let port_label = self.port_label.unwrap_or_default();
        let checks = self
            .checks
            .unwrap_or_default()
            .into_iter()
            .map(|c| CheckDecl {
                id: c.id.unwrap_or_default(),
                name: c.name.unwrap_or_default(),
                check_type: c.check_type.unwrap_or_default(),
                port_label: c
                    .port_label
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| port_label.clone()),
                path: c.path.unwrap_or_default(),
                interval: Duration::from_nanos(c.interval.unwrap_or_default()),
                method: c.method.unwrap_or_default(),
            })
            .collect();

        ServiceDecl {
            name: self.name.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            port_label,
            checks,
        }
    }
}
