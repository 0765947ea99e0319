// Native Nomad jobspec (HCL2): job "x" { group "y" { task "z" { service { check { } } } } }

use crate::adapters::jobspec::parse_error;
use crate::domain::model::{CheckDecl, JobSpec, ServiceDecl, Task, TaskGroup};
use crate::utils::duration::parse_interval;
use crate::utils::error::{BridgeError, Result};
use hcl::expr::TemplateExpr;
use hcl::{Block, Body, Expression};
use std::time::Duration;

pub(crate) fn parse_hcl_job(content: &str) -> Result<JobSpec> {
    let body = hcl::parse(content).map_err(|e| parse_error(e.to_string()))?;

    let mut task_groups = Vec::new();
    for job in blocks(&body, "job") {
        let job_name = label(job);
        for group in blocks(job.body(), "group") {
            task_groups.push(parse_group(&job_name, group)?);
        }
    }
    Ok(JobSpec { task_groups })
}

/// Group-level services are attached to a task named after the group.
fn parse_group(job_name: &str, group: &Block) -> Result<TaskGroup> {
    let group_name = label(group);
    let mut tasks = Vec::new();

    let group_services = blocks(group.body(), "service")
        .map(|s| parse_service(s, &format!("{}-{}", job_name, group_name)))
        .collect::<Result<Vec<_>>>()?;
    if !group_services.is_empty() {
        tasks.push(Task {
            name: group_name.clone(),
            services: group_services,
        });
    }

    for task in blocks(group.body(), "task") {
        let task_name = label(task);
        let default_name = format!("{}-{}-{}", job_name, group_name, task_name);
        let services = blocks(task.body(), "service")
            .map(|s| parse_service(s, &default_name))
            .collect::<Result<Vec<_>>>()?;
        tasks.push(Task {
            name: task_name,
            services,
        });
    }

    Ok(TaskGroup {
        name: group_name,
        tasks,
    })
}

fn parse_service(service: &Block, default_name: &str) -> Result<ServiceDecl> {
    let body = service.body();
    let name = string_attr(body, "name")?.unwrap_or_else(|| default_name.to_string());
    let port_label = string_attr(body, "port")?.unwrap_or_default();
    let tags = list_attr(body, "tags")?;

    let checks = blocks(body, "check")
        .map(|c| parse_check(c.body(), &port_label))
        .collect::<Result<Vec<_>>>()?;

    Ok(ServiceDecl {
        name,
        tags,
        port_label,
        checks,
    })
}

fn parse_check(body: &Body, service_port: &str) -> Result<CheckDecl> {
    let name = string_attr(body, "name")?.unwrap_or_default();
    let interval = match string_attr(body, "interval")? {
        Some(raw) => parse_interval(&raw)
            .map_err(|e| parse_error(format!("check {:?} interval {:?}: {}", name, raw, e)))?,
        None => Duration::ZERO,
    };

    Ok(CheckDecl {
        id: string_attr(body, "id")?.unwrap_or_default(),
        check_type: string_attr(body, "type")?.unwrap_or_default(),
        port_label: string_attr(body, "port")?
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| service_port.to_string()),
        path: string_attr(body, "path")?.unwrap_or_default(),
        method: string_attr(body, "method")?.unwrap_or_default(),
        interval,
        name,
    })
}

fn blocks<'a>(body: &'a Body, identifier: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
    body.blocks().filter(move |b| b.identifier() == identifier)
}

fn label(block: &Block) -> String {
    block
        .labels()
        .first()
        .map(|l| l.as_str().to_string())
        .unwrap_or_default()
}

fn attr<'a>(body: &'a Body, key: &str) -> Option<&'a Expression> {
    body.attributes().find(|a| a.key() == key).map(|a| a.expr())
}

fn string_attr(body: &Body, key: &str) -> Result<Option<String>> {
    attr(body, key).map(|e| scalar(key, e)).transpose()
}

fn list_attr(body: &Body, key: &str) -> Result<Vec<String>> {
    match attr(body, key) {
        None => Ok(Vec::new()),
        Some(Expression::Array(items)) => items.iter().map(|e| scalar(key, e)).collect(),
        Some(other) => Err(parse_error(format!(
            "attribute {:?} must be a list, got {:?}",
            key, other
        ))),
    }
}

/// Strings, numbers and booleans are accepted wherever a string is expected.
fn scalar(key: &str, expr: &Expression) -> Result<String> {
    match expr {
        Expression::String(s) => Ok(s.clone()),
        Expression::Number(n) => Ok(n.to_string()),
        Expression::Bool(b) => Ok(b.to_string()),
        // Interpolations left unresolved by `${VAR}` substitution stay verbatim.
        Expression::TemplateExpr(t) => match t.as_ref() {
            TemplateExpr::QuotedString(s) => Ok(s.clone()),
            other => Err(unsupported(key, other)),
        },
        other => Err(unsupported(key, other)),
    }
}

fn unsupported(key: &str, value: &impl std::fmt::Debug) -> BridgeError {
    parse_error(format!("attribute {:?} has an unsupported value {:?}", key, value))
}
