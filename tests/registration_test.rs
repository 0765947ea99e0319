use anyhow::Result;
use httpmock::prelude::*;
use local_service::core::identifier::IdGenerator;
use local_service::core::JobSource;
use local_service::{
    ConsulRegistry, JobSpecFile, LifecycleController, Orchestrator, RegistryConfig,
    ShutdownSignal,
};
use tempfile::TempDir;

const WEB_JOB: &str = r#"
[[group]]
name = "frontend"

[[group.task]]
name = "server"

[[group.task.service]]
name = "web"
tags = ["edge"]
port = "8080"

[[group.task.service.check]]
id = "web-alive"
name = "web alive"
type = "http"
port = "8080"
path = "/healthz"
interval = "10s"
"#;

fn write_job(dir: &TempDir, content: &str) -> Result<std::path::PathBuf> {
    let path = dir.path().join("nomad-jobspec.tmpl");
    std::fs::write(&path, content)?;
    Ok(path)
}

fn consul_for(server: &MockServer, token: Option<&str>) -> Result<ConsulRegistry> {
    let config = RegistryConfig::new(&server.base_url(), token.map(str::to_string));
    Ok(ConsulRegistry::new(&config)?)
}

#[tokio::test]
async fn test_single_web_service_is_registered() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let job = JobSpecFile::new(write_job(&temp_dir, WEB_JOB)?).load()?;

    let server = MockServer::start();
    let register = server.mock(|when, then| {
        when.method(PUT)
            .path("/v1/agent/service/register")
            .json_body_partial(r#"{"Name":"web","Port":8080,"Address":"10.0.0.5"}"#)
            .body_contains(r#""Tags":["edge"]"#)
            .body_contains(r#""HTTP":"http://10.0.0.5:8080/healthz""#)
            .body_contains(r#""CheckID":"web-alive""#)
            .body_contains(r#""Interval":"10s""#);
        then.status(200);
    });

    let registry = consul_for(&server, None)?;
    let outcome = Orchestrator::new(&registry, "10.0.0.5").run(job).await;

    register.assert();
    assert_eq!(outcome.report.registered, 1);
    assert_eq!(outcome.teardown.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_symbolic_service_port_is_skipped_without_registry_call() -> Result<()> {
    let job_text = r#"
[[group]]
name = "g"

[[group.task]]
name = "t"

[[group.task.service]]
name = "web"
port = "http"

[[group.task.service.check]]
name = "web alive"
type = "http"
port = "8080"
path = "/healthz"
interval = "10s"

[[group.task.service]]
name = "api"
port = "9000"
"#;
    let temp_dir = TempDir::new()?;
    let job = JobSpecFile::new(write_job(&temp_dir, job_text)?).load()?;

    let server = MockServer::start();
    let web = server.mock(|when, then| {
        when.method(PUT)
            .path("/v1/agent/service/register")
            .json_body_partial(r#"{"Name":"web"}"#);
        then.status(200);
    });
    let api = server.mock(|when, then| {
        when.method(PUT)
            .path("/v1/agent/service/register")
            .json_body_partial(r#"{"Name":"api","Port":9000}"#);
        then.status(200);
    });

    let registry = consul_for(&server, None)?;
    let outcome = Orchestrator::new(&registry, "10.0.0.5").run(job).await;

    web.assert_hits(0);
    api.assert_hits(1);
    assert_eq!(outcome.report.skipped, 1);
    assert_eq!(outcome.report.registered, 1);
    Ok(())
}

#[tokio::test]
async fn test_rejected_registration_is_not_torn_down() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let job = JobSpecFile::new(write_job(&temp_dir, WEB_JOB)?).load()?;

    let server = MockServer::start();
    let register = server.mock(|when, then| {
        when.method(PUT).path("/v1/agent/service/register");
        then.status(500).body("Unexpected response code: 500");
    });
    let deregister = server.mock(|when, then| {
        when.method(PUT).path_contains("/v1/agent/service/deregister/");
        then.status(200);
    });

    let registry = consul_for(&server, None)?;
    let outcome = Orchestrator::new(&registry, "10.0.0.5").run(job).await;
    assert_eq!(outcome.report.failed, 1);
    assert!(outcome.teardown.is_empty());

    let report = LifecycleController::new(outcome.teardown)
        .run_until(&registry, async { ShutdownSignal::Interrupt })
        .await;

    register.assert();
    deregister.assert_hits(0);
    assert_eq!(report.attempted, 0);
    Ok(())
}

#[tokio::test]
async fn test_every_registered_service_is_deregistered_once() -> Result<()> {
    let job_text = r#"
[[group]]
name = "g1"

[[group.task]]
name = "t1"

[[group.task.service]]
name = "web"
port = 8080

[[group.task.service]]
name = "api"
port = 9000

[[group]]
name = "g2"

[[group.task]]
name = "t2"

[[group.task.service]]
name = "cache"
port = 6379
"#;
    let temp_dir = TempDir::new()?;
    let job = JobSpecFile::new(write_job(&temp_dir, job_text)?).load()?;

    let server = MockServer::start();
    let register = server.mock(|when, then| {
        when.method(PUT)
            .path("/v1/agent/service/register")
            .header("X-Consul-Token", "s3cr3t");
        then.status(200);
    });
    let deregister_web = server.mock(|when, then| {
        when.method(PUT)
            .path_contains("/v1/agent/service/deregister/web-")
            .header("X-Consul-Token", "s3cr3t");
        then.status(200);
    });
    let deregister_api = server.mock(|when, then| {
        when.method(PUT).path_contains("/v1/agent/service/deregister/api-");
        then.status(200);
    });
    // The agent forgot about this one; teardown carries on regardless.
    let deregister_cache = server.mock(|when, then| {
        when.method(PUT).path_contains("/v1/agent/service/deregister/cache-");
        then.status(404).body("Unknown service");
    });

    let registry = consul_for(&server, Some("s3cr3t"))?;
    let outcome = Orchestrator::with_ids(&registry, "10.0.0.5", IdGenerator::with_seed(11))
        .run(job)
        .await;
    assert_eq!(outcome.teardown.len(), 3);

    let mut controller = LifecycleController::new(outcome.teardown);
    let report = controller
        .run_until(&registry, async { ShutdownSignal::Terminate })
        .await;

    register.assert_hits(3);
    deregister_web.assert_hits(1);
    deregister_api.assert_hits(1);
    deregister_cache.assert_hits(1);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    Ok(())
}
