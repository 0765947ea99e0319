use anyhow::Result;
use local_service::core::address::resolve_from;
use local_service::core::JobSource;
use local_service::{
    BridgeConfig, DryRunRegistry, JobSpecFile, LifecycleController, Orchestrator, ShutdownSignal,
};
use tempfile::TempDir;

const NOMAD_JSON_JOB: &str = r#"{
  "Job": {
    "ID": "docs",
    "TaskGroups": [{
      "Name": "docs",
      "Tasks": [{
        "Name": "server",
        "Services": [{
          "Name": "docs",
          "Tags": ["public"],
          "PortLabel": "4000",
          "Checks": [
            {"Name": "docs alive", "Type": "http", "Path": "/", "Interval": 15000000000, "Method": "GET"},
            {"Name": "docs tcp", "Type": "tcp", "Interval": 15000000000}
          ]
        }]
      }]
    }]
  }
}"#;

#[tokio::test]
async fn test_nomad_json_job_in_dry_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("job.json");
    std::fs::write(&path, NOMAD_JSON_JOB)?;

    let config = BridgeConfig {
        jobspec: path,
        address: Some("192.168.10.4".to_string()),
        dry_run: true,
        ..BridgeConfig::default()
    };
    let address = resolve_from(&config, &[])?;
    let job = JobSpecFile::new(&config.jobspec).load()?;

    let registry = DryRunRegistry;
    let outcome = Orchestrator::new(&registry, address).run(job).await;
    assert_eq!(outcome.report.services_seen, 1);
    assert_eq!(outcome.report.registered, 1);

    let mut controller = LifecycleController::new(outcome.teardown);
    assert_eq!(controller.pending(), 1);
    let report = controller
        .run_until(&registry, async { ShutdownSignal::Quit })
        .await;
    assert_eq!(report.succeeded, 1);
    assert_eq!(controller.pending(), 0);
    Ok(())
}

#[test]
fn test_sample_jobspec_parses() -> Result<()> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("nomad-jobspec.tmpl");
    let job = JobSpecFile::new(path).load()?;
    let services = &job.task_groups[0].tasks[0].services;
    assert_eq!(services.len(), 2);
    assert_eq!(services[0].name, "web");
    assert_eq!(services[1].checks[0].port_label, "9102");
    Ok(())
}
