use crate::core::identifier::IdGenerator;
use crate::core::service::synthesize_service;
use crate::core::{JobSpec, Registry, RegistrationReport, TeardownList};
use crate::domain::model::{AgentServiceRegistration, ServiceRegistration};

/// Everything a registration pass leaves behind for the lifecycle controller.
#[derive(Debug)]
pub struct RegistrationOutcome {
    pub teardown: TeardownList,
    pub report: RegistrationReport,
}

/// Walks the job tree and registers every declared service, one at a time.
pub struct Orchestrator<'a, R: Registry + ?Sized> {
    registry: &'a R,
    address: String,
    ids: IdGenerator,
}

impl<'a, R: Registry + ?Sized> Orchestrator<'a, R> {
    pub fn new(registry: &'a R, address: impl Into<String>) -> Self {
        Self::with_ids(registry, address, IdGenerator::from_clock())
    }

    pub fn with_ids(registry: &'a R, address: impl Into<String>, ids: IdGenerator) -> Self {
        Self {
            registry,
            address: address.into(),
            ids,
        }
    }

    pub async fn run(&mut self, job: JobSpec) -> RegistrationOutcome {
        let mut teardown = TeardownList::new();
        let mut report = RegistrationReport::default();

        for group in &job.task_groups {
            tracing::info!(group = %group.name, "processing task group");
            for task in &group.tasks {
                tracing::info!(task = %task.name, "diving into task");
                for decl in &task.services {
                    tracing::info!(service = %decl.name, "looking at service");
                    report.services_seen += 1;

                    let Some(registration) = synthesize_service(decl, &self.address, &mut self.ids)
                    else {
                        report.skipped += 1;
                        continue;
                    };
                    dump_registration(&registration);

                    match self.registry.register(&registration).await {
                        Ok(()) => {
                            tracing::info!(
                                service = %registration.name,
                                id = %registration.id,
                                checks = registration.checks.len(),
                                "service registered"
                            );
                            teardown.record(registration.id);
                            report.registered += 1;
                        }
                        Err(e) => {
                            tracing::warn!(
                                service = %registration.name,
                                id = %registration.id,
                                error = %e,
                                "something went wrong when trying to register the service"
                            );
                            report.failed += 1;
                        }
                    }
                }
            }
        }

        tracing::info!(
            seen = report.services_seen,
            registered = report.registered,
            skipped = report.skipped,
            failed = report.failed,
            "registration pass finished"
        );

        RegistrationOutcome { teardown, report }
    }
}

fn dump_registration(registration: &ServiceRegistration) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    match serde_json::to_string_pretty(&AgentServiceRegistration::from(registration)) {
        Ok(json) => tracing::debug!("agent service registration:\n{}", json),
        Err(e) => tracing::debug!(id = %registration.id, error = %e, "could not render registration"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ServiceDecl, Task, TaskGroup};
    use crate::utils::error::{BridgeError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FlakyRegistry {
        reject: Vec<&'static str>,
        registered: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Registry for FlakyRegistry {
        async fn register(&self, registration: &ServiceRegistration) -> Result<()> {
            if self.reject.contains(&registration.name.as_str()) {
                return Err(BridgeError::RegistryError {
                    operation: "register",
                    id: registration.id.clone(),
                    message: "rejected".to_string(),
                });
            }
            self.registered.lock().unwrap().push(registration.id.clone());
            Ok(())
        }

        async fn deregister(&self, _service_id: &str) -> Result<()> {
            Ok(())
        }
    }

    fn service(name: &str, port: &str) -> ServiceDecl {
        ServiceDecl {
            name: name.to_string(),
            port_label: port.to_string(),
            ..ServiceDecl::default()
        }
    }

    fn job(services: Vec<ServiceDecl>) -> JobSpec {
        JobSpec {
            task_groups: vec![TaskGroup {
                name: "group".to_string(),
                tasks: vec![Task {
                    name: "task".to_string(),
                    services,
                }],
            }],
        }
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_pass() {
        let registry = FlakyRegistry {
            reject: vec!["cache"],
            ..FlakyRegistry::default()
        };
        let mut orchestrator =
            Orchestrator::with_ids(&registry, "10.0.0.5", IdGenerator::with_seed(9));

        let outcome = orchestrator
            .run(job(vec![
                service("web", "8080"),
                service("admin", "http"),
                service("cache", "6379"),
                service("api", "9000"),
            ]))
            .await;

        assert_eq!(
            outcome.report,
            RegistrationReport {
                services_seen: 4,
                skipped: 1,
                registered: 2,
                failed: 1,
            }
        );
        assert_eq!(outcome.teardown.len(), 2);

        let registered = registry.registered.lock().unwrap().clone();
        let torn_down: Vec<String> = outcome
            .teardown
            .drain_reversed()
            .map(|a| a.service_id)
            .collect();
        assert!(registered[0].starts_with("web-"));
        assert!(registered[1].starts_with("api-"));
        assert_eq!(torn_down, vec![registered[1].clone(), registered[0].clone()]);
    }

    #[tokio::test]
    async fn test_empty_job() {
        let registry = FlakyRegistry::default();
        let mut orchestrator = Orchestrator::new(&registry, "10.0.0.5");
        let outcome = orchestrator.run(JobSpec::default()).await;
        assert!(outcome.teardown.is_empty());
        assert_eq!(outcome.report, RegistrationReport::default());
    }
}
