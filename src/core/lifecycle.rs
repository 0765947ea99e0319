use crate::core::{Registry, TeardownList};
use crate::utils::error::{BridgeError, Result};
use std::fmt;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Running,
    Draining,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
    Quit,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Quit => "SIGQUIT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Holds the process until shutdown, then deregisters everything that was
/// registered, newest first.
#[derive(Debug)]
pub struct LifecycleController {
    state: LifecycleState,
    teardown: TeardownList,
}

impl LifecycleController {
    pub fn new(teardown: TeardownList) -> Self {
        Self {
            state: LifecycleState::Running,
            teardown,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn pending(&self) -> usize {
        self.teardown.len()
    }

    /// Waits for `shutdown` to resolve, then drains the teardown list.
    pub async fn run_until<R, F>(&mut self, registry: &R, shutdown: F) -> DrainReport
    where
        R: Registry + ?Sized,
        F: Future<Output = ShutdownSignal>,
    {
        tracing::info!(
            registrations = self.teardown.len(),
            "registrations in place; waiting for a termination signal"
        );
        let signal = shutdown.await;
        tracing::info!(%signal, "termination signal received");
        self.drain(registry).await
    }

    /// Runs every teardown action once. A failed deregistration is logged
    /// and does not stop the rest.
    pub async fn drain<R: Registry + ?Sized>(&mut self, registry: &R) -> DrainReport {
        if self.state == LifecycleState::Terminated {
            return DrainReport::default();
        }
        self.state = LifecycleState::Draining;
        tracing::info!(
            state = ?self.state,
            pending = self.teardown.len(),
            "draining registrations"
        );

        let mut report = DrainReport::default();
        for action in std::mem::take(&mut self.teardown).drain_reversed() {
            report.attempted += 1;
            match registry.deregister(&action.service_id).await {
                Ok(()) => {
                    tracing::info!(id = %action.service_id, "service deregistered");
                    report.succeeded += 1;
                }
                Err(e) => {
                    tracing::warn!(id = %action.service_id, error = %e, "failed to deregister service");
                    report.failed += 1;
                }
            }
        }

        self.state = LifecycleState::Terminated;
        tracing::info!(
            state = ?self.state,
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            "teardown finished"
        );
        report
    }
}

/// Termination signal listeners, installed before any registration happens
/// so that an early signal is buffered instead of killing the process.
pub struct ShutdownSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    quit: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    #[cfg(unix)]
    pub fn install() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let listen = |kind: SignalKind| {
            signal(kind).map_err(|e| BridgeError::SignalError {
                message: e.to_string(),
            })
        };
        Ok(Self {
            interrupt: listen(SignalKind::interrupt())?,
            terminate: listen(SignalKind::terminate())?,
            quit: listen(SignalKind::quit())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    pub async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
            _ = self.quit.recv() => ShutdownSignal::Quit,
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> ShutdownSignal {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        ShutdownSignal::Interrupt
    }
}
