pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::{BridgeConfig, RegistryConfig};

pub use adapters::{ConsulRegistry, DryRunRegistry, JobSpecFile};
pub use core::lifecycle::{LifecycleController, ShutdownSignal, ShutdownSignals};
pub use core::orchestrator::Orchestrator;
pub use utils::error::{BridgeError, Result};
