// Adapters layer: concrete implementations of the domain ports (job files, Consul agent).

pub mod consul;
pub mod dry_run;
pub mod jobspec;
pub mod nomad_hcl;

pub use consul::ConsulRegistry;
pub use dry_run::DryRunRegistry;
pub use jobspec::{JobFormat, JobSpecFile};
