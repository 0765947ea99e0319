use crate::config::{BridgeConfig, RegistryConfig, ADDRESS_ENV, DEFAULT_CONSUL_ADDR, DEFAULT_JOBSPEC};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "local-service")]
#[command(about = "Mirror the services of a Nomad job description into the local Consul agent")]
pub struct CliConfig {
    /// Specify jobspec to use if not default
    #[arg(long, default_value = DEFAULT_JOBSPEC)]
    pub jobspec: PathBuf,

    /// Specify address by interface
    #[arg(long)]
    pub iface: Option<String>,

    /// Advertise this address instead of detecting one
    #[arg(long, env = ADDRESS_ENV)]
    pub address: Option<String>,

    /// Add extra logging
    #[arg(long)]
    pub debug: bool,

    /// Emit JSON log lines
    #[arg(long)]
    pub json_logs: bool,

    /// Synthesize and log registrations without contacting Consul
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, env = "CONSUL_HTTP_ADDR", default_value = DEFAULT_CONSUL_ADDR)]
    pub consul_addr: String,

    #[arg(long, env = "CONSUL_HTTP_TOKEN", hide_env_values = true)]
    pub consul_token: Option<String>,
}

impl From<CliConfig> for BridgeConfig {
    fn from(cli: CliConfig) -> Self {
        Self {
            jobspec: cli.jobspec,
            iface: cli.iface,
            address: cli.address,
            debug: cli.debug,
            json_logs: cli.json_logs,
            dry_run: cli.dry_run,
            registry: RegistryConfig::new(&cli.consul_addr, cli.consul_token),
        }
    }
}
